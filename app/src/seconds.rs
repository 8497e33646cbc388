/// A span of time in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seconds(pub i64);

impl Seconds {
    pub fn one_hour() -> Self {
        Self(3600)
    }
}
