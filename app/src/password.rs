//! Password hashing with bcrypt. Hashing is CPU-bound, so it always runs on the blocking thread
//! pool instead of the async workers.

use thiserror::Error;

/// The work factor used unless configured otherwise.
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A bcrypt hash in its modular crypt format, e.g. `$2b$10$...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(pub String);

/// Hashes and verifies passwords at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct Credentials {
    cost: u32,
}

impl Credentials {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, password: &str) -> Result<PasswordHash, HashError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(PasswordHash(hash))
    }

    /// Returns whether the password matches the hash. A hash that cannot be parsed never matches.
    pub async fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, HashError> {
        let password = password.to_owned();
        let hash = hash.0.clone();
        let matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        match matches {
            Ok(matches) => Ok(matches),
            Err(e) => {
                log::error!("stored password hash is unusable: {}", e);
                Ok(false)
            }
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_is_salted_and_verifies() {
        let credentials = Credentials::new(4);
        let first = credentials.hash("pw123").await.unwrap();
        let second = credentials.hash("pw123").await.unwrap();

        assert_ne!(first, second);
        assert!(!first.0.contains("pw123"));
        assert!(credentials.verify("pw123", &first).await.unwrap());
        assert!(credentials.verify("pw123", &second).await.unwrap());
        assert!(!credentials.verify("wrong", &first).await.unwrap());
    }

    #[tokio::test]
    async fn hash_records_cost() {
        let hash = Credentials::new(5).hash("pw").await.unwrap();
        assert!(hash.0.starts_with("$2b$05$"), "{}", hash.0);
    }

    #[tokio::test]
    async fn garbage_hash_does_not_match() {
        let credentials = Credentials::new(4);
        let garbage = PasswordHash("not a bcrypt hash".to_owned());
        assert!(!credentials.verify("anything", &garbage).await.unwrap());
    }

    #[test]
    fn default_cost_is_ten() {
        assert_eq!(Credentials::default().cost(), 10);
    }
}
