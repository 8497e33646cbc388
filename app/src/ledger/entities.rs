use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{0}` is required")]
    MissingField(&'static str),
    #[error("`{0}` must be text, got {1}")]
    InvalidText(&'static str, String),
    #[error("`amount` must be a number, got {0}")]
    InvalidAmount(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub Uuid);

/// A transferred amount. Any finite number is accepted, including zero and negative values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidAmount(value.to_string()))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    /// Accepts numeric strings such as `"50"` or `" 12.5 "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount(format!("{:?}", s)))
            .and_then(Self::new)
    }
}

/// The caller-supplied part of a transaction, checked for presence of every field.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
}

impl NewTransaction {
    pub fn new(
        sender: Option<String>,
        receiver: Option<String>,
        amount: Option<Amount>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            sender: sender.ok_or(ValidationError::MissingField("sender"))?,
            receiver: receiver.ok_or(ValidationError::MissingField("receiver"))?,
            amount: amount.ok_or(ValidationError::MissingField("amount"))?,
        })
    }
}

/// A recorded transfer. Sender and receiver are free text and are not tied to any user.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Id,
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub created: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn create(new: NewTransaction) -> Self {
        Self {
            id: Id(Uuid::new_v4()),
            sender: new.sender,
            receiver: new.receiver,
            amount: new.amount,
            created: Utc::now(),
        }
    }
}
