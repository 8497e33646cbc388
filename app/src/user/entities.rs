use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::password::PasswordHash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(pub String);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub Uuid);

#[derive(Debug, Clone)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub created: DateTime<Utc>,
}

impl User {
    pub(crate) fn create(name: String, email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id: Id(Uuid::new_v4()),
            name,
            email,
            password_hash,
            created: Utc::now(),
        }
    }
}
