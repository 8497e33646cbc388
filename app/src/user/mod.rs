//! The credential store: user registration and password authentication.

use crate::database::{Database, StorageError};
use crate::password::{Credentials, HashError};
use async_trait::async_trait;
use thiserror::Error;

mod entities;

pub use entities::{Email, Id, User};

#[derive(Debug, Error)]
pub enum RegisterError {
    /// Carries the message of the violated uniqueness constraint.
    #[error("{0}")]
    DuplicateEmail(String),
    #[error("{0}")]
    Hash(#[from] HashError),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum AuthenticateError {
    /// Covers both an unknown email and a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Hash(#[from] HashError),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Failure to insert a user record.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("{0}")]
    DuplicateEmail(String),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Persistence of user records. Implementations must reject a second user with the same email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), InsertError>;
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError>;
}

/// Registers a new user. The plaintext password only lives long enough to be hashed.
pub async fn register<S: UserStore + ?Sized>(
    store: &S,
    credentials: &Credentials,
    name: String,
    email: Email,
    password: &str,
) -> Result<User, RegisterError> {
    let hash = credentials.hash(password).await?;
    let user = User::create(name, email, hash);
    match store.insert_user(&user).await {
        Ok(()) => {
            log::info!("registered user {:?}", user.id);
            Ok(user)
        }
        Err(InsertError::DuplicateEmail(message)) => Err(RegisterError::DuplicateEmail(message)),
        Err(InsertError::Storage(e)) => Err(RegisterError::Storage(e)),
    }
}

/// Checks an email and password pair, returning the matching user.
pub async fn authenticate<S: UserStore + ?Sized>(
    store: &S,
    credentials: &Credentials,
    email: &Email,
    password: &str,
) -> Result<User, AuthenticateError> {
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or(AuthenticateError::InvalidCredentials)?;
    if credentials.verify(password, &user.password_hash).await? {
        Ok(user)
    } else {
        Err(AuthenticateError::InvalidCredentials)
    }
}

#[async_trait]
impl UserStore for Database {
    async fn insert_user(&self, user: &User) -> Result<(), InsertError> {
        queries::insert(self, user).await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        queries::get_by_email(self, email).await
    }
}

mod queries {
    use super::{Email, Id, InsertError, User};
    use crate::database::{Database, StorageError};
    use crate::password::PasswordHash;
    use chrono::{DateTime, Utc};
    use const_format::formatcp;
    use uuid::Uuid;

    const COLUMNS: &str = "id, name, email, password_hash, created";

    pub(super) async fn insert(db: &Database, user: &User) -> Result<(), InsertError> {
        sqlx::query(formatcp!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5)",
            COLUMNS
        ))
        .bind(user.id.0)
        .bind(&user.name)
        .bind(&user.email.0)
        .bind(&user.password_hash.0)
        .bind(user.created)
        .execute(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref inner) if inner.is_unique_violation() => {
                InsertError::DuplicateEmail(inner.message().to_owned())
            }
            e => InsertError::Storage(StorageError::Database(e)),
        })?;
        Ok(())
    }

    pub(super) async fn get_by_email(
        db: &Database,
        email: &Email,
    ) -> Result<Option<User>, StorageError> {
        Ok(sqlx::query_as::<_, UserRow>(formatcp!(
            "SELECT {} FROM users WHERE email = $1",
            COLUMNS
        ))
        .bind(&email.0)
        .fetch_optional(db)
        .await?
        .map(|row| row.into_entity()))
    }

    #[derive(sqlx::FromRow, Debug)]
    struct UserRow {
        id: Uuid,
        name: String,
        email: String,
        password_hash: String,
        created: DateTime<Utc>,
    }

    impl UserRow {
        fn into_entity(self) -> User {
            User {
                id: Id(self.id),
                name: self.name,
                email: Email(self.email),
                password_hash: PasswordHash(self.password_hash),
                created: self.created,
            }
        }
    }
}
