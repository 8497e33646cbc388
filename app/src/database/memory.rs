//! An in-process storage backend, selected with a `memory://` database URL. Data is lost when the
//! process exits.

use super::StorageError;
use crate::ledger::{Transaction, TransactionStore};
use crate::user::{Email, InsertError, User, UserStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: RwLock<Vec<User>>,
    transactions: RwLock<Vec<Transaction>>,
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn insert_user(&self, user: &User) -> Result<(), InsertError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(InsertError::DuplicateEmail(format!(
                "duplicate key value violates unique constraint \"users_email_key\": \
                 email {} already exists",
                user.email.0
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| &user.email == email)
            .cloned())
    }
}

#[async_trait]
impl TransactionStore for MemoryStorage {
    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        self.transactions.write().await.push(transaction.clone());
        Ok(())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.transactions.read().await.clone())
    }
}
