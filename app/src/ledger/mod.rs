//! The transaction ledger: an append-only list of transfer records. Nothing here checks who is
//! recording a transfer or whether sender and receiver exist.

use crate::database::{Database, StorageError};
use async_trait::async_trait;

mod entities;

pub use entities::{Amount, Id, NewTransaction, Transaction, ValidationError};

/// Persistence of transactions. Listing returns records in insertion order.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), StorageError>;
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StorageError>;
}

/// Records a transfer. Sending and receiving a payment both end up here.
pub async fn record<S: TransactionStore + ?Sized>(
    store: &S,
    new: NewTransaction,
) -> Result<Transaction, StorageError> {
    let transaction = Transaction::create(new);
    store.insert_transaction(&transaction).await?;
    log::info!("recorded transaction {:?}", transaction.id);
    Ok(transaction)
}

pub async fn list<S: TransactionStore + ?Sized>(
    store: &S,
) -> Result<Vec<Transaction>, StorageError> {
    store.list_transactions().await
}

#[async_trait]
impl TransactionStore for Database {
    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        queries::insert(self, transaction).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        queries::list(self).await
    }
}

mod queries {
    use super::{Amount, Id, Transaction};
    use crate::database::{Database, StorageError};
    use chrono::{DateTime, Utc};
    use const_format::formatcp;
    use uuid::Uuid;

    const COLUMNS: &str = "id, sender, receiver, amount, created";

    pub(super) async fn insert(
        db: &Database,
        transaction: &Transaction,
    ) -> Result<(), StorageError> {
        sqlx::query(formatcp!(
            "INSERT INTO transactions ({}) VALUES ($1, $2, $3, $4, $5)",
            COLUMNS
        ))
        .bind(transaction.id.0)
        .bind(&transaction.sender)
        .bind(&transaction.receiver)
        .bind(transaction.amount.value())
        .bind(transaction.created)
        .execute(db)
        .await?;
        Ok(())
    }

    pub(super) async fn list(db: &Database) -> Result<Vec<Transaction>, StorageError> {
        sqlx::query_as::<_, TransactionRow>(formatcp!(
            "SELECT {} FROM transactions ORDER BY seq",
            COLUMNS
        ))
        .fetch_all(db)
        .await?
        .into_iter()
        .map(|row| row.into_entity())
        .collect()
    }

    #[derive(sqlx::FromRow, Debug)]
    struct TransactionRow {
        id: Uuid,
        sender: String,
        receiver: String,
        amount: f64,
        created: DateTime<Utc>,
    }

    impl TransactionRow {
        fn into_entity(self) -> Result<Transaction, StorageError> {
            let amount = Amount::new(self.amount).map_err(|e| {
                StorageError::Database(sqlx::Error::Decode(Box::new(e)))
            })?;
            Ok(Transaction {
                id: Id(self.id),
                sender: self.sender,
                receiver: self.receiver,
                amount,
                created: self.created,
            })
        }
    }
}
