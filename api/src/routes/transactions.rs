//! Routes for recording and listing transfers. Sending and receiving a payment record the same
//! kind of transaction; only the response message differs.

use app::ledger::{self, Amount, NewTransaction, ValidationError};
use chrono::{DateTime, Utc};
use rocket::{get, http::Status, post, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{self, JsonError, JsonResult},
    state::RocketState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct TransferRequest {
    /// Free-form sender, not checked against registered users.
    sender: Option<Value>,
    /// Free-form receiver, not checked against registered users.
    receiver: Option<Value>,
    /// Amount as a JSON number or a numeric string.
    amount: Option<Value>,
}

impl TransferRequest {
    fn into_new_transaction(self) -> Result<NewTransaction, ValidationError> {
        let sender = text(self.sender, "sender")?;
        let receiver = text(self.receiver, "receiver")?;
        let amount = parse_amount(self.amount)?;
        NewTransaction::new(sender, receiver, amount)
    }
}

fn text(value: Option<Value>, field: &'static str) -> Result<Option<String>, ValidationError> {
    super::text_field(value)
        .map_err(|other| ValidationError::InvalidText(field, other.to_string()))
}

fn parse_amount(value: Option<Value>) -> Result<Option<Amount>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ValidationError::InvalidAmount(n.to_string()))
            .and_then(Amount::new)
            .map(Some),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(other) => Err(ValidationError::InvalidAmount(other.to_string())),
    }
}

#[derive(Debug, Serialize, JsonSchema)]
struct TransactionModel {
    /// Unique transaction identifier.
    id: Uuid,
    sender: String,
    receiver: String,
    amount: f64,
    /// Time the transaction was recorded.
    date: DateTime<Utc>,
}

impl TransactionModel {
    fn from_entity(transaction: &ledger::Transaction) -> Self {
        Self {
            id: transaction.id.0,
            sender: transaction.sender.clone(),
            receiver: transaction.receiver.clone(),
            amount: transaction.amount.value(),
            date: transaction.created,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct PaymentResponse {
    message: &'static str,
    transaction: TransactionModel,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct TransactionsResponse {
    transactions: Vec<TransactionModel>,
}

/// Error while recording a payment.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum PaymentError {
    /// Unexpected error, please try again later.
    Unknown,
    /// A field is missing or has an invalid value.
    ValidationError,
}

/// Error while listing transactions.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum ListError {
    /// Unexpected error, please try again later.
    Unknown,
}

/// List every recorded transaction, oldest first.
#[openapi(tag = "Transactions")]
#[get("/transactions")]
pub(super) async fn list(
    state: &State<RocketState>,
) -> JsonResult<TransactionsResponse, ListError> {
    ledger::list(&*state.storage)
        .await
        .map(|transactions| {
            Json(TransactionsResponse {
                transactions: transactions
                    .iter()
                    .map(TransactionModel::from_entity)
                    .collect(),
            })
        })
        .map_err(|e| error::unexpected(ListError::Unknown, &e))
}

/// Record an outgoing payment.
#[openapi(tag = "Transactions")]
#[post("/send-payment", data = "<req>")]
pub(super) async fn send_payment(
    state: &State<RocketState>,
    req: Json<TransferRequest>,
) -> Result<(Status, Json<PaymentResponse>), JsonError<PaymentError>> {
    record(state, req.into_inner(), "Payment sent").await
}

/// Record an incoming payment.
#[openapi(tag = "Transactions")]
#[post("/receive-payment", data = "<req>")]
pub(super) async fn receive_payment(
    state: &State<RocketState>,
    req: Json<TransferRequest>,
) -> Result<(Status, Json<PaymentResponse>), JsonError<PaymentError>> {
    record(state, req.into_inner(), "Payment received").await
}

async fn record(
    state: &RocketState,
    req: TransferRequest,
    message: &'static str,
) -> Result<(Status, Json<PaymentResponse>), JsonError<PaymentError>> {
    let new = req
        .into_new_transaction()
        .map_err(|e| error::bad_request(PaymentError::ValidationError, e.to_string()))?;
    ledger::record(&*state.storage, new)
        .await
        .map(|transaction| {
            (
                Status::Created,
                Json(PaymentResponse {
                    message,
                    transaction: TransactionModel::from_entity(&transaction),
                }),
            )
        })
        .map_err(|e| error::unexpected(PaymentError::Unknown, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_accepts_numbers_and_numeric_strings() {
        assert_eq!(
            parse_amount(Some(json!(50))).unwrap().unwrap().value(),
            50.0
        );
        assert_eq!(
            parse_amount(Some(json!("12.5"))).unwrap().unwrap().value(),
            12.5
        );
        assert_eq!(parse_amount(None).unwrap(), None);
        assert_eq!(parse_amount(Some(Value::Null)).unwrap(), None);
    }

    #[test]
    fn amount_rejects_other_json() {
        for value in [json!("ten"), json!(true), json!([1]), json!({"value": 1})] {
            assert!(matches!(
                parse_amount(Some(value)),
                Err(ValidationError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn parties_must_be_text_or_scalars() {
        let req = TransferRequest {
            sender: Some(json!(5)),
            receiver: Some(json!("B")),
            amount: Some(json!(1)),
        };
        assert_eq!(req.into_new_transaction().unwrap().sender, "5");

        let req = TransferRequest {
            sender: Some(json!("A")),
            receiver: Some(json!(["B"])),
            amount: Some(json!(1)),
        };
        assert_eq!(
            req.into_new_transaction(),
            Err(ValidationError::InvalidText("receiver", "[\"B\"]".to_owned()))
        );
    }
}
