//! Every failed request answers with the same JSON shape:
//! `{"error": {"code": 400, "description": "...", "reason": "Bad Request", "status": "KIND"}}`,
//! where `status` is a route-specific error kind.

use rocket::{catch, catchers, http::Status, serde::json::Json, Catcher, Request};
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<K: Serialize> {
    pub error: ErrorDetails<K>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorDetails<K: Serialize> {
    /// HTTP status code, repeated from the response line.
    pub code: u16,
    /// Human-readable explanation.
    pub description: String,
    /// Reason phrase of the status code.
    pub reason: Option<&'static str>,
    /// Machine-readable error kind.
    pub status: K,
}

impl<K: Serialize> ErrorBody<K> {
    fn new(status: Status, kind: K, description: impl Into<String>) -> Self {
        let error = ErrorDetails {
            code: status.code,
            description: description.into(),
            reason: status.reason(),
            status: kind,
        };
        Self { error }
    }
}

pub type JsonError<K> = (Status, Json<ErrorBody<K>>);

pub type JsonResult<T, K> = Result<Json<T>, JsonError<K>>;

fn respond<K: Serialize>(status: Status, kind: K, description: impl Into<String>) -> JsonError<K> {
    (status, Json(ErrorBody::new(status, kind, description)))
}

pub fn bad_request<K: Serialize>(kind: K, description: impl Into<String>) -> JsonError<K> {
    respond(Status::BadRequest, kind, description)
}

pub fn unauthorized<K: Serialize>(kind: K, description: impl Into<String>) -> JsonError<K> {
    respond(Status::Unauthorized, kind, description)
}

/// Logs the cause and answers 500 without leaking it to the caller.
pub fn unexpected<K: Serialize>(kind: K, cause: &dyn std::error::Error) -> JsonError<K> {
    log::error!("request failed: {}", cause);
    respond(
        Status::InternalServerError,
        kind,
        "an unexpected error occurred, please try again later",
    )
}

/// Errors raised by Rocket itself, before a route runs.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestError {
    /// The request body is not valid JSON.
    MalformedBody,
    /// The request body does not have the expected shape.
    InvalidBody,
    /// No such route.
    NotFound,
    /// Unexpected error.
    Unknown,
}

#[catch(400)]
fn malformed_body(_req: &Request) -> Json<ErrorBody<RequestError>> {
    Json(ErrorBody::new(
        Status::BadRequest,
        RequestError::MalformedBody,
        "request body is not valid JSON",
    ))
}

#[catch(422)]
fn invalid_body(_req: &Request) -> Json<ErrorBody<RequestError>> {
    Json(ErrorBody::new(
        Status::UnprocessableEntity,
        RequestError::InvalidBody,
        "request body must be a JSON object",
    ))
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ErrorBody<RequestError>> {
    Json(ErrorBody::new(
        Status::NotFound,
        RequestError::NotFound,
        format!("no route for {} {}", req.method(), req.uri().path()),
    ))
}

#[catch(500)]
fn internal(_req: &Request) -> Json<ErrorBody<RequestError>> {
    Json(ErrorBody::new(
        Status::InternalServerError,
        RequestError::Unknown,
        "an unexpected error occurred",
    ))
}

pub fn catchers() -> Vec<Catcher> {
    catchers![malformed_body, invalid_body, not_found, internal]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_body_repeats_status_and_kind() {
        let (status, Json(body)) = bad_request(RequestError::MalformedBody, "bad");
        assert_eq!(status, Status::BadRequest);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error": {
                "code": 400,
                "description": "bad",
                "reason": "Bad Request",
                "status": "MALFORMED_BODY",
            }})
        );
    }

    #[test]
    fn unexpected_hides_the_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let (status, Json(body)) = unexpected(RequestError::Unknown, &cause);
        assert_eq!(status, Status::InternalServerError);
        assert!(!body.error.description.contains("connection reset"));
    }
}
