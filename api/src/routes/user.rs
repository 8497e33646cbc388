//! Routes for registering and logging in.

use app::{
    auth,
    user::{self, AuthenticateError, RegisterError},
};
use chrono::{DateTime, Utc};
use rocket::{http::Status, post, serde::json::Json, State};
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
pub(super) struct SignupRequest {
    /// Display name.
    name: Option<Value>,
    /// Email address, unique across all users.
    email: Option<Value>,
    /// Plaintext password. Only its hash is stored.
    password: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct LoginRequest {
    email: Option<Value>,
    password: Option<Value>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct UserModel {
    /// Unique user identifier.
    id: Uuid,
    name: String,
    email: String,
    /// Registration time.
    created_at: DateTime<Utc>,
}

impl UserModel {
    fn from_entity(user: &user::User) -> Self {
        Self {
            id: user.id.0,
            name: user.name.clone(),
            email: user.email.0.clone(),
            created_at: user.created,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct SignupResponse {
    message: &'static str,
    user: UserModel,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct LoginResponse {
    message: &'static str,
    /// Bearer token, valid for one hour.
    token: String,
}

/// Error during registration.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum SignupError {
    /// Unexpected error, please try again later.
    Unknown,
    /// A required field is missing, empty or not text.
    InvalidInput,
    /// A user with this email already exists.
    DuplicateEmail,
}

/// Error during login.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum LoginError {
    /// Unexpected error, please try again later.
    Unknown,
    /// A required field is missing or not text.
    InvalidInput,
    /// Email and password do not match a registered user.
    InvalidCredentials,
}

fn required<E>(value: Option<Value>, field: &str, error: E) -> Result<String, JsonError<E>>
where
    E: Serialize,
{
    match super::text_field(value) {
        Ok(Some(text)) => Ok(text),
        Ok(None) => Err(error::bad_request(error, format!("`{}` is required", field))),
        Err(other) => Err(error::bad_request(
            error,
            format!("`{}` must be text, got {}", field, other),
        )),
    }
}

/// Register a new user.
#[openapi(tag = "User")]
#[post("/signup", data = "<req>")]
pub(super) async fn signup(
    state: &State<RocketState>,
    req: Json<SignupRequest>,
) -> Result<(Status, Json<SignupResponse>), JsonError<SignupError>> {
    let req = req.into_inner();
    let name = required(req.name, "name", SignupError::InvalidInput)?;
    let email = required(req.email, "email", SignupError::InvalidInput)?;
    let password = required(req.password, "password", SignupError::InvalidInput)?;
    if email.is_empty() {
        return Err(error::bad_request(
            SignupError::InvalidInput,
            "`email` must not be empty",
        ));
    }

    user::register(
        &*state.storage,
        &state.credentials,
        name,
        user::Email(email),
        &password,
    )
    .await
    .map(|user| {
        (
            Status::Created,
            Json(SignupResponse {
                message: "User created",
                user: UserModel::from_entity(&user),
            }),
        )
    })
    .map_err(|e| match e {
        RegisterError::DuplicateEmail(message) => {
            error::bad_request(SignupError::DuplicateEmail, message)
        }
        RegisterError::Hash(ref inner) => error::unexpected(SignupError::Unknown, inner),
        RegisterError::Storage(ref inner) => error::unexpected(SignupError::Unknown, inner),
    })
}

/// Log in with email and password to obtain a bearer token.
#[openapi(tag = "User")]
#[post("/login", data = "<req>")]
pub(super) async fn login(
    state: &State<RocketState>,
    req: Json<LoginRequest>,
) -> JsonResult<LoginResponse, LoginError> {
    let req = req.into_inner();
    let email = required(req.email, "email", LoginError::InvalidInput)?;
    let password = required(req.password, "password", LoginError::InvalidInput)?;

    auth::login(
        &*state.storage,
        &state.credentials,
        &state.tokens,
        &user::Email(email),
        &password,
    )
    .await
    .map(|session| {
        Json(LoginResponse {
            message: "Login successful",
            token: session.token,
        })
    })
    .map_err(|e| match e {
        auth::LoginError::Authenticate(AuthenticateError::InvalidCredentials) => {
            error::unauthorized(LoginError::InvalidCredentials, "Invalid credentials")
        }
        auth::LoginError::Authenticate(ref inner) => error::unexpected(LoginError::Unknown, inner),
        auth::LoginError::Token(ref inner) => error::unexpected(LoginError::Unknown, inner),
    })
}
