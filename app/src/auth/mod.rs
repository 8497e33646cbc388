//! Handles login and bearer tokens. A token is an HS256 JWT whose subject is the user id; the
//! server keeps no session state, so a token stays valid until it expires.

use crate::password::Credentials;
use crate::seconds::Seconds;
use crate::user::{self, AuthenticateError, Email, User, UserStore};
use chrono::{DateTime, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

mod entities;

pub use entities::Claims;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("token signing secret must not be empty")]
    EmptySecret,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{0}")]
    Authenticate(#[from] AuthenticateError),
    #[error("{0}")]
    Token(#[from] TokenError),
}

impl LoginError {
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(
            self,
            LoginError::Authenticate(AuthenticateError::InvalidCredentials)
        )
    }
}

/// Signs and verifies bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Seconds,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Tokens are valid for one hour.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Seconds::one_hour(),
        })
    }

    pub fn issue(&self, user_id: user::Id) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: user::Id,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: user_id.0.to_string(),
            iat,
            exp: iat + self.lifetime.0,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Returns the subject of a valid token.
    pub fn verify(&self, token: &str) -> Result<user::Id, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            },
        )?;
        Uuid::parse_str(&data.claims.sub)
            .map(user::Id)
            .map_err(|_| TokenError::Malformed)
    }
}

/// A successful login.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub async fn login<S: UserStore + ?Sized>(
    store: &S,
    credentials: &Credentials,
    issuer: &TokenIssuer,
    email: &Email,
    password: &str,
) -> Result<Session, LoginError> {
    let user = match user::authenticate(store, credentials, email, password).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, AuthenticateError::InvalidCredentials) {
                log::info!("rejected login attempt");
            }
            return Err(e.into());
        }
    };
    let token = issuer.issue(user.id)?;
    log::info!("user {:?} logged in", user.id);
    Ok(Session { user, token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStorage;
    use chrono::Duration;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret").unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(TokenIssuer::new(""), Err(ConfigError::EmptySecret)));
    }

    #[test]
    fn fresh_token_resolves_to_subject() {
        let issuer = issuer();
        let id = user::Id(Uuid::new_v4());
        let token = issuer.issue(id).unwrap();
        assert!(!token.is_empty());
        assert_eq!(issuer.verify(&token).unwrap(), id);
    }

    #[test]
    fn token_expires_after_one_hour() {
        let issuer = issuer();
        let id = user::Id(Uuid::new_v4());

        let almost = issuer
            .issue_at(id, Utc::now() - Duration::minutes(59))
            .unwrap();
        assert_eq!(issuer.verify(&almost).unwrap(), id);

        let expired = issuer
            .issue_at(id, Utc::now() - Duration::minutes(61))
            .unwrap();
        assert!(matches!(issuer.verify(&expired), Err(TokenError::Expired)));
    }

    #[test]
    fn claims_carry_one_hour_expiry() {
        let issuer = issuer();
        let issued_at = Utc::now();
        let token = issuer.issue_at(user::Id(Uuid::new_v4()), issued_at).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let claims = jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"ignored"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = TokenIssuer::new("another-secret").unwrap();
        let token = other.issue(user::Id(Uuid::new_v4())).unwrap();
        assert!(matches!(
            issuer().verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = issuer();
        assert!(matches!(issuer.verify(""), Err(TokenError::Malformed)));
        assert!(matches!(
            issuer.verify("not.a.token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(issuer.verify("abc"), Err(TokenError::Malformed)));
    }

    #[test]
    fn non_uuid_subject_is_malformed() {
        let claims = Claims {
            sub: "not-a-uuid".to_owned(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(issuer().verify(&token), Err(TokenError::Malformed)));
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let store = MemoryStorage::default();
        let credentials = Credentials::new(4);
        let email = Email("alice@x.com".to_owned());
        let user = user::register(&store, &credentials, "Alice".to_owned(), email.clone(), "pw123")
            .await
            .unwrap();

        let session = login(&store, &credentials, &issuer(), &email, "pw123")
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(issuer().verify(&session.token).unwrap(), user.id);

        let rejected = login(&store, &credentials, &issuer(), &email, "wrong")
            .await
            .unwrap_err();
        assert!(rejected.is_invalid_credentials());
        let unknown = login(
            &store,
            &credentials,
            &issuer(),
            &Email("bob@x.com".to_owned()),
            "pw123",
        )
        .await
        .unwrap_err();
        assert!(unknown.is_invalid_credentials());
        assert_eq!(rejected.to_string(), unknown.to_string());
    }
}
