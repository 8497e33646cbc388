use std::sync::Arc;

use app::{auth::TokenIssuer, database::Storage, Credentials};

pub struct RocketState {
    pub storage: Arc<dyn Storage>,
    pub credentials: Credentials,
    pub tokens: TokenIssuer,
}
