//! This library contains definitions for the API layer.

use std::sync::Arc;

use app::{auth::TokenIssuer, database::Storage, Credentials};
use rocket::{Build, Rocket};
use state::RocketState;

mod cors;
mod error;
mod routes;
mod state;

pub fn register(
    rocket: Rocket<Build>,
    storage: Arc<dyn Storage>,
    credentials: Credentials,
    tokens: TokenIssuer,
) -> Rocket<Build> {
    routes::register(
        rocket,
        RocketState {
            storage,
            credentials,
            tokens,
        },
    )
}
