pub mod auth;
pub mod database;
pub mod ledger;
pub mod password;
pub mod seconds;
pub mod user;

pub use password::Credentials;
