use std::sync::Arc;

use anyhow::Context;
use app::auth::TokenIssuer;
use app::database::{self, run_migrations, MemoryStorage, Storage};
use app::{password, Credentials};
use rocket::figment::{providers::Env, Figment};
use rocket::{Build, Rocket};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct Config {
    database_url: Url,
    jwt_secret: String,
    #[serde(default = "default_bcrypt_cost")]
    bcrypt_cost: u32,
}

fn default_bcrypt_cost() -> u32 {
    password::DEFAULT_COST
}

/// Rocket's own sources, plus the unprefixed variables the service has always been deployed with.
fn figment() -> Figment {
    rocket::Config::figment().merge(Env::raw().only(&[
        "port",
        "database_url",
        "jwt_secret",
        "bcrypt_cost",
    ]))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let rocket = start_server().await?;
    let _ = rocket.launch().await?;
    Ok(())
}

async fn start_server() -> anyhow::Result<Rocket<Build>> {
    let rocket = Rocket::custom(figment());
    let config: Config = rocket
        .figment()
        .extract()
        .context("invalid configuration")?;

    let tokens = TokenIssuer::new(&config.jwt_secret).context("invalid JWT_SECRET")?;
    let credentials = Credentials::new(config.bcrypt_cost);
    let storage = open_storage(&config.database_url).await?;

    #[cfg(debug_assertions)]
    database::seed_development_data(&*storage, &credentials)
        .await
        .context("failed to seed development data")?;

    Ok(api::register(rocket, storage, credentials, tokens))
}

async fn open_storage(url: &Url) -> anyhow::Result<Arc<dyn Storage>> {
    if url.scheme() == "memory" {
        log::warn!("using in-memory storage, all data is lost on shutdown");
        return Ok(Arc::new(MemoryStorage::default()));
    }
    let db = database::connect(url)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&db)
        .await
        .context("failed to run migrations")?;
    log::info!("connected to database at {}", url.host_str().unwrap_or("localhost"));
    Ok(Arc::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::{
        error::Kind,
        providers::{Format, Toml},
    };

    fn profile(name: &str) -> Figment {
        Figment::from(Toml::file("Rocket.toml").nested())
            .join(("jwt_secret", "test-secret"))
            .select(name)
    }

    #[test]
    fn debug_profile_runs_on_memory_storage() {
        let config: Config = profile("debug").extract().unwrap();
        assert_eq!(config.database_url.scheme(), "memory");
        assert_eq!(config.bcrypt_cost, password::DEFAULT_COST);
    }

    #[test]
    fn release_profile_requires_a_database_url() {
        let err = profile("release").extract::<Config>().unwrap_err();
        assert!(
            matches!(err.kind, Kind::MissingField(ref field) if field == "database_url"),
            "unexpected error: {}",
            err
        );
    }
}
