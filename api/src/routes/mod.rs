//! Add top-level routes as submodules here.

use crate::{cors::Cors, error, state::RocketState};
use rocket::{Build, Rocket};
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{make_swagger_ui, DefaultModelRendering, SwaggerUIConfig},
};
use serde_json::Value;

mod transactions;
mod user;

/// Reads a request field that holds text. Numbers and booleans are taken as their JSON text and
/// `null` counts as absent. Arrays and objects are handed back as the error.
fn text_field(value: Option<Value>) -> Result<Option<String>, Value> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(scalar.to_string())),
        Some(other) => Err(other),
    }
}

pub fn register(rocket: Rocket<Build>, state: RocketState) -> Rocket<Build> {
    let rocket = rocket
        .manage(state)
        .attach(Cors)
        .register("/", error::catchers());
    let rocket = rocket.mount(
        "/",
        openapi_get_routes![
            user::signup,
            user::login,
            transactions::list,
            transactions::send_payment,
            transactions::receive_payment,
        ],
    );
    mount_swagger(rocket)
}

pub fn mount_swagger(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/swagger",
        make_swagger_ui(&SwaggerUIConfig {
            url: "../openapi.json".to_owned(),
            default_model_rendering: DefaultModelRendering::Model,
            show_extensions: true,
            ..Default::default()
        }),
    )
}
