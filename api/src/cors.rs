//! Permissive CORS: any origin may call the API, and preflight requests are answered directly.

use rocket::{
    async_trait,
    fairing::{Fairing, Info, Kind},
    http::{Header, Method, Status},
    Request, Response,
};
use std::io::Cursor;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

pub struct Cors;

#[async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        if req.method() != Method::Options {
            return;
        }
        res.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        if let Some(headers) = req.headers().get_one("Access-Control-Request-Headers") {
            res.set_header(Header::new(
                "Access-Control-Allow-Headers",
                headers.to_owned(),
            ));
        }
        res.set_status(Status::NoContent);
        res.set_sized_body(0, Cursor::new(""));
    }
}
