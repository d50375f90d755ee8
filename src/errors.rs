use hyper::StatusCode;
use serde_json;
use validator::ValidationErrors;

use http::errors::{Codeable, PayloadCarrier};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Parse error")]
    Parse,
    #[fail(display = "Validation error")]
    Validate(ValidationErrors),
    #[fail(display = "{}", _0)]
    Conflict(String),
    #[fail(display = "Session is missing, invalid or expired")]
    Unauthorized,
    #[fail(display = "Server is refusing to fullfil the request")]
    Forbidden,
    #[fail(display = "R2D2 connection error")]
    Connection,
}

impl Codeable for Error {
    fn code(&self) -> StatusCode {
        match *self {
            Error::NotFound => StatusCode::NotFound,
            Error::Validate(_) => StatusCode::BadRequest,
            Error::Parse => StatusCode::UnprocessableEntity,
            Error::Conflict(_) => StatusCode::Conflict,
            Error::Unauthorized => StatusCode::Unauthorized,
            Error::Forbidden => StatusCode::Forbidden,
            Error::Connection => StatusCode::InternalServerError,
        }
    }
}

impl PayloadCarrier for Error {
    fn payload(&self) -> Option<serde_json::Value> {
        match *self {
            Error::Validate(ref e) => serde_json::to_value(e).ok(),
            _ => None,
        }
    }
}
