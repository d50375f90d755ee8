//! Turning a `failure::Error` chain into an http status and an error body.
use failure::{Context, Error as FailureError, Fail};
use hyper::StatusCode;
use serde_json;

/// Errors that know which http status they stand for
pub trait Codeable {
    fn code(&self) -> StatusCode;
}

/// Errors that carry structured details for the client, e.g. field-level validation messages
pub trait PayloadCarrier {
    fn payload(&self) -> Option<serde_json::Value>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Looks for the first `E` in the cause chain, either raw or attached as a context.
pub fn find_in_chain<E: Fail>(err: &FailureError) -> Option<&E> {
    err.iter_chain().filter_map(|cause| {
        cause
            .downcast_ref::<E>()
            .or_else(|| cause.downcast_ref::<Context<E>>().map(|ctx| ctx.get_context()))
    }).next()
}

/// Status and body for an error. Anything without a known kind is an internal error.
pub fn describe<E>(err: &FailureError) -> (StatusCode, ErrorMessage)
where
    E: Fail + Codeable + PayloadCarrier,
{
    match find_in_chain::<E>(err) {
        Some(kind) => {
            let code = kind.code();
            let message = if code == StatusCode::InternalServerError {
                "Internal server error".to_string()
            } else {
                kind.to_string()
            };
            (
                code,
                ErrorMessage {
                    message,
                    details: kind.payload(),
                },
            )
        }
        None => (
            StatusCode::InternalServerError,
            ErrorMessage {
                message: "Internal server error".to_string(),
                details: None,
            },
        ),
    }
}

/// Whole cause chain in one line, for logs
pub fn chain_to_string(err: &FailureError) -> String {
    err.iter_chain().map(|cause| cause.to_string()).collect::<Vec<String>>().join(" | ")
}
