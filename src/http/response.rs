//! Response envelope: `{"success": true, "data": ..}` or `{"success": false, "error": {..}}`
use failure::Error as FailureError;
use hyper::header::ContentLength;
use hyper::server::Response;
use hyper::StatusCode;
use serde::ser::Serialize;
use serde_json;

use super::errors::ErrorMessage;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorMessage>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failed(error: ErrorMessage) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Plain response with an explicit content type
pub fn response_with_body(code: StatusCode, content_type: &str, body: String) -> Response {
    let mut response = Response::new().with_status(code).with_header(ContentLength(body.len() as u64));
    response.headers_mut().set_raw("Content-Type", content_type.to_string());
    response.with_body(body)
}

/// Successful JSON response wrapped into the envelope
pub fn envelope_response<T: Serialize>(data: T) -> Result<Response, FailureError> {
    let body = serde_json::to_string(&Envelope::ok(data))?;
    Ok(response_with_body(StatusCode::Ok, JSON_CONTENT_TYPE, body))
}

/// Failed JSON response wrapped into the envelope
pub fn error_response(code: StatusCode, error: ErrorMessage) -> Response {
    let body = serde_json::to_string(&Envelope::failed(error))
        .unwrap_or_else(|_| r#"{"success":false,"error":{"message":"Internal server error"}}"#.to_string());
    response_with_body(code, JSON_CONTENT_TYPE, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error() {
        let body = serde_json::to_value(&Envelope::ok(vec![1, 2])).unwrap();
        assert_eq!(body, json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_failed_envelope_omits_data() {
        let body = serde_json::to_value(&Envelope::failed(ErrorMessage {
            message: "Not found".to_string(),
            details: None,
        })).unwrap();
        assert_eq!(body, json!({"success": false, "error": {"message": "Not found"}}));
    }
}
