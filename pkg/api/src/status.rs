//! Kubernetes-style `Status` bodies for negative responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub kind: String,
    pub api_version: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub code: u16,
}

fn failure(code: StatusCode, reason: &str, message: String) -> Response {
    let body = Status {
        kind: "Status".to_string(),
        api_version: "v1".to_string(),
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code: code.as_u16(),
    };
    (code, Json(body)).into_response()
}

pub fn not_found(kind: &str, name: &str) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        "NotFound",
        format!("{} \"{}\" not found", kind, name),
    )
}

pub fn method_not_allowed(message: &str) -> Response {
    failure(
        StatusCode::METHOD_NOT_ALLOWED,
        "MethodNotAllowed",
        message.to_string(),
    )
}

pub fn bad_request(message: String) -> Response {
    failure(StatusCode::BAD_REQUEST, "BadRequest", message)
}

pub fn internal_error(message: String) -> Response {
    failure(StatusCode::INTERNAL_SERVER_ERROR, "InternalError", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_shape() {
        let body = Status {
            kind: "Status".into(),
            api_version: "v1".into(),
            status: "Failure".into(),
            message: "accessiblenamespaces \"ghost\" not found".into(),
            reason: "NotFound".into(),
            code: 404,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"apiVersion\":\"v1\""));
        assert!(json.contains("\"code\":404"));
        let parsed: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.reason, "NotFound");
    }
}
