//! The API response envelope and error-body flattening.
//!
//! Successful responses look like `{"success": true, "message": "...", "data": ...}`.
//! Error responses carry `detail` and/or `error` fields whose shape varies by
//! endpoint; [`flatten_error_body`] reduces them to one readable line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Error, GENERIC_ERROR_MESSAGE};

/// A decoded success envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Map the payload, keeping the message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            message: self.message,
            data: f(self.data),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

fn default_success() -> bool {
    true
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a 2xx response body.
    ///
    /// A body that is not JSON, not an object, or whose `data` does not match
    /// `T` is a [`Error::MalformedResponse`]. An envelope with
    /// `success: false` becomes an [`Error::Api`] carrying the server message.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::malformed(status, format!("invalid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(Error::malformed(status, "expected a JSON object"));
        }

        let raw: RawEnvelope = serde_json::from_value(value.clone())
            .map_err(|e| Error::malformed(status, format!("invalid envelope: {}", e)))?;

        if !raw.success {
            return Err(ApiError::new(status, error_code(&value), flatten_error_body(&value)).into());
        }

        let data = serde_json::from_value(raw.data)
            .map_err(|e| Error::malformed(status, format!("unexpected data: {}", e)))?;

        Ok(Self {
            success: raw.success,
            message: raw.message.unwrap_or_default(),
            data,
        })
    }
}

/// Build the [`ApiError`] for a non-2xx response body.
pub fn api_error(status: u16, reason: Option<&str>, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => ApiError::new(status, error_code(&value), flatten_error_body(&value)),
        Err(_) => {
            let message = match reason {
                Some(reason) => format!("Request failed ({} {})", status, reason),
                None => format!("Request failed ({})", status),
            };
            ApiError::new(status, None, message)
        }
    }
}

/// Extract a machine-readable error code, if present.
pub fn error_code(body: &Value) -> Option<String> {
    body.get("code")
        .or_else(|| body.get("detail").and_then(|d| d.get("code")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Reduce an error body to a single human-readable message.
///
/// Field-keyed validation messages (`{"detail": {"email": ["..."]}}`) and
/// validation lists (`{"detail": [{"msg": "..."}]}`) are joined with `". "`.
pub fn flatten_error_body(body: &Value) -> String {
    if let Some(detail) = body.get("detail") {
        if let Some(message) = flatten_detail(detail) {
            return message;
        }
    }

    ["error", "description", "message"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(non_empty_str)
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

fn flatten_detail(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => other.get("msg").and_then(non_empty_str),
                })
                .collect();
            join_messages(messages)
        }
        Value::Object(fields) => {
            let messages: Vec<String> = fields
                .values()
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(non_empty_str)
                .collect();
            join_messages(messages).or_else(|| {
                ["error", "message"]
                    .iter()
                    .filter_map(|key| fields.get(*key))
                    .find_map(non_empty_str)
            })
        }
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None")
        .map(str::to_string)
}

fn join_messages(messages: Vec<String>) -> Option<String> {
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(". "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn decodes_success_envelope() {
        let body = json!({"success": true, "message": "ok", "data": {"n": 3}}).to_string();
        let env: Envelope<Value> = Envelope::decode(200, body.as_bytes()).unwrap();
        assert_eq!(env.message, "ok");
        assert_eq!(env.data["n"], 3);
    }

    #[test]
    fn failed_envelope_is_api_error() {
        let body = json!({
            "success": false,
            "message": "Invalid token",
            "error": "Token verification failed"
        })
        .to_string();
        let err = Envelope::<Value>::decode(200, body.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.user_message(), "Token verification failed");
    }

    #[test]
    fn non_json_is_malformed() {
        let err = Envelope::<Value>::decode(200, b"<html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn wrong_data_shape_is_malformed() {
        let body = json!({"success": true, "message": "ok", "data": "text"}).to_string();
        let err = Envelope::<Vec<u32>>::decode(201, body.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { status: 201, .. }));
    }

    #[test]
    fn flattens_field_validation_messages() {
        let body = json!({
            "detail": {
                "email": ["Email is invalid"],
                "password": ["Too short", "Needs a digit"]
            }
        });
        assert_eq!(
            flatten_error_body(&body),
            "Email is invalid. Too short. Needs a digit"
        );
    }

    #[test]
    fn flattens_validation_list() {
        let body = json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "field required", "type": "missing"},
                {"loc": ["body", "password"], "msg": "field required", "type": "missing"}
            ]
        });
        assert_eq!(flatten_error_body(&body), "field required. field required");
    }

    #[test]
    fn uses_detail_error_from_response_message() {
        let body = json!({
            "detail": {
                "success_status": false,
                "message": "An error occurred during login",
                "error": "Login failed",
                "data": null
            }
        });
        assert_eq!(flatten_error_body(&body), "Login failed");
    }

    #[test]
    fn falls_back_through_error_description_default() {
        assert_eq!(flatten_error_body(&json!({"error": "Boom"})), "Boom");
        assert_eq!(
            flatten_error_body(&json!({"description": "Bad gateway"})),
            "Bad gateway"
        );
        assert_eq!(flatten_error_body(&json!({})), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn api_error_for_non_json_body() {
        let err = api_error(502, Some("Bad Gateway"), b"upstream down");
        assert_eq!(err.status, 502);
        assert_eq!(err.message, "Request failed (502 Bad Gateway)");
    }

    #[test]
    fn api_error_picks_up_code() {
        let err = api_error(
            401,
            None,
            json!({"code": "auth/unauthorized", "error": "x"}).to_string().as_bytes(),
        );
        assert!(err.is_unauthorized());
        assert_eq!(err.code.as_deref(), Some("auth/unauthorized"));
    }
}
