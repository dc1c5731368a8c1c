// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use reqwest::StatusCode;
use serde_json::Value;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// request options rejected before any I/O
    #[error("parameter validation error: {0}")]
    Validation(String),

    #[error("invalid service url: {0}")]
    InvalidUrl(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    /// non-2xx response from the admin api
    #[error("http {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("config file error: {0}")]
    ConfigFileError(#[from] config::ConfigError),
}

impl AppError {
    /// Builds an `Http` error from a failed response, pulling the most
    /// specific message the service put in the body.
    pub fn from_response(status: StatusCode, body: &[u8]) -> AppError {
        let text = String::from_utf8_lossy(body).into_owned();
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|json| error_message(&json))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            });
        AppError::Http {
            status: status.as_u16(),
            message,
            body: if text.is_empty() { None } else { Some(text) },
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            AppError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn error_message(json: &Value) -> Option<String> {
    if let Some(message) = json
        .get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }
    ["error", "message", "errorMessage"]
        .iter()
        .find_map(|key| json.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r#"{"errors":[{"code":"topic_exists","message":"topic already exists"}]}"#, "topic already exists")]
    #[case(r#"{"error":"quota not found"}"#, "quota not found")]
    #[case(r#"{"message":"bad partition count"}"#, "bad partition count")]
    #[case(r#"{"errorMessage":"broker offline"}"#, "broker offline")]
    #[case(r#"{"error":"first","message":"second"}"#, "first")]
    fn test_message_from_body(#[case] body: &str, #[case] expected: &str) {
        let err = AppError::from_response(StatusCode::BAD_REQUEST, body.as_bytes());
        match err {
            AppError::Http {
                status, message, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_message_falls_back_to_reason() {
        let err = AppError::from_response(StatusCode::NOT_FOUND, b"<html>nope</html>");
        assert_eq!(err.to_string(), "http 404: Not Found");
        assert_eq!(err.status_code(), Some(404));
        match err {
            AppError::Http { body, .. } => assert_eq!(body.as_deref(), Some("<html>nope</html>")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_has_no_text() {
        let err = AppError::from_response(StatusCode::SERVICE_UNAVAILABLE, b"");
        match err {
            AppError::Http { body, message, .. } => {
                assert!(body.is_none());
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_has_no_status() {
        let err = AppError::Validation("topic_name must not be empty".to_string());
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("topic_name"));
    }
}
