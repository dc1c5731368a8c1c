use reqwest::header::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Status, headers and the unmarshalled body of one admin call.
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    pub status_code: u16,
    pub headers: HeaderMap,
    /// `None` when the service answered with an empty body
    pub result: Option<T>,
}

impl<T> DetailedResponse<T> {
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Result type of operations that return no payload. Accepts and discards
/// whatever body the service may still send.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoContent;

impl<'de> Deserialize<'de> for NoContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_content_ignores_body() {
        let parsed: NoContent = serde_json::from_str(r#"{"accepted":true}"#).unwrap();
        assert_eq!(parsed, NoContent);
        let parsed: NoContent = serde_json::from_str("[]").unwrap();
        assert_eq!(parsed, NoContent);
    }
}
