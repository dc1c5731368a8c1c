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

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Serialize;

use crate::service::{AppError, AppResult};

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A fully resolved request. Holds the body as bytes so a retry can replay it.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    pub fn new(method: Method, service_url: Url) -> Self {
        RequestBuilder {
            method,
            url: service_url,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Appends `template` to the service url, replacing each `{name}` segment
    /// with the matching value encoded as a single path segment.
    pub fn resolve_path(mut self, template: &str, params: &[(&str, &str)]) -> AppResult<Self> {
        let mut segments = Vec::new();
        for segment in template.split('/').filter(|s| !s.is_empty()) {
            match segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            {
                Some(name) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            AppError::Validation(format!("missing path parameter: {name}"))
                        })?;
                    if value.is_empty() {
                        return Err(AppError::Validation(format!(
                            "path parameter {name} must not be empty"
                        )));
                    }
                    segments.push(value);
                }
                None => segments.push(segment),
            }
        }

        let service_url = self.url.to_string();
        self.url
            .path_segments_mut()
            .map_err(|_| AppError::InvalidUrl(service_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(self)
    }

    pub fn add_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn add_query_opt<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.add_query(name, value),
            None => self,
        }
    }

    pub fn add_header(mut self, name: &str, value: &str) -> AppResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Validation(format!("header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Validation(format!("header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn add_headers(self, headers: &HashMap<String, String>) -> AppResult<Self> {
        headers
            .iter()
            .try_fold(self, |builder, (name, value)| builder.add_header(name, value))
    }

    pub fn accept_json(mut self) -> Self {
        self.headers
            .insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        self
    }

    pub fn with_json_body<T: Serialize + ?Sized>(mut self, body: &T) -> AppResult<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        Ok(self)
    }

    pub fn build(self) -> PreparedRequest {
        let mut url = self.url;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        PreparedRequest {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn builder(method: Method, base: &str) -> RequestBuilder {
        RequestBuilder::new(method, Url::parse(base).unwrap())
    }

    #[rstest]
    #[case("http://localhost:8080", "http://localhost:8080/admin/topics/orders")]
    #[case("http://localhost:8080/", "http://localhost:8080/admin/topics/orders")]
    #[case("https://host/api/v1/", "https://host/api/v1/admin/topics/orders")]
    fn test_resolve_path_joins_base(#[case] base: &str, #[case] expected: &str) {
        let request = builder(Method::GET, base)
            .resolve_path("/admin/topics/{topic_name}", &[("topic_name", "orders")])
            .unwrap()
            .build();
        assert_eq!(request.url.as_str(), expected);
    }

    #[rstest]
    #[case("a/b", "/admin/topics/a%2Fb/records")]
    #[case("my topic", "/admin/topics/my%20topic/records")]
    #[case("q?x", "/admin/topics/q%3Fx/records")]
    fn test_path_params_are_encoded(#[case] name: &str, #[case] expected_path: &str) {
        let request = builder(Method::DELETE, "http://localhost")
            .resolve_path("/admin/topics/{topic_name}/records", &[("topic_name", name)])
            .unwrap()
            .build();
        assert_eq!(request.url.path(), expected_path);
    }

    #[test]
    fn test_empty_path_param_rejected() {
        let err = builder(Method::GET, "http://localhost")
            .resolve_path("/admin/quotas/{entity_name}", &[("entity_name", "")])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_missing_path_param_rejected() {
        let err = builder(Method::GET, "http://localhost")
            .resolve_path("/admin/brokers/{broker_id}", &[])
            .unwrap_err();
        assert!(err.to_string().contains("broker_id"));
    }

    #[test]
    fn test_query_and_headers() {
        let request = builder(Method::GET, "http://localhost")
            .resolve_path("/admin/topics", &[])
            .unwrap()
            .add_query("topic_filter", "ord*")
            .add_query_opt("per_page", Some(20))
            .add_query_opt::<i64>("page", None)
            .accept_json()
            .add_header("X-Trace", "t-1")
            .unwrap()
            .build();
        assert_eq!(request.url.query(), Some("topic_filter=ord*&per_page=20"));
        assert_eq!(request.headers[ACCEPT], JSON_MEDIA_TYPE);
        assert_eq!(request.headers["x-trace"], "t-1");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_bad_header_rejected() {
        let err = builder(Method::GET, "http://localhost")
            .add_header("bad header", "v")
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_json_body() {
        let request = builder(Method::POST, "http://localhost")
            .with_json_body(&json!({"name": "orders", "partitions": 3}))
            .unwrap()
            .build();
        assert_eq!(request.headers[CONTENT_TYPE], JSON_MEDIA_TYPE);
        let body: serde_json::Value = serde_json::from_slice(&request.body.unwrap()).unwrap();
        assert_eq!(body["partitions"], 3);
    }
}
