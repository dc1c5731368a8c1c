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
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING};
use reqwest::{Method, StatusCode, Url};
use serde::de::value::UnitDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::authenticator::{authenticator_from_config, Authenticator};
use super::gzip::gzip_body;
use super::request_builder::{PreparedRequest, RequestBuilder};
use super::retry::{retry_after, RetryPolicy};
use super::DetailedResponse;
use crate::service::{AdminConfig, AppError, AppResult, ServiceConfig};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP plumbing behind every admin operation: one client handle,
/// credentials, retry policy and body compression.
#[derive(Debug, Clone)]
pub struct BaseService {
    client: reqwest::Client,
    service_url: Url,
    authenticator: Arc<dyn Authenticator>,
    retry: RetryPolicy,
    gzip: bool,
    default_headers: HeaderMap,
}

impl BaseService {
    pub fn new(service_url: &str, authenticator: Arc<dyn Authenticator>) -> AppResult<Self> {
        let service = ServiceConfig::default();
        Self::build(
            service_url,
            authenticator,
            service.timeout(),
            DEFAULT_USER_AGENT,
        )
    }

    pub fn from_config(config: &AdminConfig) -> AppResult<Self> {
        let authenticator = authenticator_from_config(&config.auth)?;
        let user_agent = config
            .service
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);
        let mut service = Self::build(
            &config.service.url,
            authenticator,
            config.service.timeout(),
            user_agent,
        )?;
        service.retry = RetryPolicy::from_config(&config.retry);
        service.gzip = config.service.gzip;
        service.default_headers = header_map(&config.service.headers)?;
        Ok(service)
    }

    fn build(
        service_url: &str,
        authenticator: Arc<dyn Authenticator>,
        timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        let service_url = parse_service_url(service_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        debug!(
            url = %service_url,
            auth = authenticator.kind(),
            "admin service configured"
        );
        Ok(BaseService {
            client,
            service_url,
            authenticator,
            retry: RetryPolicy::default(),
            gzip: false,
            default_headers: HeaderMap::new(),
        })
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    pub fn set_service_url(&mut self, service_url: &str) -> AppResult<()> {
        self.service_url = parse_service_url(service_url)?;
        Ok(())
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn enable_retries(&mut self, max_retries: u32, max_retry_interval: Duration) {
        self.retry.enabled = true;
        self.retry.max_retries = max_retries;
        self.retry.max_retry_interval = max_retry_interval;
    }

    pub fn disable_retries(&mut self) {
        self.retry.enabled = false;
    }

    pub fn set_gzip(&mut self, enabled: bool) {
        self.gzip = enabled;
    }

    pub fn is_gzip(&self) -> bool {
        self.gzip
    }

    pub fn set_default_headers(&mut self, headers: HeaderMap) {
        self.default_headers = headers;
    }

    pub fn request_builder(&self, method: Method) -> RequestBuilder {
        RequestBuilder::new(method, self.service_url.clone())
    }

    /// Sends `request`, retrying per the policy, and unmarshals a 2xx body
    /// into `T`. Non-2xx answers become `AppError::Http`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: PreparedRequest,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<DetailedResponse<T>> {
        let (status, headers, body) = self.exchange(&request, cancel).await?;
        unmarshal(status, headers, &body)
    }

    /// Like [`BaseService::request`] for operations without a payload. The
    /// 2xx body is never parsed, so a plain text answer still succeeds. A
    /// non-empty body yields `T` built from a unit value, e.g. `NoContent`.
    pub async fn request_discarding_body<T: DeserializeOwned>(
        &self,
        request: PreparedRequest,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<DetailedResponse<T>> {
        let (status, headers, body) = self.exchange(&request, cancel).await?;
        let result = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let unit: UnitDeserializer<serde_json::Error> = ().into_deserializer();
            Some(<T as Deserialize>::deserialize(unit)?)
        };
        Ok(DetailedResponse {
            status_code: status.as_u16(),
            headers,
            result,
        })
    }

    /// The retry loop. Returns the first 2xx answer.
    async fn exchange(
        &self,
        request: &PreparedRequest,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<(StatusCode, HeaderMap, Bytes)> {
        // a caller supplied id is kept
        let correlation_id = request
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let body = match request.body.as_deref() {
            Some(body) if self.gzip => Some(Bytes::from(gzip_body(body)?)),
            Some(body) => Some(Bytes::copy_from_slice(body)),
            None => None,
        };

        let mut attempt = 0;
        loop {
            debug!(
                method = %request.method,
                url = %request.url,
                attempt,
                correlation_id = %correlation_id,
                "sending request"
            );
            let delay = match self
                .send_once(request, body.as_ref(), &correlation_id, cancel)
                .await
            {
                Ok((status, headers, bytes)) if status.is_success() => {
                    return Ok((status, headers, bytes));
                }
                Ok((status, headers, bytes)) => {
                    let delay = if RetryPolicy::is_retryable_status(status) {
                        self.retry.next_delay(attempt, retry_after(&headers))
                    } else {
                        None
                    };
                    match delay {
                        Some(delay) => {
                            warn!(
                                status = status.as_u16(),
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                "retrying admin request"
                            );
                            delay
                        }
                        None => return Err(AppError::from_response(status, &bytes)),
                    }
                }
                Err(AppError::Transport(err)) if is_retryable_transport(&err) => {
                    match self.retry.next_delay(attempt, None) {
                        Some(delay) => {
                            warn!(
                                error = %err,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                "retrying admin request"
                            );
                            delay
                        }
                        None => return Err(AppError::Transport(err)),
                    }
                }
                Err(err) => return Err(err),
            };
            wait(delay, cancel).await?;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        request: &PreparedRequest,
        body: Option<&Bytes>,
        correlation_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<(StatusCode, HeaderMap, Bytes)> {
        // per-call headers replace defaults and the generated correlation id
        let mut headers = self.default_headers.clone();
        headers.insert(
            CORRELATION_ID_HEADER,
            HeaderValue::from_str(correlation_id)
                .map_err(|e| AppError::Validation(format!("{CORRELATION_ID_HEADER}: {e}")))?,
        );
        headers.extend(request.headers.clone());
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers);
        if let Some(body) = body {
            if self.gzip {
                builder = builder.header(CONTENT_ENCODING, "gzip");
            }
            builder = builder.body(body.clone());
        }
        let builder = self.authenticator.authenticate(builder)?;

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response.bytes().await?;
            trace!(
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&bytes),
                "received response"
            );
            Ok::<_, AppError>((status, headers, bytes))
        };

        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(AppError::Cancelled),
                result = exchange => result,
            },
            None => exchange.await,
        }
    }
}

fn unmarshal<T: DeserializeOwned>(
    status: StatusCode,
    headers: HeaderMap,
    body: &[u8],
) -> AppResult<DetailedResponse<T>> {
    let result = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(serde_json::from_slice(body)?)
    };
    Ok(DetailedResponse {
        status_code: status.as_u16(),
        headers,
        result,
    })
}

async fn wait(delay: Duration, cancel: Option<&CancellationToken>) -> AppResult<()> {
    match cancel {
        Some(token) => tokio::select! {
            _ = token.cancelled() => Err(AppError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        },
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

fn parse_service_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw).map_err(|e| AppError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(AppError::InvalidUrl(format!(
            "{raw}: expected an http or https url"
        )));
    }
    Ok(url)
}

fn header_map(headers: &HashMap<String, String>) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Validation(format!("header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Validation(format!("header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;
    use crate::base::NoAuthAuthenticator;
    use crate::service::RetryConfig;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Status {
        status: String,
    }

    #[rstest]
    #[case("http://localhost:8080")]
    #[case("https://admin.example.net/base/")]
    fn test_accepts_http_urls(#[case] url: &str) {
        assert!(BaseService::new(url, Arc::new(NoAuthAuthenticator)).is_ok());
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://files.example.net")]
    #[case("mailto:ops@example.net")]
    fn test_rejects_bad_urls(#[case] url: &str) {
        let err = BaseService::new(url, Arc::new(NoAuthAuthenticator)).unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));
    }

    #[test]
    fn test_from_config_applies_knobs() {
        let mut config = AdminConfig::default();
        config.service.gzip = true;
        config
            .service
            .headers
            .insert("X-Tenant".to_string(), "blue".to_string());
        config.retry = RetryConfig {
            enabled: true,
            max_retries: 7,
            ..RetryConfig::default()
        };
        let service = BaseService::from_config(&config).unwrap();
        assert!(service.is_gzip());
        assert!(service.retry_policy().enabled);
        assert_eq!(service.retry_policy().max_retries, 7);
        assert_eq!(service.default_headers["x-tenant"], "blue");
    }

    #[test]
    fn test_knob_setters() {
        let mut service =
            BaseService::new("http://localhost:8080", Arc::new(NoAuthAuthenticator)).unwrap();
        service.enable_retries(3, Duration::from_secs(5));
        assert!(service.retry_policy().enabled);
        assert_eq!(service.retry_policy().max_retry_interval, Duration::from_secs(5));
        service.disable_retries();
        assert!(!service.retry_policy().enabled);

        service.set_service_url("https://other.example.net").unwrap();
        assert_eq!(service.service_url().as_str(), "https://other.example.net/");
        assert!(service.set_service_url("::").is_err());
    }

    #[test]
    fn test_unmarshal_empty_and_json() {
        let empty: DetailedResponse<Status> =
            unmarshal(StatusCode::ACCEPTED, HeaderMap::new(), b"  \n").unwrap();
        assert_eq!(empty.status_code, 202);
        assert!(empty.result().is_none());

        let parsed: DetailedResponse<Status> = unmarshal(
            StatusCode::OK,
            HeaderMap::new(),
            br#"{"status":"available","extra":1}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_result().unwrap().status, "available");

        let err = unmarshal::<Status>(StatusCode::OK, HeaderMap::new(), b"not json").unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }
}
