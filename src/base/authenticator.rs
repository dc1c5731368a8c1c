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

use std::fmt::Debug;
use std::sync::Arc;

use crate::service::{AppError, AppResult, AuthConfig, AuthKind};

/// Username the service expects when an API key is sent over basic auth.
pub const API_KEY_USERNAME: &str = "token";

/// Attaches credentials to every outgoing attempt.
pub trait Authenticator: Send + Sync + Debug {
    fn authenticate(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::RequestBuilder>;

    fn kind(&self) -> &'static str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuthAuthenticator;

impl Authenticator for NoAuthAuthenticator {
    fn authenticate(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::RequestBuilder> {
        Ok(request)
    }

    fn kind(&self) -> &'static str {
        "noauth"
    }
}

#[derive(Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> AppResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Authentication(
                "basic auth requires both username and password".to_string(),
            ));
        }
        Ok(BasicAuthenticator { username, password })
    }

    pub fn from_api_key(api_key: impl Into<String>) -> AppResult<Self> {
        Self::new(API_KEY_USERNAME, api_key)
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Authenticator for BasicAuthenticator {
    fn authenticate(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::RequestBuilder> {
        Ok(request.basic_auth(&self.username, Some(&self.password)))
    }

    fn kind(&self) -> &'static str {
        "basic"
    }
}

#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> AppResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(AppError::Authentication(
                "bearer token must not be empty".to_string(),
            ));
        }
        Ok(BearerTokenAuthenticator { token })
    }
}

impl Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"***")
            .finish()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn authenticate(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::RequestBuilder> {
        Ok(request.bearer_auth(&self.token))
    }

    fn kind(&self) -> &'static str {
        "bearer"
    }
}

pub fn authenticator_from_config(config: &AuthConfig) -> AppResult<Arc<dyn Authenticator>> {
    fn required<'a>(value: &'a Option<String>, field: &str, kind: &str) -> AppResult<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Authentication(format!("{kind} auth requires {field}")))
    }

    let authenticator: Arc<dyn Authenticator> = match config.kind {
        AuthKind::None => Arc::new(NoAuthAuthenticator),
        AuthKind::Basic => Arc::new(BasicAuthenticator::new(
            required(&config.username, "username", "basic")?,
            required(&config.password, "password", "basic")?,
        )?),
        AuthKind::Bearer => Arc::new(BearerTokenAuthenticator::new(required(
            &config.token,
            "token",
            "bearer",
        )?)?),
        AuthKind::ApiKey => Arc::new(BasicAuthenticator::from_api_key(required(
            &config.api_key,
            "api_key",
            "api_key",
        )?)?),
    };
    Ok(authenticator)
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::*;

    fn authorization(authenticator: &dyn Authenticator) -> Option<String> {
        let builder = reqwest::Client::new().get("http://localhost/admin/status");
        let request = authenticator.authenticate(builder).unwrap().build().unwrap();
        request
            .headers()
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_bearer_header() {
        let auth = BearerTokenAuthenticator::new("abc.def").unwrap();
        assert_eq!(authorization(&auth).as_deref(), Some("Bearer abc.def"));
    }

    #[test]
    fn test_api_key_uses_token_user() {
        let auth = BasicAuthenticator::from_api_key("key123").unwrap();
        assert_eq!(auth.username(), "token");
        // base64("token:key123")
        assert_eq!(
            authorization(&auth).as_deref(),
            Some("Basic dG9rZW46a2V5MTIz")
        );
    }

    #[test]
    fn test_no_auth_leaves_request_alone() {
        assert_eq!(authorization(&NoAuthAuthenticator), None);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = BasicAuthenticator::new("admin", "hunter2").unwrap();
        let printed = format!("{auth:?}");
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_from_config() {
        let mut config = AuthConfig {
            kind: AuthKind::Bearer,
            ..AuthConfig::default()
        };
        assert!(matches!(
            authenticator_from_config(&config),
            Err(AppError::Authentication(_))
        ));

        config.token = Some("tok".to_string());
        assert_eq!(authenticator_from_config(&config).unwrap().kind(), "bearer");

        let config = AuthConfig {
            kind: AuthKind::ApiKey,
            api_key: Some("k".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(authenticator_from_config(&config).unwrap().kind(), "basic");

        assert_eq!(
            authenticator_from_config(&AuthConfig::default())
                .unwrap()
                .kind(),
            "noauth"
        );
    }
}
