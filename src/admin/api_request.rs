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
use std::fmt::Debug;

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::base::RequestBuilder;
use crate::service::{AppError, AppResult};

/// Extra headers carried by every options struct.
pub trait RequestHeaders {
    fn headers(&self) -> &HashMap<String, String>;

    fn headers_mut(&mut self) -> &mut HashMap<String, String>;

    fn set_headers(mut self, headers: HashMap<String, String>) -> Self
    where
        Self: Sized,
    {
        *self.headers_mut() = headers;
        self
    }

    fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.headers_mut().insert(name.into(), value.into());
        self
    }
}

/// One admin operation: its verb, how its options map onto the request,
/// and the shape of its JSON response.
pub trait ApiRequest: RequestHeaders + Debug + Send + Sync {
    type Response: DeserializeOwned + Send + 'static;

    const OPERATION: &'static str;

    /// Set by operations whose success carries no payload; their response
    /// body is never parsed.
    const DISCARDS_BODY: bool = false;

    fn method(&self) -> Method;

    /// Checked before anything is sent.
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder>;
}

macro_rules! request_headers {
    ($($options:ty),* $(,)?) => {
        $(
            impl $crate::admin::RequestHeaders for $options {
                fn headers(&self) -> &::std::collections::HashMap<String, String> {
                    &self.headers
                }

                fn headers_mut(&mut self) -> &mut ::std::collections::HashMap<String, String> {
                    &mut self.headers
                }
            }
        )*
    };
}
pub(crate) use request_headers;

pub(crate) fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: Option<i64>) -> AppResult<()> {
    match value {
        Some(v) if v < 1 => Err(AppError::Validation(format!(
            "{field} must be at least 1, got {v}"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn require_non_negative(field: &str, value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::Validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("orders", true)]
    #[case("", false)]
    #[case("   ", false)]
    fn test_require_non_empty(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(require_non_empty("topic_name", value).is_ok(), ok);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(1), true)]
    #[case(Some(0), false)]
    #[case(Some(-3), false)]
    fn test_require_positive(#[case] value: Option<i64>, #[case] ok: bool) {
        assert_eq!(require_positive("partitions", value).is_ok(), ok);
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("broker_id", 0).is_ok());
        let err = require_non_negative("broker_id", -1).unwrap_err();
        assert!(err.to_string().contains("broker_id"));
    }
}
