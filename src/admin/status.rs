use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api_request::request_headers;
use super::ApiRequest;
use crate::base::{NoContent, RequestBuilder};
use crate::service::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStatus {
    /// e.g. `available`, `degraded`, `unavailable`
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GetStatusOptions {
    pub headers: HashMap<String, String>,
}

impl GetStatusOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for GetStatusOptions {
    type Response = InstanceStatus;

    const OPERATION: &'static str = "get_status";

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path("/admin/status", &[])
    }
}

/// Liveness probe; any 2xx means the admin endpoint is up.
#[derive(Debug, Clone, Default)]
pub struct AliveOptions {
    pub headers: HashMap<String, String>,
}

impl AliveOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for AliveOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "alive";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path("/alive", &[])
    }
}

request_headers!(GetStatusOptions, AliveOptions);
