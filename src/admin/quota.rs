use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api_request::{request_headers, require_non_empty, require_positive};
use super::ApiRequest;
use crate::base::{NoContent, RequestBuilder};
use crate::service::{AppError, AppResult};

const QUOTAS_PATH: &str = "/admin/quotas";
const QUOTA_PATH: &str = "/admin/quotas/{entity_name}";

/// Entity name of the service wide fallback quota.
pub const DEFAULT_QUOTA_ENTITY: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDetail {
    pub producer_byte_rate: Option<i64>,
    pub consumer_byte_rate: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuotaDetail {
    pub entity_name: Option<String>,
    pub producer_byte_rate: Option<i64>,
    pub consumer_byte_rate: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaList {
    pub data: Option<Vec<EntityQuotaDetail>>,
}

#[derive(Serialize)]
struct QuotaBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    producer_byte_rate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consumer_byte_rate: Option<i64>,
}

fn validate_rates(
    entity_name: &str,
    producer_byte_rate: Option<i64>,
    consumer_byte_rate: Option<i64>,
) -> AppResult<()> {
    require_non_empty("entity_name", entity_name)?;
    if producer_byte_rate.is_none() && consumer_byte_rate.is_none() {
        return Err(AppError::Validation(
            "one of producer_byte_rate or consumer_byte_rate is required".to_string(),
        ));
    }
    require_positive("producer_byte_rate", producer_byte_rate)?;
    require_positive("consumer_byte_rate", consumer_byte_rate)
}

macro_rules! quota_rate_options {
    ($($options:ident => $operation:literal, $method:expr, $doc:literal;)*) => {
        $(
            #[doc = $doc]
            #[derive(Debug, Clone, Default)]
            pub struct $options {
                pub entity_name: String,
                pub producer_byte_rate: Option<i64>,
                pub consumer_byte_rate: Option<i64>,
                pub headers: HashMap<String, String>,
            }

            impl $options {
                pub fn new(entity_name: impl Into<String>) -> Self {
                    $options {
                        entity_name: entity_name.into(),
                        ..Default::default()
                    }
                }

                /// bytes per second
                pub fn set_producer_byte_rate(mut self, rate: i64) -> Self {
                    self.producer_byte_rate = Some(rate);
                    self
                }

                /// bytes per second
                pub fn set_consumer_byte_rate(mut self, rate: i64) -> Self {
                    self.consumer_byte_rate = Some(rate);
                    self
                }
            }

            impl ApiRequest for $options {
                type Response = NoContent;

                const OPERATION: &'static str = $operation;

                const DISCARDS_BODY: bool = true;

                fn method(&self) -> Method {
                    $method
                }

                fn validate(&self) -> AppResult<()> {
                    validate_rates(
                        &self.entity_name,
                        self.producer_byte_rate,
                        self.consumer_byte_rate,
                    )
                }

                fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
                    builder
                        .resolve_path(QUOTA_PATH, &[("entity_name", &self.entity_name)])?
                        .with_json_body(&QuotaBody {
                            producer_byte_rate: self.producer_byte_rate,
                            consumer_byte_rate: self.consumer_byte_rate,
                        })
                }
            }
        )*
    };
}

quota_rate_options! {
    CreateQuotaOptions => "create_quota", Method::POST, "Assigns a new quota to an entity.";
    UpdateQuotaOptions => "update_quota", Method::PATCH, "Changes one or both rates of an existing quota.";
}

#[derive(Debug, Clone, Default)]
pub struct GetQuotaOptions {
    pub entity_name: String,
    pub headers: HashMap<String, String>,
}

impl GetQuotaOptions {
    pub fn new(entity_name: impl Into<String>) -> Self {
        GetQuotaOptions {
            entity_name: entity_name.into(),
            ..Default::default()
        }
    }
}

impl ApiRequest for GetQuotaOptions {
    type Response = QuotaDetail;

    const OPERATION: &'static str = "get_quota";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("entity_name", &self.entity_name)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(QUOTA_PATH, &[("entity_name", &self.entity_name)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteQuotaOptions {
    pub entity_name: String,
    pub headers: HashMap<String, String>,
}

impl DeleteQuotaOptions {
    pub fn new(entity_name: impl Into<String>) -> Self {
        DeleteQuotaOptions {
            entity_name: entity_name.into(),
            ..Default::default()
        }
    }
}

impl ApiRequest for DeleteQuotaOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "delete_quota";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("entity_name", &self.entity_name)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(QUOTA_PATH, &[("entity_name", &self.entity_name)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListQuotasOptions {
    pub headers: HashMap<String, String>,
}

impl ListQuotasOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for ListQuotasOptions {
    type Response = QuotaList;

    const OPERATION: &'static str = "list_quotas";

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(QUOTAS_PATH, &[])
    }
}

request_headers!(
    CreateQuotaOptions,
    UpdateQuotaOptions,
    GetQuotaOptions,
    DeleteQuotaOptions,
    ListQuotasOptions,
);

#[cfg(test)]
mod tests {
    use reqwest::Url;
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::*;

    fn prepare<R: ApiRequest>(request: &R) -> crate::base::PreparedRequest {
        let builder =
            RequestBuilder::new(request.method(), Url::parse("http://localhost:9000").unwrap());
        request.build(builder).unwrap().build()
    }

    #[test]
    fn test_create_quota_request() {
        let options = CreateQuotaOptions::new("svc-orders").set_producer_byte_rate(1024);
        options.validate().unwrap();
        let request = prepare(&options);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/admin/quotas/svc-orders");
        let body: Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"producer_byte_rate": 1024}));
    }

    #[test]
    fn test_update_quota_is_patch() {
        let options = UpdateQuotaOptions::new(DEFAULT_QUOTA_ENTITY)
            .set_producer_byte_rate(2048)
            .set_consumer_byte_rate(4096);
        let request = prepare(&options);
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.url.path(), "/admin/quotas/default");
    }

    #[rstest]
    #[case(CreateQuotaOptions::new("svc"), false)]
    #[case(CreateQuotaOptions::new("").set_consumer_byte_rate(10), false)]
    #[case(CreateQuotaOptions::new("svc").set_consumer_byte_rate(0), false)]
    #[case(CreateQuotaOptions::new("svc").set_consumer_byte_rate(10), true)]
    fn test_create_quota_validation(#[case] options: CreateQuotaOptions, #[case] ok: bool) {
        assert_eq!(options.validate().is_ok(), ok);
    }

    #[test]
    fn test_quota_list_shape() {
        let list: QuotaList = serde_json::from_value(json!({
            "data": [
                {"entity_name": "default", "producer_byte_rate": 1024},
                {"entity_name": "svc", "consumer_byte_rate": 2048}
            ]
        }))
        .unwrap();
        let data = list.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].consumer_byte_rate, None);
        assert_eq!(data[1].entity_name.as_deref(), Some("svc"));
    }
}
