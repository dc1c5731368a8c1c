use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api_request::{request_headers, require_non_negative};
use super::ApiRequest;
use crate::base::RequestBuilder;
use crate::service::AppResult;

const BROKERS_PATH: &str = "/admin/brokers";
const BROKER_PATH: &str = "/admin/brokers/{broker_id}";
const BROKER_CONFIGS_PATH: &str = "/admin/brokers/{broker_id}/configs";
const CLUSTER_PATH: &str = "/admin/cluster";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerSummary {
    pub id: Option<i64>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub rack: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerDetail {
    pub id: Option<i64>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub rack: Option<String>,
    pub configs: Option<Vec<BrokerDetailConfigsItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerDetailConfigsItem {
    pub name: Option<String>,
    /// absent for sensitive settings
    pub value: Option<String>,
    pub is_sensitive: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: Option<String>,
    pub controller: Option<BrokerSummary>,
    pub brokers: Option<Vec<BrokerSummary>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListBrokersOptions {
    pub headers: HashMap<String, String>,
}

impl ListBrokersOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for ListBrokersOptions {
    type Response = Vec<BrokerSummary>;

    const OPERATION: &'static str = "list_brokers";

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(BROKERS_PATH, &[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetBrokerOptions {
    pub broker_id: i64,
    pub headers: HashMap<String, String>,
}

impl GetBrokerOptions {
    pub fn new(broker_id: i64) -> Self {
        GetBrokerOptions {
            broker_id,
            ..Default::default()
        }
    }
}

impl ApiRequest for GetBrokerOptions {
    type Response = BrokerDetail;

    const OPERATION: &'static str = "get_broker";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_non_negative("broker_id", self.broker_id)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        let broker_id = self.broker_id.to_string();
        builder.resolve_path(BROKER_PATH, &[("broker_id", &broker_id)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetBrokerConfigOptions {
    pub broker_id: i64,
    /// wildcard filter on config names
    pub config_filter: Option<String>,
    /// include defaults and sources
    pub verbose: Option<bool>,
    pub headers: HashMap<String, String>,
}

impl GetBrokerConfigOptions {
    pub fn new(broker_id: i64) -> Self {
        GetBrokerConfigOptions {
            broker_id,
            ..Default::default()
        }
    }

    pub fn set_config_filter(mut self, config_filter: impl Into<String>) -> Self {
        self.config_filter = Some(config_filter.into());
        self
    }

    pub fn set_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

impl ApiRequest for GetBrokerConfigOptions {
    type Response = BrokerDetail;

    const OPERATION: &'static str = "get_broker_config";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_non_negative("broker_id", self.broker_id)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        let broker_id = self.broker_id.to_string();
        Ok(builder
            .resolve_path(BROKER_CONFIGS_PATH, &[("broker_id", &broker_id)])?
            .add_query_opt("config_filter", self.config_filter.as_deref())
            .add_query_opt("verbose", self.verbose))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetClusterOptions {
    pub headers: HashMap<String, String>,
}

impl GetClusterOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for GetClusterOptions {
    type Response = Cluster;

    const OPERATION: &'static str = "get_cluster";

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(CLUSTER_PATH, &[])
    }
}

request_headers!(
    ListBrokersOptions,
    GetBrokerOptions,
    GetBrokerConfigOptions,
    GetClusterOptions,
);

#[cfg(test)]
mod tests {
    use reqwest::Url;
    use serde_json::json;

    use super::*;

    fn prepare<R: ApiRequest>(request: &R) -> crate::base::PreparedRequest {
        let builder =
            RequestBuilder::new(request.method(), Url::parse("http://localhost:9000").unwrap());
        request.build(builder).unwrap().build()
    }

    #[test]
    fn test_broker_paths() {
        assert_eq!(prepare(&GetBrokerOptions::new(2)).url.path(), "/admin/brokers/2");
        let request = prepare(
            &GetBrokerConfigOptions::new(0)
                .set_config_filter("log.*")
                .set_verbose(true),
        );
        assert_eq!(request.url.path(), "/admin/brokers/0/configs");
        assert_eq!(request.url.query(), Some("config_filter=log.*&verbose=true"));
        assert!(GetBrokerOptions::new(-1).validate().is_err());
    }

    #[test]
    fn test_cluster_shape() {
        let cluster: Cluster = serde_json::from_value(json!({
            "id": "cluster-a",
            "controller": {"id": 1, "host": "kafka-1", "port": 9093, "rack": "zone-1"},
            "brokers": [
                {"id": 0, "host": "kafka-0", "port": 9093},
                {"id": 1, "host": "kafka-1", "port": 9093, "rack": "zone-1"}
            ]
        }))
        .unwrap();
        assert_eq!(cluster.controller.unwrap().id, Some(1));
        let brokers = cluster.brokers.unwrap();
        assert_eq!(brokers.len(), 2);
        assert!(brokers[0].rack.is_none());
    }

    #[test]
    fn test_sensitive_config_without_value() {
        let detail: BrokerDetail = serde_json::from_value(json!({
            "id": 0,
            "configs": [
                {"name": "ssl.keystore.password", "is_sensitive": true},
                {"name": "num.io.threads", "value": "8", "is_sensitive": false}
            ]
        }))
        .unwrap();
        let configs = detail.configs.unwrap();
        assert!(configs[0].value.is_none());
        assert_eq!(configs[1].value.as_deref(), Some("8"));
    }
}
