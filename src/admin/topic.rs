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

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api_request::{request_headers, require_non_empty, require_non_negative, require_positive};
use super::ApiRequest;
use crate::base::{NoContent, RequestBuilder};
use crate::service::{AppError, AppResult};

const TOPICS_PATH: &str = "/admin/topics";
const TOPIC_PATH: &str = "/admin/topics/{topic_name}";
const TOPIC_RECORDS_PATH: &str = "/admin/topics/{topic_name}/records";

// ---------------------------------------------------------------------------
// models

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicDetail {
    pub name: Option<String>,
    pub partitions: Option<i64>,
    #[serde(rename = "replicationFactor")]
    pub replication_factor: Option<i64>,
    #[serde(rename = "retentionMs")]
    pub retention_ms: Option<i64>,
    #[serde(rename = "cleanupPolicy")]
    pub cleanup_policy: Option<String>,
    pub configs: Option<TopicConfigs>,
    #[serde(rename = "replicaAssignments")]
    pub replica_assignments: Option<Vec<ReplicaAssignment>>,
}

/// Topic level settings as reported by the service. Values stay strings,
/// the way the service sends them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicConfigs {
    #[serde(rename = "cleanup.policy")]
    pub cleanup_policy: Option<String>,
    #[serde(rename = "min.insync.replicas")]
    pub min_insync_replicas: Option<String>,
    #[serde(rename = "retention.bytes")]
    pub retention_bytes: Option<String>,
    #[serde(rename = "retention.ms")]
    pub retention_ms: Option<String>,
    #[serde(rename = "segment.bytes")]
    pub segment_bytes: Option<String>,
    #[serde(rename = "segment.index.bytes")]
    pub segment_index_bytes: Option<String>,
    #[serde(rename = "segment.ms")]
    pub segment_ms: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicaAssignment {
    /// partition id
    pub id: Option<i64>,
    pub brokers: Option<ReplicaAssignmentBrokers>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicaAssignmentBrokers {
    pub replicas: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigCreate {
    pub name: String,
    pub value: String,
}

impl ConfigCreate {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigCreate {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_to_default: Option<bool>,
}

impl ConfigUpdate {
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigUpdate {
            name: name.into(),
            value: Some(value.into()),
            reset_to_default: None,
        }
    }

    pub fn reset(name: impl Into<String>) -> Self {
        ConfigUpdate {
            name: name.into(),
            value: None,
            reset_to_default: Some(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDeleteRequestRecordsToDeleteItem {
    pub partition: i64,
    /// records strictly below this offset are removed
    pub before_offset: i64,
}

// ---------------------------------------------------------------------------
// create_topic

#[derive(Debug, Clone, Default)]
pub struct CreateTopicOptions {
    pub name: String,
    pub partitions: Option<i64>,
    pub partition_count: Option<i64>,
    pub configs: Vec<ConfigCreate>,
    pub headers: HashMap<String, String>,
}

impl CreateTopicOptions {
    pub fn new(name: impl Into<String>) -> Self {
        CreateTopicOptions {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_partitions(mut self, partitions: i64) -> Self {
        self.partitions = Some(partitions);
        self
    }

    pub fn set_partition_count(mut self, partition_count: i64) -> Self {
        self.partition_count = Some(partition_count);
        self
    }

    pub fn set_configs(mut self, configs: Vec<ConfigCreate>) -> Self {
        self.configs = configs;
        self
    }
}

#[derive(Serialize)]
struct CreateTopicBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    partitions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partition_count: Option<i64>,
    #[serde(skip_serializing_if = "<[ConfigCreate]>::is_empty")]
    configs: &'a [ConfigCreate],
}

impl ApiRequest for CreateTopicOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "create_topic";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::POST
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("name", &self.name)?;
        require_positive("partitions", self.partitions)?;
        require_positive("partition_count", self.partition_count)?;
        for config in &self.configs {
            require_non_empty("configs.name", &config.name)?;
        }
        Ok(())
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder
            .resolve_path(TOPICS_PATH, &[])?
            .with_json_body(&CreateTopicBody {
                name: &self.name,
                partitions: self.partitions,
                partition_count: self.partition_count,
                configs: &self.configs,
            })
    }
}

// ---------------------------------------------------------------------------
// list_topics

#[derive(Debug, Clone, Default)]
pub struct ListTopicsOptions {
    /// wildcard filter, e.g. `orders*`
    pub topic_filter: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
    pub headers: HashMap<String, String>,
}

impl ListTopicsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_topic_filter(mut self, topic_filter: impl Into<String>) -> Self {
        self.topic_filter = Some(topic_filter.into());
        self
    }

    pub fn set_per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn set_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }
}

impl ApiRequest for ListTopicsOptions {
    type Response = Vec<TopicDetail>;

    const OPERATION: &'static str = "list_topics";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_positive("per_page", self.per_page)?;
        require_positive("page", self.page)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        Ok(builder
            .resolve_path(TOPICS_PATH, &[])?
            .add_query_opt("topic_filter", self.topic_filter.as_deref())
            .add_query_opt("per_page", self.per_page)
            .add_query_opt("page", self.page))
    }
}

// ---------------------------------------------------------------------------
// get_topic / delete_topic

#[derive(Debug, Clone, Default)]
pub struct GetTopicOptions {
    pub topic_name: String,
    pub headers: HashMap<String, String>,
}

impl GetTopicOptions {
    pub fn new(topic_name: impl Into<String>) -> Self {
        GetTopicOptions {
            topic_name: topic_name.into(),
            ..Default::default()
        }
    }
}

impl ApiRequest for GetTopicOptions {
    type Response = TopicDetail;

    const OPERATION: &'static str = "get_topic";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("topic_name", &self.topic_name)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(TOPIC_PATH, &[("topic_name", &self.topic_name)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteTopicOptions {
    pub topic_name: String,
    pub headers: HashMap<String, String>,
}

impl DeleteTopicOptions {
    pub fn new(topic_name: impl Into<String>) -> Self {
        DeleteTopicOptions {
            topic_name: topic_name.into(),
            ..Default::default()
        }
    }
}

impl ApiRequest for DeleteTopicOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "delete_topic";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("topic_name", &self.topic_name)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(TOPIC_PATH, &[("topic_name", &self.topic_name)])
    }
}

// ---------------------------------------------------------------------------
// update_topic

#[derive(Debug, Clone, Default)]
pub struct UpdateTopicOptions {
    pub topic_name: String,
    /// partitions can only grow
    pub new_total_partition_count: Option<i64>,
    pub configs: Vec<ConfigUpdate>,
    pub headers: HashMap<String, String>,
}

impl UpdateTopicOptions {
    pub fn new(topic_name: impl Into<String>) -> Self {
        UpdateTopicOptions {
            topic_name: topic_name.into(),
            ..Default::default()
        }
    }

    pub fn set_new_total_partition_count(mut self, count: i64) -> Self {
        self.new_total_partition_count = Some(count);
        self
    }

    pub fn set_configs(mut self, configs: Vec<ConfigUpdate>) -> Self {
        self.configs = configs;
        self
    }
}

#[derive(Serialize)]
struct UpdateTopicBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    new_total_partition_count: Option<i64>,
    #[serde(skip_serializing_if = "<[ConfigUpdate]>::is_empty")]
    configs: &'a [ConfigUpdate],
}

impl ApiRequest for UpdateTopicOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "update_topic";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::PATCH
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("topic_name", &self.topic_name)?;
        require_positive("new_total_partition_count", self.new_total_partition_count)?;
        for config in &self.configs {
            require_non_empty("configs.name", &config.name)?;
            if config.value.is_none() && config.reset_to_default != Some(true) {
                return Err(AppError::Validation(format!(
                    "config {} needs a value or reset_to_default",
                    config.name
                )));
            }
        }
        Ok(())
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder
            .resolve_path(TOPIC_PATH, &[("topic_name", &self.topic_name)])?
            .with_json_body(&UpdateTopicBody {
                new_total_partition_count: self.new_total_partition_count,
                configs: &self.configs,
            })
    }
}

// ---------------------------------------------------------------------------
// delete_topic_records

#[derive(Debug, Clone, Default)]
pub struct DeleteTopicRecordsOptions {
    pub topic_name: String,
    pub records_to_delete: Vec<RecordDeleteRequestRecordsToDeleteItem>,
    pub headers: HashMap<String, String>,
}

impl DeleteTopicRecordsOptions {
    pub fn new(
        topic_name: impl Into<String>,
        records_to_delete: Vec<RecordDeleteRequestRecordsToDeleteItem>,
    ) -> Self {
        DeleteTopicRecordsOptions {
            topic_name: topic_name.into(),
            records_to_delete,
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct DeleteTopicRecordsBody<'a> {
    records_to_delete: &'a [RecordDeleteRequestRecordsToDeleteItem],
}

impl ApiRequest for DeleteTopicRecordsOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "delete_topic_records";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("topic_name", &self.topic_name)?;
        if self.records_to_delete.is_empty() {
            return Err(AppError::Validation(
                "records_to_delete must not be empty".to_string(),
            ));
        }
        for item in &self.records_to_delete {
            require_non_negative("records_to_delete.partition", item.partition)?;
            require_non_negative("records_to_delete.before_offset", item.before_offset)?;
        }
        Ok(())
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder
            .resolve_path(TOPIC_RECORDS_PATH, &[("topic_name", &self.topic_name)])?
            .with_json_body(&DeleteTopicRecordsBody {
                records_to_delete: &self.records_to_delete,
            })
    }
}

request_headers!(
    CreateTopicOptions,
    ListTopicsOptions,
    GetTopicOptions,
    DeleteTopicOptions,
    UpdateTopicOptions,
    DeleteTopicRecordsOptions,
);
