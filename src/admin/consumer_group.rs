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
use std::fmt::{Display, Formatter};

use chrono::DateTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api_request::{request_headers, require_non_empty, require_positive};
use super::ApiRequest;
use crate::base::{NoContent, RequestBuilder};
use crate::service::{AppError, AppResult};

const GROUPS_PATH: &str = "/admin/consumergroups";
const GROUP_PATH: &str = "/admin/consumergroups/{group_id}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetail {
    pub group_id: Option<String>,
    /// e.g. `Stable`, `Empty`, `PreparingRebalance`
    pub state: Option<String>,
    pub members: Option<Vec<Member>>,
    pub offsets: Option<Vec<TopicPartitionOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub consumer_id: Option<String>,
    pub client_id: Option<String>,
    pub host: Option<String>,
    pub assignments: Option<Vec<MemberAssignmentsItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAssignmentsItem {
    pub topic: Option<String>,
    pub partition: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPartitionOffset {
    pub topic: Option<String>,
    pub partition: Option<i64>,
    pub current_offset: Option<i64>,
    pub end_offset: Option<i64>,
}

impl TopicPartitionOffset {
    /// Messages the group still has to consume on this partition. `None`
    /// while the group has no committed offset here (reported as `-1`).
    pub fn lag(&self) -> Option<i64> {
        let current = self.current_offset.filter(|offset| *offset >= 0)?;
        self.end_offset?.checked_sub(current)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResetResultsItem {
    pub topic: Option<String>,
    pub partition: Option<i64>,
    pub offset: Option<i64>,
}

/// Where `update_consumer_group` moves the committed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    Earliest,
    Latest,
    /// `value` holds an ISO-8601 timestamp
    Datetime,
    /// `value` holds an absolute offset
    Offset,
}

impl Display for ResetMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResetMode::Earliest => "earliest",
            ResetMode::Latest => "latest",
            ResetMode::Datetime => "datetime",
            ResetMode::Offset => "offset",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListConsumerGroupsOptions {
    pub group_filter: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
    pub headers: HashMap<String, String>,
}

impl ListConsumerGroupsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_group_filter(mut self, group_filter: impl Into<String>) -> Self {
        self.group_filter = Some(group_filter.into());
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

impl ApiRequest for ListConsumerGroupsOptions {
    type Response = Vec<String>;

    const OPERATION: &'static str = "list_consumer_groups";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_positive("per_page", self.per_page)?;
        require_positive("page", self.page)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        Ok(builder
            .resolve_path(GROUPS_PATH, &[])?
            .add_query_opt("group_filter", self.group_filter.as_deref())
            .add_query_opt("per_page", self.per_page)
            .add_query_opt("page", self.page))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetConsumerGroupOptions {
    pub group_id: String,
    pub headers: HashMap<String, String>,
}

impl GetConsumerGroupOptions {
    pub fn new(group_id: impl Into<String>) -> Self {
        GetConsumerGroupOptions {
            group_id: group_id.into(),
            ..Default::default()
        }
    }
}

impl ApiRequest for GetConsumerGroupOptions {
    type Response = GroupDetail;

    const OPERATION: &'static str = "get_consumer_group";

    fn method(&self) -> Method {
        Method::GET
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("group_id", &self.group_id)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(GROUP_PATH, &[("group_id", &self.group_id)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteConsumerGroupOptions {
    pub group_id: String,
    pub headers: HashMap<String, String>,
}

impl DeleteConsumerGroupOptions {
    pub fn new(group_id: impl Into<String>) -> Self {
        DeleteConsumerGroupOptions {
            group_id: group_id.into(),
            ..Default::default()
        }
    }
}

impl ApiRequest for DeleteConsumerGroupOptions {
    type Response = NoContent;

    const OPERATION: &'static str = "delete_consumer_group";

    const DISCARDS_BODY: bool = true;

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("group_id", &self.group_id)
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(GROUP_PATH, &[("group_id", &self.group_id)])
    }
}

/// Resets committed offsets of a group. With `execute` unset or false the
/// service only reports what the reset would do.
#[derive(Debug, Clone, Default)]
pub struct UpdateConsumerGroupOptions {
    pub group_id: String,
    /// topic name or `*` for every topic the group consumes
    pub topic: Option<String>,
    pub mode: Option<ResetMode>,
    pub value: Option<String>,
    pub execute: Option<bool>,
    pub headers: HashMap<String, String>,
}

impl UpdateConsumerGroupOptions {
    pub fn new(group_id: impl Into<String>) -> Self {
        UpdateConsumerGroupOptions {
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    pub fn set_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn set_mode(mut self, mode: ResetMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn set_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn set_execute(mut self, execute: bool) -> Self {
        self.execute = Some(execute);
        self
    }
}

#[derive(Serialize)]
struct UpdateConsumerGroupBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<ResetMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execute: Option<bool>,
}

impl ApiRequest for UpdateConsumerGroupOptions {
    type Response = Vec<GroupResetResultsItem>;

    const OPERATION: &'static str = "update_consumer_group";

    fn method(&self) -> Method {
        Method::PATCH
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty("group_id", &self.group_id)?;
        if let Some(mode @ (ResetMode::Datetime | ResetMode::Offset)) = self.mode {
            let value = self
                .value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Validation(format!("mode {mode} requires a value")))?;
            match mode {
                ResetMode::Offset if value.parse::<i64>().map_or(true, |v| v < 0) => {
                    return Err(AppError::Validation(format!(
                        "offset value must be a non-negative integer, got {value}"
                    )));
                }
                ResetMode::Datetime if DateTime::parse_from_rfc3339(value).is_err() => {
                    return Err(AppError::Validation(format!(
                        "datetime value must be an ISO-8601 timestamp, got {value}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder
            .resolve_path(GROUP_PATH, &[("group_id", &self.group_id)])?
            .with_json_body(&UpdateConsumerGroupBody {
                topic: self.topic.as_deref(),
                mode: self.mode,
                value: self.value.as_deref(),
                execute: self.execute,
            })
    }
}

request_headers!(
    ListConsumerGroupsOptions,
    GetConsumerGroupOptions,
    DeleteConsumerGroupOptions,
    UpdateConsumerGroupOptions,
);
