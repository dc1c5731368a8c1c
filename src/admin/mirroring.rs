use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api_request::{request_headers, require_non_empty};
use super::ApiRequest;
use crate::base::RequestBuilder;
use crate::service::AppResult;

const TOPIC_SELECTION_PATH: &str = "/admin/mirroring/topic-selection";
const ACTIVE_TOPICS_PATH: &str = "/admin/mirroring/active-topics";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroringTopicSelection {
    /// topic name patterns mirrored from the source cluster
    pub includes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroringActiveTopics {
    pub active_topics: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct GetMirroringTopicSelectionOptions {
    pub headers: HashMap<String, String>,
}

impl GetMirroringTopicSelectionOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for GetMirroringTopicSelectionOptions {
    type Response = MirroringTopicSelection;

    const OPERATION: &'static str = "get_mirroring_topic_selection";

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(TOPIC_SELECTION_PATH, &[])
    }
}

/// Replaces the whole selection; an empty list stops all mirroring.
#[derive(Debug, Clone, Default)]
pub struct ReplaceMirroringTopicSelectionOptions {
    pub includes: Vec<String>,
    pub headers: HashMap<String, String>,
}

impl ReplaceMirroringTopicSelectionOptions {
    pub fn new(includes: Vec<String>) -> Self {
        ReplaceMirroringTopicSelectionOptions {
            includes,
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct TopicSelectionBody<'a> {
    includes: &'a [String],
}

impl ApiRequest for ReplaceMirroringTopicSelectionOptions {
    type Response = MirroringTopicSelection;

    const OPERATION: &'static str = "replace_mirroring_topic_selection";

    fn method(&self) -> Method {
        Method::POST
    }

    fn validate(&self) -> AppResult<()> {
        self.includes
            .iter()
            .try_for_each(|pattern| require_non_empty("includes", pattern))
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder
            .resolve_path(TOPIC_SELECTION_PATH, &[])?
            .with_json_body(&TopicSelectionBody {
                includes: &self.includes,
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetMirroringActiveTopicsOptions {
    pub headers: HashMap<String, String>,
}

impl GetMirroringActiveTopicsOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for GetMirroringActiveTopicsOptions {
    type Response = MirroringActiveTopics;

    const OPERATION: &'static str = "get_mirroring_active_topics";

    fn method(&self) -> Method {
        Method::GET
    }

    fn build(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        builder.resolve_path(ACTIVE_TOPICS_PATH, &[])
    }
}

request_headers!(
    GetMirroringTopicSelectionOptions,
    ReplaceMirroringTopicSelectionOptions,
    GetMirroringActiveTopicsOptions,
);
