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

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::broker::{GetBrokerConfigOptions, GetBrokerOptions, GetClusterOptions, ListBrokersOptions};
use super::consumer_group::{
    DeleteConsumerGroupOptions, GetConsumerGroupOptions, ListConsumerGroupsOptions,
    UpdateConsumerGroupOptions,
};
use super::mirroring::{
    GetMirroringActiveTopicsOptions, GetMirroringTopicSelectionOptions,
    ReplaceMirroringTopicSelectionOptions,
};
use super::quota::{
    CreateQuotaOptions, DeleteQuotaOptions, GetQuotaOptions, ListQuotasOptions, UpdateQuotaOptions,
};
use super::status::{AliveOptions, GetStatusOptions};
use super::topic::{
    CreateTopicOptions, DeleteTopicOptions, DeleteTopicRecordsOptions, GetTopicOptions,
    ListTopicsOptions, UpdateTopicOptions,
};
use super::ApiRequest;
use crate::base::{Authenticator, BaseService, DetailedResponse};
use crate::service::{AdminConfig, AppResult};

/// Client for the admin REST API of one service instance.
///
/// Every operation validates its options, sends exactly one logical request
/// (retries included) and hands back the status, headers and typed body.
/// Each has a `_with_cancel` twin that gives up as soon as the token fires.
#[derive(Debug, Clone)]
pub struct AdminRestClient {
    service: BaseService,
}

impl AdminRestClient {
    pub fn new(config: &AdminConfig) -> AppResult<Self> {
        Ok(AdminRestClient {
            service: BaseService::from_config(config)?,
        })
    }

    pub fn with_authenticator(
        service_url: &str,
        authenticator: Arc<dyn Authenticator>,
    ) -> AppResult<Self> {
        Ok(AdminRestClient {
            service: BaseService::new(service_url, authenticator)?,
        })
    }

    pub fn service(&self) -> &BaseService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut BaseService {
        &mut self.service
    }

    pub fn set_service_url(&mut self, service_url: &str) -> AppResult<()> {
        self.service.set_service_url(service_url)
    }

    pub fn enable_retries(&mut self, max_retries: u32, max_retry_interval: Duration) {
        self.service.enable_retries(max_retries, max_retry_interval);
    }

    pub fn disable_retries(&mut self) {
        self.service.disable_retries();
    }

    pub fn set_gzip(&mut self, enabled: bool) {
        self.service.set_gzip(enabled);
    }

    pub fn set_default_headers(&mut self, headers: HeaderMap) {
        self.service.set_default_headers(headers);
    }

    /// Runs any operation. The named methods below all funnel through here.
    #[instrument(name = "admin_request", skip_all, fields(operation = R::OPERATION))]
    pub async fn execute<R: ApiRequest>(
        &self,
        request: &R,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<DetailedResponse<R::Response>> {
        request.validate()?;
        let prepared = request
            .build(self.service.request_builder(request.method()).accept_json())?
            .add_headers(request.headers())?
            .build();
        let response = if R::DISCARDS_BODY {
            self.service.request_discarding_body(prepared, cancel).await?
        } else {
            self.service.request(prepared, cancel).await?
        };
        debug!(status = response.status_code, "admin request finished");
        Ok(response)
    }
}

macro_rules! admin_operations {
    ($($(#[$doc:meta])* $name:ident, $with_cancel:ident => $options:ty;)*) => {
        impl AdminRestClient {
            $(
                $(#[$doc])*
                pub async fn $name(
                    &self,
                    options: &$options,
                ) -> AppResult<DetailedResponse<<$options as ApiRequest>::Response>> {
                    self.execute(options, None).await
                }

                pub async fn $with_cancel(
                    &self,
                    options: &$options,
                    cancel: &CancellationToken,
                ) -> AppResult<DetailedResponse<<$options as ApiRequest>::Response>> {
                    self.execute(options, Some(cancel)).await
                }
            )*
        }
    };
}

admin_operations! {
    /// `POST /admin/topics`
    create_topic, create_topic_with_cancel => CreateTopicOptions;
    /// `GET /admin/topics`
    list_topics, list_topics_with_cancel => ListTopicsOptions;
    /// `GET /admin/topics/{topic_name}`
    get_topic, get_topic_with_cancel => GetTopicOptions;
    /// `DELETE /admin/topics/{topic_name}`; the service deletes asynchronously.
    delete_topic, delete_topic_with_cancel => DeleteTopicOptions;
    /// `PATCH /admin/topics/{topic_name}`
    update_topic, update_topic_with_cancel => UpdateTopicOptions;
    /// `DELETE /admin/topics/{topic_name}/records`
    delete_topic_records, delete_topic_records_with_cancel => DeleteTopicRecordsOptions;

    /// `POST /admin/quotas/{entity_name}`
    create_quota, create_quota_with_cancel => CreateQuotaOptions;
    /// `PATCH /admin/quotas/{entity_name}`
    update_quota, update_quota_with_cancel => UpdateQuotaOptions;
    /// `DELETE /admin/quotas/{entity_name}`
    delete_quota, delete_quota_with_cancel => DeleteQuotaOptions;
    /// `GET /admin/quotas/{entity_name}`
    get_quota, get_quota_with_cancel => GetQuotaOptions;
    /// `GET /admin/quotas`
    list_quotas, list_quotas_with_cancel => ListQuotasOptions;

    /// `GET /admin/brokers`
    list_brokers, list_brokers_with_cancel => ListBrokersOptions;
    /// `GET /admin/brokers/{broker_id}`
    get_broker, get_broker_with_cancel => GetBrokerOptions;
    /// `GET /admin/brokers/{broker_id}/configs`
    get_broker_config, get_broker_config_with_cancel => GetBrokerConfigOptions;
    /// `GET /admin/cluster`
    get_cluster, get_cluster_with_cancel => GetClusterOptions;

    /// `GET /admin/consumergroups`
    list_consumer_groups, list_consumer_groups_with_cancel => ListConsumerGroupsOptions;
    /// `GET /admin/consumergroups/{group_id}`
    get_consumer_group, get_consumer_group_with_cancel => GetConsumerGroupOptions;
    /// `DELETE /admin/consumergroups/{group_id}`
    delete_consumer_group, delete_consumer_group_with_cancel => DeleteConsumerGroupOptions;
    /// `PATCH /admin/consumergroups/{group_id}`
    update_consumer_group, update_consumer_group_with_cancel => UpdateConsumerGroupOptions;

    /// `GET /admin/mirroring/topic-selection`
    get_mirroring_topic_selection, get_mirroring_topic_selection_with_cancel
        => GetMirroringTopicSelectionOptions;
    /// `POST /admin/mirroring/topic-selection`
    replace_mirroring_topic_selection, replace_mirroring_topic_selection_with_cancel
        => ReplaceMirroringTopicSelectionOptions;
    /// `GET /admin/mirroring/active-topics`
    get_mirroring_active_topics, get_mirroring_active_topics_with_cancel
        => GetMirroringActiveTopicsOptions;

    /// `GET /admin/status`
    get_status, get_status_with_cancel => GetStatusOptions;
    /// `GET /alive`
    alive, alive_with_cancel => AliveOptions;
}
