mod api_request;
mod broker;
mod client;
mod consumer_group;
mod mirroring;
mod quota;
mod status;
mod topic;

pub use api_request::{ApiRequest, RequestHeaders};
pub use broker::{
    BrokerDetail, BrokerDetailConfigsItem, BrokerSummary, Cluster, GetBrokerConfigOptions,
    GetBrokerOptions, GetClusterOptions, ListBrokersOptions,
};
pub use client::AdminRestClient;
pub use consumer_group::{
    DeleteConsumerGroupOptions, GetConsumerGroupOptions, GroupDetail, GroupResetResultsItem,
    ListConsumerGroupsOptions, Member, MemberAssignmentsItem, ResetMode, TopicPartitionOffset,
    UpdateConsumerGroupOptions,
};
pub use mirroring::{
    GetMirroringActiveTopicsOptions, GetMirroringTopicSelectionOptions, MirroringActiveTopics,
    MirroringTopicSelection, ReplaceMirroringTopicSelectionOptions,
};
pub use quota::{
    CreateQuotaOptions, DeleteQuotaOptions, EntityQuotaDetail, GetQuotaOptions, ListQuotasOptions,
    QuotaDetail, QuotaList, UpdateQuotaOptions, DEFAULT_QUOTA_ENTITY,
};
pub use status::{AliveOptions, GetStatusOptions, InstanceStatus};
pub use topic::{
    ConfigCreate, ConfigUpdate, CreateTopicOptions, DeleteTopicOptions, DeleteTopicRecordsOptions,
    GetTopicOptions, ListTopicsOptions, RecordDeleteRequestRecordsToDeleteItem, ReplicaAssignment,
    ReplicaAssignmentBrokers, TopicConfigs, TopicDetail, UpdateTopicOptions,
};
