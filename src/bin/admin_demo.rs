use std::fmt::Debug;
use std::future::Future;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eventstreams_admin::admin::{
    AliveOptions, ConfigCreate, ConfigUpdate, CreateQuotaOptions, CreateTopicOptions,
    DeleteConsumerGroupOptions, DeleteQuotaOptions, DeleteTopicOptions, DeleteTopicRecordsOptions,
    GetBrokerConfigOptions, GetBrokerOptions, GetClusterOptions, GetConsumerGroupOptions,
    GetMirroringActiveTopicsOptions, GetMirroringTopicSelectionOptions, GetQuotaOptions,
    GetStatusOptions, GetTopicOptions, ListBrokersOptions, ListConsumerGroupsOptions,
    ListQuotasOptions, ListTopicsOptions, RecordDeleteRequestRecordsToDeleteItem,
    ReplaceMirroringTopicSelectionOptions, ResetMode, UpdateConsumerGroupOptions,
    UpdateQuotaOptions, UpdateTopicOptions,
};
use eventstreams_admin::service::{setup_local_tracing, setup_tracing};
use eventstreams_admin::{AdminConfig, AdminRestClient, AppError, AppResult, DetailedResponse};
use serde::Serialize;
use tokio::runtime;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(version)]
pub struct CommandLine {
    /// path to config file, falls back to ADMINREST_* env vars when absent
    #[arg(short, long)]
    pub conf: Option<String>,
    /// directory for the rolling log file
    #[arg(long, default_value = "./logs")]
    pub log_dir: PathBuf,
    #[command(subcommand)]
    pub command: Option<Command>,
    /// log level (v: info, vv: debug, vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// create, inspect, alter and delete a scratch topic
    Topics,
    /// walk a quota through its lifecycle
    Quotas,
    Brokers,
    /// consumer group listing and a dry-run offset reset
    Groups,
    Mirroring,
    Status,
    /// everything above, in order
    All,
    PrintConfig,
}

const DEMO_TOPIC: &str = "admin-demo-topic";
const DEMO_QUOTA_ENTITY: &str = "admin-demo-service";

fn main() -> AppResult<()> {
    dotenv().ok();
    let commandline = CommandLine::parse();

    let directive = match commandline.verbose {
        0 => "warn,eventstreams_admin=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let command = commandline.command.unwrap_or(Command::All);
    // print-config only needs the console
    let _log_guard = if command == Command::PrintConfig {
        setup_local_tracing();
        None
    } else {
        Some(setup_tracing(&commandline.log_dir, directive))
    };

    let config = match commandline.conf.as_ref() {
        Some(path) => AdminConfig::set_up_config(path)?,
        None => AdminConfig::from_env()?,
    };
    if command == Command::PrintConfig {
        // credentials stay out of stdout
        let mut printable = config.clone();
        printable.auth.password = printable.auth.password.map(|_| "****".to_string());
        printable.auth.token = printable.auth.token.map(|_| "****".to_string());
        printable.auth.api_key = printable.auth.api_key.map(|_| "****".to_string());
        println!("{printable:#?}");
        return Ok(());
    }

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(async move {
        let client = AdminRestClient::new(&config)?;
        info!(url = %client.service().service_url(), "admin demo starting");

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling in-flight requests");
                ctrl_c.cancel();
            }
        });

        let demo = Demo { client, cancel };
        let all = command == Command::All;
        if all || command == Command::Status {
            demo.status().await;
        }
        if all || command == Command::Brokers {
            demo.brokers().await;
        }
        if all || command == Command::Topics {
            demo.topics().await;
        }
        if all || command == Command::Quotas {
            demo.quotas().await;
        }
        if all || command == Command::Groups {
            demo.groups().await;
        }
        if all || command == Command::Mirroring {
            demo.mirroring().await;
        }
        info!("admin demo finished");
        Ok::<(), AppError>(())
    })
}

struct Demo {
    client: AdminRestClient,
    cancel: CancellationToken,
}

impl Demo {
    /// Runs one call and prints its outcome. Failures are logged and the
    /// script moves on.
    async fn show<T, F>(&self, label: &str, call: F) -> Option<T>
    where
        T: Serialize + Debug,
        F: Future<Output = AppResult<DetailedResponse<T>>>,
    {
        if self.cancel.is_cancelled() {
            return None;
        }
        match call.await {
            Ok(response) => {
                let body = response
                    .result()
                    .map(|result| {
                        serde_json::to_string_pretty(result).unwrap_or_else(|_| format!("{result:?}"))
                    })
                    .unwrap_or_else(|| "<empty>".to_string());
                println!("{label}: {}\n{body}", response.status_code);
                response.into_result()
            }
            Err(e) => {
                error!(operation = label, error = %e, "admin call failed");
                None
            }
        }
    }

    async fn status(&self) {
        let c = &self.client;
        let t = &self.cancel;
        self.show("alive", c.alive_with_cancel(&AliveOptions::new(), t))
            .await;
        self.show("get_status", c.get_status_with_cancel(&GetStatusOptions::new(), t))
            .await;
    }

    async fn brokers(&self) {
        let c = &self.client;
        let t = &self.cancel;
        let brokers = self
            .show("list_brokers", c.list_brokers_with_cancel(&ListBrokersOptions::new(), t))
            .await;
        self.show("get_cluster", c.get_cluster_with_cancel(&GetClusterOptions::new(), t))
            .await;
        let first = brokers
            .unwrap_or_default()
            .into_iter()
            .find_map(|broker| broker.id);
        if let Some(id) = first {
            self.show("get_broker", c.get_broker_with_cancel(&GetBrokerOptions::new(id), t))
                .await;
            let options = GetBrokerConfigOptions::new(id).set_config_filter("log.*");
            self.show("get_broker_config", c.get_broker_config_with_cancel(&options, t))
                .await;
        }
    }

    async fn topics(&self) {
        let c = &self.client;
        let t = &self.cancel;
        let create = CreateTopicOptions::new(DEMO_TOPIC)
            .set_partition_count(1)
            .set_configs(vec![ConfigCreate::new("retention.ms", "3600000")]);
        self.show("create_topic", c.create_topic_with_cancel(&create, t))
            .await;
        let list = ListTopicsOptions::new().set_topic_filter("admin-demo*");
        self.show("list_topics", c.list_topics_with_cancel(&list, t))
            .await;
        self.show("get_topic", c.get_topic_with_cancel(&GetTopicOptions::new(DEMO_TOPIC), t))
            .await;
        let update = UpdateTopicOptions::new(DEMO_TOPIC)
            .set_new_total_partition_count(2)
            .set_configs(vec![ConfigUpdate::set("cleanup.policy", "compact")]);
        self.show("update_topic", c.update_topic_with_cancel(&update, t))
            .await;
        let records = DeleteTopicRecordsOptions::new(
            DEMO_TOPIC,
            vec![RecordDeleteRequestRecordsToDeleteItem {
                partition: 0,
                before_offset: 0,
            }],
        );
        self.show("delete_topic_records", c.delete_topic_records_with_cancel(&records, t))
            .await;
        self.show("delete_topic", c.delete_topic_with_cancel(&DeleteTopicOptions::new(DEMO_TOPIC), t))
            .await;
    }

    async fn quotas(&self) {
        let c = &self.client;
        let t = &self.cancel;
        let create = CreateQuotaOptions::new(DEMO_QUOTA_ENTITY).set_producer_byte_rate(1024);
        self.show("create_quota", c.create_quota_with_cancel(&create, t))
            .await;
        self.show("get_quota", c.get_quota_with_cancel(&GetQuotaOptions::new(DEMO_QUOTA_ENTITY), t))
            .await;
        let update = UpdateQuotaOptions::new(DEMO_QUOTA_ENTITY)
            .set_producer_byte_rate(2048)
            .set_consumer_byte_rate(4096);
        self.show("update_quota", c.update_quota_with_cancel(&update, t))
            .await;
        self.show("list_quotas", c.list_quotas_with_cancel(&ListQuotasOptions::new(), t))
            .await;
        self.show(
            "delete_quota",
            c.delete_quota_with_cancel(&DeleteQuotaOptions::new(DEMO_QUOTA_ENTITY), t),
        )
        .await;
    }

    async fn groups(&self) {
        let c = &self.client;
        let t = &self.cancel;
        let groups = self
            .show(
                "list_consumer_groups",
                c.list_consumer_groups_with_cancel(&ListConsumerGroupsOptions::new(), t),
            )
            .await;
        let Some(group_id) = groups.unwrap_or_default().into_iter().next() else {
            info!("no consumer groups to inspect");
            return;
        };
        self.show(
            "get_consumer_group",
            c.get_consumer_group_with_cancel(&GetConsumerGroupOptions::new(&group_id), t),
        )
        .await;
        // dry run: execute stays false
        let reset = UpdateConsumerGroupOptions::new(&group_id)
            .set_topic("*")
            .set_mode(ResetMode::Latest)
            .set_execute(false);
        self.show("update_consumer_group", c.update_consumer_group_with_cancel(&reset, t))
            .await;
        if std::env::var("ADMIN_DEMO_DELETE_GROUP").is_ok() {
            self.show(
                "delete_consumer_group",
                c.delete_consumer_group_with_cancel(&DeleteConsumerGroupOptions::new(&group_id), t),
            )
            .await;
        }
    }

    async fn mirroring(&self) {
        let c = &self.client;
        let t = &self.cancel;
        let selection = self
            .show(
                "get_mirroring_topic_selection",
                c.get_mirroring_topic_selection_with_cancel(&GetMirroringTopicSelectionOptions::new(), t),
            )
            .await;
        // write back what was read so the demo leaves mirroring unchanged
        if let Some(includes) = selection.and_then(|s| s.includes) {
            let replace = ReplaceMirroringTopicSelectionOptions::new(includes);
            self.show(
                "replace_mirroring_topic_selection",
                c.replace_mirroring_topic_selection_with_cancel(&replace, t),
            )
            .await;
        }
        self.show(
            "get_mirroring_active_topics",
            c.get_mirroring_active_topics_with_cancel(&GetMirroringActiveTopicsOptions::new(), t),
        )
        .await;
    }
}
