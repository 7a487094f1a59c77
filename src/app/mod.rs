//! `stackdriver` command-line wrapper around [`StackdriverClient`].

pub mod logging;

pub use logging::{LogLevel, setup_logging};

use crate::client::StackdriverClient;
use crate::config::ClientConfig;
use crate::domain::{AnnotationEvent, DeployEvent, EventLevel, GatewayMessage, MetricValue};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit custom metrics and events to Stackdriver")]
pub struct Cli {
    /// Stackdriver API key
    #[arg(long, env = "STACKDRIVER_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Stackdriver customer id attached to metric batches
    #[arg(long, env = "STACKDRIVER_CUSTOMER_ID")]
    pub customer_id: Option<String>,

    /// TOML file with endpoint and timeout overrides
    #[arg(long, env = "STACKDRIVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", ignore_case = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single custom-metric data point
    Metric {
        #[arg(long)]
        name: String,
        /// Parsed as integer, float or boolean, otherwise sent as text
        #[arg(long)]
        value: MetricValue,
        #[arg(long)]
        instance_id: Option<String>,
        /// Unix timestamp; defaults to now
        #[arg(long)]
        collected_at: Option<i64>,
    },
    /// Post an annotation event
    Annotate {
        #[arg(long)]
        message: String,
        #[arg(long)]
        annotated_by: Option<String>,
        #[arg(long)]
        level: Option<LevelArg>,
        #[arg(long)]
        instance_id: Option<String>,
        /// Unix timestamp; defaults to now
        #[arg(long)]
        event_epoch: Option<i64>,
    },
    /// Post a deploy event
    Deploy {
        #[arg(long)]
        revision_id: String,
        #[arg(long)]
        deployed_by: Option<String>,
        #[arg(long)]
        deployed_to: Option<String>,
        #[arg(long)]
        repository: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Info,
    Warn,
    Error,
}

impl From<LevelArg> for EventLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Info => EventLevel::Info,
            LevelArg::Warn => EventLevel::Warn,
            LevelArg::Error => EventLevel::Error,
        }
    }
}

impl Cli {
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        match &self.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display())),
            None => Ok(ClientConfig::default()),
        }
    }
}

/// Runs one subcommand against the configured gateways.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.client_config()?;
    let mut client = StackdriverClient::with_config(cli.api_key.as_str(), config)
        .context("failed to build Stackdriver client")?;
    if let Some(customer_id) = cli.customer_id {
        client = client.with_customer_id(customer_id);
    }

    match cli.command {
        Command::Metric {
            name,
            value,
            instance_id,
            collected_at,
        } => {
            let mut batch = GatewayMessage::new();
            batch.custom_metric(
                name.as_str(),
                instance_id.as_deref(),
                collected_at.unwrap_or_else(|| Utc::now().timestamp()),
                value,
            )?;
            client.send(&batch).await?;
            info!(%name, "custom metric sent");
        }
        Command::Annotate {
            message,
            annotated_by,
            level,
            instance_id,
            event_epoch,
        } => {
            let mut event = match event_epoch {
                Some(epoch) => AnnotationEvent::new(&message, epoch),
                None => AnnotationEvent::now(&message),
            };
            if let Some(annotated_by) = annotated_by.as_deref() {
                event = event.annotated_by(annotated_by);
            }
            if let Some(level) = level {
                event = event.level(level.into());
            }
            if let Some(instance_id) = instance_id.as_deref() {
                event = event.instance_id(instance_id);
            }
            client.send_annotation_event(&event).await?;
            info!("annotation event sent");
        }
        Command::Deploy {
            revision_id,
            deployed_by,
            deployed_to,
            repository,
        } => {
            let mut event = DeployEvent::new(revision_id.as_str());
            if let Some(deployed_by) = deployed_by.as_deref() {
                event = event.deployed_by(deployed_by);
            }
            if let Some(deployed_to) = deployed_to.as_deref() {
                event = event.deployed_to(deployed_to);
            }
            if let Some(repository) = repository.as_deref() {
                event = event.repository(repository);
            }
            client.send_deploy_event(&event).await?;
            info!(%revision_id, "deploy event sent");
        }
    }

    Ok(())
}

/// Entry point for the binary.
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level)?;
    run(cli).await
}
