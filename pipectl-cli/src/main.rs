//! pipectl: declarative management of centrally managed Logstash pipelines.
//!
//! Each subcommand is a single-shot operation against the management API:
//! `apply` converges a pipeline to the given spec, `get`/`list` read
//! observed state, `delete` removes a pipeline (tolerating absence).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tabled::{Table, Tabled};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipectl_engine::{
    GatewayConfig, HttpGateway, KeyStyle, ObservedPipeline, PipelineIndexEntry, PipelineSettings,
    PipelineSpec, QueueType, Reconciler,
};

#[derive(Parser)]
#[command(name = "pipectl", version, about = "Declarative manager for centrally managed Logstash pipelines")]
struct Cli {
    /// Kibana base URL
    #[arg(long, env = "KIBANA_URL")]
    kibana_url: String,

    /// Credentials as username:password
    #[arg(long, env = "CLOUD_AUTH", hide_env_values = true)]
    cloud_auth: String,

    /// Settings key convention the deployed API expects
    #[arg(long, value_enum, default_value_t = KeyStyleArg::Dotted)]
    key_style: KeyStyleArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyStyleArg {
    /// pipeline.batch.delay, queue.max_bytes, ...
    Dotted,
    /// pipeline_batch_delay, queue_max_bytes, ...
    Underscored,
}

impl From<KeyStyleArg> for KeyStyle {
    fn from(arg: KeyStyleArg) -> Self {
        match arg {
            KeyStyleArg::Dotted => KeyStyle::Dotted,
            KeyStyleArg::Underscored => KeyStyle::Underscored,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum QueueTypeArg {
    Memory,
    Persisted,
}

impl From<QueueTypeArg> for QueueType {
    fn from(arg: QueueTypeArg) -> Self {
        match arg {
            QueueTypeArg::Memory => QueueType::Memory,
            QueueTypeArg::Persisted => QueueType::Persisted,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Converge a pipeline to the given spec (create or replace as needed)
    Apply {
        /// Pipeline id, unique and immutable
        #[arg(long)]
        id: String,

        /// File containing the pipeline definition (input/filter/output)
        #[arg(long)]
        definition_file: PathBuf,

        /// Pipeline description
        #[arg(long)]
        description: Option<String>,

        /// Maximum time in ms a worker waits for new events
        #[arg(long)]
        batch_delay: Option<i64>,

        /// Maximum events a worker collects before executing filters
        #[arg(long)]
        batch_size: Option<i64>,

        /// Number of filter/output worker threads
        #[arg(long)]
        workers: Option<i64>,

        /// Maximum events written to disk before forcing a checkpoint
        #[arg(long)]
        queue_checkpoint_writes: Option<i64>,

        /// Total queue capacity, e.g. 1gb
        #[arg(long)]
        queue_max_bytes: Option<String>,

        /// Queue implementation
        #[arg(long, value_enum)]
        queue_type: Option<QueueTypeArg>,

        /// Pin the remote defaults explicitly instead of omitting unset settings
        #[arg(long)]
        remote_defaults: bool,
    },

    /// Show a pipeline's observed state
    Get {
        /// Pipeline id
        id: String,
    },

    /// List all pipelines
    List,

    /// Delete a pipeline (absence counts as success)
    Delete {
        /// Pipeline id
        id: String,
    },
}

#[derive(Tabled)]
struct PipelineRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "LAST MODIFIED")]
    last_modified: String,
    #[tabled(rename = "OWNER")]
    owner: String,
}

impl From<PipelineIndexEntry> for PipelineRow {
    fn from(entry: PipelineIndexEntry) -> Self {
        Self {
            id: entry.id,
            description: entry.description.unwrap_or_else(|| "-".to_string()),
            last_modified: entry.last_modified.unwrap_or_else(|| "-".to_string()),
            owner: entry.owner.unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn print_pipeline(observed: &ObservedPipeline) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(observed)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipectl=info,pipectl_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig::new(cli.kibana_url, cli.cloud_auth)
        .with_key_style(cli.key_style.into());
    let reconciler = Reconciler::new(HttpGateway::new(&config)?);

    match cli.command {
        Commands::Apply {
            id,
            definition_file,
            description,
            batch_delay,
            batch_size,
            workers,
            queue_checkpoint_writes,
            queue_max_bytes,
            queue_type,
            remote_defaults,
        } => {
            let definition = std::fs::read_to_string(&definition_file).with_context(|| {
                format!("reading definition file {}", definition_file.display())
            })?;

            let mut settings = if remote_defaults {
                PipelineSettings::remote_defaults()
            } else {
                PipelineSettings::default()
            };
            if batch_delay.is_some() {
                settings.batch_delay = batch_delay;
            }
            if batch_size.is_some() {
                settings.batch_size = batch_size;
            }
            if workers.is_some() {
                settings.workers = workers;
            }
            if queue_checkpoint_writes.is_some() {
                settings.queue_checkpoint_writes = queue_checkpoint_writes;
            }
            if queue_max_bytes.is_some() {
                settings.queue_max_bytes = queue_max_bytes;
            }
            if let Some(qt) = queue_type {
                settings.queue_type = Some(qt.into());
            }

            let spec = PipelineSpec {
                id,
                description,
                definition,
                settings,
            };

            let observed = reconciler.reconcile(&spec).await?;
            print_pipeline(&observed)?;
        }

        Commands::Get { id } => {
            let observed = reconciler.fetch(&id).await?;
            print_pipeline(&observed)?;
        }

        Commands::List => {
            let entries = reconciler.list().await?;
            let rows: Vec<PipelineRow> = entries.into_iter().map(Into::into).collect();
            println!("{}", Table::new(rows));
        }

        Commands::Delete { id } => {
            reconciler.delete(&id).await?;
            println!("Pipeline {} deleted", id);
        }
    }

    Ok(())
}
