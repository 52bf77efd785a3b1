//! pipectl-engine: declarative reconciliation for centrally managed
//! Logstash pipelines.
//!
//! Given a desired [`PipelineSpec`], the [`Reconciler`] drives the remote
//! management API to match it (creating, replacing, or deleting as needed)
//! and reports the resulting observed state. Each invocation re-reads
//! authoritative state from the remote system; nothing is cached.
//!
//! # Example
//! ```ignore
//! use pipectl_engine::{GatewayConfig, HttpGateway, Reconciler};
//!
//! let config = GatewayConfig::new("https://kibana.example.com", "elastic:changeme");
//! let reconciler = Reconciler::new(HttpGateway::new(&config)?);
//! let observed = reconciler.reconcile(&spec).await?;
//! ```

pub mod codec;
pub mod config;
pub mod drift;
pub mod error;
pub mod gateway;
pub mod model;
pub mod reconciler;
pub mod resolver;

// Re-export commonly used types at crate root
pub use codec::{Codec, KeyStyle};
pub use config::GatewayConfig;
pub use error::{Error, GatewayError, Phase, Result};
pub use gateway::{HttpGateway, PipelineGateway};
pub use model::{ObservedPipeline, PipelineIndexEntry, PipelineSettings, PipelineSpec, QueueType};
pub use reconciler::Reconciler;
