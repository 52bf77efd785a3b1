//! Typed pipeline model: desired specs, observed state, and listing entries.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Desired state of a centrally managed pipeline.
///
/// The `id` is unique and immutable once created; changing it means
/// delete-and-recreate, not update. The `definition` is a blob in the
/// remote system's own pipeline DSL and is never parsed here beyond
/// non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub id: String,
    pub description: Option<String>,
    pub definition: String,
    pub settings: PipelineSettings,
}

impl PipelineSpec {
    /// Check the spec before any remote call is made.
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::Validation("pipeline id must not be empty".into()));
        }
        if self.definition.is_empty() {
            return Err(Error::Validation(
                "pipeline definition must not be empty".into(),
            ));
        }
        self.settings.validate()
    }
}

/// Tuning parameters for a pipeline.
///
/// Every parameter is optional: an absent parameter is omitted from the
/// wire body entirely, so the remote system applies its own default.
/// Presence is an explicit override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub batch_delay: Option<i64>,
    pub batch_size: Option<i64>,
    pub workers: Option<i64>,
    pub queue_checkpoint_writes: Option<i64>,
    pub queue_max_bytes: Option<String>,
    pub queue_type: Option<QueueType>,
}

impl PipelineSettings {
    /// The defaults the remote system applies when a parameter is omitted,
    /// for callers that want them pinned explicitly.
    pub fn remote_defaults() -> Self {
        Self {
            batch_delay: Some(50),
            batch_size: Some(125),
            workers: Some(1),
            queue_checkpoint_writes: Some(1024),
            queue_max_bytes: Some("1gb".to_string()),
            queue_type: Some(QueueType::Memory),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let minimums = [
            ("batch_delay", self.batch_delay),
            ("batch_size", self.batch_size),
            ("workers", self.workers),
            ("queue_checkpoint_writes", self.queue_checkpoint_writes),
        ];
        for (name, value) in minimums {
            if let Some(v) = value {
                if v < 1 {
                    return Err(Error::Validation(format!(
                        "expected {} to be at least 1, got {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Queue implementation backing a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueType {
    Memory,
    Persisted,
}

impl QueueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::Memory => "memory",
            QueueType::Persisted => "persisted",
        }
    }
}

impl std::str::FromStr for QueueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(QueueType::Memory),
            "persisted" => Ok(QueueType::Persisted),
            other => Err(Error::Validation(format!(
                "expected queue_type to be one of [memory persisted], got {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for QueueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state of a pipeline as reported by the remote system.
///
/// `owner` and `last_modified` are remote-assigned and are never sent
/// back on writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedPipeline {
    pub id: String,
    pub description: Option<String>,
    pub definition: String,
    pub settings: PipelineSettings,
    pub owner: Option<String>,
    pub last_modified: Option<String>,
}

/// Lightweight listing record from the bulk-listing endpoint.
///
/// Used for existence checks only, never for full state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineIndexEntry {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(rename = "username", default)]
    pub owner: Option<String>,
}
