//! Translation between the typed pipeline model and the remote wire format.
//!
//! The codec is pure: it builds the body a write sends and parses the body
//! a read returns. The settings key names differ across remote API
//! generations (dotted vs underscored), so the mapping table is selected at
//! construction rather than hardcoded.

use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::model::{ObservedPipeline, PipelineSettings, PipelineSpec, QueueType};

/// Wire naming convention for settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// `pipeline.batch.delay`, `queue.max_bytes`, ...
    Dotted,
    /// `pipeline_batch_delay`, `queue_max_bytes`, ...
    Underscored,
}

#[derive(Debug)]
struct KeyTable {
    batch_delay: &'static str,
    batch_size: &'static str,
    workers: &'static str,
    queue_checkpoint_writes: &'static str,
    queue_max_bytes: &'static str,
    queue_type: &'static str,
}

static DOTTED: KeyTable = KeyTable {
    batch_delay: "pipeline.batch.delay",
    batch_size: "pipeline.batch.size",
    workers: "pipeline.workers",
    queue_checkpoint_writes: "queue.checkpoint.writes",
    queue_max_bytes: "queue.max_bytes",
    queue_type: "queue.type",
};

static UNDERSCORED: KeyTable = KeyTable {
    batch_delay: "pipeline_batch_delay",
    batch_size: "pipeline_batch_size",
    workers: "pipeline_workers",
    queue_checkpoint_writes: "queue_checkpoint_writes",
    queue_max_bytes: "queue_max_bytes",
    queue_type: "queue_type",
};

/// Pure two-way translator for pipeline bodies.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    keys: &'static KeyTable,
}

impl Codec {
    pub fn new(style: KeyStyle) -> Self {
        let keys = match style {
            KeyStyle::Dotted => &DOTTED,
            KeyStyle::Underscored => &UNDERSCORED,
        };
        Self { keys }
    }

    /// Build the write body for a spec.
    ///
    /// The id never appears in the body (it is part of the URL path, and
    /// some remote API generations reject a body that repeats it). Absent
    /// settings are omitted entirely so the remote system applies its own
    /// defaults; owner and last-modified are remote-assigned and never sent.
    pub fn encode(&self, spec: &PipelineSpec) -> Value {
        let mut body = Map::new();
        if let Some(description) = &spec.description {
            body.insert("description".into(), Value::from(description.clone()));
        }
        body.insert("pipeline".into(), Value::from(spec.definition.clone()));
        let settings = self.encode_settings(&spec.settings);
        if !settings.is_empty() {
            body.insert("settings".into(), Value::Object(settings));
        }
        Value::Object(body)
    }

    fn encode_settings(&self, settings: &PipelineSettings) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(v) = settings.batch_delay {
            out.insert(self.keys.batch_delay.into(), Value::from(v));
        }
        if let Some(v) = settings.batch_size {
            out.insert(self.keys.batch_size.into(), Value::from(v));
        }
        if let Some(v) = settings.workers {
            out.insert(self.keys.workers.into(), Value::from(v));
        }
        if let Some(v) = settings.queue_checkpoint_writes {
            out.insert(self.keys.queue_checkpoint_writes.into(), Value::from(v));
        }
        if let Some(v) = &settings.queue_max_bytes {
            out.insert(self.keys.queue_max_bytes.into(), Value::from(v.clone()));
        }
        if let Some(v) = settings.queue_type {
            out.insert(self.keys.queue_type.into(), Value::from(v.as_str()));
        }
        out
    }

    /// Parse a read body into observed state.
    ///
    /// Unknown settings keys are ignored so a newer remote schema does not
    /// break older callers.
    pub fn decode(&self, id: &str, body: &Value) -> Result<ObservedPipeline, GatewayError> {
        let definition = body
            .get("pipeline")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GatewayError::Decode(format!(
                    "response for pipeline {} is missing the \"pipeline\" field",
                    id
                ))
            })?
            .to_string();

        let description = body
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        let owner = body
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string);
        let last_modified = body
            .get("last_modified")
            .and_then(Value::as_str)
            .map(str::to_string);
        let settings = body
            .get("settings")
            .map(|v| self.decode_settings(v))
            .unwrap_or_default();

        Ok(ObservedPipeline {
            id: id.to_string(),
            description,
            definition,
            settings,
            owner,
            last_modified,
        })
    }

    fn decode_settings(&self, value: &Value) -> PipelineSettings {
        let mut out = PipelineSettings::default();
        let Some(map) = value.as_object() else {
            return out;
        };
        for (key, v) in map {
            if key == self.keys.batch_delay {
                out.batch_delay = v.as_i64();
            } else if key == self.keys.batch_size {
                out.batch_size = v.as_i64();
            } else if key == self.keys.workers {
                out.workers = v.as_i64();
            } else if key == self.keys.queue_checkpoint_writes {
                out.queue_checkpoint_writes = v.as_i64();
            } else if key == self.keys.queue_max_bytes {
                out.queue_max_bytes = v.as_str().map(str::to_string);
            } else if key == self.keys.queue_type {
                out.queue_type = v.as_str().and_then(|s| s.parse::<QueueType>().ok());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_spec() -> PipelineSpec {
        PipelineSpec {
            id: "apache-logs".to_string(),
            description: Some("Apache access logs".to_string()),
            definition: "input { beats { port => 5044 } }\noutput { elasticsearch {} }"
                .to_string(),
            settings: PipelineSettings {
                batch_delay: Some(50),
                batch_size: Some(125),
                workers: Some(2),
                queue_checkpoint_writes: Some(1024),
                queue_max_bytes: Some("1gb".to_string()),
                queue_type: Some(QueueType::Persisted),
            },
        }
    }

    #[test]
    fn encode_uses_dotted_keys_and_omits_id() {
        let body = Codec::new(KeyStyle::Dotted).encode(&full_spec());
        assert!(body.get("id").is_none());
        assert!(body.get("username").is_none());
        assert!(body.get("last_modified").is_none());
        assert_eq!(body["description"], "Apache access logs");
        assert_eq!(body["settings"]["pipeline.workers"], 2);
        assert_eq!(body["settings"]["queue.type"], "persisted");
    }

    #[test]
    fn encode_uses_underscored_keys_when_configured() {
        let body = Codec::new(KeyStyle::Underscored).encode(&full_spec());
        assert_eq!(body["settings"]["pipeline_workers"], 2);
        assert_eq!(body["settings"]["queue_max_bytes"], "1gb");
        assert!(body["settings"].get("pipeline.workers").is_none());
    }

    #[test]
    fn encode_omits_absent_fields_entirely() {
        let spec = PipelineSpec {
            id: "bare".to_string(),
            description: None,
            definition: "input {}".to_string(),
            settings: PipelineSettings::default(),
        };
        let body = Codec::new(KeyStyle::Dotted).encode(&spec);
        assert!(body.get("description").is_none());
        // Empty settings are dropped, not serialized as {}.
        assert!(body.get("settings").is_none());
    }

    #[test]
    fn decode_requires_the_pipeline_field() {
        let err = Codec::new(KeyStyle::Dotted)
            .decode("apache-logs", &json!({ "description": "x" }))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn decode_ignores_unknown_settings_keys() {
        let body = json!({
            "pipeline": "input {}",
            "username": "elastic",
            "settings": {
                "pipeline.workers": 4,
                "pipeline.ecs_compatibility": "v8"
            }
        });
        let observed = Codec::new(KeyStyle::Dotted)
            .decode("apache-logs", &body)
            .unwrap();
        assert_eq!(observed.settings.workers, Some(4));
        assert_eq!(observed.owner.as_deref(), Some("elastic"));
    }

    #[test]
    fn decode_tolerates_missing_settings() {
        let observed = Codec::new(KeyStyle::Dotted)
            .decode("apache-logs", &json!({ "pipeline": "input {}" }))
            .unwrap();
        assert_eq!(observed.settings, PipelineSettings::default());
    }

    #[test]
    fn round_trip_preserves_caller_fields() {
        let spec = full_spec();
        let codec = Codec::new(KeyStyle::Dotted);
        let observed = codec.decode(&spec.id, &codec.encode(&spec)).unwrap();
        assert_eq!(observed.id, spec.id);
        assert_eq!(observed.description, spec.description);
        assert_eq!(observed.definition, spec.definition);
        assert_eq!(observed.settings, spec.settings);
        // Remote-only fields are absent until the remote system assigns them.
        assert_eq!(observed.owner, None);
        assert_eq!(observed.last_modified, None);
    }
}
