//! Projection of observed remote state into the caller's desired-state shape.

use crate::model::{ObservedPipeline, PipelineSpec};

/// Strip the remote-assigned fields from observed state so it can be
/// compared against (or stored as) a desired spec.
pub fn project(observed: &ObservedPipeline) -> PipelineSpec {
    PipelineSpec {
        id: observed.id.clone(),
        description: observed.description.clone(),
        definition: observed.definition.clone(),
        settings: observed.settings.clone(),
    }
}

/// Names of the caller-significant fields where desired and observed state
/// differ. Empty means converged. An unset description and an empty one
/// compare equal, matching how the remote system stores them.
pub fn changed_fields(desired: &PipelineSpec, observed: &ObservedPipeline) -> Vec<&'static str> {
    let mut changed = Vec::new();

    if desired.description.as_deref().unwrap_or("")
        != observed.description.as_deref().unwrap_or("")
    {
        changed.push("description");
    }
    if desired.definition != observed.definition {
        changed.push("definition");
    }

    let a = &desired.settings;
    let b = &observed.settings;
    if a.batch_delay != b.batch_delay {
        changed.push("settings.batch_delay");
    }
    if a.batch_size != b.batch_size {
        changed.push("settings.batch_size");
    }
    if a.workers != b.workers {
        changed.push("settings.workers");
    }
    if a.queue_checkpoint_writes != b.queue_checkpoint_writes {
        changed.push("settings.queue_checkpoint_writes");
    }
    if a.queue_max_bytes != b.queue_max_bytes {
        changed.push("settings.queue_max_bytes");
    }
    if a.queue_type != b.queue_type {
        changed.push("settings.queue_type");
    }

    changed
}
