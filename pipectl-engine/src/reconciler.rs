//! Reconciliation engine: drives a pipeline spec to convergence against
//! the remote system and reports the converged observed state.
//!
//! One invocation is single-shot: validate, resolve existence, create or
//! replace or skip, then read back. Remote calls run strictly sequentially
//! and failures are returned to the caller wrapped with the phase that
//! failed; retry policy belongs to the caller.

use tracing::{debug, info};

use crate::drift;
use crate::error::{Error, GatewayError, Phase, Result};
use crate::gateway::PipelineGateway;
use crate::model::{ObservedPipeline, PipelineIndexEntry, PipelineSpec};
use crate::resolver;

/// Orchestrator over an injected gateway. Holds no state across calls;
/// concurrent reconciliation of different ids is safe, same-id ordering
/// is the caller's responsibility.
pub struct Reconciler<G> {
    gateway: G,
}

impl<G: PipelineGateway> Reconciler<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Converge the remote pipeline to `spec` and return what the remote
    /// system reports afterwards.
    ///
    /// The write is skipped when no caller-significant field differs; any
    /// single differing field triggers a full replace (the remote API has
    /// no partial-patch semantics). The final read is the authoritative
    /// post-condition since a write returns no body to trust.
    pub async fn reconcile(&self, spec: &PipelineSpec) -> Result<ObservedPipeline> {
        spec.validate()?;

        let exists = resolver::exists(&self.gateway, &spec.id)
            .await
            .map_err(wrap(Phase::Resolve))?;

        if exists {
            let current = self
                .gateway
                .fetch(&spec.id)
                .await
                .map_err(wrap(Phase::Read))?;
            let changed = drift::changed_fields(spec, &current);
            if changed.is_empty() {
                info!("Pipeline {} is up to date", spec.id);
            } else {
                debug!("Pipeline {} drifted: {}", spec.id, changed.join(", "));
                info!("Replacing pipeline {}", spec.id);
                self.gateway
                    .put(&spec.id, spec)
                    .await
                    .map_err(wrap(Phase::Write))?;
            }
        } else {
            info!("Creating pipeline {}", spec.id);
            self.gateway
                .put(&spec.id, spec)
                .await
                .map_err(wrap(Phase::Write))?;
        }

        self.gateway
            .fetch(&spec.id)
            .await
            .map_err(wrap(Phase::Read))
    }

    /// Authoritative state of one pipeline.
    pub async fn fetch(&self, id: &str) -> Result<ObservedPipeline> {
        self.gateway.fetch(id).await.map_err(wrap(Phase::Read))
    }

    /// Listing of all pipelines known to the remote system.
    pub async fn list(&self) -> Result<Vec<PipelineIndexEntry>> {
        self.gateway.list().await.map_err(wrap(Phase::Resolve))
    }

    /// Delete the pipeline. A remote not-found is success: the desired
    /// end-state (absence) already holds.
    pub async fn delete(&self, id: &str) -> Result<()> {
        match self.gateway.delete(id).await {
            Ok(()) => {
                info!("Deleted pipeline {}", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!("Pipeline {} already absent", id);
                Ok(())
            }
            Err(e) => Err(Error::Gateway {
                phase: Phase::Delete,
                source: e,
            }),
        }
    }
}

fn wrap(phase: Phase) -> impl FnOnce(GatewayError) -> Error {
    move |source| Error::Gateway { phase, source }
}
