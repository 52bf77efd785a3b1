//! Existence checks against the remote listing.
//!
//! Direct lookup of an unknown id is a hard failure on some remote API
//! generations rather than a structured not-found, so existence is
//! resolved by scanning the full listing for an exact id match.

use crate::error::GatewayError;
use crate::gateway::PipelineGateway;

/// Whether `id` currently exists remotely.
///
/// A listing failure propagates: reporting "absent" on a failed list
/// would lead to a create over an existing pipeline.
pub async fn exists<G: PipelineGateway + ?Sized>(
    gateway: &G,
    id: &str,
) -> Result<bool, GatewayError> {
    let entries = gateway.list().await?;
    Ok(entries.iter().any(|entry| entry.id == id))
}
