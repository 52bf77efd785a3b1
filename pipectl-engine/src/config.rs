//! Gateway configuration: endpoint, credentials, timeout, wire key style.

use std::time::Duration;

use crate::codec::KeyStyle;
use crate::error::Error;

/// Per-call timeout applied to every remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for the remote management API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the management API (e.g. `https://kibana.example.com`).
    pub base_url: String,
    /// Composite `username:password` credential token.
    pub cloud_auth: String,
    pub timeout: Duration,
    /// Settings key convention the deployed remote API generation expects.
    pub key_style: KeyStyle,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, cloud_auth: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cloud_auth: cloud_auth.into(),
            timeout: DEFAULT_TIMEOUT,
            key_style: KeyStyle::Dotted,
        }
    }

    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Split a composite `username:password` token.
pub fn split_cloud_auth(token: &str) -> Result<(&str, &str), Error> {
    match token.split_once(':') {
        Some((username, password)) if !username.is_empty() => Ok((username, password)),
        _ => Err(Error::Validation(format!(
            "unexpected credential format ({:?}), expected username:password",
            token
        ))),
    }
}

/// Join a base URL and a path with exactly one `/` between them,
/// whatever the inputs carry.
pub fn join_url(base: &str, suffix: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        suffix.trim_start_matches('/')
    )
}
