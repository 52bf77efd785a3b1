//! Remote gateway: the HTTP seam between the engine and the management API.
//!
//! The engine only ever talks to the [`PipelineGateway`] trait; the
//! reqwest-backed [`HttpGateway`] is the production implementation.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::codec::Codec;
use crate::config::{self, GatewayConfig};
use crate::error::{Error, GatewayError};
use crate::model::{ObservedPipeline, PipelineIndexEntry, PipelineSpec};

const PIPELINE_PATH: &str = "/api/logstash/pipeline";
const PIPELINES_PATH: &str = "/api/logstash/pipelines";

/// Remote operations the engine needs, one method per wire call.
#[async_trait]
pub trait PipelineGateway: Send + Sync {
    /// Full listing of pipelines known to the remote system.
    async fn list(&self) -> Result<Vec<PipelineIndexEntry>, GatewayError>;

    /// Authoritative state of one pipeline.
    async fn fetch(&self, id: &str) -> Result<ObservedPipeline, GatewayError>;

    /// Idempotent create-or-replace.
    async fn put(&self, id: &str, spec: &PipelineSpec) -> Result<(), GatewayError>;

    async fn delete(&self, id: &str) -> Result<(), GatewayError>;
}

#[derive(Debug, Deserialize)]
struct PipelineListing {
    #[serde(default)]
    pipelines: Vec<PipelineIndexEntry>,
}

/// Error body the remote system returns on rejection.
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// reqwest-backed gateway for the Kibana Logstash management API.
pub struct HttpGateway {
    base_url: String,
    username: String,
    password: String,
    codec: Codec,
    http: Client,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, Error> {
        let (username, password) = config::split_cloud_auth(&config.cloud_auth)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Validation(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            codec: Codec::new(config.key_style),
            http,
        })
    }

    fn pipeline_url(&self, id: &str) -> String {
        config::join_url(&config::join_url(&self.base_url, PIPELINE_PATH), id)
    }

    /// Attach the headers every call requires and execute the request.
    /// Non-2xx responses become classified [`GatewayError::Remote`] values.
    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("kbn-xsrf", "true")
            .header(CACHE_CONTROL, "no-cache")
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(remote_error(status, response).await)
        }
    }
}

/// Surface the remote system's own message when its error body decodes,
/// otherwise fall back to the bare status code.
async fn remote_error(status: StatusCode, response: Response) -> GatewayError {
    let message = match response.json::<RemoteErrorBody>().await {
        Ok(body) => body
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("status code {}", status.as_u16())),
        Err(_) => format!("status code {}", status.as_u16()),
    };
    GatewayError::Remote {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PipelineGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<PipelineIndexEntry>, GatewayError> {
        let url = config::join_url(&self.base_url, PIPELINES_PATH);
        debug!("GET {}", url);
        let response = self.send(self.http.get(&url)).await?;
        let listing: PipelineListing = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("pipeline listing: {}", e)))?;
        Ok(listing.pipelines)
    }

    async fn fetch(&self, id: &str) -> Result<ObservedPipeline, GatewayError> {
        let url = self.pipeline_url(id);
        debug!("GET {}", url);
        let response = self.send(self.http.get(&url)).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("pipeline {}: {}", id, e)))?;
        self.codec.decode(id, &body)
    }

    async fn put(&self, id: &str, spec: &PipelineSpec) -> Result<(), GatewayError> {
        let url = self.pipeline_url(id);
        let body = self.codec.encode(spec);
        debug!("PUT {}", url);
        self.send(self.http.put(&url).body(body.to_string())).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let url = self.pipeline_url(id);
        debug!("DELETE {}", url);
        self.send(self.http.delete(&url)).await?;
        Ok(())
    }
}
