//! Transports used by the command line.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use survey_spec::{GatewayError, LogGateway, Submission, SubmissionGateway};
use tracing::debug;
use url::Url;

use crate::config::Settings;

/// POSTs each payload as JSON to a fixed endpoint.
///
/// The response is never inspected: any HTTP status counts as delivered and
/// only transport failures (refused connection, DNS, TLS, timeout) are
/// reported as errors.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGateway {
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionGateway for HttpGateway {
    async fn submit(&self, payload: &Submission) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        debug!(status = %response.status(), endpoint = %self.endpoint, "endpoint answered");
        Ok(())
    }
}

/// Prints each payload to stdout instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutGateway;

#[async_trait]
impl SubmissionGateway for StdoutGateway {
    async fn submit(&self, payload: &Submission) -> Result<(), GatewayError> {
        println!("{}", payload.to_json_pretty()?);
        Ok(())
    }
}

/// Picks the transport for this run.
pub fn build(settings: &Settings, dry_run: bool) -> Result<Arc<dyn SubmissionGateway>> {
    if dry_run {
        return Ok(Arc::new(StdoutGateway));
    }
    match &settings.endpoint {
        Some(endpoint) => {
            let gateway = HttpGateway::new(endpoint.clone(), settings.timeout)
                .with_context(|| format!("failed to build HTTP client for {endpoint}"))?;
            Ok(Arc::new(gateway))
        }
        None => Ok(Arc::new(LogGateway)),
    }
}
