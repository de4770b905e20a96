//! Submission gateway contract.
//!
//! A gateway delivers one payload and reports whether the transport accepted
//! it. Callers never change user-visible state on failure: the outcome is only
//! logged (see [`deliver`]).

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::payload::Submission;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sink for completed survey and lead payloads.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, payload: &Submission) -> Result<(), GatewayError>;
}

/// What the gateway reported. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered,
    Failed,
}

/// Hands `payload` to `gateway`, logging and swallowing any failure.
pub async fn deliver(gateway: &dyn SubmissionGateway, payload: &Submission) -> SubmissionOutcome {
    match gateway.submit(payload).await {
        Ok(()) => {
            info!(kind = payload.kind(), "submission delivered");
            SubmissionOutcome::Delivered
        }
        Err(err) => {
            error!(kind = payload.kind(), error = %err, "submission failed");
            SubmissionOutcome::Failed
        }
    }
}

/// Used when no endpoint is configured: logs the payload and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogGateway;

#[async_trait]
impl SubmissionGateway for LogGateway {
    async fn submit(&self, payload: &Submission) -> Result<(), GatewayError> {
        let json = serde_json::to_string(payload)?;
        warn!(payload = %json, "submission endpoint not set; payload was not sent");
        Ok(())
    }
}

/// Keeps every payload in memory. Optionally fails after recording.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    sent: Arc<Mutex<Vec<Submission>>>,
    fail_with: Option<String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails with a transport error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            fail_with: Some(reason.into()),
        }
    }

    /// Payloads handed over so far, in call order.
    pub fn sent(&self) -> Vec<Submission> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SubmissionGateway for MemoryGateway {
    async fn submit(&self, payload: &Submission) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
        match &self.fail_with {
            Some(reason) => Err(GatewayError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}
