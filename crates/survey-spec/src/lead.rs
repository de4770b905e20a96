//! Early-access lead form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::gateway::{SubmissionGateway, SubmissionOutcome, deliver};
use crate::payload::{LeadPayload, Submission, format_timestamp};
use crate::wizard::Toggle;

/// Interest tags offered by the landing page.
pub const DEFAULT_INTERESTS: &[&str] = &[
    "Desk access",
    "Meeting space",
    "Business address",
    "Podcast / Recording",
    "Events",
];

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("compile email pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Idle,
    Submitting,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeadFormError {
    #[error("a name is required")]
    MissingName,
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("the form is {0:?}; only an idle form can be submitted")]
    NotIdle(LeadStatus),
}

/// Returns whether `email` looks like `local@domain`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

#[derive(Debug, Clone)]
pub struct LeadForm {
    name: String,
    email: String,
    message: String,
    interests: Vec<String>,
    status: LeadStatus,
    clock: fn() -> OffsetDateTime,
}

impl Default for LeadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadForm {
    pub fn new() -> Self {
        Self::with_clock(OffsetDateTime::now_utc)
    }

    pub fn with_clock(clock: fn() -> OffsetDateTime) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            message: String::new(),
            interests: Vec::new(),
            status: LeadStatus::Idle,
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn interests(&self) -> &[String] {
        &self.interests
    }

    pub fn status(&self) -> LeadStatus {
        self.status
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Adds or removes an interest tag. There is no limit.
    pub fn toggle_interest(&mut self, interest: &str) -> Toggle {
        if let Some(position) = self.interests.iter().position(|value| value == interest) {
            self.interests.remove(position);
            return Toggle::Removed;
        }
        self.interests.push(interest.to_string());
        Toggle::Added
    }

    /// Checks the name and email a browser would require before submitting.
    pub fn check(&self) -> Result<(), LeadFormError> {
        if self.name.trim().is_empty() {
            return Err(LeadFormError::MissingName);
        }
        if !is_valid_email(&self.email) {
            return Err(LeadFormError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    /// Submits the form. Ends in `success` even when the gateway fails.
    pub async fn submit(
        &mut self,
        gateway: &dyn SubmissionGateway,
    ) -> Result<SubmissionOutcome, LeadFormError> {
        if self.status != LeadStatus::Idle {
            return Err(LeadFormError::NotIdle(self.status));
        }
        self.check()?;

        self.status = LeadStatus::Submitting;
        let payload = Submission::EarlyAccess(LeadPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            interests: self.interests.clone(),
            timestamp: format_timestamp((self.clock)()),
        });
        let outcome = deliver(gateway, &payload).await;
        self.status = LeadStatus::Success;
        info!(interests = self.interests.len(), ?outcome, "early access request recorded");
        Ok(outcome)
    }

    /// Returns a successful form to `idle` so another request can be sent.
    /// Field values are kept.
    pub fn reset(&mut self) -> bool {
        if self.status != LeadStatus::Success {
            return false;
        }
        self.status = LeadStatus::Idle;
        debug!("lead form reset");
        true
    }
}
