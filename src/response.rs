//! Interpretation of provider status tokens.
//!
//! See <https://www.noip.com/integrate/response> for the provider's own
//! description of each code.

use crate::error::{DdnsError, Result};
use std::fmt;
use std::time::Duration;

/// How long to wait after a `911` before probing again.
pub const TRANSIENT_BACKOFF: Duration = Duration::from_secs(30 * 60);

/// What the update loop should do with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Update applied or already current.
    None,
    /// Stop the process; retrying needs operator intervention.
    Fatal,
    /// Provider-side outage; wait [`TRANSIENT_BACKOFF`] and try again.
    Transient,
}

/// A provider status token mapped to its meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutcome {
    /// Trimmed response body as returned by the provider.
    pub raw_status: String,
    /// Whether the hostname now points at the published address.
    pub success: bool,
    /// Operator-facing description of the status.
    pub description: &'static str,
    /// Retry classification.
    pub retry: RetryClass,
}

impl ProviderOutcome {
    fn new(raw_status: &str, success: bool, retry: RetryClass, description: &'static str) -> Self {
        Self {
            raw_status: raw_status.to_string(),
            success,
            description,
            retry,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.retry == RetryClass::Transient
    }

    pub fn is_fatal(&self) -> bool {
        self.retry == RetryClass::Fatal
    }
}

impl fmt::Display for ProviderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            if self.success { "SUCCESS" } else { "FAILURE" },
            self.raw_status,
            self.description
        )
    }
}

/// Map a raw status token to a [`ProviderOutcome`].
///
/// Matching is case-sensitive. `good ` and `nochg ` are prefixes (they are
/// followed by the address); everything else must match exactly.
pub fn interpret(raw_status: &str) -> Result<ProviderOutcome> {
    let outcome = if raw_status.starts_with("good ") {
        ProviderOutcome::new(
            raw_status,
            true,
            RetryClass::None,
            "DNS hostname update successful.",
        )
    } else if raw_status.starts_with("nochg ") {
        ProviderOutcome::new(
            raw_status,
            true,
            RetryClass::None,
            "IP address is current, no update performed.",
        )
    } else {
        match raw_status {
            "nohost" => ProviderOutcome::new(
                raw_status,
                false,
                RetryClass::Fatal,
                "Hostname supplied does not exist under specified account.",
            ),
            "badauth" => ProviderOutcome::new(
                raw_status,
                false,
                RetryClass::Fatal,
                "Invalid username password combination.",
            ),
            "badagent" => ProviderOutcome::new(
                raw_status,
                false,
                RetryClass::Fatal,
                "Client disabled. Client should exit and not perform any more updates without user intervention.",
            ),
            "!donator" => ProviderOutcome::new(
                raw_status,
                false,
                RetryClass::Fatal,
                "An update request was sent, including a feature that is not available to that particular user such as offline options.",
            ),
            "abuse" => ProviderOutcome::new(
                raw_status,
                false,
                RetryClass::Fatal,
                "Username is blocked due to abuse. Either for not following our update specifications or disabled due to violation of the No-IP terms of service.",
            ),
            "911" => ProviderOutcome::new(
                raw_status,
                false,
                RetryClass::Transient,
                "A fatal error on our side such as a database outage. Retry the update no sooner than 30 minutes.",
            ),
            _ => return Err(DdnsError::UnrecognizedStatus(raw_status.to_string())),
        }
    };

    Ok(outcome)
}
