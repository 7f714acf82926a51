//! The update loop.
//!
//! Each cycle probes the local IPv6 address, publishes it when it differs
//! from the last successfully published one, and decides from the
//! provider's answer whether to carry on, back off or stop:
//!
//! ```text
//! Probing ──same──▶ Unchanged ──────────────┐
//!    │                                      │ sleep(interval)
//!    └─changed─▶ Publishing ──good/nochg─▶ Updated
//!                    │
//!                    ├──911──▶ TransientWait ── sleep(30 min)
//!                    └──other──▶ Aborted (error)
//! ```
//!
//! Probe failures, transport errors and unknown status tokens end the loop
//! just like a fatal provider answer.

use crate::error::{DdnsError, Result};
use crate::probe::{AddressProbe, AddressSource};
use crate::provider::{UpdateParams, UpdateTransport};
use crate::response::{interpret, ProviderOutcome, RetryClass, TRANSIENT_BACKOFF};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};


/// Result of a single non-fatal cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Address matches the last published one; nothing was sent.
    Unchanged,
    /// Provider accepted the address.
    Updated(ProviderOutcome),
    /// Provider reported an outage; the address was not recorded.
    TransientWait(ProviderOutcome),
}

impl CycleOutcome {
    /// How long to wait before the next probe.
    pub fn wait(&self, interval: Duration) -> Duration {
        match self {
            CycleOutcome::TransientWait(_) => TRANSIENT_BACKOFF,
            CycleOutcome::Unchanged | CycleOutcome::Updated(_) => interval,
        }
    }
}

/// Keeps one hostname pointed at the host's current IPv6 address.
pub struct UpdateController<S, T> {
    host_name: String,
    interval: Duration,
    probe: AddressProbe<S>,
    transport: T,
    last_published: Option<String>,
    last_published_at: Option<DateTime<Utc>>,
}

impl<S: AddressSource, T: UpdateTransport> UpdateController<S, T> {
    /// Create a controller with no published address, so the first cycle
    /// always publishes.
    pub fn new(
        host_name: impl Into<String>,
        interval: Duration,
        probe: AddressProbe<S>,
        transport: T,
    ) -> Self {
        Self {
            host_name: host_name.into(),
            interval,
            probe,
            transport,
            last_published: None,
            last_published_at: None,
        }
    }

    pub fn last_published(&self) -> Option<&str> {
        self.last_published.as_deref()
    }

    pub fn last_published_at(&self) -> Option<DateTime<Utc>> {
        self.last_published_at
    }

    /// Run cycles until one fails.
    pub async fn run(&mut self) -> Result<()> {
        info!("Host is: '{}'", self.host_name);
        info!(
            "Checking for new ip every {} minutes",
            self.interval.as_secs() / 60
        );

        loop {
            let cycle = self.run_cycle().await?;
            let wait = cycle.wait(self.interval);

            debug!(
                "Next check in {} minutes, sleeping now...",
                wait.as_secs() / 60
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Probe once and publish if the address changed.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let current = self.probe.current_ipv6().await?;
        info!("Current ip is {}", current);

        if self.last_published.as_deref() == Some(current.as_str()) {
            if let Some(at) = self.last_published_at {
                info!("Address unchanged since {}", at.format("%Y-%m-%d %H:%M:%S"));
            }
            return Ok(CycleOutcome::Unchanged);
        }

        info!(
            previous = self.last_published.as_deref().unwrap_or("<none>"),
            "Detected a new ipv6 address, updating {}", self.host_name
        );

        let outcome = self.publish(&current).await?;
        if outcome.is_transient() {
            warn!(
                "Provider unavailable, retrying in {} minutes",
                TRANSIENT_BACKOFF.as_secs() / 60
            );
            return Ok(CycleOutcome::TransientWait(outcome));
        }

        Ok(CycleOutcome::Updated(outcome))
    }

    /// Send `address` to the provider and apply the answer to the state.
    ///
    /// Returns the outcome for success and transient answers; fatal answers
    /// become [`DdnsError::ProviderFailure`].
    pub async fn publish(&mut self, address: &str) -> Result<ProviderOutcome> {
        let params = UpdateParams::ipv6_only(&self.host_name, address);
        let body = self.transport.call_provider(&params).await?;
        let raw = body.trim();
        debug!("Provider answered {:?}", raw);

        let outcome = interpret(raw)?;
        info!("Update result: {}", outcome);

        match outcome.retry {
            RetryClass::None => {
                self.last_published = Some(address.to_string());
                self.last_published_at = Some(Utc::now());
                Ok(outcome)
            }
            RetryClass::Transient => Ok(outcome),
            RetryClass::Fatal => {
                error!("Aborting: {}", outcome);
                Err(DdnsError::ProviderFailure(outcome))
            }
        }
    }
}
