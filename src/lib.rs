//! # noipv6-duc
//!
//! A dynamic DNS update client that keeps one hostname pointed at the
//! host's current IPv6 address.
//!
//! ## Features
//!
//! - Local IPv6 discovery from the host's interface addresses
//! - No-IP compatible update protocol with basic authentication
//! - Fail-fast handling of provider errors, 30 minute back-off on `911`
//! - Configurable check interval
//!
//! ## Usage
//!
//! ```bash
//! # Run the update loop
//! noipv6-duc run
//!
//! # Show the address that would be published
//! noipv6-duc status
//!
//! # Publish once
//! noipv6-duc update
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod probe;
pub mod provider;
pub mod response;

pub use config::Config;
pub use controller::{CycleOutcome, UpdateController};
pub use error::{DdnsError, Result};
pub use probe::AddressProbe;
pub use response::{interpret, ProviderOutcome, RetryClass};
