//! HTTP transport to the enterprise backend
//!
//! Every remote operation is a SOAP 1.1 POST over a pooled connection owned
//! by one dispatcher worker.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher worker
//!    ↓ owns
//! WorkerConnection (lazy reqwest::Client, pooled)
//!    ↓ used by
//! OperationClient → render → envelope → POST → InvocationResult
//! ```
//!
//! # Failure model
//!
//! - Validation and credential problems are `Err(BrokerError)` and happen
//!   before any network I/O
//! - Timeouts, connection failures and non-2xx replies are returned as
//!   [`InvocationOutcome`] values, never as errors
//! - Connection-establishment failures are retried a bounded number of times

pub mod client;
pub mod connection;
pub mod envelope;

pub use client::OperationClient;
pub use connection::{ConnectionStats, WorkerConnection};

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Pool limits and transport behaviour for worker connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_per_host: usize,
    /// Caps the idle connections kept per host together with `max_per_host`.
    ///
    /// reqwest has no global pool limit, so this is not enforced across
    /// hosts; with one backend host per deployment the two limits coincide.
    pub max_total: usize,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
    /// Retries on connection-establishment failures only
    pub retries: u32,
    pub accept_invalid_certs: bool,
}

impl PoolSettings {
    /// Idle connections kept per host, bounded by the total limit
    pub fn idle_per_host(&self) -> usize {
        self.max_per_host.min(self.max_total)
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        use crate::constants::{defaults, http};
        Self {
            max_per_host: defaults::POOL_MAX_PER_HOST,
            max_total: defaults::POOL_MAX_TOTAL,
            idle_timeout: http::POOL_IDLE_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            retries: defaults::TRANSPORT_RETRIES,
            accept_invalid_certs: false,
        }
    }
}

/// What happened to one remote call that got past validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// 2xx reply; the extracted SOAP body as JSON, or the raw reply text
    Success { payload: String },
    /// The backend answered with a non-2xx status
    RemoteApplicationError { status: u16, body: String },
    TransportTimeout { timeout_seconds: u64 },
    TransportError { message: String },
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationOutcome::Success { payload } => write!(f, "{}", payload),
            InvocationOutcome::RemoteApplicationError { status, body } => {
                write!(f, "HTTP Error {}: {}", status, body)
            }
            InvocationOutcome::TransportTimeout { timeout_seconds } => {
                write!(f, "Request timed out after {} seconds", timeout_seconds)
            }
            InvocationOutcome::TransportError { message } => {
                write!(f, "Transport error: {}", message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    pub success: bool,
    pub outcome: InvocationOutcome,
}

impl InvocationResult {
    pub fn from_outcome(outcome: InvocationOutcome) -> Self {
        Self {
            success: matches!(outcome, InvocationOutcome::Success { .. }),
            outcome,
        }
    }

    pub fn payload(&self) -> Option<&str> {
        match &self.outcome {
            InvocationOutcome::Success { payload } => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for InvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.outcome, f)
    }
}
