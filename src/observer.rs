//! Diagnostic events emitted by the fetcher and the aggregator
//!
//! Both components take a `&dyn ReportObserver` instead of logging directly,
//! so the core's return values stay free of diagnostics and tests can assert
//! on what was observed.

use crate::errors::FetchError;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something worth telling an operator about while a report is built
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A provider request is about to be sent
    RequestStarted { endpoint: String },
    /// A provider request completed with an HTTP status
    ResponseReceived { endpoint: String, status: u16 },
    /// An attempt failed and another one is scheduled
    RetryScheduled {
        endpoint: String,
        attempt: usize,
        backoff: Duration,
        error: FetchError,
    },
    /// A query failed for good; the caller continues with empty data
    FetchFailed { error: FetchError },
    /// A response envelope was recognised
    ShapeMatched {
        endpoint: String,
        shape: &'static str,
        records: usize,
    },
    /// No known envelope matched; keys are the response's top-level keys
    ShapeUnmatched { endpoint: String, keys: Vec<String> },
    /// An entry inside a recognised envelope could not be decoded
    RecordSkipped { endpoint: String, reason: String },
    /// The same username was listed more than once; the later entry wins
    DuplicateIdentity { username: String },
    /// Traffic arrived for a username with no registered identity
    OrphanTraffic { username: String },
    /// bounced + rejected exceeded sent; failures were capped at sent
    CountersClamped {
        username: String,
        sent: u64,
        reported_failed: u64,
    },
    /// Final roll-up of a reconciliation
    TotalsComputed {
        users: usize,
        sent: u64,
        delivered: u64,
        failed: u64,
    },
}

/// Sink for diagnostic events
pub trait ReportObserver: Send + Sync {
    fn observe(&self, event: ReportEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReportObserver for TracingObserver {
    fn observe(&self, event: ReportEvent) {
        match event {
            ReportEvent::RequestStarted { endpoint } => {
                info!("Making API request to: {}", endpoint)
            }
            ReportEvent::ResponseReceived { endpoint, status } => {
                info!("API response status code {} from {}", status, endpoint)
            }
            ReportEvent::RetryScheduled {
                endpoint,
                attempt,
                backoff,
                error,
            } => warn!(
                "API attempt {} failed for {}, retrying in {:?}: {}",
                attempt, endpoint, backoff, error
            ),
            ReportEvent::FetchFailed { error } => {
                warn!("API request failed, continuing with empty data: {}", error)
            }
            ReportEvent::ShapeMatched {
                endpoint,
                shape,
                records,
            } => info!(
                "Found {} records in '{}' envelope from {}",
                records, shape, endpoint
            ),
            ReportEvent::ShapeUnmatched { endpoint, keys } => warn!(
                "Unrecognised response shape from {} (keys: {:?})",
                endpoint, keys
            ),
            ReportEvent::RecordSkipped { endpoint, reason } => {
                debug!("Skipping entry from {}: {}", endpoint, reason)
            }
            ReportEvent::DuplicateIdentity { username } => {
                debug!("Duplicate SMTP user '{}', keeping last entry", username)
            }
            ReportEvent::OrphanTraffic { username } => {
                debug!("No SMTP user registered for '{}'", username)
            }
            ReportEvent::CountersClamped {
                username,
                sent,
                reported_failed,
            } => warn!(
                "User {}: {} failures reported for {} sent, capping at sent",
                username, reported_failed, sent
            ),
            ReportEvent::TotalsComputed {
                users,
                sent,
                delivered,
                failed,
            } => info!(
                "Total stats: users={}, sent={}, delivered={}, failed={}",
                users, sent, delivered, failed
            ),
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ReportObserver for NullObserver {
    fn observe(&self, _event: ReportEvent) {}
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ReportObserver for RecordingObserver {
    fn observe(&self, event: ReportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
