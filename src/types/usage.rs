//! Records decoded from the provider API and the period they cover

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Username substituted for history entries that arrive without one
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// A named sending entity (SMTP user) under the provider account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub display_name: String,
    pub email: String,
}

impl Identity {
    pub fn new(
        username: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

/// Sent/bounced/rejected counters for one identity over the report period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub username: String,
    pub sent: u64,
    pub bounced: u64,
    pub rejected: u64,
}

impl TrafficRecord {
    pub fn new(username: impl Into<String>, sent: u64, bounced: u64, rejected: u64) -> Self {
        Self {
            username: username.into(),
            sent,
            bounced,
            rejected,
        }
    }
}

/// Inclusive, time-zone-aware date range a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl ReportPeriod {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// Human-readable form, e.g. "February 01, 2025 - February 28, 2025"
    pub fn formatted(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%B %d, %Y"),
            self.end.format("%B %d, %Y")
        )
    }

    /// File-name slug of the starting month, e.g. "2025_02"
    pub fn slug(&self) -> String {
        self.start.format("%Y_%m").to_string()
    }
}
