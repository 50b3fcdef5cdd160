//! Derived report records
//!
//! Built once per run by the aggregator and never mutated afterwards.

use super::usage::ReportPeriod;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Number of users shown in the condensed "top users" views
pub const TOP_USERS_LIMIT: usize = 5;

/// Per-identity delivery statistics for the report period
///
/// `sent == delivered + failed` holds for every value produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStat {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub sent: u64,
    pub delivered: u64,
    pub failed: u64,
    pub delivery_rate: f64,
}

/// Roll-up totals across all users
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTotals {
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
    pub delivery_rate: f64,
    pub total_users: usize,
}

/// The consolidated report handed to the rendering/distribution boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub period: ReportPeriod,
    pub period_formatted: String,
    pub summary: SummaryTotals,
    /// Ordered by `sent` descending
    pub users: Vec<UserStat>,
    pub generated_at: DateTime<FixedOffset>,
}

impl ReportSummary {
    /// Leading slice of the ordered user list for condensed views
    pub fn top_users(&self, limit: usize) -> &[UserStat] {
        &self.users[..self.users.len().min(limit)]
    }

    pub fn has_activity(&self) -> bool {
        !self.users.is_empty()
    }
}
