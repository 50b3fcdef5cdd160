//! Usage aggregation
//!
//! Joins the SMTP user listing with the per-username traffic counters and
//! rolls them up into a single [`ReportSummary`](crate::types::ReportSummary).
//! Everything here is pure: the same inputs always yield the same summary.

pub mod reconcile;

pub use reconcile::{reconcile, user_stat};
