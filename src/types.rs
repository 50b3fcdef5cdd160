//! SMTP2GO Usage Reporter - Type System
//!
//! - `usage`: Provider-side records (Identity, TrafficRecord) and the report period
//! - `report`: Derived records handed to the rendering boundary (UserStat, ReportSummary)

mod report;
mod usage;

pub use report::*;
pub use usage::*;
