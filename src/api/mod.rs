//! SMTP2GO provider API integration
//!
//! - **Client** - async HTTP client for the SMTP user listing and email history queries
//! - **Shapes** - ordered response-envelope matchers and entry decoders
//! - **Retry** - exponential backoff and per-attempt timeout helpers
//!
//! Every query degrades to an empty result on failure; errors are reported
//! through the injected [`ReportObserver`](crate::observer::ReportObserver).

pub mod client;
pub mod retry;
pub mod shapes;

// Re-export main types
pub use client::{Smtp2GoClient, API_KEY_HEADER, EMAIL_HISTORY_ENDPOINT, SMTP_USERS_ENDPOINT};
pub use retry::{calculate_next_backoff, execute_with_timeout, retry_with_backoff, RetryPolicy};
pub use shapes::{first_match, ShapeMatcher, IDENTITY_SHAPES, TRAFFIC_SHAPES};
