//! SMTP2GO Monthly Usage Reporter
//!
//! Fetches per-user email statistics from the SMTP2GO API, reconciles them
//! into a monthly summary, renders a PDF and emails it to the configured
//! recipients.

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod email;
pub mod errors;
pub mod observer;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;
