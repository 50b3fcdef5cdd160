//! Unit Tests Module
//!
//! Component-level tests for the API client, configuration loading and
//! report rendering.

pub mod api_client;
pub mod config_loading;
pub mod report_rendering;
