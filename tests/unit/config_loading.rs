use anyhow::Result;
use config::Map;
use serial_test::serial;
use smtp2go_usage::config::{AppConfig, ConfigOverrides, DEFAULT_SMTP_PORT};
use smtp2go_usage::errors::AppError;
use std::fs;
use std::path::PathBuf;

/// Tests for layered configuration loading
///
/// Precedence: command line > SMTP2GO_* environment > legacy JSON file > defaults.

fn no_env() -> Option<Map<String, String>> {
    Some(Map::new())
}

fn write_legacy_file(dir: &tempfile::TempDir, body: &str) -> Result<PathBuf> {
    let path = dir.path().join("config.json");
    fs::write(&path, body)?;
    Ok(path)
}

const LEGACY_JSON: &str = r#"{
    "api_key": "file-key",
    "smtp_server": "mail.example.com",
    "smtp_port": 2525,
    "smtp_username": "file-user",
    "smtp_password": "file-pass",
    "sender_email": "file@example.com",
    "report_recipients": ["ops@example.com", "cfo@example.com"],
    "report_subject_template": "Usage for {period}"
}"#;

#[test]
fn test_legacy_file_is_loaded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let overrides = ConfigOverrides {
        config_file: Some(write_legacy_file(&dir, LEGACY_JSON)?),
        ..Default::default()
    };

    let config = AppConfig::load_with_env(&overrides, no_env())?;

    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.smtp_server, "mail.example.com");
    assert_eq!(config.smtp_port, 2525);
    assert_eq!(
        config.report_recipients,
        vec!["ops@example.com", "cfo@example.com"]
    );
    assert_eq!(config.report_subject_template, "Usage for {period}");
    assert!(config.missing_fields().is_empty());
    Ok(())
}

#[test]
fn test_env_beats_file_and_cli_beats_env() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let overrides = ConfigOverrides {
        config_file: Some(write_legacy_file(&dir, LEGACY_JSON)?),
        sender_email: Some("cli@example.com".to_string()),
        ..Default::default()
    };
    let env: Map<String, String> = [
        ("SMTP2GO_API_KEY", "env-key"),
        ("SMTP2GO_SENDER_EMAIL", "env@example.com"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = AppConfig::load_with_env(&overrides, Some(env))?;

    assert_eq!(config.api_key.as_deref(), Some("env-key"));
    assert_eq!(config.sender_email.as_deref(), Some("cli@example.com"));
    assert_eq!(config.smtp_username.as_deref(), Some("file-user"));
    Ok(())
}

#[test]
fn test_missing_legacy_file_falls_back_to_defaults() -> Result<()> {
    let overrides = ConfigOverrides {
        config_file: Some(PathBuf::from("/nonexistent/smtp2go/config.json")),
        ..Default::default()
    };

    let config = AppConfig::load_with_env(&overrides, no_env())?;

    assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    assert_eq!(
        config.missing_fields(),
        vec![
            "api_key",
            "smtp_username",
            "smtp_password",
            "sender_email",
            "report_recipients"
        ]
    );
    Ok(())
}

#[test]
fn test_malformed_legacy_file_is_a_config_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let overrides = ConfigOverrides {
        config_file: Some(write_legacy_file(&dir, "{ not json")?),
        ..Default::default()
    };

    let result = AppConfig::load_with_env(&overrides, no_env());
    assert!(matches!(result, Err(AppError::Config(_))));
    Ok(())
}

#[test]
fn test_report_dir_tilde_is_expanded() -> Result<()> {
    let overrides = ConfigOverrides {
        report_dir: Some(PathBuf::from("~/reports")),
        ..Default::default()
    };

    let config = AppConfig::load_with_env(&overrides, no_env())?;

    if let Some(home) = dirs::home_dir() {
        assert_eq!(config.report_dir, home.join("reports"));
    }
    Ok(())
}

#[test]
#[serial]
fn test_process_environment_is_read() -> Result<()> {
    std::env::set_var("SMTP2GO_API_KEY", "process-key");
    std::env::set_var("SMTP2GO_REPORT_RECIPIENTS", "a@example.com,b@example.com");

    let config = AppConfig::load(&ConfigOverrides::default());

    std::env::remove_var("SMTP2GO_API_KEY");
    std::env::remove_var("SMTP2GO_REPORT_RECIPIENTS");

    let config = config?;
    assert_eq!(config.api_key.as_deref(), Some("process-key"));
    assert_eq!(config.report_recipients, vec!["a@example.com", "b@example.com"]);
    Ok(())
}

#[test]
fn test_validation_reports_every_missing_field() -> Result<()> {
    let overrides = ConfigOverrides {
        smtp_username: Some("reporter".to_string()),
        ..Default::default()
    };

    let config = AppConfig::load_with_env(&overrides, no_env())?;
    let err = config.validate().unwrap_err();

    assert_eq!(
        err.to_string(),
        "Missing required configuration: api_key, smtp_password, sender_email, report_recipients"
    );
    Ok(())
}
