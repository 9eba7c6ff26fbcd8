//! Config load validation tests for monitor-sync-config.
// crates/monitor-sync-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use monitor_sync_config::ConfigError;
use monitor_sync_config::ProviderConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ProviderConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_reads_complete_file() -> TestResult {
    let file = write_config(
        br#"
endpoint = "tenant-unit.example.io"
api_token = "secret"
default_name_prefix = "[prod] "
request_timeout_secs = 30

[retry]
max_attempts = 5

[logging]
filter = "debug"
format = "json"
"#,
    )?;
    let config = ProviderConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.endpoint() != "tenant-unit.example.io" || config.api_token() != "secret" {
        return Err(format!("unexpected credentials in {config:?}"));
    }
    if config.retry.max_attempts != 5 || config.request_timeout_secs != 30 {
        return Err(format!("unexpected limits in {config:?}"));
    }
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(ProviderConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a/".repeat(2_500);
    let path = Path::new(&long_path);
    assert_invalid(ProviderConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(ProviderConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(ProviderConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(ProviderConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"endpoint = \"unterminated")?;
    assert_invalid(ProviderConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}
