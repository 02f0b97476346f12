//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
fn default_config_path_contains_shieldnet_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("shieldnet") && path_str.ends_with("config.toml"),
        "Path should contain 'shieldnet' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_shieldnet_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("shieldnet.log"),
        "Default log path should end with 'shieldnet.log', got: {:?}",
        path
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("shieldnet_test_config.toml");

    let toml_content = r#"
api_base_url = "https://api.shieldnet.test/"
idle_timeout_secs = 45
connect_timeout_secs = 3
report_blocked = false
show_thinking = false
log_file_path = "/tmp/shieldnet-test.log"
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(
        config.api_base_url,
        Some("https://api.shieldnet.test/".to_string())
    );
    assert_eq!(config.idle_timeout_secs, Some(45));
    assert_eq!(config.connect_timeout_secs, Some(3));
    assert_eq!(config.report_blocked, Some(false));
    assert_eq!(config.show_thinking, Some(false));
    assert_eq!(
        config.log_file_path,
        Some(PathBuf::from("/tmp/shieldnet-test.log"))
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("shieldnet_test_invalid.toml");
    fs::write(&config_path, "this is not valid TOML ][}{").expect("Failed to write test config");

    let result = load_config_file(&config_path);

    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let toml_with_unknown = r#"
api_base_url = "http://localhost:8000"
theme = "should fail"
"#;

    let result: Result<ConfigFile, _> = toml::from_str(toml_with_unknown);
    assert!(
        result.is_err(),
        "Should reject TOML with unknown fields due to deny_unknown_fields"
    );
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_uses_defaults_for_none_fields() {
    let config_file = ConfigFile {
        report_blocked: Some(false),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert!(!resolved.report_blocked);
    assert_eq!(resolved.api_base_url, defaults.api_base_url);
    assert_eq!(resolved.idle_timeout_secs, defaults.idle_timeout_secs);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn merge_config_strips_trailing_slash_from_base_url() {
    let config_file = ConfigFile {
        api_base_url: Some("https://api.shieldnet.test///".to_string()),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));

    assert_eq!(resolved.api_base_url, "https://api.shieldnet.test");
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();

    assert_eq!(config.api_base_url, "http://localhost:8000");
    assert_eq!(config.idle_timeout_secs, 120);
    assert_eq!(config.connect_timeout_secs, 10);
    assert!(config.report_blocked);
    assert!(config.show_thinking);
}

#[test]
fn zero_idle_timeout_disables_timeout() {
    let config = ResolvedConfig {
        idle_timeout_secs: 0,
        ..ResolvedConfig::default()
    };
    assert_eq!(config.idle_timeout(), None);

    let config = ResolvedConfig {
        idle_timeout_secs: 30,
        ..ResolvedConfig::default()
    };
    assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
}

#[test]
#[serial(shieldnet_api_url)]
fn apply_env_overrides_respects_api_url() {
    let _guard = EnvGuard::new(API_URL_ENV_VAR);
    env::set_var(API_URL_ENV_VAR, "http://10.0.0.5:9000/");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(result.api_base_url, "http://10.0.0.5:9000");
}

#[test]
#[serial(shieldnet_api_url)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _guard = EnvGuard::new(API_URL_ENV_VAR);

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone());

    assert_eq!(
        result, base,
        "Config should be unchanged when SHIELDNET_API_URL not set"
    );
}

#[test]
#[serial(shieldnet_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);

    let temp_dir = env::temp_dir();
    let explicit_path = temp_dir.join("shieldnet_explicit.toml");
    fs::write(&explicit_path, r#"api_base_url = "http://explicit""#)
        .expect("Failed to write explicit config");

    let env_path = temp_dir.join("shieldnet_env.toml");
    fs::write(&env_path, r#"api_base_url = "http://from-env""#)
        .expect("Failed to write env config");
    env::set_var(CONFIG_ENV_VAR, env_path.to_str().unwrap());

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .unwrap()
        .unwrap();

    assert_eq!(
        config.api_base_url,
        Some("http://explicit".to_string()),
        "Should use explicit path, not SHIELDNET_CONFIG env var"
    );

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(shieldnet_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);

    let env_path = env::temp_dir().join("shieldnet_env_only.toml");
    fs::write(&env_path, "idle_timeout_secs = 7\n").expect("Failed to write env config");
    env::set_var(CONFIG_ENV_VAR, env_path.to_str().unwrap());

    let config = load_config_with_precedence(None).unwrap().unwrap();

    assert_eq!(config.idle_timeout_secs, Some(7));

    fs::remove_file(env_path).ok();
}

#[test]
#[serial(shieldnet_config)]
fn load_config_with_precedence_rejects_empty_env_var() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);
    env::set_var(CONFIG_ENV_VAR, "");

    let result = load_config_with_precedence(None);

    assert!(matches!(result, Err(ConfigError::InvalidPath(_))));
}

#[test]
fn apply_cli_overrides_wins_over_everything() {
    let base = ResolvedConfig {
        api_base_url: "http://from-file".to_string(),
        idle_timeout_secs: 60,
        report_blocked: true,
        ..ResolvedConfig::default()
    };

    let result = apply_cli_overrides(
        base,
        Some("http://from-cli/".to_string()),
        Some(0),
        Some(false),
    );

    assert_eq!(result.api_base_url, "http://from-cli");
    assert_eq!(result.idle_timeout(), None);
    assert!(!result.report_blocked);
}

#[test]
fn apply_cli_overrides_without_flags_is_identity() {
    let base = ResolvedConfig::default();
    let result = apply_cli_overrides(base.clone(), None, None, None);
    assert_eq!(result, base);
}
