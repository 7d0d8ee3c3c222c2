//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

#[test]
fn default_config_path_contains_chatlist_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("chatlist") && path_str.ends_with("config.toml"),
        "Path should contain 'chatlist' and end with 'config.toml', got: {}",
        path_str
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
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(
        &dir,
        "config.toml",
        r#"
model = "claude-3-5-haiku-latest"
max_tokens = 1024
temperature = 0.4
system_prompt = "Be brief."

[list]
chars_per_line = 72
debounce_ms = 150
"#,
    );

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.model.as_deref(), Some("claude-3-5-haiku-latest"));
    assert_eq!(config.max_tokens, Some(1024));
    assert_eq!(config.temperature, Some(0.4));
    assert_eq!(config.system_prompt.as_deref(), Some("Be brief."));
    let list = config.list.expect("list table");
    assert_eq!(list.chars_per_line, Some(72));
    assert_eq!(list.debounce_ms, Some(150));
    assert_eq!(list.overscan, None);
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir, "invalid.toml", "this is not valid TOML ][}{");

    match load_config_file(&config_path) {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str(
        r#"
model = "m"
unknown_field = "should fail"
"#,
    );
    assert!(
        result.is_err(),
        "Should reject TOML with unknown fields due to deny_unknown_fields"
    );
}

#[test]
fn list_table_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str(
        r#"
[list]
row_height = 3
"#,
    );
    assert!(result.is_err());
}

#[test]
fn merge_config_uses_defaults_when_none() {
    let resolved = merge_config(None).expect("defaults are valid");
    assert_eq!(resolved, ResolvedConfig::default());
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();

    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.max_tokens, 4096);
    assert_eq!(config.api_key, None);
    assert_eq!(config.tuning, ListTuning::terminal());
}

#[test]
fn merge_config_overrides_with_config_file_values() {
    let config_file = ConfigFile {
        model: Some("custom-model".to_string()),
        api_url: Some("http://localhost:8080/v1/messages".to_string()),
        max_tokens: Some(512),
        history_file: Some(PathBuf::from("/tmp/notes.jsonl")),
        list: Some(ListTuningSection {
            code_block_bonus: Some(5),
            debounce_ms: Some(250),
            ..ListTuningSection::default()
        }),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file)).expect("valid config");

    assert_eq!(resolved.model, "custom-model");
    assert_eq!(resolved.api_url, "http://localhost:8080/v1/messages");
    assert_eq!(resolved.max_tokens, 512);
    assert_eq!(resolved.history_file, PathBuf::from("/tmp/notes.jsonl"));
    assert_eq!(resolved.tuning.code_block_bonus, 5);
    assert_eq!(resolved.tuning.debounce, Duration::from_millis(250));
    assert_eq!(
        resolved.tuning.line_height,
        ListTuning::terminal().line_height,
        "unset tuning keys keep the terminal profile"
    );
}

#[test]
fn merge_config_rejects_zero_line_height() {
    let config_file = ConfigFile {
        list: Some(ListTuningSection {
            line_height: Some(0),
            ..ListTuningSection::default()
        }),
        ..ConfigFile::default()
    };

    assert_eq!(
        merge_config(Some(config_file)),
        Err(ConfigError::InvalidTuning(TuningError::ZeroLineHeight))
    );
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static [&'static str]);

impl EnvGuard {
    fn new(names: &'static [&'static str]) -> Self {
        for name in names {
            env::remove_var(name);
        }
        EnvGuard(names)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for name in self.0 {
            env::remove_var(name);
        }
    }
}

const KEY_VARS: &[&str] = &["CHATLIST_MODEL", "CHATLIST_API_KEY", "ANTHROPIC_API_KEY"];

#[test]
#[serial(chatlist_env)]
fn apply_env_overrides_respects_chatlist_model() {
    let _guard = EnvGuard::new(KEY_VARS);
    env::set_var("CHATLIST_MODEL", "env-model");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.model, "env-model");
}

#[test]
#[serial(chatlist_env)]
fn chatlist_api_key_wins_over_anthropic_api_key() {
    let _guard = EnvGuard::new(KEY_VARS);
    env::set_var("ANTHROPIC_API_KEY", "fallback");
    env::set_var("CHATLIST_API_KEY", "primary");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.api_key.as_deref(), Some("primary"));
}

#[test]
#[serial(chatlist_env)]
fn anthropic_api_key_is_the_fallback() {
    let _guard = EnvGuard::new(KEY_VARS);
    env::set_var("ANTHROPIC_API_KEY", "fallback");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.api_key.as_deref(), Some("fallback"));
}

#[test]
#[serial(chatlist_env)]
fn empty_env_values_are_ignored() {
    let _guard = EnvGuard::new(KEY_VARS);
    env::set_var("CHATLIST_MODEL", "  ");
    env::set_var("CHATLIST_API_KEY", "");

    let base = ResolvedConfig {
        api_key: Some("from-file".to_string()),
        ..ResolvedConfig::default()
    };
    let result = apply_env_overrides(base.clone());
    assert_eq!(result, base);
}

#[test]
#[serial(chatlist_env)]
fn apply_env_overrides_no_change_when_env_vars_not_set() {
    let _guard = EnvGuard::new(KEY_VARS);

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone());
    assert_eq!(result, base, "Config should be unchanged when no env vars are set");
}

#[test]
fn apply_cli_overrides_only_touches_given_flags() {
    let base = ResolvedConfig::default();

    let unchanged = apply_cli_overrides(base.clone(), None, None);
    assert_eq!(unchanged, base);

    let changed = apply_cli_overrides(
        base.clone(),
        Some("cli-model".to_string()),
        Some(PathBuf::from("chat.jsonl")),
    );
    assert_eq!(changed.model, "cli-model");
    assert_eq!(changed.history_file, PathBuf::from("chat.jsonl"));
    assert_eq!(changed.api_url, base.api_url);
}

#[test]
#[serial(chatlist_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    env::remove_var("CHATLIST_CONFIG");
    let dir = TempDir::new().expect("temp dir");
    let explicit_path = write_config(&dir, "explicit.toml", r#"model = "explicit-model""#);
    let env_path = write_config(&dir, "env.toml", r#"model = "env-model""#);
    env::set_var("CHATLIST_CONFIG", &env_path);

    let config = load_config_with_precedence(Some(explicit_path))
        .expect("loads")
        .expect("file exists");
    assert_eq!(
        config.model.as_deref(),
        Some("explicit-model"),
        "Should use explicit path, not CHATLIST_CONFIG env var"
    );

    env::remove_var("CHATLIST_CONFIG");
}

#[test]
#[serial(chatlist_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    env::remove_var("CHATLIST_CONFIG");
    let dir = TempDir::new().expect("temp dir");
    let env_path = write_config(&dir, "env_only.toml", r#"model = "env-var-model""#);
    env::set_var("CHATLIST_CONFIG", &env_path);

    let config = load_config_with_precedence(None)
        .expect("loads")
        .expect("file exists");
    assert_eq!(config.model.as_deref(), Some("env-var-model"));

    env::remove_var("CHATLIST_CONFIG");
}
