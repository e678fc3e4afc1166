//! Configuration management tests
//!
//! Tests for ConfigManager and the TOML config layout.

use std::fs;

use tempfile::TempDir;
use vibebus_core::config::{defaults, Config, ConfigManager};

fn setup_config_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

mod config_structure_tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_endpoints() {
        let config = Config::default();

        assert_eq!(config.llm.model, "openai/gpt-4o");
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1/");
        assert_eq!(config.llm.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.weather.latitude, 60.1850);
        assert_eq!(config.weather.longitude, 25.0317);
        assert_eq!(config.transit.default_stop_id, "HSL:1434183");
        assert_eq!(config.transit.time_range_secs, 3600);
        assert_eq!(config.transit.api_key_env, "DIGITRANSIT_API_KEY");
        assert_eq!(config.session.max_messages, defaults::MAX_MESSAGES);
        assert_eq!(config.http.timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization_roundtrip_keeps_values() {
        let mut config = Config::default();
        config.llm.model = "anthropic/claude-3.5-sonnet".into();
        config.session.max_messages = 12;

        let text = toml::to_string(&config).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.llm.model, "anthropic/claude-3.5-sonnet");
        assert_eq!(parsed.session.max_messages, 12);
    }
}

mod config_manager_tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = setup_config_dir();
        let manager = ConfigManager::with_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(manager.config_path(), dir.path().join("absent.toml"));
        assert_eq!(manager.into_config().llm.model, defaults::MODEL);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = setup_config_dir();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[llm]
model = "mistralai/mistral-large"

[transit]
default_stop_id = "HSL:1040129"

[session]
max_messages = 8
system_prompt = "Answer in Finnish."
"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(path).unwrap().into_config();
        assert_eq!(config.llm.model, "mistralai/mistral-large");
        assert_eq!(config.llm.base_url, defaults::LLM_BASE_URL);
        assert_eq!(config.transit.default_stop_id, "HSL:1040129");
        assert_eq!(config.transit.time_range_secs, defaults::TIME_RANGE_SECS);
        assert_eq!(config.session.max_messages, 8);
        assert_eq!(config.session.system_prompt.as_deref(), Some("Answer in Finnish."));
        assert_eq!(config.weather.latitude, defaults::LATITUDE);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = setup_config_dir();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm\nmodel = ").unwrap();

        let err = ConfigManager::with_path(path).err().expect("should fail");
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let dir = setup_config_dir();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[weather]\nbase_url = \"not a url\"\n").unwrap();

        let config = ConfigManager::with_path(path).unwrap().into_config();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("weather.base_url"));
    }

    #[test]
    fn test_env_override_applies_after_file() {
        let dir = setup_config_dir();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm]\nmodel = \"from-file\"\n").unwrap();

        let mut config = ConfigManager::with_path(path).unwrap().into_config();
        config.apply_env_overrides(|key| (key == "DEFAULT_MODEL").then(|| "from-env".to_string()));
        assert_eq!(config.llm.model, "from-env");
    }
}
