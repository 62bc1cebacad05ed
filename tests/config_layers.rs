use figment::Jail;
use objective_studio::config::{Config, ConfigError, CONFIG_FILE};

#[test]
fn defaults_apply_without_file_or_env() {
    Jail::expect_with(|jail| {
        // Keep the developer's real key out of the test
        jail.set_env("OPENAI_API_KEY", "");

        let config = Config::load().map_err(|e| e.to_string())?;
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        Ok(())
    });
}

#[test]
fn env_overrides_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            CONFIG_FILE,
            r#"
                model = "gpt-4o-mini"
                temperature = 0.2
                request_timeout_secs = 30
            "#,
        )?;
        jail.set_env("OBJECTIVE_STUDIO_TEMPERATURE", "1.1");

        let config = Config::load().map_err(|e| e.to_string())?;
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 1.1);
        assert_eq!(config.request_timeout_secs, Some(30));
        Ok(())
    });
}

#[test]
fn openai_key_is_the_fallback() {
    Jail::expect_with(|jail| {
        jail.set_env("OPENAI_API_KEY", "sk-fallback");
        let config = Config::load().map_err(|e| e.to_string())?;
        assert_eq!(config.api_key.as_deref(), Some("sk-fallback"));

        jail.set_env("OBJECTIVE_STUDIO_API_KEY", "sk-primary");
        let config = Config::load().map_err(|e| e.to_string())?;
        assert_eq!(config.api_key.as_deref(), Some("sk-primary"));
        Ok(())
    });
}

#[test]
fn out_of_range_temperature_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("OBJECTIVE_STUDIO_TEMPERATURE", "3.5");
        match Config::load() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "temperature"),
            other => panic!("expected an invalid temperature, got {other:?}"),
        }
        Ok(())
    });
}
