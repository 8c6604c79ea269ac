use std::collections::HashMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Skip the remote service entirely and always use the offline templates.
    pub demo_mode: bool,
    pub default_count: usize,
    pub min_count: usize,
    pub max_count: usize,
    pub min_content_chars: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let mut config = Self::build(Path::new("config"), &environment, None)?;
        config.apply_fallbacks(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Layers `default.toml`, the optional `{environment}.toml` and `APP__*` variables.
    /// `env` replaces the process environment when given.
    pub fn build(
        dir: &Path,
        environment: &str,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let default = dir.join("default");
        let overlay = dir.join(environment);

        Config::builder()
            .add_source(File::with_name(&default.to_string_lossy()))
            .add_source(File::with_name(&overlay.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }

    /// Picks up the conventional `DATABASE_URL` and `OPENAI_API_KEY` variables when the
    /// layered sources left those settings empty.
    pub fn apply_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.database.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.database.url = url;
            }
        }

        let has_key = self
            .llm
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            self.llm.api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "database.url is not set (APP__DATABASE__URL or DATABASE_URL)".into(),
            ));
        }
        if !self.generation.demo_mode && self.llm.api_key.is_none() {
            return Err(ConfigError::Message(
                "llm.api_key is not set (APP__LLM__API_KEY or OPENAI_API_KEY); \
                 set generation.demo_mode to run without one"
                    .into(),
            ));
        }
        if self.generation.min_count > self.generation.max_count {
            return Err(ConfigError::Message(
                "generation.min_count exceeds generation.max_count".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_default_config_loads() {
        let config = AppConfig::build(Path::new("config"), "development", env(&[]));
        assert!(config.is_ok(), "Default config should load: {config:?}");

        let config = config.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.generation.default_count, 15);
        assert_eq!(config.generation.min_count, 5);
        assert_eq!(config.generation.max_count, 25);
    }

    #[test]
    fn test_env_override() {
        let config = AppConfig::build(
            Path::new("config"),
            "development",
            env(&[
                ("APP__SERVER__PORT", "8080"),
                ("APP__GENERATION__DEMO_MODE", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.generation.demo_mode);
    }

    #[test]
    fn test_environment_overlay_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy("config/default.toml", dir.path().join("default.toml")).unwrap();
        std::fs::write(
            dir.path().join("staging.toml"),
            "[llm]\nmodel = \"gpt-4o-mini\"\n",
        )
        .unwrap();

        let config = AppConfig::build(dir.path(), "staging", env(&[])).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_fallback_variables() {
        let mut config = AppConfig::build(Path::new("config"), "development", env(&[])).unwrap();
        assert!(config.database.url.is_empty());
        config.llm.api_key = None;

        config.apply_fallbacks(|key| match key {
            "DATABASE_URL" => Some("sqlite://cards.db".into()),
            "OPENAI_API_KEY" => Some("sk-test".into()),
            _ => None,
        });

        assert_eq!(config.database.url, "sqlite://cards.db");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_url_precedence() {
        let database_url = |key: &str| (key == "DATABASE_URL").then(|| "sqlite://from-env.db".to_string());

        let mut config = AppConfig::build(Path::new("config"), "development", env(&[])).unwrap();
        config.generation.demo_mode = true;
        assert!(config.validate().is_err());
        config.apply_fallbacks(database_url);
        assert_eq!(config.database.url, "sqlite://from-env.db");
        assert!(config.validate().is_ok());

        let mut config = AppConfig::build(
            Path::new("config"),
            "development",
            env(&[("APP__DATABASE__URL", "sqlite::memory:")]),
        )
        .unwrap();
        config.apply_fallbacks(database_url);
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_missing_key_is_fatal_outside_demo_mode() {
        let mut config = AppConfig::build(Path::new("config"), "development", env(&[])).unwrap();
        config.database.url = "sqlite::memory:".into();
        config.llm.api_key = None;
        config.generation.demo_mode = false;
        assert!(config.validate().is_err());

        config.generation.demo_mode = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let mut config = AppConfig::build(Path::new("config"), "development", env(&[])).unwrap();
        config.database.url = "  ".into();
        config.generation.demo_mode = true;
        assert!(config.validate().is_err());
    }
}
