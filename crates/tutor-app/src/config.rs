use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tutor_auth::AuthConfig;
use tutor_llm::{AssistantConfig, EdgeFunctionConfig, SimulatedConfig};
use tutor_persist::{PersistClientBuilder, PersistenceClient};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub assistant: AssistantSettings,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub supabase_anon_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantProvider {
    EdgeFunction,
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    pub provider: AssistantProvider,
    /// Functions host; falls back to `database.url` (same hosted project)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_function_name")]
    pub function_name: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,
}

fn default_function_name() -> String {
    "ai-chat".to_string()
}

fn default_simulated_delay_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgrest,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub typing_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed with TUTOR_, `__` between sections
    ///    (e.g. TUTOR_ASSISTANT__PROVIDER=edge_function)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("TUTOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets from ENV (not in TOML)
        cfg.supabase_anon_key = std::env::var("SUPABASE_ANON_KEY").unwrap_or_default();
        if let Ok(key) = std::env::var("MEMBERSTACK_PUBLIC_KEY") {
            cfg.auth.public_key = key;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    /// Check that every hosted service in use has its secrets
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hosted = self.assistant.provider == AssistantProvider::EdgeFunction
            || self.database.backend == DatabaseBackend::Postgrest;

        if hosted {
            if self.supabase_anon_key.is_empty() {
                return Err(ConfigError::Message(
                    "SUPABASE_ANON_KEY environment variable is required".to_string(),
                ));
            }
        }

        if self.database.backend == DatabaseBackend::Postgrest && self.database.url.trim().is_empty() {
            return Err(ConfigError::Message("database.url is required".to_string()));
        }

        if self.assistant.provider == AssistantProvider::EdgeFunction {
            let base_url = self.assistant.base_url.as_deref().unwrap_or(&self.database.url);
            if base_url.trim().is_empty() {
                return Err(ConfigError::Message(
                    "assistant.base_url or database.url is required".to_string(),
                ));
            }
        }

        if !self.auth.bypass && self.auth.public_key.is_empty() {
            return Err(ConfigError::Message(
                "MEMBERSTACK_PUBLIC_KEY environment variable is required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn assistant_config(&self) -> AssistantConfig {
        match self.assistant.provider {
            AssistantProvider::Simulated => AssistantConfig::Simulated(SimulatedConfig {
                delay_ms: self.assistant.simulated_delay_ms,
            }),
            AssistantProvider::EdgeFunction => {
                let base_url = self
                    .assistant
                    .base_url
                    .clone()
                    .unwrap_or_else(|| self.database.url.clone());

                AssistantConfig::EdgeFunction(EdgeFunctionConfig {
                    api_key: self.supabase_anon_key.clone(),
                    base_url,
                    function_name: self.assistant.function_name.clone(),
                    timeout_ms: self.assistant.timeout_ms,
                })
            }
        }
    }

    pub fn persistence_client(&self) -> tutor_persist::Result<Arc<dyn PersistenceClient>> {
        match self.database.backend {
            DatabaseBackend::Memory => PersistClientBuilder::new().in_memory().build(),
            DatabaseBackend::Postgrest => PersistClientBuilder::new()
                .url(&self.database.url)
                .api_key(&self.supabase_anon_key)
                .build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [assistant]
        provider = "edge_function"
        timeout_ms = 30000

        [database]
        backend = "postgrest"
        url = "https://abc.supabase.co"

        [auth]
        bypass = false

        [chat]
        typing_timeout_ms = 2000

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();

        assert_eq!(config.assistant.provider, AssistantProvider::EdgeFunction);
        assert_eq!(config.assistant.function_name, "ai-chat");
        assert_eq!(config.database.backend, DatabaseBackend::Postgrest);
        assert_eq!(config.auth.recheck_delay_ms, 1000);
        assert_eq!(config.chat.typing_timeout_ms, 2000);
    }

    #[test]
    fn test_validate_requires_secrets() {
        let mut config: Config = toml::from_str(TOML).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));

        config.supabase_anon_key = "anon".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MEMBERSTACK_PUBLIC_KEY"));

        config.auth.public_key = "pk_123".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_database_url_for_postgrest() {
        let mut config: Config = toml::from_str(TOML).unwrap();
        config.supabase_anon_key = "anon".to_string();
        config.auth.public_key = "pk_123".to_string();
        config.assistant.base_url = Some("https://fn.example.co".to_string());
        config.database.url = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database.url"));

        // a memory store only needs a functions host
        config.database.backend = DatabaseBackend::Memory;
        assert!(config.validate().is_ok());

        config.assistant.base_url = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("assistant.base_url"));
    }

    #[test]
    fn test_edge_function_uses_project_url() {
        let mut config: Config = toml::from_str(TOML).unwrap();
        config.supabase_anon_key = "anon".to_string();

        match config.assistant_config() {
            AssistantConfig::EdgeFunction(cfg) => {
                assert_eq!(cfg.base_url, "https://abc.supabase.co");
                assert_eq!(cfg.api_key, "anon");
                assert_eq!(cfg.timeout_ms, Some(30000));
            }
            other => panic!("Expected edge function config, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = Config::from_file(path).unwrap();

        assert_eq!(config.assistant.provider, AssistantProvider::Simulated);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert!(config.auth.bypass);
        assert!(config.validate().is_ok());
    }
}
