// Configuration layer for assistant client creation

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::edge_function::{EdgeFunctionClient, DEFAULT_FUNCTION_NAME};
use crate::error::Result;
use crate::simulated::{SimulatedAssistant, DEFAULT_SIMULATED_DELAY_MS};
use crate::traits::AssistantClient;

/// Configuration for the hosted AI function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeFunctionConfig {
    pub api_key: String,
    pub base_url: String,
    #[serde(default = "default_function_name")]
    pub function_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl EdgeFunctionConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            function_name: default_function_name(),
            timeout_ms: None,
        }
    }
}

fn default_function_name() -> String {
    DEFAULT_FUNCTION_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_SIMULATED_DELAY_MS,
        }
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_SIMULATED_DELAY_MS
}

/// Which assistant backs the chat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum AssistantConfig {
    EdgeFunction(EdgeFunctionConfig),
    Simulated(SimulatedConfig),
}

impl AssistantConfig {
    pub fn edge_function(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        AssistantConfig::EdgeFunction(EdgeFunctionConfig::new(api_key, base_url))
    }

    pub fn simulated() -> Self {
        AssistantConfig::Simulated(SimulatedConfig::default())
    }

    /// Factory: build the configured client
    pub fn create_client(&self) -> Result<Arc<dyn AssistantClient>> {
        match self {
            AssistantConfig::EdgeFunction(cfg) => {
                let mut builder = EdgeFunctionClient::builder()
                    .api_key(&cfg.api_key)
                    .base_url(&cfg.base_url)
                    .function_name(&cfg.function_name);
                if let Some(ms) = cfg.timeout_ms {
                    builder = builder.timeout(Duration::from_millis(ms));
                }
                Ok(Arc::new(builder.build()?))
            }
            AssistantConfig::Simulated(cfg) => Ok(Arc::new(SimulatedAssistant::new(
                Duration::from_millis(cfg.delay_ms),
            ))),
        }
    }
}
