use std::sync::Arc;

use crate::dbs::memory::MemoryPersistenceClient;
use crate::dbs::postgrest::PostgrestClient;
use crate::error::{PersistError, Result};
use crate::trait_client::PersistenceClient;

enum Backend {
    Postgrest,
    Memory,
}

pub struct PersistClientBuilder {
    backend: Backend,
    url: Option<String>,
    api_key: Option<String>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            backend: Backend::Postgrest,
            url: None,
            api_key: None,
        }
    }

    /// Use the in-process store instead of the hosted one
    pub fn in_memory(mut self) -> Self {
        self.backend = Backend::Memory;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn build(self) -> Result<Arc<dyn PersistenceClient>> {
        match self.backend {
            Backend::Memory => Ok(Arc::new(MemoryPersistenceClient::new())),
            Backend::Postgrest => {
                let url = self
                    .url
                    .ok_or_else(|| PersistError::Configuration("url is required".to_string()))?;
                let api_key = self
                    .api_key
                    .ok_or_else(|| PersistError::Configuration("api_key is required".to_string()))?;

                Ok(Arc::new(PostgrestClient::new(&url, &api_key)?))
            }
        }
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_requires_url_and_key() {
        let err = PersistClientBuilder::new().api_key("k").build().err().unwrap();
        assert!(err.to_string().contains("url"));

        let err = PersistClientBuilder::new().url("https://x.co").build().err().unwrap();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_backend_selection() {
        let client = PersistClientBuilder::new().in_memory().build().unwrap();
        assert_eq!(client.name(), "memory");

        let client = PersistClientBuilder::new()
            .url("https://x.co")
            .api_key("k")
            .build()
            .unwrap();
        assert_eq!(client.name(), "postgrest");
    }
}
