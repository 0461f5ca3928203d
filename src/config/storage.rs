//! Storage backend selection

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// YAML file loaded into the memory backend at startup
    pub seed_file: Option<PathBuf>,
}

impl StorageConfig {
    pub fn is_memory(&self) -> bool {
        self.backend == StorageBackend::Memory
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.seed_file.is_some() && !self.is_memory() {
            return Err(ValidationError::SeedRequiresMemoryBackend);
        }
        Ok(())
    }
}
