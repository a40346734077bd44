use dummys3_core::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one subdirectory per bucket.
    pub storage_root: PathBuf,
    pub bind_addr: String,
    /// Create `storage_root` at startup when it is missing.
    #[serde(default = "default_create_root")]
    pub create_root: bool,
}

fn default_create_root() -> bool {
    true
}

const DEFAULT_STORAGE_ROOT: &str = "./dummys3-data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4568";

impl Config {
    /// Loads `path` if it exists, then `DUMMYS3_*` environment variables.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .set_default("storage_root", DEFAULT_STORAGE_ROOT)
            .and_then(|builder| builder.set_default("bind_addr", DEFAULT_BIND_ADDR))
            .map_err(|e| StoreError::Config(e.to_string()))?
            .add_source(::config::File::with_name(path).required(false))
            .add_source(::config::Environment::with_prefix("DUMMYS3"))
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        storage_root: Option<PathBuf>,
        bind_addr: Option<String>,
    ) -> Self {
        if let Some(root) = storage_root {
            self.storage_root = root;
        }
        if let Some(addr) = bind_addr {
            self.bind_addr = addr;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(StoreError::Config("storage_root cannot be empty".to_string()));
        }
        if self.bind_addr.trim().is_empty() {
            return Err(StoreError::Config("bind_addr cannot be empty".to_string()));
        }
        Ok(())
    }
}
