//! Engine configuration (spec §11 ambient): a plain struct passed
//! explicitly to `Engine::open`, constructible from CLI flags or
//! environment variables. No global; no config-file format opinion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "pairbond.db";
const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub db_path: PathBuf,
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Config {
    /// Build from `PBM_DB_PATH` / `PBM_POOL_SIZE`, falling back to the
    /// defaults for whichever is unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(path) = std::env::var("PBM_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("PBM_POOL_SIZE") {
            if let Ok(parsed) = size.parse() {
                config.pool_size = parsed;
            }
        }
        config
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::default().with_db_path("/tmp/x.db").with_pool_size(2);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.pool_size, 2);
    }
}
