use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::quiz::error::CatalogLoadError;
use crate::quiz::QuestionCatalog;

pub const SAVE_DIR_VAR: &str = "QUIZ_SAVE_DIR";
pub const CATALOG_VAR: &str = "QUIZ_CATALOG";
pub const SEED_VAR: &str = "QUIZ_SEED";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("QUIZ_SEED must be an unsigned integer, got {0:?}")]
    InvalidSeed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Relative save/load paths are resolved against this directory.
    pub save_dir: PathBuf,
    /// Replaces the bundled questionnaires when set.
    pub catalog_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("."),
            catalog_path: None,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let seed: Option<u64> = match non_empty(SEED_VAR) {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            save_dir: non_empty(SAVE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            catalog_path: non_empty(CATALOG_VAR).map(PathBuf::from),
            seed,
        })
    }

    pub fn catalog(&self) -> Result<QuestionCatalog, CatalogLoadError> {
        match &self.catalog_path {
            Some(path) => QuestionCatalog::open(path),
            None => QuestionCatalog::bundled(),
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                info!("Using fixed random seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        }
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.save_dir.join(path)
        }
    }
}
