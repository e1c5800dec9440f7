//! config.toml loading.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use market_core::config::AppConfig;
use market_core::error::{MarketError, Result};

use crate::paths::MarketPaths;
use crate::storage::AtomicTomlFile;

/// Loads and caches the application configuration.
///
/// A missing or empty config.toml yields [`AppConfig::default`].
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<AppConfig>>,
    cache: Arc<RwLock<Option<AppConfig>>>,
    paths: MarketPaths,
}

impl ConfigService {
    pub fn default() -> Result<Self> {
        Self::new(None)
    }

    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let paths = MarketPaths::new(base_path);
        let file = AtomicTomlFile::new(paths.config_file()?);
        Ok(Self {
            file: Arc::new(file),
            cache: Arc::new(RwLock::new(None)),
            paths,
        })
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    pub fn load(&self) -> Result<AppConfig> {
        {
            let read_lock = self
                .cache
                .read()
                .map_err(|e| MarketError::internal(format!("config cache poisoned: {e}")))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let config = self.file.load()?.unwrap_or_default();
        tracing::debug!(
            path = %self.file.path().display(),
            overrides = config.tools.len(),
            "Loaded configuration"
        );

        let mut write_lock = self
            .cache
            .write()
            .map_err(|e| MarketError::internal(format!("config cache poisoned: {e}")))?;
        *write_lock = Some(config.clone());
        Ok(config)
    }

    /// Writes `config` and refreshes the cache.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        let mut write_lock = self
            .cache
            .write()
            .map_err(|e| MarketError::internal(format!("config cache poisoned: {e}")))?;
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Writes the default configuration unless config.toml already exists.
    ///
    /// Returns the path and whether the file was created.
    pub fn ensure_config_file(&self) -> Result<(PathBuf, bool)> {
        let path = self.file.path().to_path_buf();
        if path.exists() {
            return Ok((path, false));
        }
        self.save(&AppConfig::default())?;
        Ok((path, true))
    }

    /// Output directory from config.toml, or the default data location.
    pub fn output_dir(&self) -> Result<PathBuf> {
        match self.load()?.output.directory {
            Some(directory) => Ok(directory),
            None => Ok(self.paths.output_dir()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::config::{DEFAULT_POLL_MAX_ATTEMPTS, DEFAULT_TEXT_MODEL};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let config = service.load().unwrap();
        assert_eq!(config.models.text, DEFAULT_TEXT_MODEL);
        assert_eq!(config.polling.max_attempts, DEFAULT_POLL_MAX_ATTEMPTS);
        assert_eq!(
            service.output_dir().unwrap(),
            temp_dir.path().join("outputs")
        );
    }

    #[test]
    fn test_reads_overrides() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            r#"
[polling]
max_attempts = 0

[output]
directory = "/tmp/market-out"

[tools.image-generator]
redirect_url = "https://example.com/image"
"#,
        )
        .unwrap();

        let service = ConfigService::new(Some(temp_dir.path())).unwrap();
        let config = service.load().unwrap();
        assert!(config.polling.to_policy().max_attempts.is_none());
        assert_eq!(
            config.tools["image-generator"].redirect_url.as_deref(),
            Some("https://example.com/image")
        );
        assert_eq!(
            service.output_dir().unwrap(),
            PathBuf::from("/tmp/market-out")
        );
    }

    #[test]
    fn test_ensure_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let (path, created) = service.ensure_config_file().unwrap();
        assert!(created);
        assert!(path.exists());

        let (_, created_again) = service.ensure_config_file().unwrap();
        assert!(!created_again);

        let reloaded = ConfigService::new(Some(temp_dir.path())).unwrap();
        assert_eq!(reloaded.load().unwrap().polling.interval_secs, 5);
    }
}
