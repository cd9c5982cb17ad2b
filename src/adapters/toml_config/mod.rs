// TOML config adapter - Configuration files in TOML

use crate::config::AppConfig;
use crate::domain::errors::*;
use crate::ports::*;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File names searched when no `--config` path is given, in order
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["framedeck.toml", "config/framedeck.toml"];

/// TOML configuration adapter
#[derive(Debug, Default, Clone)]
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    pub fn new() -> Self {
        Self
    }

    /// First default config file that exists under `base`
    pub fn discover(base: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|path| path.is_file())
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<AppConfig, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Serialize configuration to TOML text
    pub fn render(config: &AppConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(config)
            .map_err(|e| DomainError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn load_config(&self, path: &Path) -> Result<AppConfig, DomainError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config = Self::parse(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    async fn save_config(&self, path: &Path, config: &AppConfig) -> Result<(), DomainError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = Self::render(config)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| DomainError::Io(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OverwritePolicy;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("framedeck.toml");

        let mut config = AppConfig::default();
        config.dedup.threshold = 9.5;
        config.output.overwrite = OverwritePolicy::Always;

        let adapter = TomlConfigAdapter::new();
        adapter.save_config(&path, &config).await.unwrap();
        let loaded = adapter.load_config(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TomlConfigAdapter::new()
            .load_config(&dir.path().join("absent.toml"))
            .await;
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = TomlConfigAdapter::parse("[sampling]\nmax_candidates = \"many\"");
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_discover_prefers_root_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TomlConfigAdapter::discover(dir.path()).is_none());

        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join("config/framedeck.toml"), "").unwrap();
        assert_eq!(
            TomlConfigAdapter::discover(dir.path()),
            Some(dir.path().join("config/framedeck.toml"))
        );

        std::fs::write(dir.path().join("framedeck.toml"), "").unwrap();
        assert_eq!(
            TomlConfigAdapter::discover(dir.path()),
            Some(dir.path().join("framedeck.toml"))
        );
    }
}
