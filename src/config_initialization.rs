//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::adapters::TomlConfigAdapter;
use crate::cli::args::SamplingArgs;
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::domain::errors::DomainError;
use crate::output::OverwritePolicy;
use crate::ports::ConfigPort;

/// Values the command line can override
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub max_frames: Option<usize>,
    pub threshold: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    pub overwrite: Option<OverwritePolicy>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl ConfigOverrides {
    /// Collect the overrides carried by a parsed command line
    pub fn from_cli(cli: &Cli) -> Self {
        let mut overrides = Self {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format.clone(),
            ..Self::default()
        };

        match &cli.command {
            Commands::Extract(args) => {
                overrides.take_sampling(&args.sampling);
                if args.overwrite {
                    overrides.overwrite = Some(OverwritePolicy::Always);
                }
            }
            Commands::Export(args) => {
                if args.overwrite {
                    overrides.overwrite = Some(OverwritePolicy::Always);
                }
            }
            Commands::Run(args) => {
                overrides.take_sampling(&args.sampling);
                if args.overwrite {
                    overrides.overwrite = Some(OverwritePolicy::Always);
                }
            }
            Commands::Inspect(_) => {}
        }
        overrides
    }

    fn take_sampling(&mut self, args: &SamplingArgs) {
        self.max_frames = args.max_frames;
        self.threshold = args.threshold;
        self.width = args.width;
        self.height = args.height;
        self.quality = args.quality;
    }

    /// Apply onto `config`, returning how many values changed hands
    pub fn apply(&self, config: &mut AppConfig) -> Result<usize, DomainError> {
        let mut applied = 0;

        if let Some(max_frames) = self.max_frames {
            config.sampling.max_candidates = max_frames;
            applied += 1;
        }
        if let Some(threshold) = self.threshold {
            config.dedup.threshold = threshold;
            applied += 1;
        }
        if let Some(width) = self.width {
            config.sampling.frame_width = width;
            applied += 1;
        }
        if let Some(height) = self.height {
            config.sampling.frame_height = height;
            applied += 1;
        }
        if let Some(quality) = self.quality {
            config.encoding.jpeg_quality = quality;
            applied += 1;
        }
        if let Some(overwrite) = self.overwrite {
            config.output.overwrite = overwrite;
            applied += 1;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level
                .parse()
                .map_err(|e: String| DomainError::Config(format!("--log-level: {}", e)))?;
            applied += 1;
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format
                .parse()
                .map_err(|e: String| DomainError::Config(format!("--log-format: {}", e)))?;
            applied += 1;
        }

        Ok(applied)
    }
}

/// Resolve configuration with precedence: CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    let base = std::env::current_dir().context("Failed to resolve the working directory")?;
    let overrides = ConfigOverrides::from_cli(cli);

    resolve_configuration(
        cli.config.as_deref().map(Path::new),
        &base,
        |key| std::env::var(key).ok(),
        &overrides,
    )
    .await
}

/// Layer file, environment and command-line values over the defaults.
///
/// An explicit `config_path` must exist; otherwise the default locations
/// under `base` are searched and a missing file is not an error.
pub async fn resolve_configuration<F>(
    config_path: Option<&Path>,
    base: &Path,
    env: F,
    overrides: &ConfigOverrides,
) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match locate_config_file(config_path, base) {
        Some(path) => TomlConfigAdapter::new()
            .load_config(&path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            debug!("No configuration file found, using defaults");
            AppConfig::default()
        }
    };

    let env_overrides = config
        .apply_env(env)
        .context("Invalid environment override")?;
    if env_overrides > 0 {
        debug!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = overrides
        .apply(&mut config)
        .context("Invalid command-line override")?;
    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn locate_config_file(explicit: Option<&Path>, base: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => {
            info!("Using configuration file {}", path.display());
            Some(path.to_path_buf())
        }
        None => TomlConfigAdapter::discover(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::LogLevel;
    use clap::Parser;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn test_defaults_without_any_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve_configuration(None, dir.path(), no_env, &ConfigOverrides::default())
            .await
            .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_precedence_cli_over_env_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("framedeck.toml"),
            "[sampling]\nmax_candidates = 10\nframe_width = 320\n\n[dedup]\nthreshold = 20.0\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> = [("FRAMEDECK_MAX_FRAMES", "30"), ("FRAMEDECK_THRESHOLD", "25")]
            .into_iter()
            .collect();
        let overrides = ConfigOverrides {
            max_frames: Some(40),
            ..ConfigOverrides::default()
        };

        let config = resolve_configuration(
            None,
            dir.path(),
            |key| env.get(key).map(|v| v.to_string()),
            &overrides,
        )
        .await
        .unwrap();

        assert_eq!(config.sampling.max_candidates, 40);
        assert_eq!(config.dedup.threshold, 25.0);
        assert_eq!(config.sampling.frame_width, 320);
        assert_eq!(config.sampling.frame_height, 360);
    }

    #[tokio::test]
    async fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result =
            resolve_configuration(Some(&missing), dir.path(), no_env, &ConfigOverrides::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = ConfigOverrides {
            quality: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(resolve_configuration(None, dir.path(), no_env, &overrides)
            .await
            .is_err());
    }

    #[test]
    fn test_overrides_from_cli() {
        let cli = Cli::parse_from([
            "framedeck",
            "--log-level",
            "debug",
            "run",
            "--input",
            "talk.mp4",
            "--max-frames",
            "12",
            "--overwrite",
        ]);
        let overrides = ConfigOverrides::from_cli(&cli);
        assert_eq!(overrides.max_frames, Some(12));
        assert_eq!(overrides.overwrite, Some(OverwritePolicy::Always));

        let mut config = AppConfig::default();
        assert_eq!(overrides.apply(&mut config).unwrap(), 3);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_extract_overwrite_flag() {
        let cli = Cli::parse_from(["framedeck", "extract", "-i", "talk.mp4", "-o", "frames"]);
        assert_eq!(ConfigOverrides::from_cli(&cli).overwrite, None);

        let cli = Cli::parse_from([
            "framedeck",
            "extract",
            "-i",
            "talk.mp4",
            "-o",
            "frames",
            "--overwrite",
        ]);
        assert_eq!(
            ConfigOverrides::from_cli(&cli).overwrite,
            Some(OverwritePolicy::Always)
        );
    }
}
