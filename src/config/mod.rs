//! Application configuration
//!
//! Every section has serde defaults, so a config file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::PageGeometry;
use crate::engine::{SamplerConfig, DEFAULT_THRESHOLD};
use crate::output::{OutputNaming, OverwritePolicy};
use crate::store::DEFAULT_JPEG_QUALITY;
use crate::utils::logging::LoggingConfig;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "FRAMEDECK_";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Mean RGB distance below which a snapshot is a near-duplicate
    pub threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// JPEG quality for sampled frames, 1-100
    pub jpeg_quality: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub suffix: String,
    pub extension: String,
    pub overwrite: OverwritePolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let naming = OutputNaming::default();
        Self {
            suffix: naming.suffix,
            extension: naming.extension,
            overwrite: OverwritePolicy::Never,
        }
    }
}

impl OutputConfig {
    pub fn naming(&self) -> OutputNaming {
        OutputNaming {
            suffix: self.suffix.clone(),
            extension: self.extension.clone(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplerConfig,
    pub dedup: DedupConfig,
    pub encoding: EncodingConfig,
    pub layout: PageGeometry,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate value ranges across all sections
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.sampling.max_candidates == 0 {
            return Err(DomainError::Config(
                "sampling.max_candidates must be at least 1".to_string(),
            ));
        }
        if self.sampling.frame_width == 0 || self.sampling.frame_height == 0 {
            return Err(DomainError::Config(format!(
                "sampling frame size must be non-zero, got {}x{}",
                self.sampling.frame_width, self.sampling.frame_height
            )));
        }
        if !self.dedup.threshold.is_finite() || self.dedup.threshold < 0.0 {
            return Err(DomainError::Config(format!(
                "dedup.threshold must be a non-negative number, got {}",
                self.dedup.threshold
            )));
        }
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(DomainError::Config(format!(
                "encoding.jpeg_quality must be within 1..=100, got {}",
                self.encoding.jpeg_quality
            )));
        }
        if self.output.extension.trim_start_matches('.').is_empty() {
            return Err(DomainError::Config("output.extension must not be empty".to_string()));
        }
        self.layout
            .validate()
            .map_err(|e| DomainError::Config(format!("layout: {}", e)))
    }

    /// Apply `FRAMEDECK_*` overrides read through `lookup`.
    ///
    /// Returns the number of keys overridden.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let mut var = |key: &str| {
            let value = lookup(&format!("{}{}", ENV_PREFIX, key));
            if value.is_some() {
                applied += 1;
            }
            value.map(|v| (format!("{}{}", ENV_PREFIX, key), v))
        };

        if let Some((name, value)) = var("MAX_FRAMES") {
            self.sampling.max_candidates = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("FRAME_WIDTH") {
            self.sampling.frame_width = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("FRAME_HEIGHT") {
            self.sampling.frame_height = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("THRESHOLD") {
            self.dedup.threshold = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("JPEG_QUALITY") {
            self.encoding.jpeg_quality = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("MARGIN_MM") {
            self.layout.margin_mm = parse_env(&name, &value)?;
        }
        if let Some((_, value)) = var("OUTPUT_SUFFIX") {
            self.output.suffix = value;
        }
        if let Some((name, value)) = var("OVERWRITE") {
            self.output.overwrite = value
                .parse()
                .map_err(|e: String| DomainError::Config(format!("{}: {}", name, e)))?;
        }
        if let Some((name, value)) = var("LOG_LEVEL") {
            self.logging.level = value
                .parse()
                .map_err(|e: String| DomainError::Config(format!("{}: {}", name, e)))?;
        }
        if let Some((name, value)) = var("LOG_FORMAT") {
            self.logging.format = value
                .parse()
                .map_err(|e: String| DomainError::Config(format!("{}: {}", name, e)))?;
        }

        Ok(applied)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, DomainError> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::Config(format!("{} has an invalid value: {}", name, value)))
}
