// Frame manifest adapter - Frames on disk described by a JSON manifest

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::output::OverwritePolicy;
use crate::ports::*;
use crate::store::FrameStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name used by `ManifestWriter`
pub const MANIFEST_FILE: &str = "manifest.json";

/// On-disk manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameManifest {
    /// Descriptor of the video the frames came from
    pub source: String,
    pub frames: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Image path, relative to the manifest unless absolute
    pub image: String,
    /// Capture position in seconds
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl FrameManifest {
    pub fn parse(content: &str) -> Result<Self, DomainError> {
        serde_json::from_str(content)
            .map_err(|e| DomainError::Manifest(format!("Invalid manifest: {}", e)))
    }

    pub async fn read(path: &Path) -> Result<Self, DomainError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::Manifest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// Frame provider backed by a manifest file; `source` is the manifest path
#[derive(Debug, Default, Clone)]
pub struct ManifestFrameProvider;

impl ManifestFrameProvider {
    pub fn new() -> Self {
        Self
    }

    async fn load_entry(base: &Path, entry: &ManifestEntry) -> Result<ProvidedFrame, DomainError> {
        let path = resolve(base, &entry.image);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            DomainError::Manifest(format!("Failed to read frame image {}: {}", path.display(), e))
        })?;

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| guess_format(&bytes))
            .ok_or_else(|| {
                DomainError::Manifest(format!("Unsupported image format: {}", path.display()))
            })?;

        Ok(ProvidedFrame {
            image: EncodedImage::new(format, bytes),
            timestamp: entry.timestamp,
        })
    }
}

#[async_trait]
impl FrameProviderPort for ManifestFrameProvider {
    async fn fetch_frames(&self, source: &str) -> Result<Vec<ProvidedFrame>, DomainError> {
        let manifest_path = Path::new(source);
        let manifest = FrameManifest::read(manifest_path).await?;
        let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));

        let mut frames = Vec::with_capacity(manifest.frames.len());
        for entry in &manifest.frames {
            frames.push(Self::load_entry(base, entry).await?);
        }

        tracing::debug!("Loaded {} frames from {}", frames.len(), manifest_path.display());
        Ok(frames)
    }

    async fn source_name(&self, source: &str) -> Result<String, DomainError> {
        Ok(FrameManifest::read(Path::new(source)).await?.source)
    }
}

/// Writes a frame store as image files plus a manifest
#[derive(Debug, Default, Clone)]
pub struct ManifestWriter {
    overwrite: OverwritePolicy,
}

impl ManifestWriter {
    pub fn new(overwrite: OverwritePolicy) -> Self {
        Self { overwrite }
    }

    /// Write `frame-{n}.{ext}` files and `manifest.json` into `dir`.
    ///
    /// An existing manifest is only replaced under `OverwritePolicy::Always`;
    /// frame images left over from an earlier run are removed. Returns the
    /// manifest path.
    pub async fn write(&self, dir: &Path, store: &FrameStore) -> Result<PathBuf, DomainError> {
        let path = dir.join(MANIFEST_FILE);
        if self.overwrite == OverwritePolicy::Never && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DomainError::Manifest(format!(
                "Manifest already exists: {} (overwrite policy is never)",
                path.display()
            )));
        }

        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            DomainError::Manifest(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let names: Vec<String> = store
            .iter()
            .map(|frame| format!("{}.{}", frame.id(), frame.image().format().extension()))
            .collect();
        remove_stale_frames(dir, &names).await?;

        let mut entries = Vec::with_capacity(store.len());
        for (frame, name) in store.iter().zip(names) {
            tokio::fs::write(dir.join(&name), frame.image().bytes())
                .await
                .map_err(|e| DomainError::Manifest(format!("Failed to write {}: {}", name, e)))?;
            entries.push(ManifestEntry {
                image: name,
                timestamp: frame.timestamp(),
                similarity: frame.similarity(),
            });
        }

        let manifest = FrameManifest {
            source: store.source().to_string(),
            frames: entries,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| DomainError::Manifest(format!("Failed to serialize manifest: {}", e)))?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| DomainError::Manifest(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::info!("Wrote {} frames and {}", store.len(), path.display());
        Ok(path)
    }
}

/// Delete `frame-{n}.{ext}` images in `dir` that are not in `keep`
async fn remove_stale_frames(dir: &Path, keep: &[String]) -> Result<(), DomainError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        DomainError::Manifest(format!("Failed to list {}: {}", dir.display(), e))
    })?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::Manifest(format!("Failed to list {}: {}", dir.display(), e)))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_frame_image(&name) || keep.contains(&name) {
            continue;
        }
        tokio::fs::remove_file(entry.path()).await.map_err(|e| {
            DomainError::Manifest(format!("Failed to remove stale {}: {}", name, e))
        })?;
        tracing::debug!("Removed stale frame image {}", name);
    }
    Ok(())
}

fn is_frame_image(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let is_index = stem
        .strip_prefix("frame-")
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    is_index && ImageFormat::from_extension(ext).is_some()
}

fn resolve(base: &Path, image: &str) -> PathBuf {
    let path = Path::new(image);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn guess_format(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
        image::ImageFormat::Png => Some(ImageFormat::Png),
        _ => None,
    }
}
