//! Command-line argument definitions

use clap::Args;

use crate::domain::errors::DomainError;
use crate::domain::model::{FrameId, Selection};
use crate::store::FrameStore;

/// Sampling overrides shared by `extract` and `run`
#[derive(Args, Debug, Clone, Default)]
pub struct SamplingArgs {
    /// Maximum number of candidate frames
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Near-duplicate threshold (mean RGB distance, 0-441)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Snapshot width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Snapshot height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// JPEG quality of stored frames (1-100)
    #[arg(long)]
    pub quality: Option<u8>,
}

/// Frame selection shared by `export` and `run`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Comma-separated frame ids to include (e.g. 0,2,5 or frame-3)
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    pub select: Vec<String>,

    /// Include every frame
    #[arg(long)]
    pub all: bool,
}

impl SelectArgs {
    /// Resolve against a run; no explicit ids means every frame when
    /// `default_all` is set
    pub fn resolve(&self, store: &FrameStore, default_all: bool) -> Result<Selection, DomainError> {
        if self.all || (self.select.is_empty() && default_all) {
            return Ok(store.select_all());
        }
        self.select
            .iter()
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.parse::<FrameId>())
            .collect()
    }
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input video file or URL
    #[arg(short, long)]
    pub input: String,

    /// Directory for frame images and manifest.json
    #[arg(short, long)]
    pub out_dir: String,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Replace an existing manifest and its frame images
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Frame manifest (from `extract` or an external provider)
    #[arg(short, long)]
    pub manifest: String,

    #[command(flatten)]
    pub selection: SelectArgs,

    /// Document title (default: source name)
    #[arg(long)]
    pub title: Option<String>,

    /// Output directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub out_dir: String,

    /// Replace an existing document
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input video file or URL
    #[arg(short, long)]
    pub input: String,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    #[command(flatten)]
    pub selection: SelectArgs,

    /// Document title (default: source name)
    #[arg(long)]
    pub title: Option<String>,

    /// Output directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub out_dir: String,

    /// Replace an existing document
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Frame manifest to list
    #[arg(short, long)]
    pub manifest: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
