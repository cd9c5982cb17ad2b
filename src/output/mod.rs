//! Document assembly and output naming

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::utils::path::derive_output_filename;

pub mod writer;

pub use writer::PdfWriter;

/// Output file naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNaming {
    /// Appended to the source base name
    pub suffix: String,
    /// Document file extension
    pub extension: String,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self {
            suffix: "_frames".to_string(),
            extension: "pdf".to_string(),
        }
    }
}

impl OutputNaming {
    pub fn filename_for(&self, source: &str) -> String {
        derive_output_filename(source, &self.suffix, &self.extension)
    }
}

/// Overwrite policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Always overwrite
    Always,
    /// Never overwrite
    #[default]
    Never,
}

impl FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(OverwritePolicy::Always),
            "never" => Ok(OverwritePolicy::Never),
            _ => Err(format!("Invalid overwrite policy: {}. Valid: always, never", s)),
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::Always => write!(f, "always"),
            OverwritePolicy::Never => write!(f, "never"),
        }
    }
}

/// Finished document, ready for a sink
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Serializes a layout and its frames into one document
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    naming: OutputNaming,
}

impl DocumentAssembler {
    pub fn new(naming: OutputNaming) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &OutputNaming {
        &self.naming
    }

    /// Render `layout` for the frames it was computed from.
    ///
    /// The frames must be the same ordered list given to the layout engine.
    pub fn assemble(
        &self,
        source: &str,
        layout: &DocumentLayout,
        frames: &[&Frame],
    ) -> Result<AssembledDocument, DomainError> {
        self.assemble_with_progress(source, layout, frames, &mut |_, _| {})
    }

    /// Same as [`assemble`](Self::assemble), calling `on_page(done, total)`
    /// after each rendered frame page
    pub fn assemble_with_progress(
        &self,
        source: &str,
        layout: &DocumentLayout,
        frames: &[&Frame],
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<AssembledDocument, DomainError> {
        if frames.len() != layout.frame_pages.len() {
            return Err(DomainError::InvalidArgument(format!(
                "Layout has {} frame pages but {} frames were supplied",
                layout.frame_pages.len(),
                frames.len()
            )));
        }
        if let Some((page, frame)) = layout
            .frame_pages
            .iter()
            .zip(frames)
            .find(|(page, frame)| page.frame_id != frame.id())
        {
            return Err(DomainError::InvalidArgument(format!(
                "Page {} was laid out for {} but received {}",
                page.ordinal,
                page.frame_id,
                frame.id()
            )));
        }

        let bytes = PdfWriter::new(layout.title_page.title.as_str())
            .render_with_progress(layout, frames, on_page)?;
        let document = AssembledDocument {
            filename: self.naming.filename_for(source),
            bytes,
            page_count: layout.page_count(),
        };

        info!(
            "Assembled {} ({} pages, {} bytes)",
            document.filename,
            document.page_count,
            document.bytes.len()
        );
        Ok(document)
    }
}
