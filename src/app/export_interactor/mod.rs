// Export interactor - Orchestrates layout, assembly and delivery of a document

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use crate::domain::model::*;
use crate::engine::{ProgressCallback, ProgressPhase};
use crate::error::{FrameDeckError, FrameDeckResult};
use crate::layout::LayoutEngine;
use crate::output::DocumentAssembler;
use crate::ports::*;
use crate::store::FrameStore;
use crate::utils::path::source_title;

/// What to export from a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRequest {
    /// Document title, defaults to the source name
    pub title: Option<String>,
    pub selection: Selection,
}

/// Result of a delivered export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub filename: String,
    /// Where the sink stored the document
    pub location: String,
    pub page_count: usize,
    pub frame_count: usize,
}

/// Interactor for the export use case
pub struct ExportInteractor {
    layout_engine: LayoutEngine,
    assembler: DocumentAssembler,
    sink: Arc<dyn DocumentSinkPort>,
    progress: Arc<dyn ProgressCallback>,
}

impl ExportInteractor {
    /// Create new export interactor with injected ports
    pub fn new(
        layout_engine: LayoutEngine,
        assembler: DocumentAssembler,
        sink: Arc<dyn DocumentSinkPort>,
        progress: Arc<dyn ProgressCallback>,
    ) -> Self {
        Self {
            layout_engine,
            assembler,
            sink,
            progress,
        }
    }

    /// Export the selected frames, dated today
    pub async fn export(&self, store: &FrameStore, request: &ExportRequest) -> FrameDeckResult<ExportOutcome> {
        self.export_dated(store, request, Local::now().date_naive()).await
    }

    /// Export with an explicit generation date
    pub async fn export_dated(
        &self,
        store: &FrameStore,
        request: &ExportRequest,
        generated_on: NaiveDate,
    ) -> FrameDeckResult<ExportOutcome> {
        let span = info_span!("export", source = %store.source());
        self.run_export(store, request, generated_on).instrument(span).await
    }

    async fn run_export(
        &self,
        store: &FrameStore,
        request: &ExportRequest,
        generated_on: NaiveDate,
    ) -> FrameDeckResult<ExportOutcome> {
        let frames = store.select(&request.selection);
        if frames.is_empty() {
            warn!("No frames selected, the document will only have a title page");
        }
        let title = request
            .title
            .clone()
            .unwrap_or_else(|| source_title(store.source()));

        let progress = Arc::clone(&self.progress);
        let tick = |phase: ProgressPhase| {
            let progress = Arc::clone(&progress);
            move |done: usize, total: usize| {
                progress.on_progress(
                    phase,
                    done as u64,
                    Some(total as u64),
                    Some(format!("page {} of {}", done, total)),
                )
            }
        };

        self.progress.on_start(ProgressPhase::Layout, Some(frames.len() as u64));
        let layout = self
            .layout_engine
            .layout_with_progress(&frames, &title, generated_on, &mut tick(ProgressPhase::Layout))
            .map_err(FrameDeckError::Assembly)?;

        self.progress.on_start(ProgressPhase::Writing, Some(frames.len() as u64));
        let document = self
            .assembler
            .assemble_with_progress(store.source(), &layout, &frames, &mut tick(ProgressPhase::Writing))
            .map_err(FrameDeckError::Assembly)?;

        let location = self
            .sink
            .deliver(&document.filename, &document.bytes)
            .await
            .map_err(FrameDeckError::Assembly)?;

        info!("Exported {} frames to {}", frames.len(), location);
        self.progress.on_complete(Some(format!("Document saved to {}", location)));

        Ok(ExportOutcome {
            filename: document.filename,
            location,
            page_count: document.page_count,
            frame_count: frames.len(),
        })
    }
}
