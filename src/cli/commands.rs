//! Command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::adapters::{FrameManifest, ManifestFrameProvider, ManifestWriter};
use crate::app::{AppContainer, DefaultAppContainer, ExportOutcome, ExportRequest};
use crate::cli::args::{ExportArgs, ExtractArgs, InspectArgs, RunArgs};
use crate::config::AppConfig;
use crate::domain::model::ExtractionReport;
use crate::engine::CancellationFlag;
use crate::ports::FrameProviderPort;
use crate::store::FrameStore;
use crate::utils::format_file_size;
use crate::utils::time::format_timestamp;

/// Execute the extract command
pub async fn extract(args: ExtractArgs, config: &AppConfig) -> Result<()> {
    info!("Starting extract operation");
    info!("Input: {}", args.input);

    let container = DefaultAppContainer::new(config, &args.out_dir)?;
    let cancel = cancel_on_ctrl_c();
    let outcome = container
        .extract_interactor()
        .extract(&args.input, &cancel)
        .await
        .context("Failed to extract frames")?;

    let manifest = ManifestWriter::new(config.output.overwrite)
        .write(Path::new(&args.out_dir), &outcome.store)
        .await
        .context("Failed to write frame manifest")?;

    display_report(&outcome.report);
    println!("Manifest: {}", manifest.display());
    Ok(())
}

/// Execute the export command
pub async fn export(args: ExportArgs, config: &AppConfig) -> Result<()> {
    info!("Starting export operation");
    info!("Manifest: {}", args.manifest);

    let container = DefaultAppContainer::new(config, &args.out_dir)?;
    let store = container
        .extract_interactor()
        .import(&args.manifest)
        .await
        .context("Failed to load frames")?;

    let request = ExportRequest {
        title: args.title,
        selection: args.selection.resolve(&store, true)?,
    };
    let outcome = container
        .export_interactor()
        .export(&store, &request)
        .await
        .context("Failed to export document")?;

    display_export(&outcome);
    Ok(())
}

/// Execute the run command: extract then export every kept frame unless a
/// selection is given
pub async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    info!("Starting run operation");
    info!("Input: {}", args.input);

    let container = DefaultAppContainer::new(config, &args.out_dir)?;
    let cancel = cancel_on_ctrl_c();
    let outcome = container
        .extract_interactor()
        .extract(&args.input, &cancel)
        .await
        .context("Failed to extract frames")?;
    display_report(&outcome.report);

    let request = ExportRequest {
        title: args.title,
        selection: args.selection.resolve(&outcome.store, true)?,
    };
    let exported = container
        .export_interactor()
        .export(&outcome.store, &request)
        .await
        .context("Failed to export document")?;

    display_export(&exported);
    Ok(())
}

/// One row of `inspect` output
#[derive(Debug, Serialize)]
struct InspectEntry {
    id: String,
    timestamp: f64,
    format: &'static str,
    bytes: usize,
    similarity: Option<f64>,
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs) -> Result<()> {
    info!("Starting inspect operation");

    let path = Path::new(&args.manifest);
    let manifest = FrameManifest::read(path).await.context("Failed to read manifest")?;
    let frames = ManifestFrameProvider::new()
        .fetch_frames(&args.manifest)
        .await
        .context("Failed to load manifest frames")?;
    let store = FrameStore::from_provided(manifest.source.clone(), frames)?;

    let entries: Vec<InspectEntry> = store
        .iter()
        .zip(manifest.frames.iter())
        .map(|(frame, entry)| InspectEntry {
            id: frame.id().to_string(),
            timestamp: frame.timestamp(),
            format: frame.image().format().extension(),
            bytes: frame.image().len(),
            similarity: entry.similarity,
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&entries)
            .context("Failed to serialize frame list to JSON")?;
        println!("{}", json);
    } else {
        display_frames(store.source(), &entries);
    }
    Ok(())
}

/// Cancellation flag that trips on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationFlag {
    let cancel = CancellationFlag::new();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping before the next frame");
            flag.cancel();
        }
    });
    cancel
}

fn display_report(report: &ExtractionReport) {
    println!("Extraction Results");
    println!("==================");
    match report.duration {
        Some(duration) => println!("Duration: {}", format_timestamp(duration)),
        None => println!("Duration: unknown"),
    }
    println!("Interval: {}s", report.interval);
    println!("Sampled: {}", report.sampled);
    println!("Kept: {}", report.kept);
    println!("Discarded: {}", report.discarded);
    if report.skipped > 0 {
        println!("Skipped: {}", report.skipped);
    }
}

fn display_export(outcome: &ExportOutcome) {
    println!(
        "Saved {} ({} frames, {} pages)",
        outcome.location, outcome.frame_count, outcome.page_count
    );
}

fn display_frames(source: &str, entries: &[InspectEntry]) {
    println!("Source: {}", source);
    println!("Frames: {}", entries.len());
    for entry in entries {
        let similarity = entry
            .similarity
            .map(|s| format!("  distance {:.1}", s))
            .unwrap_or_default();
        println!(
            "  {:<10} {:>9}  {:<4} {:>10}{}",
            entry.id,
            format_timestamp(entry.timestamp),
            entry.format,
            format_file_size(entry.bytes as u64),
            similarity
        );
    }
}
