//! FrameDeck Library
//!
//! Turns a video into a deck of visually distinct frames and assembles a
//! chosen subset into a paginated PDF.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod layout;
pub mod output;
pub mod planner;
pub mod ports;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer, ExportRequest};
pub use config::AppConfig;
pub use domain::errors::DomainError;
pub use domain::model::{ExtractionReport, Frame, FrameId, Selection, Snapshot};
pub use error::{FrameDeckError, FrameDeckResult, Stage};
pub use store::{FrameStore, Workspace};
