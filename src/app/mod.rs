// Application layer - Use case interactors

pub mod container;
pub mod export_interactor;
pub mod extract_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use export_interactor::{ExportInteractor, ExportOutcome, ExportRequest};
pub use extract_interactor::{ExtractInteractor, ExtractOutcome, ExtractSettings};
