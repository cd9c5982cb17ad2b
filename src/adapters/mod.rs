// Adapters - External system implementations

pub mod frame_manifest;
pub mod fs_sink;
pub mod toml_config;
#[cfg(feature = "libav")]
pub mod video_libav;

// Re-export adapters
pub use frame_manifest::{FrameManifest, ManifestFrameProvider, ManifestWriter};
pub use fs_sink::FsDocumentSink;
pub use toml_config::TomlConfigAdapter;
#[cfg(feature = "libav")]
pub use video_libav::{LibavSourceFactory, LibavVideoSource};
