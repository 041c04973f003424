// Preset persistence for the step sequencer
// Presets capture pattern, playback and quantizer settings; stores are opaque
// key/value collaborators so the sequencer never touches the file system.

pub mod serialization;
pub mod store;
pub mod types;

pub use store::{FilePresetStore, MemoryPresetStore, PresetStore};
pub use types::SequencerPreset;

/// Preset error types
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Invalid preset key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid preset: {0}")]
    Invalid(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
}
