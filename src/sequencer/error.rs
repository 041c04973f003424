// Sequencer errors - checked forms of pattern edits

/// Errors returned by the checked pattern operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequencerError {
    #[error("Step index {index} out of range (pattern holds {max} steps)")]
    StepOutOfRange { index: usize, max: usize },

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },
}
