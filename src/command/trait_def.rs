// UndoableCommand trait definition

use crate::sequencer::adapter::StepSequencer;
use crate::sequencer::error::SequencerError;

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Undo failed: {0}")]
    UndoFailed(String),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),
}

/// Trait for pattern edits that support undo/redo
///
/// Commands store whatever they overwrite during `execute` so `undo` can put
/// it back.
///
/// # Example
/// ```no_run
/// use mymusic_stepseq::command::{CommandError, CommandResult, UndoableCommand};
/// use mymusic_stepseq::sequencer::StepSequencer;
///
/// struct MuteCommand {
///     old_muted: Option<bool>,
/// }
///
/// impl UndoableCommand for MuteCommand {
///     fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
///         self.old_muted = Some(seq.is_muted());
///         seq.set_muted(true);
///         Ok(())
///     }
///
///     fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
///         let old = self
///             .old_muted
///             .ok_or_else(|| CommandError::UndoFailed("Not executed".into()))?;
///         seq.set_muted(old);
///         Ok(())
///     }
///
///     fn description(&self) -> String {
///         "Mute".to_string()
///     }
/// }
/// ```
pub trait UndoableCommand: Send {
    /// Execute the command, storing the previous state internally
    fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()>;

    /// Restore the state to what it was before execute() was called
    fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()>;

    /// Human-readable description (e.g., "Set Step 3")
    fn description(&self) -> String;
}
