// Command Pattern for undoable pattern edits
//
// - UndoableCommand trait: execute(), undo(), description() over a StepSequencer
// - CommandHistory: bounded undo/redo stacks
// - Concrete commands: SetStepCommand, ClearPatternCommand, GeneratePatternCommand,
//   SetDirectionCommand, SetLengthCommand
//
// Edits made through the engine's command channel are not undoable; this
// module is for code that owns the sequencer directly.

pub mod commands;
pub mod manager;
pub mod trait_def;

pub use commands::{
    ClearPatternCommand, GeneratePatternCommand, SetDirectionCommand, SetLengthCommand,
    SetStepCommand,
};
pub use manager::CommandHistory;
pub use trait_def::{CommandError, CommandResult, UndoableCommand};
