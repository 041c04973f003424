// CommandHistory - Manages undo/redo stacks

use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::sequencer::adapter::StepSequencer;
use std::collections::VecDeque;

/// Default maximum number of commands to keep in history
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Undo/redo history of pattern edits
///
/// Executing a new command clears the redo stack. When the undo stack
/// exceeds its limit the oldest command is dropped.
pub struct CommandHistory {
    /// Most recent at the back
    undo_stack: VecDeque<Box<dyn UndoableCommand>>,

    /// Most recent at the back
    redo_stack: VecDeque<Box<dyn UndoableCommand>>,

    max_history: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// History keeping at most `max_history` undoable commands (at least 1)
    pub fn with_capacity(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_history),
            redo_stack: VecDeque::new(),
            max_history,
        }
    }

    /// Execute a command and record it
    ///
    /// A failed command is not recorded and leaves the redo stack intact.
    pub fn execute(
        &mut self,
        mut command: Box<dyn UndoableCommand>,
        seq: &mut StepSequencer,
    ) -> CommandResult<()> {
        command.execute(seq)?;
        log::debug!("Executed: {}", command.description());

        self.undo_stack.push_back(command);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }
        Ok(())
    }

    /// Undo the last command, returns its description
    pub fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<String> {
        let mut command = self
            .undo_stack
            .pop_back()
            .ok_or_else(|| CommandError::UndoFailed("Nothing to undo".into()))?;

        let description = command.description();
        if let Err(e) = command.undo(seq) {
            self.undo_stack.push_back(command);
            return Err(e);
        }
        self.redo_stack.push_back(command);
        Ok(description)
    }

    /// Redo the last undone command, returns its description
    pub fn redo(&mut self, seq: &mut StepSequencer) -> CommandResult<String> {
        let mut command = self
            .redo_stack
            .pop_back()
            .ok_or_else(|| CommandError::ExecutionFailed("Nothing to redo".into()))?;

        let description = command.description();
        if let Err(e) = command.execute(seq) {
            self.redo_stack.push_back(command);
            return Err(e);
        }
        self.undo_stack.push_back(command);
        Ok(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|cmd| cmd.description())
    }

    /// Description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|cmd| cmd.description())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
