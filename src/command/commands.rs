// Concrete command implementations

use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::sequencer::adapter::StepSequencer;
use crate::sequencer::direction::Direction;
use crate::sequencer::pattern::{MAX_STEPS, Pattern};
use crate::sequencer::step::Step;

fn not_executed(what: &str) -> CommandError {
    CommandError::UndoFailed(format!("No previous {} stored", what))
}

/// Replace one step
pub struct SetStepCommand {
    index: usize,
    new_step: Step,
    old_step: Option<Step>,
}

impl SetStepCommand {
    pub fn new(index: usize, step: Step) -> Self {
        Self {
            index,
            new_step: step,
            old_step: None,
        }
    }
}

impl UndoableCommand for SetStepCommand {
    fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        let old = seq.get_step_data(self.index);
        seq.pattern_mut().try_set_step(self.index, self.new_step)?;
        self.old_step = old;
        Ok(())
    }

    fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        let old = self.old_step.ok_or_else(|| not_executed("step"))?;
        seq.pattern_mut().try_set_step(self.index, old)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Set Step {}", self.index + 1)
    }
}

/// Reset every step to defaults
#[derive(Default)]
pub struct ClearPatternCommand {
    old_pattern: Option<Pattern>,
}

impl ClearPatternCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UndoableCommand for ClearPatternCommand {
    fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        self.old_pattern = Some(seq.pattern().clone());
        seq.clear_pattern();
        Ok(())
    }

    fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        let old = self.old_pattern.take().ok_or_else(|| not_executed("pattern"))?;
        seq.replace_pattern(old);
        Ok(())
    }

    fn description(&self) -> String {
        "Clear Pattern".to_string()
    }
}

/// Random fill of the pattern
///
/// Redo restores the pattern generated the first time instead of rolling again.
pub struct GeneratePatternCommand {
    octave_range: u8,
    density: f64,
    old_pattern: Option<Pattern>,
    generated: Option<Pattern>,
}

impl GeneratePatternCommand {
    pub fn new(octave_range: u8, density: f64) -> Self {
        Self {
            octave_range,
            density,
            old_pattern: None,
            generated: None,
        }
    }
}

impl UndoableCommand for GeneratePatternCommand {
    fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        self.old_pattern = Some(seq.pattern().clone());
        match &self.generated {
            Some(pattern) => {
                seq.replace_pattern(pattern.clone());
            }
            None => {
                seq.generate_pattern(self.octave_range, self.density);
                self.generated = Some(seq.pattern().clone());
            }
        }
        Ok(())
    }

    fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        let old = self.old_pattern.take().ok_or_else(|| not_executed("pattern"))?;
        seq.replace_pattern(old);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Generate Pattern ({:.0}% density)", self.density.clamp(0.0, 1.0) * 100.0)
    }
}

/// Change playback direction
pub struct SetDirectionCommand {
    new_direction: Direction,
    old_direction: Option<Direction>,
}

impl SetDirectionCommand {
    pub fn new(direction: Direction) -> Self {
        Self {
            new_direction: direction,
            old_direction: None,
        }
    }
}

impl UndoableCommand for SetDirectionCommand {
    fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        self.old_direction = Some(seq.direction());
        seq.set_direction(self.new_direction);
        Ok(())
    }

    fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        let old = self.old_direction.ok_or_else(|| not_executed("direction"))?;
        seq.set_direction(old);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Set Direction to {}", self.new_direction)
    }
}

/// Change the number of played steps
pub struct SetLengthCommand {
    new_length: usize,
    old_length: Option<usize>,
}

impl SetLengthCommand {
    /// Length is clamped to 1..=16
    pub fn new(length: usize) -> Self {
        Self {
            new_length: length.clamp(1, MAX_STEPS),
            old_length: None,
        }
    }
}

impl UndoableCommand for SetLengthCommand {
    fn execute(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        self.old_length = Some(seq.pattern().length());
        seq.pattern_mut().set_length(self.new_length);
        Ok(())
    }

    fn undo(&mut self, seq: &mut StepSequencer) -> CommandResult<()> {
        let old = self.old_length.ok_or_else(|| not_executed("length"))?;
        seq.pattern_mut().set_length(old);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Set Length to {}", self.new_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::error::SequencerError;

    fn seq() -> StepSequencer {
        StepSequencer::with_seed(24, 9)
    }

    #[test]
    fn test_set_step_undo() {
        let mut seq = seq();
        let mut cmd = SetStepCommand::new(4, Step::on(67));

        cmd.execute(&mut seq).unwrap();
        assert_eq!(seq.get_step_data(4), Some(Step::on(67)));

        cmd.undo(&mut seq).unwrap();
        assert_eq!(seq.get_step_data(4), Some(Step::default()));
        assert_eq!(cmd.description(), "Set Step 5");
    }

    #[test]
    fn test_set_step_out_of_range() {
        let mut seq = seq();
        let mut cmd = SetStepCommand::new(16, Step::on(60));
        assert_eq!(
            cmd.execute(&mut seq),
            Err(CommandError::Sequencer(SequencerError::StepOutOfRange {
                index: 16,
                max: 16
            }))
        );
        assert!(cmd.undo(&mut seq).is_err());
    }

    #[test]
    fn test_clear_pattern_undo() {
        let mut seq = seq();
        seq.set_step_data(0, true, 72, 100, 80);
        seq.pattern_mut().set_length(6);
        let before = seq.pattern().clone();

        let mut cmd = ClearPatternCommand::new();
        cmd.execute(&mut seq).unwrap();
        assert_eq!(seq.pattern().active_count(), 0);
        assert_eq!(seq.pattern().length(), 6);

        cmd.undo(&mut seq).unwrap();
        assert_eq!(seq.pattern(), &before);
    }

    #[test]
    fn test_generate_redo_is_stable() {
        let mut seq = seq();
        let mut cmd = GeneratePatternCommand::new(2, 1.0);

        cmd.execute(&mut seq).unwrap();
        let generated = seq.pattern().clone();
        assert_eq!(generated.active_count(), 16);

        cmd.undo(&mut seq).unwrap();
        assert_eq!(seq.pattern(), &Pattern::new());

        cmd.execute(&mut seq).unwrap();
        assert_eq!(seq.pattern(), &generated);
    }

    #[test]
    fn test_direction_and_length_undo() {
        let mut seq = seq();

        let mut dir = SetDirectionCommand::new(Direction::Random);
        dir.execute(&mut seq).unwrap();
        assert_eq!(seq.direction(), Direction::Random);
        dir.undo(&mut seq).unwrap();
        assert_eq!(seq.direction(), Direction::Forward);

        let mut len = SetLengthCommand::new(40);
        len.execute(&mut seq).unwrap();
        assert_eq!(seq.pattern().length(), 16);
        assert_eq!(len.description(), "Set Length to 16");

        let mut len = SetLengthCommand::new(3);
        len.execute(&mut seq).unwrap();
        assert_eq!(seq.pattern().length(), 3);
        len.undo(&mut seq).unwrap();
        assert_eq!(seq.pattern().length(), 16);
    }
}
