// Command types - UI → sequencer engine

use crate::preset::SequencerPreset;
use crate::sequencer::direction::Direction;
use crate::sequencer::scale::Scale;
use crate::sequencer::step::Step;
use crate::sequencer::timing::TimingDivision;

/// Edits applied by the engine between clock messages
#[derive(Debug, Clone)]
pub enum SequencerCommand {
    SetStep { index: usize, step: Step },
    ToggleStep(usize),
    ClearPattern,
    GeneratePattern { octave_range: u8, density: f64 },
    RotatePattern(i32),
    SetLength(usize),
    SetDirection(Direction),
    SetDivision(TimingDivision),
    SetRoot(u8),
    SetScale(Scale),
    SetOctaveShift(i8),
    SetQuantize(bool),
    SetMuted(bool),
    LoadPreset(Box<SequencerPreset>),
}
