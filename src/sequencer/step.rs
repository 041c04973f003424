// Step - One slot of a step pattern

use serde::{Deserialize, Serialize};

/// Default note for a fresh step (middle C)
pub const DEFAULT_NOTE: u8 = 60;

/// Default velocity, about 70% of the MIDI range
pub const DEFAULT_VELOCITY: u8 = 89;

/// Default gate length in percent of the step duration
pub const DEFAULT_GATE: u8 = 50;

/// Maximum gate, the note lasts the whole step
pub const MAX_GATE: u8 = 100;

/// A single sequencer step
///
/// `gate` is a percentage of the step duration (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub active: bool,
    pub note: u8,
    pub velocity: u8,
    pub gate: u8,
}

impl Step {
    /// Create a step, clamping note/velocity to 0-127 and gate to 0-100
    pub fn new(active: bool, note: u8, velocity: u8, gate: u8) -> Self {
        Self {
            active,
            note: note.min(127),
            velocity: velocity.min(127),
            gate: gate.min(MAX_GATE),
        }
    }

    /// An active step with the default velocity and gate
    pub fn on(note: u8) -> Self {
        Self::new(true, note, DEFAULT_VELOCITY, DEFAULT_GATE)
    }
}

impl Default for Step {
    fn default() -> Self {
        Self {
            active: false,
            note: DEFAULT_NOTE,
            velocity: DEFAULT_VELOCITY,
            gate: DEFAULT_GATE,
        }
    }
}
