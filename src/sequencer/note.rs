// Note events emitted by the sequencer for the instrument/player

use crate::sequencer::scale::note_name;

/// A note to play: pitch, velocity and how long it should sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    /// MIDI note number (0-127, where 60 = C4)
    pub note: u8,

    /// MIDI velocity (0-127)
    pub velocity: u8,

    /// Time between note-on and note-off
    pub duration_ms: u32,
}

impl NoteEvent {
    /// Creates a note event; note/velocity are clamped to the MIDI range and
    /// the duration is at least 1 ms
    pub fn new(note: u8, velocity: u8, duration_ms: u32) -> Self {
        Self {
            note: note.min(127),
            velocity: velocity.min(127),
            duration_ms: duration_ms.max(1),
        }
    }

    /// Duration for a step of `step_ms` with a gate percentage (0-100)
    pub fn gate_duration_ms(step_ms: f64, gate_percent: u8) -> u32 {
        let ms = step_ms * gate_percent.min(100) as f64 / 100.0;
        if ms.is_finite() {
            ms.round().clamp(1.0, u32::MAX as f64) as u32
        } else {
            1
        }
    }

    /// Get the note name (e.g., "C4", "A#5")
    pub fn note_name(&self) -> String {
        note_name(self.note)
    }
}
