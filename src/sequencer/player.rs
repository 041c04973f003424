// Note player - Turns NoteEvents into note-on/note-off calls on an instrument
// Tracks sounding notes so every note-on gets its note-off

use crate::sequencer::note::NoteEvent;
use std::collections::HashMap;

/// The instrument/player collaborator receiving notes
pub trait Instrument {
    fn note_on(&mut self, note: u8, velocity: u8);

    fn note_off(&mut self, note: u8);

    /// Silence everything; the default releases nothing
    fn all_notes_off(&mut self) {}
}

/// Schedules note-offs for notes started from NoteEvents
///
/// Time is supplied by the caller in milliseconds so the player works with any
/// clock (wall time in the demo, a counter in tests).
#[derive(Debug, Default)]
pub struct NotePlayer {
    /// Sounding notes: pitch -> time the note-off is due
    active_notes: HashMap<u8, u64>,
}

impl NotePlayer {
    /// Create a new note player
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a note now; a pitch that is still sounding is released first
    pub fn play<I: Instrument + ?Sized>(&mut self, event: NoteEvent, now_ms: u64, instrument: &mut I) {
        if self.active_notes.remove(&event.note).is_some() {
            instrument.note_off(event.note);
        }
        instrument.note_on(event.note, event.velocity);
        self.active_notes
            .insert(event.note, now_ms.saturating_add(event.duration_ms as u64));
    }

    /// Release every note whose duration has elapsed
    ///
    /// Returns the number of notes released.
    pub fn update<I: Instrument + ?Sized>(&mut self, now_ms: u64, instrument: &mut I) -> usize {
        let mut due: Vec<u8> = self
            .active_notes
            .iter()
            .filter(|(_, end)| **end <= now_ms)
            .map(|(note, _)| *note)
            .collect();
        due.sort_unstable();

        for note in &due {
            self.active_notes.remove(note);
            instrument.note_off(*note);
        }
        due.len()
    }

    /// Stop all currently playing notes (called when transport stops)
    pub fn stop_all<I: Instrument + ?Sized>(&mut self, instrument: &mut I) {
        let mut notes: Vec<u8> = self.active_notes.drain().map(|(note, _)| note).collect();
        notes.sort_unstable();
        for note in notes {
            instrument.note_off(note);
        }
        instrument.all_notes_off();
    }

    /// Earliest pending note-off, if any
    pub fn next_release_ms(&self) -> Option<u64> {
        self.active_notes.values().min().copied()
    }

    /// Number of sounding notes
    pub fn active_count(&self) -> usize {
        self.active_notes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Instrument for Recorder {
        fn note_on(&mut self, note: u8, velocity: u8) {
            self.calls.push(format!("on {} {}", note, velocity));
        }

        fn note_off(&mut self, note: u8) {
            self.calls.push(format!("off {}", note));
        }

        fn all_notes_off(&mut self) {
            self.calls.push("panic".to_string());
        }
    }

    #[test]
    fn test_note_on_then_off_after_duration() {
        let mut player = NotePlayer::new();
        let mut inst = Recorder::default();

        player.play(NoteEvent::new(60, 100, 50), 1000, &mut inst);
        assert_eq!(inst.calls, vec!["on 60 100"]);
        assert_eq!(player.next_release_ms(), Some(1050));

        assert_eq!(player.update(1049, &mut inst), 0);
        assert_eq!(player.update(1050, &mut inst), 1);
        assert_eq!(inst.calls, vec!["on 60 100", "off 60"]);
        assert_eq!(player.active_count(), 0);
    }

    #[test]
    fn test_retrigger_releases_first() {
        let mut player = NotePlayer::new();
        let mut inst = Recorder::default();

        player.play(NoteEvent::new(60, 100, 500), 0, &mut inst);
        player.play(NoteEvent::new(60, 80, 500), 100, &mut inst);

        assert_eq!(inst.calls, vec!["on 60 100", "off 60", "on 60 80"]);
        assert_eq!(player.next_release_ms(), Some(600));
    }

    #[test]
    fn test_stop_all_notes() {
        let mut player = NotePlayer::new();
        let mut inst = Recorder::default();

        player.play(NoteEvent::new(64, 100, 500), 0, &mut inst);
        player.play(NoteEvent::new(60, 100, 500), 0, &mut inst);
        inst.calls.clear();

        player.stop_all(&mut inst);
        assert_eq!(inst.calls, vec!["off 60", "off 64", "panic"]);
        assert_eq!(player.active_count(), 0);
    }
}
