// Step sequencer - Turns timing bus ticks into step highlights and note triggers
//
// The sequencer owns its pattern, cursor and quantizer. It is driven by
// TransportEvents and reports through a StepListener; it never returns errors
// to the caller, malformed clock data is logged and dropped.

use crate::sequencer::direction::{Cursor, Direction};
use crate::sequencer::note::NoteEvent;
use crate::sequencer::pattern::Pattern;
use crate::sequencer::scale::Quantizer;
use crate::sequencer::step::Step;
use crate::sequencer::timing::{DEFAULT_PPQ, TimingDivision, TimingUpdate};
use crate::sequencer::transport::{TransportEvent, TransportState};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Receives the side effects of clock advancement
pub trait StepListener {
    /// The highlighted step moved; `old` is `None` on the first step after start
    fn on_step(&mut self, old: Option<usize>, new: usize);

    /// An active step was reached
    fn on_note(&mut self, note: NoteEvent);

    /// Transport stopped; clear any highlighting
    fn on_reset(&mut self);
}

/// Sequencer output as a value, for channels and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    StepChanged { old: Option<usize>, new: usize },
    NoteTriggered(NoteEvent),
    Reset,
}

impl StepListener for Vec<SequencerEvent> {
    fn on_step(&mut self, old: Option<usize>, new: usize) {
        self.push(SequencerEvent::StepChanged { old, new });
    }

    fn on_note(&mut self, note: NoteEvent) {
        self.push(SequencerEvent::NoteTriggered(note));
    }

    fn on_reset(&mut self) {
        self.push(SequencerEvent::Reset);
    }
}

/// Step sequencer driven by the timing bus
pub struct StepSequencer {
    pattern: Pattern,
    cursor: Cursor,
    direction: Direction,
    quantizer: Quantizer,
    division: TimingDivision,
    ppq: u32,
    state: TransportState,

    /// Next qualifying tick plays the cursor step instead of advancing
    armed: bool,
    last_tick: Option<u64>,
    highlighted: Option<usize>,
    muted: bool,
    rng: StdRng,
}

impl StepSequencer {
    /// Create a sequencer for a bus running at `ppq` ticks per quarter note
    pub fn new(ppq: u32) -> Self {
        Self::with_rng(ppq, StdRng::from_entropy())
    }

    /// Create a sequencer whose Random direction and pattern generation are reproducible
    pub fn with_seed(ppq: u32, seed: u64) -> Self {
        Self::with_rng(ppq, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ppq: u32, rng: StdRng) -> Self {
        Self {
            pattern: Pattern::new(),
            cursor: Cursor::new(),
            direction: Direction::default(),
            quantizer: Quantizer::default(),
            division: TimingDivision::default(),
            ppq: ppq.max(1),
            state: TransportState::Stopped,
            armed: false,
            last_tick: None,
            highlighted: None,
            muted: false,
            rng,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn pattern_mut(&mut self) -> &mut Pattern {
        &mut self.pattern
    }

    /// Replace the whole pattern (preset load, undo)
    pub fn replace_pattern(&mut self, pattern: Pattern) -> Pattern {
        std::mem::replace(&mut self.pattern, pattern)
    }

    /// Edit a step; out-of-range indices are ignored
    pub fn set_step_data(&mut self, index: usize, active: bool, note: u8, velocity: u8, gate: u8) {
        self.pattern
            .set_step_data(index, active, note, velocity, gate);
    }

    /// Step data, `None` when out of range
    pub fn get_step_data(&self, index: usize) -> Option<Step> {
        self.pattern.get_step_data(index)
    }

    /// Reset all steps to defaults
    pub fn clear_pattern(&mut self) {
        self.pattern.clear();
    }

    /// Random fill of the playable steps, quantized with the current quantizer
    pub fn generate_pattern(&mut self, octave_range: u8, density: f64) {
        let quantizer = self.quantizer;
        self.pattern
            .generate(octave_range, density, &quantizer, &mut self.rng);
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Change direction; a bounce restarts travelling forward
    pub fn set_direction(&mut self, direction: Direction) {
        if direction != self.direction {
            let position = self.cursor.position();
            self.cursor.reset();
            self.cursor.set_position(position);
            self.direction = direction;
        }
    }

    pub fn division(&self) -> TimingDivision {
        self.division
    }

    pub fn set_division(&mut self, division: TimingDivision) {
        if !division.is_exact_at(self.ppq) {
            log::warn!(
                "Division {} is not exact at {} PPQ, steps will use {} ticks",
                division,
                self.ppq,
                division.ticks_per_step(self.ppq)
            );
        }
        self.division = division;
    }

    pub fn ppq(&self) -> u32 {
        self.ppq
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn quantizer_mut(&mut self) -> &mut Quantizer {
        &mut self.quantizer
    }

    pub fn set_quantizer(&mut self, quantizer: Quantizer) {
        self.quantizer = quantizer;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Muted sequencers keep advancing and highlighting but trigger no notes
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Cursor position (the step that played last, or 0 when stopped)
    pub fn current_step(&self) -> usize {
        self.cursor.position()
    }

    /// Currently highlighted step, `None` when stopped
    pub fn highlighted_step(&self) -> Option<usize> {
        self.highlighted
    }

    /// Process one transport message
    pub fn handle_event<L: StepListener + ?Sized>(&mut self, event: TransportEvent, listener: &mut L) {
        match event {
            TransportEvent::Started => self.start(),
            TransportEvent::Stopped => self.stop(listener),
            TransportEvent::Tick(update) => self.tick(update, listener),
        }
    }

    fn start(&mut self) {
        if self.state.is_playing() {
            log::debug!("Transport already playing, start ignored");
            return;
        }
        self.state = TransportState::Playing;
        self.armed = true;
        self.last_tick = None;
    }

    fn stop<L: StepListener + ?Sized>(&mut self, listener: &mut L) {
        self.state = TransportState::Stopped;
        self.armed = false;
        self.last_tick = None;
        self.highlighted = None;
        self.cursor.reset();
        listener.on_reset();
    }

    fn tick<L: StepListener + ?Sized>(&mut self, update: TimingUpdate, listener: &mut L) {
        if !self.state.is_playing() {
            log::trace!("Tick {} ignored while stopped", update.tick);
            return;
        }

        let Some(tempo) = update.tempo() else {
            log::warn!(
                "Ignoring tick {} with invalid tempo {} (bar {}, beat {})",
                update.tick,
                update.tempo,
                update.bar,
                update.beat
            );
            return;
        };

        if let Some(last) = self.last_tick {
            if update.tick == last {
                log::debug!("Duplicate tick {} ignored", update.tick);
                return;
            }
            if update.tick < last {
                log::debug!("Clock moved back from {} to {}", last, update.tick);
            }
        }
        self.last_tick = Some(update.tick);

        let ticks_per_step = self.division.ticks_per_step(self.ppq);
        if update.tick % ticks_per_step != 0 {
            return;
        }

        let length = self.pattern.length();
        let (old, new) = if self.armed {
            self.armed = false;
            let first = self.cursor.position() % length;
            self.cursor.set_position(first);
            (None, first)
        } else {
            let old = self.highlighted;
            let new = self
                .cursor
                .advance(self.direction, length, &mut self.rng);
            (old, new)
        };

        self.highlighted = Some(new);
        listener.on_step(old, new);
        log::trace!("Tick {} -> step {}", update.tick, new);

        if self.muted {
            return;
        }

        let Some(step) = self.pattern.step(new).copied() else {
            return;
        };
        if !step.active {
            return;
        }

        let step_ms = self.division.step_duration_ms(&tempo, self.ppq);
        let note = NoteEvent::new(
            self.quantizer.process(step.note),
            step.velocity,
            NoteEvent::gate_duration_ms(step_ms, step.gate),
        );
        listener.on_note(note);
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_PPQ)
    }
}
