// Pattern - Fixed-size step store with a variable playable length
// A pattern is owned by exactly one StepSequencer and edited in place

use crate::sequencer::error::SequencerError;
use crate::sequencer::scale::Quantizer;
use crate::sequencer::step::{DEFAULT_NOTE, MAX_GATE, Step};
use rand::Rng;

/// Number of steps a pattern stores
pub const MAX_STEPS: usize = 16;

/// Octave range accepted by pattern generation
pub const MAX_GENERATE_OCTAVES: u8 = 4;

/// A step pattern
///
/// Storage is always `MAX_STEPS` long; `length` ("last step") selects how many
/// of them are played. Steps past `length` keep their data so shrinking and
/// growing the pattern is lossless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    steps: [Step; MAX_STEPS],
    length: usize,
}

impl Pattern {
    /// Create a pattern of default steps, playing all 16
    pub fn new() -> Self {
        Self {
            steps: [Step::default(); MAX_STEPS],
            length: MAX_STEPS,
        }
    }

    /// Create a pattern from explicit steps; missing steps are defaults
    pub fn from_steps(steps: &[Step], length: usize) -> Self {
        let mut pattern = Self::new();
        for (slot, step) in pattern.steps.iter_mut().zip(steps) {
            *slot = Step::new(step.active, step.note, step.velocity, step.gate);
        }
        pattern.set_length(length);
        pattern
    }

    /// Number of steps played (1-16)
    pub fn length(&self) -> usize {
        self.length
    }

    /// Set the playable length, clamped to 1..=16
    pub fn set_length(&mut self, length: usize) {
        self.length = length.clamp(1, MAX_STEPS);
    }

    /// Get a step by index (any stored index, not only the playable range)
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Step data as a copy, `None` when out of range
    pub fn get_step_data(&self, index: usize) -> Option<Step> {
        self.steps.get(index).copied()
    }

    /// All stored steps
    pub fn all_steps(&self) -> &[Step; MAX_STEPS] {
        &self.steps
    }

    /// Steps inside the playable range
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps[..self.length].iter()
    }

    /// Replace a step, reporting out-of-range indices and values
    pub fn try_set_step(&mut self, index: usize, step: Step) -> Result<(), SequencerError> {
        let slot = self
            .steps
            .get_mut(index)
            .ok_or(SequencerError::StepOutOfRange {
                index,
                max: MAX_STEPS,
            })?;

        let invalid = |field, value: u8| SequencerError::InvalidValue {
            field,
            value: value as i64,
        };
        if step.note > 127 {
            return Err(invalid("note", step.note));
        }
        if step.velocity > 127 {
            return Err(invalid("velocity", step.velocity));
        }
        if step.gate > MAX_GATE {
            return Err(invalid("gate", step.gate));
        }

        *slot = step;
        Ok(())
    }

    /// Set all fields of a step
    ///
    /// Out-of-range indices are ignored: the edit comes from UI controls that
    /// may outlive a pattern resize, so it is not treated as an error.
    pub fn set_step_data(&mut self, index: usize, active: bool, note: u8, velocity: u8, gate: u8) {
        if let Err(e) = self.try_set_step(index, Step::new(active, note, velocity, gate)) {
            log::debug!("Ignoring step edit: {}", e);
        }
    }

    /// Toggle a step on/off, returns the new state
    pub fn toggle_step(&mut self, index: usize) -> Option<bool> {
        let step = self.steps.get_mut(index)?;
        step.active = !step.active;
        Some(step.active)
    }

    /// Reset every step to its defaults (inactive, velocity ≈70%, gate 50%)
    pub fn clear(&mut self) {
        self.steps = [Step::default(); MAX_STEPS];
    }

    /// Number of active steps in the playable range
    pub fn active_count(&self) -> usize {
        self.steps().filter(|s| s.active).count()
    }

    /// Rotate the playable steps; positive offsets move steps later
    pub fn rotate(&mut self, offset: i32) {
        let len = self.length;
        let shift = offset.rem_euclid(len as i32) as usize;
        self.steps[..len].rotate_right(shift);
    }

    /// Fill the playable range with random steps
    ///
    /// Each step is activated with probability `density`. Active steps get a
    /// note within `octave_range` octaves centred on middle C (half the span
    /// below, half above), passed through the quantizer when it is enabled.
    /// Inactive steps are reset to defaults.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        octave_range: u8,
        density: f64,
        quantizer: &Quantizer,
        rng: &mut R,
    ) {
        let density = if density.is_finite() {
            density.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let octaves = octave_range.clamp(1, MAX_GENERATE_OCTAVES) as i16;
        let half_span = octaves * 6;
        let low = (DEFAULT_NOTE as i16 - half_span).max(0) as u8;
        let high = (DEFAULT_NOTE as i16 + half_span).min(127) as u8;

        for step in self.steps[..self.length].iter_mut() {
            if rng.gen_bool(density) {
                let raw = rng.gen_range(low..=high);
                let note = if quantizer.is_enabled() {
                    quantizer.quantize_note(raw)
                } else {
                    raw
                };
                *step = Step::new(
                    true,
                    note,
                    rng.gen_range(64..=127),
                    rng.gen_range(25..=MAX_GATE),
                );
            } else {
                *step = Step::default();
            }
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}
