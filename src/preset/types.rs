// Preset types - Serializable snapshot of a StepSequencer's settings

use crate::preset::PresetError;
use crate::sequencer::adapter::StepSequencer;
use crate::sequencer::direction::Direction;
use crate::sequencer::pattern::{MAX_STEPS, Pattern};
use crate::sequencer::scale::{MAX_OCTAVE_SHIFT, MIN_OCTAVE_SHIFT, Quantizer};
use crate::sequencer::step::{MAX_GATE, Step};
use crate::sequencer::timing::TimingDivision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum preset name length
pub const MAX_NAME_LEN: usize = 255;

/// Everything needed to restore a sequencer's pattern and playback settings
///
/// Transport state and cursor position are not part of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerPreset {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub steps: Vec<Step>,
    pub length: usize,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub division: TimingDivision,
    #[serde(default)]
    pub quantizer: Quantizer,
}

impl SequencerPreset {
    /// Snapshot a sequencer
    pub fn from_sequencer(name: impl Into<String>, sequencer: &StepSequencer) -> Self {
        let pattern = sequencer.pattern();
        Self {
            name: name.into(),
            saved_at: Utc::now(),
            steps: pattern.all_steps().to_vec(),
            length: pattern.length(),
            direction: sequencer.direction(),
            division: sequencer.division(),
            quantizer: *sequencer.quantizer(),
        }
    }

    /// Check the preset before it is applied
    pub fn validate(&self) -> Result<(), PresetError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PresetError::Invalid("Preset name cannot be empty".to_string()));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(PresetError::Invalid(format!(
                "Preset name cannot exceed {} characters",
                MAX_NAME_LEN
            )));
        }

        if self.steps.len() > MAX_STEPS {
            return Err(PresetError::Invalid(format!(
                "Preset has {} steps, at most {} are supported",
                self.steps.len(),
                MAX_STEPS
            )));
        }
        if !(1..=MAX_STEPS).contains(&self.length) {
            return Err(PresetError::Invalid(format!(
                "Pattern length must be between 1 and {}, got {}",
                MAX_STEPS, self.length
            )));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.note > 127 || step.velocity > 127 || step.gate > MAX_GATE {
                return Err(PresetError::Invalid(format!(
                    "Step {} out of range (note {}, velocity {}, gate {})",
                    index, step.note, step.velocity, step.gate
                )));
            }
        }

        let shift = self.quantizer.octave_shift();
        if self.quantizer.root() > 11 || !(MIN_OCTAVE_SHIFT..=MAX_OCTAVE_SHIFT).contains(&shift) {
            return Err(PresetError::Invalid(format!(
                "Quantizer out of range (root {}, octave shift {})",
                self.quantizer.root(),
                shift
            )));
        }

        Ok(())
    }

    /// Pattern described by this preset
    pub fn to_pattern(&self) -> Pattern {
        Pattern::from_steps(&self.steps, self.length)
    }

    /// Validate and apply to a sequencer
    ///
    /// The pattern, direction, division and quantizer are replaced; transport
    /// state is left alone so a preset can be loaded while playing.
    pub fn apply_to(&self, sequencer: &mut StepSequencer) -> Result<(), PresetError> {
        self.validate()?;
        sequencer.replace_pattern(self.to_pattern());
        sequencer.set_direction(self.direction);
        sequencer.set_division(self.division);
        sequencer.set_quantizer(self.quantizer);
        Ok(())
    }
}
