// Scale - Named scale masks and the note quantizer
// Snaps raw MIDI notes to the nearest in-scale pitch, then applies octave shift

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitch class names, index 0 = C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave shift range accepted by the quantizer
pub const MIN_OCTAVE_SHIFT: i8 = -4;
pub const MAX_OCTAVE_SHIFT: i8 = 4;

/// Named scale patterns
///
/// Each scale is a 12-entry mask relative to the root: `mask()[i]` is true when
/// the note `i` semitones above the root belongs to the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scale {
    #[default]
    Chromatic,
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    WholeTone,
}

impl Scale {
    pub const ALL: [Scale; 14] = [
        Scale::Chromatic,
        Scale::Major,
        Scale::NaturalMinor,
        Scale::HarmonicMinor,
        Scale::MelodicMinor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Locrian,
        Scale::MajorPentatonic,
        Scale::MinorPentatonic,
        Scale::Blues,
        Scale::WholeTone,
    ];

    /// Semitone intervals from the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::WholeTone => &[0, 2, 4, 6, 8, 10],
        }
    }

    /// In-scale semitone mask relative to the root
    pub fn mask(self) -> [bool; 12] {
        let mut mask = [false; 12];
        for &interval in self.intervals() {
            mask[interval as usize] = true;
        }
        mask
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Scale::Chromatic => "Chromatic",
            Scale::Major => "Major",
            Scale::NaturalMinor => "Natural Minor",
            Scale::HarmonicMinor => "Harmonic Minor",
            Scale::MelodicMinor => "Melodic Minor",
            Scale::Dorian => "Dorian",
            Scale::Phrygian => "Phrygian",
            Scale::Lydian => "Lydian",
            Scale::Mixolydian => "Mixolydian",
            Scale::Locrian => "Locrian",
            Scale::MajorPentatonic => "Major Pentatonic",
            Scale::MinorPentatonic => "Minor Pentatonic",
            Scale::Blues => "Blues",
            Scale::WholeTone => "Whole Tone",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = String;

    /// Case-insensitive; spaces, dashes and underscores are ignored
    /// ("natural-minor", "Natural Minor" and "naturalminor" all parse)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        let alias = match wanted.as_str() {
            "minor" => Some(Scale::NaturalMinor),
            "ionian" => Some(Scale::Major),
            "aeolian" => Some(Scale::NaturalMinor),
            _ => None,
        };
        if let Some(scale) = alias {
            return Ok(scale);
        }

        Scale::ALL
            .iter()
            .copied()
            .find(|scale| {
                let name: String = scale
                    .name()
                    .chars()
                    .filter(|c| *c != ' ')
                    .flat_map(char::to_lowercase)
                    .collect();
                name == wanted
            })
            .ok_or_else(|| format!("Unknown scale: {}", s))
    }
}

/// Get the note name (e.g., "C4", "A#5") for a MIDI note, middle C = C4
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

/// Parse a root pitch class from a name ("C", "f#", "Bb") or a number 0-11
pub fn parse_root(s: &str) -> Option<u8> {
    if let Ok(value) = s.parse::<u8>() {
        return (value < 12).then_some(value);
    }

    let upper = s.trim().to_uppercase();
    if let Some(index) = NOTE_NAMES.iter().position(|name| *name == upper) {
        return Some(index as u8);
    }

    // Flats: one semitone below the natural
    let natural = upper.strip_suffix('B')?;
    let index = NOTE_NAMES.iter().position(|name| *name == natural)?;
    Some(((index + 11) % 12) as u8)
}

/// Scale quantizer with root note and octave shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantizer {
    root: u8,
    scale: Scale,
    octave_shift: i8,
    enabled: bool,
}

impl Quantizer {
    /// Create an enabled quantizer; root is taken modulo 12
    pub fn new(root: u8, scale: Scale) -> Self {
        Self {
            root: root % 12,
            scale,
            octave_shift: 0,
            enabled: true,
        }
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn set_root(&mut self, root: u8) {
        self.root = root % 12;
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn octave_shift(&self) -> i8 {
        self.octave_shift
    }

    /// Set octave shift, clamped to -4..=4
    pub fn set_octave_shift(&mut self, shift: i8) {
        self.octave_shift = shift.clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether a note belongs to the current scale (ignores the enabled flag)
    pub fn contains(&self, note: u8) -> bool {
        let relative = (note as usize + 12 - self.root as usize) % 12;
        self.scale.mask()[relative]
    }

    /// Snap a raw MIDI note to the nearest in-scale note within 0-127
    ///
    /// Scans outward from the raw pitch; on equal distance the lower note wins.
    /// A disabled quantizer only clamps the input.
    pub fn quantize_note(&self, raw: u8) -> u8 {
        let raw = raw.min(127);
        if !self.enabled {
            return raw;
        }

        let mask = self.scale.mask();
        if !mask.iter().any(|&in_scale| in_scale) {
            return raw;
        }

        let in_scale = |note: i16| {
            let relative = (note - self.root as i16).rem_euclid(12) as usize;
            mask[relative]
        };

        let raw = raw as i16;
        for distance in 0..12i16 {
            let below = raw - distance;
            if below >= 0 && in_scale(below) {
                return below as u8;
            }
            let above = raw + distance;
            if above <= 127 && in_scale(above) {
                return above as u8;
            }
        }

        raw as u8
    }

    /// Add `octave_shift * 12` and clamp to 0-127
    pub fn apply_octave_shift(&self, note: u8) -> u8 {
        let shifted = note as i16 + self.octave_shift as i16 * 12;
        shifted.clamp(0, 127) as u8
    }

    /// Quantize then shift, the order used for playback
    pub fn process(&self, raw: u8) -> u8 {
        self.apply_octave_shift(self.quantize_note(raw))
    }

    /// Root and scale for display, e.g. "D Dorian"
    pub fn describe(&self) -> String {
        format!("{} {}", NOTE_NAMES[self.root as usize], self.scale)
    }
}

impl Default for Quantizer {
    /// C chromatic, disabled
    fn default() -> Self {
        Self {
            root: 0,
            scale: Scale::Chromatic,
            octave_shift: 0,
            enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_masks() {
        let major = Scale::Major.mask();
        assert_eq!(
            major,
            [true, false, true, false, true, true, false, true, false, true, false, true]
        );
        assert!(Scale::Chromatic.mask().iter().all(|&b| b));
        assert_eq!(Scale::WholeTone.mask().iter().filter(|&&b| b).count(), 6);
    }

    #[test]
    fn test_scale_from_str() {
        assert_eq!("major".parse::<Scale>(), Ok(Scale::Major));
        assert_eq!("Natural Minor".parse::<Scale>(), Ok(Scale::NaturalMinor));
        assert_eq!("minor-pentatonic".parse::<Scale>(), Ok(Scale::MinorPentatonic));
        assert_eq!("minor".parse::<Scale>(), Ok(Scale::NaturalMinor));
        assert!("nonsense".parse::<Scale>().is_err());
    }

    #[test]
    fn test_parse_root() {
        assert_eq!(parse_root("C"), Some(0));
        assert_eq!(parse_root("f#"), Some(6));
        assert_eq!(parse_root("Bb"), Some(10));
        assert_eq!(parse_root("Cb"), Some(11));
        assert_eq!(parse_root("7"), Some(7));
        assert_eq!(parse_root("12"), None);
        assert_eq!(parse_root("H"), None);
    }

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(73), "C#5");
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn test_quantize_c_major() {
        let q = Quantizer::new(0, Scale::Major);

        assert_eq!(q.quantize_note(60), 60); // C stays
        assert_eq!(q.quantize_note(61), 60); // C# -> C (tie, lower wins)
        assert_eq!(q.quantize_note(63), 62); // D# -> D (tie, lower wins)
        assert_eq!(q.quantize_note(66), 65); // F# -> F (tie, lower wins)
        assert_eq!(q.quantize_note(71), 71); // B stays
    }

    #[test]
    fn test_quantize_pentatonic_prefers_nearest() {
        // A minor pentatonic: A C D E G
        let q = Quantizer::new(9, Scale::MinorPentatonic);

        assert_eq!(q.quantize_note(69), 69); // A
        assert_eq!(q.quantize_note(70), 69); // A# -> A
        assert_eq!(q.quantize_note(71), 72); // B -> C (distance 1 up beats 2 down)
        assert_eq!(q.quantize_note(65), 64); // F -> E
        assert_eq!(q.quantize_note(66), 67); // F# -> G
    }

    #[test]
    fn test_quantize_stays_in_midi_range() {
        // 127 is G9; in C# major the nearest in-scale note above is out of range
        let q = Quantizer::new(1, Scale::Major);
        let top = q.quantize_note(127);
        assert!(top <= 127);
        assert!(q.contains(top));

        let bottom = q.quantize_note(0);
        assert!(q.contains(bottom));
    }

    #[test]
    fn test_quantize_idempotent_all_scales() {
        for scale in Scale::ALL {
            for root in 0..12 {
                let q = Quantizer::new(root, scale);
                for n in 0..=127u8 {
                    let once = q.quantize_note(n);
                    assert!(once <= 127);
                    assert_eq!(q.quantize_note(once), once, "{} root {} note {}", scale, root, n);
                }
            }
        }
    }

    #[test]
    fn test_disabled_quantizer_passes_through() {
        let mut q = Quantizer::new(0, Scale::Major);
        q.set_enabled(false);
        assert_eq!(q.quantize_note(61), 61);
        assert_eq!(q.quantize_note(200), 127);
    }

    #[test]
    fn test_octave_shift_clamps() {
        let mut q = Quantizer::new(0, Scale::Chromatic);

        q.set_octave_shift(2);
        assert_eq!(q.apply_octave_shift(60), 84);
        assert_eq!(q.apply_octave_shift(120), 127);

        q.set_octave_shift(-3);
        assert_eq!(q.apply_octave_shift(60), 24);
        assert_eq!(q.apply_octave_shift(10), 0);

        q.set_octave_shift(9);
        assert_eq!(q.octave_shift(), MAX_OCTAVE_SHIFT);
    }

    #[test]
    fn test_octave_shift_always_in_range() {
        for shift in MIN_OCTAVE_SHIFT..=MAX_OCTAVE_SHIFT {
            let mut q = Quantizer::new(0, Scale::Major);
            q.set_octave_shift(shift);
            for n in 0..=127u8 {
                assert!(q.apply_octave_shift(n) <= 127);
            }
        }
    }

    #[test]
    fn test_process_idempotent_without_shift() {
        let q = Quantizer::new(2, Scale::Dorian);
        for n in 0..=127u8 {
            let once = q.process(n);
            assert_eq!(q.process(once), once);
        }
    }

    #[test]
    fn test_describe() {
        let q = Quantizer::new(2, Scale::Dorian);
        assert_eq!(q.describe(), "D Dorian");
    }
}
