// Timing - Clock data consumed by the sequencer
// Tempo bounds, step divisions and the tick message published on the timing bus

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default pulses per quarter note on the timing bus (MIDI clock resolution)
pub const DEFAULT_PPQ: u32 = 24;

/// Accepted tempo range in BPM
pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 999.0;

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Create a tempo, `None` when outside 20-999 BPM or not finite
    pub fn new(bpm: f64) -> Option<Self> {
        Self::is_valid_bpm(bpm).then_some(Self { bpm })
    }

    /// Check a raw BPM value against the accepted range
    pub fn is_valid_bpm(bpm: f64) -> bool {
        bpm.is_finite() && (MIN_BPM..=MAX_BPM).contains(&bpm)
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one quarter note in milliseconds
    pub fn beat_duration_ms(&self) -> f64 {
        60_000.0 / self.bpm
    }

    /// Duration of one clock tick in milliseconds at the given PPQ
    pub fn tick_duration_ms(&self, ppq: u32) -> f64 {
        self.beat_duration_ms() / ppq.max(1) as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 120.0 }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Note length of one sequencer step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingDivision {
    Whole,
    Half,
    Quarter,
    QuarterTriplet,
    Eighth,
    EighthTriplet,
    #[default]
    Sixteenth,
    SixteenthTriplet,
    ThirtySecond,
}

impl TimingDivision {
    pub const ALL: [TimingDivision; 9] = [
        TimingDivision::Whole,
        TimingDivision::Half,
        TimingDivision::Quarter,
        TimingDivision::QuarterTriplet,
        TimingDivision::Eighth,
        TimingDivision::EighthTriplet,
        TimingDivision::Sixteenth,
        TimingDivision::SixteenthTriplet,
        TimingDivision::ThirtySecond,
    ];

    /// Step length as a fraction of a quarter note (numerator, denominator)
    fn quarter_ratio(self) -> (u32, u32) {
        match self {
            TimingDivision::Whole => (4, 1),
            TimingDivision::Half => (2, 1),
            TimingDivision::Quarter => (1, 1),
            TimingDivision::QuarterTriplet => (2, 3),
            TimingDivision::Eighth => (1, 2),
            TimingDivision::EighthTriplet => (1, 3),
            TimingDivision::Sixteenth => (1, 4),
            TimingDivision::SixteenthTriplet => (1, 6),
            TimingDivision::ThirtySecond => (1, 8),
        }
    }

    /// Number of clock ticks per step at the given PPQ
    ///
    /// Never returns 0: divisions finer than the clock play on every tick.
    pub fn ticks_per_step(self, ppq: u32) -> u64 {
        let (num, den) = self.quarter_ratio();
        ((ppq as u64 * num as u64) / den as u64).max(1)
    }

    /// Whether the clock resolution represents this division exactly
    pub fn is_exact_at(self, ppq: u32) -> bool {
        let (num, den) = self.quarter_ratio();
        (ppq as u64 * num as u64) % den as u64 == 0 && ppq as u64 * num as u64 >= den as u64
    }

    /// Duration of one step in milliseconds
    pub fn step_duration_ms(self, tempo: &Tempo, ppq: u32) -> f64 {
        tempo.beat_duration_ms() * self.ticks_per_step(ppq) as f64 / ppq.max(1) as f64
    }

    pub fn name(self) -> &'static str {
        match self {
            TimingDivision::Whole => "1/1",
            TimingDivision::Half => "1/2",
            TimingDivision::Quarter => "1/4",
            TimingDivision::QuarterTriplet => "1/4T",
            TimingDivision::Eighth => "1/8",
            TimingDivision::EighthTriplet => "1/8T",
            TimingDivision::Sixteenth => "1/16",
            TimingDivision::SixteenthTriplet => "1/16T",
            TimingDivision::ThirtySecond => "1/32",
        }
    }
}

impl fmt::Display for TimingDivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimingDivision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        TimingDivision::ALL
            .iter()
            .copied()
            .find(|d| d.name().to_uppercase() == wanted)
            .ok_or_else(|| format!("Unknown division: {}", s))
    }
}

/// One clock pulse from the timing bus
///
/// `tick` counts from transport start; `bar` and `beat` are informational.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingUpdate {
    pub tick: u64,
    pub bar: u32,
    pub beat: u32,
    pub tempo: f64,
}

impl TimingUpdate {
    pub fn new(tick: u64, bar: u32, beat: u32, tempo: f64) -> Self {
        Self {
            tick,
            bar,
            beat,
            tempo,
        }
    }

    /// Build the update for an absolute tick, deriving bar and beat (1-based, 4/4)
    pub fn at_tick(tick: u64, ppq: u32, tempo: f64) -> Self {
        let ppq = ppq.max(1) as u64;
        let beat_index = tick / ppq;
        Self {
            tick,
            bar: (beat_index / 4) as u32 + 1,
            beat: (beat_index % 4) as u32 + 1,
            tempo,
        }
    }

    /// Tempo if the update carries a usable one
    pub fn tempo(&self) -> Option<Tempo> {
        Tempo::new(self.tempo)
    }
}
