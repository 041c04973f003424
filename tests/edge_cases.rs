//! Edge case tests and robustness validation
//!
//! Malformed clock data, random inputs and extreme settings must never panic
//! or push the sequencer out of its invariants.

use mymusic_stepseq::midi::event::MidiEvent;
use mymusic_stepseq::sequencer::direction::Cursor;
use mymusic_stepseq::sequencer::transport::TransportEvent;
use mymusic_stepseq::{
    Direction, Pattern, Quantizer, Scale, SequencerEvent, StepSequencer, TimingDivision,
    TimingUpdate,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Cursor stays inside the pattern for every length and direction
#[test]
fn test_cursor_bounds_all_lengths() {
    let mut rng = StdRng::seed_from_u64(7);

    for length in 1..=16 {
        for direction in Direction::ALL {
            let mut cursor = Cursor::new();
            for _ in 0..200 {
                let position = cursor.advance(direction, length, &mut rng);
                assert!(position < length, "{:?} length {}", direction, length);
            }
        }
    }
}

/// Shrinking the pattern under the cursor at random never escapes the range
#[test]
fn test_cursor_with_random_length_changes() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut cursor = Cursor::new();

    for _ in 0..5000 {
        let length = rng.gen_range(1..=16);
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let position = cursor.advance(direction, length, &mut rng);
        assert!(position < length);
    }
}

/// Quantizing is idempotent and in range for random quantizers
#[test]
fn test_quantizer_random_settings() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..500 {
        let mut quantizer = Quantizer::new(
            rng.gen_range(0..12),
            Scale::ALL[rng.gen_range(0..Scale::ALL.len())],
        );
        quantizer.set_octave_shift(rng.gen_range(-10..=10));
        let raw: u8 = rng.gen_range(0..=127);

        let quantized = quantizer.quantize_note(raw);
        assert!(quantized <= 127);
        assert_eq!(quantizer.quantize_note(quantized), quantized);
        assert!(quantizer.process(raw) <= 127);
        assert!((-4..=4).contains(&quantizer.octave_shift()));
    }
}

/// Octave shift at the extremes of the MIDI range
#[test]
fn test_octave_shift_extremes() {
    let mut quantizer = Quantizer::default();
    quantizer.set_octave_shift(4);
    assert_eq!(quantizer.apply_octave_shift(127), 127);
    assert_eq!(quantizer.apply_octave_shift(100), 127);

    quantizer.set_octave_shift(-4);
    assert_eq!(quantizer.apply_octave_shift(0), 0);
    assert_eq!(quantizer.apply_octave_shift(40), 0);
}

/// Out-of-range step edits are ignored, not errors
#[test]
fn test_step_edits_out_of_range() {
    let mut pattern = Pattern::new();
    pattern.set_step_data(16, true, 60, 100, 50);
    pattern.set_step_data(usize::MAX, true, 60, 100, 50);
    assert_eq!(pattern, Pattern::new());
    assert_eq!(pattern.get_step_data(16), None);

    pattern.set_length(0);
    assert_eq!(pattern.length(), 1);
    pattern.set_length(1000);
    assert_eq!(pattern.length(), 16);
}

/// Random garbage on the clock never panics or produces out-of-range steps
#[test]
fn test_fuzz_transport_events() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut seq = StepSequencer::with_seed(24, 1234);
    seq.generate_pattern(4, 0.5);
    let mut events = Vec::new();

    for _ in 0..20_000 {
        let event = match rng.gen_range(0..20) {
            0 => TransportEvent::Started,
            1 => TransportEvent::Stopped,
            _ => {
                let tempo = match rng.gen_range(0..10) {
                    0 => f64::NAN,
                    1 => f64::INFINITY,
                    2 => -rng.gen_range(0.0..500.0),
                    3 => rng.gen_range(1000.0..1e9),
                    _ => rng.gen_range(20.0..=999.0),
                };
                TransportEvent::Tick(TimingUpdate::new(
                    rng.gen_range(0..200),
                    rng.gen_range(0..100),
                    rng.gen_range(0..8),
                    tempo,
                ))
            }
        };

        if rng.gen_bool(0.01) {
            seq.pattern_mut().set_length(rng.gen_range(1..=16));
        }
        if rng.gen_bool(0.01) {
            seq.set_direction(Direction::ALL[rng.gen_range(0..4)]);
        }
        if rng.gen_bool(0.01) {
            seq.set_division(TimingDivision::ALL[rng.gen_range(0..TimingDivision::ALL.len())]);
        }

        let length = seq.pattern().length();
        events.clear();
        seq.handle_event(event, &mut events);

        for event in &events {
            match event {
                SequencerEvent::StepChanged { new, .. } => assert!(*new < length),
                SequencerEvent::NoteTriggered(note) => {
                    assert!(note.note <= 127);
                    assert!(note.velocity <= 127);
                    assert!(note.duration_ms >= 1);
                }
                SequencerEvent::Reset => {}
            }
        }
    }
}

/// Notes for a tempo at the bounds keep sane durations
#[test]
fn test_extreme_tempo_durations() {
    for (bpm, expected) in [(20.0, 375), (999.0, 8)] {
        let mut seq = StepSequencer::with_seed(24, 1);
        seq.set_step_data(0, true, 60, 100, 50);
        let mut events = Vec::new();
        seq.handle_event(TransportEvent::Started, &mut events);
        seq.handle_event(
            TransportEvent::Tick(TimingUpdate::at_tick(0, 24, bpm)),
            &mut events,
        );

        let duration = events.iter().find_map(|e| match e {
            SequencerEvent::NoteTriggered(n) => Some(n.duration_ms),
            _ => None,
        });
        assert_eq!(duration, Some(expected), "at {} BPM", bpm);
    }
}

/// Fuzz the MIDI parser with random byte sequences
#[test]
fn fuzz_midi_parser_random_bytes() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    for _ in 0..1000 {
        let length = rng.gen_range(0..=8);
        let bytes: Vec<u8> = (0..length).map(|_| rng.gen_range(0..=255)).collect();

        if let Some(event) = MidiEvent::from_bytes(&bytes) {
            let encoded = event.to_bytes();
            assert!(encoded[1] <= 127 && encoded[2] <= 127);
        }
    }
}
