// MyMusic StepSeq - Library exports for the binary, tests and benchmarks

pub mod command;
pub mod config;
pub mod engine;
pub mod messaging;
pub mod midi;
pub mod preset;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use command::{CommandHistory, UndoableCommand};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineHandle, SequencerEngine};
pub use messaging::{
    SequencerCommand, TimingBus, create_command_channel, create_event_channel,
};
pub use midi::event::MidiEvent;
pub use preset::{FilePresetStore, MemoryPresetStore, PresetError, PresetStore, SequencerPreset};
pub use sequencer::{
    Direction, Instrument, NoteEvent, NotePlayer, Pattern, Quantizer, Scale, SequencerEvent,
    Step, StepListener, StepSequencer, TimingDivision, TimingUpdate, TransportEvent,
};
