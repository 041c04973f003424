// MIDI - Message encoding and the midir output instrument

pub mod event;
pub mod output;

pub use event::MidiEvent;
pub use output::{MidiOutput, MidiOutputError, list_output_ports};
