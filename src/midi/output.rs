// MIDI output - Instrument backed by a midir output port

use crate::midi::event::MidiEvent;
use crate::sequencer::player::Instrument;
use midir::{MidiOutput as MidirOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "MyMusic StepSeq MIDI Output";

/// MIDI output errors
#[derive(Debug, thiserror::Error)]
pub enum MidiOutputError {
    #[error("Failed to initialize MIDI: {0}")]
    Init(#[from] midir::InitError),

    #[error("MIDI device '{0}' not found")]
    PortNotFound(String),

    #[error("No MIDI output devices found")]
    NoPorts,

    #[error("Failed to connect to MIDI device: {0}")]
    Connect(String),
}

/// Names of the available output ports
pub fn list_output_ports() -> Vec<String> {
    let Ok(midi_out) = MidirOutput::new(CLIENT_NAME) else {
        return Vec::new();
    };
    midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect()
}

/// Connected MIDI output sending on one channel
pub struct MidiOutput {
    connection: MidiOutputConnection,
    port_name: String,
    channel: u8,
    send_errors: u64,
}

impl MidiOutput {
    /// Connect to the port whose name contains `device_name`, or the first port
    pub fn connect(device_name: Option<&str>, channel: u8) -> Result<Self, MidiOutputError> {
        let midi_out = MidirOutput::new(CLIENT_NAME)?;
        let ports = midi_out.ports();

        let found = ports.iter().find_map(|port| {
            let name = midi_out.port_name(port).ok()?;
            match device_name {
                Some(wanted) if !name.contains(wanted) => None,
                _ => Some((port.clone(), name)),
            }
        });

        let (port, port_name) = match (found, device_name) {
            (Some(found), _) => found,
            (None, Some(wanted)) => return Err(MidiOutputError::PortNotFound(wanted.to_string())),
            (None, None) => return Err(MidiOutputError::NoPorts),
        };

        let connection = midi_out
            .connect(&port, "mymusic-stepseq-output")
            .map_err(|e| MidiOutputError::Connect(e.to_string()))?;

        log::info!("MIDI output connected: {}", port_name);
        Ok(Self {
            connection,
            port_name,
            channel: channel & 0x0F,
            send_errors: 0,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Messages the device refused
    pub fn send_errors(&self) -> u64 {
        self.send_errors
    }

    /// Send one event; failures are logged and counted, never propagated
    pub fn send(&mut self, event: MidiEvent) {
        if let Err(e) = self.connection.send(&event.to_bytes()) {
            self.send_errors += 1;
            if self.send_errors == 1 || self.send_errors % 100 == 0 {
                log::error!(
                    "MIDI send to '{}' failed ({} errors): {}",
                    self.port_name,
                    self.send_errors,
                    e
                );
            }
        }
    }

    /// Close the connection
    pub fn close(self) {
        self.connection.close();
        log::info!("MIDI output closed: {}", self.port_name);
    }
}

impl Instrument for MidiOutput {
    fn note_on(&mut self, note: u8, velocity: u8) {
        self.send(MidiEvent::note_on(self.channel, note, velocity));
    }

    fn note_off(&mut self, note: u8) {
        self.send(MidiEvent::note_off(self.channel, note));
    }

    fn all_notes_off(&mut self) {
        self.send(MidiEvent::all_notes_off(self.channel));
    }
}
