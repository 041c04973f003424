// Sequencer module
// Step pattern store, direction policy, scale quantizer and the timing adapter

pub mod adapter;
pub mod direction;
pub mod error;
pub mod note;
pub mod pattern;
pub mod player;
pub mod scale;
pub mod step;
pub mod timing;
pub mod transport;

pub use adapter::{SequencerEvent, StepListener, StepSequencer};
pub use direction::{Cursor, Direction};
pub use error::SequencerError;
pub use note::NoteEvent;
pub use pattern::{MAX_STEPS, Pattern};
pub use player::{Instrument, NotePlayer};
pub use scale::{Quantizer, Scale};
pub use step::Step;
pub use timing::{Tempo, TimingDivision, TimingUpdate};
pub use transport::{TransportEvent, TransportState};
