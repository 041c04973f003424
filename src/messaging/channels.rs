// Communication channels lock-free
// Commands flow UI → engine, sequencer events flow engine → UI

use crate::messaging::command::SequencerCommand;
use crate::sequencer::adapter::{SequencerEvent, StepListener};
use crate::sequencer::note::NoteEvent;
use ringbuf::traits::{Producer, Split};
use ringbuf::HeapRb;

pub type CommandProducer = ringbuf::HeapProd<SequencerCommand>;
pub type CommandConsumer = ringbuf::HeapCons<SequencerCommand>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<SequencerCommand>::new(capacity.max(1));
    rb.split()
}

pub type EventProducer = ringbuf::HeapProd<SequencerEvent>;
pub type EventConsumer = ringbuf::HeapCons<SequencerEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<SequencerEvent>::new(capacity.max(1));
    rb.split()
}

/// StepListener that forwards everything to the UI event channel
///
/// When the UI falls behind, events are dropped and counted rather than
/// stalling the clock path.
pub struct EventChannelListener {
    producer: EventProducer,
    dropped: u64,
}

impl EventChannelListener {
    pub fn new(producer: EventProducer) -> Self {
        Self {
            producer,
            dropped: 0,
        }
    }

    /// Events lost because the channel was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send(&mut self, event: SequencerEvent) {
        if self.producer.try_push(event).is_err() {
            self.dropped += 1;
            if self.dropped == 1 || self.dropped % 1000 == 0 {
                log::warn!("Event channel full, {} events dropped so far", self.dropped);
            }
        }
    }
}

impl StepListener for EventChannelListener {
    fn on_step(&mut self, old: Option<usize>, new: usize) {
        self.send(SequencerEvent::StepChanged { old, new });
    }

    fn on_note(&mut self, note: NoteEvent) {
        self.send(SequencerEvent::NoteTriggered(note));
    }

    fn on_reset(&mut self) {
        self.send(SequencerEvent::Reset);
    }
}
