// Messaging - Timing bus, command and event channels

pub mod bus;
pub mod channels;
pub mod command;

pub use bus::{TimingBus, TransportConsumer};
pub use channels::{
    CommandConsumer, CommandProducer, EventChannelListener, EventConsumer, EventProducer,
    create_command_channel, create_event_channel,
};
pub use command::SequencerCommand;
