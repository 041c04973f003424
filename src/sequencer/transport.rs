// Transport - Messages carried by the timing bus and the resulting play state

use super::timing::TimingUpdate;

/// Transport state seen by a sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl TransportState {
    /// Check if transport is playing
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    /// Check if transport is stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, TransportState::Stopped)
    }
}

/// Message published on the timing bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Transport started; the next qualifying tick plays the current step
    Started,
    /// Transport stopped; sequencers return to step 0
    Stopped,
    /// Clock pulse
    Tick(TimingUpdate),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state() {
        let state = TransportState::Playing;
        assert!(state.is_playing());
        assert!(!state.is_stopped());

        let state = TransportState::default();
        assert!(state.is_stopped());
    }
}
