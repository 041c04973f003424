// Sequencer engine - Single-consumer loop serializing edits and clock messages
//
// The engine is the only owner of its StepSequencer. UI edits arrive on the
// command channel and clock messages on a timing bus subscription; both are
// applied in one thread, so sequencer state needs no locks.

use crate::config::EngineConfig;
use crate::messaging::bus::{TimingBus, TransportConsumer};
use crate::messaging::channels::{CommandConsumer, EventChannelListener, EventProducer};
use crate::messaging::command::SequencerCommand;
use crate::sequencer::adapter::StepSequencer;
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Event loop around one StepSequencer
pub struct SequencerEngine {
    sequencer: StepSequencer,
    transport_rx: TransportConsumer,
    command_rx: CommandConsumer,
    listener: EventChannelListener,
}

impl SequencerEngine {
    /// Create an engine subscribed to `bus`
    pub fn new(
        sequencer: StepSequencer,
        bus: &TimingBus,
        command_rx: CommandConsumer,
        event_tx: EventProducer,
    ) -> Self {
        Self {
            sequencer,
            transport_rx: bus.subscribe(),
            command_rx,
            listener: EventChannelListener::new(event_tx),
        }
    }

    /// Create an engine with a sequencer built from configuration
    pub fn from_config(
        config: &EngineConfig,
        bus: &TimingBus,
        command_rx: CommandConsumer,
        event_tx: EventProducer,
    ) -> Self {
        let mut sequencer = match config.random_seed {
            Some(seed) => StepSequencer::with_seed(config.ppq, seed),
            None => StepSequencer::new(config.ppq),
        };
        sequencer.set_division(config.division);
        Self::new(sequencer, bus, command_rx, event_tx)
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut StepSequencer {
        &mut self.sequencer
    }

    /// Events lost because the UI channel was full
    pub fn dropped_events(&self) -> u64 {
        self.listener.dropped()
    }

    /// Apply every queued command, then every queued clock message
    ///
    /// Returns the number of messages handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;

        while let Some(command) = self.command_rx.try_pop() {
            self.apply_command(command);
            handled += 1;
        }

        while let Some(event) = self.transport_rx.try_pop() {
            self.sequencer.handle_event(event, &mut self.listener);
            handled += 1;
        }

        handled
    }

    /// Apply one edit to the sequencer
    pub fn apply_command(&mut self, command: SequencerCommand) {
        let seq = &mut self.sequencer;
        match command {
            SequencerCommand::SetStep { index, step } => {
                seq.set_step_data(index, step.active, step.note, step.velocity, step.gate);
            }
            SequencerCommand::ToggleStep(index) => {
                if seq.pattern_mut().toggle_step(index).is_none() {
                    log::debug!("Ignoring toggle of step {}", index);
                }
            }
            SequencerCommand::ClearPattern => seq.clear_pattern(),
            SequencerCommand::GeneratePattern {
                octave_range,
                density,
            } => seq.generate_pattern(octave_range, density),
            SequencerCommand::RotatePattern(offset) => seq.pattern_mut().rotate(offset),
            SequencerCommand::SetLength(length) => seq.pattern_mut().set_length(length),
            SequencerCommand::SetDirection(direction) => seq.set_direction(direction),
            SequencerCommand::SetDivision(division) => seq.set_division(division),
            SequencerCommand::SetRoot(root) => seq.quantizer_mut().set_root(root),
            SequencerCommand::SetScale(scale) => seq.quantizer_mut().set_scale(scale),
            SequencerCommand::SetOctaveShift(shift) => seq.quantizer_mut().set_octave_shift(shift),
            SequencerCommand::SetQuantize(enabled) => seq.quantizer_mut().set_enabled(enabled),
            SequencerCommand::SetMuted(muted) => seq.set_muted(muted),
            SequencerCommand::LoadPreset(preset) => match preset.apply_to(seq) {
                Ok(()) => log::info!("Preset '{}' loaded", preset.name),
                Err(e) => log::error!("Preset '{}' rejected: {}", preset.name, e),
            },
        }
    }

    /// Run the loop on its own thread until the handle is shut down
    ///
    /// The thread sleeps `poll_interval` whenever both queues are empty.
    pub fn spawn(self, poll_interval: Duration) -> std::io::Result<EngineHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let thread = thread::Builder::new()
            .name("stepseq-engine".to_string())
            .spawn(move || {
                let mut engine = self;
                log::info!("Sequencer engine started");
                while thread_running.load(Ordering::Acquire) {
                    if engine.process_pending() == 0 {
                        thread::sleep(poll_interval);
                    }
                }
                // Drain what was queued before shutdown
                engine.process_pending();
                log::info!("Sequencer engine stopped");
                engine
            })?;

        Ok(EngineHandle {
            running,
            thread: Some(thread),
        })
    }
}

/// Handle to a spawned engine thread
pub struct EngineHandle {
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<SequencerEngine>>,
}

impl EngineHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the loop and get the engine back
    pub fn shutdown(mut self) -> Option<SequencerEngine> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Option<SequencerEngine> {
        self.running.store(false, Ordering::Release);
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                log::error!("Sequencer engine thread panicked");
                None
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::{create_command_channel, create_event_channel};
    use crate::sequencer::adapter::SequencerEvent;
    use crate::preset::SequencerPreset;
    use crate::sequencer::direction::Direction;
    use crate::sequencer::scale::{Quantizer, Scale};
    use crate::sequencer::step::Step;
    use crate::sequencer::timing::TimingUpdate;
    use crate::sequencer::transport::TransportEvent;
    use ringbuf::traits::Producer;

    fn setup() -> (
        TimingBus,
        crate::messaging::CommandProducer,
        crate::messaging::EventConsumer,
        SequencerEngine,
    ) {
        let bus = TimingBus::new(64);
        let (command_tx, command_rx) = create_command_channel(16);
        let (event_tx, event_rx) = create_event_channel(64);
        let engine = SequencerEngine::new(StepSequencer::with_seed(24, 1), &bus, command_rx, event_tx);
        (bus, command_tx, event_rx, engine)
    }

    #[test]
    fn test_commands_apply_before_ticks() {
        let (bus, mut command_tx, mut event_rx, mut engine) = setup();

        bus.publish(TransportEvent::Started);
        bus.publish(TransportEvent::Tick(TimingUpdate::at_tick(0, 24, 120.0)));
        command_tx
            .try_push(SequencerCommand::SetStep {
                index: 0,
                step: Step::on(62),
            })
            .unwrap();

        assert_eq!(engine.process_pending(), 3);

        let events: Vec<SequencerEvent> = event_rx.pop_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            SequencerEvent::NoteTriggered(note) if note.note == 62
        ));
    }

    #[test]
    fn test_apply_command_variants() {
        let (_bus, _tx, _rx, mut engine) = setup();

        engine.apply_command(SequencerCommand::SetLength(5));
        engine.apply_command(SequencerCommand::SetDirection(Direction::Backward));
        engine.apply_command(SequencerCommand::ToggleStep(2));
        engine.apply_command(SequencerCommand::ToggleStep(40));
        engine.apply_command(SequencerCommand::SetOctaveShift(2));
        engine.apply_command(SequencerCommand::SetMuted(true));

        let seq = engine.sequencer();
        assert_eq!(seq.pattern().length(), 5);
        assert_eq!(seq.direction(), Direction::Backward);
        assert!(seq.pattern().step(2).unwrap().active);
        assert_eq!(seq.quantizer().octave_shift(), 2);
        assert!(seq.is_muted());

        engine.apply_command(SequencerCommand::ClearPattern);
        assert_eq!(engine.sequencer().pattern().active_count(), 0);
    }

    #[test]
    fn test_settings_queued_after_preset_override_it() {
        let (_bus, mut command_tx, _rx, mut engine) = setup();

        let mut source = StepSequencer::with_seed(24, 2);
        source.set_direction(Direction::Bounce);
        source.set_quantizer(Quantizer::new(2, Scale::Dorian));
        source.set_step_data(0, true, 64, 100, 50);
        let preset = SequencerPreset::from_sequencer("saved", &source);

        for command in [
            SequencerCommand::LoadPreset(Box::new(preset)),
            SequencerCommand::SetScale(Scale::NaturalMinor),
            SequencerCommand::SetRoot(9),
        ] {
            command_tx.try_push(command).unwrap();
        }
        engine.process_pending();

        let seq = engine.sequencer();
        assert!(seq.pattern().step(0).unwrap().active);
        assert_eq!(seq.direction(), Direction::Bounce);
        assert_eq!(seq.quantizer().scale(), Scale::NaturalMinor);
        assert_eq!(seq.quantizer().root(), 9);
        assert_eq!(seq.quantizer().describe(), "A Natural Minor");
    }

    #[test]
    fn test_spawned_engine_processes_and_shuts_down() {
        let (bus, mut command_tx, mut event_rx, engine) = setup();
        let handle = engine.spawn(Duration::from_millis(1)).unwrap();
        assert!(handle.is_running());

        command_tx
            .try_push(SequencerCommand::SetStep {
                index: 0,
                step: Step::on(60),
            })
            .unwrap();
        // Let the command land before the clock starts
        thread::sleep(Duration::from_millis(20));
        bus.publish(TransportEvent::Started);
        bus.publish(TransportEvent::Tick(TimingUpdate::at_tick(0, 24, 120.0)));

        let engine = handle.shutdown().unwrap();
        assert_eq!(engine.sequencer().highlighted_step(), Some(0));

        let events: Vec<SequencerEvent> = event_rx.pop_iter().collect();
        assert!(events.contains(&SequencerEvent::StepChanged { old: None, new: 0 }));
    }
}
