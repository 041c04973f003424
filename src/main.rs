// MyMusic StepSeq - Headless demo driving the sequencer engine from a simulated clock

use clap::Parser;
use mymusic_stepseq::midi::output::{MidiOutput, list_output_ports};
use mymusic_stepseq::preset::{FilePresetStore, PresetStore, SequencerPreset};
use mymusic_stepseq::sequencer::scale::parse_root;
use mymusic_stepseq::sequencer::transport::TransportEvent;
use mymusic_stepseq::{
    Direction, EngineConfig, Instrument, NotePlayer, Quantizer, Scale, SequencerCommand,
    SequencerEngine, SequencerEvent, TimingBus, TimingUpdate, create_command_channel,
    create_event_channel,
};
use ringbuf::traits::{Consumer, Producer};
use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "mymusic_stepseq", about = "Headless step sequencer demo")]
struct Cli {
    /// Engine configuration file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clock tempo
    #[arg(long, default_value_t = 120.0)]
    bpm: f64,

    /// Number of 4/4 bars to play
    #[arg(long, default_value_t = 2)]
    bars: u32,

    /// forward, backward, bounce or random [default: forward]
    #[arg(short, long)]
    direction: Option<Direction>,

    /// Scale used for generation and quantization, e.g. "minor pentatonic" [default: major]
    #[arg(short, long)]
    scale: Option<Scale>,

    /// Root note name (C, F#, Bb...) [default: C]
    #[arg(short, long)]
    root: Option<String>,

    /// Probability of a step being active
    #[arg(long, default_value_t = 0.6)]
    density: f64,

    /// Octave range of generated notes
    #[arg(long, default_value_t = 1)]
    octaves: u8,

    /// Seed for reproducible patterns
    #[arg(long)]
    seed: Option<u64>,

    /// Play notes on the MIDI output whose name contains this text
    #[arg(long)]
    midi_port: Option<String>,

    /// List MIDI output ports and exit
    #[arg(long)]
    list_midi_ports: bool,

    /// Directory of saved presets
    #[arg(long)]
    preset_dir: Option<PathBuf>,

    /// Load a saved preset instead of generating a pattern; explicit
    /// --direction, --scale and --root still apply on top of it
    #[arg(long)]
    load_preset: Option<String>,

    /// Save the played pattern as a preset
    #[arg(long)]
    save_preset: Option<String>,

    /// Run the clock as fast as possible
    #[arg(long)]
    fast: bool,
}

/// Instrument used when no MIDI port is requested
struct LogInstrument;

impl Instrument for LogInstrument {
    fn note_on(&mut self, note: u8, velocity: u8) {
        log::debug!("note on  {:>3} vel {:>3}", note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        log::debug!("note off {:>3}", note);
    }
}

fn preset_store(cli: &Cli) -> Option<FilePresetStore> {
    match &cli.preset_dir {
        Some(dir) => Some(FilePresetStore::new(dir)),
        None => FilePresetStore::in_user_data_dir(),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if cli.list_midi_ports {
        let ports = list_output_ports();
        if ports.is_empty() {
            println!("No MIDI output ports found");
        }
        for port in ports {
            println!("{}", port);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default_path()
            .map(|path| EngineConfig::load_or_default(&path))
            .unwrap_or_default(),
    };
    if cli.seed.is_some() {
        config.random_seed = cli.seed;
    }

    let Some(tempo) = mymusic_stepseq::sequencer::Tempo::new(cli.bpm) else {
        return Err(format!("Tempo must be between 20 and 999 BPM, got {}", cli.bpm).into());
    };
    let root = match &cli.root {
        Some(name) => {
            Some(parse_root(name).ok_or_else(|| format!("Unknown root note: {}", name))?)
        }
        None => None,
    };

    println!("=== MyMusic StepSeq ===");

    let bus = TimingBus::new(config.bus_capacity);
    let (mut command_tx, command_rx) = create_command_channel(config.command_capacity);
    let (event_tx, mut event_rx) = create_event_channel(config.event_capacity);
    let engine = SequencerEngine::from_config(&config, &bus, command_rx, event_tx);

    // A loaded preset brings its own settings; only explicit flags override them
    let mut commands = Vec::new();
    let mut quantizer;
    let (root, scale, direction) = match &cli.load_preset {
        Some(key) => {
            let store = preset_store(&cli).ok_or("No preset directory available")?;
            let preset = store.load(key)?;
            println!("Preset: {}", preset.name);
            quantizer = preset.quantizer;
            commands.push(SequencerCommand::LoadPreset(Box::new(preset)));
            (root, cli.scale, cli.direction)
        }
        None => {
            quantizer = Quantizer::default();
            commands.push(SequencerCommand::SetQuantize(true));
            quantizer.set_enabled(true);
            (
                Some(root.unwrap_or(0)),
                Some(cli.scale.unwrap_or(Scale::Major)),
                Some(cli.direction.unwrap_or_default()),
            )
        }
    };
    if let Some(root) = root {
        quantizer.set_root(root);
        commands.push(SequencerCommand::SetRoot(root));
    }
    if let Some(scale) = scale {
        quantizer.set_scale(scale);
        commands.push(SequencerCommand::SetScale(scale));
    }
    if let Some(direction) = direction {
        commands.push(SequencerCommand::SetDirection(direction));
    }
    if cli.load_preset.is_none() {
        commands.push(SequencerCommand::GeneratePattern {
            octave_range: cli.octaves,
            density: cli.density,
        });
    }
    if quantizer.is_enabled() {
        println!("Scale: {}", quantizer.describe());
    }
    for command in commands {
        if command_tx.try_push(command).is_err() {
            return Err("Command channel full".into());
        }
    }

    let mut midi_out = match &cli.midi_port {
        Some(name) => Some(MidiOutput::connect(Some(name), 0)?),
        None => None,
    };
    let mut log_instrument = LogInstrument;
    let instrument: &mut dyn Instrument = match midi_out.as_mut() {
        Some(out) => out,
        None => &mut log_instrument,
    };

    let handle = engine.spawn(config.poll_interval())?;

    // Simulated clock
    let ppq = config.ppq;
    let total_ticks = cli.bars as u64 * 4 * ppq as u64;
    let tick_interval = Duration::from_secs_f64(tempo.tick_duration_ms(ppq) / 1000.0);
    let fast = cli.fast;
    let clock_bus = bus.clone();
    let clock = thread::Builder::new()
        .name("stepseq-clock".to_string())
        .spawn(move || {
            // Let the engine apply the setup commands before the first tick
            thread::sleep(Duration::from_millis(20));
            clock_bus.publish(TransportEvent::Started);
            let start = Instant::now();
            for tick in 0..total_ticks {
                if !fast {
                    let due = start + tick_interval.mul_f64(tick as f64);
                    if let Some(wait) = due.checked_duration_since(Instant::now()) {
                        thread::sleep(wait);
                    }
                }
                clock_bus.publish(TransportEvent::Tick(TimingUpdate::at_tick(
                    tick,
                    ppq,
                    tempo.bpm(),
                )));
            }
            clock_bus.publish(TransportEvent::Stopped);
        })?;

    println!(
        "Playing {} bars at {} ({} ticks per quarter)\n",
        cli.bars, tempo, ppq
    );

    // "UI" loop
    let mut player = NotePlayer::new();
    let started = Instant::now();
    let mut notes_played = 0usize;
    let mut finished = false;
    let mut clock_done: Option<Instant> = None;
    while !finished {
        let now_ms = started.elapsed().as_millis() as u64;
        while let Some(event) = event_rx.try_pop() {
            match event {
                SequencerEvent::StepChanged { new, .. } => {
                    log::info!("step {:>2}", new + 1);
                }
                SequencerEvent::NoteTriggered(note) => {
                    println!(
                        "  {:<4} vel {:>3}  {:>4} ms",
                        note.note_name(),
                        note.velocity,
                        note.duration_ms
                    );
                    player.play(note, now_ms, instrument);
                    notes_played += 1;
                }
                SequencerEvent::Reset => {
                    player.stop_all(instrument);
                    finished = true;
                }
            }
        }
        player.update(now_ms, instrument);

        // The stop message can be lost when the bus overflows in fast mode
        if !finished && clock.is_finished() {
            let since = *clock_done.get_or_insert_with(Instant::now);
            if since.elapsed() > Duration::from_millis(500) {
                log::warn!("No reset received after the clock stopped");
                player.stop_all(instrument);
                finished = true;
            }
        }
        if !finished {
            thread::sleep(Duration::from_millis(1));
        }
    }

    if clock.join().is_err() {
        log::error!("Clock thread panicked");
    }
    if let Some(out) = midi_out {
        out.close();
    }
    let engine = handle.shutdown().ok_or("Sequencer engine thread panicked")?;
    println!("\n{} notes played", notes_played);
    if engine.dropped_events() > 0 {
        log::warn!("{} UI events dropped", engine.dropped_events());
    }

    if let Some(key) = &cli.save_preset {
        let mut store = preset_store(&cli).ok_or("No preset directory available")?;
        let preset = SequencerPreset::from_sequencer(key.as_str(), engine.sequencer());
        store.save(key, &preset)?;
        println!("Preset saved as '{}'", key);
    }

    Ok(())
}
