// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use loopjam::arrangement::{
    Accompaniment, ChannelSlot, ChordSymbolItem, ChordTrack, Composition, MidiMix, PartId,
    Position, SongDocument, Style, TimeSignature,
};
use loopjam::engine::HeadlessEngine;
use loopjam::listeners::SubscriptionId;
use loopjam::midi::{note_channel, spawn_note_pump, NoteClusterTracker, NoteEvent};
use loopjam::music::{midi_note_name, TemplateRecognizer};
use loopjam::{LoopController, LoopDependencies, RehearsalConfig};

fn print_usage() {
    println!("loopjam - Live chord rehearsal loops");
    println!();
    println!("Usage: loopjam [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --demo [CONFIG]             Loop the demo song's verse and play scripted chords");
    #[cfg(feature = "device")]
    {
        println!("  --list-sources              List available MIDI sources (inputs)");
        println!("  --rehearse <NAME> [CONFIG]  Loop the demo song's verse, chords from MIDI source NAME");
    }
    println!("  --help                      Show this help message");
    println!();
    println!("CONFIG is a .yaml or .toml rehearsal config. Set RUST_LOG=debug for more detail.");
}

fn load_config(path: Option<&String>) -> Result<RehearsalConfig> {
    match path {
        Some(path) => RehearsalConfig::load(path),
        None => Ok(RehearsalConfig::default()),
    }
}

/// Intro and Verse in 4/4 swing, Bridge in 3/4 adapted from the swing
fn demo_song() -> Result<(SongDocument, PartId)> {
    let mut track = ChordTrack::new("Intro", TimeSignature::FOUR_FOUR, 16);
    track.add_section("Verse", TimeSignature::FOUR_FOUR, 4)?;
    track.add_section("Bridge", TimeSignature::THREE_FOUR, 12)?;

    let mut song = Composition::new("Demo", track);
    for (bar, beat, symbol) in [
        (0, 0.0, "Cmaj7"),
        (2, 0.0, "A7"),
        (5, 2.0, "Dm7"),
        (6, 0.0, "G7"),
        (12, 0.0, "Fmaj7"),
        (14, 0.0, "E7"),
    ] {
        song.add_chord(ChordSymbolItem::new(Position::new(bar, beat), symbol.parse()?))?;
    }

    let swing = Style::new("Swing", TimeSignature::FOUR_FOUR);
    song.add_part("Intro", "Intro", Accompaniment::Primary(swing.clone()))?;
    let verse = song.add_part("Verse", "Verse", Accompaniment::Primary(swing.clone()))?;
    song.add_part(
        "Bridge",
        "Bridge",
        Accompaniment::adapted(swing, TimeSignature::THREE_FOUR)?,
    )?;

    let mut mix = MidiMix::new();
    mix.assign(1, ChannelSlot::new("Piano", 0));
    mix.assign(2, ChannelSlot::new("Upright Bass", 32));
    mix.assign(10, ChannelSlot::new("Brushes", 40));

    Ok((SongDocument::new(song, mix), verse))
}

fn demo_controller(
    config: &RehearsalConfig,
    tracker: &Arc<NoteClusterTracker>,
) -> Result<(Arc<LoopController>, Arc<HeadlessEngine>)> {
    let (document, verse) = demo_song()?;
    let engine = Arc::new(HeadlessEngine::new());
    let controller = LoopController::new(
        LoopDependencies {
            document: Arc::new(document),
            engine: engine.clone(),
            tracker: tracker.clone(),
            recognizer: Arc::new(TemplateRecognizer::new(config.recognizer.max_pitches)),
        },
        config,
    );
    controller.select_part(verse);
    Ok((controller, engine))
}

/// Print the anchor chord whenever held notes change it
fn print_anchor_changes(tracker: &NoteClusterTracker, controller: &Arc<LoopController>) -> SubscriptionId {
    let controller = Arc::downgrade(controller);
    let last = Mutex::new(String::new());
    tracker.subscribe(move |cluster| {
        let Some(anchor) = controller.upgrade().and_then(|c| c.anchor()) else {
            return;
        };
        let symbol = anchor.symbol().to_string();
        let mut last = last.lock().unwrap_or_else(|e| e.into_inner());
        if *last != symbol {
            let held: Vec<String> = cluster.pitches().into_iter().map(midi_note_name).collect();
            println!("  [{}] -> {} at {}", held.join(" "), symbol, anchor.position());
            *last = symbol;
        }
    })
}

async fn run_demo(config: RehearsalConfig) -> Result<()> {
    let config = RehearsalConfig {
        input_device: config.input_device.clone().or_else(|| Some("scripted".into())),
        ..config
    };
    let tracker = Arc::new(NoteClusterTracker::new());
    let (controller, engine) = demo_controller(&config, &tracker)?;
    let printer = print_anchor_changes(&tracker, &controller);

    controller.play()?;
    if let Some(context) = controller.context_snapshot() {
        println!(
            "Looping bars {} of the verse, anchor {}",
            context.bar_range(),
            context.anchor().symbol()
        );
    }

    let (events, receiver) = note_channel();
    let pump = spawn_note_pump(receiver, tracker.clone());
    // Dm7 G7 Cmaj7 Em7, voiced with the root in the bass
    let progression: [&[u8]; 4] = [
        &[50, 65, 69, 72],
        &[43, 65, 71, 74],
        &[48, 64, 67, 71],
        &[52, 55, 59, 62],
    ];
    for chord in progression {
        for &pitch in chord {
            events.send(NoteEvent::on(pitch, 96))?;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
        for &pitch in chord {
            events.send(NoteEvent::off(pitch))?;
        }
    }
    drop(events);
    let applied = pump.await.context("Note pump failed")?;

    info!("Applied {} note events, {} live updates", applied, engine.update_count());
    tracker.unsubscribe(printer);
    controller.cleanup();
    Ok(())
}

#[cfg(feature = "device")]
async fn run_rehearsal(device: &str, config: RehearsalConfig) -> Result<()> {
    use loopjam::midi::MidiInputDevice;

    let config = RehearsalConfig {
        input_device: Some(device.to_string()),
        ..config
    };
    let tracker = Arc::new(NoteClusterTracker::new());
    let (controller, _engine) = demo_controller(&config, &tracker)?;
    let printer = print_anchor_changes(&tracker, &controller);

    let (events, receiver) = note_channel();
    let pump = spawn_note_pump(receiver, tracker.clone());
    let input = MidiInputDevice::open(device, config.input_channel, events)?;
    println!("Listening on {} (press Ctrl+C to stop)...", input.name());

    controller.play()?;
    tokio::signal::ctrl_c().await?;

    drop(input);
    pump.await.context("Note pump failed")?;
    tracker.unsubscribe(printer);
    controller.cleanup();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("loopjam - Live chord rehearsal loops");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--demo" => {
            let config = load_config(args.get(2))?;
            run_demo(config).await?;
        }
        #[cfg(feature = "device")]
        "--list-sources" => {
            loopjam::midi::print_sources()?;
        }
        #[cfg(feature = "device")]
        "--rehearse" => {
            if args.len() < 3 {
                eprintln!("Error: --rehearse requires a MIDI source name");
                eprintln!("Use --list-sources to see available sources");
                std::process::exit(1);
            }
            let config = load_config(args.get(3))?;
            run_rehearsal(&args[2], config).await?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
