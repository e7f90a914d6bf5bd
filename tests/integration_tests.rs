// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for loopjam
//!
//! These tests drive the public API the way the binary does: a song
//! document, a headless engine, note events through the tracker.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use loopjam::arrangement::{
    Accent, Accompaniment, BarRange, ChordSymbolItem, ChordTrack, Composition, MidiMix, ParameterValue,
    PartId, Position, RenderingHints, ScoreDocument, SongDocument, Style, TimeSignature,
};
use loopjam::engine::{EngineState, HeadlessEngine, PlaybackEngine};
use loopjam::midi::{
    note_channel, spawn_note_pump, NoteCluster, NoteClusterTracker, NoteEvent, NoteEventKind,
};
use loopjam::music::{ChordSymbol, Note, TemplateRecognizer};
use loopjam::{LoopContextBuilder, LoopController, LoopDependencies, LoopState, RehearsalConfig};

fn chord(text: &str) -> ChordSymbol {
    text.parse().unwrap()
}

fn swing() -> Style {
    Style::new("Swing", TimeSignature::FOUR_FOUR)
}

/// Intro at bars 0-9, Verse at bars 10-13, no chords
fn intro_and_verse() -> (Composition, PartId) {
    let mut track = ChordTrack::new("Intro", TimeSignature::FOUR_FOUR, 14);
    track.add_section("Verse", TimeSignature::FOUR_FOUR, 10).unwrap();
    let mut song = Composition::new("Song", track);
    song.add_part("Intro", "Intro", Accompaniment::Primary(swing())).unwrap();
    let verse = song.add_part("Verse", "Verse", Accompaniment::Primary(swing())).unwrap();
    (song, verse)
}

struct Session {
    controller: Arc<LoopController>,
    engine: Arc<HeadlessEngine>,
    document: Arc<SongDocument>,
    tracker: Arc<NoteClusterTracker>,
    states: Arc<Mutex<Vec<LoopState>>>,
}

fn session(song: Composition, part: PartId) -> Session {
    let document = Arc::new(SongDocument::new(song, MidiMix::new()));
    let engine = Arc::new(HeadlessEngine::new());
    let tracker = Arc::new(NoteClusterTracker::new());
    let config = RehearsalConfig {
        input_device: Some("Test keys".into()),
        ..RehearsalConfig::default()
    };
    let controller = LoopController::new(
        LoopDependencies {
            document: document.clone(),
            engine: engine.clone(),
            tracker: tracker.clone(),
            recognizer: Arc::new(TemplateRecognizer::default()),
        },
        &config,
    );
    controller.select_part(part);

    let states = Arc::new(Mutex::new(Vec::new()));
    let states_clone = states.clone();
    controller.subscribe_state(move |s| states_clone.lock().unwrap().push(*s));

    Session {
        controller,
        engine,
        document,
        tracker,
        states,
    }
}

#[test]
fn test_tracker_matches_held_set_for_any_interleaving() {
    let mut rng = StdRng::seed_from_u64(7);
    let tracker = NoteClusterTracker::new();

    for _ in 0..50 {
        tracker.reset();
        let mut pitches: Vec<u8> = (36..84).collect();
        pitches.shuffle(&mut rng);
        pitches.truncate(12);

        let mut events: Vec<NoteEvent> = pitches.iter().map(|&p| NoteEvent::on(p, 80)).collect();
        events.extend(pitches.iter().take(5).map(|&p| NoteEvent::off(p)));
        events.shuffle(&mut rng);

        let mut held = BTreeSet::new();
        for event in events {
            tracker.on_event(event);
            match event.kind {
                NoteEventKind::On => {
                    held.insert(event.pitch);
                }
                NoteEventKind::Off => {
                    held.remove(&event.pitch);
                }
            }
            let expected: Vec<u8> = held.iter().copied().collect();
            assert_eq!(tracker.snapshot().pitches(), expected);
        }
    }
}

#[test]
fn test_release_of_unheld_note_changes_nothing() {
    let tracker = NoteClusterTracker::new();
    tracker.on_event(NoteEvent::on(64, 90));
    tracker.on_event(NoteEvent::on(60, 90));
    let before = tracker.snapshot();

    tracker.on_event(NoteEvent::off(67));
    assert_eq!(tracker.snapshot(), before);
}

#[test]
fn test_part_without_chords_gets_default_triad() {
    let (song, verse) = intro_and_verse();
    let context = LoopContextBuilder::new(4)
        .build(&song, &MidiMix::new(), verse)
        .unwrap();

    let copy = context.composition();
    assert_eq!(copy.parts().len(), 1);
    assert_eq!(copy.parts()[0].bar_range(), BarRange::new(0, 3));
    assert_eq!(copy.chord_track().chords().len(), 1);
    let anchor = &copy.chord_track().chords()[0];
    assert_eq!(anchor.position(), Position::bar_start(0));
    assert_eq!(anchor.symbol(), &ChordSymbol::major_triad(Note::C));
    assert_eq!(context.anchor(), anchor);
}

#[test]
fn test_only_first_chord_survives() {
    let mut track = ChordTrack::new("A", TimeSignature::FOUR_FOUR, 4);
    track.add_chord(ChordSymbolItem::new(Position::bar_start(0), chord("Dm7"))).unwrap();
    track.add_chord(ChordSymbolItem::new(Position::bar_start(2), chord("G7"))).unwrap();
    let mut song = Composition::new("Song", track);
    let part = song.add_part("A", "A", Accompaniment::Primary(swing())).unwrap();

    let context = LoopContextBuilder::new(4).build(&song, &MidiMix::new(), part).unwrap();
    let chords = context.composition().chord_track().chords();
    assert_eq!(chords.len(), 1);
    assert_eq!(chords[0].symbol(), &chord("Dm7"));
    assert_eq!(chords[0].position(), Position::bar_start(0));
}

#[test]
fn test_adapted_part_brings_its_source_part() {
    let mut track = ChordTrack::new("Head", TimeSignature::FOUR_FOUR, 6);
    track.add_section("Waltz", TimeSignature::THREE_FOUR, 4).unwrap();
    track.add_chord(ChordSymbolItem::new(Position::new(5, 1.0), chord("Bb"))).unwrap();
    let mut song = Composition::new("Song", track);
    let head = song.add_part("Head", "Head", Accompaniment::Primary(swing())).unwrap();
    let waltz = song
        .add_part(
            "Waltz",
            "Waltz",
            Accompaniment::adapted(swing(), TimeSignature::THREE_FOUR).unwrap(),
        )
        .unwrap();
    assert_eq!(song.part(waltz).unwrap().bar_range(), BarRange::new(4, 5));

    let context = LoopContextBuilder::new(4).build(&song, &MidiMix::new(), waltz).unwrap();
    let parts: Vec<(PartId, BarRange, bool)> = context
        .composition()
        .parts()
        .iter()
        .map(|p| (p.id(), p.bar_range(), p.accompaniment().is_adapted()))
        .collect();

    assert_eq!(
        parts,
        vec![
            (waltz, BarRange::new(0, 1), true),
            (head, BarRange::new(2, 5), false)
        ]
    );
    assert_eq!(context.bar_range(), BarRange::new(0, 1));
    assert_eq!(context.anchor().position(), Position::bar_start(0));
    assert_eq!(context.anchor().symbol(), &chord("Bb"));
}

#[test]
fn test_live_substitution_keeps_playing() {
    let (song, verse) = intro_and_verse();
    let s = session(song, verse);
    s.controller.play().unwrap();
    let anchor_before = s.controller.anchor().unwrap();

    for pitch in [64, 67, 71] {
        s.tracker.on_event(NoteEvent::on(pitch, 100));
    }
    assert_eq!(s.controller.anchor().map(|a| a.symbol().to_string()), Some("Em".into()));

    for pitch in [64, 67, 71] {
        s.tracker.on_event(NoteEvent::off(pitch));
    }
    for pitch in [60, 64, 67] {
        s.tracker.on_event(NoteEvent::on(pitch, 100));
    }

    let anchor = s.controller.anchor().unwrap();
    assert_eq!(anchor.symbol(), &ChordSymbol::major_triad(Note::C));
    assert_eq!(anchor.position(), anchor_before.position());
    assert_eq!(anchor.hints(), anchor_before.hints());

    assert_eq!(s.controller.state(), LoopState::Playing);
    assert_eq!(s.engine.state(), EngineState::Playing);
    assert_eq!(s.engine.update_count(), 2);
    assert_eq!(*s.states.lock().unwrap(), vec![LoopState::Playing]);

    // The real song never sees the substitution
    assert!(s.document.snapshot().chord_track().chords().is_empty());
    s.controller.cleanup();
}

#[test]
fn test_candidate_keeps_rendering_hints() {
    let (mut song, verse) = intro_and_verse();
    let hints = RenderingHints {
        accent: Accent::Light,
        hold: false,
    };
    song.add_chord(ChordSymbolItem::new(Position::new(11, 2.0), chord("F")).with_hints(hints))
        .unwrap();
    let s = session(song, verse);
    s.controller.play().unwrap();

    s.controller.on_chord_candidate_available(chord("Bbmaj7"));
    let anchor = s.controller.anchor().unwrap();
    assert_eq!(anchor.symbol(), &chord("Bbmaj7"));
    assert_eq!(anchor.hints(), hints);
    s.controller.cleanup();
}

#[test]
fn test_stop_twice_is_stop_once() {
    let (song, verse) = intro_and_verse();
    let s = session(song, verse);
    s.controller.play().unwrap();

    s.controller.stop();
    s.controller.stop();

    assert_eq!(s.controller.state(), LoopState::Stopped);
    assert_eq!(
        *s.states.lock().unwrap(),
        vec![LoopState::Playing, LoopState::Stopped]
    );
    assert_eq!(s.engine.state(), EngineState::Stopped);

    // Nothing is substituted once stopped
    s.controller.on_chord_candidate_available(chord("A7"));
    assert!(s.controller.anchor().is_none());
    s.controller.cleanup();
}

#[test]
fn test_replay_builds_fresh_loop() {
    let (song, verse) = intro_and_verse();
    let s = session(song, verse);
    s.controller.play().unwrap();
    s.controller.on_chord_candidate_available(chord("A7"));
    s.controller.stop();

    s.document
        .set_part_parameter(verse, "intensity", ParameterValue::Int(2))
        .unwrap();
    s.controller.play().unwrap();

    let context = s.controller.context_snapshot().unwrap();
    assert_eq!(context.anchor().symbol(), &ChordSymbol::major_triad(Note::C));
    assert_eq!(
        context.composition().part(verse).unwrap().parameter("intensity"),
        Some(&ParameterValue::Int(2))
    );
    s.controller.cleanup();
}

#[test]
fn test_device_loss_stops_the_loop() {
    let (song, verse) = intro_and_verse();
    let s = session(song, verse);
    s.controller.play().unwrap();

    s.engine.set_external_state(EngineState::Disabled);
    assert_eq!(s.controller.state(), LoopState::Stopped);
    assert_eq!(
        *s.states.lock().unwrap(),
        vec![LoopState::Playing, LoopState::Stopped]
    );
    s.controller.cleanup();
}

#[tokio::test]
async fn test_pumped_notes_reach_the_loop() {
    let (song, verse) = intro_and_verse();
    let s = session(song, verse);
    s.controller.play().unwrap();

    let seen: Arc<Mutex<Vec<NoteCluster>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    s.tracker.subscribe(move |c| seen_clone.lock().unwrap().push(c.clone()));

    let (events, receiver) = note_channel();
    let pump = spawn_note_pump(receiver, s.tracker.clone());
    for pitch in [57, 60, 64, 67] {
        events.send(NoteEvent::on(pitch, 90)).unwrap();
    }
    drop(events);
    assert_eq!(pump.await.unwrap(), 4);

    assert_eq!(seen.lock().unwrap().len(), 4);
    assert_eq!(s.controller.anchor().map(|a| a.symbol().to_string()), Some("Am7".into()));
    s.controller.cleanup();
}

#[test]
fn test_engine_listener_count_after_cleanup() {
    let (song, verse) = intro_and_verse();
    let s = session(song, verse);
    s.controller.cleanup();

    // Engine changes after cleanup no longer reach the controller
    s.engine.load(&s.document.snapshot(), &MidiMix::new()).unwrap();
    s.engine.start(0).unwrap();
    s.engine.set_external_state(EngineState::Paused);
    assert_eq!(s.controller.state(), LoopState::Stopped);
    assert_eq!(s.tracker.listener_count(), 0);
}
