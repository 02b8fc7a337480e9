//! Playlist navigation and loop mode integration tests

mod common;

use common::{count, Harness, UiProbe};
use deck_playback::{
    Command, DeviceEvent, EngineConfig, EngineEvent, EngineOptions, GateState, Gesture, LoopMode,
    PlayOutcome, PlaylistEntry, DEFAULT_TARGET_VOLUME,
};

// ===== Test Helpers =====

const TRACKS: [&str; 3] = ["bgm/intro.mp3", "bgm/theme%20two.ogg", "bgm/outro.mp3"];

fn playlist_config() -> EngineConfig {
    EngineConfig::from_playlist(TRACKS)
}

/// Three tracks, autoplay succeeded, fade finished
fn playing_harness() -> Harness {
    let mut h = Harness::new();
    h.init(playlist_config());
    h.start();
    h.run_frames();
    h.events();
    h
}

fn source(h: &Harness) -> String {
    h.output.borrow().source.clone().unwrap_or_default()
}

// ===== Navigation =====

#[test]
fn test_next_and_prev_wrap() {
    let mut h = playing_harness();

    h.engine.next();
    assert_eq!(h.engine.state().current_index, 1);
    h.engine.next();
    h.engine.next();
    assert_eq!(h.engine.state().current_index, 0);
    assert_eq!(source(&h), TRACKS[0]);

    h.engine.prev();
    assert_eq!(h.engine.state().current_index, 2);
    assert_eq!(source(&h), TRACKS[2]);
}

#[test]
fn test_next_emits_track_changed() {
    let mut h = playing_harness();
    h.engine.dispatch(Command::Next);

    assert!(h.events().contains(&EngineEvent::TrackChanged {
        index: 1,
        previous_index: Some(0),
        name: "theme two".into(),
    }));
}

#[test]
fn test_navigation_while_playing_keeps_playing() {
    let mut h = playing_harness();
    let attempts = h.attempt_count();

    h.engine.next();
    assert_eq!(h.attempt_count(), attempts + 1);
    h.start();

    assert!(h.engine.is_playing());
    // Volume stays put; no fade on navigation
    assert!(!h.engine.state().fading);
    assert_eq!(
        count(&h.events(), |e| matches!(e, EngineEvent::FadeStarted { .. })),
        0
    );
}

#[test]
fn test_navigation_while_paused_only_attaches() {
    let mut h = playing_harness();
    h.engine.pause();
    let attempts = h.attempt_count();

    h.engine.next();
    assert_eq!(h.attempt_count(), attempts);
    assert_eq!(source(&h), TRACKS[1]);
    assert!(!h.engine.is_playing());
}

#[test]
fn test_navigation_during_pending_autoplay_keeps_gate() {
    let mut h = Harness::new();
    h.init(playlist_config());
    let autoplay = h.last_attempt();

    h.engine.next();
    assert_ne!(h.last_attempt(), autoplay);

    // The replaced autoplay attempt is stale
    h.engine.handle_play_result(autoplay, PlayOutcome::rejected("late"));
    assert!(h.gate.borrow().shown.is_empty());

    // Its replacement is still blocked, so the gate takes over
    h.reject("NotAllowedError");
    assert_eq!(h.engine.gate_state(), GateState::Shown);
    assert_eq!(h.gate.borrow().shown.len(), 1);

    h.engine.handle_gesture(Gesture::PointerDown);
    h.start();
    h.run_frames();
    assert_eq!(h.engine.state().current_index, 1);
    assert_eq!(h.output_volume(), DEFAULT_TARGET_VOLUME);
}

#[test]
fn test_navigation_cancels_fade() {
    let mut h = Harness::new();
    h.init(playlist_config());
    h.start();
    for _ in 0..10 {
        h.frame(16.0);
    }
    let level = h.output_volume();

    h.engine.next();
    assert!(!h.engine.state().fading);
    h.run_frames();
    assert_eq!(h.output_volume(), level);
}

#[test]
fn test_single_track_ignores_navigation() {
    let ui = UiProbe::default();
    let mut h = Harness::new();
    h.init_with_ui(EngineConfig::from_source("bgm/only.mp3"), &ui);
    h.start();
    h.events();

    h.engine.next();
    h.engine.prev();
    assert_eq!(h.engine.state().current_index, 0);
    assert!(h.events().is_empty());
    assert_eq!(ui.next.borrow().enabled, Some(false));
    assert_eq!(ui.prev.borrow().enabled, Some(false));
}

#[test]
fn test_track_name_label_follows_navigation() {
    let ui = UiProbe::default();
    let mut h = Harness::new();
    let config = EngineConfig::from_playlist([
        PlaylistEntry::titled("bgm/a.mp3", "Opening"),
        PlaylistEntry::from("bgm/b.mp3"),
    ]);
    h.init_with_ui(config, &ui);
    assert_eq!(*ui.track_name.borrow(), "Opening");
    assert_eq!(ui.next.borrow().enabled, Some(true));

    h.engine.next();
    assert_eq!(*ui.track_name.borrow(), "b");
}

// ===== Track end =====

#[test]
fn test_loop_all_advances_on_end() {
    let mut h = playing_harness();
    let attempts = h.attempt_count();

    h.engine.handle_device_event(DeviceEvent::Ended);
    assert_eq!(h.engine.state().current_index, 1);
    assert_eq!(h.attempt_count(), attempts + 1);

    h.start();
    assert!(h.engine.is_playing());
    assert!(!h.engine.state().fading);
}

#[test]
fn test_loop_all_wraps_at_playlist_end() {
    let mut h = playing_harness();
    h.engine.prev();
    h.start();

    h.engine.handle_device_event(DeviceEvent::Ended);
    assert_eq!(h.engine.state().current_index, 0);
}

#[test]
fn test_loop_all_single_track_restarts() {
    let mut h = Harness::new();
    h.init(EngineConfig::from_source("bgm/only.mp3"));
    h.start();
    let attempts = h.attempt_count();

    h.engine.handle_device_event(DeviceEvent::Ended);
    assert_eq!(h.engine.state().current_index, 0);
    assert_eq!(h.attempt_count(), attempts + 1);
}

#[test]
fn test_loop_off_stops_at_end() {
    let mut h = playing_harness();
    h.engine.set_loop_mode(LoopMode::Off);
    let attempts = h.attempt_count();

    h.engine.handle_device_event(DeviceEvent::Ended);
    assert!(!h.engine.is_playing());
    assert_eq!(h.engine.state().current_index, 0);
    assert_eq!(h.attempt_count(), attempts);
}

#[test]
fn test_loop_one_uses_native_looping() {
    let mut h = playing_harness();
    assert!(!h.output.borrow().looping);

    h.engine.set_loop_mode(LoopMode::One);
    assert!(h.output.borrow().looping);

    h.engine.handle_device_event(DeviceEvent::Ended);
    assert_eq!(h.engine.state().current_index, 0);

    h.engine.set_loop_mode(LoopMode::All);
    assert!(!h.output.borrow().looping);
}

// ===== Loop mode =====

#[test]
fn test_cycle_loop_mode_order() {
    let ui = UiProbe::default();
    let mut h = Harness::new();
    h.init_with_ui(playlist_config(), &ui);
    assert_eq!(ui.loop_mode.borrow().label, "🔁");

    h.engine.dispatch(Command::CycleLoopMode);
    assert_eq!(h.engine.state().loop_mode, LoopMode::One);
    assert_eq!(ui.loop_mode.borrow().label, "🔂");

    h.engine.dispatch(Command::CycleLoopMode);
    assert_eq!(h.engine.state().loop_mode, LoopMode::Off);
    assert_eq!(ui.loop_mode.borrow().label, "➡");

    h.engine.dispatch(Command::CycleLoopMode);
    assert_eq!(h.engine.state().loop_mode, LoopMode::All);

    let events = h.events();
    assert!(events.contains(&EngineEvent::LoopModeChanged {
        loop_mode: LoopMode::Off
    }));
}

#[test]
fn test_configured_loop_mode() {
    let mut h = Harness::new();
    let options = EngineOptions {
        loop_mode: Some(LoopMode::One),
        ..Default::default()
    };
    h.init(playlist_config().with_options(options));

    assert_eq!(h.engine.state().loop_mode, LoopMode::One);
    assert!(h.output.borrow().looping);
}

#[test]
fn test_device_pause_updates_transport() {
    let ui = UiProbe::default();
    let mut h = Harness::new();
    h.init_with_ui(playlist_config(), &ui);
    h.start();
    h.run_frames();
    assert_eq!(ui.play.borrow().label, "⏸");

    h.engine.handle_device_event(DeviceEvent::Paused);
    assert!(!h.engine.is_playing());
    assert_eq!(ui.play.borrow().label, "▶");

    h.engine.handle_device_event(DeviceEvent::Playing);
    assert!(h.engine.is_playing());
}
