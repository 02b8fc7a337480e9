//! BGM engine
//!
//! The playback controller façade. Owns the output device handle, the gate
//! surface and the key-value store for its whole lifetime, and one session
//! (playlist, options, volume record, UI bindings) per `init`.
//!
//! Everything is driven by the host:
//! - user intents arrive as [`Command`]s through [`BgmEngine::dispatch`]
//! - play attempt outcomes through [`BgmEngine::handle_play_result`]
//! - device notifications through [`BgmEngine::handle_device_event`]
//! - gestures (for the unlock gate) through [`BgmEngine::handle_gesture`]
//! - animation frames through [`BgmEngine::on_frame`]
//!
//! No method returns an error. Every failure degrades into "no sound", "no
//! equalizer" or "no persistence", is logged, and shows up in
//! [`BgmEngine::drain_events`].

use crate::{
    equalizer::{EqStatus, Equalizer},
    events::{Command, EngineEvent},
    fade::{FadeEngine, FadeTick},
    gate::{GateState, GateSurface, Gesture, UnlockGate},
    numeric::clamp01,
    output::{AudioOutput, DeviceEvent, PlayAttemptId, PlayOutcome},
    persistence::{KeyValueStore, PersistenceAdapter},
    playlist::{EndAction, PlaylistState},
    types::{EngineConfig, LoopMode, PlaybackState, Playlist, ResolvedOptions, Track},
    ui::{UiBindings, UiSnapshot},
    volume::{Volume, VOLUME_STEP},
};
use tracing::{debug, info, trace, warn};

/// Why a play attempt was made; decides what its outcome triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayPurpose {
    /// First attempt after `init`
    Autoplay,
    /// Retry after the unlock gesture
    Unlock,
    /// Play button / `Command::Play`
    Manual,
    /// Loop-all advance after a track ended
    Advance,
    /// Prev/next while playing
    Navigate,
}

#[derive(Debug, Clone, Copy)]
struct PendingPlay {
    id: PlayAttemptId,
    purpose: PlayPurpose,
    /// A pause arrived while the attempt was in flight
    superseded: bool,
}

/// Per-`init` state
struct Session {
    playlist: Playlist,
    cursor: PlaylistState,
    options: ResolvedOptions,
    persistence: PersistenceAdapter,
    volume: Volume,
    ui: UiBindings,
    /// Initial fade skipped because the engine was muted
    deferred_fade: bool,
}

impl Session {
    fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.cursor.index())
    }
}

/// Background-music engine
pub struct BgmEngine {
    output: Box<dyn AudioOutput>,
    gate_surface: Box<dyn GateSurface>,
    store: Box<dyn KeyValueStore>,

    session: Option<Session>,

    // Engine-lifetime resources
    equalizer: Equalizer,
    fade: FadeEngine,
    gate: UnlockGate,

    /// Some play attempt has succeeded
    unlocked: bool,

    /// The gate's gesture was used up in this session; later rejections are final
    gate_spent: bool,

    /// Transport as last observed
    playing: bool,

    next_attempt: u64,
    pending_play: Option<PendingPlay>,

    // Event queue for hosts
    pending_events: Vec<EngineEvent>,
}

impl BgmEngine {
    /// Create an engine around its lifetime collaborators
    ///
    /// Nothing plays until [`init`](Self::init).
    pub fn new(
        output: Box<dyn AudioOutput>,
        gate_surface: Box<dyn GateSurface>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            output,
            gate_surface,
            store,
            session: None,
            equalizer: Equalizer::new(),
            fade: FadeEngine::new(),
            gate: UnlockGate::new(),
            unlocked: false,
            gate_spent: false,
            playing: false,
            next_attempt: 0,
            pending_play: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Lifecycle =====

    /// Load a playlist, restore persisted state and run the autoplay sequence
    ///
    /// Calling it again tears the previous session down first. A config with
    /// nothing playable disables every bound control and leaves the engine
    /// idle.
    pub fn init(&mut self, config: EngineConfig, ui: UiBindings) {
        self.teardown();

        let options = config.options.resolve();
        let playlist = match Playlist::from_config(&config, options.title_language.as_deref()) {
            Ok(playlist) => playlist,
            Err(e) => {
                warn!(error = %e, "BGM disabled");
                let mut ui = ui;
                ui.disable_all();
                return;
            }
        };

        let persistence = PersistenceAdapter::new(options.storage_prefix.clone(), options.persist);
        let persisted = persistence.load(&*self.store, playlist.len());

        let volume = Volume::new(
            persisted.volume.unwrap_or(options.target_volume),
            persisted.muted.unwrap_or(false),
        );
        let cursor = PlaylistState::new(
            playlist.len(),
            persisted.track_index.unwrap_or(0),
            persisted.loop_mode.unwrap_or(options.loop_mode),
        );

        info!(
            tracks = playlist.len(),
            index = cursor.index(),
            loop_mode = %cursor.loop_mode(),
            target_volume = volume.target(),
            muted = volume.is_muted(),
            "Initializing BGM"
        );

        self.session = Some(Session {
            playlist,
            cursor,
            options,
            persistence,
            volume,
            ui,
            deferred_fade: false,
        });

        self.attach_current_track(None);
        self.output.set_looping(cursor.native_loop());
        self.output.set_muted(volume.is_muted());

        if self.session.as_ref().is_some_and(|s| s.ui.has_equalizer()) {
            self.attach_equalizer();
        }

        // Autoplay: start silent, fade in once playing
        self.output.set_volume(0.0);
        if let Some(session) = self.session.as_mut() {
            session.ui.show_volume(0.0);
        }
        self.request_play(PlayPurpose::Autoplay);
        self.render_ui();
    }

    /// Stop playback and release the session
    pub fn dispose(&mut self) {
        debug!("Disposing BGM engine");
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.fade.cancel() {
            self.pending_events.push(EngineEvent::FadeCancelled);
        }
        self.fade.reset();
        self.pending_play = None;
        self.gate_spent = false;

        if self.session.take().is_some() {
            self.output.pause();
            self.output.detach();
            self.set_playing(false);
        }

        if self.gate.hide() {
            self.gate_surface.hide();
            self.pending_events.push(EngineEvent::GateHidden);
        }
    }

    // ===== Commands =====

    /// Apply a user intent
    pub fn dispatch(&mut self, command: Command) {
        trace!(?command, "Dispatching command");
        match command {
            Command::TogglePlay => self.toggle_play(),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::ToggleMute => self.toggle_mute(),
            Command::SetVolume { volume } => self.set_volume(volume),
            Command::StepVolume { delta } => self.step_volume(delta),
            Command::VolumeUp => self.step_volume(VOLUME_STEP),
            Command::VolumeDown => self.step_volume(-VOLUME_STEP),
            Command::Next => self.next(),
            Command::Prev => self.prev(),
            Command::CycleLoopMode => self.cycle_loop_mode(),
            Command::SetLoopMode { mode } => self.set_loop_mode(mode),
            Command::SetEqualizerGain { band, gain_db } => self.set_equalizer_gain(band, gain_db),
        }
    }

    /// Play button: ignored while a fade is running
    pub fn toggle_play(&mut self) {
        if self.fade.is_active() {
            debug!("Play button ignored while fading");
            return;
        }
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        if self.session.is_none() {
            return;
        }
        let in_flight = self.pending_play.is_some_and(|p| !p.superseded);
        if self.playing && !in_flight {
            return;
        }
        self.cancel_fade();
        self.request_play(PlayPurpose::Manual);
        self.render_ui();
    }

    /// Pause playback; an in-flight play attempt is superseded
    pub fn pause(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.cancel_fade();
        if let Some(pending) = self.pending_play.as_mut() {
            debug!(attempt = pending.id.0, "Pause supersedes in-flight play attempt");
            pending.superseded = true;
        }
        self.output.pause();
        self.set_playing(false);
        self.render_ui();
    }

    /// Set the volume from user input
    ///
    /// NaN keeps the current output level. A volume of 0 mutes, anything
    /// else unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        if self.session.is_none() {
            return;
        }
        let volume = if volume.is_nan() {
            self.output.volume()
        } else {
            volume
        };
        self.cancel_fade();
        self.apply_volume_from_user_input(clamp01(volume));
    }

    /// Move the volume by `delta` from the current output level
    pub fn step_volume(&mut self, delta: f32) {
        if delta.is_nan() {
            return;
        }
        let current = self.output.volume();
        self.set_volume(current + delta);
    }

    /// Flip mute, keeping the target volume
    pub fn toggle_mute(&mut self) {
        self.cancel_fade();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let muted = session.volume.toggle_mute();
        let resume_fade = !muted && std::mem::take(&mut session.deferred_fade);
        self.output.set_muted(muted);
        debug!(muted, "Mute toggled");

        self.persist_volume();
        self.emit_volume_changed();
        if resume_fade {
            self.start_fade_to_target();
        }
        self.render_ui();
    }

    /// Fade the output toward `target`, which becomes the new target volume
    pub fn fade_to(&mut self, target: f32, duration_ms: Option<f64>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.volume.set_target(target);
        if let Some(ms) = duration_ms {
            session.options.fade_ms = crate::fade::normalize_duration_ms(Some(ms));
        }
        self.start_fade_to_target();
        self.render_ui();
    }

    pub fn next(&mut self) {
        self.navigate(true);
    }

    pub fn prev(&mut self) {
        self.navigate(false);
    }

    /// Loop button: all → one → off → all
    pub fn cycle_loop_mode(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mode = session.cursor.cycle_loop_mode();
        self.on_loop_mode_changed(mode);
    }

    /// Change the loop mode; a running fade keeps running
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.cursor.set_loop_mode(mode);
        self.on_loop_mode_changed(mode);
    }

    fn on_loop_mode_changed(&mut self, mode: LoopMode) {
        let native = self.session.as_ref().is_some_and(|s| s.cursor.native_loop());
        self.output.set_looping(native);
        debug!(loop_mode = %mode, "Loop mode changed");

        self.persist_position();
        self.pending_events
            .push(EngineEvent::LoopModeChanged { loop_mode: mode });
        self.render_ui();
    }

    /// Set one equalizer band's gain (clamped to ±12 dB)
    pub fn set_equalizer_gain(&mut self, band: usize, gain_db: f32) {
        if let Some(gain) = self.equalizer.set_gain(band, gain_db) {
            trace!(band, gain, "Equalizer gain");
            self.output.set_equalizer_gain(band, gain);
        }
    }

    // ===== Host callbacks =====

    /// Outcome of a play attempt started with `AudioOutput::play`
    ///
    /// Outcomes of attempts that are no longer current are ignored.
    pub fn handle_play_result(&mut self, attempt: PlayAttemptId, outcome: PlayOutcome) {
        let Some(pending) = self.pending_play.filter(|p| p.id == attempt) else {
            debug!(attempt = attempt.0, "Ignoring outcome of stale play attempt");
            return;
        };
        self.pending_play = None;

        match outcome {
            PlayOutcome::Started => self.on_play_started(pending),
            PlayOutcome::Rejected { reason } => self.on_play_rejected(pending, reason),
        }
        self.render_ui();
    }

    fn on_play_started(&mut self, pending: PendingPlay) {
        let first_success = !self.unlocked;
        if first_success {
            info!(purpose = ?pending.purpose, "Audio unlocked");
            self.unlocked = true;
            self.pending_events.push(EngineEvent::Unlocked);
        }

        if pending.superseded {
            debug!(attempt = pending.id.0, "Play resolved after pause; pausing again");
            self.output.pause();
            self.set_playing(false);
            return;
        }

        self.set_playing(true);

        // The first sound of the session fades in, whatever started it
        let fade_in = match pending.purpose {
            PlayPurpose::Autoplay | PlayPurpose::Unlock => true,
            PlayPurpose::Manual | PlayPurpose::Advance | PlayPurpose::Navigate => first_success,
        };
        if !fade_in {
            return;
        }

        let muted = match self.session.as_mut() {
            Some(session) => {
                session.deferred_fade = session.volume.is_muted();
                session.deferred_fade
            }
            None => return,
        };
        if muted {
            debug!("Muted at start; fade deferred until unmute");
        } else {
            self.start_fade_to_target();
        }
    }

    fn on_play_rejected(&mut self, pending: PendingPlay, reason: String) {
        if pending.superseded {
            debug!(attempt = pending.id.0, "Superseded play attempt rejected");
            return;
        }

        self.set_playing(false);
        self.pending_events.push(EngineEvent::PlayRejected {
            reason: reason.clone(),
        });

        if !self.unlocked && !self.gate_spent {
            info!(purpose = ?pending.purpose, %reason, "Playback blocked; waiting for a gesture");
            self.show_gate();
        } else {
            warn!(purpose = ?pending.purpose, %reason, "Play attempt rejected");
        }
    }

    /// Notification from the output device
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        if self.session.is_none() {
            return;
        }
        trace!(?event, "Device event");
        match event {
            DeviceEvent::Ended => self.on_track_ended(),
            DeviceEvent::Playing => self.set_playing(true),
            DeviceEvent::Paused => self.set_playing(false),
        }
        self.render_ui();
    }

    fn on_track_ended(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let previous = session.cursor.index();
        match session.cursor.on_track_ended() {
            EndAction::Advance(index) => {
                debug!(from = previous, to = index, "Track ended; advancing");
                self.attach_current_track(Some(previous));
                self.persist_position();
                self.request_play(PlayPurpose::Advance);
            }
            EndAction::Stop => {
                debug!("Track ended; loop off, stopping");
                self.set_playing(false);
            }
            EndAction::Ignore => {}
        }
    }

    /// Gesture anywhere in the page; unlocks only while the gate is shown
    pub fn handle_gesture(&mut self, gesture: Gesture) {
        if !self.gate.on_gesture(gesture) {
            return;
        }
        debug!(?gesture, "Unlock gesture");
        self.gate_spent = true;
        self.gate_surface.hide();
        self.pending_events.push(EngineEvent::GateHidden);

        if self.session.is_some() {
            self.request_play(PlayPurpose::Unlock);
            self.render_ui();
        }
    }

    /// Advance the fade by one animation frame
    ///
    /// Returns true while another frame is wanted.
    pub fn on_frame(&mut self, now_ms: f64) -> bool {
        match self.fade.tick(now_ms) {
            FadeTick::Idle => {}
            FadeTick::Aborted { token } => {
                trace!(fade = token.value(), "Cancelled fade retired");
            }
            FadeTick::Progress { volume } => self.apply_volume_from_animation(volume),
            FadeTick::Finished { token, volume } => {
                self.apply_volume_from_animation(volume);
                debug!(fade = token.value(), volume, "Fade completed");
                self.pending_events
                    .push(EngineEvent::FadeCompleted { volume });
                self.persist_volume();
                self.render_ui();
            }
        }
        self.fade.wants_frame()
    }

    // ===== Queries =====

    /// Whether the host should keep delivering animation frames
    pub fn wants_frame(&self) -> bool {
        self.fade.wants_frame()
    }

    /// Snapshot of the core state record
    pub fn state(&self) -> PlaybackState {
        let (index, loop_mode, volume) = match &self.session {
            Some(s) => (s.cursor.index(), s.cursor.loop_mode(), s.volume),
            None => (0, LoopMode::default(), Volume::default()),
        };
        PlaybackState {
            current_index: index,
            loop_mode,
            target_volume: volume.target(),
            muted: volume.is_muted(),
            fading: self.fade.is_active(),
            unlocked: self.unlocked,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Instantaneous output volume
    pub fn output_volume(&self) -> f32 {
        self.output.volume()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.as_ref().and_then(Session::current_track)
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.session.as_ref().map(|s| &s.playlist)
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn equalizer_status(&self) -> &EqStatus {
        self.equalizer.status()
    }

    // ===== Internals =====

    fn request_play(&mut self, purpose: PlayPurpose) {
        self.next_attempt += 1;
        let id = PlayAttemptId(self.next_attempt);
        if let Some(previous) = self.pending_play.replace(PendingPlay {
            id,
            purpose,
            superseded: false,
        }) {
            trace!(attempt = previous.id.0, "Play attempt replaced");
        }
        debug!(attempt = id.0, ?purpose, "Requesting playback");
        self.output.play(id);
    }

    fn show_gate(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !self.gate.ensure_shown() {
            return;
        }
        self.gate_surface.show(&session.options.gate);
        self.pending_events.push(EngineEvent::GateShown);
    }

    /// Select the cursor's track on the output
    fn attach_current_track(&mut self, previous_index: Option<usize>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(track) = session.current_track() else {
            return;
        };
        let index = session.cursor.index();
        let name = track.display_name.clone();

        self.output.set_source(&track.source);
        self.pending_play = None;
        self.set_playing(false);

        debug!(index, %name, "Track attached");
        self.pending_events.push(EngineEvent::TrackChanged {
            index,
            previous_index,
            name,
        });
    }

    fn navigate(&mut self, forward: bool) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.cursor.is_navigable() {
            debug!("Single track; navigation ignored");
            return;
        }

        self.cancel_fade();
        let was_playing = self.playing || self.pending_play.is_some_and(|p| !p.superseded);

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let previous = session.cursor.index();
        let moved = if forward {
            session.cursor.next()
        } else {
            session.cursor.prev()
        };
        if moved.is_none() {
            return;
        }

        self.attach_current_track(Some(previous));
        self.persist_position();
        if was_playing {
            self.request_play(PlayPurpose::Navigate);
        }
        self.render_ui();
    }

    fn attach_equalizer(&mut self) {
        let output = &mut self.output;
        if let Some(err) = self.equalizer.attach(|bands| output.attach_equalizer(bands)) {
            self.pending_events.push(EngineEvent::EqualizerUnavailable {
                reason: err.to_string(),
            });
        }

        let gains = self.equalizer.bands().map(|b| b.gain_db());
        if let Some(session) = self.session.as_mut() {
            session.ui.show_equalizer_gains(gains);
        }
    }

    /// Abort the running fade, leaving the volume where it is
    fn cancel_fade(&mut self) {
        if self.fade.cancel() {
            debug!("Fade cancelled by user action");
            self.pending_events.push(EngineEvent::FadeCancelled);
        }
    }

    fn start_fade_to_target(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let from = self.output.volume();
        let target = session.volume.target();
        let duration_ms = session.options.fade_ms;
        let curve = session.options.fade_curve;

        if self.fade.is_active() {
            self.pending_events.push(EngineEvent::FadeCancelled);
        }
        let token = self.fade.start(from, target, duration_ms, curve);
        debug!(fade = token.value(), from, target, duration_ms, "Fade started");
        self.pending_events.push(EngineEvent::FadeStarted {
            target,
            duration_ms,
        });
    }

    /// Volume write from the fade; never cancels anything
    fn apply_volume_from_animation(&mut self, volume: f32) {
        self.output.set_volume(volume);
        if let Some(session) = self.session.as_mut() {
            session.ui.show_volume(volume);
        }
    }

    /// Volume write from the user; the fade was already cancelled
    fn apply_volume_from_user_input(&mut self, volume: f32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let muted = volume == 0.0;
        session.volume.set_target(volume);
        session.volume.set_muted(muted);
        session.deferred_fade = false;
        session.ui.show_volume(volume);

        self.output.set_volume(volume);
        self.output.set_muted(muted);
        trace!(volume, muted, "Volume set");

        self.persist_volume();
        self.emit_volume_changed();
        self.render_ui();
    }

    fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            self.playing = playing;
            self.pending_events
                .push(EngineEvent::StateChanged { playing });
        }
    }

    fn persist_volume(&mut self) {
        if let Some(session) = self.session.as_ref() {
            session.persistence.save_volume(
                &mut *self.store,
                session.volume.target(),
                session.volume.is_muted(),
            );
        }
    }

    fn persist_position(&mut self) {
        if let Some(session) = self.session.as_ref() {
            let store = &mut *self.store;
            session
                .persistence
                .save_loop_mode(store, session.cursor.loop_mode());
            session
                .persistence
                .save_track_index(store, session.cursor.index());
        }
    }

    fn render_ui(&mut self) {
        let output_volume = self.output.volume();
        let playing = self.playing;
        let fading = self.fade.is_active();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let track_name = session
            .playlist
            .get(session.cursor.index())
            .map_or("", |t| t.display_name.as_str());
        let view = UiSnapshot {
            playing,
            fading,
            muted: session.volume.is_muted(),
            output_volume,
            loop_mode: session.cursor.loop_mode(),
            navigable: session.cursor.is_navigable(),
            track_name,
        };
        session.ui.render(&view);
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit_volume_changed(&mut self) {
        if let Some(session) = self.session.as_ref() {
            self.pending_events.push(EngineEvent::VolumeChanged {
                volume: session.volume.target(),
                muted: session.volume.is_muted(),
            });
        }
    }
}

impl std::fmt::Debug for BgmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgmEngine")
            .field("state", &self.state())
            .field("playing", &self.playing)
            .field("gate", &self.gate.state())
            .field("equalizer", self.equalizer.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::HeadlessGate;
    use crate::output::DummyOutput;
    use crate::persistence::MemoryStore;

    fn engine() -> BgmEngine {
        BgmEngine::new(
            Box::new(DummyOutput::new()),
            Box::new(HeadlessGate),
            Box::new(MemoryStore::new()),
        )
    }

    fn attempt(engine: &BgmEngine) -> PlayAttemptId {
        engine.pending_play.map(|p| p.id).unwrap()
    }

    #[test]
    fn init_attaches_and_requests_autoplay() {
        let mut engine = engine();
        engine.init(EngineConfig::from_source("bgm/theme.mp3"), UiBindings::none());

        assert_eq!(engine.current_track().unwrap().display_name, "theme");
        assert_eq!(engine.output_volume(), 0.0);
        assert_eq!(attempt(&engine), PlayAttemptId(1));
        assert!(!engine.is_playing());
    }

    #[test]
    fn invalid_config_stays_idle() {
        let mut engine = engine();
        engine.init(EngineConfig::default(), UiBindings::none());

        assert!(engine.playlist().is_none());
        assert!(engine.pending_play.is_none());
        engine.dispatch(Command::Next);
        engine.dispatch(Command::SetVolume { volume: 0.5 });
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn started_autoplay_fades_in() {
        let mut engine = engine();
        engine.init(EngineConfig::from_source("a.mp3"), UiBindings::none());
        let id = attempt(&engine);

        engine.handle_play_result(id, PlayOutcome::Started);
        assert!(engine.is_playing());
        assert!(engine.state().fading);
        assert!(engine.state().unlocked);

        assert!(engine.on_frame(0.0));
        assert!(!engine.on_frame(5000.0));
        assert_eq!(engine.output_volume(), 0.55);
        assert!(!engine.state().fading);
    }

    #[test]
    fn stale_outcomes_are_ignored() {
        let mut engine = engine();
        engine.init(EngineConfig::from_source("a.mp3"), UiBindings::none());

        engine.handle_play_result(PlayAttemptId(99), PlayOutcome::Started);
        assert!(!engine.is_playing());
        assert!(!engine.state().unlocked);
    }

    #[test]
    fn loop_mode_change_keeps_fade() {
        let mut engine = engine();
        engine.init(EngineConfig::from_source("a.mp3"), UiBindings::none());
        let id = attempt(&engine);
        engine.handle_play_result(id, PlayOutcome::Started);

        engine.dispatch(Command::CycleLoopMode);
        assert_eq!(engine.state().loop_mode, LoopMode::One);
        assert!(engine.state().fading);
    }

    #[test]
    fn dispose_releases_session() {
        let mut engine = engine();
        engine.init(EngineConfig::from_source("a.mp3"), UiBindings::none());
        engine.dispose();

        assert!(engine.current_track().is_none());
        assert!(!engine.wants_frame());
    }
}
