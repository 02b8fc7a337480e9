//! Shared fakes for the integration tests
//!
//! Every fake keeps its state behind `Rc<RefCell<..>>` so a test can inspect
//! it after handing the fake to the engine.

#![allow(dead_code)]

use deck_playback::{
    AudioOutput, BgmEngine, ButtonView, EngineConfig, EngineEvent, EqBand, GatePrompt,
    GateSurface, GraphError, LabelView, MemoryStore, PlayAttemptId, PlayOutcome, SliderView,
    UiBindings,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once (`RUST_LOG=deck_playback=debug` to see logs)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ===== Output =====

#[derive(Debug)]
pub struct OutputState {
    pub source: Option<String>,
    pub sources: Vec<String>,
    pub paused: bool,
    pub volume: f32,
    pub muted: bool,
    pub looping: bool,
    pub attempts: Vec<PlayAttemptId>,
    pub pause_calls: usize,
    pub detach_calls: usize,
    pub equalizer_supported: bool,
    pub equalizer_connects: usize,
    pub equalizer_bands: Vec<EqBand>,
    pub equalizer_gains: Vec<(usize, f32)>,
}

impl Default for OutputState {
    fn default() -> Self {
        Self {
            source: None,
            sources: Vec::new(),
            paused: true,
            volume: 1.0,
            muted: false,
            looping: false,
            attempts: Vec::new(),
            pause_calls: 0,
            detach_calls: 0,
            equalizer_supported: true,
            equalizer_connects: 0,
            equalizer_bands: Vec::new(),
            equalizer_gains: Vec::new(),
        }
    }
}

/// Audio element stand-in; play attempts are settled by the test
pub struct FakeOutput(pub Rc<RefCell<OutputState>>);

impl AudioOutput for FakeOutput {
    fn set_source(&mut self, uri: &str) {
        let mut state = self.0.borrow_mut();
        state.source = Some(uri.to_string());
        state.sources.push(uri.to_string());
        state.paused = true;
    }

    fn detach(&mut self) {
        let mut state = self.0.borrow_mut();
        state.source = None;
        state.paused = true;
        state.detach_calls += 1;
    }

    fn play(&mut self, attempt: PlayAttemptId) {
        self.0.borrow_mut().attempts.push(attempt);
    }

    fn pause(&mut self) {
        let mut state = self.0.borrow_mut();
        state.paused = true;
        state.pause_calls += 1;
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn volume(&self) -> f32 {
        self.0.borrow().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.0.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.borrow_mut().muted = muted;
    }

    fn set_looping(&mut self, looping: bool) {
        self.0.borrow_mut().looping = looping;
    }

    fn attach_equalizer(&mut self, bands: &[EqBand]) -> Result<(), GraphError> {
        let mut state = self.0.borrow_mut();
        if !state.equalizer_supported {
            return Err(GraphError::Capture("media element already captured".into()));
        }
        state.equalizer_connects += 1;
        if state.equalizer_connects > 1 {
            return Err(GraphError::AlreadyConnected);
        }
        state.equalizer_bands = bands.to_vec();
        Ok(())
    }

    fn set_equalizer_gain(&mut self, band: usize, gain_db: f32) {
        self.0.borrow_mut().equalizer_gains.push((band, gain_db));
    }
}

// ===== Gate =====

#[derive(Debug, Default)]
pub struct GateLog {
    pub shown: Vec<GatePrompt>,
    pub hides: usize,
    pub visible: bool,
}

pub struct FakeGate(pub Rc<RefCell<GateLog>>);

impl GateSurface for FakeGate {
    fn show(&mut self, prompt: &GatePrompt) {
        let mut log = self.0.borrow_mut();
        log.shown.push(prompt.clone());
        log.visible = true;
    }

    fn hide(&mut self) {
        let mut log = self.0.borrow_mut();
        log.hides += 1;
        log.visible = false;
    }
}

// ===== UI =====

#[derive(Debug, Default)]
pub struct ButtonState {
    pub label: String,
    pub enabled: Option<bool>,
}

pub struct FakeButton(pub Rc<RefCell<ButtonState>>);

impl ButtonView for FakeButton {
    fn set_label(&mut self, label: &str) {
        self.0.borrow_mut().label = label.to_string();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().enabled = Some(enabled);
    }
}

#[derive(Debug, Default)]
pub struct SliderState {
    pub value: f32,
    pub writes: Vec<f32>,
    pub enabled: Option<bool>,
}

pub struct FakeSlider(pub Rc<RefCell<SliderState>>);

impl SliderView for FakeSlider {
    fn set_value(&mut self, value: f32) {
        let mut state = self.0.borrow_mut();
        state.value = value;
        state.writes.push(value);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().enabled = Some(enabled);
    }
}

pub struct FakeLabel(pub Rc<RefCell<String>>);

impl LabelView for FakeLabel {
    fn set_text(&mut self, text: &str) {
        *self.0.borrow_mut() = text.to_string();
    }
}

/// Handles to a full set of bound controls
#[derive(Default)]
pub struct UiProbe {
    pub play: Rc<RefCell<ButtonState>>,
    pub mute: Rc<RefCell<ButtonState>>,
    pub volume: Rc<RefCell<SliderState>>,
    pub volume_down: Rc<RefCell<ButtonState>>,
    pub volume_up: Rc<RefCell<ButtonState>>,
    pub prev: Rc<RefCell<ButtonState>>,
    pub next: Rc<RefCell<ButtonState>>,
    pub loop_mode: Rc<RefCell<ButtonState>>,
    pub track_name: Rc<RefCell<String>>,
    pub equalizer: Vec<Rc<RefCell<SliderState>>>,
}

impl UiProbe {
    pub fn with_equalizer(bands: usize) -> Self {
        Self {
            equalizer: (0..bands).map(|_| Rc::default()).collect(),
            ..Default::default()
        }
    }

    pub fn bindings(&self) -> UiBindings {
        UiBindings {
            play_button: Some(Box::new(FakeButton(self.play.clone()))),
            mute_button: Some(Box::new(FakeButton(self.mute.clone()))),
            volume_slider: Some(Box::new(FakeSlider(self.volume.clone()))),
            volume_down_button: Some(Box::new(FakeButton(self.volume_down.clone()))),
            volume_up_button: Some(Box::new(FakeButton(self.volume_up.clone()))),
            prev_track_button: Some(Box::new(FakeButton(self.prev.clone()))),
            next_track_button: Some(Box::new(FakeButton(self.next.clone()))),
            loop_button: Some(Box::new(FakeButton(self.loop_mode.clone()))),
            track_name_label: Some(Box::new(FakeLabel(self.track_name.clone()))),
            equalizer_sliders: self
                .equalizer
                .iter()
                .map(|s| Box::new(FakeSlider(s.clone())) as Box<dyn SliderView>)
                .collect(),
        }
    }
}

// ===== Harness =====

/// Engine plus handles to all of its fakes
pub struct Harness {
    pub engine: BgmEngine,
    pub output: Rc<RefCell<OutputState>>,
    pub gate: Rc<RefCell<GateLog>>,
    pub store: MemoryStore,
    /// Frame clock in ms
    pub now: f64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        init_tracing();
        let output = Rc::new(RefCell::new(OutputState::default()));
        let gate = Rc::new(RefCell::new(GateLog::default()));
        let engine = BgmEngine::new(
            Box::new(FakeOutput(output.clone())),
            Box::new(FakeGate(gate.clone())),
            Box::new(store.clone()),
        );
        Self {
            engine,
            output,
            gate,
            store,
            now: 0.0,
        }
    }

    pub fn init(&mut self, config: EngineConfig) {
        self.engine.init(config, UiBindings::none());
    }

    pub fn init_with_ui(&mut self, config: EngineConfig, ui: &UiProbe) {
        self.engine.init(config, ui.bindings());
    }

    pub fn last_attempt(&self) -> PlayAttemptId {
        *self
            .output
            .borrow()
            .attempts
            .last()
            .expect("no play attempt was made")
    }

    pub fn attempt_count(&self) -> usize {
        self.output.borrow().attempts.len()
    }

    /// Settle the latest attempt as started (the element starts playing)
    pub fn start(&mut self) {
        let attempt = self.last_attempt();
        self.output.borrow_mut().paused = false;
        self.engine.handle_play_result(attempt, PlayOutcome::Started);
    }

    /// Settle the latest attempt as rejected
    pub fn reject(&mut self, reason: &str) {
        let attempt = self.last_attempt();
        self.engine
            .handle_play_result(attempt, PlayOutcome::rejected(reason));
    }

    /// Deliver one frame `step_ms` after the previous one
    pub fn frame(&mut self, step_ms: f64) -> bool {
        self.now += step_ms;
        self.engine.on_frame(self.now)
    }

    /// Deliver 16 ms frames until the engine stops asking; returns the
    /// output volume after each frame
    pub fn run_frames(&mut self) -> Vec<f32> {
        let mut volumes = Vec::new();
        for _ in 0..10_000 {
            let more = self.frame(16.0);
            volumes.push(self.output_volume());
            if !more {
                break;
            }
        }
        volumes
    }

    pub fn output_volume(&self) -> f32 {
        self.output.borrow().volume
    }

    pub fn events(&mut self) -> Vec<EngineEvent> {
        self.engine.drain_events()
    }
}

/// Count events matching a predicate
pub fn count(events: &[EngineEvent], pred: impl Fn(&EngineEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
