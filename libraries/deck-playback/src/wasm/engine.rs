//! JavaScript-facing engine

use super::{
    gate::DomGate,
    output::HtmlAudioOutput,
    storage::LocalStorage,
    ui::{bind, DomControls},
    Bridge,
};
use crate::{BgmEngine, Command, EngineConfig, LoopMode};
use js_sys::Function;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

/// WASM-compatible BGM engine
///
/// Wraps the core [`BgmEngine`] around an `<audio>` element.
///
/// ```js
/// const bgm = new WasmBgmEngine(document.querySelector("audio"));
/// bgm.init(
///   { playlist: ["bgm/intro.mp3", "bgm/loop.mp3"], options: { targetVolume: 0.5 } },
///   { playButton, muteButton, volumeSlider, trackNameLabel },
/// );
/// ```
#[wasm_bindgen]
pub struct WasmBgmEngine {
    inner: Rc<RefCell<BgmEngine>>,
    bridge: Rc<Bridge>,
    controls: Option<DomControls>,
}

#[wasm_bindgen]
impl WasmBgmEngine {
    /// Create an engine driving `audio`
    #[wasm_bindgen(constructor)]
    pub fn new(audio: HtmlAudioElement) -> Self {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let bridge = Bridge::new();
        let engine = BgmEngine::new(
            Box::new(HtmlAudioOutput::new(audio, &bridge)),
            Box::new(DomGate::new(&bridge)),
            Box::new(LocalStorage::new()),
        );
        let inner = Rc::new(RefCell::new(engine));
        bridge.connect(&inner);

        Self {
            inner,
            bridge,
            controls: None,
        }
    }

    // ===== Lifecycle =====

    /// Load a config (`{ source?, playlist?, options? }`) and bind controls
    ///
    /// A malformed config disables the controls instead of throwing.
    pub fn init(&mut self, config: JsValue, ui: JsValue) {
        let config = match serde_wasm_bindgen::from_value::<EngineConfig>(config) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Invalid BGM config");
                EngineConfig::default()
            }
        };

        // Old listeners go before the new ones are bound
        self.controls = None;
        let (bindings, controls) = bind(&ui, &self.bridge);
        self.controls = Some(controls);

        self.bridge
            .with_engine(move |engine| engine.init(config, bindings));
    }

    /// Stop playback, remove the gate and unbind controls
    pub fn dispose(&mut self) {
        self.controls = None;
        self.bridge.with_engine(BgmEngine::dispose);
    }

    // ===== Playback Control =====

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.send(Command::TogglePlay);
    }

    pub fn play(&self) {
        self.send(Command::Play);
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn next(&self) {
        self.send(Command::Next);
    }

    pub fn prev(&self) {
        self.send(Command::Prev);
    }

    // ===== Volume =====

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f32) {
        self.send(Command::SetVolume { volume });
    }

    #[wasm_bindgen(js_name = stepVolume)]
    pub fn step_volume(&self, delta: f32) {
        self.send(Command::StepVolume { delta });
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.send(Command::ToggleMute);
    }

    /// Fade to `target`, which becomes the new target volume
    #[wasm_bindgen(js_name = fadeTo)]
    pub fn fade_to(&self, target: f32, duration_ms: Option<f64>) {
        self.bridge
            .with_engine(|engine| engine.fade_to(target, duration_ms));
    }

    // ===== Loop / Equalizer =====

    #[wasm_bindgen(js_name = cycleLoopMode)]
    pub fn cycle_loop_mode(&self) {
        self.send(Command::CycleLoopMode);
    }

    /// Set the loop mode ("off" | "one" | "all"); anything else is ignored
    #[wasm_bindgen(js_name = setLoopMode)]
    pub fn set_loop_mode(&self, mode: &str) {
        match mode.parse::<LoopMode>() {
            Ok(mode) => self.send(Command::SetLoopMode { mode }),
            Err(e) => warn!(error = %e, "Ignoring loop mode"),
        }
    }

    #[wasm_bindgen(js_name = setEqualizerGain)]
    pub fn set_equalizer_gain(&self, band: usize, gain_db: f32) {
        self.send(Command::SetEqualizerGain { band, gain_db });
    }

    /// Dispatch a command object, e.g. `{ type: "setVolume", volume: 0.3 }`
    pub fn dispatch(&self, command: JsValue) {
        match serde_wasm_bindgen::from_value::<Command>(command) {
            Ok(command) => self.send(command),
            Err(e) => warn!(error = %e, "Ignoring malformed command"),
        }
    }

    // ===== State =====

    /// Snapshot `{ currentIndex, loopMode, targetVolume, muted, fading, unlocked }`
    pub fn state(&self) -> JsValue {
        let Ok(engine) = self.inner.try_borrow() else {
            return JsValue::NULL;
        };
        let state = engine.state();
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.try_borrow().is_ok_and(|engine| engine.is_playing())
    }

    /// `{ source, displayName }` of the attached track, or `null`
    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> JsValue {
        let Ok(engine) = self.inner.try_borrow() else {
            return JsValue::NULL;
        };
        let track = engine
            .current_track()
            .and_then(|track| serde_wasm_bindgen::to_value(track).ok());
        track.unwrap_or(JsValue::NULL)
    }

    // ===== Events =====

    /// Push every engine event to `callback`; pass `null` to go back to
    /// polling with `drainEvents`
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Option<Function>) {
        self.bridge.set_event_listener(callback);
    }

    /// Events queued since the last drain
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> JsValue {
        let events = self
            .inner
            .try_borrow_mut()
            .map(|mut engine| engine.drain_events())
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&events).unwrap_or(JsValue::NULL)
    }
}

impl WasmBgmEngine {
    fn send(&self, command: Command) {
        self.bridge.with_engine(|engine| engine.dispatch(command));
    }
}
