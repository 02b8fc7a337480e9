//! Deck Playback - background music for slide decks
//!
//! A small playback engine for presentation pages that play one looping
//! background track (or a short playlist) behind the slides.
//!
//! This crate provides:
//! - Autoplay with an unlock gate when the host blocks audio
//! - Smoothstep fade-in to a target volume, cancelled by any user action
//! - Playlist navigation and loop modes (all, one, off)
//! - Persistence of volume, mute, loop mode and track index
//! - Optional bound controls (buttons, sliders, track label)
//! - Optional six-band equalizer
//!
//! # Architecture
//!
//! The engine is host agnostic and single threaded. The output device, the
//! gate overlay, the storage backend and the UI controls are traits; the host
//! delivers play outcomes, device notifications, gestures and animation
//! frames. The `wasm` feature provides browser implementations of all of them
//! (`HTMLAudioElement`, Web Audio, `localStorage`, DOM controls and
//! `requestAnimationFrame`).
//!
//! # Example: Autoplay and fade-in
//!
//! ```rust
//! use deck_playback::{
//!     BgmEngine, EngineConfig, HeadlessGate, MemoryStore, UiBindings,
//!     AudioOutput, PlayAttemptId, PlayOutcome,
//! };
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Element {
//!     volume: f32,
//!     attempts: Vec<PlayAttemptId>,
//! }
//!
//! struct SharedOutput(Rc<RefCell<Element>>);
//!
//! impl AudioOutput for SharedOutput {
//!     fn set_source(&mut self, _uri: &str) {}
//!     fn detach(&mut self) {}
//!     fn play(&mut self, attempt: PlayAttemptId) {
//!         self.0.borrow_mut().attempts.push(attempt);
//!     }
//!     fn pause(&mut self) {}
//!     fn is_paused(&self) -> bool { false }
//!     fn volume(&self) -> f32 { self.0.borrow().volume }
//!     fn set_volume(&mut self, volume: f32) { self.0.borrow_mut().volume = volume; }
//!     fn is_muted(&self) -> bool { false }
//!     fn set_muted(&mut self, _muted: bool) {}
//!     fn set_looping(&mut self, _looping: bool) {}
//! }
//!
//! let element = Rc::new(RefCell::new(Element::default()));
//! let mut engine = BgmEngine::new(
//!     Box::new(SharedOutput(element.clone())),
//!     Box::new(HeadlessGate),
//!     Box::new(MemoryStore::new()),
//! );
//!
//! engine.init(EngineConfig::from_source("audio/theme.mp3"), UiBindings::none());
//!
//! // The host reports that the first play attempt started
//! let attempt = element.borrow().attempts[0];
//! engine.handle_play_result(attempt, PlayOutcome::Started);
//!
//! // Drive the fade with frame timestamps (ms)
//! let mut now = 0.0;
//! while engine.on_frame(now) {
//!     now += 16.0;
//! }
//! assert_eq!(element.borrow().volume, 0.55);
//! ```
//!
//! # Example: Options from JSON
//!
//! ```rust
//! use deck_playback::{EngineConfig, LoopMode};
//!
//! let config = EngineConfig::from_json(r#"{
//!     "playlist": ["bgm/intro.mp3", { "src": "bgm/loop.mp3", "title": "Main loop" }],
//!     "options": { "targetVolume": 0.4, "fadeMs": 3000, "loopMode": "one" }
//! }"#).unwrap();
//!
//! let options = config.options.resolve();
//! assert_eq!(options.loop_mode, LoopMode::One);
//! assert_eq!(options.fade_ms, 3000.0);
//! ```

mod engine;
pub mod equalizer;
mod error;
pub mod events;
pub mod fade;
pub mod gate;
pub mod numeric;
pub mod output;
pub mod persistence;
pub mod playlist;
pub mod types;
pub mod ui;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use engine::BgmEngine;
pub use equalizer::{EqBand, EqStatus, FilterType};
pub use error::{GraphError, PlaybackError, Result, StorageError};
pub use events::{Command, EngineEvent};
pub use fade::FadeCurve;
pub use gate::{GatePrompt, GateState, GateSurface, Gesture, HeadlessGate};
pub use output::{AudioOutput, DeviceEvent, PlayAttemptId, PlayOutcome};
pub use persistence::{KeyValueStore, MemoryStore, NoStore};
pub use types::{
    EngineConfig, EngineOptions, LoopMode, PlaybackState, Playlist, PlaylistEntry, Track,
};
pub use ui::{ButtonView, LabelView, SliderView, UiBindings};
pub use volume::{Volume, DEFAULT_TARGET_VOLUME, VOLUME_STEP};
