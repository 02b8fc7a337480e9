//! WASM bindings for deck-playback
//!
//! Browser implementations of the engine's seams:
//! - [`HtmlAudioOutput`]: an `<audio>` element, plus a Web Audio filter chain
//!   for the equalizer
//! - [`LocalStorage`]: `window.localStorage`
//! - [`DomGate`]: full-viewport overlay and capture-phase gesture listeners
//! - [`DomButton`], [`DomSlider`], [`DomLabel`]: bound controls
//!
//! and [`WasmBgmEngine`], the JavaScript-facing engine.
//!
//! Browser callbacks (promise settlements, media events, gestures, animation
//! frames) reach the engine through a shared [`Bridge`]. The bridge holds a
//! weak reference to the engine, so callbacks that fire after the engine is
//! freed are dropped.

mod engine;
mod gate;
mod output;
mod storage;
mod ui;

pub use engine::WasmBgmEngine;
pub use gate::DomGate;
pub use output::HtmlAudioOutput;
pub use storage::LocalStorage;
pub use ui::{DomButton, DomLabel, DomSlider};

use crate::{BgmEngine, EngineEvent};
use js_sys::{Function, Reflect};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Route from browser callbacks to the engine
#[derive(Default)]
pub(crate) struct Bridge {
    engine: RefCell<Weak<RefCell<BgmEngine>>>,

    // Animation frame loop
    frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    frame_scheduled: Cell<bool>,

    // JS event listener (push mode)
    on_event: RefCell<Option<Function>>,
}

impl Bridge {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn connect(&self, engine: &Rc<RefCell<BgmEngine>>) {
        *self.engine.borrow_mut() = Rc::downgrade(engine);
    }

    pub(crate) fn set_event_listener(&self, callback: Option<Function>) {
        *self.on_event.borrow_mut() = callback;
    }

    /// Run `f` against the engine, then flush events and schedule frames
    ///
    /// A callback that arrives while the engine is already borrowed (a
    /// synchronous re-entry from a DOM write) is dropped.
    pub(crate) fn with_engine<R>(
        self: &Rc<Self>,
        f: impl FnOnce(&mut BgmEngine) -> R,
    ) -> Option<R> {
        let engine = self.engine.borrow().upgrade()?;
        let Ok(mut guard) = engine.try_borrow_mut() else {
            warn!("Engine busy; dropping re-entrant browser callback");
            return None;
        };

        let result = f(&mut guard);
        let wants_frame = guard.wants_frame();
        let events = if self.on_event.borrow().is_some() {
            guard.drain_events()
        } else {
            Vec::new()
        };
        drop(guard);

        self.forward(events);
        if wants_frame {
            self.schedule_frame();
        }
        Some(result)
    }

    fn forward(&self, events: Vec<EngineEvent>) {
        let Some(callback) = self.on_event.borrow().clone() else {
            return;
        };
        for event in events {
            match serde_wasm_bindgen::to_value(&event) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        warn!(error = %describe(&e), "Event listener threw");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to convert engine event"),
            }
        }
    }

    fn schedule_frame(self: &Rc<Self>) {
        if self.frame_scheduled.get() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let mut slot = self.frame.borrow_mut();
        let callback = slot.get_or_insert_with(|| {
            let bridge = Rc::downgrade(self);
            Closure::new(move |now: f64| {
                if let Some(bridge) = bridge.upgrade() {
                    bridge.frame_scheduled.set(false);
                    bridge.with_engine(|engine| engine.on_frame(now));
                }
            })
        });

        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(_) => self.frame_scheduled.set(true),
            Err(e) => warn!(error = %describe(&e), "requestAnimationFrame failed"),
        }
    }
}

/// Human-readable text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name = String::from(error.name());
        let message = String::from(error.message());
        return if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        };
    }
    Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
