//! Unlock gate overlay and window-level gesture listeners

use super::{describe, Bridge};
use crate::gate::{GatePrompt, GateSurface, Gesture};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, Window};

const OVERLAY_ID: &str = "audioGate";

const GESTURE_EVENTS: [&str; 2] = ["pointerdown", "keydown"];

const OVERLAY_STYLE: &str = "position:fixed; inset:0; z-index:200000; \
    display:grid; place-items:center; \
    background:rgba(0,0,0,.25); backdrop-filter:blur(6px);";

const CARD_STYLE: &str = "padding:14px 16px; border-radius:16px; \
    background:rgba(0,0,0,.45); border:1px solid rgba(255,255,255,.2); \
    color:#fff; text-align:center; font:600 14px system-ui;";

/// Gate rendered into the page
pub struct DomGate {
    listener: Closure<dyn FnMut(Event)>,
    overlay: Option<Element>,
    armed: bool,
}

impl DomGate {
    pub(crate) fn new(bridge: &Rc<Bridge>) -> Self {
        let bridge = Rc::downgrade(bridge);
        let listener = Closure::new(move |event: Event| {
            let gesture = if event.type_() == "keydown" {
                Gesture::KeyDown
            } else {
                Gesture::PointerDown
            };
            if let Some(bridge) = bridge.upgrade() {
                bridge.with_engine(|engine| engine.handle_gesture(gesture));
            }
        });
        Self {
            listener,
            overlay: None,
            armed: false,
        }
    }

    fn set_listening(&mut self, window: &Window, listening: bool) {
        if self.armed == listening {
            return;
        }
        let callback = self.listener.as_ref().unchecked_ref();
        for name in GESTURE_EVENTS {
            let result = if listening {
                window.add_event_listener_with_callback_and_bool(name, callback, true)
            } else {
                window.remove_event_listener_with_callback_and_bool(name, callback, true)
            };
            if let Err(e) = result {
                warn!(event = name, error = %describe(&e), "Gate listener update failed");
            }
        }
        self.armed = listening;
    }

    fn render(document: &Document, prompt: &GatePrompt) -> Result<Element, JsValue> {
        if let Some(existing) = document.get_element_by_id(OVERLAY_ID) {
            return Ok(existing);
        }

        let overlay = document.create_element("div")?;
        overlay.set_id(OVERLAY_ID);
        overlay.set_attribute("style", OVERLAY_STYLE)?;

        let card = document.create_element("div")?;
        card.set_attribute("style", CARD_STYLE)?;

        let title = document.create_element("div")?;
        title.set_attribute("style", "font-size:16px;font-weight:900")?;
        title.set_text_content(Some(&prompt.title));
        card.append_child(&title)?;

        if let Some(text) = &prompt.subtitle {
            let subtitle = document.create_element("div")?;
            subtitle.set_attribute("style", "opacity:.85")?;
            subtitle.set_text_content(Some(text));
            card.append_child(&subtitle)?;
        }

        overlay.append_child(&card)?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&overlay)?;
        Ok(overlay)
    }
}

impl GateSurface for DomGate {
    fn show(&mut self, prompt: &GatePrompt) {
        let Some(window) = web_sys::window() else {
            return;
        };
        self.set_listening(&window, true);

        if !prompt.render_overlay || self.overlay.is_some() {
            return;
        }
        let Some(document) = window.document() else {
            return;
        };
        match Self::render(&document, prompt) {
            Ok(overlay) => self.overlay = Some(overlay),
            Err(e) => warn!(error = %describe(&e), "Failed to render gate overlay"),
        }
    }

    fn hide(&mut self) {
        if let Some(window) = web_sys::window() {
            self.set_listening(&window, false);
        }
        if let Some(overlay) = self.overlay.take() {
            overlay.remove();
        }
    }
}

impl Drop for DomGate {
    fn drop(&mut self) {
        self.hide();
    }
}
