//! DOM controls
//!
//! Views render engine state into elements. [`DomControls`] wires the
//! elements' clicks and slider input back into the engine as commands and
//! removes those listeners when dropped.

use super::{describe, Bridge};
use crate::{
    events::Command,
    numeric::parse_number,
    ui::{ButtonView, LabelView, SliderView, UiBindings},
};
use js_sys::Reflect;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventInit, EventTarget, HtmlInputElement};

/// Button (any element; `disabled` is set as an attribute)
pub struct DomButton(Element);

impl DomButton {
    pub fn new(element: Element) -> Self {
        Self(element)
    }
}

impl ButtonView for DomButton {
    fn set_label(&mut self, label: &str) {
        self.0.set_text_content(Some(label));
    }

    fn set_enabled(&mut self, enabled: bool) {
        let result = if enabled {
            self.0.remove_attribute("disabled")
        } else {
            self.0.set_attribute("disabled", "")
        };
        if let Err(e) = result {
            warn!(error = %describe(&e), "Failed to toggle button");
        }
    }
}

/// `<input type="range">`
///
/// Every programmatic write is followed by synthetic `input` and `change`
/// events so other page scripts see the new value. Those events are
/// untrusted, which is how the engine's own listener skips them.
pub struct DomSlider(HtmlInputElement);

impl DomSlider {
    pub fn new(element: HtmlInputElement) -> Self {
        Self(element)
    }

    fn notify(&self, name: &str) {
        let init = EventInit::new();
        init.set_bubbles(true);
        match Event::new_with_event_init_dict(name, &init) {
            Ok(event) => {
                if let Err(e) = self.0.dispatch_event(&event) {
                    warn!(event = name, error = %describe(&e), "Slider event dispatch failed");
                }
            }
            Err(e) => warn!(event = name, error = %describe(&e), "Failed to create slider event"),
        }
    }
}

impl SliderView for DomSlider {
    fn set_value(&mut self, value: f32) {
        self.0.set_value(&value.to_string());
        self.notify("input");
        self.notify("change");
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.0.set_disabled(!enabled);
    }
}

/// Text element
pub struct DomLabel(Element);

impl DomLabel {
    pub fn new(element: Element) -> Self {
        Self(element)
    }
}

impl LabelView for DomLabel {
    fn set_text(&mut self, text: &str) {
        self.0.set_text_content(Some(text));
    }
}

/// Registered DOM listeners of one `init`
#[derive(Default)]
pub(crate) struct DomControls {
    listeners: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
}

impl DomControls {
    fn listen(
        &mut self,
        bridge: &Rc<Bridge>,
        target: &EventTarget,
        name: &'static str,
        to_command: impl Fn(&Event) -> Option<Command> + 'static,
    ) {
        let weak = Rc::downgrade(bridge);
        let closure = Closure::new(move |event: Event| {
            let Some(command) = to_command(&event) else {
                return;
            };
            if let Some(bridge) = weak.upgrade() {
                bridge.with_engine(|engine| engine.dispatch(command));
            }
        });
        match target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
            Ok(()) => self.listeners.push((target.clone(), name, closure)),
            Err(e) => warn!(event = name, error = %describe(&e), "Failed to bind control"),
        }
    }

    fn click(&mut self, bridge: &Rc<Bridge>, element: &Element, command: Command) {
        self.listen(bridge, element, "click", move |_| Some(command));
    }
}

impl Drop for DomControls {
    fn drop(&mut self) {
        for (target, name, closure) in self.listeners.drain(..) {
            let _ = target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

/// Value of a user-driven slider event; synthetic events yield `None`
fn slider_value(event: &Event) -> Option<f64> {
    if !event.is_trusted() {
        return None;
    }
    let input = event.current_target()?.dyn_into::<HtmlInputElement>().ok()?;
    parse_number(&input.value())
}

fn element_property(ui: &JsValue, name: &str) -> Option<Element> {
    Reflect::get(ui, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Element>()
        .ok()
}

/// Build bindings and listeners from a JS object of optional elements
///
/// Recognised properties: `playButton`, `muteButton`, `volumeSlider`,
/// `volumeDownButton`, `volumeUpButton`, `prevTrackButton`,
/// `nextTrackButton`, `loopButton`, `trackNameLabel`, `equalizerRoot`.
pub(crate) fn bind(ui: &JsValue, bridge: &Rc<Bridge>) -> (UiBindings, DomControls) {
    let mut bindings = UiBindings::none();
    let mut controls = DomControls::default();
    if ui.is_undefined() || ui.is_null() {
        return (bindings, controls);
    }

    let buttons: [(&str, Command, &mut Option<Box<dyn ButtonView>>); 7] = [
        ("playButton", Command::TogglePlay, &mut bindings.play_button),
        ("muteButton", Command::ToggleMute, &mut bindings.mute_button),
        ("volumeDownButton", Command::VolumeDown, &mut bindings.volume_down_button),
        ("volumeUpButton", Command::VolumeUp, &mut bindings.volume_up_button),
        ("prevTrackButton", Command::Prev, &mut bindings.prev_track_button),
        ("nextTrackButton", Command::Next, &mut bindings.next_track_button),
        ("loopButton", Command::CycleLoopMode, &mut bindings.loop_button),
    ];
    for (name, command, slot) in buttons {
        if let Some(element) = element_property(ui, name) {
            controls.click(bridge, &element, command);
            *slot = Some(Box::new(DomButton::new(element)));
        }
    }

    if let Some(slider) =
        element_property(ui, "volumeSlider").and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
    {
        controls.listen(bridge, &slider, "input", |event| {
            slider_value(event).map(|v| Command::SetVolume { volume: v as f32 })
        });
        bindings.volume_slider = Some(Box::new(DomSlider::new(slider)));
    }

    if let Some(label) = element_property(ui, "trackNameLabel") {
        bindings.track_name_label = Some(Box::new(DomLabel::new(label)));
    }

    if let Some(root) = element_property(ui, "equalizerRoot") {
        match root.query_selector_all("input[type=range]") {
            Ok(list) => {
                for index in 0..list.length() {
                    let Some(slider) = list
                        .item(index)
                        .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
                    else {
                        continue;
                    };
                    let band = bindings.equalizer_sliders.len();
                    controls.listen(bridge, &slider, "input", move |event| {
                        slider_value(event).map(|gain| Command::SetEqualizerGain {
                            band,
                            gain_db: gain as f32,
                        })
                    });
                    bindings
                        .equalizer_sliders
                        .push(Box::new(DomSlider::new(slider)));
                }
            }
            Err(e) => warn!(error = %describe(&e), "Failed to query equalizer sliders"),
        }
    }

    debug!(?bindings, "Bound DOM controls");
    (bindings, controls)
}
