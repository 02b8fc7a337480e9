//! `<audio>` element output with an optional Web Audio equalizer

use super::{describe, Bridge};
use crate::{
    equalizer::{EqBand, FilterType},
    error::GraphError,
    output::{AudioOutput, DeviceEvent, PlayAttemptId, PlayOutcome},
};
use js_sys::Promise;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AudioContext, AudioNode, BiquadFilterNode, BiquadFilterType, Event, HtmlAudioElement,
    MediaElementAudioSourceNode,
};

const DEVICE_EVENTS: [&str; 3] = ["ended", "play", "pause"];

/// Web Audio graph: element source → biquad chain → destination
struct EqGraph {
    context: AudioContext,
    _source: MediaElementAudioSourceNode,
    filters: Vec<BiquadFilterNode>,
}

/// Handlers of one `play()` promise, kept alive until it settles
struct Settlement {
    settled: Rc<Cell<bool>>,
    on_started: Closure<dyn FnMut(JsValue)>,
    on_rejected: Closure<dyn FnMut(JsValue)>,
}

impl Settlement {
    fn new(bridge: &Weak<Bridge>, attempt: PlayAttemptId) -> Self {
        let settled = Rc::new(Cell::new(false));
        let on_started = {
            let (bridge, settled) = (bridge.clone(), settled.clone());
            Closure::new(move |_value: JsValue| {
                settled.set(true);
                report(&bridge, attempt, PlayOutcome::Started);
            })
        };
        let on_rejected = {
            let (bridge, settled) = (bridge.clone(), settled.clone());
            Closure::new(move |error: JsValue| {
                settled.set(true);
                report(&bridge, attempt, PlayOutcome::rejected(describe(&error)));
            })
        };
        Self {
            settled,
            on_started,
            on_rejected,
        }
    }
}

/// Output backed by an `HTMLAudioElement`
pub struct HtmlAudioOutput {
    element: HtmlAudioElement,
    bridge: Weak<Bridge>,

    // Handlers of play() promises that may still settle
    settlements: Vec<Settlement>,

    // ended / play / pause listener
    on_device_event: Closure<dyn FnMut(Event)>,

    graph: Option<EqGraph>,
}

impl HtmlAudioOutput {
    pub(crate) fn new(element: HtmlAudioElement, bridge: &Rc<Bridge>) -> Self {
        let on_device_event = {
            let bridge = Rc::downgrade(bridge);
            Closure::new(move |event: Event| {
                let device_event = match event.type_().as_str() {
                    "ended" => DeviceEvent::Ended,
                    "play" => DeviceEvent::Playing,
                    "pause" => DeviceEvent::Paused,
                    _ => return,
                };
                if let Some(bridge) = bridge.upgrade() {
                    bridge.with_engine(|engine| engine.handle_device_event(device_event));
                }
            })
        };

        for name in DEVICE_EVENTS {
            if let Err(e) = element
                .add_event_listener_with_callback(name, on_device_event.as_ref().unchecked_ref())
            {
                warn!(event = name, error = %describe(&e), "Failed to listen to audio element");
            }
        }

        Self {
            element,
            bridge: Rc::downgrade(bridge),
            settlements: Vec::new(),
            on_device_event,
            graph: None,
        }
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    /// Report the outcome of `promise` as the outcome of `attempt`
    fn settle(&mut self, promise: &Promise, attempt: PlayAttemptId) {
        self.settlements.retain(|s| !s.settled.get());

        let settlement = Settlement::new(&self.bridge, attempt);
        let _ = promise.then2(&settlement.on_started, &settlement.on_rejected);
        self.settlements.push(settlement);
    }

    fn build_graph(&self, bands: &[EqBand]) -> Result<EqGraph, JsValue> {
        let context = AudioContext::new()?;
        let source = context.create_media_element_source(&self.element)?;

        let mut filters = Vec::with_capacity(bands.len());
        let mut previous = AudioNode::from(source.clone());
        for band in bands {
            let filter = context.create_biquad_filter()?;
            filter.set_type(match band.filter_type() {
                FilterType::LowShelf => BiquadFilterType::Lowshelf,
                FilterType::Peaking => BiquadFilterType::Peaking,
                FilterType::HighShelf => BiquadFilterType::Highshelf,
            });
            filter.frequency().set_value(band.frequency);
            filter.q().set_value(band.q());
            filter.gain().set_value(band.gain_db());

            previous.connect_with_audio_node(&filter)?;
            previous = AudioNode::from(filter.clone());
            filters.push(filter);
        }
        previous.connect_with_audio_node(&context.destination())?;

        Ok(EqGraph {
            context,
            _source: source,
            filters,
        })
    }
}

fn report(bridge: &Weak<Bridge>, attempt: PlayAttemptId, outcome: PlayOutcome) {
    if let Some(bridge) = bridge.upgrade() {
        bridge.with_engine(|engine| engine.handle_play_result(attempt, outcome));
    }
}

impl AudioOutput for HtmlAudioOutput {
    fn set_source(&mut self, uri: &str) {
        self.element.set_src(uri);
    }

    fn detach(&mut self) {
        if let Err(e) = self.element.remove_attribute("src") {
            warn!(error = %describe(&e), "Failed to clear audio source");
        }
        self.element.load();
    }

    fn play(&mut self, attempt: PlayAttemptId) {
        if let Some(graph) = &self.graph {
            // A context created before the first gesture starts suspended
            if let Err(e) = graph.context.resume() {
                debug!(error = %describe(&e), "AudioContext resume failed");
            }
        }

        // Older engines throw instead of returning a rejected promise
        let promise = self.element.play().unwrap_or_else(|e| Promise::reject(&e));
        self.settle(&promise, attempt);
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            warn!(error = %describe(&e), "pause() failed");
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn volume(&self) -> f32 {
        self.element.volume() as f32
    }

    fn set_volume(&mut self, volume: f32) {
        self.element.set_volume(f64::from(volume));
    }

    fn is_muted(&self) -> bool {
        self.element.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn set_looping(&mut self, looping: bool) {
        self.element.set_loop(looping);
    }

    fn attach_equalizer(&mut self, bands: &[EqBand]) -> Result<(), GraphError> {
        if self.graph.is_some() {
            return Err(GraphError::AlreadyConnected);
        }
        let graph = self
            .build_graph(bands)
            .map_err(|e| GraphError::Capture(describe(&e)))?;
        debug!(bands = graph.filters.len(), "Equalizer graph connected");
        self.graph = Some(graph);
        Ok(())
    }

    fn set_equalizer_gain(&mut self, band: usize, gain_db: f32) {
        if let Some(filter) = self.graph.as_ref().and_then(|g| g.filters.get(band)) {
            filter.gain().set_value(gain_db);
        }
    }
}

impl Drop for HtmlAudioOutput {
    fn drop(&mut self) {
        for name in DEVICE_EVENTS {
            let _ = self.element.remove_event_listener_with_callback(
                name,
                self.on_device_event.as_ref().unchecked_ref(),
            );
        }
    }
}
