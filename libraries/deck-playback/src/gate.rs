//! Autoplay unlock gate
//!
//! When the host refuses to start audio without a user gesture, a prompt is
//! shown and the next pointer-down or key-down anywhere in the page counts as
//! the unlock gesture. The gate is a two-state machine: showing it twice is a
//! no-op, and only the first gesture while it is shown triggers the unlock.

use serde::Serialize;

/// Default prompt title
pub const DEFAULT_GATE_TITLE: &str = "Tap to enable BGM";

/// Default prompt subtitle
pub const DEFAULT_GATE_SUBTITLE: &str = "คลิกหนึ่งครั้งเพื่อเปิดเสียง";

/// User gesture observed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    PointerDown,
    KeyDown,
}

/// What the surface should display while the gate is up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePrompt {
    pub title: String,
    pub subtitle: Option<String>,

    /// When false the surface only listens for gestures and draws nothing
    pub render_overlay: bool,
}

impl Default for GatePrompt {
    fn default() -> Self {
        Self {
            title: DEFAULT_GATE_TITLE.to_string(),
            subtitle: Some(DEFAULT_GATE_SUBTITLE.to_string()),
            render_overlay: true,
        }
    }
}

/// Host side of the gate: overlay plus global gesture listeners
pub trait GateSurface {
    /// Display the prompt and start listening for gestures
    fn show(&mut self, prompt: &GatePrompt);

    /// Remove the prompt and stop listening
    fn hide(&mut self);
}

/// Surface that renders nothing; gestures still reach the engine through
/// its gesture handler
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessGate;

impl GateSurface for HeadlessGate {
    fn show(&mut self, _prompt: &GatePrompt) {}

    fn hide(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Hidden,
    Shown,
}

/// Gate state machine
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlockGate {
    state: GateState,
}

impl UnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        self.state == GateState::Shown
    }

    /// Move to `Shown`; returns true only on the transition
    pub fn ensure_shown(&mut self) -> bool {
        if self.state == GateState::Shown {
            return false;
        }
        self.state = GateState::Shown;
        true
    }

    /// Move to `Hidden`; returns true only on the transition
    pub fn hide(&mut self) -> bool {
        if self.state == GateState::Hidden {
            return false;
        }
        self.state = GateState::Hidden;
        true
    }

    /// Feed a gesture; returns true when it is the unlocking gesture
    ///
    /// The gate hides itself on that gesture, so later gestures are ignored.
    pub fn on_gesture(&mut self, _gesture: Gesture) -> bool {
        self.hide()
    }
}
