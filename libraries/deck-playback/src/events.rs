//! Engine commands and events
//!
//! Commands are user intents coming from bound controls or host code.
//! Events are queued by the engine at each transition and drained by the host
//! (for logging, analytics, or driving a UI the engine does not own).

use crate::types::LoopMode;
use serde::{Deserialize, Serialize};

/// User intent dispatched into the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Play button: play when paused, pause when playing
    TogglePlay,

    Play,

    Pause,

    ToggleMute,

    /// Set the volume (0.0-1.0, clamped; NaN keeps the current level)
    SetVolume { volume: f32 },

    /// Move the volume by a signed amount
    StepVolume { delta: f32 },

    /// Volume up button (+0.05)
    VolumeUp,

    /// Volume down button (−0.05)
    VolumeDown,

    Next,

    Prev,

    /// Loop button: all → one → off → all
    CycleLoopMode,

    SetLoopMode { mode: LoopMode },

    /// Equalizer slider moved (gain clamped to ±12 dB)
    #[serde(rename_all = "camelCase")]
    SetEqualizerGain { band: usize, gain_db: f32 },
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// Transport changed
    StateChanged { playing: bool },

    /// Another track was attached
    #[serde(rename_all = "camelCase")]
    TrackChanged {
        index: usize,
        previous_index: Option<usize>,
        name: String,
    },

    /// Target volume or mute changed
    VolumeChanged { volume: f32, muted: bool },

    #[serde(rename_all = "camelCase")]
    LoopModeChanged { loop_mode: LoopMode },

    /// Fade toward `target` started
    #[serde(rename_all = "camelCase")]
    FadeStarted { target: f32, duration_ms: f64 },

    FadeCompleted { volume: f32 },

    FadeCancelled,

    /// Autoplay was refused; waiting for a gesture
    GateShown,

    GateHidden,

    /// First successful play of this engine
    Unlocked,

    /// The host refused a play attempt
    PlayRejected { reason: String },

    /// The equalizer could not be connected
    EqualizerUnavailable { reason: String },
}
