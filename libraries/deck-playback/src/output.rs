//! Audio output device seam
//!
//! The engine never decodes audio. It drives a single output element through
//! this trait: pick a source, start and pause it, and read or write its
//! volume, mute flag and native loop flag.
//!
//! Starting playback is asynchronous. [`AudioOutput::play`] only begins an
//! attempt tagged with a [`PlayAttemptId`]; the host reports the outcome later
//! through the engine's `handle_play_result`. Device notifications (`ended`,
//! `playing`, `paused`) arrive through `handle_device_event`.

use crate::{equalizer::EqBand, error::GraphError};
use serde::Serialize;

/// Tag of one play attempt, monotonically increasing per engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PlayAttemptId(pub u64);

/// Outcome of a play attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Audio started
    Started,

    /// The host refused (autoplay policy, decode error, ...)
    Rejected { reason: String },
}

impl PlayOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Notification from the output device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceEvent {
    /// Current track reached its end (not fired while natively looping)
    Ended,

    /// Device started producing sound
    Playing,

    /// Device paused
    Paused,
}

/// Single-element audio output
pub trait AudioOutput {
    /// Select the media source; playback position restarts at zero
    fn set_source(&mut self, uri: &str);

    /// Release the current source
    fn detach(&mut self);

    /// Begin a play attempt; the outcome is reported asynchronously
    fn play(&mut self, attempt: PlayAttemptId);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Instantaneous volume (0.0-1.0)
    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Native single-track repeat
    fn set_looping(&mut self, looping: bool);

    /// Route the output through a chain of peaking/shelf filters
    ///
    /// Called at most once per output. Outputs without a processing graph
    /// keep the default.
    fn attach_equalizer(&mut self, _bands: &[EqBand]) -> Result<(), GraphError> {
        Err(GraphError::Unsupported)
    }

    /// Update one filter's gain in dB; only called after a successful attach
    fn set_equalizer_gain(&mut self, _band: usize, _gain_db: f32) {}
}

/// Minimal in-memory output for unit tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct DummyOutput {
    pub source: Option<String>,
    pub paused: bool,
    pub volume: f32,
    pub muted: bool,
    pub looping: bool,
    pub attempts: Vec<PlayAttemptId>,
}

#[cfg(test)]
impl DummyOutput {
    pub fn new() -> Self {
        Self {
            paused: true,
            volume: 1.0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl AudioOutput for DummyOutput {
    fn set_source(&mut self, uri: &str) {
        self.source = Some(uri.to_string());
        self.paused = true;
    }

    fn detach(&mut self) {
        self.source = None;
        self.paused = true;
    }

    fn play(&mut self, attempt: PlayAttemptId) {
        self.attempts.push(attempt);
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
}
