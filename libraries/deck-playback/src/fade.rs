//! Frame-driven volume fades
//!
//! A single fade slot moves the output volume from a start level to a target
//! over a duration, eased by a [`FadeCurve`]. The host drives it with frame
//! timestamps; the first frame a fade sees becomes its start time, so a fade
//! always begins exactly at its `from` level no matter how late the first
//! frame arrives.
//!
//! Cancelling only marks the slot aborted. The next frame retires it without
//! touching the volume, which leaves whatever level the caller set in place.

use crate::numeric::{clamp, finite_or};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fade duration when none (or garbage) is configured
pub const DEFAULT_FADE_MS: f64 = 2000.0;

/// Shortest allowed fade
pub const MIN_FADE_MS: f64 = 200.0;

/// Longest allowed fade
pub const MAX_FADE_MS: f64 = 12000.0;

/// Clamp a configured duration into `[MIN_FADE_MS, MAX_FADE_MS]`
pub fn normalize_duration_ms(duration_ms: Option<f64>) -> f64 {
    let ms = finite_or(duration_ms.unwrap_or(DEFAULT_FADE_MS), DEFAULT_FADE_MS);
    clamp(ms, MIN_FADE_MS, MAX_FADE_MS)
}

/// Easing applied to fade progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeCurve {
    /// `p² (3 − 2p)`: slow start, slow end
    #[default]
    SmoothStep,

    /// Straight line
    Linear,
}

impl FadeCurve {
    /// Eased value for progress `p` in `[0, 1]`
    #[inline]
    pub fn ease(self, p: f32) -> f32 {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        match self {
            FadeCurve::SmoothStep => p * p * (3.0 - 2.0 * p),
            FadeCurve::Linear => p,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FadeCurve::SmoothStep => "smoothstep",
            FadeCurve::Linear => "linear",
        }
    }
}

impl fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FadeCurve {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smoothstep" | "smooth" => Ok(FadeCurve::SmoothStep),
            "linear" => Ok(FadeCurve::Linear),
            other => Err(format!("unknown fade curve: {other}")),
        }
    }
}

/// Identifies one started fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FadeToken(u64);

impl FadeToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Fade {
    token: FadeToken,
    from: f32,
    to: f32,
    duration_ms: f64,
    curve: FadeCurve,
    started_at: Option<f64>,
    aborted: bool,
}

impl Fade {
    fn progress(&self, now_ms: f64) -> f32 {
        let start = self.started_at.unwrap_or(now_ms);
        let elapsed = now_ms - start;
        clamp(elapsed / self.duration_ms, 0.0, 1.0) as f32
    }
}

/// Result of advancing the fade by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeTick {
    /// No fade in the slot
    Idle,

    /// A cancelled fade was retired; the volume must stay as it is
    Aborted { token: FadeToken },

    /// Fade still running; write this level
    Progress { volume: f32 },

    /// Fade reached its target; write this level and stop requesting frames
    Finished { token: FadeToken, volume: f32 },
}

/// Single-slot fade engine
#[derive(Debug, Default)]
pub struct FadeEngine {
    current: Option<Fade>,
    generation: u64,
}

impl FadeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fade, replacing whatever occupied the slot
    ///
    /// Levels are clamped to `[0, 1]` and the duration is normalized.
    pub fn start(&mut self, from: f32, to: f32, duration_ms: f64, curve: FadeCurve) -> FadeToken {
        self.generation = self.generation.wrapping_add(1);
        let token = FadeToken(self.generation);
        self.current = Some(Fade {
            token,
            from: crate::numeric::clamp01(from),
            to: crate::numeric::clamp01(to),
            duration_ms: normalize_duration_ms(Some(duration_ms)),
            curve,
            started_at: None,
            aborted: false,
        });
        token
    }

    /// Abort the running fade
    ///
    /// Returns true if a live fade was aborted by this call.
    pub fn cancel(&mut self) -> bool {
        match self.current.as_mut() {
            Some(fade) if !fade.aborted => {
                fade.aborted = true;
                true
            }
            _ => false,
        }
    }

    /// Drop the slot immediately (teardown)
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// A fade is running and owns the volume channel
    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|f| !f.aborted)
    }

    /// The slot still needs a frame (running or waiting to be retired)
    pub fn wants_frame(&self) -> bool {
        self.current.is_some()
    }

    /// Advance by one frame
    pub fn tick(&mut self, now_ms: f64) -> FadeTick {
        let Some(fade) = self.current.as_mut() else {
            return FadeTick::Idle;
        };

        if fade.aborted {
            let token = fade.token;
            self.current = None;
            return FadeTick::Aborted { token };
        }

        if fade.started_at.is_none() && now_ms.is_finite() {
            fade.started_at = Some(now_ms);
        }

        let p = fade.progress(now_ms);
        if p >= 1.0 {
            let (token, volume) = (fade.token, fade.to);
            self.current = None;
            return FadeTick::Finished { token, volume };
        }

        let volume = fade.from + (fade.to - fade.from) * fade.curve.ease(p);
        FadeTick::Progress { volume }
    }
}
