//! Target volume and mute state
//!
//! The target is the level a fade converges to and the level that gets
//! persisted. Mute is a separate switch on the channel: toggling it never
//! touches the target, and the instantaneous output volume lives on the
//! device, not here.

use crate::numeric::clamp01;

/// Default target volume when nothing is configured or persisted
pub const DEFAULT_TARGET_VOLUME: f32 = 0.55;

/// Amount moved by the volume up/down buttons
pub const VOLUME_STEP: f32 = 0.05;

/// Volume channel record (target level + mute switch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Target level (0.0-1.0)
    target: f32,

    /// Mute state (preserves target level)
    muted: bool,
}

impl Volume {
    /// Create a channel record, clamping the target into `[0, 1]`
    pub fn new(target: f32, muted: bool) -> Self {
        Self {
            target: clamp01(target),
            muted,
        }
    }

    /// Set target level (clamped)
    pub fn set_target(&mut self, target: f32) {
        self.target = clamp01(target);
    }

    /// Current target level
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Mute (target preserved)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute (target preserved)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle mute state, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_VOLUME, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::default();
        assert_eq!(vol.target(), DEFAULT_TARGET_VOLUME);
        assert!(!vol.is_muted());
    }

    #[test]
    fn target_is_clamped() {
        let mut vol = Volume::new(1.7, false);
        assert_eq!(vol.target(), 1.0);

        vol.set_target(-0.2);
        assert_eq!(vol.target(), 0.0);

        vol.set_target(f32::NAN);
        assert_eq!(vol.target(), 0.0);
    }

    #[test]
    fn mute_preserves_target() {
        let mut vol = Volume::new(0.8, false);

        vol.mute();
        assert!(vol.is_muted());
        assert_eq!(vol.target(), 0.8);

        vol.unmute();
        assert!(!vol.is_muted());
        assert_eq!(vol.target(), 0.8);
    }

    #[test]
    fn toggle_mute_reports_new_state() {
        let mut vol = Volume::new(0.8, false);
        assert!(vol.toggle_mute());
        assert!(!vol.toggle_mute());
        assert_eq!(vol.target(), 0.8);
    }
}
