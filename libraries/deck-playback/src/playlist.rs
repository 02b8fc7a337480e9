//! Playlist position and loop policy
//!
//! Keeps the current index within `0..len` at all times. Navigation wraps in
//! both directions; with a single track it does nothing.
//!
//! ```text
//! loop = all   ended → next index (wrapping), keep playing
//! loop = one   ended → never seen (the device repeats natively)
//! loop = off   ended → stop
//! ```

use crate::types::LoopMode;

/// What to do when the device reports the end of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Switch to this index and keep playing
    Advance(usize),

    /// Stay on the track, stopped
    Stop,

    /// Nothing to do
    Ignore,
}

/// Position within a playlist plus the loop policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistState {
    index: usize,
    loop_mode: LoopMode,
    len: usize,
}

impl PlaylistState {
    /// Create a cursor; an out-of-range `index` falls back to 0
    pub fn new(len: usize, index: usize, loop_mode: LoopMode) -> Self {
        let len = len.max(1);
        Self {
            index: if index < len { index } else { 0 },
            loop_mode,
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true; a cursor always covers at least one track
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Advance the loop mode all → one → off → all
    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.cycled();
        self.loop_mode
    }

    /// Whether the device itself should repeat the track
    pub fn native_loop(&self) -> bool {
        self.loop_mode == LoopMode::One
    }

    pub fn is_navigable(&self) -> bool {
        self.len > 1
    }

    /// Move to the next track (wrapping); `None` when there is only one
    pub fn next(&mut self) -> Option<usize> {
        if !self.is_navigable() {
            return None;
        }
        self.index = (self.index + 1) % self.len;
        Some(self.index)
    }

    /// Move to the previous track (wrapping); `None` when there is only one
    pub fn prev(&mut self) -> Option<usize> {
        if !self.is_navigable() {
            return None;
        }
        self.index = (self.index + self.len - 1) % self.len;
        Some(self.index)
    }

    /// Decide what the end of the current track means
    pub fn on_track_ended(&mut self) -> EndAction {
        match self.loop_mode {
            LoopMode::One => EndAction::Ignore,
            LoopMode::Off => EndAction::Stop,
            LoopMode::All => {
                self.index = (self.index + 1) % self.len;
                EndAction::Advance(self.index)
            }
        }
    }
}
