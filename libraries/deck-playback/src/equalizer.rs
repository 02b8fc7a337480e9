//! Six-band equalizer
//!
//! A fixed filter chain (low shelf, four peaking bands, high shelf) that the
//! output inserts between its media element and the final destination. The
//! chain can be connected to an output only once, so the attach result is
//! memoized for the lifetime of the engine. Gains are not persisted.

use crate::error::GraphError;
use serde::Serialize;
use tracing::{debug, warn};

/// Number of equalizer bands
pub const EQ_BAND_COUNT: usize = 6;

/// Gain limit in dB, applied symmetrically
pub const MAX_EQ_GAIN_DB: f32 = 12.0;

/// Q used by the peaking bands
pub const PEAKING_Q: f32 = 1.0;

/// Q used by the shelves (Butterworth)
pub const SHELF_Q: f32 = 0.707;

/// Filter type of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Boosts/cuts below the frequency
    LowShelf,
    /// Boosts/cuts around the frequency
    #[default]
    Peaking,
    /// Boosts/cuts above the frequency
    HighShelf,
}

/// One band of the chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EqBand {
    /// Center/corner frequency in Hz
    pub frequency: f32,
    gain_db: f32,
    q: f32,
    filter_type: FilterType,
}

impl EqBand {
    pub fn low_shelf(frequency: f32) -> Self {
        Self {
            frequency,
            gain_db: 0.0,
            q: SHELF_Q,
            filter_type: FilterType::LowShelf,
        }
    }

    pub fn peaking(frequency: f32) -> Self {
        Self {
            frequency,
            gain_db: 0.0,
            q: PEAKING_Q,
            filter_type: FilterType::Peaking,
        }
    }

    pub fn high_shelf(frequency: f32) -> Self {
        Self {
            frequency,
            gain_db: 0.0,
            q: SHELF_Q,
            filter_type: FilterType::HighShelf,
        }
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Set the gain (clamped to ±12 dB, NaN → 0)
    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = clamp_gain(gain_db);
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

/// Clamp a gain to `[-12, 12]` dB; NaN maps to 0
pub fn clamp_gain(gain_db: f32) -> f32 {
    if gain_db.is_nan() {
        0.0
    } else {
        gain_db.clamp(-MAX_EQ_GAIN_DB, MAX_EQ_GAIN_DB)
    }
}

/// The six bands, flat
pub fn default_bands() -> [EqBand; EQ_BAND_COUNT] {
    [
        EqBand::low_shelf(60.0),
        EqBand::peaking(170.0),
        EqBand::peaking(350.0),
        EqBand::peaking(1000.0),
        EqBand::peaking(3500.0),
        EqBand::high_shelf(10000.0),
    ]
}

/// Attach status of the chain
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EqStatus {
    /// Not requested yet
    #[default]
    Detached,

    /// Connected; gains reach the output
    Attached,

    /// Connection failed; never retried
    Unavailable(GraphError),
}

/// Band gains plus the attach memo
#[derive(Debug, Clone, Default)]
pub struct Equalizer {
    bands: Option<[EqBand; EQ_BAND_COUNT]>,
    status: EqStatus,
}

impl Equalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &EqStatus {
        &self.status
    }

    pub fn is_attached(&self) -> bool {
        self.status == EqStatus::Attached
    }

    /// Current bands (flat until a gain is set)
    pub fn bands(&self) -> [EqBand; EQ_BAND_COUNT] {
        self.bands.unwrap_or_else(default_bands)
    }

    /// Connect the chain once
    ///
    /// The first call runs `connect` with the current bands and memoizes the
    /// outcome. Later calls return the memo without connecting again. The
    /// returned error is only `Some` on the call that failed.
    pub fn attach<F>(&mut self, connect: F) -> Option<GraphError>
    where
        F: FnOnce(&[EqBand]) -> Result<(), GraphError>,
    {
        if self.status != EqStatus::Detached {
            debug!(status = ?self.status, "Equalizer attach already resolved");
            return None;
        }

        let bands = *self.bands.get_or_insert_with(default_bands);
        match connect(&bands) {
            Ok(()) => {
                debug!("Equalizer connected");
                self.status = EqStatus::Attached;
                None
            }
            Err(GraphError::AlreadyConnected) => {
                debug!("Equalizer was already connected to this output");
                self.status = EqStatus::Attached;
                None
            }
            Err(e) => {
                warn!(error = %e, "Equalizer unavailable, continuing without it");
                self.status = EqStatus::Unavailable(e.clone());
                Some(e)
            }
        }
    }

    /// Set one band's gain; returns the clamped gain when it should reach
    /// the output
    pub fn set_gain(&mut self, band: usize, gain_db: f32) -> Option<f32> {
        let bands = self.bands.get_or_insert_with(default_bands);
        let slot = bands.get_mut(band)?;
        slot.set_gain_db(gain_db);
        let gain = slot.gain_db();
        self.is_attached().then_some(gain)
    }
}
