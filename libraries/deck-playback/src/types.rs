//! Core types for the BGM engine
//!
//! Tracks and playlists, the loop mode, the public state snapshot and the
//! initialization config with its defaults.

use crate::{
    error::{PlaybackError, Result},
    fade::{normalize_duration_ms, FadeCurve},
    gate::GatePrompt,
    numeric::{clamp01, parse_number},
    volume::DEFAULT_TARGET_VOLUME,
};
use percent_encoding::percent_decode_str;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Storage prefix used when the caller does not pick one
pub const DEFAULT_STORAGE_PREFIX: &str = "bgm";

/// One playable entry of a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// URI handed to the output device
    pub source: String,

    /// Name shown in the track label
    pub display_name: String,
}

impl Track {
    /// Create a track, deriving the display name from the source filename
    pub fn from_source(source: impl Into<String>) -> Self {
        let source = source.into();
        let display_name = display_name_from_source(&source);
        Self {
            source,
            display_name,
        }
    }
}

/// Ordered, non-empty list of tracks
///
/// Replaced wholesale on re-initialization, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build a playlist; an empty list is a configuration error
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "playlist is empty and no source was given".to_string(),
            ));
        }
        Ok(Self { tracks })
    }

    /// Normalize the `playlist` / `source` pair of a config
    ///
    /// Entries without a usable source are skipped. When nothing usable is
    /// listed, a bare `source` becomes a single-track playlist.
    pub fn from_config(config: &EngineConfig, title_language: Option<&str>) -> Result<Self> {
        let mut tracks: Vec<Track> = config
            .playlist
            .iter()
            .filter_map(|entry| entry.to_track(title_language))
            .collect();

        if tracks.is_empty() {
            if let Some(source) = config.source.as_deref().map(str::trim) {
                if !source.is_empty() {
                    tracks.push(Track::from_source(source));
                }
            }
        }

        Self::new(tracks)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false for a constructed playlist; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Whether prev/next can go anywhere
    pub fn is_navigable(&self) -> bool {
        self.tracks.len() > 1
    }
}

/// Playlist entry as supplied by the caller
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PlaylistEntry {
    /// Bare URI
    Uri(String),

    /// URI with optional titles
    Detailed {
        #[serde(alias = "src")]
        source: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        titles: BTreeMap<String, String>,
    },

    /// Anything else; skipped during normalization
    Unrecognized(IgnoredAny),
}

impl PlaylistEntry {
    /// Entry with an explicit display title
    pub fn titled(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Detailed {
            source: source.into(),
            title: Some(title.into()),
            titles: BTreeMap::new(),
        }
    }

    /// Resolve to a track, or `None` when the entry has no usable source
    pub fn to_track(&self, title_language: Option<&str>) -> Option<Track> {
        match self {
            Self::Uri(source) => {
                let source = source.trim();
                (!source.is_empty()).then(|| Track::from_source(source))
            }
            Self::Detailed {
                source,
                title,
                titles,
            } => {
                let source = source.trim();
                if source.is_empty() {
                    return None;
                }
                let display_name = title
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .or_else(|| title_language.and_then(|lang| titles.get(lang)).map(String::as_str))
                    .or_else(|| titles.values().next().map(String::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| display_name_from_source(source));
                Some(Track {
                    source: source.to_string(),
                    display_name,
                })
            }
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<&str> for PlaylistEntry {
    fn from(uri: &str) -> Self {
        Self::Uri(uri.to_string())
    }
}

/// Derive a human-readable name from a source URI
///
/// Last path segment, without query/fragment and extension, percent-decoded.
/// Falls back to the raw source when nothing is left.
pub fn display_name_from_source(source: &str) -> String {
    let without_suffix = source
        .split(['?', '#'])
        .next()
        .unwrap_or(source)
        .trim_end_matches('/');
    let segment = without_suffix
        .rsplit('/')
        .next()
        .unwrap_or(without_suffix);
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let stem = match decoded.rfind('.') {
        Some(dot) if dot > 0 => &decoded[..dot],
        _ => &decoded[..],
    };
    let stem = stem.trim();

    if stem.is_empty() {
        source.to_string()
    } else {
        stem.to_string()
    }
}

/// Loop mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Stop when the track ends
    Off,

    /// Native single-track repeat
    One,

    /// Advance through the playlist, wrapping
    #[default]
    All,
}

impl LoopMode {
    /// Next mode of the loop button: all → one → off → all
    pub fn cycled(self) -> Self {
        match self {
            LoopMode::All => LoopMode::One,
            LoopMode::One => LoopMode::Off,
            LoopMode::Off => LoopMode::All,
        }
    }

    /// Persisted spelling
    pub fn as_str(self) -> &'static str {
        match self {
            LoopMode::Off => "off",
            LoopMode::One => "one",
            LoopMode::All => "all",
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LoopMode::Off),
            "one" => Ok(LoopMode::One),
            "all" => Ok(LoopMode::All),
            other => Err(format!("unknown loop mode: {other}")),
        }
    }
}

/// Snapshot of the engine's mutable core record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Always a valid playlist index
    pub current_index: usize,

    pub loop_mode: LoopMode,

    /// Level a fade converges to (0.0-1.0)
    pub target_volume: f32,

    pub muted: bool,

    /// True exactly while a fade owns the volume channel
    pub fading: bool,

    /// True once a play attempt has succeeded
    pub unlocked: bool,
}

/// Caller-supplied options; every field optional and leniently parsed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    #[serde(deserialize_with = "lenient::number")]
    pub target_volume: Option<f64>,

    #[serde(deserialize_with = "lenient::number")]
    pub fade_ms: Option<f64>,

    #[serde(deserialize_with = "lenient::boolean")]
    pub persist: Option<bool>,

    #[serde(deserialize_with = "lenient::text")]
    pub storage_prefix: Option<String>,

    #[serde(deserialize_with = "lenient::boolean")]
    pub show_gate: Option<bool>,

    #[serde(deserialize_with = "lenient::parsed")]
    pub loop_mode: Option<LoopMode>,

    #[serde(deserialize_with = "lenient::parsed")]
    pub fade_curve: Option<FadeCurve>,

    #[serde(deserialize_with = "lenient::text")]
    pub title_language: Option<String>,

    #[serde(deserialize_with = "lenient::text")]
    pub gate_title: Option<String>,

    #[serde(deserialize_with = "lenient::text")]
    pub gate_subtitle: Option<String>,
}

/// Options with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub target_volume: f32,
    pub fade_ms: f64,
    pub persist: bool,
    pub storage_prefix: String,
    pub show_gate: bool,
    pub loop_mode: LoopMode,
    pub fade_curve: FadeCurve,
    pub title_language: Option<String>,
    pub gate: GatePrompt,
}

impl EngineOptions {
    /// Apply defaults and clamp every value into range
    pub fn resolve(&self) -> ResolvedOptions {
        let target_volume = self
            .target_volume
            .map_or(DEFAULT_TARGET_VOLUME, |v| clamp01(v as f32));

        let storage_prefix = self
            .storage_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_STORAGE_PREFIX)
            .to_string();

        let show_gate = self.show_gate.unwrap_or(true);
        let mut gate = GatePrompt::default();
        if let Some(title) = &self.gate_title {
            gate.title.clone_from(title);
        }
        if let Some(subtitle) = &self.gate_subtitle {
            gate.subtitle = Some(subtitle.clone()).filter(|s| !s.is_empty());
        }
        gate.render_overlay = show_gate;

        ResolvedOptions {
            target_volume,
            fade_ms: normalize_duration_ms(self.fade_ms),
            persist: self.persist.unwrap_or(true),
            storage_prefix,
            show_gate,
            loop_mode: self.loop_mode.unwrap_or_default(),
            fade_curve: self.fade_curve.unwrap_or_default(),
            title_language: self.title_language.clone(),
            gate,
        }
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        EngineOptions::default().resolve()
    }
}

/// Initialization config: source or playlist plus options
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    #[serde(alias = "src", deserialize_with = "lenient::text")]
    pub source: Option<String>,

    pub playlist: Vec<PlaylistEntry>,

    pub options: EngineOptions,
}

impl EngineConfig {
    /// Single-source config
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    /// Playlist config
    pub fn from_playlist<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<PlaylistEntry>,
    {
        Self {
            playlist: entries.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Replace the options
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a JSON config (camelCase keys)
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Deserializers that turn bad values into `None` instead of failing
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Loose {
        Bool(bool),
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    fn loose<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Loose>, D::Error> {
        Option::<Loose>::deserialize(d)
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
        Ok(match loose(d)? {
            Some(Loose::Number(n)) if n.is_finite() => Some(n),
            Some(Loose::Text(s)) => parse_number(&s),
            _ => None,
        })
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<bool>, D::Error> {
        Ok(match loose(d)? {
            Some(Loose::Bool(b)) => Some(b),
            Some(Loose::Number(n)) if n == 0.0 || n == 1.0 => Some(n == 1.0),
            Some(Loose::Text(s)) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
        Ok(match loose(d)? {
            Some(Loose::Text(s)) => Some(s),
            _ => None,
        })
    }

    pub fn parsed<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(match loose(d)? {
            Some(Loose::Text(s)) => s.parse().ok(),
            _ => None,
        })
    }
}
