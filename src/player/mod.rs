//! Player records - the schema every store, port and view agrees on.
//!
//! A [`PlayerRecord`] carries a name, an overall score and one [`ModeStat`]
//! per [`GameMode`]. [`Stats`] cannot be built without an entry for every
//! mode: whatever path a record comes in through (JSON body, persisted blob,
//! builder), missing modes are filled with the unrated sentinel.
//!
//! ## Example
//!
//! ```
//! use tier_list::{GameMode, ModeStat, NewPlayer, Tier};
//!
//! let player = NewPlayer::new("Marlowww", 5200)
//!     .with_stat(GameMode::Sword, ModeStat::new(Tier::HT1, 60));
//!
//! assert_eq!(player.stats.get(GameMode::Sword).tier, Tier::HT1);
//! assert_eq!(player.stats.get(GameMode::Smp).tier, Tier::Unrated);
//! ```

pub mod seed;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed set of tracked game modes, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameMode {
    Smp,
    Uhc,
    Crystal,
    Sword,
    Nethpot,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::Smp,
        GameMode::Uhc,
        GameMode::Crystal,
        GameMode::Sword,
        GameMode::Nethpot,
    ];

    /// Wire name, also the key used in persisted `stats` objects.
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Smp => "SMP",
            GameMode::Uhc => "UHC",
            GameMode::Crystal => "Crystal",
            GameMode::Sword => "Sword",
            GameMode::Nethpot => "Nethpot",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label names no known game mode or tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {label}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl FromStr for GameMode {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "game mode",
                label: s.to_string(),
            })
    }
}

impl Serialize for GameMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GameMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Skill rank within one game mode, best first. `Unrated` is the `N/A`
/// sentinel and always sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Tier {
    HT1,
    LT1,
    HT2,
    LT2,
    HT3,
    LT3,
    HT4,
    LT4,
    HT5,
    LT5,
    #[default]
    Unrated,
}

/// Coarse grouping of tiers; drives how a tier is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierBand {
    High,
    Low,
    Unrated,
}

impl Tier {
    pub const ALL: [Tier; 11] = [
        Tier::HT1,
        Tier::LT1,
        Tier::HT2,
        Tier::LT2,
        Tier::HT3,
        Tier::LT3,
        Tier::HT4,
        Tier::LT4,
        Tier::HT5,
        Tier::LT5,
        Tier::Unrated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::HT1 => "HT1",
            Tier::LT1 => "LT1",
            Tier::HT2 => "HT2",
            Tier::LT2 => "LT2",
            Tier::HT3 => "HT3",
            Tier::LT3 => "LT3",
            Tier::HT4 => "HT4",
            Tier::LT4 => "LT4",
            Tier::HT5 => "HT5",
            Tier::LT5 => "LT5",
            Tier::Unrated => "N/A",
        }
    }

    pub fn is_rated(self) -> bool {
        self != Tier::Unrated
    }

    pub fn band(self) -> TierBand {
        match self {
            Tier::Unrated => TierBand::Unrated,
            Tier::HT1 | Tier::HT2 | Tier::HT3 | Tier::HT4 | Tier::HT5 => TierBand::High,
            _ => TierBand::Low,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "tier",
                label: s.to_string(),
            })
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Tier and points for one game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeStat {
    pub tier: Tier,
    #[serde(default)]
    pub points: u32,
}

impl ModeStat {
    /// Build a stat; an unrated tier never carries points.
    pub fn new(tier: Tier, points: u32) -> Self {
        let points = if tier.is_rated() { points } else { 0 };
        Self { tier, points }
    }

    pub fn unrated() -> Self {
        Self::default()
    }
}

/// Per-mode stats covering every [`GameMode`].
///
/// Serialized as a JSON object keyed by mode name. Decoding a partial object
/// fills the gaps with [`ModeStat::unrated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<GameMode, ModeStat>")]
pub struct Stats(BTreeMap<GameMode, ModeStat>);

impl Default for Stats {
    fn default() -> Self {
        Self::unrated()
    }
}

impl Stats {
    /// Every mode unrated.
    pub fn unrated() -> Self {
        Self(
            GameMode::ALL
                .into_iter()
                .map(|mode| (mode, ModeStat::unrated()))
                .collect(),
        )
    }

    pub fn get(&self, mode: GameMode) -> ModeStat {
        self.0.get(&mode).copied().unwrap_or_default()
    }

    pub fn set(&mut self, mode: GameMode, stat: ModeStat) {
        self.0.insert(mode, ModeStat::new(stat.tier, stat.points));
    }

    pub fn with(mut self, mode: GameMode, stat: ModeStat) -> Self {
        self.set(mode, stat);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameMode, ModeStat)> + '_ {
        self.0.iter().map(|(mode, stat)| (*mode, *stat))
    }

    /// Highest points across all modes; 0 when every mode is unrated.
    pub fn peak_points(&self) -> u32 {
        self.0.values().map(|stat| stat.points).max().unwrap_or(0)
    }
}

impl From<BTreeMap<GameMode, ModeStat>> for Stats {
    fn from(partial: BTreeMap<GameMode, ModeStat>) -> Self {
        partial
            .into_iter()
            .fold(Stats::unrated(), |stats, (mode, stat)| stats.with(mode, stat))
    }
}

impl FromIterator<(GameMode, ModeStat)> for Stats {
    fn from_iter<I: IntoIterator<Item = (GameMode, ModeStat)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Stats::unrated(), |stats, (mode, stat)| stats.with(mode, stat))
    }
}

/// A stored player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub overall_points: u32,
    #[serde(default)]
    pub stats: Stats,
}

impl PlayerRecord {
    pub fn stat(&self, mode: GameMode) -> ModeStat {
        self.stats.get(mode)
    }

    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn apply(&mut self, patch: PlayerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(overall_points) = patch.overall_points {
            self.overall_points = overall_points;
        }
        if let Some(stats) = patch.stats {
            self.stats = stats;
        }
    }
}

/// A player submitted for creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub overall_points: u32,
    #[serde(default)]
    pub stats: Stats,
}

impl NewPlayer {
    pub fn new(name: impl Into<String>, overall_points: u32) -> Self {
        Self {
            name: name.into(),
            overall_points,
            stats: Stats::unrated(),
        }
    }

    pub fn with_stat(mut self, mode: GameMode, stat: ModeStat) -> Self {
        self.stats.set(mode, stat);
        self
    }

    pub(crate) fn into_record(self, id: String) -> PlayerRecord {
        PlayerRecord {
            id,
            name: self.name,
            overall_points: self.overall_points,
            stats: self.stats,
        }
    }
}

/// Partial update. `stats` is replaced wholesale, never deep-merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl PlayerPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn overall_points(mut self, points: u32) -> Self {
        self.overall_points = Some(points);
        self
    }

    pub fn stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Avatar image URL for a player. Avatars are keyed by name, not id.
pub fn avatar_url(name: &str, size: u32) -> String {
    format!("https://mc-heads.net/avatar/{}/{}", name, size)
}
