//! Decoding a persisted player blob, repairing older formats on the way in.
//!
//! Blobs written by earlier versions may lack game modes, carry tier labels
//! that no longer exist, or miss ids. [`restore`] turns any blob into a
//! valid collection and reports what it had to do in a [`Recovery`].

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::player::seed::default_players;
use crate::player::{GameMode, ModeStat, PlayerRecord, Stats, Tier};
use crate::store::IdSequence;

/// How to treat a persisted blob that does not match the current schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationPolicy {
    /// Repair every record field by field; keep all recoverable data.
    #[default]
    Normalize,
    /// Replace the whole blob with the default dataset when its first
    /// record lacks a game-mode entry. Loses data; kept for compatibility.
    DiscardLegacy,
}

impl std::str::FromStr for MigrationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normalize" => Ok(MigrationPolicy::Normalize),
            "discard" | "discard-legacy" => Ok(MigrationPolicy::DiscardLegacy),
            other => Err(format!("unknown migration policy: {}", other)),
        }
    }
}

/// Why a persisted blob was replaced by the default dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    /// Nothing had been persisted yet.
    FirstRun,
    /// The store has no durable storage.
    Detached,
    /// The blob was not a JSON array.
    Malformed(String),
    /// The first record lacked a game mode and the policy discards legacy data.
    LegacyShape { missing: GameMode },
}

impl fmt::Display for SeedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedReason::FirstRun => write!(f, "no persisted collection"),
            SeedReason::Detached => write!(f, "no durable storage"),
            SeedReason::Malformed(msg) => write!(f, "malformed collection: {}", msg),
            SeedReason::LegacyShape { missing } => {
                write!(f, "legacy collection missing {} on first record", missing)
            }
        }
    }
}

/// What loading a blob had to do to produce a valid collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Recovery {
    /// Every record decoded as-is.
    #[default]
    Clean,
    /// Some records were repaired or dropped.
    Normalized { repaired: usize, dropped: usize },
    /// The blob was replaced by the default dataset.
    Seeded(SeedReason),
}

impl Recovery {
    pub fn is_clean(&self) -> bool {
        matches!(self, Recovery::Clean)
    }
}

/// Result of [`restore`].
#[derive(Debug, Clone)]
pub struct Restored {
    pub players: Vec<PlayerRecord>,
    pub recovery: Recovery,
}

impl Restored {
    pub(crate) fn seeded(reason: SeedReason) -> Self {
        Self {
            players: default_players(),
            recovery: Recovery::Seeded(reason),
        }
    }
}

/// Lenient shape of a persisted record. Only the name has to be present;
/// every other field is read from whatever JSON value was stored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPlayer {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    #[serde(default)]
    overall_points: Option<Value>,
    #[serde(default)]
    stats: Option<Value>,
}

/// Read a points value, coercing floats and numeric strings.
///
/// Returns the points and whether the stored value needed repair.
fn read_points(value: Option<&Value>) -> (u32, bool) {
    let Some(value) = value else {
        return (0, true);
    };
    if let Some(n) = value.as_u64() {
        return match u32::try_from(n) {
            Ok(points) => (points, false),
            Err(_) => (u32::MAX, true),
        };
    }

    let coerced = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match coerced {
        Some(n) if n.is_finite() => (n.clamp(0.0, u32::MAX as f64) as u32, true),
        _ => (0, true),
    }
}

fn read_stat(stored: &Value) -> (ModeStat, bool) {
    let Some(stat) = stored.as_object() else {
        return (ModeStat::unrated(), true);
    };

    let (tier, bad_tier) = match stat.get("tier").and_then(Value::as_str).map(str::parse::<Tier>) {
        Some(Ok(tier)) => (tier, false),
        _ => (Tier::Unrated, true),
    };
    let (points, bad_points) = read_points(stat.get("points"));

    let normalized = ModeStat::new(tier, points);
    let repaired = bad_tier || bad_points || normalized.points != points;
    (normalized, repaired)
}

/// A repaired record whose id may still need issuing.
struct Normalized {
    id: Option<String>,
    record: PlayerRecord,
    repaired: bool,
}

/// Repair one stored record field by field.
fn normalize(stored: StoredPlayer) -> Normalized {
    let mut repaired = false;

    let id = match stored.id {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::Number(n)) => {
            repaired = true;
            Some(n.to_string())
        }
        _ => {
            repaired = true;
            None
        }
    };

    let entries = match stored.stats {
        Some(Value::Object(entries)) => entries,
        _ => {
            repaired = true;
            Map::new()
        }
    };

    let mut stats = Stats::unrated();
    for mode in GameMode::ALL {
        let Some(entry) = entries.get(mode.as_str()) else {
            repaired = true;
            continue;
        };
        let (stat, bad) = read_stat(entry);
        repaired |= bad;
        stats.set(mode, stat);
    }
    if entries.keys().any(|k| k.parse::<GameMode>().is_err()) {
        repaired = true;
    }

    let overall_points = match stored.overall_points {
        Some(points) => {
            let (points, bad) = read_points(Some(&points));
            repaired |= bad;
            points
        }
        None => {
            repaired = true;
            stats.peak_points()
        }
    };

    Normalized {
        id,
        record: PlayerRecord {
            id: String::new(),
            name: stored.name,
            overall_points,
            stats,
        },
        repaired,
    }
}

fn first_missing_mode(first: &Value) -> Option<GameMode> {
    let stats = first.get("stats").and_then(Value::as_object);
    GameMode::ALL
        .into_iter()
        .find(|mode| stats.map_or(true, |s| !s.contains_key(mode.as_str())))
}

/// Decode a persisted blob under `policy`.
///
/// Every kept id is recorded in `ids` before any record lacking an id, or
/// repeating an earlier one, is issued a fresh one, so issued ids never
/// collide with stored ones. Records without a usable name are dropped.
pub fn restore(bytes: &[u8], policy: MigrationPolicy, ids: &mut IdSequence) -> Restored {
    let records = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            let kind = match other {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                _ => "object",
            };
            return Restored::seeded(SeedReason::Malformed(format!(
                "expected an array, found {}",
                kind
            )));
        }
        Err(e) => return Restored::seeded(SeedReason::Malformed(e.to_string())),
    };

    if policy == MigrationPolicy::DiscardLegacy {
        if let Some(missing) = records.first().and_then(first_missing_mode) {
            return Restored::seeded(SeedReason::LegacyShape { missing });
        }
    }

    let mut normalized = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<StoredPlayer>(record) {
            Ok(stored) if !stored.name.trim().is_empty() => normalized.push(normalize(stored)),
            Ok(_) => {
                tracing::debug!("Dropping nameless player at index {}", index);
                dropped += 1;
            }
            Err(e) => {
                tracing::debug!("Dropping undecodable player at index {}: {}", index, e);
                dropped += 1;
            }
        }
    }

    // Later copies of a repeated id get a fresh one.
    let mut seen = HashSet::with_capacity(normalized.len());
    for n in &mut normalized {
        if let Some(id) = &n.id {
            if !seen.insert(id.clone()) {
                n.id = None;
                n.repaired = true;
            }
        }
    }
    for id in &seen {
        ids.observe(id);
    }

    let repaired = normalized.iter().filter(|n| n.repaired).count();
    let mut players = Vec::with_capacity(normalized.len());
    for n in normalized {
        let Some(id) = n.id.or_else(|| ids.issue()) else {
            tracing::debug!("No id left for player {}, dropping", n.record.name);
            dropped += 1;
            continue;
        };
        players.push(PlayerRecord { id, ..n.record });
    }

    let recovery = if repaired == 0 && dropped == 0 {
        Recovery::Clean
    } else {
        Recovery::Normalized { repaired, dropped }
    };

    Restored { players, recovery }
}
