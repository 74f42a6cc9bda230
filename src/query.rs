//! Leaderboard views derived from a snapshot of the player collection.
//!
//! Views never mutate the store: a [`Leaderboard`] owns a copy of the
//! collection taken when it was built.
//!
//! Two sort orders exist on purpose. [`Leaderboard::by_game_mode`] ranks by
//! that mode's points, while the combined [`Leaderboard::filter`] used for
//! the main listing always ranks by overall points, even when a mode is
//! selected.

use serde::{Deserialize, Serialize};

use crate::player::{GameMode, PlayerRecord, Tier, TierBand};

/// Which players the main listing shows.
///
/// A non-empty `query` wins: the mode is then ignored for filtering.
/// `mode: None` shows everyone regardless of tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub mode: Option<GameMode>,
}

impl LeaderboardFilter {
    /// No search and no mode: every player.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn mode(mode: GameMode) -> Self {
        Self {
            query: None,
            mode: Some(mode),
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = Some(mode);
        self
    }

    fn active_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }
}

/// One line of the rendered leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    /// 1-based position within the filtered listing.
    pub rank: usize,
    /// Tier shown for the selected mode, `N/A` without one.
    pub tier: Tier,
    pub band: TierBand,
    /// Selected mode's points, or overall points when those are zero.
    pub points: u32,
    pub player: PlayerRecord,
}

/// Derived views over one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    players: Vec<PlayerRecord>,
}

fn sort_by_overall(players: &mut [PlayerRecord]) {
    players.sort_by(|a, b| b.overall_points.cmp(&a.overall_points));
}

impl Leaderboard {
    pub fn new(players: Vec<PlayerRecord>) -> Self {
        Self { players }
    }

    /// The snapshot in collection order.
    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    /// The `n` players with the most overall points. Ties keep collection order.
    pub fn top_n(&self, n: usize) -> Vec<PlayerRecord> {
        let mut players = self.players.clone();
        sort_by_overall(&mut players);
        players.truncate(n);
        players
    }

    /// Players rated in `mode`, best points first. Unrated players are
    /// left out entirely.
    pub fn by_game_mode(&self, mode: GameMode) -> Vec<PlayerRecord> {
        let mut players: Vec<PlayerRecord> = self
            .players
            .iter()
            .filter(|p| p.stat(mode).tier.is_rated())
            .cloned()
            .collect();
        players.sort_by(|a, b| b.stat(mode).points.cmp(&a.stat(mode).points));
        players
    }

    /// Case-insensitive substring match on name, in collection order.
    pub fn search(&self, query: &str) -> Vec<PlayerRecord> {
        let needle = query.to_lowercase();
        self.players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// The main listing: search or mode filter, ranked by overall points.
    pub fn filter(&self, filter: &LeaderboardFilter) -> Vec<PlayerRecord> {
        let mut players = match (filter.active_query(), filter.mode) {
            (Some(query), _) => self.search(query),
            (None, Some(mode)) => self
                .players
                .iter()
                .filter(|p| p.stat(mode).tier.is_rated())
                .cloned()
                .collect(),
            (None, None) => self.players.clone(),
        };
        sort_by_overall(&mut players);
        players
    }

    /// [`filter`](Self::filter) with rank and per-mode display values.
    pub fn rows(&self, filter: &LeaderboardFilter) -> Vec<LeaderboardRow> {
        self.filter(filter)
            .into_iter()
            .enumerate()
            .map(|(index, player)| {
                let stat = filter.mode.map(|mode| player.stat(mode));
                let tier = stat.map_or(Tier::Unrated, |s| s.tier);
                let points = match stat {
                    Some(s) if s.points > 0 => s.points,
                    _ => player.overall_points,
                };
                LeaderboardRow {
                    rank: index + 1,
                    tier,
                    band: tier.band(),
                    points,
                    player,
                }
            })
            .collect()
    }

    /// 1-based overall position of the player with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.top_n(self.players.len())
            .iter()
            .position(|p| p.id == id)
            .map(|index| index + 1)
    }
}

impl From<Vec<PlayerRecord>> for Leaderboard {
    fn from(players: Vec<PlayerRecord>) -> Self {
        Self::new(players)
    }
}
