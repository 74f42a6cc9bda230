//! PlayerStore - sole owner of the canonical player collection.
//!
//! The store persists the whole collection through its [`CollectionPort`]
//! on every mutation and re-reads it before every operation, so several
//! stores sharing one port see each other's writes. The in-memory snapshot
//! only changes once the save succeeded, so a failed write leaves both the
//! snapshot and the persisted blob as they were.
//!
//! ## Example
//!
//! ```
//! use tier_list::{GameMode, InMemoryCollection, ModeStat, NewPlayer, PlayerPatch, PlayerStore, Tier};
//!
//! let store = PlayerStore::open(InMemoryCollection::new())?;
//! assert_eq!(store.list_all()?.len(), 8); // first run seeds the default dataset
//!
//! let created = store.create(
//!     NewPlayer::new("Hypixel", 4000).with_stat(GameMode::Uhc, ModeStat::new(Tier::LT2, 24)),
//! )?;
//! let updated = store.update(&created.id, PlayerPatch::default().overall_points(4100))?;
//! assert_eq!(updated.unwrap().overall_points, 4100);
//!
//! assert!(store.delete(&created.id)?);
//! assert!(store.get_by_id(&created.id)?.is_none());
//! # Ok::<(), tier_list::StoreError>(())
//! ```

mod ids;

use std::collections::HashSet;
use std::sync::{RwLock, RwLockWriteGuard};

use crate::error::{Result, StoreError};
use crate::migrate::{restore, MigrationPolicy, Recovery, Restored, SeedReason};
use crate::player::seed::default_players;
use crate::player::{GameMode, ModeStat, NewPlayer, PlayerPatch, PlayerRecord};
use crate::port::{CollectionPort, Detached};
use crate::query::Leaderboard;

pub use ids::IdSequence;

struct Snapshot {
    players: Vec<PlayerRecord>,
    ids: IdSequence,
    recovery: Recovery,
}

impl Snapshot {
    fn new(restored: Restored, mut ids: IdSequence) -> Self {
        for player in &restored.players {
            ids.observe(&player.id);
        }
        Self {
            players: restored.players,
            ids,
            recovery: restored.recovery,
        }
    }
}

/// The player collection and its persistence.
///
/// All operations take `&self`; share a store across threads with `Arc`.
/// Each operation reloads the collection from the port, and mutations hold
/// the write lock across reload, encode and save, so writes through one
/// store are applied one at a time on top of the latest persisted state.
/// Nothing coordinates writers in different processes: of two concurrent
/// whole-collection writes, the last one wins.
pub struct PlayerStore<P> {
    port: Option<P>,
    policy: MigrationPolicy,
    state: RwLock<Snapshot>,
}

impl PlayerStore<Detached> {
    /// A store with no durable storage, for non-interactive contexts.
    ///
    /// Serves the default dataset and never reads or writes storage.
    /// Mutations only affect this instance.
    pub fn detached() -> Self {
        let restored = Restored {
            players: default_players(),
            recovery: Recovery::Seeded(SeedReason::Detached),
        };
        Self {
            port: None,
            policy: MigrationPolicy::default(),
            state: RwLock::new(Snapshot::new(restored, IdSequence::default())),
        }
    }
}

impl<P: CollectionPort> PlayerStore<P> {
    /// Open the store with the default [`MigrationPolicy::Normalize`].
    pub fn open(port: P) -> Result<Self> {
        Self::open_with(port, MigrationPolicy::default())
    }

    /// Load the persisted collection, seeding it on first run.
    ///
    /// Fails with [`StoreError::Unavailable`] when the port cannot be read;
    /// an unreachable store is never mistaken for an empty one.
    pub fn open_with(port: P, policy: MigrationPolicy) -> Result<Self> {
        let snapshot = Self::read(&port, policy, IdSequence::default())?;
        report(port.key(), &snapshot);
        Ok(Self {
            port: Some(port),
            policy,
            state: RwLock::new(snapshot),
        })
    }

    fn read(port: &P, policy: MigrationPolicy, ids: IdSequence) -> Result<Snapshot> {
        let Some(bytes) = port.load()? else {
            let snapshot = Snapshot::new(Restored::seeded(SeedReason::FirstRun), ids);
            tracing::info!(
                "No players stored under '{}', seeding {} default players",
                port.key(),
                snapshot.players.len()
            );
            port.save(&encode(&snapshot.players)?)?;
            return Ok(snapshot);
        };

        // Ids for repaired records depend on the blob alone, so repeated
        // reads of an unrepaired blob agree on them.
        let restored = restore(&bytes, policy, &mut IdSequence::default());
        tracing::trace!(
            "Loaded {} players from '{}'",
            restored.players.len(),
            port.key()
        );

        Ok(Snapshot::new(restored, ids))
    }

    /// Lock the snapshot and bring it up to date with the port.
    fn current(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Snapshot>> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))?;

        if let Some(port) = &self.port {
            let snapshot = Self::read(port, self.policy, state.ids.clone())?;
            if snapshot.recovery != state.recovery {
                report(port.key(), &snapshot);
            }
            *state = snapshot;
        }
        Ok(state)
    }

    /// Re-read the persisted collection, replacing the in-memory snapshot.
    ///
    /// Every operation already does this; `reload` only reports the result.
    /// Issued ids keep counting from where they were. Detached stores keep
    /// their snapshot.
    pub fn reload(&self) -> Result<Recovery> {
        let state = self.current("reload")?;
        Ok(state.recovery.clone())
    }

    /// What the last load had to do to produce a valid collection.
    pub fn recovery(&self) -> Result<Recovery> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::LockPoisoned("recovery"))?;
        Ok(state.recovery.clone())
    }

    /// The full collection in insertion order.
    pub fn list_all(&self) -> Result<Vec<PlayerRecord>> {
        let state = self.current("list_all")?;
        Ok(state.players.clone())
    }

    pub fn len(&self) -> Result<usize> {
        let state = self.current("len")?;
        Ok(state.players.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<PlayerRecord>> {
        let state = self.current("get_by_id")?;
        Ok(state.players.iter().find(|p| p.id == id).cloned())
    }

    /// Derived views over the current snapshot.
    pub fn leaderboard(&self) -> Result<Leaderboard> {
        Ok(Leaderboard::new(self.list_all()?))
    }

    /// Append a new player under a freshly issued id.
    pub fn create(&self, player: NewPlayer) -> Result<PlayerRecord> {
        validate_name(&player.name)?;

        let mut state = self.current("create")?;

        let id = state.ids.issue().ok_or(StoreError::IdsExhausted)?;
        let record = player.into_record(id);
        let mut players = state.players.clone();
        players.push(record.clone());

        self.persist(&players)?;
        state.players = players;

        tracing::debug!("Created player {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Merge `patch` into the player with `id`. `None` if there is none.
    pub fn update(&self, id: &str, patch: PlayerPatch) -> Result<Option<PlayerRecord>> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        self.modify(id, "update", |player| player.apply(patch))
    }

    /// Set one mode's stat and recompute overall points as the best mode.
    pub fn rate(&self, id: &str, mode: GameMode, stat: ModeStat) -> Result<Option<PlayerRecord>> {
        self.modify(id, "rate", |player| {
            player.stats.set(mode, stat);
            player.overall_points = player.stats.peak_points();
        })
    }

    fn modify(
        &self,
        id: &str,
        operation: &'static str,
        change: impl FnOnce(&mut PlayerRecord),
    ) -> Result<Option<PlayerRecord>> {
        let mut state = self.current(operation)?;

        let Some(index) = state.players.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        let mut players = state.players.clone();
        change(&mut players[index]);
        let record = players[index].clone();

        self.persist(&players)?;
        state.players = players;

        tracing::debug!("Applied {} to player {}", operation, id);
        Ok(Some(record))
    }

    /// Remove the player with `id`. Returns whether one was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.current("delete")?;

        if !state.players.iter().any(|p| p.id == id) {
            return Ok(false);
        }

        let players: Vec<PlayerRecord> = state
            .players
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();

        self.persist(&players)?;
        state.players = players;

        tracing::debug!("Deleted player {}", id);
        Ok(true)
    }

    /// Overwrite the whole collection, preserving the given order.
    pub fn replace_all(&self, players: Vec<PlayerRecord>) -> Result<()> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if player.id.is_empty() {
                return Err(StoreError::Invalid(format!(
                    "player '{}' has an empty id",
                    player.name
                )));
            }
            if !seen.insert(player.id.as_str()) {
                return Err(StoreError::Invalid(format!("duplicate id {}", player.id)));
            }
            validate_name(&player.name)?;
        }

        let mut state = self.current("replace_all")?;

        self.persist(&players)?;

        for player in &players {
            state.ids.observe(&player.id);
        }
        tracing::debug!("Replaced collection with {} players", players.len());
        state.players = players;
        Ok(())
    }

    fn persist(&self, players: &[PlayerRecord]) -> Result<()> {
        let Some(port) = &self.port else {
            return Ok(());
        };
        port.save(&encode(players)?)?;
        Ok(())
    }
}

fn report(key: &str, snapshot: &Snapshot) {
    match &snapshot.recovery {
        Recovery::Clean => {}
        Recovery::Normalized { repaired, dropped } => tracing::warn!(
            "Repaired {} and dropped {} player records stored under '{}'",
            repaired,
            dropped,
            key
        ),
        Recovery::Seeded(SeedReason::FirstRun | SeedReason::Detached) => {}
        Recovery::Seeded(reason) => tracing::warn!(
            "Discarded players stored under '{}' ({}), serving {} default players",
            key,
            reason,
            snapshot.players.len()
        ),
    }
}

fn encode(players: &[PlayerRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec(players).map_err(|e| StoreError::Encode(e.to_string()))
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Invalid("player name must not be empty".into()));
    }
    Ok(())
}
