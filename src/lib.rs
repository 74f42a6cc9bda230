mod config;
mod error;
mod migrate;
mod player;
mod port;
mod query;
mod store;

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
pub mod http;

pub use config::{ServerConfig, StorageKind};
pub use error::{PortError, Result, StoreError};
pub use migrate::{restore, MigrationPolicy, Recovery, Restored, SeedReason};
pub use player::seed::default_players;
pub use player::{
    avatar_url, GameMode, ModeStat, NewPlayer, PlayerPatch, PlayerRecord, Stats, Tier, TierBand,
    UnknownLabel,
};
pub use port::{CollectionPort, Detached, FileCollection, InMemoryCollection, DEFAULT_KEY};
pub use query::{Leaderboard, LeaderboardFilter, LeaderboardRow};
pub use store::{IdSequence, PlayerStore};
