//! Room settings and the per-ruleset capability descriptor.

use std::fmt;
use std::time::Duration;

use crate::{Game, Player};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Builds a ruleset instance from the roster at game start.
pub type GameConstructor = fn(Vec<Player>) -> Box<dyn Game>;

/// Describes a ruleset to the room layer: its registered name, how many
/// players it seats, and how to build an instance.
///
/// One of these exists per ruleset type. It is registered once at startup
/// and copied into every room created for that game.
#[derive(Clone)]
pub struct GameConfig {
    pub name: String,
    pub min_players: usize,
    pub max_players: usize,
    pub construct: GameConstructor,
}

impl GameConfig {
    pub fn new(
        name: impl Into<String>,
        min_players: usize,
        max_players: usize,
        construct: GameConstructor,
    ) -> Self {
        Self {
            name: name.into(),
            min_players,
            max_players,
            construct,
        }
    }

    /// Returns `true` if a game can start with `count` players.
    pub fn accepts(&self, count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&count)
    }
}

impl fmt::Debug for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameConfig")
            .field("name", &self.name)
            .field("min_players", &self.min_players)
            .field("max_players", &self.max_players)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Timeouts and caps shared by every room a manager hosts.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// How long a joined player may take to open their stream before the
    /// seat is released.
    pub pending_ttl: Duration,

    /// Maximum number of players waiting to connect.
    pub max_pending: usize,

    /// Idle time after which a room that isn't running a game is
    /// reclaimed.
    pub waiting_timeout: Duration,

    /// Idle time after which a room with a game in progress is reclaimed.
    pub in_progress_timeout: Duration,

    /// How often the background reclamation pass runs.
    pub cleanup_interval: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            pending_ttl: Duration::from_secs(10),
            max_pending: 25,
            waiting_timeout: Duration::from_secs(10 * 60),
            in_progress_timeout: Duration::from_secs(60 * 60),
            cleanup_interval: Duration::from_secs(15),
        }
    }
}
