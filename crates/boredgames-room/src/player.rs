//! Players as the room sees them.

use boredgames_protocol::PlayerId;
use rand::Rng;
use tokio::time::Instant;

/// A seat in a room.
///
/// Two players are the same player if they have the same id; the name and
/// connection flag are mutable state, not identity.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub created_at: Instant,
}

impl Player {
    /// Creates a disconnected player with a fresh random id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(PlayerId(rand::rng().random()), name)
    }

    /// Creates a disconnected player with a known id.
    pub fn with_id(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            connected: false,
            created_at: Instant::now(),
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}
