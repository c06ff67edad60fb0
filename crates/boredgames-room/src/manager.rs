//! Room manager: creates, tracks, and reclaims rooms.
//!
//! Rooms are independent locking units. The map itself sits behind a
//! read-write lock that is only held long enough to clone a room's
//! `Arc`, so a slow room never blocks traffic to another.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use boredgames_protocol::{PlayerId, RoomId, RoomSnapshot};
use rand::Rng;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{ActionError, GameRegistry, Player, Room, RoomConfig, RoomError, RoomEvents};

type SharedRoom = Arc<Mutex<Room>>;

/// What the caller gets back from [`RoomManager::create_room`].
#[derive(Debug)]
pub struct NewRoom {
    pub room_id: RoomId,
    /// The host's id. The host still has to connect before anyone else
    /// can join.
    pub host_id: PlayerId,
    /// The room's change notifications. Dropping this is allowed; events
    /// are then discarded with a warning.
    pub events: RoomEvents,
}

/// Owns every live room in the process.
///
/// This is the entry point for room operations from higher layers (the
/// server facade, a transport).
pub struct RoomManager {
    registry: GameRegistry,
    config: RoomConfig,
    rooms: RwLock<HashMap<RoomId, SharedRoom>>,
}

impl RoomManager {
    pub fn new(registry: GameRegistry, config: RoomConfig) -> Self {
        Self {
            registry,
            config,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Names of the game types rooms can be created for.
    pub fn games(&self) -> Vec<String> {
        self.registry.names()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Creates a room for a registered game with `host_name` as its host.
    ///
    /// # Errors
    /// `UnknownGame` if nothing is registered under `game`, `CreateFailed`
    /// if the generated room id is already in use.
    pub async fn create_room(&self, game: &str, host_name: &str) -> Result<NewRoom, RoomError> {
        let game_config = self
            .registry
            .get(game)
            .ok_or_else(|| RoomError::UnknownGame(game.to_string()))?
            .clone();

        let room_id = RoomId(rand::rng().random());
        let host = Player::new(host_name);
        let host_id = host.id;

        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room_id) {
            return Err(RoomError::CreateFailed);
        }
        let (room, events) = Room::new(room_id, host, game_config, self.config.clone());
        rooms.insert(room_id, Arc::new(Mutex::new(room)));

        tracing::info!(%room_id, %host_id, game, "room created");
        Ok(NewRoom {
            room_id,
            host_id,
            events,
        })
    }

    /// Admits a player by display name and returns their new id.
    ///
    /// # Errors
    /// `NotFound` for an unknown room, otherwise whatever
    /// [`Room::add_pending_player`] returns.
    pub async fn join_room(&self, room_id: RoomId, name: &str) -> Result<PlayerId, RoomError> {
        let room = self.room(room_id).await?;
        let player = Player::new(name);
        let player_id = player.id;
        room.lock().await.add_pending_player(player)?;
        Ok(player_id)
    }

    pub async fn register_connected(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        self.room(room_id).await?.lock().await.register_connected(player_id)
    }

    pub async fn register_disconnected(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        self.room(room_id).await?.lock().await.register_disconnected(player_id)
    }

    pub async fn start_game(&self, room_id: RoomId, player_id: PlayerId) -> Result<(), RoomError> {
        self.room(room_id).await?.lock().await.start_game(player_id)
    }

    /// Runs a named game action in a room.
    pub async fn execute_action(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        action: &str,
        args: Option<Value>,
    ) -> Result<Option<Value>, ActionError> {
        let room = self.room(room_id).await?;
        let mut room = room.lock().await;
        room.execute_game_action(player_id, action, args)
            .inspect_err(|e| tracing::debug!(%room_id, %player_id, action, error = %e, "action rejected"))
    }

    /// The current snapshot of a room as one of its players sees it.
    pub async fn snapshot(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
    ) -> Result<RoomSnapshot, RoomError> {
        self.room(room_id).await?.lock().await.snapshot_for(player_id)
    }

    async fn room(&self, room_id: RoomId) -> Result<SharedRoom, RoomError> {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .cloned()
            .ok_or(RoomError::NotFound(room_id))
    }

    // -- Reclamation --------------------------------------------------------

    /// One reclamation pass: expires stale pending players everywhere and
    /// drops rooms that are dead. Returns how many rooms were dropped.
    ///
    /// Rooms are inspected one at a time without holding the map lock, so
    /// a room may vanish or see activity between the scan and the removal.
    pub async fn cleanup(&self) -> usize {
        let rooms: Vec<(RoomId, SharedRoom)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, room)| (*id, Arc::clone(room)))
            .collect();

        let mut dead = Vec::new();
        for (room_id, room) in rooms {
            let mut room = room.lock().await;
            room.remove_expired_players();
            if room.is_dead(room.idle_timeout()) {
                dead.push(room_id);
            }
        }
        if dead.is_empty() {
            return 0;
        }
        self.remove_dead(dead).await
    }

    /// Drops the candidates that are still dead. Each room is checked again
    /// under its own lock, with the map locked, so one that saw activity
    /// since the scan survives.
    async fn remove_dead(&self, candidates: Vec<RoomId>) -> usize {
        let mut rooms = self.rooms.write().await;
        let mut removed = 0;
        for room_id in candidates {
            let Some(room) = rooms.get(&room_id).cloned() else {
                continue;
            };
            let room = room.lock().await;
            if !room.is_dead(room.idle_timeout()) {
                tracing::debug!(%room_id, "room revived before reclamation");
                continue;
            }
            rooms.remove(&room_id);
            tracing::info!(%room_id, "room reclaimed");
            removed += 1;
        }
        removed
    }

    /// Runs [`cleanup`](Self::cleanup) every `cleanup_interval` on a
    /// background task. The task stops once the manager is dropped.
    pub fn spawn_cleanup(self: &Arc<Self>) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        let period = self.config.cleanup_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(manager) = manager.upgrade() else {
                    tracing::debug!("room manager dropped, cleanup task exiting");
                    break;
                };
                let removed = manager.cleanup().await;
                if removed > 0 {
                    tracing::debug!(removed, "cleanup pass finished");
                }
            }
        })
    }
}

impl std::fmt::Debug for RoomManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomManager")
            .field("games", &self.registry.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::GameConfig;

    fn manager() -> RoomManager {
        let mut registry = GameRegistry::new();
        registry
            .register(GameConfig::new("idle", 1, 4, |_| unreachable!("never started")))
            .unwrap();
        RoomManager::new(registry, RoomConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_dead_spares_room_active_since_scan() {
        let mgr = manager();
        let new = mgr.create_room("idle", "host").await.unwrap();
        mgr.register_connected(new.room_id, new.host_id).await.unwrap();

        tokio::time::advance(mgr.config().waiting_timeout + Duration::from_secs(1)).await;
        mgr.join_room(new.room_id, "late").await.unwrap();

        assert_eq!(mgr.remove_dead(vec![new.room_id]).await, 0);
        assert_eq!(mgr.room_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_dead_drops_idle_room() {
        let mgr = manager();
        let new = mgr.create_room("idle", "host").await.unwrap();
        mgr.register_connected(new.room_id, new.host_id).await.unwrap();

        tokio::time::advance(mgr.config().waiting_timeout + Duration::from_secs(1)).await;

        assert_eq!(mgr.remove_dead(vec![new.room_id, RoomId(0)]).await, 1);
        assert_eq!(mgr.room_count().await, 0);
    }
}
