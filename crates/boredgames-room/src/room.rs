//! A single room: roster, lifecycle, and the active ruleset.
//!
//! `Room` is plain synchronous state. The manager wraps each one in its own
//! `tokio::sync::Mutex`, so every method here runs with the room locked and
//! sees (and leaves) a consistent state. Methods that fail return before
//! touching anything.
//!
//! Every successful mutation bumps `view_num` and pushes a [`RoomEvent`]
//! onto the room's outbound channel, built while the lock is still held.

use std::time::Duration;

use boredgames_protocol::{PlayerId, RoomId, RoomSnapshot, RoomState};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::{ActionError, Game, GameConfig, Player, RoomConfig, RoomError};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A change notification: one fresh snapshot per seated player.
///
/// `player_ids[i]` is the recipient of `snapshots[i]`.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub room_id: RoomId,
    pub player_ids: Vec<PlayerId>,
    pub snapshots: Vec<RoomSnapshot>,
}

impl RoomEvent {
    /// The snapshot addressed to `player_id`, if they are a recipient.
    pub fn for_player(&self, player_id: PlayerId) -> Option<&RoomSnapshot> {
        self.player_ids
            .iter()
            .position(|id| *id == player_id)
            .and_then(|i| self.snapshots.get(i))
    }

    /// `view_num` of the snapshots in this event.
    pub fn view_num(&self) -> Option<u64> {
        self.snapshots.first().map(|s| s.view_num)
    }
}

/// The receiving half of a room's event queue, drained by the transport.
pub type RoomEvents = mpsc::UnboundedReceiver<RoomEvent>;

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A lobby and, once started, the game played in it.
pub struct Room {
    id: RoomId,
    view_num: u64,
    state: RoomState,
    last_activity: Instant,
    host: PlayerId,
    players: Vec<Player>,
    pending: Vec<Player>,
    game: Option<Box<dyn Game>>,
    game_config: GameConfig,
    config: RoomConfig,
    events: mpsc::UnboundedSender<RoomEvent>,
}

impl Room {
    /// Creates a waiting room with `host` as its first pending player.
    ///
    /// Returns the room together with the receiving end of its event queue.
    pub fn new(
        id: RoomId,
        host: Player,
        game_config: GameConfig,
        config: RoomConfig,
    ) -> (Self, RoomEvents) {
        let (events, receiver) = mpsc::unbounded_channel();
        let room = Self {
            id,
            view_num: 0,
            state: RoomState::WaitingForPlayers,
            last_activity: Instant::now(),
            host: host.id,
            players: Vec::new(),
            pending: vec![host],
            game: None,
            game_config,
            config,
            events,
        };
        (room, receiver)
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn view_num(&self) -> u64 {
        self.view_num
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    /// Connected-at-least-once players, in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Players admitted but not yet connected.
    pub fn pending(&self) -> &[Player] {
        &self.pending
    }

    pub fn game_config(&self) -> &GameConfig {
        &self.game_config
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    // -- Roster -------------------------------------------------------------

    /// Admits a new player to the pending list.
    ///
    /// # Errors
    /// - `AlreadyStarted` once the game has started.
    /// - `HostNotConnected` if the host hasn't connected yet.
    /// - `RoomFull` if the roster or the pending list is at capacity.
    /// - `DuplicateName` if the display name is already in use.
    pub fn add_pending_player(&mut self, player: Player) -> Result<(), RoomError> {
        if !self.state.is_joinable() {
            return Err(RoomError::AlreadyStarted(self.id));
        }
        if self.players.is_empty() && player.id != self.host {
            return Err(RoomError::HostNotConnected(self.id));
        }
        if self.players.len() >= self.game_config.max_players
            || self.pending.len() >= self.config.max_pending
        {
            return Err(RoomError::RoomFull(self.id));
        }
        if self
            .players
            .iter()
            .chain(&self.pending)
            .any(|p| p.name == player.name)
        {
            return Err(RoomError::DuplicateName(player.name));
        }

        tracing::info!(room_id = %self.id, player_id = %player.id, name = %player.name, "player admitted");
        self.pending.push(player);
        self.touch();
        Ok(())
    }

    /// Marks a player's stream as open.
    ///
    /// While waiting, the first connect promotes the player from the pending
    /// list to the roster. After the game has started the ruleset is told
    /// about the reconnect.
    ///
    /// # Errors
    /// `RoomFull` if promotion would exceed the player cap, `PlayerNotFound`
    /// if the player isn't in this room.
    pub fn register_connected(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if self.state.is_joinable() {
            if let Some(index) = self.pending.iter().position(|p| p.id == player_id) {
                if self.players.len() >= self.game_config.max_players {
                    return Err(RoomError::RoomFull(self.id));
                }
                let player = self.pending.remove(index);
                self.players.push(player);
            }
        }

        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(RoomError::PlayerNotFound(player_id))?;
        player.connected = true;

        if !self.state.is_joinable() {
            if let Some(game) = self.game.as_mut() {
                game.player_reconnected(player);
            }
        }

        tracing::info!(room_id = %self.id, %player_id, "player connected");
        self.emit();
        Ok(())
    }

    /// Marks a player's stream as closed.
    ///
    /// While waiting, the player gives up their seat; if that player is the
    /// host the whole roster is cleared and the room is left to be
    /// reclaimed. After the game has started only the flag flips and the
    /// ruleset decides what a missing player means.
    ///
    /// # Errors
    /// `PlayerNotFound` if the player isn't seated in this room.
    pub fn register_disconnected(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(RoomError::PlayerNotFound(player_id))?;
        self.players[index].connected = false;

        if self.state.is_joinable() {
            self.players.remove(index);
            if player_id == self.host {
                self.players.clear();
                self.pending.clear();
                tracing::info!(room_id = %self.id, "host left, room abandoned");
            }
        } else if let Some(game) = self.game.as_mut() {
            game.player_disconnected(&self.players[index]);
        }

        tracing::info!(room_id = %self.id, %player_id, "player disconnected");
        self.emit();
        Ok(())
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Starts the game with the current roster, in join order.
    ///
    /// # Errors
    /// - `AlreadyStarted` if a game is running or has finished.
    /// - `NotHost` if the caller isn't the host.
    /// - `CannotStart` if the roster size is outside the game's bounds.
    pub fn start_game(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if !self.state.is_joinable() {
            return Err(RoomError::AlreadyStarted(self.id));
        }
        if player_id != self.host {
            return Err(RoomError::NotHost(player_id));
        }
        let count = self.players.len();
        if !self.game_config.accepts(count) {
            return Err(RoomError::CannotStart(format!(
                "{} needs {}-{} players, room has {count}",
                self.game_config.name, self.game_config.min_players, self.game_config.max_players
            )));
        }

        self.game = Some((self.game_config.construct)(self.players.clone()));
        self.state = RoomState::InProgress;

        tracing::info!(room_id = %self.id, game = %self.game_config.name, players = count, "game started");
        self.emit();
        Ok(())
    }

    /// Runs a named game action on behalf of a seated, connected player.
    ///
    /// # Errors
    /// `ActionError::Room` if the game hasn't started or the caller can't
    /// act; `ActionError::Game` for anything the ruleset rejects. Either
    /// way nothing changes and no event is emitted.
    pub fn execute_game_action(
        &mut self,
        player_id: PlayerId,
        action: &str,
        args: Option<Value>,
    ) -> Result<Option<Value>, ActionError> {
        if self.state.is_joinable() {
            return Err(RoomError::NotStarted(self.id).into());
        }
        let player = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(RoomError::PlayerNotFound(player_id))?;
        if !player.connected {
            return Err(RoomError::PlayerNotConnected(player_id).into());
        }
        let game = self.game.as_mut().ok_or(RoomError::NotStarted(self.id))?;

        let result = game.execute(action, Some(player), args)?;

        if game.is_over() && self.state != RoomState::Ended {
            self.state = RoomState::Ended;
            tracing::info!(room_id = %self.id, "game ended");
        }
        self.emit();
        Ok(result)
    }

    // -- Views --------------------------------------------------------------

    /// The room as `player_id` sees it. Pending players get a view too.
    ///
    /// # Errors
    /// `PlayerNotFound` if the player isn't in this room.
    pub fn snapshot_for(&self, player_id: PlayerId) -> Result<RoomSnapshot, RoomError> {
        let viewer = self
            .players
            .iter()
            .chain(&self.pending)
            .find(|p| p.id == player_id)
            .ok_or(RoomError::PlayerNotFound(player_id))?;
        Ok(self.snapshot(viewer))
    }

    fn snapshot(&self, viewer: &Player) -> RoomSnapshot {
        RoomSnapshot {
            view_num: self.view_num,
            room_state: self.state,
            player_names: self.players.iter().map(|p| p.name.clone()).collect(),
            player_connected: self.players.iter().map(|p| p.connected).collect(),
            game: self.game.as_ref().map(|g| g.view_for(viewer)),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn emit(&mut self) {
        self.view_num += 1;
        self.touch();

        let event = RoomEvent {
            room_id: self.id,
            player_ids: self.players.iter().map(|p| p.id).collect(),
            snapshots: self.players.iter().map(|p| self.snapshot(p)).collect(),
        };
        if self.events.send(event).is_err() {
            tracing::warn!(room_id = %self.id, view_num = self.view_num, "event receiver dropped");
        }
    }

    // -- Reclamation --------------------------------------------------------

    /// Returns `true` if nobody can ever use this room again, or if it has
    /// been idle for longer than `timeout`.
    pub fn is_dead(&self, timeout: Duration) -> bool {
        let abandoned =
            self.players.is_empty() && !self.pending.iter().any(|p| p.id == self.host);
        abandoned || self.last_activity.elapsed() > timeout
    }

    /// Idle timeout that applies in the current state.
    pub fn idle_timeout(&self) -> Duration {
        if self.state.is_active() {
            self.config.in_progress_timeout
        } else {
            self.config.waiting_timeout
        }
    }

    /// Drops pending players who never connected. Once the game has started
    /// nobody else can connect, so the whole list goes.
    ///
    /// Returns how many were dropped.
    pub fn remove_expired_players(&mut self) -> usize {
        let before = self.pending.len();
        if self.state.is_joinable() {
            let ttl = self.config.pending_ttl;
            self.pending.retain(|p| p.created_at.elapsed() <= ttl);
        } else {
            self.pending.clear();
        }
        let removed = before - self.pending.len();
        if removed > 0 {
            tracing::debug!(room_id = %self.id, removed, "expired pending players");
        }
        removed
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("view_num", &self.view_num)
            .field("state", &self.state)
            .field("host", &self.host)
            .field("players", &self.players)
            .field("pending", &self.pending)
            .field("game", &self.game_config.name)
            .finish_non_exhaustive()
    }
}
