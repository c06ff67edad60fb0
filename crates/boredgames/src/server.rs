//! `GameServer` builder and the byte-level entry points.
//!
//! This is the entry point for embedding BoredGames in a transport. It
//! ties together the layers: protocol (bytes) → room manager → ruleset.
//! The transport itself (HTTP, websockets) lives outside this crate.

use std::sync::Arc;

use boredgames_protocol::{ActionResponse, Codec, JsonCodec, PlayerId, RoomId};
use boredgames_room::{GameConfig, GameRegistry, RoomConfig, RoomEvent, RoomManager};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::BoredGamesError;

/// Sent when even the error reply can't be encoded.
const ENCODE_FAILURE: &[u8] =
    br#"{"status":"error","code":500,"message":"failed to encode response"}"#;

/// Builder for configuring a [`GameServer`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use boredgames::prelude::*;
///
/// let server = GameServer::builder()
///     .room_config(RoomConfig {
///         waiting_timeout: Duration::from_secs(60),
///         ..RoomConfig::default()
///     })
///     .build()
///     .unwrap();
/// assert_eq!(server.manager().games(), vec![GAME_NAME.to_string()]);
/// ```
pub struct GameServerBuilder {
    room_config: RoomConfig,
    games: Vec<GameConfig>,
}

impl GameServerBuilder {
    /// Creates a new builder with default settings and the Apologies
    /// ruleset registered.
    pub fn new() -> Self {
        Self {
            room_config: RoomConfig::default(),
            games: vec![boredgames_apologies::game_config()],
        }
    }

    /// Sets the room timeouts and caps.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Registers an additional ruleset.
    pub fn register(mut self, game: GameConfig) -> Self {
        self.games.push(game);
        self
    }

    /// Builds the server.
    ///
    /// # Errors
    /// Returns `RoomError::DuplicateGame` if two rulesets share a name.
    pub fn build(self) -> Result<GameServer, BoredGamesError> {
        let mut registry = GameRegistry::new();
        for game in self.games {
            registry.register(game)?;
        }
        tracing::info!(games = ?registry.names(), "game server ready");

        Ok(GameServer {
            manager: Arc::new(RoomManager::new(registry, self.room_config)),
            codec: JsonCodec,
        })
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A game server: the room manager plus the wire codec.
///
/// Room lifecycle calls go straight to [`manager()`](Self::manager); game
/// actions and event pushes go through the byte-level helpers so every
/// transport speaks the same JSON.
pub struct GameServer {
    manager: Arc<RoomManager>,
    codec: JsonCodec,
}

impl GameServer {
    /// Creates a new builder.
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    pub fn manager(&self) -> &Arc<RoomManager> {
        &self.manager
    }

    /// Starts periodic room reclamation on the current runtime.
    pub fn start_cleanup(&self) -> JoinHandle<()> {
        self.manager.spawn_cleanup()
    }

    /// Decodes an action request body, runs it, and encodes the reply.
    ///
    /// Never fails: every error becomes an `{"status":"error", ...}` body
    /// carrying the error's status code.
    pub async fn handle_action(&self, room_id: RoomId, player_id: PlayerId, body: &[u8]) -> Vec<u8> {
        let response = match self.run_action(room_id, player_id, body).await {
            Ok(result) => ActionResponse::Ok { result },
            Err(e) => {
                let response = e.to_response();
                if response.code >= 500 {
                    tracing::error!(%room_id, %player_id, error = %e, "action failed");
                } else {
                    tracing::debug!(%room_id, %player_id, code = response.code, error = %e, "action refused");
                }
                ActionResponse::Error(response)
            }
        };

        self.codec.encode(&response).unwrap_or_else(|e| {
            tracing::error!(%room_id, error = %e, "failed to encode action response");
            ENCODE_FAILURE.to_vec()
        })
    }

    async fn run_action(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        body: &[u8],
    ) -> Result<Option<Value>, BoredGamesError> {
        let request = self.codec.decode_action(body)?;
        let result = self
            .manager
            .execute_action(room_id, player_id, &request.action, request.args)
            .await?;
        Ok(result)
    }

    /// Encodes each snapshot of an event for its recipient.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if a snapshot can't be serialized.
    pub fn encode_event(&self, event: &RoomEvent) -> Result<Vec<(PlayerId, Vec<u8>)>, BoredGamesError> {
        event
            .player_ids
            .iter()
            .zip(&event.snapshots)
            .map(|(player_id, snapshot)| Ok((*player_id, self.codec.encode(snapshot)?)))
            .collect()
    }
}
