//! Core wire types for BoredGames.
//!
//! Everything in this module is produced for (or consumed from) the
//! transport layer: the identifiers clients hold on to, the room snapshot
//! that gets streamed after every mutation, and the request/response pair
//! for game actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::apologies::ApologiesSnapshot;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Player ids are handed out by the room layer when a player is admitted
/// and double as that player's key for every later request, so they are
/// random rather than sequential.
///
/// `#[serde(transparent)]` keeps the JSON form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{:016x}", self.0)
    }
}

/// A unique identifier for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// WaitingForPlayers → InProgress → Ended
/// ```
///
/// A room stays in `WaitingForPlayers` forever if its host leaves before
/// starting; the roster is cleared and the room becomes reclaimable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    WaitingForPlayers,
    InProgress,
    Ended,
}

impl RoomState {
    /// Returns `true` if the room is still accepting players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }

    /// Returns `true` if a game is currently running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Ruleset-specific part of a room snapshot.
///
/// This is a closed sum type: every ruleset the server can host has one
/// variant here. The `game` tag tells clients which shape to expect:
///   `{ "game": "apologies", "phase": "P1Draw", ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameSnapshot {
    Apologies(ApologiesSnapshot),
}

/// Everything a client needs to render a room, as seen by one player.
///
/// `view_num` increases by one on every room mutation, so a client can
/// drop snapshots older than the one it already has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub view_num: u64,
    pub room_state: RoomState,
    pub player_names: Vec<String>,
    pub player_connected: Vec<bool>,
    pub game: Option<GameSnapshot>,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A named game action submitted by a player.
///
/// `args` is left as raw JSON; the dispatch layer deserializes it into the
/// argument type the action declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub args: Option<serde_json::Value>,
}

/// A structured, user-facing error.
///
/// `code` follows HTTP conventions (400 bad request, 404 not found,
/// 409 conflict).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// The reply to an [`ActionRequest`].
///
/// ```text
/// { "status": "ok", "result": { ... } }      // result may be null
/// { "status": "error", "code": 400, "message": "invalid move" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResponse {
    Ok { result: Option<serde_json::Value> },
    Error(ErrorResponse),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apologies::Phase;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_room_id_display_is_prefixed_hex() {
        assert_eq!(RoomId(255).to_string(), "R-00000000000000ff");
        assert_eq!(PlayerId(1).to_string(), "P-0000000000000001");
    }

    #[test]
    fn test_room_state_is_joinable_only_while_waiting() {
        assert!(RoomState::WaitingForPlayers.is_joinable());
        assert!(!RoomState::InProgress.is_joinable());
        assert!(!RoomState::Ended.is_joinable());
        assert!(RoomState::InProgress.is_active());
    }

    #[test]
    fn test_game_snapshot_is_internally_tagged() {
        let snapshot = GameSnapshot::Apologies(ApologiesSnapshot::default());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["game"], "apologies");
        assert_eq!(json["phase"], serde_json::json!(Phase::P1Draw));
    }

    #[test]
    fn test_action_request_args_default_to_none() {
        let req: ActionRequest =
            serde_json::from_str(r#"{ "action": "draw" }"#).unwrap();
        assert_eq!(req.action, "draw");
        assert!(req.args.is_none());
    }

    #[test]
    fn test_action_response_error_json_format() {
        let resp = ActionResponse::Error(ErrorResponse {
            code: 400,
            message: "invalid move".into(),
        });
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], 400);
        assert_eq!(json["message"], "invalid move");
    }

    #[test]
    fn test_action_response_ok_without_result() {
        let json =
            serde_json::to_value(ActionResponse::Ok { result: None }).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["result"].is_null());
    }

    #[test]
    fn test_decode_unknown_room_state_returns_error() {
        let result: Result<RoomState, _> = serde_json::from_str("\"Paused\"");
        assert!(result.is_err());
    }
}
