//! Error types for the room layer and the ruleset layer.
//!
//! These are two disjoint families. A [`RoomError`] means the request
//! didn't fit the room (wrong phase, unknown player, full room). A
//! [`GameError`] means the ruleset refused it (out of turn, illegal move,
//! unknown action). Both are the client's fault; neither is fatal.

use boredgames_protocol::{PlayerId, RoomId};

/// Errors raised by rooms, the room manager, and the game registry.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or was already reclaimed).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The player is not part of this room.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// The roster (or the pending list) is at capacity.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The game can't start: wrong phase or wrong number of players.
    #[error("room cannot start: {0}")]
    CannotStart(String),

    /// The room no longer admits players because its game has started.
    #[error("room {0} has already started")]
    AlreadyStarted(RoomId),

    /// A game action arrived before the host started the game.
    #[error("room {0} has not started")]
    NotStarted(RoomId),

    /// Somebody tried to join before the host connected.
    #[error("host of room {0} has not connected yet")]
    HostNotConnected(RoomId),

    /// Only the host may do this.
    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    /// The player is known but their stream is not connected.
    #[error("player {0} is not connected")]
    PlayerNotConnected(PlayerId),

    /// Display names are unique within a room.
    #[error("display name {0:?} is already taken")]
    DuplicateName(String),

    /// A freshly generated room id collided with a live room.
    #[error("room creation failed")]
    CreateFailed,

    /// No ruleset is registered under this name.
    #[error("unknown game type {0:?}")]
    UnknownGame(String),

    /// Two rulesets tried to register under the same name.
    #[error("game type {0:?} is already registered")]
    DuplicateGame(String),
}

/// Errors raised by a ruleset or by action dispatch.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The game is over; no further actions are accepted.
    #[error("game has ended")]
    GameEnded,

    /// No action with this name is registered for the ruleset.
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    /// The arguments are missing, unexpected, or of the wrong shape.
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// The action needs to know who is calling.
    #[error("action {0:?} requires a player")]
    PlayerRequired(String),

    /// The caller is not the player whose turn it is.
    #[error("wrong player for the current phase")]
    WrongPlayer,

    /// The move is not among the moves the server would itself offer.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The ruleset found itself in an inconsistent state.
    #[error("internal game error: {0}")]
    Internal(String),
}

/// Failure of a game action routed through a room: either the room
/// refused it or the ruleset did.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Game(#[from] GameError),
}
