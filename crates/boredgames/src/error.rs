//! Unified error type for the BoredGames facade.

use boredgames_protocol::{ErrorResponse, ProtocolError};
use boredgames_room::{ActionError, GameError, RoomError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `boredgames` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BoredGamesError {
    /// The request body could not be decoded, or a reply not encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The ruleset refused the action.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl From<ActionError> for BoredGamesError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Room(e) => Self::Room(e),
            ActionError::Game(e) => Self::Game(e),
        }
    }
}

impl BoredGamesError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Room(RoomError::NotFound(_) | RoomError::PlayerNotFound(_)) => 404,
            Self::Room(
                RoomError::RoomFull(_)
                | RoomError::DuplicateName(_)
                | RoomError::AlreadyStarted(_)
                | RoomError::CreateFailed,
            ) => 409,
            Self::Game(GameError::Internal(_)) => 500,
            Self::Protocol(ProtocolError::Encode(_)) => 500,
            Self::Protocol(_) | Self::Room(_) | Self::Game(_) => 400,
        }
    }

    /// The client-facing form of this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.status_code(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boredgames_protocol::{PlayerId, RoomId};

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let bg_err: BoredGamesError = err.into();
        assert!(matches!(bg_err, BoredGamesError::Protocol(_)));
        assert_eq!(bg_err.status_code(), 400);
    }

    #[test]
    fn test_from_action_error_unwraps_family() {
        let room: BoredGamesError = ActionError::Room(RoomError::NotStarted(RoomId(1))).into();
        let game: BoredGamesError = ActionError::Game(GameError::WrongPlayer).into();

        assert!(matches!(room, BoredGamesError::Room(RoomError::NotStarted(_))));
        assert!(matches!(game, BoredGamesError::Game(GameError::WrongPlayer)));
    }

    #[test]
    fn test_status_code_not_found_is_404() {
        let room: BoredGamesError = RoomError::NotFound(RoomId(1)).into();
        let player: BoredGamesError = RoomError::PlayerNotFound(PlayerId(2)).into();
        assert_eq!(room.status_code(), 404);
        assert_eq!(player.status_code(), 404);
    }

    #[test]
    fn test_status_code_conflicts_are_409() {
        let errors: Vec<BoredGamesError> = vec![
            RoomError::RoomFull(RoomId(1)).into(),
            RoomError::DuplicateName("alice".into()).into(),
            RoomError::AlreadyStarted(RoomId(1)).into(),
            RoomError::CreateFailed.into(),
        ];
        for err in errors {
            assert_eq!(err.status_code(), 409, "{err}");
        }
    }

    #[test]
    fn test_status_code_rule_errors_are_400() {
        let errors: Vec<BoredGamesError> = vec![
            GameError::WrongPlayer.into(),
            GameError::GameEnded.into(),
            GameError::InvalidMove("a_S -> a_9".into()).into(),
            RoomError::NotHost(PlayerId(3)).into(),
            RoomError::HostNotConnected(RoomId(1)).into(),
        ];
        for err in errors {
            assert_eq!(err.status_code(), 400, "{err}");
        }
    }

    #[test]
    fn test_status_code_internal_is_500() {
        let err: BoredGamesError = GameError::Internal("slider loop".into()).into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_to_response_carries_message() {
        let err: BoredGamesError = GameError::UnknownAction("fly".into()).into();
        let response = err.to_response();
        assert_eq!(response.code, 400);
        assert!(response.message.contains("fly"));
    }
}
