//! # BoredGames
//!
//! Server engine for multiplayer turn-based board games.
//!
//! Players gather in a room, the host starts a game, and every mutation
//! produces a fresh per-player snapshot on the room's event queue. Game
//! moves are named actions with JSON arguments, dispatched to whichever
//! ruleset the room hosts. The Apologies ruleset ships built in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boredgames::prelude::*;
//!
//! # async fn run() -> Result<(), BoredGamesError> {
//! let server = GameServer::builder().build()?;
//! let _cleanup = server.start_cleanup();
//!
//! let room = server.manager().create_room(GAME_NAME, "alice").await?;
//! server.manager().register_connected(room.room_id, room.host_id).await?;
//!
//! let reply = server
//!     .handle_action(room.room_id, room.host_id, br#"{ "action": "stats" }"#)
//!     .await;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

mod error;
mod server;
pub mod telemetry;

pub use error::BoredGamesError;
pub use server::{GameServer, GameServerBuilder};

pub use boredgames_apologies as apologies;
pub use boredgames_protocol as protocol;
pub use boredgames_room as room;

/// Everything a server binary usually needs, in one import.
pub mod prelude {
    pub use crate::{BoredGamesError, GameServer, GameServerBuilder};
    pub use boredgames_apologies::{ApologiesGame, GAME_NAME};
    pub use boredgames_protocol::apologies::{
        Card, DrawCardResponse, GameStats, Move, MovePawnArgs, Moveset, Phase,
    };
    pub use boredgames_protocol::{
        ActionRequest, ActionResponse, Codec, GameSnapshot, JsonCodec, PlayerId, RoomId,
        RoomSnapshot, RoomState,
    };
    pub use boredgames_room::{
        GameConfig, GameError, RoomConfig, RoomError, RoomEvent, RoomEvents, RoomManager,
        Ruleset,
    };
}
