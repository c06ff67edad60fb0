//! Wire protocol for BoredGames.
//!
//! This crate defines what clients and the server exchange:
//!
//! - **Types** ([`RoomSnapshot`], [`GameSnapshot`], [`ActionRequest`],
//!   [`ActionResponse`], ids): the structures that get serialized.
//! - **Apologies models** ([`apologies`]): cards, phases, moves and the
//!   ruleset snapshot.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures
//!   become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (ActionRequest) → Room (player context)
//! ```

pub mod apologies;
mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ActionRequest, ActionResponse, ErrorResponse, GameSnapshot, PlayerId,
    RoomId, RoomSnapshot, RoomState,
};
