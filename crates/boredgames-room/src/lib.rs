//! Rooms, players, and action dispatch for BoredGames.
//!
//! Each room is a plain struct behind its own mutex. The room owns the
//! roster and at most one running ruleset, which it drives through the
//! object-safe [`Game`] trait; rulesets themselves implement [`Ruleset`]
//! and declare their actions in an [`ActionTable`].
//!
//! # Key types
//!
//! - [`Ruleset`]: the trait game developers implement
//! - [`Action`] / [`ActionTable`]: named, typed actions dispatched by name
//! - [`Room`]: roster, lifecycle, and change notification for one room
//! - [`RoomManager`]: creates rooms, routes calls, reclaims dead rooms
//! - [`GameConfig`] / [`GameRegistry`]: what games can be hosted
//! - [`RoomConfig`]: timeouts and caps

mod action;
mod config;
mod error;
mod manager;
mod player;
mod registry;
mod room;
mod ruleset;

pub use action::{Action, ActionTable};
pub use config::{GameConfig, GameConstructor, RoomConfig};
pub use error::{ActionError, GameError, RoomError};
pub use manager::{NewRoom, RoomManager};
pub use player::Player;
pub use registry::GameRegistry;
pub use room::{Room, RoomEvent, RoomEvents};
pub use ruleset::{Game, Ruleset};
