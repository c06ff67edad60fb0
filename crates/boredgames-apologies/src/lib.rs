//! The Apologies ruleset for BoredGames.
//!
//! A four-player race around a looping track: draw a card, move a pawn,
//! bump opponents back to start, get all four pawns home first.
//!
//! # Key types
//!
//! - [`ApologiesGame`]: the ruleset, with actions `draw`, `move`, `stats`
//! - [`Board`]: tile arena, pawn positions, move generation and execution
//! - [`CardDeck`]: the self-refilling draw pile
//! - [`MoveEffect`]: the rule a move was generated by
//!
//! Register it with a room manager through [`game_config`].

mod board;
mod deck;
mod game;
mod moves;

pub use board::{Board, PAWNS, PLAYERS, Tile, TileId, TileKind};
pub use deck::CardDeck;
pub use game::{ApologiesGame, ApologiesResponse, GAME_NAME, game_config};
pub use moves::MoveEffect;
