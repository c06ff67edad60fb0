//! Wire models for the Apologies ruleset.
//!
//! Board positions travel as tile names (`"a_S"`, `"b_7"`, `"c_s3"`,
//! `"d_H"`), never as internal handles, so a client can replay exactly
//! what it was offered.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// A card rank. There are no sixes or nines in the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    Apologies,
    One,
    Two,
    Three,
    Four,
    Five,
    Seven,
    Eight,
    Ten,
    Eleven,
    Twelve,
}

impl Card {
    /// Every rank in the deck, in ascending order.
    pub const ALL: [Card; 11] = [
        Card::Apologies,
        Card::One,
        Card::Two,
        Card::Three,
        Card::Four,
        Card::Five,
        Card::Seven,
        Card::Eight,
        Card::Ten,
        Card::Eleven,
        Card::Twelve,
    ];

    /// The face value. "Apologies" has no number and counts as zero.
    pub fn value(self) -> usize {
        match self {
            Card::Apologies => 0,
            Card::One => 1,
            Card::Two => 2,
            Card::Three => 3,
            Card::Four => 4,
            Card::Five => 5,
            Card::Seven => 7,
            Card::Eight => 8,
            Card::Ten => 10,
            Card::Eleven => 11,
            Card::Twelve => 12,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Turn phase. Each seat draws, then moves; `End` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    P1Draw,
    P1Move,
    P2Draw,
    P2Move,
    P3Draw,
    P3Move,
    P4Draw,
    P4Move,
    End,
}

impl Phase {
    /// The draw phase for a seat (0-based, wraps modulo 4).
    pub fn draw_for(seat: usize) -> Self {
        match seat % 4 {
            0 => Phase::P1Draw,
            1 => Phase::P2Draw,
            2 => Phase::P3Draw,
            _ => Phase::P4Draw,
        }
    }

    /// The move phase for a seat (0-based, wraps modulo 4).
    pub fn move_for(seat: usize) -> Self {
        match seat % 4 {
            0 => Phase::P1Move,
            1 => Phase::P2Move,
            2 => Phase::P3Move,
            _ => Phase::P4Move,
        }
    }

    /// The seat whose turn it is, or `None` once the game has ended.
    pub fn seat(self) -> Option<usize> {
        match self {
            Phase::P1Draw | Phase::P1Move => Some(0),
            Phase::P2Draw | Phase::P2Move => Some(1),
            Phase::P3Draw | Phase::P3Move => Some(2),
            Phase::P4Draw | Phase::P4Move => Some(3),
            Phase::End => None,
        }
    }

    pub fn is_draw(self) -> bool {
        matches!(
            self,
            Phase::P1Draw | Phase::P2Draw | Phase::P3Draw | Phase::P4Draw
        )
    }

    pub fn is_move(self) -> bool {
        matches!(
            self,
            Phase::P1Move | Phase::P2Move | Phase::P3Move | Phase::P4Move
        )
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// One pawn relocation. `effect` names the rule that licensed it and is
/// replayed by the server to re-derive the legal destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: String,
    pub to: String,
    pub effect: i32,
}

/// A destination reachable from `from`, with every effect that reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOpts {
    pub from: String,
    pub to: String,
    pub effects: Vec<i32>,
}

/// All options for one movable pawn, keyed by the tile it stands on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moveset {
    pub pawn: String,
    pub opts: Vec<MoveOpts>,
}

/// Arguments of the `move` action. `split_move` is only valid after
/// drawing a seven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePawnArgs {
    #[serde(rename = "move")]
    pub pawn_move: Move,
    #[serde(default)]
    pub split_move: Option<Move>,
}

/// Reply to the `draw` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCardResponse {
    pub card: Card,
    pub movesets: Vec<Moveset>,
}

/// Per-seat statistics; also the reply to the `stats` action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameStats {
    pub moves_made: Vec<u32>,
    pub pawns_killed: Vec<u32>,
    /// Whole seconds since the game started, frozen once it ends.
    pub game_time_elapsed: u64,
}

/// The Apologies part of a room snapshot.
///
/// `pieces` is seat-major, pawn-minor: `pieces[seat][pawn]` is a tile name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApologiesSnapshot {
    pub view_num: u64,
    pub phase: Phase,
    pub last_drawn_card: Option<Card>,
    pub last_completed_move: Option<MovePawnArgs>,
    pub turn_order: Vec<String>,
    pub pieces: Vec<Vec<String>>,
    pub current_movesets: Option<Vec<Moveset>>,
    pub stats: GameStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_all_skips_six_and_nine() {
        let values: Vec<usize> = Card::ALL.iter().map(|c| c.value()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5, 7, 8, 10, 11, 12]);
    }

    #[test]
    fn test_phase_seat_and_kind() {
        assert_eq!(Phase::P3Move.seat(), Some(2));
        assert_eq!(Phase::End.seat(), None);
        assert!(Phase::P4Draw.is_draw());
        assert!(!Phase::P4Draw.is_move());
        assert_eq!(Phase::draw_for(4), Phase::P1Draw);
        assert_eq!(Phase::move_for(1), Phase::P2Move);
    }

    #[test]
    fn test_move_pawn_args_uses_move_key() {
        let json = r#"{
            "move": { "from": "a_S", "to": "a_4", "effect": 2 }
        }"#;
        let args: MovePawnArgs = serde_json::from_str(json).unwrap();

        assert_eq!(args.pawn_move.from, "a_S");
        assert_eq!(args.pawn_move.effect, 2);
        assert!(args.split_move.is_none());
    }

    #[test]
    fn test_move_pawn_args_rejects_missing_move() {
        let result: Result<MovePawnArgs, _> =
            serde_json::from_str(r#"{ "split_move": null }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_card_serializes_by_name() {
        let json = serde_json::to_string(&Card::Apologies).unwrap();
        assert_eq!(json, "\"Apologies\"");
    }
}
