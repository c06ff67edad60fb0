//! The Apologies ruleset: turn phases, actions, statistics, snapshot.

use std::sync::LazyLock;
use std::time::Instant;

use boredgames_protocol::GameSnapshot;
use boredgames_protocol::apologies::{
    ApologiesSnapshot, Card, DrawCardResponse, GameStats, MovePawnArgs, Moveset, Phase,
};
use boredgames_room::{Action, ActionTable, Game, GameConfig, GameError, Player, Ruleset};
use serde::Serialize;

use crate::board::{Board, PLAYERS};
use crate::deck::CardDeck;

/// Registered name of the ruleset.
pub const GAME_NAME: &str = "apologies";

/// The [`GameConfig`] rooms use to host Apologies: exactly four players.
pub fn game_config() -> GameConfig {
    GameConfig::new(GAME_NAME, PLAYERS, PLAYERS, ApologiesGame::construct)
}

/// What the Apologies actions return.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApologiesResponse {
    Draw(DrawCardResponse),
    Stats(GameStats),
}

static ACTIONS: LazyLock<ActionTable<ApologiesGame>> = LazyLock::new(|| {
    ActionTable::new()
        .with(Action::new("draw", ApologiesGame::draw_card))
        .with(Action::with_args("move", ApologiesGame::move_pawn))
        .with(Action::anonymous("stats", ApologiesGame::stats))
});

#[derive(Debug, Clone)]
struct Stats {
    started: Instant,
    ended: Option<Instant>,
    moves_made: [u32; PLAYERS],
    pawns_killed: [u32; PLAYERS],
}

impl Stats {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            ended: None,
            moves_made: [0; PLAYERS],
            pawns_killed: [0; PLAYERS],
        }
    }

    fn record_move(&mut self, seat: usize, kills: u32) {
        self.moves_made[seat] += 1;
        self.pawns_killed[seat] += kills;
    }

    fn to_wire(&self) -> GameStats {
        let until = self.ended.unwrap_or_else(Instant::now);
        GameStats {
            moves_made: self.moves_made.to_vec(),
            pawns_killed: self.pawns_killed.to_vec(),
            game_time_elapsed: until.duration_since(self.started).as_secs(),
        }
    }
}

/// One game of Apologies.
///
/// Seats follow the roster order the room passed in. Seat `n` may only
/// draw in `P{n+1}Draw` and only move in `P{n+1}Move`.
#[derive(Debug)]
pub struct ApologiesGame {
    players: Vec<Player>,
    board: Board,
    deck: CardDeck,
    phase: Phase,
    view_num: u64,
    last_completed_move: Option<MovePawnArgs>,
    current_movesets: Option<Vec<Moveset>>,
    stats: Stats,
}

impl ApologiesGame {
    pub fn new(players: Vec<Player>) -> Self {
        Self::with_deck(players, CardDeck::new())
    }

    fn with_deck(players: Vec<Player>, deck: CardDeck) -> Self {
        Self {
            players,
            board: Board::new(),
            deck,
            phase: Phase::P1Draw,
            view_num: 0,
            last_completed_move: None,
            current_movesets: None,
            stats: Stats::new(),
        }
    }

    fn construct(players: Vec<Player>) -> Box<dyn Game> {
        Box::new(Self::new(players))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    // -- Actions --------------------------------------------------------------

    fn draw_card(&mut self, player: &Player) -> Result<Option<ApologiesResponse>, GameError> {
        let seat = self.seat_for(player, Phase::is_draw)?;

        let card = self.deck.draw();
        let movesets = self.board.valid_moves(seat, card);
        let no_moves = movesets.is_empty();

        self.advance_phase(no_moves);
        if no_moves {
            tracing::debug!(seat, ?card, "no legal moves, turn skipped");
        }
        self.current_movesets = (!no_moves).then(|| movesets.clone());
        self.view_num += 1;

        Ok(Some(ApologiesResponse::Draw(DrawCardResponse { card, movesets })))
    }

    fn move_pawn(
        &mut self,
        player: &Player,
        args: MovePawnArgs,
    ) -> Result<Option<ApologiesResponse>, GameError> {
        let seat = self.seat_for(player, Phase::is_move)?;
        let card = self
            .deck
            .last_drawn()
            .ok_or_else(|| GameError::Internal("move phase without a drawn card".into()))?;

        // Work on a copy so a rejected move leaves nothing behind.
        let mut board = self.board.clone();
        match &args.split_move {
            Some(_) if card != Card::Seven => {
                return Err(GameError::InvalidMove("only a seven can be split".into()));
            }
            Some(split) => board.execute_split_move(&args.pawn_move, split, seat)?,
            None => board.execute_move(&args.pawn_move, card, seat)?,
        }
        board.resolve_slides()?;

        let kills: usize = (0..PLAYERS)
            .filter(|&other| other != seat)
            .map(|other| {
                board
                    .pawns_at_start(other)
                    .saturating_sub(self.board.pawns_at_start(other))
            })
            .sum();
        self.board = board;
        self.stats.record_move(seat, kills as u32);

        self.advance_phase(false);
        if self.phase == Phase::End {
            self.stats.ended = Some(Instant::now());
            tracing::info!(winner = ?self.board.winner(), "apologies game over");
        }

        self.last_completed_move = Some(args);
        self.current_movesets = None;
        self.view_num += 1;
        Ok(None)
    }

    fn stats(&mut self) -> Result<Option<ApologiesResponse>, GameError> {
        Ok(Some(ApologiesResponse::Stats(self.stats.to_wire())))
    }

    // -- Phases ---------------------------------------------------------------

    /// The caller's seat, provided it is their turn and the phase is of the
    /// right kind.
    fn seat_for(&self, player: &Player, kind: fn(Phase) -> bool) -> Result<usize, GameError> {
        let seat = self
            .players
            .iter()
            .position(|p| p == player)
            .ok_or(GameError::WrongPlayer)?;
        if kind(self.phase) && self.phase.seat() == Some(seat) {
            Ok(seat)
        } else {
            Err(GameError::WrongPlayer)
        }
    }

    fn advance_phase(&mut self, no_moves: bool) {
        let next = if self.board.winner().is_some() {
            Phase::End
        } else {
            match self.phase.seat() {
                None => Phase::End,
                Some(seat) if self.phase.is_draw() => {
                    if no_moves {
                        Phase::draw_for(seat + 1)
                    } else {
                        Phase::move_for(seat)
                    }
                }
                Some(seat) => {
                    if self.deck.last_drawn() == Some(Card::Two) {
                        Phase::draw_for(seat)
                    } else {
                        Phase::draw_for(seat + 1)
                    }
                }
            }
        };
        self.phase = next;
    }
}

impl Ruleset for ApologiesGame {
    type Response = ApologiesResponse;

    fn actions() -> &'static ActionTable<Self> {
        &ACTIONS
    }

    fn has_ended(&self) -> bool {
        self.phase == Phase::End
    }

    fn snapshot(&self, _viewer: &Player) -> GameSnapshot {
        GameSnapshot::Apologies(ApologiesSnapshot {
            view_num: self.view_num,
            phase: self.phase,
            last_drawn_card: self.deck.last_drawn(),
            last_completed_move: self.last_completed_move.clone(),
            turn_order: self.players.iter().map(|p| p.name.clone()).collect(),
            pieces: self.board.pawn_names(),
            current_movesets: self.current_movesets.clone(),
            stats: self.stats.to_wire(),
        })
    }

    fn on_player_disconnect(&mut self, player: &Player) {
        tracing::debug!(player_id = %player.id, "apologies player disconnected, game continues");
    }
}

#[cfg(test)]
mod tests {
    use boredgames_protocol::PlayerId;
    use boredgames_protocol::apologies::Move;
    use serde_json::json;

    use super::*;
    use crate::moves::MoveEffect;

    fn players() -> Vec<Player> {
        ["ann", "ben", "cat", "dan"]
            .iter()
            .enumerate()
            .map(|(i, name)| Player::with_id(PlayerId(i as u64 + 1), *name))
            .collect()
    }

    fn game(cards: &[Card]) -> (ApologiesGame, Vec<Player>) {
        let players = players();
        (ApologiesGame::with_deck(players.clone(), CardDeck::from_cards(cards)), players)
    }

    fn args(from: &str, to: &str, effect: MoveEffect) -> MovePawnArgs {
        MovePawnArgs {
            pawn_move: Move {
                from: from.into(),
                to: to.into(),
                effect: effect.code(),
            },
            split_move: None,
        }
    }

    fn snapshot(game: &ApologiesGame, viewer: &Player) -> ApologiesSnapshot {
        match game.snapshot(viewer) {
            GameSnapshot::Apologies(s) => s,
        }
    }

    #[test]
    fn test_game_config_seats_exactly_four() {
        let config = game_config();
        assert_eq!(config.name, "apologies");
        assert_eq!((config.min_players, config.max_players), (4, 4));
        assert!(!config.accepts(3));
    }

    #[test]
    fn test_new_game_snapshot() {
        let (game, players) = game(&[Card::One]);
        let snap = snapshot(&game, &players[0]);

        assert_eq!(snap.phase, Phase::P1Draw);
        assert_eq!(snap.view_num, 0);
        assert_eq!(snap.last_drawn_card, None);
        assert_eq!(snap.turn_order, vec!["ann", "ben", "cat", "dan"]);
        assert_eq!(snap.pieces[3], vec!["d_S"; 4]);
        assert_eq!(snap.stats.moves_made, vec![0; 4]);
    }

    #[test]
    fn test_draw_out_of_turn_is_wrong_player() {
        let (mut game, players) = game(&[Card::One]);

        let result = game.draw_card(&players[1]);
        assert!(matches!(result, Err(GameError::WrongPlayer)));
        assert_eq!(game.phase(), Phase::P1Draw);
        assert_eq!(game.deck.last_drawn(), None);
    }

    #[test]
    fn test_move_during_draw_phase_is_wrong_player() {
        let (mut game, players) = game(&[Card::One]);

        let result = game.move_pawn(&players[0], args("a_S", "a_4", MoveEffect::ExitStart));
        assert!(matches!(result, Err(GameError::WrongPlayer)));
    }

    #[test]
    fn test_unseated_player_is_wrong_player() {
        let (mut game, _) = game(&[Card::One]);
        let stranger = Player::with_id(PlayerId(99), "eve");

        assert!(matches!(game.draw_card(&stranger), Err(GameError::WrongPlayer)));
    }

    #[test]
    fn test_draw_without_moves_skips_turn() {
        let (mut game, players) = game(&[Card::Three]);

        let response = game.draw_card(&players[0]).unwrap();
        let Some(ApologiesResponse::Draw(draw)) = response else {
            panic!("expected a draw response");
        };
        assert_eq!(draw.card, Card::Three);
        assert!(draw.movesets.is_empty());
        assert_eq!(game.phase(), Phase::P2Draw);
        assert_eq!(snapshot(&game, &players[0]).current_movesets, None);
    }

    #[test]
    fn test_draw_then_move_passes_turn() {
        let (mut game, players) = game(&[Card::One]);

        game.draw_card(&players[0]).unwrap();
        assert_eq!(game.phase(), Phase::P1Move);
        assert!(snapshot(&game, &players[0]).current_movesets.is_some());

        let played = args("a_S", "a_4", MoveEffect::ExitStart);
        game.move_pawn(&players[0], played.clone()).unwrap();

        let snap = snapshot(&game, &players[2]);
        assert_eq!(snap.phase, Phase::P2Draw);
        assert_eq!(snap.pieces[0], vec!["a_4", "a_S", "a_S", "a_S"]);
        assert_eq!(snap.last_completed_move, Some(played));
        assert_eq!(snap.last_drawn_card, Some(Card::One));
        assert_eq!(snap.current_movesets, None);
        assert_eq!(snap.view_num, 2);
        assert_eq!(snap.stats.moves_made, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_two_grants_another_draw() {
        let (mut game, players) = game(&[Card::Two]);
        game.board.place(0, 0, "a_10");

        game.draw_card(&players[0]).unwrap();
        game.move_pawn(&players[0], args("a_10", "a_12", MoveEffect::Forward))
            .unwrap();

        assert_eq!(game.phase(), Phase::P1Draw);
    }

    #[test]
    fn test_fourth_seat_wraps_to_first() {
        let (mut game, players) = game(&[Card::One]);
        game.phase = Phase::P4Draw;

        game.draw_card(&players[3]).unwrap();
        game.move_pawn(&players[3], args("d_S", "d_4", MoveEffect::ExitStart))
            .unwrap();

        assert_eq!(game.phase(), Phase::P1Draw);
    }

    #[test]
    fn test_invalid_move_leaves_state_unchanged() {
        let (mut game, players) = game(&[Card::One]);
        game.draw_card(&players[0]).unwrap();
        let before = snapshot(&game, &players[0]);

        let result = game.move_pawn(&players[0], args("a_S", "a_5", MoveEffect::ExitStart));
        assert!(matches!(result, Err(GameError::InvalidMove(_))));
        assert_eq!(snapshot(&game, &players[0]).pieces, before.pieces);
        assert_eq!(game.phase(), Phase::P1Move);
    }

    #[test]
    fn test_split_needs_a_seven() {
        let (mut game, players) = game(&[Card::Eight]);
        game.board.place(0, 0, "a_5");
        game.board.place(0, 1, "a_10");
        game.draw_card(&players[0]).unwrap();

        let mut split = args("a_5", "a_8", MoveEffect::Split3);
        split.split_move = Some(Move {
            from: "a_10".into(),
            to: "a_14".into(),
            effect: MoveEffect::Split4.code(),
        });
        let result = game.move_pawn(&players[0], split);
        assert!(matches!(result, Err(GameError::InvalidMove(_))));
    }

    #[test]
    fn test_split_with_seven_moves_both_pawns() {
        let (mut game, players) = game(&[Card::Seven]);
        game.board.place(0, 0, "a_5");
        game.board.place(0, 1, "a_10");
        game.draw_card(&players[0]).unwrap();

        let mut split = args("a_5", "a_8", MoveEffect::Split3);
        split.split_move = Some(Move {
            from: "a_10".into(),
            to: "a_14".into(),
            effect: MoveEffect::Split4.code(),
        });
        game.move_pawn(&players[0], split).unwrap();

        assert_eq!(game.board.pawn_names()[0][..2], ["a_8", "a_14"]);
        assert_eq!(game.phase(), Phase::P2Draw);
    }

    #[test]
    fn test_capture_counts_as_kill() {
        let (mut game, players) = game(&[Card::Two]);
        game.board.place(0, 0, "a_4");
        game.board.place(1, 0, "a_6");

        game.draw_card(&players[0]).unwrap();
        game.move_pawn(&players[0], args("a_4", "a_6", MoveEffect::Forward))
            .unwrap();

        let stats = snapshot(&game, &players[0]).stats;
        assert_eq!(stats.pawns_killed, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_slide_kills_count_opponents_only() {
        let (mut game, players) = game(&[Card::One]);
        game.board.place(0, 0, "a_15");
        game.board.place(0, 1, "b_3");
        game.board.place(1, 0, "b_2");
        game.board.place(2, 0, "b_4");

        game.draw_card(&players[0]).unwrap();
        game.move_pawn(&players[0], args("a_15", "b_1", MoveEffect::Forward))
            .unwrap();

        let names = game.board.pawn_names();
        assert_eq!(names[0][..2], ["b_4", "a_S"]);
        assert_eq!(names[1][0], "b_S");
        assert_eq!(names[2][0], "c_S");
        assert_eq!(snapshot(&game, &players[0]).stats.pawns_killed, vec![2, 0, 0, 0]);
    }

    #[test]
    fn test_last_pawn_home_ends_game() {
        let (mut game, players) = game(&[Card::One]);
        for pawn in 0..3 {
            game.board.place(0, pawn, "a_H");
        }
        game.board.place(0, 3, "a_s5");

        game.draw_card(&players[0]).unwrap();
        game.move_pawn(&players[0], args("a_s5", "a_H", MoveEffect::Forward))
            .unwrap();

        assert_eq!(game.phase(), Phase::End);
        assert!(game.has_ended());
        assert!(game.stats.ended.is_some());

        let result = game.execute("draw", Some(&players[1]), None);
        assert!(matches!(result, Err(GameError::GameEnded)));
    }

    #[test]
    fn test_final_stats_come_from_snapshot_after_end() {
        let (mut game, players) = game(&[Card::One]);
        for pawn in 0..3 {
            game.board.place(0, pawn, "a_H");
        }
        game.board.place(0, 3, "a_s5");
        game.draw_card(&players[0]).unwrap();
        game.move_pawn(&players[0], args("a_s5", "a_H", MoveEffect::Forward))
            .unwrap();

        let result = game.execute("stats", None, None);
        assert!(matches!(result, Err(GameError::GameEnded)));

        let stats = snapshot(&game, &players[2]).stats;
        assert_eq!(stats.moves_made, vec![1, 0, 0, 0]);
        assert_eq!(stats, game.stats.to_wire());
    }

    #[test]
    fn test_any_finished_player_ends_game_on_next_transition() {
        let (mut game, players) = game(&[Card::Three]);
        for pawn in 0..4 {
            game.board.place(2, pawn, "c_H");
        }

        game.draw_card(&players[0]).unwrap();
        assert_eq!(game.phase(), Phase::End);
    }

    #[test]
    fn test_actions_dispatch_by_name() {
        let (mut game, players) = game(&[Card::One]);

        let draw = game.execute("draw", Some(&players[0]), None).unwrap().unwrap();
        assert_eq!(draw["card"], "One");
        assert_eq!(draw["movesets"][0]["pawn"], "a_S");

        let moved = game
            .execute(
                "move",
                Some(&players[0]),
                Some(json!({ "move": { "from": "a_S", "to": "a_4", "effect": 2 } })),
            )
            .unwrap();
        assert!(moved.is_none());

        let stats = game.execute("stats", None, None).unwrap().unwrap();
        assert_eq!(stats["moves_made"], json!([1, 0, 0, 0]));
        assert_eq!(stats["pawns_killed"], json!([0, 0, 0, 0]));
    }

    #[test]
    fn test_move_with_bad_args_is_rejected() {
        let (mut game, players) = game(&[Card::One]);
        game.execute("draw", Some(&players[0]), None).unwrap();

        let result = game.execute("move", Some(&players[0]), Some(json!({ "from": "a_S" })));
        assert!(matches!(result, Err(GameError::BadArguments(_))));
        assert_eq!(game.phase(), Phase::P1Move);
    }
}
