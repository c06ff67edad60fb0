//! The board: a fixed arena of tiles plus the position of every pawn.
//!
//! The outer track is a loop of 60 tiles, 15 per side, named `a_1` to
//! `d_15`. Each side also owns a start (`a_S`), a five-tile safety zone
//! (`a_s1`..`a_s5`) branching off its junction at `a_2`, and a home
//! (`a_H`). Sliders sit at `x_1` (sliding to `x_4`) and `x_9` (sliding to
//! `x_13`).
//!
//! Tiles are addressed by [`TileId`] and never move; only the pawn table
//! changes during a game.

use std::collections::HashMap;

/// Seats at the table.
pub const PLAYERS: usize = 4;

/// Pawns per player.
pub const PAWNS: usize = 4;

const TRACK_PER_SIDE: usize = 15;
const SAFETY_LEN: usize = 5;

/// Handle of a tile in the board arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Where a side's pawns wait to enter the track. Shared by all four.
    Start { owner: usize },
    Basic,
    /// The owner turns off here into their safety zone.
    Junction { owner: usize, safety_entry: TileId },
    /// Opponents landing here are carried forward to `target`.
    Slider { owner: usize, target: TileId },
    SafetyZone,
    /// Final resting place. Shared by all four of a side's pawns.
    Home { owner: usize },
}

#[derive(Debug, Clone)]
pub struct Tile {
    name: String,
    kind: TileKind,
    next: Option<TileId>,
    prev: Option<TileId>,
}

impl Tile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Tiles a pawn can step onto and off of; at most one pawn each.
    pub fn is_walkable(&self) -> bool {
        !matches!(self.kind, TileKind::Start { .. } | TileKind::Home { .. })
    }

    /// Tiles of the shared outer loop.
    pub fn is_track(&self) -> bool {
        matches!(
            self.kind,
            TileKind::Basic | TileKind::Junction { .. } | TileKind::Slider { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Board {
    tiles: Vec<Tile>,
    by_name: HashMap<String, TileId>,
    starts: [TileId; PLAYERS],
    homes: [TileId; PLAYERS],
    pub(crate) pawns: [[TileId; PAWNS]; PLAYERS],
}

impl Board {
    /// Builds the board with every pawn on its start tile.
    pub fn new() -> Self {
        let mut builder = Builder::default();
        let mut starts = [TileId(0); PLAYERS];
        let mut homes = [TileId(0); PLAYERS];
        let mut first_track: Option<TileId> = None;
        let mut prev_track: Option<TileId> = None;

        for side in 0..PLAYERS {
            let letter = side_letter(side);
            let start = builder.push(format!("{letter}_S"), TileKind::Start { owner: side }, None);
            starts[side] = start;

            let mut sliding_from: Option<TileId> = None;
            for j in 1..=TRACK_PER_SIDE {
                let name = format!("{letter}_{j}");
                let id = match j {
                    1 | 9 => {
                        // Target is patched in once it exists.
                        let id = builder.reserve();
                        builder.push(name, TileKind::Slider { owner: side, target: id }, prev_track);
                        sliding_from = Some(id);
                        id
                    }
                    2 => {
                        let junction = builder.reserve();
                        let entry = builder.reserve_after(1);
                        builder.push(
                            name,
                            TileKind::Junction { owner: side, safety_entry: entry },
                            prev_track,
                        );
                        homes[side] = builder.push_safety_zone(letter, side, junction);
                        junction
                    }
                    _ => builder.push(name, TileKind::Basic, prev_track),
                };

                if matches!(j, 4 | 13) {
                    if let Some(slider) = sliding_from.take() {
                        builder.set_slider_target(slider, id);
                    }
                }
                if j == 4 {
                    builder.tiles[start.0].next = Some(id);
                }
                if let Some(prev) = prev_track {
                    builder.tiles[prev.0].next = Some(id);
                }
                first_track.get_or_insert(id);
                prev_track = Some(id);
            }
        }

        if let (Some(first), Some(last)) = (first_track, prev_track) {
            builder.tiles[first.0].prev = Some(last);
            builder.tiles[last.0].next = Some(first);
        }

        Self {
            tiles: builder.tiles,
            by_name: builder.by_name,
            starts,
            homes,
            pawns: starts.map(|start| [start; PAWNS]),
        }
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn name(&self, id: TileId) -> &str {
        &self.tiles[id.0].name
    }

    /// Looks a tile up by its wire name.
    pub fn id_of(&self, name: &str) -> Option<TileId> {
        self.by_name.get(name).copied()
    }

    pub fn start(&self, side: usize) -> TileId {
        self.starts[side]
    }

    pub fn home(&self, side: usize) -> TileId {
        self.homes[side]
    }

    pub fn pawns(&self, side: usize) -> &[TileId; PAWNS] {
        &self.pawns[side]
    }

    /// Tile names of every pawn, seat-major.
    pub fn pawn_names(&self) -> Vec<Vec<String>> {
        self.pawns
            .iter()
            .map(|side| side.iter().map(|&t| self.name(t).to_string()).collect())
            .collect()
    }

    pub fn pawns_at_start(&self, side: usize) -> usize {
        self.pawns[side].iter().filter(|&&t| t == self.starts[side]).count()
    }

    /// Returns `true` once all of a side's pawns are home.
    pub fn is_finished(&self, side: usize) -> bool {
        self.pawns[side].iter().all(|&t| t == self.homes[side])
    }

    pub fn winner(&self) -> Option<usize> {
        (0..PLAYERS).find(|&side| self.is_finished(side))
    }

    pub fn is_walkable(&self, id: TileId) -> bool {
        self.tile(id).is_walkable()
    }

    pub fn is_track(&self, id: TileId) -> bool {
        self.tile(id).is_track()
    }

    /// Where a pawn of `side` goes when stepping forward off `id`. Each side
    /// turns into its own safety zone at its own junction.
    pub fn next_for(&self, id: TileId, side: usize) -> Option<TileId> {
        let tile = self.tile(id);
        if !tile.is_walkable() {
            return None;
        }
        match tile.kind {
            TileKind::Junction { owner, safety_entry } if owner == side => Some(safety_entry),
            _ => tile.next,
        }
    }

    /// The tile a pawn enters the track on when leaving a start tile.
    pub fn start_exit(&self, id: TileId) -> Option<TileId> {
        let tile = self.tile(id);
        match tile.kind {
            TileKind::Start { .. } => tile.next,
            _ => None,
        }
    }

    /// One step backward off `id`.
    pub fn prev_of(&self, id: TileId) -> Option<TileId> {
        let tile = self.tile(id);
        if !tile.is_walkable() {
            return None;
        }
        tile.prev
    }

    /// Returns `true` if one of `side`'s pawns already stands on `id`.
    /// Start and home hold any number of pawns, so they never count.
    pub fn has_teammate(&self, id: TileId, side: usize) -> bool {
        self.is_walkable(id) && self.pawns[side].contains(&id)
    }

    /// The (seat, pawn) standing on a walkable tile, if any.
    pub fn occupant(&self, id: TileId) -> Option<(usize, usize)> {
        if !self.is_walkable(id) {
            return None;
        }
        self.pawns.iter().enumerate().find_map(|(side, pawns)| {
            pawns.iter().position(|&t| t == id).map(|pawn| (side, pawn))
        })
    }

    /// Puts a pawn on a named tile, for setting up positions in tests.
    #[cfg(test)]
    pub(crate) fn place(&mut self, side: usize, pawn: usize, name: &str) {
        self.pawns[side][pawn] = self.id_of(name).expect("tile exists");
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn side_letter(side: usize) -> char {
    (b'a' + side as u8) as char
}

/// Accumulates tiles while the board is laid out.
#[derive(Default)]
struct Builder {
    tiles: Vec<Tile>,
    by_name: HashMap<String, TileId>,
}

impl Builder {
    /// The id the next pushed tile will get.
    fn reserve(&self) -> TileId {
        TileId(self.tiles.len())
    }

    /// The id the tile pushed `n` tiles after the next one will get.
    fn reserve_after(&self, n: usize) -> TileId {
        TileId(self.tiles.len() + n)
    }

    fn push(&mut self, name: String, kind: TileKind, prev: Option<TileId>) -> TileId {
        let id = TileId(self.tiles.len());
        self.by_name.insert(name.clone(), id);
        self.tiles.push(Tile {
            name,
            kind,
            next: None,
            prev,
        });
        id
    }

    /// Lays out `x_s1`..`x_s5` and `x_H` after `junction`; returns home.
    fn push_safety_zone(&mut self, letter: char, side: usize, junction: TileId) -> TileId {
        let mut prev = junction;
        for k in 1..=SAFETY_LEN {
            let id = self.push(format!("{letter}_s{k}"), TileKind::SafetyZone, Some(prev));
            if k > 1 {
                self.tiles[prev.0].next = Some(id);
            }
            prev = id;
        }
        let home = self.push(format!("{letter}_H"), TileKind::Home { owner: side }, None);
        self.tiles[prev.0].next = Some(home);
        home
    }

    fn set_slider_target(&mut self, slider: TileId, target_id: TileId) {
        if let TileKind::Slider { target, .. } = &mut self.tiles[slider.0].kind {
            *target = target_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(board: &Board, name: &str) -> TileId {
        board.id_of(name).unwrap()
    }

    #[test]
    fn test_new_board_has_every_tile() {
        let board = Board::new();
        // 60 track, 20 safety, 4 start, 4 home
        assert_eq!(board.tiles.len(), 88);
        assert!(board.id_of("d_15").is_some());
        assert!(board.id_of("c_s5").is_some());
        assert!(board.id_of("b_H").is_some());
        assert!(board.id_of("e_1").is_none());
    }

    #[test]
    fn test_new_board_all_pawns_on_start() {
        let board = Board::new();
        for side in 0..PLAYERS {
            assert_eq!(board.pawns_at_start(side), PAWNS);
        }
        assert_eq!(board.pawn_names()[2], vec!["c_S"; 4]);
    }

    #[test]
    fn test_track_wraps_around() {
        let board = Board::new();
        assert_eq!(board.next_for(id(&board, "d_15"), 0), Some(id(&board, "a_1")));
        assert_eq!(board.prev_of(id(&board, "a_1")), Some(id(&board, "d_15")));
        assert_eq!(board.next_for(id(&board, "a_15"), 0), Some(id(&board, "b_1")));
    }

    #[test]
    fn test_junction_branches_only_for_owner() {
        let board = Board::new();
        let junction = id(&board, "b_2");

        assert_eq!(board.next_for(junction, 1), Some(id(&board, "b_s1")));
        assert_eq!(board.next_for(junction, 0), Some(id(&board, "b_3")));
        assert_eq!(board.prev_of(id(&board, "b_s1")), Some(junction));
    }

    #[test]
    fn test_safety_zone_leads_home() {
        let board = Board::new();
        assert_eq!(board.next_for(id(&board, "a_s5"), 0), Some(id(&board, "a_H")));
        assert_eq!(board.next_for(id(&board, "a_H"), 0), None);
        assert_eq!(board.home(0), id(&board, "a_H"));
    }

    #[test]
    fn test_start_exits_to_fourth_tile() {
        let board = Board::new();
        let start = board.start(2);
        assert_eq!(board.start_exit(start), Some(id(&board, "c_4")));
        assert_eq!(board.start_exit(id(&board, "c_4")), None);
        assert_eq!(board.next_for(start, 2), None, "start is not walkable");
    }

    #[test]
    fn test_sliders_have_targets() {
        let board = Board::new();
        assert_eq!(
            board.tile(id(&board, "a_1")).kind(),
            TileKind::Slider { owner: 0, target: id(&board, "a_4") }
        );
        assert_eq!(
            board.tile(id(&board, "c_9")).kind(),
            TileKind::Slider { owner: 2, target: id(&board, "c_13") }
        );
    }

    #[test]
    fn test_tile_classes() {
        let board = Board::new();
        assert!(board.is_track(id(&board, "a_2")));
        assert!(!board.is_track(id(&board, "a_s2")));
        assert!(board.is_walkable(id(&board, "a_s2")));
        assert!(!board.is_walkable(board.start(0)));
        assert!(!board.is_walkable(board.home(0)));
    }

    #[test]
    fn test_occupant_and_teammate() {
        let mut board = Board::new();
        board.place(1, 2, "a_7");

        let tile = id(&board, "a_7");
        assert_eq!(board.occupant(tile), Some((1, 2)));
        assert!(board.has_teammate(tile, 1));
        assert!(!board.has_teammate(tile, 0));
        assert!(!board.has_teammate(board.start(1), 1));
    }

    #[test]
    fn test_is_finished_needs_all_four_home() {
        let mut board = Board::new();
        for pawn in 0..3 {
            board.place(3, pawn, "d_H");
        }
        assert!(!board.is_finished(3));
        board.place(3, 3, "d_H");
        assert_eq!(board.winner(), Some(3));
    }
}
