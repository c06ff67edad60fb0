//! Move generation and execution.
//!
//! Every rule is a pure function from (source tile, card, side) to the
//! tiles it reaches. Listing moves runs all of them; executing a move runs
//! only the one named by the move's effect and checks the requested
//! destination is among its results. A client therefore can't submit a
//! move the server wouldn't have offered.

use std::collections::HashSet;

use boredgames_protocol::apologies::{Card, Move, MoveOpts, Moveset};
use boredgames_room::GameError;

use crate::board::{Board, PAWNS, PLAYERS, TileId, TileKind};

/// The rule that licensed a move. The discriminant is the wire `effect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveEffect {
    Forward = 0,
    Backward = 1,
    ExitStart = 2,
    Apologies = 3,
    Swap = 4,
    Split1 = 5,
    Split2 = 6,
    Split3 = 7,
    Split4 = 8,
    Split5 = 9,
    Split6 = 10,
}

impl MoveEffect {
    const SPLITS: [MoveEffect; 6] = [
        MoveEffect::Split1,
        MoveEffect::Split2,
        MoveEffect::Split3,
        MoveEffect::Split4,
        MoveEffect::Split5,
        MoveEffect::Split6,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Forward),
            1 => Some(Self::Backward),
            2 => Some(Self::ExitStart),
            3 => Some(Self::Apologies),
            4 => Some(Self::Swap),
            5..=10 => Self::split(code as usize - 4),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// The split effect for moving `distance` tiles (1 to 6).
    pub fn split(distance: usize) -> Option<Self> {
        distance.checked_sub(1).and_then(|i| Self::SPLITS.get(i)).copied()
    }

    /// How far a split effect moves, or `None` for other effects.
    pub fn split_distance(self) -> Option<usize> {
        Self::SPLITS.iter().position(|&e| e == self).map(|i| i + 1)
    }

    pub fn is_split(self) -> bool {
        self.split_distance().is_some()
    }
}

fn invalid(message: impl Into<String>) -> GameError {
    GameError::InvalidMove(message.into())
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

impl Board {
    fn forward_target(&self, source: TileId, card: Card, side: usize) -> Option<TileId> {
        if matches!(card, Card::Apologies | Card::Four) {
            return None;
        }
        let mut current = source;
        for _ in 0..card.value() {
            current = self.next_for(current, side)?;
        }
        (!self.has_teammate(current, side)).then_some(current)
    }

    fn backward_target(&self, source: TileId, card: Card, side: usize) -> Option<TileId> {
        let distance = match card {
            Card::Ten => 1,
            Card::Four => 4,
            _ => return None,
        };
        let mut current = source;
        for _ in 0..distance {
            current = self.prev_of(current)?;
        }
        (!self.has_teammate(current, side)).then_some(current)
    }

    fn exit_start_target(&self, source: TileId, card: Card, side: usize) -> Option<TileId> {
        if !matches!(card, Card::One | Card::Two) {
            return None;
        }
        let exit = self.start_exit(source)?;
        (!self.has_teammate(exit, side)).then_some(exit)
    }

    fn apologies_targets(&self, source: TileId, card: Card, side: usize) -> Vec<TileId> {
        if card != Card::Apologies || !matches!(self.tile(source).kind(), TileKind::Start { .. }) {
            return Vec::new();
        }
        (0..PLAYERS)
            .filter(|&other| other != side)
            .flat_map(|other| self.pawns[other])
            .filter(|&t| self.is_track(t) && !self.has_teammate(t, side))
            .collect()
    }

    fn swap_targets(&self, source: TileId, card: Card, side: usize) -> Vec<TileId> {
        if card != Card::Eleven || !self.is_track(source) {
            return Vec::new();
        }
        self.pawns
            .iter()
            .flatten()
            .copied()
            .filter(|&t| self.is_track(t) && !self.has_teammate(t, side))
            .collect()
    }

    /// Tiles `source` can reach as one half of a split seven, with the
    /// distance to each. A distance is offered only if another of the
    /// side's pawns could walk the remainder to a different tile, so every
    /// listed half has at least one partner it can be played with.
    fn split_targets(&self, source: TileId, card: Card, side: usize) -> Vec<(TileId, usize)> {
        if card != Card::Seven {
            return Vec::new();
        }
        let on_board = self.pawns[side].iter().filter(|&&t| self.is_walkable(t)).count();
        if on_board < 2 {
            return Vec::new();
        }

        // (distance, tile) for every landing a partner could make.
        let mut partner_reach = HashSet::new();
        for &partner in &self.pawns[side] {
            if partner == source {
                continue;
            }
            let mut current = partner;
            for step in 1..7 {
                let Some(next) = self.next_for(current, side) else {
                    break;
                };
                current = next;
                if !self.has_teammate(current, side) {
                    partner_reach.insert((step, current));
                }
            }
        }

        let mut targets = Vec::new();
        let mut current = source;
        for step in 1..7 {
            let Some(next) = self.next_for(current, side) else {
                break;
            };
            current = next;
            if self.has_teammate(current, side) {
                continue;
            }
            let paired = partner_reach
                .iter()
                .any(|&(d, tile)| d == 7 - step && (tile != current || !self.is_walkable(tile)));
            if paired {
                targets.push((current, step));
            }
        }
        targets
    }

    /// Candidate destinations for one effect, as replayed on execution.
    /// Split effects only reach the tile at exactly their distance.
    fn targets_for(
        &self,
        source: TileId,
        card: Card,
        side: usize,
        effect: MoveEffect,
    ) -> Vec<TileId> {
        match effect {
            MoveEffect::Forward => self.forward_target(source, card, side).into_iter().collect(),
            MoveEffect::Backward => self.backward_target(source, card, side).into_iter().collect(),
            MoveEffect::ExitStart => {
                self.exit_start_target(source, card, side).into_iter().collect()
            }
            MoveEffect::Apologies => self.apologies_targets(source, card, side),
            MoveEffect::Swap => self.swap_targets(source, card, side),
            split => {
                let wanted = split.split_distance();
                self.split_targets(source, card, side)
                    .into_iter()
                    .filter(|&(_, distance)| Some(distance) == wanted)
                    .map(|(tile, _)| tile)
                    .collect()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Every legal move for `side` holding `card`, grouped by pawn and then
    /// by destination. Pawns with no options are left out, and pawns at
    /// start are listed once since they are interchangeable.
    pub fn valid_moves(&self, side: usize, card: Card) -> Vec<Moveset> {
        let mut movesets = Vec::new();
        let mut checked_start = false;

        for pawn in 0..PAWNS {
            let source = self.pawns[side][pawn];
            match self.tile(source).kind() {
                TileKind::Home { .. } => continue,
                TileKind::Start { .. } => {
                    if checked_start {
                        continue;
                    }
                    checked_start = true;
                }
                _ => {}
            }

            let mut candidates: Vec<(TileId, MoveEffect)> = Vec::new();
            candidates.extend(
                self.forward_target(source, card, side)
                    .map(|t| (t, MoveEffect::Forward)),
            );
            candidates.extend(
                self.backward_target(source, card, side)
                    .map(|t| (t, MoveEffect::Backward)),
            );
            candidates.extend(
                self.exit_start_target(source, card, side)
                    .map(|t| (t, MoveEffect::ExitStart)),
            );
            candidates.extend(
                self.apologies_targets(source, card, side)
                    .into_iter()
                    .map(|t| (t, MoveEffect::Apologies)),
            );
            candidates.extend(
                self.swap_targets(source, card, side)
                    .into_iter()
                    .map(|t| (t, MoveEffect::Swap)),
            );
            candidates.extend(
                self.split_targets(source, card, side)
                    .into_iter()
                    .filter_map(|(t, d)| MoveEffect::split(d).map(|e| (t, e))),
            );

            let mut grouped: Vec<(TileId, Vec<i32>)> = Vec::new();
            for (tile, effect) in candidates {
                match grouped.iter_mut().find(|(t, _)| *t == tile) {
                    Some((_, effects)) => effects.push(effect.code()),
                    None => grouped.push((tile, vec![effect.code()])),
                }
            }
            if grouped.is_empty() {
                continue;
            }

            let from = self.name(source).to_string();
            tracing::trace!(side, pawn = %from, options = grouped.len(), "moves generated");
            movesets.push(Moveset {
                pawn: from.clone(),
                opts: grouped
                    .into_iter()
                    .map(|(tile, effects)| MoveOpts {
                        from: from.clone(),
                        to: self.name(tile).to_string(),
                        effects,
                    })
                    .collect(),
            });
        }
        movesets
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Plays a single (non-split) move.
    ///
    /// # Errors
    /// `InvalidMove` if the effect is unknown or a split, the side has no
    /// pawn on `from`, or `to` isn't reachable by that effect.
    pub fn execute_move(&mut self, mv: &Move, card: Card, side: usize) -> Result<(), GameError> {
        let effect = MoveEffect::from_code(mv.effect)
            .ok_or_else(|| invalid(format!("unknown effect {}", mv.effect)))?;
        if effect.is_split() {
            return Err(invalid("split moves must be played in pairs"));
        }
        let (pawn, source) = self.find_pawn(side, &mv.from)?;
        let dest = self.find_target(source, card, side, effect, &mv.to)?;

        self.bump(source, dest, effect == MoveEffect::Swap);
        self.pawns[side][pawn] = dest;
        Ok(())
    }

    /// Plays both halves of a split seven at once.
    ///
    /// Each half is validated against the board as it stands before either
    /// pawn moves.
    ///
    /// # Errors
    /// `InvalidMove` unless both effects are splits summing to seven, the
    /// halves move two different pawns, each destination is reachable, and
    /// the destinations differ (two pawns may both go home).
    pub fn execute_split_move(
        &mut self,
        first: &Move,
        second: &Move,
        side: usize,
    ) -> Result<(), GameError> {
        let split_of = |mv: &Move| {
            MoveEffect::from_code(mv.effect)
                .filter(|e| e.is_split())
                .ok_or_else(|| invalid(format!("effect {} is not a split", mv.effect)))
        };
        let first_effect = split_of(first)?;
        let second_effect = split_of(second)?;
        let total = first_effect.split_distance().unwrap_or(0)
            + second_effect.split_distance().unwrap_or(0);
        if total != 7 {
            return Err(invalid(format!("split distances add up to {total}, not 7")));
        }

        let (first_pawn, first_source) = self.find_pawn(side, &first.from)?;
        let (second_pawn, second_source) = self.find_pawn(side, &second.from)?;
        if first_pawn == second_pawn {
            return Err(invalid("split moves must use two different pawns"));
        }

        let first_dest = self.find_target(first_source, Card::Seven, side, first_effect, &first.to)?;
        let second_dest =
            self.find_target(second_source, Card::Seven, side, second_effect, &second.to)?;
        if first_dest == second_dest && self.is_walkable(first_dest) {
            return Err(invalid("split moves can't end on the same tile"));
        }

        self.bump(first_source, first_dest, false);
        self.bump(second_source, second_dest, false);
        self.pawns[side][first_pawn] = first_dest;
        self.pawns[side][second_pawn] = second_dest;
        Ok(())
    }

    /// Carries every pawn resting on an opponent's slider to the slider's
    /// target. Anything on the way, the target included, goes back to its
    /// own start, whoever it belongs to.
    ///
    /// # Errors
    /// `Internal` if a slide never reaches its target, which would mean
    /// the board was built wrong.
    pub fn resolve_slides(&mut self) -> Result<(), GameError> {
        for side in 0..PLAYERS {
            for pawn in 0..PAWNS {
                let slider = self.pawns[side][pawn];
                let TileKind::Slider { owner, target } = self.tile(slider).kind() else {
                    continue;
                };
                if owner == side {
                    continue;
                }

                let mut span = Vec::new();
                let mut current = slider;
                while current != target {
                    current = self
                        .next_for(current, side)
                        .filter(|_| span.len() < self.tile_count())
                        .ok_or_else(|| {
                            GameError::Internal(format!(
                                "slide from {} never reaches {}",
                                self.name(slider),
                                self.name(target)
                            ))
                        })?;
                    span.push(current);
                }

                for other in 0..PLAYERS {
                    let start = self.start(other);
                    for tile in self.pawns[other].iter_mut() {
                        if span.contains(tile) {
                            *tile = start;
                        }
                    }
                }
                self.pawns[side][pawn] = target;
                tracing::trace!(side, from = self.name(slider), to = self.name(target), "slide");
            }
        }
        Ok(())
    }

    fn find_pawn(&self, side: usize, from: &str) -> Result<(usize, TileId), GameError> {
        self.pawns[side]
            .iter()
            .position(|&t| self.name(t) == from)
            .map(|pawn| (pawn, self.pawns[side][pawn]))
            .ok_or_else(|| invalid(format!("no pawn on {from}")))
    }

    fn find_target(
        &self,
        source: TileId,
        card: Card,
        side: usize,
        effect: MoveEffect,
        to: &str,
    ) -> Result<TileId, GameError> {
        self.targets_for(source, card, side, effect)
            .into_iter()
            .find(|&t| self.name(t) == to)
            .ok_or_else(|| {
                invalid(format!("{} can't reach {to} with {effect:?}", self.name(source)))
            })
    }

    /// Clears `dest` before a pawn moves in from `source`. The pawn already
    /// there swaps onto `source`, or goes back to its own start.
    fn bump(&mut self, source: TileId, dest: TileId, swap: bool) {
        let Some((side, pawn)) = self.occupant(dest) else {
            return;
        };
        self.pawns[side][pawn] = if swap { source } else { self.start(side) };
    }
}
