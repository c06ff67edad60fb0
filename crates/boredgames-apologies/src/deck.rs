//! The draw pile.

use boredgames_protocol::apologies::Card;
use rand::seq::SliceRandom;

/// How many copies of each rank a fresh pile holds.
pub const COPIES_PER_RANK: usize = 4;

/// A shuffled pile of 44 cards that refills itself when it runs out.
#[derive(Debug, Clone)]
pub struct CardDeck {
    /// Top of the pile is the end of the vector.
    cards: Vec<Card>,
    last_drawn: Option<Card>,
}

impl CardDeck {
    pub fn new() -> Self {
        let mut deck = Self {
            cards: Vec::with_capacity(Card::ALL.len() * COPIES_PER_RANK),
            last_drawn: None,
        };
        deck.refill();
        deck
    }

    /// Draws the top card and remembers it. A pile emptied by this draw
    /// is refilled and reshuffled before returning.
    pub fn draw(&mut self) -> Card {
        let card = loop {
            match self.cards.pop() {
                Some(card) => break card,
                None => self.refill(),
            }
        };
        if self.cards.is_empty() {
            tracing::trace!("draw pile exhausted, reshuffling");
            self.refill();
        }
        self.last_drawn = Some(card);
        card
    }

    /// The card drawn most recently, or `None` before the first draw.
    pub fn last_drawn(&self) -> Option<Card> {
        self.last_drawn
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    fn refill(&mut self) {
        self.cards.clear();
        for card in Card::ALL {
            self.cards.extend(std::iter::repeat_n(card, COPIES_PER_RANK));
        }
        self.cards.shuffle(&mut rand::rng());
    }

    /// A pile with a fixed order; `cards[0]` is drawn first.
    #[cfg(test)]
    pub(crate) fn from_cards(cards: &[Card]) -> Self {
        Self {
            cards: cards.iter().rev().copied().collect(),
            last_drawn: None,
        }
    }
}

impl Default for CardDeck {
    fn default() -> Self {
        Self::new()
    }
}
