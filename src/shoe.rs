//! The shared card shoe.

use core::fmt;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::card::{Card, DECK_SIZE, Rank, Suit};
use crate::error::ShoeError;
use crate::sync::Mutex;

/// Anything the game state machine can pull cards from.
pub trait CardSource {
    /// Draws the next card.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::DeckExhausted`] when no card is left.
    fn draw(&mut self) -> Result<Card, ShoeError>;
}

struct ShoeState {
    /// Remaining cards; the top of the shoe is the end of the vector.
    cards: Vec<Card>,
    rng: ChaCha8Rng,
    /// Bumped on every re-initialization.
    generation: u64,
}

/// A multi-deck shoe shared by every game at a table.
///
/// All access goes through one lock, so each card is handed out exactly once
/// and `initialize`/`shuffle` never interleave with a draw. The shoe never
/// refills itself: once empty, draws fail with [`ShoeError::DeckExhausted`]
/// until [`initialize`](Self::initialize) is called.
///
/// Each re-initialization starts a new [`generation`](Self::generation).
/// Cards drawn from an earlier generation are never put back.
pub struct Shoe {
    state: Mutex<ShoeState>,
    reshuffle_threshold: usize,
}

impl Shoe {
    /// Creates a shuffled shoe of `decks` decks with the given seed.
    #[must_use]
    pub fn new(decks: u8, reshuffle_threshold: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cards = Self::create_cards(decks, &mut rng);

        Self {
            state: Mutex::new(ShoeState {
                cards,
                rng,
                generation: 0,
            }),
            reshuffle_threshold,
        }
    }

    /// Creates a shoe that deals `draws` in the given order.
    ///
    /// Later shuffles and re-initializations use `seed`.
    #[must_use]
    pub fn stacked(draws: &[Card], reshuffle_threshold: usize, seed: u64) -> Self {
        let mut cards = draws.to_vec();
        cards.reverse();

        Self {
            state: Mutex::new(ShoeState {
                cards,
                rng: ChaCha8Rng::seed_from_u64(seed),
                generation: 0,
            }),
            reshuffle_threshold,
        }
    }

    fn create_cards(num_decks: u8, rng: &mut ChaCha8Rng) -> Vec<Card> {
        let mut cards = Vec::with_capacity(num_decks as usize * DECK_SIZE);

        for _ in 0..num_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push(Card::new(suit, rank));
                }
            }
        }

        cards.shuffle(rng);
        cards
    }

    /// Replaces the contents with `decks` full decks in shuffled order.
    pub fn initialize(&self, decks: u8) {
        self.state.lock().refill(decks);
    }

    /// Re-initializes with `decks` decks if the shoe is below its threshold.
    ///
    /// The check and the refill happen under one lock. Returns `true` if the
    /// shoe was refilled.
    pub fn initialize_if_needed(&self, decks: u8) -> bool {
        let mut state = self.state.lock();
        if state.cards.len() >= self.reshuffle_threshold {
            return false;
        }
        state.refill(decks);
        true
    }

    /// Re-permutes the remaining cards.
    pub fn shuffle(&self) {
        let mut state = self.state.lock();
        let ShoeState { cards, rng, .. } = &mut *state;
        cards.shuffle(rng);
    }

    /// Draws one card from the top of the shoe.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::DeckExhausted`] if the shoe is empty.
    pub fn draw(&self) -> Result<Card, ShoeError> {
        self.draw_tagged().map(|(card, _)| card)
    }

    /// Draws one card along with the generation it came from.
    pub(crate) fn draw_tagged(&self) -> Result<(Card, u64), ShoeError> {
        let mut state = self.state.lock();
        let card = state.cards.pop().ok_or(ShoeError::DeckExhausted {
            requested: 1,
            remaining: 0,
        })?;
        Ok((card, state.generation))
    }

    /// Draws `count` cards, returned in draw order.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::DeckExhausted`] without drawing anything if fewer
    /// than `count` cards remain.
    pub fn draw_many(&self, count: usize) -> Result<Vec<Card>, ShoeError> {
        self.draw_many_tagged(count).map(|(cards, _)| cards)
    }

    /// Draws `count` cards along with the generation they came from.
    pub(crate) fn draw_many_tagged(&self, count: usize) -> Result<(Vec<Card>, u64), ShoeError> {
        let mut state = self.state.lock();
        let remaining = state.cards.len();
        if count > remaining {
            return Err(ShoeError::DeckExhausted {
                requested: count,
                remaining,
            });
        }

        let mut drawn = state.cards.split_off(remaining - count);
        drawn.reverse();
        Ok((drawn, state.generation))
    }

    /// Puts cards back on top of the shoe, face up.
    ///
    /// `cards` are in the order they were drawn; the next draws return them
    /// in that same order.
    pub fn restore(&self, cards: &[Card]) {
        let mut state = self.state.lock();
        state.cards.extend(cards.iter().rev().map(|card| Card {
            face_up: true,
            ..*card
        }));
    }

    /// Puts back the cards of `drawn` that belong to the current generation,
    /// keeping their draw order. Returns how many were discarded as stale.
    pub(crate) fn restore_drawn(&self, drawn: &[(Card, u64)]) -> usize {
        let mut state = self.state.lock();
        let current = state.generation;
        let mut stale = 0;
        for &(card, generation) in drawn.iter().rev() {
            if generation == current {
                state.cards.push(Card {
                    face_up: true,
                    ..card
                });
            } else {
                stale += 1;
            }
        }
        stale
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Returns the number of cards remaining in the shoe.
    pub fn remaining(&self) -> usize {
        self.state.lock().cards.len()
    }

    /// Returns the reshuffle threshold.
    #[must_use]
    pub const fn reshuffle_threshold(&self) -> usize {
        self.reshuffle_threshold
    }

    /// Returns whether fewer than the threshold number of cards remain.
    pub fn needs_reshuffle(&self) -> bool {
        self.remaining() < self.reshuffle_threshold
    }
}

impl ShoeState {
    fn refill(&mut self, decks: u8) {
        self.cards = Shoe::create_cards(decks, &mut self.rng);
        self.generation += 1;
    }
}

impl CardSource for &Shoe {
    fn draw(&mut self) -> Result<Card, ShoeError> {
        Shoe::draw(self)
    }
}

impl fmt::Debug for Shoe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shoe")
            .field("remaining", &self.remaining())
            .field("generation", &self.generation())
            .field("reshuffle_threshold", &self.reshuffle_threshold)
            .finish()
    }
}
