//! The per-round game record and its state machine.
//!
//! A [`Game`] owns one player hand, the dealer hand, the bet, and the action
//! log. Its methods are synchronous and draw through a [`CardSource`]; they
//! never touch balances. The [`Table`](crate::table::Table) moves money and
//! persists the record around them.
//!
//! Every transition validates before it mutates: a method that returns an
//! error leaves the game exactly as it was.
//!
//! [`CardSource`]: crate::shoe::CardSource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::Card;
use crate::error::ActionError;
use crate::hand::Hand;
use crate::player::PlayerId;

mod actions;
mod dealer;
mod insurance;
pub mod state;

pub use dealer::dealer_should_draw;
pub use state::{GameAction, GameResult, GameStatus};

/// Game identifier.
pub type GameId = Uuid;

/// One player's round against the dealer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    player_id: PlayerId,
    player_hand: Hand,
    dealer_hand: Hand,
    bet: u64,
    insurance_bet: Option<u64>,
    status: GameStatus,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    result: Option<GameResult>,
    actions: Vec<GameAction>,
    /// The game this one was split from.
    split_from: Option<GameId>,
    /// Optimistic-concurrency version, maintained by the store.
    version: u64,
}

impl Game {
    /// Starts a game from the four opening cards, in deal order.
    ///
    /// The player gets cards one and three, the dealer two and four; the
    /// dealer's second card is the face-down hole card.
    #[must_use]
    pub fn deal(player_id: PlayerId, bet: u64, cards: [Card; 4]) -> Self {
        let [player_first, dealer_up, player_second, mut dealer_hole] = cards;
        dealer_hole.face_up = false;

        Self {
            id: Uuid::new_v4(),
            player_id,
            player_hand: Hand::from_cards([player_first, player_second]),
            dealer_hand: Hand::from_cards([dealer_up, dealer_hole]),
            bet,
            insurance_bet: None,
            status: GameStatus::InProgress,
            start_time: Utc::now(),
            end_time: None,
            result: None,
            actions: Vec::new(),
            split_from: None,
            version: 0,
        }
    }

    /// Returns the game ID.
    #[must_use]
    pub const fn id(&self) -> GameId {
        self.id
    }

    /// Returns the owning player's ID.
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Returns the player's hand.
    #[must_use]
    pub const fn player_hand(&self) -> &Hand {
        &self.player_hand
    }

    /// Returns the dealer's hand.
    #[must_use]
    pub const fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    /// Returns the bet amount.
    #[must_use]
    pub const fn bet(&self) -> u64 {
        self.bet
    }

    /// Returns the insurance stake, if insurance was taken.
    #[must_use]
    pub const fn insurance_bet(&self) -> Option<u64> {
        self.insurance_bet
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns when the game was dealt.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns when the game completed.
    #[must_use]
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns the final result once completed.
    #[must_use]
    pub const fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns the actions applied so far, oldest first.
    #[must_use]
    pub fn actions(&self) -> &[GameAction] {
        &self.actions
    }

    /// Returns the game this one was split from.
    #[must_use]
    pub const fn split_from(&self) -> Option<GameId> {
        self.split_from
    }

    /// Returns the stored version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Sets the stored version. Meant for [`GameStore`](crate::store::GameStore)
    /// implementations.
    pub const fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Returns whether the game is in progress.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    /// Returns whether the player can still act on their hand.
    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.is_in_progress() && !self.player_hand.is_busted() && !self.player_hand.is_blackjack()
    }

    fn ensure_in_progress(&self) -> Result<(), ActionError> {
        if self.is_in_progress() {
            Ok(())
        } else {
            Err(ActionError::GameNotInProgress)
        }
    }

    /// Moves the game into its terminal state.
    fn complete(&mut self, result: GameResult) {
        self.status = GameStatus::Completed;
        self.result = Some(result);
        self.end_time = Some(Utc::now());
    }
}
