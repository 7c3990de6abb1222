//! Error types for table operations.

use thiserror::Error;

use crate::game::GameId;
use crate::player::PlayerId;

/// Errors raised by the shoe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShoeError {
    /// Not enough cards left to satisfy the draw.
    #[error("deck exhausted: requested {requested} card(s), {remaining} remaining")]
    DeckExhausted {
        /// Cards asked for.
        requested: usize,
        /// Cards left in the shoe.
        remaining: usize,
    },
}

/// Why a split was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitRejection {
    /// The hand does not hold exactly two cards.
    #[error("hand holds {0} cards, a split needs exactly two")]
    CardCount(usize),
    /// The two cards differ in point value.
    #[error("cards are worth {0} and {1}")]
    UnequalValues(u8, u8),
}

/// Why insurance was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsuranceRejection {
    /// Insurance was already taken on this game.
    #[error("insurance already taken")]
    AlreadyTaken,
    /// The dealer's up card is not an ace.
    #[error("dealer is not showing an ace")]
    NoDealerAce,
}

/// Rule violations detected by the game state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The game has already completed.
    #[error("game is not in progress")]
    GameNotInProgress,
    /// Cannot split this hand.
    #[error("cannot split: {0}")]
    InvalidSplit(SplitRejection),
    /// Cannot take insurance on this game.
    #[error("cannot take insurance: {0}")]
    InvalidInsurance(InsuranceRejection),
    /// No cards left in the shoe.
    #[error(transparent)]
    Shoe(#[from] ShoeError),
}

/// Errors reported by a [`PlayerLedger`](crate::ledger::PlayerLedger).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Player not found.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    /// The balance would go negative.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount the operation needs.
        required: u64,
        /// Current balance.
        available: u64,
    },
    /// The ledger could not be reached; the call may be retried.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by a [`GameStore`](crate::store::GameStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Game not found.
    #[error("game {0} not found")]
    GameNotFound(GameId),
    /// The stored record moved on since it was read.
    #[error("game {game_id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// Game being saved.
        game_id: GameId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },
    /// The store could not be reached; the call may be retried.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`Table`](crate::table::Table) operations.
///
/// Each variant is a distinct cause so callers can branch without matching
/// on messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Player not found.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    /// Game not found.
    #[error("game {0} not found")]
    GameNotFound(GameId),
    /// The game has already completed.
    #[error("game {0} is not in progress")]
    GameNotInProgress(GameId),
    /// Insufficient funds for the bet.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount the operation needs.
        required: u64,
        /// Current balance.
        available: u64,
    },
    /// Cannot split this hand.
    #[error("cannot split: {0}")]
    InvalidSplit(SplitRejection),
    /// Cannot take insurance on this game.
    #[error("cannot take insurance: {0}")]
    InvalidInsurance(InsuranceRejection),
    /// Not enough cards in the shoe.
    #[error("deck exhausted: requested {requested} card(s), {remaining} remaining")]
    DeckExhausted {
        /// Cards asked for.
        requested: usize,
        /// Cards left in the shoe.
        remaining: usize,
    },
    /// Another action changed the game first.
    #[error("game {game_id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// Game being saved.
        game_id: GameId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },
    /// A chip amount too large to move as a signed balance change.
    #[error("amount {0} is out of range")]
    AmountOutOfRange(u64),
    /// A collaborator stayed unavailable after every retry.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl TableError {
    /// Returns whether the failure is transient rather than a rule violation.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    pub(crate) fn from_action(game_id: GameId, err: ActionError) -> Self {
        match err {
            ActionError::GameNotInProgress => Self::GameNotInProgress(game_id),
            ActionError::InvalidSplit(reason) => Self::InvalidSplit(reason),
            ActionError::InvalidInsurance(reason) => Self::InvalidInsurance(reason),
            ActionError::Shoe(err) => err.into(),
        }
    }
}

impl From<ShoeError> for TableError {
    fn from(err: ShoeError) -> Self {
        match err {
            ShoeError::DeckExhausted {
                requested,
                remaining,
            } => Self::DeckExhausted {
                requested,
                remaining,
            },
        }
    }
}

impl From<LedgerError> for TableError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::PlayerNotFound(id) => Self::PlayerNotFound(id),
            LedgerError::InsufficientFunds {
                required,
                available,
            } => Self::InsufficientFunds {
                required,
                available,
            },
            LedgerError::Unavailable(reason) => Self::Storage(reason),
        }
    }
}

impl From<StoreError> for TableError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::GameNotFound(id) => Self::GameNotFound(id),
            StoreError::ConcurrentModification {
                game_id,
                expected,
                found,
            } => Self::ConcurrentModification {
                game_id,
                expected,
                found,
            },
            StoreError::Unavailable(reason) => Self::Storage(reason),
        }
    }
}
