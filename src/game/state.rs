//! Game state types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Cards are dealt and the player may act.
    InProgress,
    /// The game is settled. Terminal.
    Completed,
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    /// Player beats the dealer (or the dealer busts).
    PlayerWin,
    /// Dealer beats the player, including player bust and dealer blackjack.
    DealerWin,
    /// Tie; the stake is returned.
    Push,
    /// Player has a natural the dealer does not match.
    PlayerBlackjack,
}

/// An action applied to a game, in the order applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    /// Player drew a card.
    Hit,
    /// Player stood and the dealer played out.
    Stand,
    /// Player split a pair into two games.
    Split,
    /// Player took insurance against a dealer ace.
    Insurance,
}
