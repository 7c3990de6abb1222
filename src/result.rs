//! Settlement types produced when a game completes.

use serde::{Deserialize, Serialize};

use crate::game::GameResult;

/// Money owed to the player when a game completes.
///
/// Stakes are debited when placed, so credits here are gross amounts: a win
/// credits the stake plus profit, a push credits the stake alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// The outcome of the main bet.
    pub result: GameResult,
    /// The main bet.
    pub bet: u64,
    /// Amount credited for the main bet.
    pub credit: u64,
    /// Insurance stake, if insurance was taken.
    pub insurance_bet: Option<u64>,
    /// Amount credited for insurance (0 unless the dealer had blackjack).
    pub insurance_credit: u64,
    /// The player's hand value.
    pub player_value: u8,
    /// The dealer's hand value.
    pub dealer_value: u8,
}

impl Settlement {
    /// Total amount to credit the player.
    #[must_use]
    pub const fn total_credit(&self) -> u64 {
        self.credit.saturating_add(self.insurance_credit)
    }

    /// Whether insurance paid out; `None` when no insurance was taken.
    #[must_use]
    pub const fn insurance_won(&self) -> Option<bool> {
        match self.insurance_bet {
            Some(_) => Some(self.insurance_credit > 0),
            None => None,
        }
    }

    /// Whether the game counts as won for statistics.
    ///
    /// Wins, blackjacks, and pushes count.
    #[must_use]
    pub const fn counts_as_win(&self) -> bool {
        matches!(
            self.result,
            GameResult::PlayerWin | GameResult::PlayerBlackjack | GameResult::Push
        )
    }

    /// Profit on the main bet (0 for a push or a loss).
    #[must_use]
    pub const fn profit(&self) -> u64 {
        self.credit.saturating_sub(self.bet)
    }

    /// Net result against everything staked (positive = profit), saturating
    /// at the bounds of `i64`.
    #[must_use]
    pub fn net(&self) -> i64 {
        let staked = self.bet.saturating_add(self.insurance_bet.unwrap_or(0));
        let credit = self.total_credit();
        if credit >= staked {
            i64::try_from(credit - staked).unwrap_or(i64::MAX)
        } else {
            i64::try_from(staked - credit).map_or(i64::MIN, |loss| -loss)
        }
    }
}
