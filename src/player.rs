//! Player account snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player identifier.
pub type PlayerId = u64;

/// A player's balance and win/loss statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID.
    pub id: PlayerId,
    /// Display name.
    pub username: String,
    /// Chips available to bet.
    pub balance: u64,
    /// Games settled for this player.
    pub games_played: u32,
    /// Games counted as won.
    pub games_won: u32,
    /// Sum of the profit recorded on won games.
    pub total_winnings: u64,
    /// Games settled since the last daily reset.
    pub games_played_today: u32,
    /// Games won since the last daily reset.
    pub games_won_today: u32,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account last changed.
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Creates a player with the given starting balance.
    #[must_use]
    pub fn new(id: PlayerId, username: impl Into<String>, balance: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            balance,
            games_played: 0,
            games_won: 0,
            total_winnings: 0,
            games_played_today: 0,
            games_won_today: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a signed balance change.
    ///
    /// Returns `None` (and leaves the balance untouched) if the result would
    /// be negative.
    pub fn apply_delta(&mut self, delta: i64) -> Option<u64> {
        let balance = self.balance.checked_add_signed(delta)?;
        self.balance = balance;
        self.updated_at = Utc::now();
        Some(balance)
    }

    /// Records one settled game.
    pub fn record_game(&mut self, won: bool, amount: u64) {
        self.games_played += 1;
        self.games_played_today += 1;
        if won {
            self.games_won += 1;
            self.games_won_today += 1;
            self.total_winnings = self.total_winnings.saturating_add(amount);
        }
        self.updated_at = Utc::now();
    }

    /// Takes back a game recorded with [`record_game`](Self::record_game).
    ///
    /// Daily counters cleared since then stay at zero.
    pub fn unrecord_game(&mut self, won: bool, amount: u64) {
        self.games_played = self.games_played.saturating_sub(1);
        self.games_played_today = self.games_played_today.saturating_sub(1);
        if won {
            self.games_won = self.games_won.saturating_sub(1);
            self.games_won_today = self.games_won_today.saturating_sub(1);
            self.total_winnings = self.total_winnings.saturating_sub(amount);
        }
        self.updated_at = Utc::now();
    }

    /// Clears the daily counters.
    pub fn reset_daily_statistics(&mut self) {
        self.games_played_today = 0;
        self.games_won_today = 0;
        self.updated_at = Utc::now();
    }

    /// Games won over games played, 0 when nothing was played.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        ratio(self.games_won, self.games_played)
    }

    /// Daily games won over daily games played.
    #[must_use]
    pub fn daily_win_rate(&self) -> f64 {
        ratio(self.games_won_today, self.games_played_today)
    }
}

fn ratio(won: u32, played: u32) -> f64 {
    if played == 0 {
        0.0
    } else {
        f64::from(won) / f64::from(played)
    }
}
