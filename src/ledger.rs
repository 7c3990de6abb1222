//! Player balances and statistics.

use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::player::{Player, PlayerId};
use crate::sync::Mutex;

/// The account service the table debits and credits.
#[async_trait]
pub trait PlayerLedger: Send + Sync {
    /// Looks up a player.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] if no such player exists.
    async fn get_player(&self, id: PlayerId) -> Result<Player, LedgerError>;

    /// Applies a signed change to a player's balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`] if the balance would go negative,
    /// in which case nothing changes.
    async fn update_balance(&self, id: PlayerId, delta: i64) -> Result<Player, LedgerError>;

    /// Records a settled game against the player's statistics.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] if no such player exists.
    async fn update_statistics(
        &self,
        id: PlayerId,
        won: bool,
        amount: u64,
    ) -> Result<Player, LedgerError>;

    /// Takes back a game recorded by [`update_statistics`](Self::update_statistics)
    /// with the same arguments.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PlayerNotFound`] if no such player exists.
    async fn revert_statistics(
        &self,
        id: PlayerId,
        won: bool,
        amount: u64,
    ) -> Result<Player, LedgerError>;
}

/// An in-process ledger.
#[derive(Debug)]
pub struct MemoryLedger {
    next_id: AtomicU64,
    players: Mutex<HashMap<PlayerId, Player>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Opens an account with the given starting balance.
    pub fn create_player(&self, username: impl Into<String>, balance: u64) -> Player {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let player = Player::new(id, username, balance);
        self.players.lock().insert(id, player.clone());
        tracing::info!(player_id = id, balance, "player created");
        player
    }

    /// Returns the balance of a player.
    pub fn balance(&self, id: PlayerId) -> Option<u64> {
        self.players.lock().get(&id).map(|player| player.balance)
    }

    /// Clears the daily counters of every player; returns how many were reset.
    pub fn reset_daily_statistics(&self) -> usize {
        let mut players = self.players.lock();
        for player in players.values_mut() {
            player.reset_daily_statistics();
        }
        tracing::info!(count = players.len(), "daily statistics reset");
        players.len()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerLedger for MemoryLedger {
    async fn get_player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        self.players
            .lock()
            .get(&id)
            .cloned()
            .ok_or(LedgerError::PlayerNotFound(id))
    }

    async fn update_balance(&self, id: PlayerId, delta: i64) -> Result<Player, LedgerError> {
        let mut players = self.players.lock();
        let player = players.get_mut(&id).ok_or(LedgerError::PlayerNotFound(id))?;

        if player.apply_delta(delta).is_none() {
            tracing::warn!(player_id = id, delta, balance = player.balance, "insufficient funds");
            return Err(LedgerError::InsufficientFunds {
                required: delta.unsigned_abs(),
                available: player.balance,
            });
        }

        tracing::debug!(player_id = id, delta, balance = player.balance, "balance updated");
        Ok(player.clone())
    }

    async fn update_statistics(
        &self,
        id: PlayerId,
        won: bool,
        amount: u64,
    ) -> Result<Player, LedgerError> {
        let mut players = self.players.lock();
        let player = players.get_mut(&id).ok_or(LedgerError::PlayerNotFound(id))?;
        player.record_game(won, amount);
        Ok(player.clone())
    }

    async fn revert_statistics(
        &self,
        id: PlayerId,
        won: bool,
        amount: u64,
    ) -> Result<Player, LedgerError> {
        let mut players = self.players.lock();
        let player = players.get_mut(&id).ok_or(LedgerError::PlayerNotFound(id))?;
        player.unrecord_game(won, amount);
        tracing::debug!(player_id = id, won, amount, "statistics reverted");
        Ok(player.clone())
    }
}
