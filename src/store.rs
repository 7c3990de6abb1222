//! Durable game records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::game::{Game, GameId, GameStatus};
use crate::player::PlayerId;
use crate::sync::Mutex;

/// The record store the table persists games to.
///
/// Implementations version records: `save` must reject a game whose
/// [`version`](Game::version) differs from the stored one with
/// [`StoreError::ConcurrentModification`], and return the game with its
/// version advanced.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Loads a game.
    ///
    /// # Errors
    ///
    /// [`StoreError::GameNotFound`] if no such game exists.
    async fn find_by_id(&self, id: GameId) -> Result<Game, StoreError>;

    /// Inserts or updates a game.
    ///
    /// # Errors
    ///
    /// [`StoreError::ConcurrentModification`] if the stored version moved on.
    async fn save(&self, game: Game) -> Result<Game, StoreError>;

    /// Saves several games as one unit: either every game is written or none.
    ///
    /// # Errors
    ///
    /// [`StoreError::ConcurrentModification`] if any stored version moved on.
    async fn save_all(&self, games: Vec<Game>) -> Result<Vec<Game>, StoreError>;

    /// Games of a player that are still in progress.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn find_active_by_player(&self, player_id: PlayerId) -> Result<Vec<Game>, StoreError>;

    /// Completed games of a player that started at or after `from` and ended
    /// at or before `to`, newest first.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn find_completed_in_range(
        &self,
        player_id: PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError>;

    /// In-progress games with a bet of at least `threshold`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn find_high_stake(&self, threshold: u64) -> Result<Vec<Game>, StoreError>;

    /// Deletes completed games that ended before `before`; returns the count.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot be reached.
    async fn delete_completed_older_than(&self, before: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// An in-process game store.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    games: Mutex<HashMap<GameId, Game>>,
}

impl MemoryGameStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored games.
    pub fn len(&self) -> usize {
        self.games.lock().len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.games.lock().is_empty()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn find_by_id(&self, id: GameId) -> Result<Game, StoreError> {
        self.games
            .lock()
            .get(&id)
            .cloned()
            .ok_or(StoreError::GameNotFound(id))
    }

    async fn save(&self, game: Game) -> Result<Game, StoreError> {
        let mut saved = self.save_all(vec![game]).await?;
        saved.pop().ok_or(StoreError::Unavailable("nothing saved".to_owned()))
    }

    async fn save_all(&self, mut batch: Vec<Game>) -> Result<Vec<Game>, StoreError> {
        let mut games = self.games.lock();

        for game in &batch {
            let found = games.get(&game.id()).map_or(0, Game::version);
            if found != game.version() {
                return Err(StoreError::ConcurrentModification {
                    game_id: game.id(),
                    expected: game.version(),
                    found,
                });
            }
        }

        for game in &mut batch {
            game.set_version(game.version() + 1);
            games.insert(game.id(), game.clone());
        }
        Ok(batch)
    }

    async fn find_active_by_player(&self, player_id: PlayerId) -> Result<Vec<Game>, StoreError> {
        Ok(self
            .games
            .lock()
            .values()
            .filter(|game| game.player_id() == player_id && game.is_in_progress())
            .cloned()
            .collect())
    }

    async fn find_completed_in_range(
        &self,
        player_id: PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError> {
        let mut games: Vec<Game> = self
            .games
            .lock()
            .values()
            .filter(|game| {
                game.player_id() == player_id
                    && game.status() == GameStatus::Completed
                    && game.start_time() >= from
                    && game.end_time().is_some_and(|end| end <= to)
            })
            .cloned()
            .collect();
        games.sort_by_key(|game| core::cmp::Reverse(game.start_time()));
        Ok(games)
    }

    async fn find_high_stake(&self, threshold: u64) -> Result<Vec<Game>, StoreError> {
        Ok(self
            .games
            .lock()
            .values()
            .filter(|game| game.is_in_progress() && game.bet() >= threshold)
            .cloned()
            .collect())
    }

    async fn delete_completed_older_than(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut games = self.games.lock();
        let count = games.len();
        games.retain(|_, game| {
            game.status() != GameStatus::Completed
                || game.end_time().is_none_or(|end| end >= before)
        });
        Ok((count - games.len()) as u64)
    }
}
