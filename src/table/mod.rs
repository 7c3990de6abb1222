//! The table: orchestrates games against the shoe, the ledger, and the store.
//!
//! Every operation validates first and only then draws cards or moves money.
//! If a later step fails, the operation undoes what it already did (cards go
//! back on the shoe, balance changes are reversed) and returns the error, so
//! callers see either the full effect or none of it.

use chrono::{DateTime, Utc};

use crate::card::Card;
use crate::error::TableError;
use crate::game::{Game, GameId};
use crate::ledger::PlayerLedger;
use crate::options::TableOptions;
use crate::player::PlayerId;
use crate::result::Settlement;
use crate::shoe::Shoe;
use crate::store::GameStore;

mod draws;
mod locks;

use draws::Draws;
use locks::GameLocks;

/// A blackjack table: one shoe shared by every game dealt at it.
///
/// # Example
///
/// ```
/// use bjtable::{MemoryGameStore, MemoryLedger, Table, TableOptions};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let table = Table::new(TableOptions::default(), MemoryLedger::new(), MemoryGameStore::new(), 7);
/// let player = table.ledger().create_player("alice", 100);
///
/// let game = table.start_game(player.id, 10).await.unwrap();
/// assert_eq!(game.player_hand().len(), 2);
/// assert_eq!(table.ledger().balance(player.id), Some(90));
/// # }
/// ```
#[derive(Debug)]
pub struct Table<L, S> {
    shoe: Shoe,
    ledger: L,
    store: S,
    options: TableOptions,
    locks: GameLocks,
}

impl<L: PlayerLedger, S: GameStore> Table<L, S> {
    /// Creates a table with a freshly shuffled shoe.
    #[must_use]
    pub fn new(options: TableOptions, ledger: L, store: S, seed: u64) -> Self {
        let shoe = Shoe::new(options.decks, options.reshuffle_threshold, seed);
        Self::with_shoe(options, shoe, ledger, store)
    }

    /// Creates a table around an existing shoe.
    #[must_use]
    pub fn with_shoe(options: TableOptions, shoe: Shoe, ledger: L, store: S) -> Self {
        Self {
            shoe,
            ledger,
            store,
            options,
            locks: GameLocks::default(),
        }
    }

    /// Returns the shoe.
    pub const fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Returns the player ledger.
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Returns the game store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the table options.
    pub const fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Runs a collaborator call, retrying transient failures.
    ///
    /// Rule violations are returned at once. A retried call is assumed to
    /// have had no effect when it failed.
    async fn retry<T, E, F, Fut>(&self, what: &'static str, mut call: F) -> Result<T, TableError>
    where
        E: Into<TableError>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.options.storage_retries.max(1);
        let mut attempt = 1;
        loop {
            match call().await.map_err(Into::<TableError>::into) {
                Err(err) if err.is_transient() && attempt < attempts => {
                    tracing::warn!(operation = what, attempt, error = %err, "retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn balance_change(&self, player_id: PlayerId, delta: i64) -> Result<(), TableError> {
        if delta == 0 {
            return Ok(());
        }
        self.retry("update_balance", || {
            self.ledger.update_balance(player_id, delta)
        })
        .await
        .map(drop)
    }

    async fn load(&self, game_id: GameId) -> Result<Game, TableError> {
        self.retry("find_by_id", || self.store.find_by_id(game_id))
            .await
    }

    async fn save(&self, game: Game) -> Result<Game, TableError> {
        self.retry("save", || self.store.save(game.clone())).await
    }

    /// Checks the player can cover `required` without changing anything.
    async fn ensure_funds(&self, player_id: PlayerId, required: u64) -> Result<(), TableError> {
        let player = self
            .retry("get_player", || self.ledger.get_player(player_id))
            .await?;
        if player.balance < required {
            tracing::warn!(player_id, required, balance = player.balance, "insufficient funds");
            return Err(TableError::InsufficientFunds {
                required,
                available: player.balance,
            });
        }
        Ok(())
    }

    /// Undoes a failed operation: cards back on the shoe, `delta` applied to
    /// the player's balance to reverse what the operation moved.
    async fn roll_back(
        &self,
        player_id: PlayerId,
        delta: i64,
        draws: &mut Draws<'_>,
        cause: &TableError,
    ) {
        tracing::warn!(player_id, delta, cards = draws.len(), error = %cause, "rolling back");
        draws.restore();
        if let Err(err) = self.balance_change(player_id, delta).await {
            tracing::error!(
                player_id,
                delta,
                error = %err,
                "failed to reverse balance during rollback"
            );
        }
    }

    /// Pays out a completed game, records statistics, and persists it.
    ///
    /// The save goes last; if it or the statistics fail, the payout and the
    /// statistics are taken back and the drawn cards restored.
    async fn complete(
        &self,
        game: Game,
        settlement: Settlement,
        draws: &mut Draws<'_>,
    ) -> Result<Game, TableError> {
        let player_id = game.player_id();
        let credit = settlement.total_credit();
        let delta = match to_delta(credit) {
            Ok(delta) => delta,
            Err(err) => {
                draws.restore();
                return Err(err);
            }
        };

        if let Err(err) = self.balance_change(player_id, delta).await {
            draws.restore();
            return Err(err);
        }

        let won = settlement.counts_as_win();
        let profit = settlement.profit();
        if let Err(err) = self
            .retry("update_statistics", || {
                self.ledger.update_statistics(player_id, won, profit)
            })
            .await
        {
            self.roll_back(player_id, -delta, draws, &err).await;
            return Err(err);
        }

        let saved = match self.save(game).await {
            Ok(saved) => saved,
            Err(err) => {
                if let Err(revert) = self
                    .retry("revert_statistics", || {
                        self.ledger.revert_statistics(player_id, won, profit)
                    })
                    .await
                {
                    tracing::error!(player_id, error = %revert, "failed to revert statistics");
                }
                self.roll_back(player_id, -delta, draws, &err).await;
                return Err(err);
            }
        };

        tracing::info!(
            game_id = %saved.id(),
            player_id,
            result = ?settlement.result,
            player_value = settlement.player_value,
            dealer_value = settlement.dealer_value,
            credit,
            net = settlement.net(),
            "game completed"
        );
        Ok(saved)
    }

    /// Starts a new game: takes the bet and deals the opening cards.
    ///
    /// If the shoe has dropped below its reshuffle threshold it is refilled
    /// first.
    ///
    /// # Errors
    ///
    /// [`TableError::PlayerNotFound`], [`TableError::InsufficientFunds`],
    /// [`TableError::AmountOutOfRange`], [`TableError::DeckExhausted`], or a
    /// storage error. On error no game exists and the balance is unchanged.
    pub async fn start_game(&self, player_id: PlayerId, bet: u64) -> Result<Game, TableError> {
        let stake = to_delta(bet)?;
        self.ensure_funds(player_id, bet).await?;

        if self.shoe.initialize_if_needed(self.options.decks) {
            tracing::info!(
                decks = self.options.decks,
                generation = self.shoe.generation(),
                "shoe reshuffled"
            );
        }

        let mut draws = Draws::new(&self.shoe);
        let drawn = draws.draw_many(4)?;
        let Ok(cards) = <[Card; 4]>::try_from(drawn.as_slice()) else {
            draws.restore();
            return Err(TableError::DeckExhausted {
                requested: 4,
                remaining: self.shoe.remaining(),
            });
        };

        if let Err(err) = self.balance_change(player_id, -stake).await {
            draws.restore();
            return Err(err);
        }

        let game = Game::deal(player_id, bet, cards);
        match self.save(game).await {
            Ok(game) => {
                tracing::info!(
                    game_id = %game.id(),
                    player_id,
                    bet,
                    player_hand = %game.player_hand(),
                    "game started"
                );
                Ok(game)
            }
            Err(err) => {
                self.roll_back(player_id, stake, &mut draws, &err).await;
                Err(err)
            }
        }
    }

    /// Draws one card into the player's hand. A bust completes the game.
    ///
    /// # Errors
    ///
    /// [`TableError::GameNotFound`], [`TableError::GameNotInProgress`],
    /// [`TableError::DeckExhausted`], [`TableError::ConcurrentModification`],
    /// or a storage error.
    pub async fn hit(&self, game_id: GameId) -> Result<Game, TableError> {
        let _guard = self.locks.acquire(game_id).await;
        let mut game = self.load(game_id).await?;

        let mut draws = Draws::new(&self.shoe);
        let (card, settlement) = game
            .hit(&mut draws, &self.options)
            .map_err(|err| TableError::from_action(game_id, err))?;
        tracing::debug!(%game_id, %card, value = game.player_hand().value(), "hit");

        if let Some(settlement) = settlement {
            return self.complete(game, settlement, &mut draws).await;
        }

        self.save(game).await.inspect_err(|_| draws.restore())
    }

    /// Ends the player's turn: the dealer plays out and the game completes.
    ///
    /// # Errors
    ///
    /// [`TableError::GameNotFound`], [`TableError::GameNotInProgress`],
    /// [`TableError::DeckExhausted`], [`TableError::ConcurrentModification`],
    /// or a storage error.
    pub async fn stand(&self, game_id: GameId) -> Result<Game, TableError> {
        let _guard = self.locks.acquire(game_id).await;
        let mut game = self.load(game_id).await?;

        let mut draws = Draws::new(&self.shoe);
        let settlement = match game.stand(&mut draws, &self.options) {
            Ok(settlement) => settlement,
            Err(err) => {
                draws.restore();
                return Err(TableError::from_action(game_id, err));
            }
        };
        tracing::debug!(
            %game_id,
            dealer_hand = %game.dealer_hand(),
            dealer_draws = draws.len(),
            "stand"
        );

        self.complete(game, settlement, &mut draws).await
    }

    /// Splits a pair into two games, staking a second bet.
    ///
    /// The new game shares the dealer hand and bet and is stored alongside the
    /// original. Returns the original game.
    ///
    /// # Errors
    ///
    /// [`TableError::GameNotFound`], [`TableError::GameNotInProgress`],
    /// [`TableError::InvalidSplit`], [`TableError::InsufficientFunds`],
    /// [`TableError::DeckExhausted`], or a storage error.
    pub async fn split(&self, game_id: GameId) -> Result<Game, TableError> {
        let _guard = self.locks.acquire(game_id).await;
        let mut game = self.load(game_id).await?;

        if let Err(err) = game.check_split() {
            tracing::warn!(%game_id, error = %err, "split rejected");
            return Err(TableError::from_action(game_id, err));
        }
        let player_id = game.player_id();
        let bet = game.bet();
        let stake = to_delta(bet)?;
        self.ensure_funds(player_id, bet).await?;

        let mut draws = Draws::new(&self.shoe);
        let split_game = match game.split(&mut draws) {
            Ok(split_game) => split_game,
            Err(err) => {
                draws.restore();
                return Err(TableError::from_action(game_id, err));
            }
        };

        if let Err(err) = self.balance_change(player_id, -stake).await {
            draws.restore();
            return Err(err);
        }

        let split_id = split_game.id();
        let batch = vec![game, split_game];
        match self
            .retry("save_all", || self.store.save_all(batch.clone()))
            .await
        {
            Ok(mut saved) => {
                tracing::info!(%game_id, %split_id, player_id, bet, "hand split");
                saved.retain(|saved| saved.id() == game_id);
                saved.pop().ok_or(TableError::GameNotFound(game_id))
            }
            Err(err) => {
                self.roll_back(player_id, stake, &mut draws, &err).await;
                Err(err)
            }
        }
    }

    /// Takes insurance against a dealer ace, staking half the bet.
    ///
    /// # Errors
    ///
    /// [`TableError::GameNotFound`], [`TableError::GameNotInProgress`],
    /// [`TableError::InvalidInsurance`], [`TableError::InsufficientFunds`],
    /// or a storage error.
    pub async fn insurance(&self, game_id: GameId) -> Result<Game, TableError> {
        let _guard = self.locks.acquire(game_id).await;
        let mut game = self.load(game_id).await?;

        if let Err(err) = game.check_insurance() {
            tracing::warn!(%game_id, error = %err, "insurance rejected");
            return Err(TableError::from_action(game_id, err));
        }
        let player_id = game.player_id();
        let stake = self.options.insurance_stake(game.bet());
        let delta = to_delta(stake)?;
        self.ensure_funds(player_id, stake).await?;

        game.take_insurance(stake)
            .map_err(|err| TableError::from_action(game_id, err))?;
        self.balance_change(player_id, -delta).await?;

        match self.save(game).await {
            Ok(game) => {
                tracing::info!(%game_id, player_id, stake, "insurance taken");
                Ok(game)
            }
            Err(err) => {
                self.roll_back(player_id, delta, &mut Draws::new(&self.shoe), &err)
                    .await;
                Err(err)
            }
        }
    }

    /// Loads a game.
    ///
    /// # Errors
    ///
    /// [`TableError::GameNotFound`] or a storage error.
    pub async fn get_game(&self, game_id: GameId) -> Result<Game, TableError> {
        self.load(game_id).await
    }

    /// Games of a player still in progress.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub async fn active_games(&self, player_id: PlayerId) -> Result<Vec<Game>, TableError> {
        self.retry("find_active_by_player", || {
            self.store.find_active_by_player(player_id)
        })
        .await
    }

    /// Completed games of a player within a time range, newest first.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub async fn completed_games(
        &self,
        player_id: PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Game>, TableError> {
        self.retry("find_completed_in_range", || {
            self.store.find_completed_in_range(player_id, from, to)
        })
        .await
    }

    /// In-progress games with a bet of at least `threshold`.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub async fn high_stake_games(&self, threshold: u64) -> Result<Vec<Game>, TableError> {
        self.retry("find_high_stake", || self.store.find_high_stake(threshold))
            .await
    }

    /// Deletes completed games that ended before `older_than`.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub async fn cleanup_completed(&self, older_than: DateTime<Utc>) -> Result<u64, TableError> {
        let deleted = self
            .retry("delete_completed_older_than", || {
                self.store.delete_completed_older_than(older_than)
            })
            .await?;
        tracing::info!(deleted, %older_than, "completed games cleaned up");
        Ok(deleted)
    }
}

/// Converts a chip amount to a balance change.
fn to_delta(amount: u64) -> Result<i64, TableError> {
    i64::try_from(amount).map_err(|_| TableError::AmountOutOfRange(amount))
}
