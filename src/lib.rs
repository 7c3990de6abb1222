//! A blackjack table engine.
//!
//! The crate deals games from a shared multi-deck [`Shoe`], evaluates hands
//! with ace optimization, plays the dealer by house policy, and settles bets.
//! A [`Table`] drives each [`Game`] through its state machine and talks to two
//! collaborators: a [`PlayerLedger`] for balances and statistics, and a
//! [`GameStore`] for durable game records.
//!
//! # Example
//!
//! ```
//! use bjtable::{GameStatus, MemoryGameStore, MemoryLedger, Table, TableOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), bjtable::TableError> {
//! let table = Table::new(TableOptions::default(), MemoryLedger::new(), MemoryGameStore::new(), 42);
//! let player = table.ledger().create_player("alice", 100);
//!
//! let game = table.start_game(player.id, 10).await?;
//! let game = table.stand(game.id()).await?;
//! assert_eq!(game.status(), GameStatus::Completed);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod card;
pub mod error;
pub mod game;
pub mod hand;
pub mod ledger;
pub mod options;
pub mod player;
pub mod result;
pub mod shoe;
pub mod store;
mod sync;
pub mod table;

// Re-export main types
pub use card::{Card, DECK_SIZE, Rank, Suit};
pub use error::{
    ActionError, InsuranceRejection, LedgerError, ShoeError, SplitRejection, StoreError,
    TableError,
};
pub use game::{Game, GameAction, GameId, GameResult, GameStatus, dealer_should_draw};
pub use hand::Hand;
pub use ledger::{MemoryLedger, PlayerLedger};
pub use options::{RoundingMode, TableOptions};
pub use player::{Player, PlayerId};
pub use result::Settlement;
pub use shoe::{CardSource, Shoe};
pub use store::{GameStore, MemoryGameStore};
pub use table::Table;
