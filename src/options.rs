//! Table configuration options.

use serde::{Deserialize, Serialize};

/// Rounding mode for fractional payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round up.
    Up,
    /// Round down.
    Down,
    /// Round to nearest.
    Nearest,
}

impl RoundingMode {
    /// Rounds a non-negative chip amount to a whole chip.
    #[must_use]
    pub fn apply(self, amount: f64) -> u64 {
        let rounded = match self {
            Self::Up => amount.ceil(),
            Self::Down => amount.floor(),
            Self::Nearest => amount.round(),
        };
        rounded.max(0.0) as u64
    }
}

/// Configuration options for a blackjack table.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use bjtable::TableOptions;
///
/// let options = TableOptions::default()
///     .with_decks(8)
///     .with_blackjack_pays(1.2)
///     .with_stand_on_soft_17(true);
/// ```
///
/// Options also deserialize with every field optional:
///
/// ```
/// use bjtable::TableOptions;
///
/// let options: TableOptions = serde_json::from_str(r#"{ "decks": 2 }"#).unwrap();
/// assert_eq!(options.decks, 2);
/// assert_eq!(options.reshuffle_threshold, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Number of decks loaded into the shoe.
    pub decks: u8,
    /// The shoe asks for a reshuffle once fewer cards than this remain.
    pub reshuffle_threshold: usize,
    /// Whether dealer stands on soft 17.
    pub stand_on_soft_17: bool,
    /// Blackjack payout ratio (profit per unit bet).
    pub blackjack_pays: f64,
    /// Multiple of the insurance bet credited when the dealer has blackjack.
    pub insurance_pays: f64,
    /// Rounding mode for blackjack payouts.
    pub rounding_blackjack: RoundingMode,
    /// Rounding mode for the half-bet insurance stake.
    pub rounding_insurance: RoundingMode,
    /// Attempts made for a collaborator call that fails transiently.
    pub storage_retries: u8,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            decks: 6,
            reshuffle_threshold: 20,
            stand_on_soft_17: false,
            blackjack_pays: 1.5,
            insurance_pays: 2.0,
            rounding_blackjack: RoundingMode::Down,
            rounding_insurance: RoundingMode::Up,
            storage_retries: 3,
        }
    }
}

impl TableOptions {
    /// Sets the number of decks.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_decks(2);
    /// assert_eq!(options.decks, 2);
    /// ```
    #[must_use]
    pub const fn with_decks(mut self, decks: u8) -> Self {
        self.decks = decks;
        self
    }

    /// Sets the reshuffle threshold.
    #[must_use]
    pub const fn with_reshuffle_threshold(mut self, threshold: usize) -> Self {
        self.reshuffle_threshold = threshold;
        self
    }

    /// Sets whether dealer stands on soft 17.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_stand_on_soft_17(true);
    /// assert!(options.stand_on_soft_17);
    /// ```
    #[must_use]
    pub const fn with_stand_on_soft_17(mut self, stand: bool) -> Self {
        self.stand_on_soft_17 = stand;
        self
    }

    /// Sets the blackjack payout ratio.
    #[must_use]
    pub const fn with_blackjack_pays(mut self, ratio: f64) -> Self {
        self.blackjack_pays = ratio;
        self
    }

    /// Sets the insurance credit multiple.
    #[must_use]
    pub const fn with_insurance_pays(mut self, multiple: f64) -> Self {
        self.insurance_pays = multiple;
        self
    }

    /// Sets the rounding mode for blackjack payouts.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::{RoundingMode, TableOptions};
    ///
    /// let options = TableOptions::default().with_rounding_blackjack(RoundingMode::Up);
    /// assert_eq!(options.rounding_blackjack, RoundingMode::Up);
    /// ```
    #[must_use]
    pub const fn with_rounding_blackjack(mut self, mode: RoundingMode) -> Self {
        self.rounding_blackjack = mode;
        self
    }

    /// Sets the rounding mode for insurance stakes.
    #[must_use]
    pub const fn with_rounding_insurance(mut self, mode: RoundingMode) -> Self {
        self.rounding_insurance = mode;
        self
    }

    /// Sets how many attempts a transiently failing collaborator call gets.
    #[must_use]
    pub const fn with_storage_retries(mut self, attempts: u8) -> Self {
        self.storage_retries = attempts;
        self
    }

    /// Insurance stake for the given bet: half, rounded per
    /// [`rounding_insurance`](Self::rounding_insurance).
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 has sufficient precision for monetary values"
    )]
    pub fn insurance_stake(&self, bet: u64) -> u64 {
        self.rounding_insurance.apply(bet as f64 * 0.5)
    }
}
