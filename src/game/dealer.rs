use core::cmp::Ordering;

use crate::error::ActionError;
use crate::hand::Hand;
use crate::options::TableOptions;
use crate::result::Settlement;
use crate::shoe::CardSource;

use super::{Game, GameResult};

/// Returns whether the house policy makes the dealer draw on `hand`.
///
/// The dealer draws below 17 and stands on hard 17 or anything higher. Soft
/// 17 draws unless `stand_on_soft_17` is set.
#[must_use]
pub fn dealer_should_draw(hand: &Hand, stand_on_soft_17: bool) -> bool {
    let value = hand.value();
    value < 17 || (value == 17 && hand.is_soft() && !stand_on_soft_17)
}

impl Game {
    /// Dealer plays their hand according to the house policy.
    ///
    /// Works on a copy of the dealer hand: the hole card is revealed and cards
    /// are drawn until the policy says stand. Returns the finished hand.
    pub(super) fn play_dealer<S: CardSource>(
        &self,
        source: &mut S,
        options: &TableOptions,
    ) -> Result<Hand, ActionError> {
        let mut dealer = self.dealer_hand.clone();
        dealer.reveal();

        while dealer_should_draw(&dealer, options.stand_on_soft_17) {
            let card = source.draw()?;
            tracing::debug!(game_id = %self.id, card = %card, "dealer draws");
            dealer.add_card(card);
        }

        Ok(dealer)
    }

    /// Determines the result and the credits owed for the current hands.
    ///
    /// Evaluation order:
    /// 1. Insurance pays when the dealer has blackjack, otherwise it is lost.
    /// 2. A player natural the dealer does not match pays the blackjack ratio.
    /// 3. Dealer blackjack or player bust loses.
    /// 4. Dealer bust wins even money.
    /// 5. Otherwise the higher total wins; equal totals push.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 has sufficient precision for monetary values"
    )]
    pub fn settle(&self, options: &TableOptions) -> Settlement {
        let player = &self.player_hand;
        let dealer = &self.dealer_hand;
        let bet = self.bet;

        let dealer_blackjack = dealer.is_blackjack();

        let insurance_credit = match self.insurance_bet {
            Some(stake) if dealer_blackjack => options
                .rounding_insurance
                .apply(stake as f64 * options.insurance_pays),
            _ => 0,
        };

        let (result, credit) = if player.is_blackjack() && !dealer_blackjack {
            let winnings = options
                .rounding_blackjack
                .apply(bet as f64 * options.blackjack_pays);
            (GameResult::PlayerBlackjack, bet.saturating_add(winnings))
        } else if dealer_blackjack || player.is_busted() {
            (GameResult::DealerWin, 0)
        } else if dealer.is_busted() {
            (GameResult::PlayerWin, bet.saturating_mul(2))
        } else {
            match player.value().cmp(&dealer.value()) {
                Ordering::Greater => (GameResult::PlayerWin, bet.saturating_mul(2)),
                Ordering::Less => (GameResult::DealerWin, 0),
                Ordering::Equal => (GameResult::Push, bet),
            }
        };

        Settlement {
            result,
            bet,
            credit,
            insurance_bet: self.insurance_bet,
            insurance_credit,
            player_value: player.value(),
            dealer_value: dealer.value(),
        }
    }
}
