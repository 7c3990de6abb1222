use crate::error::{ActionError, InsuranceRejection};

use super::{Game, GameAction};

impl Game {
    /// Returns whether insurance is currently being offered.
    #[must_use]
    pub fn is_insurance_offered(&self) -> bool {
        self.check_insurance().is_ok()
    }

    /// Checks that insurance can be taken on this game.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is not in progress, insurance was already
    /// taken, or the dealer's up card is not an ace.
    pub fn check_insurance(&self) -> Result<(), ActionError> {
        self.ensure_in_progress()?;

        if self.insurance_bet.is_some() {
            return Err(ActionError::InvalidInsurance(
                InsuranceRejection::AlreadyTaken,
            ));
        }

        if !self.dealer_hand.up_card().is_some_and(|card| card.is_ace()) {
            return Err(ActionError::InvalidInsurance(
                InsuranceRejection::NoDealerAce,
            ));
        }

        Ok(())
    }

    /// Records an insurance stake, settled when the game completes.
    ///
    /// The caller is responsible for debiting `stake` from the player.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`check_insurance`](Self::check_insurance).
    pub fn take_insurance(&mut self, stake: u64) -> Result<(), ActionError> {
        self.check_insurance()?;

        self.insurance_bet = Some(stake);
        self.actions.push(GameAction::Insurance);
        Ok(())
    }
}
