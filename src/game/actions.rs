use chrono::Utc;
use uuid::Uuid;

use crate::card::Card;
use crate::error::{ActionError, SplitRejection};
use crate::hand::Hand;
use crate::options::TableOptions;
use crate::result::Settlement;
use crate::shoe::CardSource;

use super::{Game, GameAction, GameStatus};

impl Game {
    /// Player action: Hit (draw a card).
    ///
    /// If the hand busts the game completes immediately as a dealer win,
    /// without dealer play, and the settlement is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is not in progress or the shoe is empty.
    pub fn hit<S: CardSource>(
        &mut self,
        source: &mut S,
        options: &TableOptions,
    ) -> Result<(Card, Option<Settlement>), ActionError> {
        self.ensure_in_progress()?;

        let card = source.draw()?;
        self.player_hand.add_card(card);
        self.actions.push(GameAction::Hit);

        if self.player_hand.is_busted() {
            let settlement = self.settle(options);
            self.complete(settlement.result);
            return Ok((card, Some(settlement)));
        }

        Ok((card, None))
    }

    /// Player action: Stand (keep current hand).
    ///
    /// Reveals the hole card, plays the dealer out, and completes the game.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is not in progress or the shoe runs out
    /// while the dealer must draw. On error the game is unchanged.
    pub fn stand<S: CardSource>(
        &mut self,
        source: &mut S,
        options: &TableOptions,
    ) -> Result<Settlement, ActionError> {
        self.ensure_in_progress()?;

        self.dealer_hand = self.play_dealer(source, options)?;
        self.actions.push(GameAction::Stand);

        let settlement = self.settle(options);
        self.complete(settlement.result);
        Ok(settlement)
    }

    /// Checks that the player's hand can be split.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is not in progress or the hand is not a
    /// pair of equal-valued cards.
    pub fn check_split(&self) -> Result<(), ActionError> {
        self.ensure_in_progress()?;

        match self.player_hand.cards() {
            [first, second] if first.value() == second.value() => Ok(()),
            [first, second] => Err(ActionError::InvalidSplit(SplitRejection::UnequalValues(
                first.value(),
                second.value(),
            ))),
            cards => Err(ActionError::InvalidSplit(SplitRejection::CardCount(
                cards.len(),
            ))),
        }
    }

    /// Player action: Split (split a pair into two games).
    ///
    /// The second card moves to a new game that shares this game's dealer
    /// hand and bet; each hand then receives one card. Returns the new game.
    /// The caller is responsible for staking the second bet.
    ///
    /// # Errors
    ///
    /// Returns an error if the hand cannot be split or the shoe cannot supply
    /// both cards. On error the game is unchanged.
    pub fn split<S: CardSource>(&mut self, source: &mut S) -> Result<Self, ActionError> {
        self.check_split()?;

        let first_draw = source.draw()?;
        let second_draw = source.draw()?;

        let Some(split_card) = self.player_hand.take_split_card() else {
            return Err(ActionError::InvalidSplit(SplitRejection::CardCount(
                self.player_hand.len(),
            )));
        };
        self.player_hand.add_card(first_draw);
        self.actions.push(GameAction::Split);

        Ok(Self {
            id: Uuid::new_v4(),
            player_id: self.player_id,
            player_hand: Hand::from_cards([split_card, second_draw]),
            dealer_hand: self.dealer_hand.clone(),
            bet: self.bet,
            insurance_bet: None,
            status: GameStatus::InProgress,
            start_time: Utc::now(),
            end_time: None,
            result: None,
            actions: vec![GameAction::Split],
            split_from: Some(self.id),
            version: 0,
        })
    }
}
