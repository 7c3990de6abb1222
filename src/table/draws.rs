use crate::card::Card;
use crate::error::ShoeError;
use crate::shoe::{CardSource, Shoe};

/// A [`CardSource`] over the shared shoe that remembers what it dealt, so a
/// failed operation can put the cards back.
///
/// Each card is tagged with the shoe generation it came from; cards from a
/// generation the shoe has since replaced are dropped on restore.
pub(super) struct Draws<'a> {
    shoe: &'a Shoe,
    drawn: Vec<(Card, u64)>,
}

impl<'a> Draws<'a> {
    pub(super) const fn new(shoe: &'a Shoe) -> Self {
        Self {
            shoe,
            drawn: Vec::new(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.drawn.len()
    }

    /// Draws `count` cards at once, in draw order.
    pub(super) fn draw_many(&mut self, count: usize) -> Result<Vec<Card>, ShoeError> {
        let (cards, generation) = self.shoe.draw_many_tagged(count)?;
        self.drawn
            .extend(cards.iter().map(|&card| (card, generation)));
        Ok(cards)
    }

    /// Returns every card drawn so far to the top of the shoe.
    pub(super) fn restore(&mut self) {
        if self.drawn.is_empty() {
            return;
        }
        let stale = self.shoe.restore_drawn(&self.drawn);
        if stale > 0 {
            tracing::warn!(
                discarded = stale,
                generation = self.shoe.generation(),
                "shoe re-initialized since the draw, cards not restored"
            );
        }
        self.drawn.clear();
    }
}

impl CardSource for Draws<'_> {
    fn draw(&mut self) -> Result<Card, ShoeError> {
        let (card, generation) = self.shoe.draw_tagged()?;
        self.drawn.push((card, generation));
        Ok(card)
    }
}
