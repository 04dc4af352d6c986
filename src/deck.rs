use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoupError;
use crate::role::Role;

/// The face-down pile. Order is irrelevant, draws pick uniformly at random.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Role>,
}

impl Deck {
    pub fn new(roles: &[Role], copies_per_role: usize) -> Self {
        let cards = roles
            .iter()
            .flat_map(|&role| std::iter::repeat(role).take(copies_per_role))
            .collect();

        Self { cards }
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Role, CoupError> {
        if self.cards.is_empty() {
            return Err(CoupError::EmptyDeck);
        }

        let idx = rng.gen_range(0..self.cards.len());
        Ok(self.cards.swap_remove(idx))
    }

    pub fn return_card(&mut self, card: Role) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn count(&self, role: Role) -> usize {
        self.cards.iter().filter(|&&card| card == role).count()
    }

    #[cfg(test)]
    pub(crate) fn take(&mut self, role: Role) -> Option<Role> {
        let idx = self.cards.iter().position(|&card| card == role)?;
        Some(self.cards.swap_remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::role::ROLE_VARIANTS;

    #[test]
    fn draw_until_empty() {
        let mut rng = Pcg64::seed_from_u64(7);
        let mut deck = Deck::new(&ROLE_VARIANTS, 3);
        assert_eq!(deck.len(), 15);

        let mut drawn = Vec::new();
        while !deck.is_empty() {
            drawn.push(deck.draw(&mut rng).unwrap());
        }

        for role in ROLE_VARIANTS {
            assert_eq!(drawn.iter().filter(|&&card| card == role).count(), 3);
        }
        assert!(matches!(deck.draw(&mut rng), Err(CoupError::EmptyDeck)));
    }

    #[test]
    fn returned_cards_can_be_drawn_again() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut deck = Deck::new(&[Role::Duke], 1);

        let card = deck.draw(&mut rng).unwrap();
        assert!(deck.is_empty());

        deck.return_card(card);
        assert_eq!(deck.count(Role::Duke), 1);
        assert_eq!(deck.draw(&mut rng).unwrap(), Role::Duke);
    }
}
