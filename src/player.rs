use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::error::CoupError;
use crate::role::Role;

pub const STARTING_MONEY: u8 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub money: u8,
    // face down
    pub held: Vec<Role>,
    // face up, out of play for good
    pub lost: Vec<Role>,
}

impl Player {
    pub fn new(name: impl Into<String>, held: Vec<Role>) -> Self {
        Self {
            name: name.into(),
            money: STARTING_MONEY,
            held,
            lost: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.held.is_empty()
    }

    pub fn holds(&self, role: Role) -> bool {
        self.held.contains(&role)
    }

    pub fn pay(&mut self, amount: u8) -> Result<(), CoupError> {
        if self.money < amount {
            return Err(CoupError::InsufficientFunds {
                player: self.name.clone(),
                money: self.money,
                needed: amount,
            });
        }

        self.money -= amount;
        Ok(())
    }

    pub fn earn(&mut self, amount: u8) {
        self.money = self.money.saturating_add(amount);
    }

    /// Shuffles a proven card back into the deck and draws its replacement.
    pub fn replace_card<R: Rng + ?Sized>(&mut self, role: Role, deck: &mut Deck, rng: &mut R) -> Result<(), CoupError> {
        let idx = self.card_idx(role)?;
        deck.return_card(self.held.remove(idx));

        let card = deck.draw(rng)?;
        self.held.insert(idx, card);
        Ok(())
    }

    /// Reveals one held card. It stays face up in front of the player.
    pub fn lose_card(&mut self, role: Role) -> Result<(), CoupError> {
        let idx = self.card_idx(role)?;
        let card = self.held.remove(idx);
        self.lost.push(card);
        Ok(())
    }

    pub fn eliminate(&mut self) {
        self.lost.append(&mut self.held);
    }

    fn card_idx(&self, role: Role) -> Result<usize, CoupError> {
        self.held
            .iter()
            .position(|&card| card == role)
            .ok_or_else(|| CoupError::CardNotHeld {
                player: self.name.clone(),
                card: role,
            })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn losing_cards() {
        let mut player = Player::new("ada", vec![Role::Duke, Role::Captain]);
        assert!(matches!(player.lose_card(Role::Contessa), Err(CoupError::CardNotHeld { .. })));

        player.lose_card(Role::Captain).unwrap();
        assert_eq!(player.held, vec![Role::Duke]);
        assert_eq!(player.lost, vec![Role::Captain]);
        assert!(player.is_alive());

        player.eliminate();
        assert!(!player.is_alive());
        assert_eq!(player.lost, vec![Role::Captain, Role::Duke]);
    }

    #[test]
    fn replace_keeps_hand_size() {
        let mut rng = Pcg64::seed_from_u64(3);
        let mut deck = Deck::new(&[Role::Contessa], 2);
        let mut player = Player::new("ada", vec![Role::Duke, Role::Captain]);

        player.replace_card(Role::Duke, &mut deck, &mut rng).unwrap();
        assert_eq!(player.held.len(), 2);
        assert!(player.holds(Role::Captain));
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.count(Role::Duke) + player.held.iter().filter(|&&c| c == Role::Duke).count(), 1);
    }

    #[test]
    fn cannot_pay_more_than_owned() {
        let mut player = Player::new("ada", vec![Role::Duke, Role::Captain]);
        assert!(matches!(player.pay(3), Err(CoupError::InsufficientFunds { money: 2, needed: 3, .. })));
        assert_eq!(player.money, 2);

        player.pay(2).unwrap();
        assert_eq!(player.money, 0);
    }
}
