use std::fmt::{Debug, Formatter};

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Intent;
use crate::config::GameConfig;
use crate::deck::Deck;
use crate::error::CoupError;
use crate::events::Event;
use crate::player::Player;
use crate::turn::{PhaseKind, Step, Table, Turn};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub player_count: usize,
    // table order, fixed once everyone has joined
    pub players: Vec<Player>,
    pub deck: Deck,
    pub total_cards: usize,
    // -1 until the table is full
    pub turn_number: i64,
    pub current_player: Option<String>,
    pub turn: Turn,
    pub winner: Option<String>,
}

/// The result of applying one intent: the new game and what happened.
#[derive(Clone, Debug)]
pub struct Transition {
    pub game: Game,
    pub events: Vec<Event>,
}

impl Debug for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("T {} | P {:?} | {:?}\n", self.turn_number, self.current_player, self.turn.phase_kind()).as_str())?;
        for player in &self.players {
            f.write_str(format!("\t{}: ${} | {:?} | lost {:?}\n", player.name, player.money, player.held, player.lost).as_str())?;
        }
        Ok(())
    }
}

impl Game {
    pub fn create(config: &GameConfig) -> Result<Self, CoupError> {
        config.validate()?;
        let deck = Deck::new(&config.roles, config.copies_per_role);

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            player_count: config.player_count,
            players: Vec::with_capacity(config.player_count),
            total_cards: deck.len(),
            deck,
            turn_number: -1,
            current_player: None,
            turn: Turn::new(),
            winner: None,
        })
    }

    pub fn add_player<R: Rng>(&mut self, name: &str, rng: &mut R) -> Result<(), CoupError> {
        if self.players.len() >= self.player_count {
            return Err(CoupError::GameFull);
        }
        if self.players.iter().any(|player| player.name == name) {
            return Err(CoupError::DuplicatePlayer(name.to_string()));
        }

        // draw both before touching the deck for real, a failed draw must not lose a card
        let mut deck = self.deck.clone();
        let held = vec![deck.draw(rng)?, deck.draw(rng)?];
        self.deck = deck;
        self.players.push(Player::new(name, held));

        if self.players.len() == self.player_count {
            self.turn_number = 0;
            self.current_player = Some(self.players[0].name.clone());
        }
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.turn_number >= 0
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn player(&self, name: &str) -> Result<&Player, CoupError> {
        self.players
            .iter()
            .find(|player| player.name == name)
            .ok_or_else(|| CoupError::UnknownPlayer(name.to_string()))
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(|player| player.is_alive())
    }

    /// Every card currently in the game, wherever it sits.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.players.iter().map(|player| player.held.len() + player.lost.len()).sum::<usize>()
            + self.turn.cards_in_flight()
    }

    /// Applies `intent` from player `by` to a copy of the game. On error the
    /// game the caller holds is untouched and the intent can be retried.
    pub fn apply<R: Rng>(&self, by: &str, intent: Intent, rng: &mut R) -> Result<Transition, CoupError> {
        if !self.is_started() {
            return Err(CoupError::GameNotStarted);
        }
        if self.is_over() {
            return Err(CoupError::InvalidPhase(PhaseKind::Complete));
        }
        if !self.player(by)?.is_alive() {
            return Err(CoupError::OutOfTurn(format!("{by} is out of the game")));
        }

        let mut game = self.clone();
        let mut events = Vec::new();

        let step = {
            let Game { players, deck, turn, current_player, .. } = &mut game;
            let current_player = current_player.as_deref().unwrap_or_default();
            let mut table = Table {
                players,
                deck,
                rng,
                events: &mut events,
            };

            let step = match intent {
                Intent::Declare { kind, target } => turn.declare(&mut table, current_player, by, kind, target),
                Intent::ReplyChallenge { challenges } => turn.reply_challenge(&mut table, by, challenges),
                Intent::ReplyBlock { blocks, card } => turn.reply_block(&mut table, by, blocks, card),
                Intent::ReplyChallengeOfBlock { challenges } => turn.reply_challenge_of_block(&mut table, by, challenges),
                Intent::LoseInfluence { card } => turn.resolve_life_loss(&mut table, by, card),
                Intent::ApplyEffect => turn.apply_effect(&mut table),
                Intent::SelectExchange { keep } => turn.select_exchange(&mut table, by, keep),
                Intent::Acknowledge => turn.acknowledge(&mut table, by),
            };
            step?
        };

        // an elimination can end the game from any phase
        if game.alive_players().count() <= 1 {
            game.turn.finish();
            game.advance(&mut events);
        } else if step == Step::Advance {
            game.advance(&mut events);
        }

        debug_assert_eq!(game.card_count(), game.total_cards, "cards were created or destroyed");
        Ok(Transition { game, events })
    }

    /// Ends the current turn. Returns false once a single player remains.
    pub fn advance(&mut self, events: &mut Vec<Event>) -> bool {
        let alive: Vec<String> = self.alive_players().map(|player| player.name.clone()).collect();
        if alive.len() <= 1 {
            if let Some(winner) = alive.into_iter().next() {
                self.winner = Some(winner.clone());
                self.push_event(events, Event::GameWon { player: winner });
            }
            return false;
        }

        let next = self.next_alive_player();
        self.turn_number += 1;
        self.turn = Turn::new();
        self.current_player = Some(next.clone());
        self.push_event(events, Event::TurnAdvanced {
            turn_number: self.turn_number,
            player: next,
        });
        true
    }

    fn push_event(&mut self, events: &mut Vec<Event>, event: Event) {
        self.turn.log.push(event.to_string());
        events.push(event);
    }

    fn next_alive_player(&self) -> String {
        let current_idx = self
            .current_player
            .as_deref()
            .and_then(|name| self.players.iter().position(|player| player.name == name))
            .unwrap_or(0);

        self.players[current_idx + 1..]
            .iter()
            .chain(self.players.iter())
            .find(|player| player.is_alive())
            .map(|player| player.name.clone())
            .unwrap_or_default()
    }
}
