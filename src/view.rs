use serde::Serialize;

use crate::action::{Action, Intent};
use crate::game::Game;
use crate::role::Role;
use crate::turn::{BlockVerdict, Phase, PhaseKind};

/// What one player is allowed to see of another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub money: u8,
    pub influence: usize,
    pub lost: Vec<Role>,
}

/// The game as seen by a single player. Other players' held cards and the
/// deck contents stay hidden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub id: String,
    pub turn_number: i64,
    pub current_player: Option<String>,
    pub phase: PhaseKind,
    pub action: Option<Action>,
    // who has to reveal a card before the turn can continue
    pub pending_loss: Option<String>,
    // the standing block on the action, blocker and claimed card
    pub block: Option<(String, Role)>,
    pub players: Vec<PlayerView>,
    pub deck_size: usize,
    pub held: Vec<Role>,
    pub exchange_pool: Option<Vec<Role>>,
    pub legal_intents: Vec<Intent>,
    pub log: Vec<String>,
    pub winner: Option<String>,
}

impl Game {
    pub fn view_for(&self, viewer: &str) -> GameView {
        let players = self
            .players
            .iter()
            .map(|player| PlayerView {
                name: player.name.clone(),
                money: player.money,
                influence: player.held.len(),
                lost: player.lost.clone(),
            })
            .collect();

        let held = self
            .players
            .iter()
            .find(|player| player.name == viewer)
            .map(|player| player.held.clone())
            .unwrap_or_default();

        let is_actor = self.turn.action.as_ref().is_some_and(|action| action.actor == viewer);
        let exchange_pool = if is_actor { self.turn.exchange_pool(&self.players) } else { None };

        let pending_loss = match &self.turn.phase {
            Phase::ResolvingLifeLoss { who, .. } => Some(who.clone()),
            _ => None,
        };
        let block = match &self.turn.block {
            BlockVerdict::Blocked { by, card } => Some((by.clone(), *card)),
            _ => None,
        };

        GameView {
            id: self.id.clone(),
            turn_number: self.turn_number,
            current_player: self.current_player.clone(),
            phase: self.turn.phase_kind(),
            action: self.turn.action.clone(),
            pending_loss,
            block,
            players,
            deck_size: self.deck.len(),
            held,
            exchange_pool,
            legal_intents: self.legal_intents(viewer),
            log: self.turn.log.clone(),
            winner: self.winner.clone(),
        }
    }
}
