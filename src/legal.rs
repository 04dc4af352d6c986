use std::collections::BTreeSet;

use crate::action::{ActionKind, Intent, ASSASSINATE_COST, COUP_COST, FORCED_COUP_MONEY};
use crate::game::Game;
use crate::role::Role;
use crate::turn::Phase;

impl Game {
    /// Every intent from `by` that the engine would accept and that moves the
    /// game forward. Repeating an acknowledgement already recorded is accepted
    /// by [`Game::apply`] but is not listed here.
    pub fn legal_intents(&self, by: &str) -> Vec<Intent> {
        let mut intents = Vec::with_capacity(self.players.len() * 2);

        if !self.is_started() || self.is_over() {
            return intents;
        }
        let Ok(player) = self.player(by) else {
            return intents;
        };
        if !player.is_alive() {
            return intents;
        }

        let opponents: Vec<&str> = self
            .alive_players()
            .filter(|p| p.name != by)
            .map(|p| p.name.as_str())
            .collect();
        let action = self.turn.action.as_ref();
        let is_actor = action.is_some_and(|action| action.actor == by);

        match &self.turn.phase {
            Phase::AwaitingAction => {
                if self.current_player.as_deref() != Some(by) {
                    return intents;
                }

                if player.money >= FORCED_COUP_MONEY {
                    // forced coup at $10+
                    for &opponent in &opponents {
                        intents.push(Intent::declare(ActionKind::Coup, Some(opponent)));
                    }
                    return intents;
                }

                intents.push(Intent::declare(ActionKind::Income, None));
                intents.push(Intent::declare(ActionKind::ForeignAid, None));
                intents.push(Intent::declare(ActionKind::Taxes, None));
                intents.push(Intent::declare(ActionKind::Ambassador, None));
                for &opponent in &opponents {
                    intents.push(Intent::declare(ActionKind::Steal, Some(opponent)));
                    if player.money >= ASSASSINATE_COST {
                        intents.push(Intent::declare(ActionKind::Assassinate, Some(opponent)));
                    }
                    if player.money >= COUP_COST {
                        intents.push(Intent::declare(ActionKind::Coup, Some(opponent)));
                    }
                }
            }
            Phase::AwaitingChallengeOfAction { gate } => {
                if !gate.has(by) {
                    intents.push(Intent::ReplyChallenge { challenges: false });
                    intents.push(Intent::ReplyChallenge { challenges: true });
                }
            }
            Phase::AwaitingBlock { gate } => {
                let Some(action) = action else {
                    return intents;
                };
                let may_answer = match action.kind {
                    ActionKind::ForeignAid => !gate.has(by),
                    _ => action.target() == by,
                };
                if may_answer {
                    intents.push(Intent::ReplyBlock { blocks: false, card: None });
                    for &card in action.kind.blocking_roles() {
                        intents.push(Intent::ReplyBlock {
                            blocks: true,
                            card: Some(card),
                        });
                    }
                }
            }
            Phase::AwaitingChallengeOfBlock { gate, .. } => {
                if !gate.has(by) {
                    intents.push(Intent::ReplyChallengeOfBlock { challenges: false });
                    intents.push(Intent::ReplyChallengeOfBlock { challenges: true });
                }
            }
            Phase::ResolvingLifeLoss { who, .. } => {
                if who == by {
                    let cards: BTreeSet<Role> = player.held.iter().copied().collect();
                    intents.extend(cards.into_iter().map(|card| Intent::LoseInfluence { card }));
                }
            }
            Phase::ApplyingEffect => {
                intents.push(Intent::ApplyEffect);
            }
            Phase::AwaitingCompletionAck { gate, exchange } => {
                if exchange.is_some() && is_actor {
                    if let Some(pool) = self.turn.exchange_pool(&self.players) {
                        intents.extend(selections(&pool, player.held.len()).into_iter().map(|keep| Intent::SelectExchange { keep }));
                    }
                } else if !gate.has(by) {
                    intents.push(Intent::Acknowledge);
                }
            }
            Phase::Complete => {}
        }

        intents
    }

    /// Legal intents of every player still in the game, in table order.
    pub fn legal_moves(&self) -> Vec<(String, Intent)> {
        self.alive_players()
            .flat_map(|player| {
                self.legal_intents(&player.name)
                    .into_iter()
                    .map(|intent| (player.name.clone(), intent))
            })
            .collect()
    }
}

/// Distinct hands of `size` cards that can be kept out of `pool`.
fn selections(pool: &[Role], size: usize) -> Vec<Vec<Role>> {
    let mut found = BTreeSet::new();
    let mut chosen = Vec::with_capacity(size);
    collect_selections(pool, size, 0, &mut chosen, &mut found);
    found.into_iter().collect()
}

fn collect_selections(pool: &[Role], size: usize, start: usize, chosen: &mut Vec<Role>, found: &mut BTreeSet<Vec<Role>>) {
    if chosen.len() == size {
        let mut hand = chosen.clone();
        hand.sort();
        found.insert(hand);
        return;
    }

    for idx in start..pool.len() {
        chosen.push(pool[idx]);
        collect_selections(pool, size, idx + 1, chosen, found);
        chosen.pop();
    }
}
