//! The phases a single turn passes through, from the declared action to
//! everyone acknowledging its outcome.
//!
//! ```text
//! - declare
//!     - income                                  -> ack
//!     - coup                                    -> lose life -> ack
//!     - foreign aid                             -> block?
//!     - character action                        -> challenge?
//!         - pass (everyone)                     -> block? | effect
//!         - challenge
//!             - claim proven: challenger loses  -> block? | effect
//!             - claim exposed: actor loses      -> ack
//! - block?
//!     - pass                                    -> effect | lose life (assassinate)
//!     - block                                   -> challenge block?
//!         - pass (everyone)                     -> next turn
//!         - challenge
//!             - block proven: challenger loses  -> ack
//!             - block exposed: blocker loses    -> effect | ack (assassinate)
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, ASSASSINATE_COST, COUP_COST, FORCED_COUP_MONEY};
use crate::deck::Deck;
use crate::error::CoupError;
use crate::events::Event;
use crate::gate::ConsensusGate;
use crate::graph;
use crate::player::Player;
use crate::role::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PhaseKind {
    AwaitingAction = 0,
    AwaitingChallengeOfAction = 1,
    AwaitingBlock = 2,
    AwaitingChallengeOfBlock = 3,
    ResolvingLifeLoss = 4,
    ApplyingEffect = 5,
    AwaitingCompletionAck = 6,
    Complete = 7,
}

pub static PHASE_KINDS: [PhaseKind; 8] = [
    PhaseKind::AwaitingAction,
    PhaseKind::AwaitingChallengeOfAction,
    PhaseKind::AwaitingBlock,
    PhaseKind::AwaitingChallengeOfBlock,
    PhaseKind::ResolvingLifeLoss,
    PhaseKind::ApplyingEffect,
    PhaseKind::AwaitingCompletionAck,
    PhaseKind::Complete,
];

/// Where the turn goes once a pending life loss has been resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterLoss {
    Block,
    ApplyEffect,
    CompletionAck,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    AwaitingAction,
    AwaitingChallengeOfAction {
        gate: ConsensusGate,
    },
    // the gate is only consulted for foreign aid, the other blockable
    // actions are answered by their target alone
    AwaitingBlock {
        gate: ConsensusGate,
    },
    AwaitingChallengeOfBlock {
        blocker: String,
        card: Role,
        gate: ConsensusGate,
    },
    ResolvingLifeLoss {
        who: String,
        then: AfterLoss,
    },
    ApplyingEffect,
    AwaitingCompletionAck {
        gate: ConsensusGate,
        // the two cards an ambassador drew and has not yet chosen between
        exchange: Option<Vec<Role>>,
    },
    Complete,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::AwaitingAction => PhaseKind::AwaitingAction,
            Phase::AwaitingChallengeOfAction { .. } => PhaseKind::AwaitingChallengeOfAction,
            Phase::AwaitingBlock { .. } => PhaseKind::AwaitingBlock,
            Phase::AwaitingChallengeOfBlock { .. } => PhaseKind::AwaitingChallengeOfBlock,
            Phase::ResolvingLifeLoss { .. } => PhaseKind::ResolvingLifeLoss,
            Phase::ApplyingEffect => PhaseKind::ApplyingEffect,
            Phase::AwaitingCompletionAck { .. } => PhaseKind::AwaitingCompletionAck,
            Phase::Complete => PhaseKind::Complete,
        }
    }

    /// The consensus gate the phase is collecting replies in, if any.
    pub fn gate(&self) -> Option<&ConsensusGate> {
        match self {
            Phase::AwaitingChallengeOfAction { gate }
            | Phase::AwaitingBlock { gate }
            | Phase::AwaitingChallengeOfBlock { gate, .. }
            | Phase::AwaitingCompletionAck { gate, .. } => Some(gate),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    Undecided,
    Accepted,
    Challenged { by: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum BlockVerdict {
    #[default]
    Undecided,
    Passed,
    Blocked { by: String, card: Role },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    // the turn is over, the game moves on to the next player
    Advance,
}

/// Mutable view of everything a turn acts on besides itself.
pub(crate) struct Table<'a, R: Rng> {
    pub players: &'a mut [Player],
    pub deck: &'a mut Deck,
    pub rng: &'a mut R,
    pub events: &'a mut Vec<Event>,
}

impl<'a, R: Rng> Table<'a, R> {
    pub fn player(&self, name: &str) -> Result<&Player, CoupError> {
        self.players
            .iter()
            .find(|player| player.name == name)
            .ok_or_else(|| CoupError::UnknownPlayer(name.to_string()))
    }

    pub fn player_mut(&mut self, name: &str) -> Result<&mut Player, CoupError> {
        self.players
            .iter_mut()
            .find(|player| player.name == name)
            .ok_or_else(|| CoupError::UnknownPlayer(name.to_string()))
    }

    pub fn alive(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|player| player.is_alive())
            .map(|player| player.name.clone())
            .collect()
    }

    fn is_alive(&self, name: &str) -> bool {
        self.player(name).map(Player::is_alive).unwrap_or(false)
    }

    fn replace_card(&mut self, name: &str, role: Role) -> Result<(), CoupError> {
        let Table { players, deck, rng, .. } = self;
        let player = players
            .iter_mut()
            .find(|player| player.name == name)
            .ok_or_else(|| CoupError::UnknownPlayer(name.to_string()))?;
        player.replace_card(role, deck, &mut **rng)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub action: Option<Action>,
    pub challenge: Verdict,
    pub block: BlockVerdict,
    pub challenge_block: Verdict,
    pub phase: Phase,
    pub log: Vec<String>,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::AwaitingAction
    }
}

impl Turn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Cards drawn for an ambassador exchange, held by neither the deck nor a player.
    pub fn cards_in_flight(&self) -> usize {
        match &self.phase {
            Phase::AwaitingCompletionAck { exchange: Some(drawn), .. } => drawn.len(),
            _ => 0,
        }
    }

    /// The exchange pool, visible only while the ambassador is choosing.
    pub fn exchange_pool(&self, players: &[Player]) -> Option<Vec<Role>> {
        let Phase::AwaitingCompletionAck { exchange: Some(drawn), .. } = &self.phase else {
            return None;
        };
        let actor = self.action.as_ref()?;
        let player = players.iter().find(|player| player.name == actor.actor)?;

        let mut pool = player.held.clone();
        pool.extend(drawn.iter().copied());
        Some(pool)
    }

    pub(crate) fn record<R: Rng>(&mut self, table: &mut Table<'_, R>, event: Event) {
        self.log.push(event.to_string());
        table.events.push(event);
    }

    pub(crate) fn finish(&mut self) {
        self.phase = Phase::Complete;
    }

    fn set_phase(&mut self, phase: Phase) {
        debug_assert!(
            graph::allows(self.phase.kind(), phase.kind()),
            "illegal transition {:?} -> {:?}",
            self.phase.kind(),
            phase.kind()
        );
        self.phase = phase;
    }

    fn expect_phase(&self, kind: PhaseKind) -> Result<(), CoupError> {
        if self.phase.kind() != kind {
            return Err(CoupError::InvalidPhase(self.phase.kind()));
        }
        Ok(())
    }

    fn current_action(&self) -> Result<Action, CoupError> {
        self.action.clone().ok_or(CoupError::InvalidPhase(self.phase.kind()))
    }

    pub(crate) fn declare<R: Rng>(
        &mut self,
        table: &mut Table<'_, R>,
        current_player: &str,
        by: &str,
        kind: ActionKind,
        target: Option<String>,
    ) -> Result<Step, CoupError> {
        self.expect_phase(PhaseKind::AwaitingAction)?;
        if by != current_player {
            return Err(CoupError::OutOfTurn(by.to_string()));
        }

        let money = table.player(by)?.money;
        if money >= FORCED_COUP_MONEY && kind != ActionKind::Coup {
            return Err(CoupError::MustCoup(by.to_string()));
        }

        let target = if kind.needs_target() {
            let target = target.ok_or_else(|| CoupError::InvalidTarget(format!("{kind} needs a target")))?;
            if target == by {
                return Err(CoupError::InvalidTarget(format!("{by} cannot target themselves")));
            }
            if !table.player(&target)?.is_alive() {
                return Err(CoupError::InvalidTarget(format!("{target} is already out")));
            }
            Some(target)
        } else {
            None
        };

        match kind {
            ActionKind::Coup => table.player_mut(by)?.pay(COUP_COST)?,
            ActionKind::Assassinate if money < ASSASSINATE_COST => {
                return Err(CoupError::InsufficientFunds {
                    player: by.to_string(),
                    money,
                    needed: ASSASSINATE_COST,
                });
            }
            _ => {}
        }

        let action = Action {
            kind,
            actor: by.to_string(),
            target,
        };
        self.action = Some(action.clone());
        self.record(table, Event::ActionDeclared { action: action.clone() });

        match kind {
            ActionKind::Income => {
                table.player_mut(by)?.earn(1);
                self.record(table, Event::EffectApplied { action, amount: 1 });
                self.enter_completion();
                Ok(Step::Continue)
            }
            ActionKind::Coup => self.lose_life(table, action.target(), AfterLoss::CompletionAck),
            ActionKind::ForeignAid => {
                self.set_phase(Phase::AwaitingBlock { gate: ConsensusGate::with(by) });
                Ok(Step::Continue)
            }
            ActionKind::Taxes | ActionKind::Steal | ActionKind::Assassinate | ActionKind::Ambassador => {
                self.set_phase(Phase::AwaitingChallengeOfAction { gate: ConsensusGate::with(by) });
                Ok(Step::Continue)
            }
        }
    }

    pub(crate) fn reply_challenge<R: Rng>(
        &mut self,
        table: &mut Table<'_, R>,
        by: &str,
        challenges: bool,
    ) -> Result<Step, CoupError> {
        let phase = self.phase.kind();
        let Phase::AwaitingChallengeOfAction { gate } = &mut self.phase else {
            return Err(CoupError::InvalidPhase(phase));
        };
        let action = self.action.clone().ok_or(CoupError::InvalidPhase(phase))?;
        let claimed = action.kind.claimed_role().ok_or(CoupError::InvalidPhase(phase))?;

        if !challenges {
            if !gate.record(by, &table.alive()) {
                return Ok(Step::Continue);
            }

            self.challenge = Verdict::Accepted;
            self.record(table, Event::ActionUnchallenged);
            return match action.kind {
                ActionKind::Steal | ActionKind::Assassinate => self.enter_block(table),
                _ => {
                    self.set_phase(Phase::ApplyingEffect);
                    Ok(Step::Continue)
                }
            };
        }

        if by == action.actor {
            return Err(CoupError::OutOfTurn(format!("{by} cannot challenge their own claim")));
        }
        self.challenge = Verdict::Challenged { by: by.to_string() };

        if table.player(&action.actor)?.holds(claimed) {
            table.replace_card(&action.actor, claimed)?;
            self.record(table, Event::ClaimProven {
                challenger: by.to_string(),
                actor: action.actor.clone(),
                role: claimed,
            });

            let then = match action.kind {
                ActionKind::Steal | ActionKind::Assassinate => AfterLoss::Block,
                _ => AfterLoss::ApplyEffect,
            };
            self.lose_life(table, by, then)
        } else {
            self.record(table, Event::ClaimExposed {
                challenger: by.to_string(),
                actor: action.actor.clone(),
                role: claimed,
            });
            self.lose_life(table, &action.actor, AfterLoss::CompletionAck)
        }
    }

    pub(crate) fn reply_block<R: Rng>(
        &mut self,
        table: &mut Table<'_, R>,
        by: &str,
        blocks: bool,
        card: Option<Role>,
    ) -> Result<Step, CoupError> {
        let phase = self.phase.kind();
        let Phase::AwaitingBlock { gate } = &mut self.phase else {
            return Err(CoupError::InvalidPhase(phase));
        };
        let action = self.action.clone().ok_or(CoupError::InvalidPhase(phase))?;

        if action.kind != ActionKind::ForeignAid && by != action.target() {
            return Err(CoupError::OutOfTurn(format!("only {} may block {}", action.target(), action.kind)));
        }

        if blocks {
            if by == action.actor {
                return Err(CoupError::OutOfTurn(format!("{by} cannot block their own action")));
            }

            let card = match (card, action.kind.blocking_roles()) {
                (Some(card), _) => card,
                (None, [only]) => *only,
                (None, _) => {
                    return Err(CoupError::InvalidSelection(format!("name the card that blocks {}", action.kind)));
                }
            };
            if !action.kind.blocking_roles().contains(&card) {
                return Err(CoupError::CannotBlock {
                    action: action.kind.to_string(),
                    card,
                });
            }

            self.block = BlockVerdict::Blocked {
                by: by.to_string(),
                card,
            };
            self.record(table, Event::Blocked {
                blocker: by.to_string(),
                card,
            });
            self.set_phase(Phase::AwaitingChallengeOfBlock {
                blocker: by.to_string(),
                card,
                gate: ConsensusGate::with(by),
            });
            return Ok(Step::Continue);
        }

        match action.kind {
            ActionKind::ForeignAid => {
                if !gate.record(by, &table.alive()) {
                    return Ok(Step::Continue);
                }

                self.block = BlockVerdict::Passed;
                self.record(table, Event::NotBlocked);
                self.set_phase(Phase::ApplyingEffect);
                Ok(Step::Continue)
            }
            ActionKind::Steal => {
                self.block = BlockVerdict::Passed;
                self.record(table, Event::NotBlocked);
                self.set_phase(Phase::ApplyingEffect);
                Ok(Step::Continue)
            }
            ActionKind::Assassinate => {
                self.block = BlockVerdict::Passed;
                self.record(table, Event::NotBlocked);
                table.player_mut(&action.actor)?.pay(ASSASSINATE_COST)?;
                self.lose_life(table, action.target(), AfterLoss::CompletionAck)
            }
            _ => Err(CoupError::InvalidPhase(phase)),
        }
    }

    pub(crate) fn reply_challenge_of_block<R: Rng>(
        &mut self,
        table: &mut Table<'_, R>,
        by: &str,
        challenges: bool,
    ) -> Result<Step, CoupError> {
        let phase = self.phase.kind();
        let Phase::AwaitingChallengeOfBlock { blocker, card, gate } = &mut self.phase else {
            return Err(CoupError::InvalidPhase(phase));
        };
        let (blocker, card) = (blocker.clone(), *card);
        let action = self.action.clone().ok_or(CoupError::InvalidPhase(phase))?;

        if !challenges {
            if !gate.record(by, &table.alive()) {
                return Ok(Step::Continue);
            }

            self.challenge_block = Verdict::Accepted;
            self.record(table, Event::BlockStands);
            self.set_phase(Phase::Complete);
            return Ok(Step::Advance);
        }

        if by == blocker {
            return Err(CoupError::OutOfTurn(format!("{by} cannot challenge their own block")));
        }
        self.challenge_block = Verdict::Challenged { by: by.to_string() };

        if table.player(&blocker)?.holds(card) {
            table.replace_card(&blocker, card)?;
            self.record(table, Event::BlockProven {
                challenger: by.to_string(),
                blocker,
                card,
            });
            return self.lose_life(table, by, AfterLoss::CompletionAck);
        }

        self.record(table, Event::BlockExposed {
            challenger: by.to_string(),
            blocker: blocker.clone(),
            card,
        });

        if action.kind == ActionKind::Assassinate {
            // one life for the failed block, one for the assassination
            table.player_mut(&action.actor)?.pay(ASSASSINATE_COST)?;
            let lost = table.player(&blocker)?.held.clone();
            table.player_mut(&blocker)?.eliminate();
            for card in lost {
                self.record(table, Event::LifeLost {
                    player: blocker.clone(),
                    card,
                });
            }
            self.record(table, Event::Eliminated { player: blocker });
            self.enter_completion();
            Ok(Step::Continue)
        } else {
            self.lose_life(table, &blocker, AfterLoss::ApplyEffect)
        }
    }

    pub(crate) fn resolve_life_loss<R: Rng>(
        &mut self,
        table: &mut Table<'_, R>,
        by: &str,
        card: Role,
    ) -> Result<Step, CoupError> {
        let Phase::ResolvingLifeLoss { who, then } = &self.phase else {
            return Err(CoupError::NoPendingLifeLoss);
        };
        if by != who.as_str() {
            return Err(CoupError::OutOfTurn(format!("{who} is the one losing an influence")));
        }
        let then = *then;

        let player = table.player_mut(by)?;
        player.lose_card(card)?;
        let eliminated = !player.is_alive();

        self.record(table, Event::LifeLost {
            player: by.to_string(),
            card,
        });
        if eliminated {
            self.record(table, Event::Eliminated { player: by.to_string() });
        }
        self.after_loss(table, then)
    }

    pub(crate) fn apply_effect<R: Rng>(&mut self, table: &mut Table<'_, R>) -> Result<Step, CoupError> {
        self.expect_phase(PhaseKind::ApplyingEffect)?;
        let action = self.current_action()?;

        let amount = match action.kind {
            ActionKind::Income => 1,
            ActionKind::ForeignAid => 2,
            ActionKind::Taxes => 3,
            ActionKind::Steal => {
                let target = table.player_mut(action.target())?;
                let amount = target.money.min(2);
                target.money -= amount;
                amount
            }
            ActionKind::Ambassador => {
                let drawn = vec![table.deck.draw(&mut *table.rng)?, table.deck.draw(&mut *table.rng)?];
                self.record(table, Event::ExchangeStarted {
                    player: action.actor.clone(),
                });
                self.set_phase(Phase::AwaitingCompletionAck {
                    gate: ConsensusGate::new(),
                    exchange: Some(drawn),
                });
                return Ok(Step::Continue);
            }
            ActionKind::Coup | ActionKind::Assassinate => {
                return Err(CoupError::InvalidPhase(self.phase.kind()));
            }
        };

        table.player_mut(&action.actor)?.earn(amount);
        self.record(table, Event::EffectApplied { action, amount });
        self.enter_completion();
        Ok(Step::Continue)
    }

    pub(crate) fn select_exchange<R: Rng>(
        &mut self,
        table: &mut Table<'_, R>,
        by: &str,
        keep: Vec<Role>,
    ) -> Result<Step, CoupError> {
        let action = self.current_action()?;
        let drawn = match &self.phase {
            Phase::AwaitingCompletionAck { exchange: Some(drawn), .. } => drawn.clone(),
            _ => return Err(CoupError::InvalidPhase(self.phase.kind())),
        };
        if action.kind != ActionKind::Ambassador || by != action.actor {
            return Err(CoupError::OutOfTurn(format!("only {} is exchanging cards", action.actor)));
        }

        let held = table.player(by)?.held.clone();
        if keep.len() != held.len() {
            return Err(CoupError::InvalidSelection(format!(
                "keep exactly {} card(s), got {}",
                held.len(),
                keep.len()
            )));
        }

        let mut rest: Vec<Role> = held.into_iter().chain(drawn).collect();
        for card in &keep {
            let idx = rest
                .iter()
                .position(|c| c == card)
                .ok_or_else(|| CoupError::InvalidSelection(format!("{card} is not in the exchange pool")))?;
            rest.remove(idx);
        }

        if let Phase::AwaitingCompletionAck { exchange, .. } = &mut self.phase {
            *exchange = None;
        }
        table.player_mut(by)?.held = keep;
        for card in rest {
            table.deck.return_card(card);
        }
        self.record(table, Event::ExchangeCompleted { player: by.to_string() });
        Ok(Step::Continue)
    }

    pub(crate) fn acknowledge<R: Rng>(&mut self, table: &mut Table<'_, R>, by: &str) -> Result<Step, CoupError> {
        let phase = self.phase.kind();
        let Phase::AwaitingCompletionAck { gate, exchange } = &mut self.phase else {
            return Err(CoupError::InvalidPhase(phase));
        };
        let actor = self.action.as_ref().map(|action| action.actor.as_str());

        if exchange.is_some() && actor == Some(by) {
            return Err(CoupError::ExchangePending(by.to_string()));
        }
        if !gate.record(by, &table.alive()) {
            return Ok(Step::Continue);
        }

        self.set_phase(Phase::Complete);
        Ok(Step::Advance)
    }

    /// Takes one influence from `who`. A player down to their last card has
    /// no choice to make, so it is revealed straight away.
    fn lose_life<R: Rng>(&mut self, table: &mut Table<'_, R>, who: &str, then: AfterLoss) -> Result<Step, CoupError> {
        let player = table.player_mut(who)?;
        match player.held.len() {
            0 => self.after_loss(table, then),
            1 => {
                let card = player.held[0];
                player.lose_card(card)?;
                self.record(table, Event::LifeLost {
                    player: who.to_string(),
                    card,
                });
                self.record(table, Event::Eliminated { player: who.to_string() });
                self.after_loss(table, then)
            }
            _ => {
                self.set_phase(Phase::ResolvingLifeLoss {
                    who: who.to_string(),
                    then,
                });
                Ok(Step::Continue)
            }
        }
    }

    fn after_loss<R: Rng>(&mut self, table: &mut Table<'_, R>, then: AfterLoss) -> Result<Step, CoupError> {
        match then {
            AfterLoss::Block => self.enter_block(table),
            AfterLoss::ApplyEffect => {
                self.set_phase(Phase::ApplyingEffect);
                Ok(Step::Continue)
            }
            AfterLoss::CompletionAck => {
                self.enter_completion();
                Ok(Step::Continue)
            }
        }
    }

    fn enter_block<R: Rng>(&mut self, table: &mut Table<'_, R>) -> Result<Step, CoupError> {
        let action = self.current_action()?;

        // the target may have just lost their last card challenging the claim
        if !table.is_alive(action.target()) {
            self.record(table, Event::Fizzled { action });
            self.enter_completion();
            return Ok(Step::Continue);
        }

        self.set_phase(Phase::AwaitingBlock {
            gate: ConsensusGate::with(&action.actor),
        });
        Ok(Step::Continue)
    }

    fn enter_completion(&mut self) {
        self.set_phase(Phase::AwaitingCompletionAck {
            gate: ConsensusGate::new(),
            exchange: None,
        });
    }
}
