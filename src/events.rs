//! Narration of what happens during a turn.
//!
//! Every transition emits typed [`Event`]s. Their `Display` output is the
//! human-readable line appended to the turn log; an [`EventSink`] receives
//! them once the transition has been committed.

use std::fmt::{Display, Formatter};
use std::io::Write;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::role::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    ActionDeclared { action: Action },
    ActionUnchallenged,
    ClaimProven { challenger: String, actor: String, role: Role },
    ClaimExposed { challenger: String, actor: String, role: Role },
    Blocked { blocker: String, card: Role },
    NotBlocked,
    BlockStands,
    BlockProven { challenger: String, blocker: String, card: Role },
    BlockExposed { challenger: String, blocker: String, card: Role },
    LifeLost { player: String, card: Role },
    Eliminated { player: String },
    EffectApplied { action: Action, amount: u8 },
    Fizzled { action: Action },
    ExchangeStarted { player: String },
    ExchangeCompleted { player: String },
    TurnAdvanced { turn_number: i64, player: String },
    GameWon { player: String },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ActionDeclared { .. } => "action_declared",
            Event::ActionUnchallenged => "action_unchallenged",
            Event::ClaimProven { .. } => "claim_proven",
            Event::ClaimExposed { .. } => "claim_exposed",
            Event::Blocked { .. } => "blocked",
            Event::NotBlocked => "not_blocked",
            Event::BlockStands => "block_stands",
            Event::BlockProven { .. } => "block_proven",
            Event::BlockExposed { .. } => "block_exposed",
            Event::LifeLost { .. } => "life_lost",
            Event::Eliminated { .. } => "eliminated",
            Event::EffectApplied { .. } => "effect_applied",
            Event::Fizzled { .. } => "fizzled",
            Event::ExchangeStarted { .. } => "exchange_started",
            Event::ExchangeCompleted { .. } => "exchange_completed",
            Event::TurnAdvanced { .. } => "turn_advanced",
            Event::GameWon { .. } => "game_won",
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::ActionDeclared { action } => write!(f, "{action}."),
            Event::ActionUnchallenged => f.write_str("Action is not challenged."),
            Event::ClaimProven { challenger, actor, role } => write!(
                f,
                "{challenger} challenged, but {actor} has the {role}. {actor} gets a new card and {challenger} loses a life."
            ),
            Event::ClaimExposed { challenger, actor, role } => write!(
                f,
                "{challenger} challenged and {actor} does not have the {role}. The action is denied and {actor} loses an influence."
            ),
            Event::Blocked { blocker, card } => write!(f, "{blocker} blocks using {card}."),
            Event::NotBlocked => f.write_str("Action is not blocked."),
            Event::BlockStands => f.write_str("The block is not challenged. The original action is blocked."),
            Event::BlockProven { challenger, blocker, card } => write!(
                f,
                "{challenger} challenged the block, but {blocker} has the {card}. The original action is blocked."
            ),
            Event::BlockExposed { challenger, blocker, card } => write!(
                f,
                "{challenger} challenged the block and {blocker} does not have the {card}. {blocker} loses an influence."
            ),
            Event::LifeLost { player, card } => write!(f, "{player} loses the influence {card}."),
            Event::Eliminated { player } => write!(f, "{player} has no influence left."),
            Event::EffectApplied { action, amount } => match action.kind {
                crate::action::ActionKind::Steal => {
                    write!(f, "{} steals ${amount} from {}.", action.actor, action.target())
                }
                _ => write!(f, "{} gets ${amount}.", action.actor),
            },
            Event::Fizzled { action } => write!(f, "{} has no effect, {} is out.", action.kind, action.target()),
            Event::ExchangeStarted { player } => write!(f, "{player} exchanges cards and is choosing which to keep."),
            Event::ExchangeCompleted { player } => write!(f, "{player} finished exchanging cards."),
            Event::TurnAdvanced { turn_number, player } => write!(f, "Turn {turn_number}: {player} to act."),
            Event::GameWon { player } => write!(f, "{player} wins the game."),
        }
    }
}

/// Receives committed narration, e.g. to push updates to connected clients.
pub trait EventSink: Send + Sync {
    fn emit(&self, game_id: &str, turn_number: i64, event: &Event);
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&self, game_id: &str, turn_number: i64, event: &Event) {
        (**self).emit(game_id, turn_number, event)
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn emit(&self, game_id: &str, turn_number: i64, event: &Event) {
        (**self).emit(game_id, turn_number, event)
    }
}

pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _game_id: &str, _turn_number: i64, _event: &Event) {}
}

#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<(String, Event)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything emitted for `game_id` so far.
    pub fn drain(&self, game_id: &str) -> Vec<Event> {
        let mut events = self.events.lock();
        let (taken, kept) = events.drain(..).partition(|(id, _)| id == game_id);
        *events = kept;
        taken.into_iter().map(|(_, event)| event).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, game_id: &str, _turn_number: i64, event: &Event) {
        self.events.lock().push((game_id.to_string(), event.clone()));
    }
}

#[derive(Serialize)]
struct NarrationRow<'a> {
    game_id: &'a str,
    turn_number: i64,
    kind: &'static str,
    narration: String,
}

/// Writes one csv row per event.
pub struct CsvSink<W: Write + Send> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(inner)),
        }
    }

    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))
    }
}

impl<W: Write + Send> EventSink for CsvSink<W> {
    fn emit(&self, game_id: &str, turn_number: i64, event: &Event) {
        let row = NarrationRow {
            game_id,
            turn_number,
            kind: event.kind(),
            narration: event.to_string(),
        };

        let mut writer = self.writer.lock();
        if let Err(err) = writer.serialize(row).and_then(|_| writer.flush().map_err(csv::Error::from)) {
            tracing::warn!(game_id, error = %err, "failed to write narration row");
        }
    }
}
