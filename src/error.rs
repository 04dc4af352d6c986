use thiserror::Error;

use crate::role::Role;
use crate::turn::PhaseKind;

#[derive(Debug, Error)]
pub enum CoupError {
    #[error("intent not accepted while the turn is {0:?}")]
    InvalidPhase(PhaseKind),

    #[error("unknown action kind \"{0}\"")]
    UnknownActionKind(String),

    #[error("{player} has ${money}, needs ${needed}")]
    InsufficientFunds { player: String, money: u8, needed: u8 },

    #[error("{player} does not hold {card:?}")]
    CardNotHeld { player: String, card: Role },

    #[error("invalid exchange selection: {0}")]
    InvalidSelection(String),

    #[error("unknown player \"{0}\"")]
    UnknownPlayer(String),

    #[error("no game with id \"{0}\"")]
    NotFound(String),

    #[error("nobody is waiting to lose an influence")]
    NoPendingLifeLoss,

    #[error("{0} must choose which cards to keep first")]
    ExchangePending(String),

    #[error("the game has not started yet")]
    GameNotStarted,

    #[error("the deck is empty")]
    EmptyDeck,

    #[error("{0} cannot act right now")]
    OutOfTurn(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("{card:?} cannot block {action}")]
    CannotBlock { action: String, card: Role },

    #[error("{0} has $10 or more and must coup")]
    MustCoup(String),

    #[error("the game already has all its players")]
    GameFull,

    #[error("a player named \"{0}\" already joined")]
    DuplicatePlayer(String),

    #[error("invalid game config: {0}")]
    InvalidConfig(String),

    #[error("stored game record is corrupt")]
    Corrupt(#[from] serde_json::Error),
}
