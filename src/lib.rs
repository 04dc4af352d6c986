//! A rules engine for the card game Coup.
//!
//! A [`Game`] is driven entirely by [`Intent`]s submitted on behalf of its
//! players. Each accepted intent yields a new game value plus the narrated
//! [`Event`]s it produced; a rejected intent leaves the game as it was.
//! [`GameService`] adds storage and per-game serialization on top.

pub mod action;
pub mod ai;
pub mod config;
pub mod deck;
pub mod error;
pub mod events;
pub mod game;
pub mod gate;
pub mod graph;
pub mod legal;
pub mod player;
pub mod role;
pub mod service;
pub mod store;
pub mod turn;
pub mod view;

pub use action::{Action, ActionKind, Intent};
pub use config::GameConfig;
pub use error::CoupError;
pub use events::{Event, EventSink};
pub use game::{Game, Transition};
pub use role::Role;
pub use service::GameService;
pub use store::{MemoryStore, Store};
pub use turn::{Phase, PhaseKind, Turn};
pub use view::{GameView, PlayerView};
