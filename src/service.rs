//! Serialized access to stored games.
//!
//! Every call against a game runs under that game's lock as one
//! load, apply, save step. Events reach the sink only after the save.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info, warn};

use crate::action::Intent;
use crate::config::GameConfig;
use crate::error::CoupError;
use crate::events::EventSink;
use crate::game::Game;
use crate::store::Store;
use crate::view::GameView;

pub struct GameService<S: Store, K: EventSink> {
    store: S,
    sink: K,
    rng: Mutex<Pcg64>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: Store, K: EventSink> GameService<S, K> {
    /// With a seed, every game created and played through this service is reproducible.
    pub fn new(store: S, sink: K, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };

        Self {
            store,
            sink,
            rng: Mutex::new(rng),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn create(&self, config: &GameConfig) -> Result<String, CoupError> {
        let game = Game::create(config)?;
        game.save(&self.store)?;
        info!(game_id = %game.id, player_count = config.player_count, "game created");
        Ok(game.id)
    }

    pub fn join(&self, id: &str, name: &str) -> Result<GameView, CoupError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();

        let mut game = Game::load(&self.store, id)?;
        let mut rng = self.fork_rng();
        if let Err(err) = game.add_player(name, &mut rng) {
            warn!(game_id = id, player = name, error = %err, "join rejected");
            return Err(err);
        }
        game.save(&self.store)?;

        info!(game_id = id, player = name, "player joined");
        if game.is_started() {
            info!(game_id = id, current_player = ?game.current_player, "game started");
        }
        Ok(game.view_for(name))
    }

    pub fn submit(&self, id: &str, by: &str, intent: Intent) -> Result<GameView, CoupError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();

        let game = Game::load(&self.store, id)?;
        let phase = game.turn.phase_kind();
        debug!(game_id = id, player = by, ?phase, ?intent, "applying intent");

        let mut rng = self.fork_rng();
        let transition = match game.apply(by, intent, &mut rng) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(game_id = id, player = by, ?phase, error = %err, "intent rejected");
                return Err(err);
            }
        };

        let game = transition.game;
        game.save(&self.store)?;
        info!(
            game_id = id,
            player = by,
            turn_number = game.turn_number,
            phase = ?game.turn.phase_kind(),
            events = transition.events.len(),
            "intent committed"
        );

        for event in &transition.events {
            self.sink.emit(id, game.turn_number, event);
        }
        if let Some(winner) = &game.winner {
            info!(game_id = id, winner = %winner, turns = game.turn_number, "game over");
            // a finished game rejects every intent, it no longer needs serializing
            self.locks.lock().remove(id);
        }

        Ok(game.view_for(by))
    }

    pub fn view(&self, id: &str, viewer: &str) -> Result<GameView, CoupError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        Ok(Game::load(&self.store, id)?.view_for(viewer))
    }

    /// The full stored game, hidden cards included.
    pub fn load(&self, id: &str) -> Result<Game, CoupError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        Game::load(&self.store, id)
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        self.locks.lock().entry(id.to_string()).or_default().clone()
    }

    // each call gets its own generator so the shared one is only held briefly
    fn fork_rng(&self) -> Pcg64 {
        Pcg64::seed_from_u64(self.rng.lock().gen())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::action::ActionKind;
    use crate::events::{Event, MemorySink};
    use crate::game::tests::{deal, new_game};
    use crate::role::Role::{Captain, Contessa, Duke};
    use crate::store::MemoryStore;
    use crate::turn::PhaseKind;

    fn service() -> GameService<MemoryStore, MemorySink> {
        GameService::new(MemoryStore::new(), MemorySink::new(), Some(7))
    }

    fn started(service: &GameService<MemoryStore, MemorySink>, names: &[&str]) -> String {
        let id = service.create(&GameConfig::with_players(names.len())).unwrap();
        for name in names {
            service.join(&id, name).unwrap();
        }
        id
    }

    #[test]
    fn create_join_and_play() {
        let service = service();
        let id = service.create(&GameConfig::default()).unwrap();

        let view = service.join(&id, "a").unwrap();
        assert_eq!(view.turn_number, -1);
        assert_eq!(view.held.len(), 2);
        assert!(matches!(
            service.submit(&id, "a", Intent::declare(ActionKind::Income, None)),
            Err(CoupError::GameNotStarted)
        ));

        let view = service.join(&id, "b").unwrap();
        assert_eq!(view.turn_number, 0);
        assert!(matches!(service.join(&id, "c"), Err(CoupError::GameFull)));

        let view = service.submit(&id, "a", Intent::declare(ActionKind::Income, None)).unwrap();
        assert_eq!(view.players[0].money, 3);
        assert_eq!(view.phase, PhaseKind::AwaitingCompletionAck);

        service.submit(&id, "a", Intent::Acknowledge).unwrap();
        let view = service.submit(&id, "b", Intent::Acknowledge).unwrap();
        assert_eq!(view.current_player.as_deref(), Some("b"));

        let events = service.sink().drain(&id);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], Event::TurnAdvanced { turn_number: 1, .. }));
    }

    #[test]
    fn rejected_intents_are_not_saved() {
        let service = service();
        let id = started(&service, &["a", "b"]);
        let before = service.load(&id).unwrap();

        assert!(matches!(
            service.submit(&id, "b", Intent::declare(ActionKind::Income, None)),
            Err(CoupError::OutOfTurn(_))
        ));
        assert_eq!(service.load(&id).unwrap(), before);
        assert!(service.sink().is_empty());
    }

    #[test]
    fn unknown_game() {
        let service = service();
        assert!(matches!(service.view("missing", "a"), Err(CoupError::NotFound(_))));
        assert!(matches!(service.join("missing", "a"), Err(CoupError::NotFound(_))));
    }

    #[test]
    fn concurrent_acknowledgements_advance_once() {
        let service = service();
        let names = ["a", "b", "c", "d", "e", "f"];
        let id = started(&service, &names);
        service.submit(&id, "a", Intent::declare(ActionKind::Income, None)).unwrap();

        thread::scope(|scope| {
            for name in names {
                let service = &service;
                let id = &id;
                scope.spawn(move || {
                    service.submit(id, name, Intent::Acknowledge).unwrap();
                });
            }
        });

        let game = service.load(&id).unwrap();
        assert_eq!(game.turn_number, 1);
        assert_eq!(game.current_player.as_deref(), Some("b"));
    }

    #[test]
    fn games_are_independent() {
        let service = service();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let id = started(&service, &["a", "b", "c"]);
                    service.submit(&id, "a", Intent::declare(ActionKind::Income, None)).unwrap();
                });
            }
        });

        assert_eq!(service.store().len(), 4);
    }

    #[test]
    fn finished_games_release_their_lock() {
        let service = service();
        let mut rng = Pcg64::seed_from_u64(5);
        let mut game = new_game(&["a", "b"], &mut rng);
        deal(&mut game, "a", &[Duke, Captain]);
        deal(&mut game, "b", &[Contessa]);
        game.players[1].lost.push(game.deck.take(Contessa).unwrap());
        game.players[0].money = 7;
        game.save(service.store()).unwrap();

        service.view(&game.id, "a").unwrap();
        assert!(service.locks.lock().contains_key(&game.id));

        let view = service.submit(&game.id, "a", Intent::declare(ActionKind::Coup, Some("b"))).unwrap();
        assert_eq!(view.winner.as_deref(), Some("a"));
        assert!(service.locks.lock().is_empty());

        // later calls still see the stored result
        assert!(matches!(
            service.submit(&game.id, "a", Intent::Acknowledge),
            Err(CoupError::InvalidPhase(PhaseKind::Complete))
        ));
        assert_eq!(service.view(&game.id, "b").unwrap().winner.as_deref(), Some("a"));
    }
}
