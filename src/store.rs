use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::CoupError;
use crate::game::Game;

/// An opaque keyed record store. A `get` must observe the latest `put` for
/// the same key.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.records.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        self.records.write().insert(key.to_string(), value);
    }
}

impl<T: Store + ?Sized> Store for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: String) {
        (**self).put(key, value)
    }
}

impl Game {
    pub fn load<S: Store + ?Sized>(store: &S, id: &str) -> Result<Game, CoupError> {
        let record = store.get(id).ok_or_else(|| CoupError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(&record)?)
    }

    pub fn save<S: Store + ?Sized>(&self, store: &S) -> Result<(), CoupError> {
        store.put(&self.id, serde_json::to_string(self)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::action::{ActionKind, Intent};
    use crate::game::tests::{new_game, rig, try_intent};
    use crate::role::Role::{Assassin, Captain, Contessa, Duke};

    #[test]
    fn round_trips_mid_turn() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut game = new_game(&["a", "b", "c"], &mut rng);
        rig(&mut game, &[("a", &[Duke, Captain]), ("b", &[Contessa, Contessa]), ("c", &[Assassin, Assassin])]);
        let game = try_intent(game, "a", Intent::declare(ActionKind::ForeignAid, None), &mut rng);
        let game = try_intent(game, "b", Intent::ReplyBlock { blocks: true, card: None }, &mut rng);

        let store = MemoryStore::new();
        game.save(&store).unwrap();
        assert_eq!(store.len(), 1);

        let loaded = Game::load(&store, &game.id).unwrap();
        assert_eq!(loaded, game);

        // the reloaded game picks up exactly where it left off
        let loaded = try_intent(loaded, "a", Intent::ReplyChallengeOfBlock { challenges: true }, &mut rng);
        assert_eq!(loaded.players[1].held.len(), 2);
    }

    #[test]
    fn missing_and_corrupt_records() {
        let store = MemoryStore::new();
        assert!(matches!(Game::load(&store, "nope"), Err(CoupError::NotFound(_))));

        store.put("bad", "{\"id\": 3}".to_string());
        assert!(matches!(Game::load(&store, "bad"), Err(CoupError::Corrupt(_))));
    }
}
