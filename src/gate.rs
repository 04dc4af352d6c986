//! A reusable "everyone still in the game has had their say" barrier.
//!
//! The alive set is passed on every call rather than captured at creation,
//! so a player eliminated while a gate is open is never waited on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusGate {
    acknowledgers: BTreeSet<String>,
}

impl ConsensusGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(name: &str) -> Self {
        let mut gate = Self::new();
        gate.acknowledgers.insert(name.to_string());
        gate
    }

    /// Records `name` if they are alive. Returns whether the gate is now satisfied.
    pub fn record<S: AsRef<str>>(&mut self, name: &str, alive: &[S]) -> bool {
        if alive.iter().any(|n| n.as_ref() == name) {
            self.acknowledgers.insert(name.to_string());
        }

        self.is_satisfied(alive)
    }

    pub fn is_satisfied<S: AsRef<str>>(&self, alive: &[S]) -> bool {
        alive.iter().all(|name| self.acknowledgers.contains(name.as_ref()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.acknowledgers.contains(name)
    }

    pub fn len(&self) -> usize {
        self.acknowledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acknowledgers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfied_once_everyone_alive_recorded() {
        let alive = ["a", "b", "c"];
        let mut gate = ConsensusGate::with("a");

        assert!(!gate.record("b", &alive));
        assert!(gate.record("c", &alive));
    }

    #[test]
    fn recording_twice_counts_once() {
        let alive = ["a", "b"];
        let mut gate = ConsensusGate::new();

        assert!(!gate.record("a", &alive));
        assert!(!gate.record("a", &alive));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn eliminated_players_are_ignored() {
        let mut gate = ConsensusGate::new();
        assert!(!gate.record("a", &["a", "b", "c"]));
        assert!(!gate.record("b", &["a", "b", "c"]));

        // c was eliminated before ever answering
        assert!(gate.is_satisfied(&["a", "b"]));

        // a dead player's reply is not recorded
        let mut gate = ConsensusGate::new();
        assert!(!gate.record("c", &["a", "b"]));
        assert!(gate.is_empty());
    }

    #[test]
    fn acknowledgers_only_grow() {
        let mut gate = ConsensusGate::new();
        let mut last = 0;
        for name in ["a", "b", "a", "c", "b"] {
            gate.record(name, &["a", "b", "c"]);
            assert!(gate.len() >= last);
            last = gate.len();
        }
        assert_eq!(last, 3);
    }
}
