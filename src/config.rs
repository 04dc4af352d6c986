use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoupError;
use crate::role::{Role, ROLE_VARIANTS};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_count: usize,
    pub roles: Vec<Role>,
    pub copies_per_role: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: MIN_PLAYERS,
            roles: ROLE_VARIANTS.to_vec(),
            copies_per_role: 3,
        }
    }
}

impl GameConfig {
    pub fn with_players(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoupError> {
        let config: GameConfig = serde_json::from_str(json).map_err(|err| CoupError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(CoupError::InvalidConfig(format!(
                "player_count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.player_count
            )));
        }

        let unique: BTreeSet<Role> = self.roles.iter().copied().collect();
        if unique.is_empty() || unique.len() != self.roles.len() {
            return Err(CoupError::InvalidConfig("roles must be non-empty and unique".to_string()));
        }

        // two cards per hand plus two for an ambassador exchange
        let needed = 2 * self.player_count + 2;
        let total = self.roles.len() * self.copies_per_role;
        if total < needed {
            return Err(CoupError::InvalidConfig(format!(
                "a deck of {total} cards is too small for {} players, needs {needed}",
                self.player_count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.roles.len() * config.copies_per_role, 15);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = GameConfig::from_json(r#"{"player_count": 5}"#).unwrap();
        assert_eq!(config.player_count, 5);
        assert_eq!(config.copies_per_role, 3);
        assert_eq!(config.roles, ROLE_VARIANTS.to_vec());
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(matches!(GameConfig::with_players(1).validate(), Err(CoupError::InvalidConfig(_))));
        assert!(matches!(GameConfig::with_players(7).validate(), Err(CoupError::InvalidConfig(_))));

        let config = GameConfig {
            roles: vec![Role::Duke, Role::Duke],
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            player_count: 6,
            copies_per_role: 2,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(matches!(GameConfig::from_json("{"), Err(CoupError::InvalidConfig(_))));
    }
}
