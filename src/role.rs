use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoupError;

/// An influence card. Each role enables one claimable action or block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Duke,
    Assassin,
    Contessa,
    Captain,
    Ambassador,
}

pub static ROLE_VARIANTS: [Role; 5] = [
    Role::Duke,
    Role::Assassin,
    Role::Contessa,
    Role::Captain,
    Role::Ambassador,
];

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Duke => "Duke",
            Role::Assassin => "Assassin",
            Role::Contessa => "Contessa",
            Role::Captain => "Captain",
            Role::Ambassador => "Ambassador",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = CoupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROLE_VARIANTS
            .iter()
            .copied()
            .find(|role| role.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoupError::InvalidSelection(format!("\"{s}\" is not a role")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("contessa".parse::<Role>().unwrap(), Role::Contessa);
        assert_eq!(" DUKE ".parse::<Role>().unwrap(), Role::Duke);
        assert!("jester".parse::<Role>().is_err());
    }
}
