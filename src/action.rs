use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoupError;
use crate::role::Role;

pub const COUP_COST: u8 = 7;
pub const ASSASSINATE_COST: u8 = 3;
pub const FORCED_COUP_MONEY: u8 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Coup,
    Income,
    ForeignAid,
    Taxes,
    Steal,
    Assassinate,
    Ambassador,
}

pub static ACTION_KINDS: [ActionKind; 7] = [
    ActionKind::Coup,
    ActionKind::Income,
    ActionKind::ForeignAid,
    ActionKind::Taxes,
    ActionKind::Steal,
    ActionKind::Assassinate,
    ActionKind::Ambassador,
];

impl ActionKind {
    /// The role the actor implicitly claims, if the action can be challenged.
    pub fn claimed_role(self) -> Option<Role> {
        match self {
            ActionKind::Taxes => Some(Role::Duke),
            ActionKind::Steal => Some(Role::Captain),
            ActionKind::Assassinate => Some(Role::Assassin),
            ActionKind::Ambassador => Some(Role::Ambassador),
            ActionKind::Coup | ActionKind::Income | ActionKind::ForeignAid => None,
        }
    }

    pub fn blocking_roles(self) -> &'static [Role] {
        match self {
            ActionKind::ForeignAid => &[Role::Duke],
            ActionKind::Steal => &[Role::Captain, Role::Ambassador],
            ActionKind::Assassinate => &[Role::Contessa],
            _ => &[],
        }
    }

    pub fn needs_target(self) -> bool {
        matches!(self, ActionKind::Coup | ActionKind::Steal | ActionKind::Assassinate)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Coup => "coup",
            ActionKind::Income => "income",
            ActionKind::ForeignAid => "foreign aid",
            ActionKind::Taxes => "taxes",
            ActionKind::Steal => "steal",
            ActionKind::Assassinate => "assassinate",
            ActionKind::Ambassador => "ambassador",
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = CoupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        ACTION_KINDS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| CoupError::UnknownActionKind(s.to_string()))
    }
}

/// The action declared at the start of a turn.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub actor: String,
    pub target: Option<String>,
}

impl Action {
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or_default()
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let actor = &self.actor;
        let target = self.target();
        match self.kind {
            ActionKind::Coup => write!(f, "{actor} coups {target}"),
            ActionKind::Income => write!(f, "{actor} takes income"),
            ActionKind::ForeignAid => write!(f, "{actor} wants to take foreign aid"),
            ActionKind::Taxes => write!(f, "{actor} wants to take taxes as a Duke"),
            ActionKind::Steal => write!(f, "{actor} wants to steal from {target} as a Captain"),
            ActionKind::Assassinate => write!(f, "{actor} wants to assassinate {target} as an Assassin"),
            ActionKind::Ambassador => write!(f, "{actor} wants to exchange cards as an Ambassador"),
        }
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// One move submitted by a player against the current turn.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Declare { kind: ActionKind, target: Option<String> },
    ReplyChallenge { challenges: bool },
    ReplyBlock { blocks: bool, card: Option<Role> },
    ReplyChallengeOfBlock { challenges: bool },
    LoseInfluence { card: Role },
    ApplyEffect,
    SelectExchange { keep: Vec<Role> },
    Acknowledge,
}

impl Intent {
    pub fn declare(kind: ActionKind, target: Option<&str>) -> Self {
        Intent::Declare {
            kind,
            target: target.map(str::to_string),
        }
    }
}

impl Debug for Intent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Declare { kind, target: Some(target) } => {
                f.write_fmt(format_args!("declares {kind} on {target}"))
            }
            Intent::Declare { kind, target: None } => {
                f.write_fmt(format_args!("declares {kind}"))
            }
            Intent::ReplyChallenge { challenges } => {
                f.write_fmt(format_args!("{} the action", if *challenges { "challenges" } else { "passes on" }))
            }
            Intent::ReplyBlock { blocks: true, card } => {
                f.write_fmt(format_args!("blocks with {:?}", card))
            }
            Intent::ReplyBlock { blocks: false, .. } => {
                f.write_str("lets the action through")
            }
            Intent::ReplyChallengeOfBlock { challenges } => {
                f.write_fmt(format_args!("{} the block", if *challenges { "challenges" } else { "accepts" }))
            }
            Intent::LoseInfluence { card } => {
                f.write_fmt(format_args!("loses {card}"))
            }
            Intent::ApplyEffect => {
                f.write_str("resolves the action")
            }
            Intent::SelectExchange { keep } => {
                f.write_fmt(format_args!("keeps {:?}", keep))
            }
            Intent::Acknowledge => {
                f.write_str("acknowledges the outcome")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_action_kinds() {
        assert_eq!("foreign aid".parse::<ActionKind>().unwrap(), ActionKind::ForeignAid);
        assert_eq!("foreign_aid".parse::<ActionKind>().unwrap(), ActionKind::ForeignAid);
        assert_eq!("Taxes".parse::<ActionKind>().unwrap(), ActionKind::Taxes);
        assert!(matches!("embezzle".parse::<ActionKind>(), Err(CoupError::UnknownActionKind(s)) if s == "embezzle"));
    }

    #[test]
    fn claims_and_blocks() {
        assert_eq!(ActionKind::Income.claimed_role(), None);
        assert_eq!(ActionKind::Steal.claimed_role(), Some(Role::Captain));
        assert!(ActionKind::Taxes.blocking_roles().is_empty());
        assert_eq!(ActionKind::Steal.blocking_roles(), &[Role::Captain, Role::Ambassador]);
    }

    #[test]
    fn intents_serialize_tagged() {
        let json = serde_json::to_string(&Intent::ReplyBlock { blocks: true, card: Some(Role::Duke) }).unwrap();
        assert_eq!(json, r#"{"intent":"reply_block","blocks":true,"card":"Duke"}"#);

        let intent: Intent = serde_json::from_str(r#"{"intent":"declare","kind":"foreign_aid","target":null}"#).unwrap();
        assert_eq!(intent, Intent::declare(ActionKind::ForeignAid, None));
    }
}
