//! The phase transition graph of a turn.
//!
//! Every phase change the turn makes is checked against [`TRANSITIONS`] in
//! debug builds. The only exception is a game ending mid-turn, which jumps
//! straight to `Complete` from wherever the last elimination happened.

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::turn::{PhaseKind, PHASE_KINDS};

use PhaseKind::*;

pub static TRANSITIONS: [(PhaseKind, PhaseKind); 22] = [
    // income, coup, foreign aid, character actions
    (AwaitingAction, AwaitingCompletionAck),
    (AwaitingAction, ResolvingLifeLoss),
    (AwaitingAction, AwaitingBlock),
    (AwaitingAction, AwaitingChallengeOfAction),
    (AwaitingChallengeOfAction, AwaitingBlock),
    (AwaitingChallengeOfAction, ApplyingEffect),
    (AwaitingChallengeOfAction, ResolvingLifeLoss),
    (AwaitingChallengeOfAction, AwaitingCompletionAck),
    (AwaitingBlock, AwaitingChallengeOfBlock),
    (AwaitingBlock, ApplyingEffect),
    (AwaitingBlock, ResolvingLifeLoss),
    (AwaitingBlock, AwaitingCompletionAck),
    // the block stands and the turn ends without acknowledgement
    (AwaitingChallengeOfBlock, Complete),
    (AwaitingChallengeOfBlock, ResolvingLifeLoss),
    (AwaitingChallengeOfBlock, ApplyingEffect),
    (AwaitingChallengeOfBlock, AwaitingCompletionAck),
    (ResolvingLifeLoss, AwaitingBlock),
    (ResolvingLifeLoss, ApplyingEffect),
    (ResolvingLifeLoss, AwaitingCompletionAck),
    (ApplyingEffect, AwaitingCompletionAck),
    (AwaitingCompletionAck, Complete),
    (Complete, AwaitingAction),
];

pub fn allows(from: PhaseKind, to: PhaseKind) -> bool {
    TRANSITIONS.contains(&(from, to))
}

pub fn phase_graph() -> DiGraph<PhaseKind, ()> {
    let mut graph = DiGraph::new();
    let nodes: Vec<NodeIndex> = PHASE_KINDS.iter().map(|&kind| graph.add_node(kind)).collect();

    for &(from, to) in TRANSITIONS.iter() {
        graph.add_edge(nodes[from as usize], nodes[to as usize], ());
    }

    graph
}

pub fn to_dot() -> String {
    format!("{:?}", Dot::with_config(&phase_graph(), &[Config::EdgeNoLabel]))
}

#[cfg(test)]
mod tests {
    use petgraph::algo::has_path_connecting;

    use super::*;

    #[test]
    fn every_phase_reaches_complete() {
        let graph = phase_graph();
        let complete = NodeIndex::new(Complete as usize);

        for kind in PHASE_KINDS {
            let node = NodeIndex::new(kind as usize);
            assert_eq!(graph[node], kind);
            assert!(has_path_connecting(&graph, node, complete, None), "{:?} cannot complete", kind);
        }
    }

    #[test]
    fn complete_only_leads_to_a_fresh_turn() {
        let graph = phase_graph();
        let complete = NodeIndex::new(Complete as usize);
        let next: Vec<PhaseKind> = graph.neighbors(complete).map(|n| graph[n]).collect();
        assert_eq!(next, vec![AwaitingAction]);
    }

    #[test]
    fn dot_export_names_every_phase() {
        let dot = to_dot();
        for kind in PHASE_KINDS {
            assert!(dot.contains(&format!("{:?}", kind)));
        }
    }
}
