// automated players

use rand::Rng;

use crate::action::Intent;
use crate::error::CoupError;
use crate::events::Event;
use crate::game::Game;

/// Picks the next move for whichever player should make one. The engine
/// accepts the result like any other submitted intent.
pub trait Agent {
    fn choose(&mut self, game: &Game) -> Option<(String, Intent)>;
}

/// Chooses uniformly among every legal (player, intent) pair.
pub struct RandomAgent<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomAgent<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Agent for RandomAgent<R> {
    fn choose(&mut self, game: &Game) -> Option<(String, Intent)> {
        let mut moves = game.legal_moves();
        if moves.is_empty() {
            return None;
        }

        let random_index = self.rng.gen_range(0..moves.len());
        Some(moves.swap_remove(random_index))
    }
}

pub struct Simulation {
    pub game: Game,
    pub events: Vec<Event>,
    pub steps: usize,
}

/// Plays `game` with `agent` until someone wins, nobody can move, or
/// `max_steps` intents have been applied.
pub fn simulate<A: Agent, R: Rng>(mut game: Game, agent: &mut A, rng: &mut R, max_steps: usize) -> Result<Simulation, CoupError> {
    let mut events = Vec::new();
    let mut steps = 0;

    while steps < max_steps && !game.is_over() {
        let Some((by, intent)) = agent.choose(&game) else {
            break;
        };

        let transition = game.apply(&by, intent, rng)?;
        game = transition.game;
        events.extend(transition.events);
        steps += 1;
    }

    Ok(Simulation { game, events, steps })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::game::tests::new_game;

    #[test]
    fn complete_game() {
        for num_players in 2..=6usize {
            let mut rng = Pcg64::seed_from_u64(num_players as u64);
            let names: Vec<String> = (0..num_players).map(|n| format!("p{n}")).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let game = new_game(&names, &mut rng);
            let total = game.card_count();

            let mut agent = RandomAgent::new(Pcg64::seed_from_u64(100 + num_players as u64));
            let simulation = simulate(game, &mut agent, &mut rng, 20_000).unwrap();

            let game = simulation.game;
            assert!(game.winner.is_some(), "{num_players} player game did not finish");
            assert_eq!(game.alive_players().count(), 1);
            assert_eq!(game.card_count(), total);
            assert!(matches!(simulation.events.last(), Some(Event::GameWon { .. })));
        }
    }

    #[test]
    fn stops_at_max_steps() {
        let mut rng = Pcg64::seed_from_u64(1);
        let game = new_game(&["a", "b", "c"], &mut rng);
        let mut agent = RandomAgent::new(Pcg64::seed_from_u64(2));

        let simulation = simulate(game, &mut agent, &mut rng, 3).unwrap();
        assert_eq!(simulation.steps, 3);
    }
}
