use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use coup_engine::ai::{Agent, RandomAgent};
use coup_engine::events::{CsvSink, EventSink, NullSink};
use coup_engine::store::MemoryStore;
use coup_engine::{graph, GameConfig, GameService};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coup-sim")]
#[command(about = "Plays simulated games of Coup between random agents")]
struct Args {
    /// Number of players per game
    #[arg(short, long, default_value = "4")]
    players: usize,

    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Game config as JSON, overrides --players
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write narration rows to this csv file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Give up on a game after this many intents
    #[arg(long, default_value = "10000")]
    max_steps: usize,

    /// Print the turn phase graph in DOT format and exit
    #[arg(long)]
    dot: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.dot {
        println!("{}", graph::to_dot());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => GameConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => GameConfig::with_players(args.players),
    };
    config.validate()?;

    let sink: Box<dyn EventSink> = match &args.csv {
        Some(path) => Box::new(CsvSink::new(BufWriter::new(File::create(path)?))),
        None => Box::new(NullSink),
    };
    let service = GameService::new(MemoryStore::new(), sink, args.seed);
    let mut agent = RandomAgent::new(match args.seed {
        Some(seed) => Pcg64::seed_from_u64(seed.wrapping_add(1)),
        None => Pcg64::from_entropy(),
    });

    info!(games = args.games, players = config.player_count, seed = ?args.seed, "starting simulation");

    let mut wins: BTreeMap<String, u32> = BTreeMap::new();
    let mut unfinished = 0;
    let mut total_turns = 0;

    for game_num in 0..args.games {
        let id = service.create(&config)?;
        for seat in 0..config.player_count {
            service.join(&id, &format!("p{seat}"))?;
        }

        for _ in 0..args.max_steps {
            let game = service.load(&id)?;
            if game.is_over() {
                break;
            }
            let Some((by, intent)) = agent.choose(&game) else {
                break;
            };
            service.submit(&id, &by, intent)?;
        }

        let game = service.load(&id)?;
        match &game.winner {
            Some(winner) => {
                info!(game_num, game_id = %id, winner = %winner, turns = game.turn_number, "game finished");
                *wins.entry(winner.clone()).or_default() += 1;
                total_turns += game.turn_number;
            }
            None => {
                warn!(game_num, game_id = %id, max_steps = args.max_steps, "game did not finish");
                unfinished += 1;
            }
        }
    }

    let finished = args.games - unfinished;
    println!("games: {} finished, {} unfinished", finished, unfinished);
    if finished > 0 {
        println!("average turns: {:.1}", total_turns as f64 / finished as f64);
    }
    for (player, count) in wins {
        println!("{player}: {count} wins");
    }

    Ok(())
}
