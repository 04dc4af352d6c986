use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use coup_engine::ai::{simulate, RandomAgent};
use coup_engine::{Game, GameConfig};
use rand::{thread_rng, SeedableRng};
use rand_pcg::Pcg64;

fn complete_game(num_players: usize) {
    let mut rng = Pcg64::from_rng(thread_rng()).unwrap();
    let mut game = Game::create(&GameConfig::with_players(num_players)).unwrap();
    for seat in 0..num_players {
        game.add_player(&format!("p{seat}"), &mut rng).unwrap();
    }

    let mut agent = RandomAgent::new(Pcg64::from_rng(thread_rng()).unwrap());
    black_box(simulate(game, &mut agent, &mut rng, 10_000).unwrap());
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 2..=6usize {
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| complete_game(num_players))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
