use battle_chess::core::game::{commit_move, plan_move, MovePlan};
use battle_chess::{Board, Game, Square};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;

fn all_destinations(board: &Board) -> usize {
    Square::all()
        .map(|square| board.legal_destinations(square).count())
        .sum()
}

/// Random quiet moves until a capture would need a verdict.
fn quiet_game(mut game: Game, rng: &mut StdRng, max_steps: usize) -> Game {
    for _ in 0..max_steps {
        let board = game.board();
        let candidate = Square::all()
            .flat_map(|from| {
                board
                    .legal_destinations(from)
                    .squares()
                    .map(move |to| (from, to))
                    .collect::<Vec<_>>()
            })
            .filter(|(from, to)| matches!(plan_move(board, *from, *to), Ok(MovePlan::Advance)))
            .choose(rng);
        let Some((from, to)) = candidate else {
            break;
        };
        if commit_move(game.board_mut(), from, to, None).is_err() {
            break;
        }
    }
    game
}

fn criterion_benchmark(c: &mut Criterion) {
    let board = Board::starting(&mut StdRng::seed_from_u64(0));
    c.bench_function("start destinations", |b| {
        b.iter(|| all_destinations(black_box(&board)))
    });
    c.bench_function("quiet game 100", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            quiet_game(Game::with_seed(1), &mut rng, 100)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
