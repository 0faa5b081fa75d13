//! Round engine benchmarks.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use cartas::cards::InMemoryCatalog;
use cartas::game::{BlackCard, CardId, GameCode, GameState, UserId, WhiteCard};

fn pick_one_catalog() -> InMemoryCatalog {
    let blacks = (1..=50)
        .map(|i| BlackCard {
            id: format!("b{i}"),
            text: format!("Prompt {i}: ___."),
            pick: 1,
        })
        .collect();
    let whites = (1..=500)
        .map(|i| WhiteCard {
            id: format!("w{i}"),
            text: format!("Answer {i}"),
        })
        .collect();
    InMemoryCatalog::new(blacks, whites)
}

fn started_game(catalog: &InMemoryCatalog, num_players: usize) -> GameState {
    let mut state = GameState::new(GameCode::new("BENCHM"), "p1".into(), "player1".into(), 20);
    for i in 2..=num_players {
        state.join(format!("p{i}"), format!("player{i}")).unwrap();
        state.set_ready(&format!("p{i}"), true).unwrap();
    }
    state.start(&"p1".to_string(), catalog).unwrap();
    state
}

fn bench_game_start(c: &mut Criterion) {
    let catalog = pick_one_catalog();
    c.bench_function("game_start_10_players", |b| {
        b.iter(|| black_box(started_game(&catalog, 10)));
    });
}

fn bench_full_round(c: &mut Criterion) {
    let catalog = pick_one_catalog();
    c.bench_function("full_round_6_players", |b| {
        b.iter(|| {
            let mut state = started_game(&catalog, 6);
            let czar = state.current_round().unwrap().czar_id.clone();
            let submitters: Vec<UserId> = state
                .players_in_join_order()
                .filter(|p| p.id != czar)
                .map(|p| p.id.clone())
                .collect();
            for id in &submitters {
                let card = state.player(id).unwrap().hand[0].clone();
                state.submit_cards(id, &[card], &catalog).unwrap();
            }
            let submission_id = state.current_round().unwrap().submissions[0].id.clone();
            state.judge(&czar, &submission_id).unwrap();
            black_box(state)
        });
    });
}

fn bench_submission_validation(c: &mut Criterion) {
    let catalog = pick_one_catalog();
    c.bench_function("rejected_submission", |b| {
        let mut state = started_game(&catalog, 6);
        let czar = state.current_round().unwrap().czar_id.clone();
        let foreign: Vec<CardId> = vec!["not-a-card".into()];
        b.iter(|| {
            // Rejected actions must not mutate, so the same state can be
            // reused across iterations.
            black_box(state.submit_cards(&czar, &foreign, &catalog).unwrap_err())
        });
    });
}

criterion_group!(
    benches,
    bench_game_start,
    bench_full_round,
    bench_submission_validation
);
criterion_main!(benches);
