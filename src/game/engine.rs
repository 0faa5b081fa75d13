//! The round engine: every lifecycle operation a player can perform on a
//! room, implemented validate-then-mutate.
//!
//! Each operation checks every precondition before touching state, so a
//! rejected action leaves the room exactly as it found it. The room actor
//! serializes calls, so these methods are free of interior locking.

use uuid::Uuid;

use crate::cards::CardCatalog;

use super::constants::{HAND_SIZE, MIN_PLAYERS};
use super::entities::{
    BlackCard, CardId, GameStatus, PlayerState, Round, Submission, UserId, WhiteCard,
};
use super::errors::{GameError, GameResult};
use super::state::GameState;

/// What a newly started round looks like to the outside world.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundStart {
    pub round_number: u32,
    pub black_card: BlackCard,
    pub czar_id: UserId,
}

/// Result of an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub submission_id: String,
    /// True when this submission was the last one outstanding and the room
    /// auto-advanced to judging.
    pub all_submitted: bool,
}

/// Result of the czar judging a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JudgeOutcome {
    pub winner_id: UserId,
    pub winner_username: String,
    pub winning_submission: Submission,
    pub game_ended: bool,
    pub final_winner_id: Option<UserId>,
}

/// What happened when a player left a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Removed from a pre-start lobby; the host role may have migrated.
    Left { new_host: Option<UserId> },
    /// The lobby has no players left and should be deleted.
    LobbyEmpty,
    /// The game was already running, so the player was only flagged
    /// inactive; their seat, hand, and score are preserved.
    MarkedInactive,
}

/// What happened when a player's last connection dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub was_present: bool,
    /// True when the disconnect removed the last outstanding submission
    /// hold-out and the room auto-advanced to judging.
    pub advanced_to_judging: bool,
}

impl GameState {
    /// Adds a player to a pre-start lobby. Joining a lobby you already
    /// belong to reactivates you instead of failing.
    pub fn join(&mut self, user_id: UserId, username: String) -> GameResult<()> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if let Some(player) = self.players.get_mut(&user_id) {
            player.is_active = true;
            return Ok(());
        }
        if self.is_full() {
            return Err(GameError::LobbyFull);
        }

        self.players
            .insert(user_id.clone(), PlayerState::new(user_id.clone(), username));
        self.join_order.push(user_id);
        Ok(())
    }

    /// Removes a player from a pre-start lobby, or marks them inactive if
    /// the game already started.
    pub fn leave(&mut self, user_id: &UserId) -> GameResult<LeaveOutcome> {
        if !self.players.contains_key(user_id) {
            return Err(GameError::NotInLobby);
        }

        if self.status != GameStatus::Waiting {
            if let Some(player) = self.players.get_mut(user_id) {
                player.is_active = false;
            }
            return Ok(LeaveOutcome::MarkedInactive);
        }

        self.players.remove(user_id);
        self.join_order.retain(|id| id != user_id);

        if self.players.is_empty() {
            return Ok(LeaveOutcome::LobbyEmpty);
        }

        let mut new_host = None;
        if &self.host_id == user_id {
            let promoted = self.join_order[0].clone();
            self.host_id = promoted.clone();
            new_host = Some(promoted);
        }
        Ok(LeaveOutcome::Left { new_host })
    }

    pub fn set_ready(&mut self, user_id: &UserId, is_ready: bool) -> GameResult<()> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        let player = self
            .players
            .get_mut(user_id)
            .ok_or(GameError::NotInLobby)?;
        player.is_ready = is_ready;
        Ok(())
    }

    /// Starts the game: deals every active player a full hand and opens
    /// round 1. Host-only, and only out of a complete, ready lobby.
    pub fn start(
        &mut self,
        user_id: &UserId,
        catalog: &dyn CardCatalog,
    ) -> GameResult<RoundStart> {
        if !self.is_host(user_id) {
            return Err(GameError::NotHost);
        }
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.active_count() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        if !self.active_players().all(|p| p.is_ready) {
            return Err(GameError::PlayersNotReady);
        }

        // Round preconditions are validated before the initial deal so a
        // failed start leaves the lobby untouched.
        let (order, cursor, czar_id) = self.peek_next_czar()?;
        let black_card = catalog
            .random_black(&self.used_black_card_ids)
            .ok_or(GameError::NoBlackCards)?;

        let active: Vec<UserId> = self.active_players().map(|p| p.id.clone()).collect();
        for id in &active {
            self.deal_up_to_hand_size(id, catalog);
        }

        Ok(self.open_round(order, cursor, czar_id, black_card, catalog))
    }

    /// Advances a finished round to the next one. Host-only.
    pub fn next_round(
        &mut self,
        user_id: &UserId,
        catalog: &dyn CardCatalog,
    ) -> GameResult<RoundStart> {
        if self.status == GameStatus::GameEnd {
            return Err(GameError::GameEnded);
        }
        if self.status != GameStatus::RoundEnd {
            return Err(GameError::NotRoundEnd);
        }
        if !self.is_host(user_id) {
            return Err(GameError::NotHost);
        }
        if self.winner().is_some() {
            return Err(GameError::GameEnded);
        }

        let (order, cursor, czar_id) = self.peek_next_czar()?;
        let black_card = catalog
            .random_black(&self.used_black_card_ids)
            .ok_or(GameError::NoBlackCards)?;

        Ok(self.open_round(order, cursor, czar_id, black_card, catalog))
    }

    /// Records a player's answer for the current round. Exactly one
    /// submission per active non-czar player; a second one is rejected.
    pub fn submit_cards(
        &mut self,
        user_id: &UserId,
        card_ids: &[CardId],
        catalog: &dyn CardCatalog,
    ) -> GameResult<SubmitOutcome> {
        if self.status != GameStatus::Picking {
            return Err(GameError::NotPicking);
        }
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        if &round.czar_id == user_id {
            return Err(GameError::CzarCannotSubmit);
        }
        let required = round.black_card.pick;

        let player = self.players.get(user_id).ok_or(GameError::PlayerNotInGame)?;
        if !player.is_active {
            return Err(GameError::PlayerInactive);
        }
        if player.has_submitted {
            return Err(GameError::AlreadySubmitted);
        }
        if card_ids.len() != required as usize {
            return Err(GameError::WrongCardCount { required });
        }

        // Each submitted id must come out of the hand exactly once, which
        // also rejects duplicate ids within one submission.
        let mut remaining = player.hand.clone();
        for card_id in card_ids {
            match remaining.iter().position(|held| held == card_id) {
                Some(pos) => {
                    remaining.swap_remove(pos);
                }
                None => return Err(GameError::CardNotInHand),
            }
        }

        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            player_id: user_id.clone(),
            card_ids: card_ids.to_vec(),
            cards: catalog.whites_by_ids(card_ids),
        };
        let submission_id = submission.id.clone();

        let player = self
            .players
            .get_mut(user_id)
            .expect("player validated above");
        player.hand.retain(|held| !card_ids.contains(held));
        player.has_submitted = true;

        self.current_round
            .as_mut()
            .expect("round validated above")
            .submissions
            .push(submission);

        let all_submitted = self.all_submitted();
        if all_submitted {
            self.status = GameStatus::Judging;
            log::info!("game {}: all submissions in, judging", self.code);
        }

        Ok(SubmitOutcome {
            submission_id,
            all_submitted,
        })
    }

    /// The czar picks the winning submission. Scores it, closes the round,
    /// and ends the game on the spot if the winner reached the threshold.
    pub fn judge(&mut self, user_id: &UserId, submission_id: &str) -> GameResult<JudgeOutcome> {
        if self.status != GameStatus::Judging {
            return Err(GameError::NotJudging);
        }
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        if &round.czar_id != user_id {
            return Err(GameError::NotCzar);
        }
        let winning_submission = round
            .submission(submission_id)
            .cloned()
            .ok_or(GameError::SubmissionNotFound)?;
        let winner_id = winning_submission.player_id.clone();

        if let Some(round) = self.current_round.as_mut() {
            round.winner_id = Some(winner_id.clone());
        }
        let winner_username = match self.players.get_mut(&winner_id) {
            Some(winner) => {
                winner.score += 1;
                winner.username.clone()
            }
            None => winner_id.clone(),
        };
        self.status = GameStatus::RoundEnd;

        let final_winner_id = self.winner().map(|p| p.id.clone());
        let game_ended = final_winner_id.is_some();
        if game_ended {
            self.status = GameStatus::GameEnd;
            log::info!(
                "game {}: won by {} at {} points",
                self.code,
                winner_username,
                self.win_score
            );
        }

        Ok(JudgeOutcome {
            winner_id,
            winner_username,
            winning_submission,
            game_ended,
            final_winner_id,
        })
    }

    /// Flags a returning player active again. The caller resends them the
    /// full room state and their hand.
    pub fn mark_reconnected(&mut self, user_id: &UserId) -> GameResult<()> {
        let player = self
            .players
            .get_mut(user_id)
            .ok_or(GameError::PlayerNotInGame)?;
        player.is_active = true;
        Ok(())
    }

    /// Flags a player inactive after their last connection closed. Their
    /// seat, hand, and score survive; they are skipped by czar rotation and
    /// excluded from the all-submitted check until they return.
    pub fn mark_disconnected(&mut self, user_id: &UserId) -> DisconnectOutcome {
        let Some(player) = self.players.get_mut(user_id) else {
            return DisconnectOutcome {
                was_present: false,
                advanced_to_judging: false,
            };
        };
        player.is_active = false;

        // The departed player may have been the last submission hold-out.
        let mut advanced_to_judging = false;
        if self.status == GameStatus::Picking {
            let has_submissions = self
                .current_round
                .as_ref()
                .is_some_and(|r| !r.submissions.is_empty());
            if has_submissions && self.all_submitted() {
                self.status = GameStatus::Judging;
                advanced_to_judging = true;
                log::info!(
                    "game {}: disconnect completed submissions, judging",
                    self.code
                );
            }
        }

        DisconnectOutcome {
            was_present: true,
            advanced_to_judging,
        }
    }

    /// Resolves a player's hand to full card texts.
    pub fn player_hand(
        &self,
        user_id: &UserId,
        catalog: &dyn CardCatalog,
    ) -> GameResult<Vec<WhiteCard>> {
        let player = self.players.get(user_id).ok_or(GameError::PlayerNotInGame)?;
        Ok(catalog.whites_by_ids(&player.hand))
    }

    /// Commits an already-validated round: fixes the rotation, burns the
    /// black card, resets submission flags, and tops up hands.
    fn open_round(
        &mut self,
        order: Vec<UserId>,
        cursor: usize,
        czar_id: UserId,
        black_card: BlackCard,
        catalog: &dyn CardCatalog,
    ) -> RoundStart {
        self.czar_order = order;
        self.czar_cursor = Some(cursor);
        self.record_drawn_black(black_card.id.clone());

        let round_number = self
            .current_round
            .as_ref()
            .map(|r| r.number + 1)
            .unwrap_or(1);
        self.current_round = Some(Round::new(round_number, black_card.clone(), czar_id.clone()));
        self.status = GameStatus::Picking;

        // The czar never submits, so their flag starts pre-satisfied.
        for player in self.players.values_mut() {
            player.has_submitted = player.id == czar_id;
        }

        let to_top_up: Vec<UserId> = self
            .active_players()
            .filter(|p| p.id != czar_id)
            .map(|p| p.id.clone())
            .collect();
        for id in &to_top_up {
            self.deal_up_to_hand_size(id, catalog);
        }

        log::info!(
            "game {}: round {} started, czar {}",
            self.code,
            round_number,
            czar_id
        );

        RoundStart {
            round_number,
            black_card,
            czar_id,
        }
    }

    /// Draws white cards for one player until they hold a full hand,
    /// excluding everything ever dealt in this room.
    fn deal_up_to_hand_size(&mut self, user_id: &UserId, catalog: &dyn CardCatalog) {
        let needed = match self.players.get(user_id) {
            Some(player) => HAND_SIZE.saturating_sub(player.hand.len()),
            None => return,
        };
        if needed == 0 {
            return;
        }

        let drawn = catalog.draw_whites(needed, &self.used_white_card_ids);
        if drawn.len() < needed {
            log::warn!(
                "game {}: white deck low, dealt {} of {} cards to {}",
                self.code,
                drawn.len(),
                needed,
                user_id
            );
        }
        let ids: Vec<CardId> = drawn.into_iter().map(|c| c.id).collect();
        self.record_dealt_whites(&ids);
        if let Some(player) = self.players.get_mut(user_id) {
            player.hand.extend(ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::InMemoryCatalog;
    use crate::game::entities::GameCode;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::sample()
    }

    fn ready_lobby() -> GameState {
        let mut state = GameState::new(GameCode::new("ABC123"), "p1".into(), "ana".into(), 3);
        state.join("p2".into(), "bia".into()).unwrap();
        state.join("p3".into(), "caio".into()).unwrap();
        state.set_ready(&"p2".to_string(), true).unwrap();
        state.set_ready(&"p3".to_string(), true).unwrap();
        state
    }

    fn started(catalog: &InMemoryCatalog) -> GameState {
        let mut state = ready_lobby();
        state.start(&"p1".to_string(), catalog).unwrap();
        state
    }

    fn non_czar_ids(state: &GameState) -> Vec<UserId> {
        let czar = state.current_round().unwrap().czar_id.clone();
        state
            .players_in_join_order()
            .filter(|p| p.id != czar)
            .map(|p| p.id.clone())
            .collect()
    }

    #[test]
    fn test_start_deals_full_hands_and_opens_round_one() {
        let catalog = catalog();
        let state = started(&catalog);

        assert_eq!(state.status(), GameStatus::Picking);
        let round = state.current_round().unwrap();
        assert_eq!(round.number, 1);
        assert!(["p1", "p2", "p3"].contains(&round.czar_id.as_str()));
        for player in state.players_in_join_order() {
            assert_eq!(player.hand.len(), HAND_SIZE);
        }
        let czar = state.player(&round.czar_id.clone()).unwrap();
        assert!(czar.has_submitted);
    }

    #[test]
    fn test_start_rejects_non_host() {
        let catalog = catalog();
        let mut state = ready_lobby();
        assert_eq!(
            state.start(&"p2".to_string(), &catalog),
            Err(GameError::NotHost)
        );
        assert_eq!(state.status(), GameStatus::Waiting);
    }

    #[test]
    fn test_start_requires_three_active_players() {
        let catalog = catalog();
        let mut state = GameState::new(GameCode::new("ABC123"), "p1".into(), "ana".into(), 3);
        state.join("p2".into(), "bia".into()).unwrap();
        state.set_ready(&"p2".to_string(), true).unwrap();
        assert_eq!(
            state.start(&"p1".to_string(), &catalog),
            Err(GameError::NotEnoughPlayers)
        );
    }

    #[test]
    fn test_start_requires_all_ready() {
        let catalog = catalog();
        let mut state = ready_lobby();
        state.set_ready(&"p3".to_string(), false).unwrap();
        assert_eq!(
            state.start(&"p1".to_string(), &catalog),
            Err(GameError::PlayersNotReady)
        );
    }

    #[test]
    fn test_submission_shrinks_hand_and_blocks_repeats() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let submitter = non_czar_ids(&state)[0].clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        let picked: Vec<CardId> = state.player(&submitter).unwrap().hand[..pick].to_vec();

        let outcome = state.submit_cards(&submitter, &picked, &catalog).unwrap();
        assert!(!outcome.submission_id.is_empty());
        let player = state.player(&submitter).unwrap();
        assert!(player.has_submitted);
        assert_eq!(player.hand.len(), HAND_SIZE - pick);

        let again: Vec<CardId> = state.player(&submitter).unwrap().hand[..pick].to_vec();
        assert_eq!(
            state.submit_cards(&submitter, &again, &catalog),
            Err(GameError::AlreadySubmitted)
        );
    }

    #[test]
    fn test_czar_cannot_submit() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let czar = state.current_round().unwrap().czar_id.clone();
        let picked: Vec<CardId> = state.player(&czar).unwrap().hand[..1].to_vec();
        assert_eq!(
            state.submit_cards(&czar, &picked, &catalog),
            Err(GameError::CzarCannotSubmit)
        );
    }

    #[test]
    fn test_submission_card_count_must_match_pick() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let submitter = non_czar_ids(&state)[0].clone();
        let pick = state.current_round().unwrap().black_card.pick;
        let too_many: Vec<CardId> =
            state.player(&submitter).unwrap().hand[..pick as usize + 1].to_vec();
        assert_eq!(
            state.submit_cards(&submitter, &too_many, &catalog),
            Err(GameError::WrongCardCount { required: pick })
        );
    }

    #[test]
    fn test_submission_rejects_cards_not_held() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let submitter = non_czar_ids(&state)[0].clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        let foreign: Vec<CardId> = (0..pick).map(|i| format!("nope-{i}")).collect();
        assert_eq!(
            state.submit_cards(&submitter, &foreign, &catalog),
            Err(GameError::CardNotInHand)
        );
        assert_eq!(state.player(&submitter).unwrap().hand.len(), HAND_SIZE);
        assert!(!state.player(&submitter).unwrap().has_submitted);
    }

    #[test]
    fn test_submission_rejects_duplicate_card_ids() {
        // A catalog whose only black cards are pick-2 prompts.
        let blacks = vec![BlackCard {
            id: "b1".into(),
            text: "___ + ___".into(),
            pick: 2,
        }];
        let whites = (1..=40)
            .map(|i| WhiteCard {
                id: format!("w{i}"),
                text: format!("card {i}"),
            })
            .collect();
        let catalog = InMemoryCatalog::new(blacks, whites);

        let mut state = ready_lobby();
        state.start(&"p1".to_string(), &catalog).unwrap();

        let submitter = non_czar_ids(&state)[0].clone();
        let card = state.player(&submitter).unwrap().hand[0].clone();
        assert_eq!(
            state.submit_cards(&submitter, &[card.clone(), card], &catalog),
            Err(GameError::CardNotInHand)
        );
    }

    #[test]
    fn test_all_submissions_auto_advance_to_judging() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let pick = state.current_round().unwrap().black_card.pick as usize;
        let submitters = non_czar_ids(&state);

        let first = &submitters[0];
        let cards: Vec<CardId> = state.player(first).unwrap().hand[..pick].to_vec();
        let outcome = state.submit_cards(first, &cards, &catalog).unwrap();
        assert!(!outcome.all_submitted);
        assert_eq!(state.status(), GameStatus::Picking);

        let second = &submitters[1];
        let cards: Vec<CardId> = state.player(second).unwrap().hand[..pick].to_vec();
        let outcome = state.submit_cards(second, &cards, &catalog).unwrap();
        assert!(outcome.all_submitted);
        assert_eq!(state.status(), GameStatus::Judging);
    }

    #[test]
    fn test_judging_scores_winner_and_ends_round() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let czar = state.current_round().unwrap().czar_id.clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        for id in non_czar_ids(&state) {
            let cards: Vec<CardId> = state.player(&id).unwrap().hand[..pick].to_vec();
            state.submit_cards(&id, &cards, &catalog).unwrap();
        }

        let submission = state.current_round().unwrap().submissions[0].clone();
        let outcome = state.judge(&czar, &submission.id).unwrap();

        assert_eq!(outcome.winner_id, submission.player_id);
        assert!(!outcome.game_ended);
        assert_eq!(state.player(&submission.player_id).unwrap().score, 1);
        assert_eq!(state.status(), GameStatus::RoundEnd);
        assert_eq!(
            state.current_round().unwrap().winner_id,
            Some(submission.player_id)
        );
    }

    #[test]
    fn test_only_czar_judges_and_submission_must_exist() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let czar = state.current_round().unwrap().czar_id.clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        let submitters = non_czar_ids(&state);
        for id in &submitters {
            let cards: Vec<CardId> = state.player(id).unwrap().hand[..pick].to_vec();
            state.submit_cards(id, &cards, &catalog).unwrap();
        }

        let sub_id = state.current_round().unwrap().submissions[0].id.clone();
        assert_eq!(
            state.judge(&submitters[0], &sub_id),
            Err(GameError::NotCzar)
        );
        assert_eq!(
            state.judge(&czar, "missing"),
            Err(GameError::SubmissionNotFound)
        );
        assert_eq!(state.status(), GameStatus::Judging);
    }

    #[test]
    fn test_judging_before_all_submissions_is_rejected() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let czar = state.current_round().unwrap().czar_id.clone();
        assert_eq!(state.judge(&czar, "anything"), Err(GameError::NotJudging));
    }

    #[test]
    fn test_reaching_win_score_locks_game() {
        let catalog = catalog();
        let mut state = started(&catalog);
        // Rig one player to the brink of winning, then judge them the round.
        let winner = non_czar_ids(&state)[0].clone();
        state.players.get_mut(&winner).unwrap().score = 2;

        let czar = state.current_round().unwrap().czar_id.clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        for id in non_czar_ids(&state) {
            let cards: Vec<CardId> = state.player(&id).unwrap().hand[..pick].to_vec();
            state.submit_cards(&id, &cards, &catalog).unwrap();
        }
        let sub_id = state
            .current_round()
            .unwrap()
            .submissions
            .iter()
            .find(|s| s.player_id == winner)
            .unwrap()
            .id
            .clone();

        let outcome = state.judge(&czar, &sub_id).unwrap();
        assert!(outcome.game_ended);
        assert_eq!(outcome.final_winner_id, Some(winner));
        assert_eq!(state.status(), GameStatus::GameEnd);
        assert_eq!(
            state.next_round(&"p1".to_string(), &catalog),
            Err(GameError::GameEnded)
        );
    }

    #[test]
    fn test_next_round_rotates_czar_and_tops_up_hands() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let first_czar = state.current_round().unwrap().czar_id.clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        for id in non_czar_ids(&state) {
            let cards: Vec<CardId> = state.player(&id).unwrap().hand[..pick].to_vec();
            state.submit_cards(&id, &cards, &catalog).unwrap();
        }
        let sub_id = state.current_round().unwrap().submissions[0].id.clone();
        state.judge(&first_czar, &sub_id).unwrap();

        let info = state.next_round(&"p1".to_string(), &catalog).unwrap();
        assert_eq!(info.round_number, 2);
        assert_ne!(info.czar_id, first_czar);
        for player in state.active_players().filter(|p| p.id != info.czar_id) {
            assert_eq!(player.hand.len(), HAND_SIZE);
        }
    }

    #[test]
    fn test_next_round_is_host_only() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let czar = state.current_round().unwrap().czar_id.clone();
        let pick = state.current_round().unwrap().black_card.pick as usize;
        for id in non_czar_ids(&state) {
            let cards: Vec<CardId> = state.player(&id).unwrap().hand[..pick].to_vec();
            state.submit_cards(&id, &cards, &catalog).unwrap();
        }
        let sub_id = state.current_round().unwrap().submissions[0].id.clone();
        state.judge(&czar, &sub_id).unwrap();

        assert_eq!(
            state.next_round(&"p2".to_string(), &catalog),
            Err(GameError::NotHost)
        );
    }

    #[test]
    fn test_inactive_player_cannot_submit() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let submitter = non_czar_ids(&state)[0].clone();
        state.mark_disconnected(&submitter);
        let pick = state.current_round().unwrap().black_card.pick as usize;
        let cards: Vec<CardId> = state.player(&submitter).unwrap().hand[..pick].to_vec();
        assert_eq!(
            state.submit_cards(&submitter, &cards, &catalog),
            Err(GameError::PlayerInactive)
        );
    }

    #[test]
    fn test_disconnect_of_last_holdout_advances_to_judging() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let submitters = non_czar_ids(&state);
        let pick = state.current_round().unwrap().black_card.pick as usize;

        let cards: Vec<CardId> = state.player(&submitters[0]).unwrap().hand[..pick].to_vec();
        state
            .submit_cards(&submitters[0], &cards, &catalog)
            .unwrap();
        assert_eq!(state.status(), GameStatus::Picking);

        let outcome = state.mark_disconnected(&submitters[1]);
        assert!(outcome.advanced_to_judging);
        assert_eq!(state.status(), GameStatus::Judging);
    }

    #[test]
    fn test_disconnect_preserves_seat_hand_and_score() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let gone = non_czar_ids(&state)[0].clone();
        let hand_before = state.player(&gone).unwrap().hand.clone();

        state.mark_disconnected(&gone);
        let player = state.player(&gone).unwrap();
        assert!(!player.is_active);
        assert_eq!(player.hand, hand_before);

        state.mark_reconnected(&gone).unwrap();
        assert!(state.player(&gone).unwrap().is_active);
    }

    #[test]
    fn test_leave_waiting_lobby_migrates_host_and_empties() {
        let mut state = GameState::new(GameCode::new("ABC123"), "p1".into(), "ana".into(), 3);
        state.join("p2".into(), "bia".into()).unwrap();

        let outcome = state.leave(&"p1".to_string()).unwrap();
        assert_eq!(
            outcome,
            LeaveOutcome::Left {
                new_host: Some("p2".to_string())
            }
        );
        assert!(state.is_host(&"p2".to_string()));

        let outcome = state.leave(&"p2".to_string()).unwrap();
        assert_eq!(outcome, LeaveOutcome::LobbyEmpty);
    }

    #[test]
    fn test_leave_running_game_marks_inactive() {
        let catalog = catalog();
        let mut state = started(&catalog);
        let outcome = state.leave(&"p2".to_string()).unwrap();
        assert_eq!(outcome, LeaveOutcome::MarkedInactive);
        assert!(!state.player(&"p2".to_string()).unwrap().is_active);
        assert!(state.contains_player(&"p2".to_string()));
    }

    #[test]
    fn test_join_after_start_is_rejected() {
        let catalog = catalog();
        let mut state = started(&catalog);
        assert_eq!(
            state.join("p9".into(), "late".into()),
            Err(GameError::AlreadyStarted)
        );
    }

    #[test]
    fn test_lobby_capacity_is_enforced() {
        let mut state = GameState::new(GameCode::new("ABC123"), "p1".into(), "ana".into(), 3);
        for i in 2..=10 {
            state.join(format!("p{i}"), format!("player{i}")).unwrap();
        }
        assert_eq!(
            state.join("p11".into(), "full".into()),
            Err(GameError::LobbyFull)
        );
    }

    #[test]
    fn test_no_card_is_ever_dealt_twice() {
        let catalog = catalog();
        let mut state = started(&catalog);

        for _ in 0..6 {
            if state.status() == GameStatus::GameEnd {
                break;
            }
            let czar = state.current_round().unwrap().czar_id.clone();
            let pick = state.current_round().unwrap().black_card.pick as usize;
            for id in non_czar_ids(&state) {
                let cards: Vec<CardId> = state.player(&id).unwrap().hand[..pick].to_vec();
                state.submit_cards(&id, &cards, &catalog).unwrap();
            }
            let sub_id = state.current_round().unwrap().submissions[0].id.clone();
            state.judge(&czar, &sub_id).unwrap();
            if state.status() == GameStatus::RoundEnd {
                state.next_round(&"p1".to_string(), &catalog).unwrap();
            }
        }

        let mut whites = state.used_white_card_ids.clone();
        whites.sort();
        whites.dedup();
        assert_eq!(whites.len(), state.used_white_card_ids.len());

        let mut blacks = state.used_black_card_ids.clone();
        blacks.sort();
        blacks.dedup();
        assert_eq!(blacks.len(), state.used_black_card_ids.len());
    }
}
