//! Room actor: a tokio task owning one room's canonical state.
//!
//! All mutation of a room flows through the actor's inbox, so concurrent
//! submissions, disconnects, and judge picks are applied one at a time and
//! the submission-count-to-advance check can never race. Rooms are fully
//! independent of each other. After each accepted mutation the actor
//! mirrors the state into the store and fans events out through the
//! broadcast dispatcher.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::broadcast::Broadcaster;
use crate::cards::CardCatalog;
use crate::events::ServerEvent;
use crate::game::engine::{JudgeOutcome, LeaveOutcome, RoundStart, SubmitOutcome};
use crate::game::entities::{CardId, GameCode, UserId, WhiteCard};
use crate::game::errors::{GameError, GameResult};
use crate::game::state::GameState;
use crate::game::views::{GameStateView, project, project_submissions};
use crate::presence::{ConnectionId, SharedPresence};
use crate::store::{GameRecord, GameStore};

use super::messages::{Reconnected, RoomMessage};

/// Inbox capacity per room; senders wait when a room falls this far behind.
const INBOX_SIZE: usize = 64;

/// Handle for sending commands to a room actor. Cheap to clone.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    code: GameCode,
    sender: mpsc::Sender<RoomMessage>,
}

impl RoomHandle {
    pub fn code(&self) -> &GameCode {
        &self.code
    }

    async fn send(&self, message: RoomMessage) -> GameResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::GameNotFound)
    }

    pub async fn join(
        &self,
        user_id: UserId,
        username: String,
        conn: ConnectionId,
    ) -> GameResult<GameStateView> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Join {
            user_id,
            username,
            conn,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn leave(&self, user_id: UserId, conn: ConnectionId) -> GameResult<LeaveOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Leave {
            user_id,
            conn,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn set_ready(&self, user_id: UserId, is_ready: bool) -> GameResult<GameStateView> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::SetReady {
            user_id,
            is_ready,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn start(&self, user_id: UserId) -> GameResult<RoundStart> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Start { user_id, reply }).await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn submit_cards(
        &self,
        user_id: UserId,
        card_ids: Vec<CardId>,
    ) -> GameResult<SubmitOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::SubmitCards {
            user_id,
            card_ids,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn judge_winner(
        &self,
        user_id: UserId,
        submission_id: String,
    ) -> GameResult<JudgeOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::JudgeWinner {
            user_id,
            submission_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn next_round(&self, user_id: UserId) -> GameResult<RoundStart> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::NextRound { user_id, reply }).await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn state(&self, user_id: Option<UserId>) -> GameResult<GameStateView> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::GetState { user_id, reply }).await?;
        rx.await.map_err(|_| GameError::GameNotFound)
    }

    pub async fn hand(&self, user_id: UserId) -> GameResult<Vec<WhiteCard>> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::GetHand { user_id, reply }).await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    pub async fn reconnect(
        &self,
        user_id: UserId,
        conn: ConnectionId,
    ) -> GameResult<Reconnected> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomMessage::Reconnect {
            user_id,
            conn,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameNotFound)?
    }

    /// Fire-and-forget notification that a user went fully offline.
    pub async fn connection_lost(&self, user_id: UserId) {
        let _ = self.send(RoomMessage::ConnectionLost { user_id }).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.send(RoomMessage::Shutdown).await;
    }
}

/// The actor owning one room.
pub struct RoomActor {
    state: GameState,
    inbox: mpsc::Receiver<RoomMessage>,
    catalog: Arc<dyn CardCatalog>,
    store: Arc<dyn GameStore>,
    presence: SharedPresence,
    broadcaster: Broadcaster,
}

impl RoomActor {
    pub fn new(
        state: GameState,
        catalog: Arc<dyn CardCatalog>,
        store: Arc<dyn GameStore>,
        presence: SharedPresence,
    ) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_SIZE);
        let code = state.code().clone();
        let broadcaster = Broadcaster::new(presence.clone());

        let actor = Self {
            state,
            inbox,
            catalog,
            store,
            presence,
            broadcaster,
        };
        let handle = RoomHandle { code, sender };

        (actor, handle)
    }

    /// Runs the actor event loop until shutdown or until every handle is
    /// dropped.
    pub async fn run(mut self) {
        log::info!("room {} started", self.state.code());

        while let Some(message) = self.inbox.recv().await {
            if self.handle_message(message).await {
                break;
            }
        }

        log::info!("room {} stopped", self.state.code());
    }

    /// Applies one command. Returns `true` when the actor should stop.
    async fn handle_message(&mut self, message: RoomMessage) -> bool {
        match message {
            RoomMessage::Join {
                user_id,
                username,
                conn,
                reply,
            } => {
                match self.state.join(user_id.clone(), username) {
                    Ok(()) => {
                        self.bind(conn).await;
                        self.persist().await;
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::LobbyUpdated {
                                    lobby: project(&self.state, None),
                                },
                                Some(conn),
                            )
                            .await;
                        let _ = reply.send(Ok(project(&self.state, Some(&user_id))));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::Leave {
                user_id,
                conn,
                reply,
            } => {
                match self.state.leave(&user_id) {
                    Ok(outcome) => {
                        self.presence.write().await.unbind_room(conn);
                        if outcome != LeaveOutcome::LobbyEmpty {
                            self.persist().await;
                            self.broadcaster
                                .to_room(
                                    self.state.code(),
                                    ServerEvent::LobbyUpdated {
                                        lobby: project(&self.state, None),
                                    },
                                    None,
                                )
                                .await;
                        }
                        let _ = reply.send(Ok(outcome));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::SetReady {
                user_id,
                is_ready,
                reply,
            } => {
                match self.state.set_ready(&user_id, is_ready) {
                    Ok(()) => {
                        self.persist().await;
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::LobbyUpdated {
                                    lobby: project(&self.state, None),
                                },
                                None,
                            )
                            .await;
                        let _ = reply.send(Ok(project(&self.state, Some(&user_id))));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::Start { user_id, reply } => {
                match self.state.start(&user_id, self.catalog.as_ref()) {
                    Ok(round) => {
                        self.persist().await;
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::GameStarted {
                                    round: round.clone(),
                                    game_state: project(&self.state, None),
                                },
                                None,
                            )
                            .await;
                        self.send_hands(false).await;
                        let _ = reply.send(Ok(round));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::SubmitCards {
                user_id,
                card_ids,
                reply,
            } => {
                match self
                    .state
                    .submit_cards(&user_id, &card_ids, self.catalog.as_ref())
                {
                    Ok(outcome) => {
                        self.persist().await;
                        if outcome.all_submitted {
                            self.broadcaster
                                .to_room(
                                    self.state.code(),
                                    ServerEvent::AllSubmitted {
                                        submissions: project_submissions(&self.state),
                                    },
                                    None,
                                )
                                .await;
                        } else {
                            self.broadcaster
                                .to_room(
                                    self.state.code(),
                                    ServerEvent::CardSubmitted {
                                        player_id: user_id.clone(),
                                    },
                                    None,
                                )
                                .await;
                        }
                        let _ = reply.send(Ok(outcome));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::JudgeWinner {
                user_id,
                submission_id,
                reply,
            } => {
                match self.state.judge(&user_id, &submission_id) {
                    Ok(outcome) => {
                        self.persist().await;
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::RoundWinner {
                                    winner_id: outcome.winner_id.clone(),
                                    winner_username: outcome.winner_username.clone(),
                                    winning_submission: outcome.winning_submission.clone(),
                                    game_ended: outcome.game_ended,
                                    final_winner_id: outcome.final_winner_id.clone(),
                                },
                                None,
                            )
                            .await;
                        if outcome.game_ended {
                            let winner_id = outcome
                                .final_winner_id
                                .clone()
                                .unwrap_or_else(|| outcome.winner_id.clone());
                            self.broadcaster
                                .to_room(
                                    self.state.code(),
                                    ServerEvent::GameEnded {
                                        winner_id,
                                        final_scores: project(&self.state, None).players,
                                    },
                                    None,
                                )
                                .await;
                        }
                        let _ = reply.send(Ok(outcome));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::NextRound { user_id, reply } => {
                match self.state.next_round(&user_id, self.catalog.as_ref()) {
                    Ok(round) => {
                        self.persist().await;
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::NewRound {
                                    round: round.clone(),
                                },
                                None,
                            )
                            .await;
                        self.send_hands(true).await;
                        let _ = reply.send(Ok(round));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::GetState { user_id, reply } => {
                let _ = reply.send(project(&self.state, user_id.as_ref()));
            }

            RoomMessage::GetHand { user_id, reply } => {
                let _ = reply.send(self.state.player_hand(&user_id, self.catalog.as_ref()));
            }

            RoomMessage::Reconnect {
                user_id,
                conn,
                reply,
            } => {
                match self.state.mark_reconnected(&user_id) {
                    Ok(()) => {
                        self.bind(conn).await;
                        self.persist().await;
                        let username = self
                            .state
                            .player(&user_id)
                            .map(|p| p.username.clone())
                            .unwrap_or_default();
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::PlayerReconnected {
                                    player_id: user_id.clone(),
                                    username,
                                },
                                Some(conn),
                            )
                            .await;
                        let hand = self
                            .state
                            .player_hand(&user_id, self.catalog.as_ref())
                            .unwrap_or_default();
                        let _ = reply.send(Ok(Reconnected {
                            game_state: project(&self.state, Some(&user_id)),
                            hand,
                        }));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomMessage::ConnectionLost { user_id } => {
                let username = self
                    .state
                    .player(&user_id)
                    .map(|p| p.username.clone())
                    .unwrap_or_default();
                let outcome = self.state.mark_disconnected(&user_id);
                if outcome.was_present {
                    self.persist().await;
                    self.broadcaster
                        .to_room(
                            self.state.code(),
                            ServerEvent::PlayerDisconnected {
                                player_id: user_id.clone(),
                                username,
                            },
                            None,
                        )
                        .await;
                    if outcome.advanced_to_judging {
                        self.broadcaster
                            .to_room(
                                self.state.code(),
                                ServerEvent::AllSubmitted {
                                    submissions: project_submissions(&self.state),
                                },
                                None,
                            )
                            .await;
                    }
                }
            }

            RoomMessage::Shutdown => {
                return true;
            }
        }

        false
    }

    async fn bind(&self, conn: ConnectionId) {
        self.presence
            .write()
            .await
            .bind_room(conn, self.state.code().clone());
    }

    /// Sends each player their private hand. Round 1 deals reach everyone;
    /// later rounds only top up active players.
    async fn send_hands(&self, active_only: bool) {
        let recipients: Vec<UserId> = self
            .state
            .players_in_join_order()
            .filter(|p| !active_only || p.is_active)
            .map(|p| p.id.clone())
            .collect();
        for user_id in recipients {
            if let Ok(hand) = self.state.player_hand(&user_id, self.catalog.as_ref()) {
                self.broadcaster
                    .to_user(&user_id, ServerEvent::Hand { hand })
                    .await;
            }
        }
    }

    /// Mirrors the room into the store. Awaited inside the actor so a
    /// room's snapshots are written in mutation order; the in-memory state
    /// stays the source of truth, so a failed write is logged and play
    /// continues.
    async fn persist(&self) {
        let record = GameRecord::from(&self.state);
        if let Err(e) = self.store.save_game(record).await {
            log::error!("room {}: persist failed: {e:#}", self.state.code());
        }
    }
}
