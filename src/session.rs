use std::collections::VecDeque;

use futures::{Stream, StreamExt};
use log::{debug, error, info, trace, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::combat::{AdjudicationError, CombatResolver, Verdict};
use crate::core::definitions::{
    DestinationMask, GameEvent, GameResult, InputEvent, MoveOutcome, Selection, Square,
};
use crate::core::engine::Piece;
use crate::core::game::{commit_move, plan_move, Game, MoveError, MovePlan, MoveReport};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("input is locked until the current combat is over")]
    ControlLocked,
    #[error("there is nothing to select on {0}")]
    NothingToSelect(Square),
    #[error("piece on {0} belongs to the side not to move")]
    NotYourPiece(Square),
    #[error("piece on {0} has nowhere to go")]
    NoMoves(Square),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error("capture abandoned: {0}")]
    Adjudication(#[from] AdjudicationError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputResponse {
    Selected(DestinationMask),
    Deselected,
    Moved {
        outcome: MoveOutcome,
        result: GameResult,
    },
}

/// One table: the game, the current selection and the combat resolver.
pub struct GameSession {
    game: Game,
    selection: Option<Selection>,
    resolver: CombatResolver,
    events: Option<UnboundedSender<GameEvent>>,
}

impl GameSession {
    pub fn new(game: Game, resolver: CombatResolver) -> Self {
        GameSession {
            game,
            selection: None,
            resolver,
            events: None,
        }
    }

    /// Notifications for the UI; replaces any previous subscriber.
    pub fn subscribe(&mut self) -> UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.events = Some(sender);
        receiver
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn resolver(&self) -> &CombatResolver {
        &self.resolver
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.resolver.is_locked()
    }

    /// Piece under the cursor, the UI shows its personality.
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.game.board().get(square)
    }

    pub fn select(&mut self, square: Square) -> Result<&DestinationMask, SessionError> {
        if self.is_locked() {
            return Err(SessionError::ControlLocked);
        }
        let board = self.game.board();
        let piece = board
            .get(square)
            .ok_or(SessionError::NothingToSelect(square))?;
        if piece.color != board.side_to_move() {
            return Err(SessionError::NotYourPiece(square));
        }
        let destinations = board.legal_destinations(square);
        if destinations.is_empty() {
            return Err(SessionError::NoMoves(square));
        }
        trace!(
            "Selected {:?} with {} destinations",
            piece,
            destinations.count()
        );
        self.emit(GameEvent::Selected {
            square,
            destinations,
        });
        let selection = self.selection.insert(Selection {
            square,
            destinations,
        });
        Ok(&selection.destinations)
    }

    pub fn cancel_selection(&mut self) {
        if self.selection.take().is_some() {
            self.emit(GameEvent::SelectionCleared);
        }
    }

    /// Select when nothing is selected, otherwise try to move there.
    pub async fn handle_input(&mut self, event: InputEvent) -> Result<InputResponse, SessionError> {
        if self.is_locked() {
            return Err(SessionError::ControlLocked);
        }
        let InputEvent::Select(square) = event;
        let (from, destinations) = match &self.selection {
            Some(selection) => (selection.square, selection.destinations),
            None => {
                return self
                    .select(square)
                    .map(|destinations| InputResponse::Selected(*destinations));
            }
        };
        if !destinations.contains(square) {
            debug!("{} is not reachable from {}, dropping selection", square, from);
            self.cancel_selection();
            return Ok(InputResponse::Deselected);
        }
        let (outcome, result) = self.execute_move(from, square).await?;
        Ok(InputResponse::Moved { outcome, result })
    }

    /// Runs a move through planning, combat and commit. The board is only
    /// touched once the verdict is known.
    pub async fn execute_move(
        &mut self,
        from: Square,
        to: Square,
    ) -> Result<(MoveOutcome, GameResult), SessionError> {
        if self.is_locked() {
            return Err(SessionError::ControlLocked);
        }
        let plan = match plan_move(self.game.board(), from, to) {
            Ok(plan) => plan,
            Err(err) => {
                self.cancel_selection();
                return Err(err.into());
            }
        };
        let verdict = match plan {
            MovePlan::Advance | MovePlan::KingCapture(_) => None,
            MovePlan::Contested(request) => {
                self.emit(GameEvent::CombatStarted {
                    attacker: request.attacker,
                    defender: request.defender,
                });
                match self
                    .resolver
                    .resolve_combat(request.attacker, request.defender)
                    .await
                {
                    Ok(verdict) => {
                        self.emit(GameEvent::CombatResolved {
                            winner: *request.winner(verdict),
                            loser: *request.loser(verdict),
                        });
                        Some(verdict)
                    }
                    Err(err) => {
                        warn!("Capture {} -> {} abandoned: {}", from, to, err);
                        self.cancel_selection();
                        self.emit(GameEvent::CombatAborted(err.to_string()));
                        return Err(err.into());
                    }
                }
            }
        };
        self.finish_move(from, to, verdict)
    }

    fn finish_move(
        &mut self,
        from: Square,
        to: Square,
        verdict: Option<Verdict>,
    ) -> Result<(MoveOutcome, GameResult), SessionError> {
        let report = commit_move(self.game.board_mut(), from, to, verdict)?;
        self.cancel_selection();
        self.publish(&report);

        let outcome = report.outcome;
        let live: Vec<Piece> = match outcome {
            MoveOutcome::GameEnded(_) => self.game.board().iter_pieces().copied().collect(),
            _ => Vec::new(),
        };
        let result = self.game.check_terminal(outcome);
        match result {
            GameResult::Won(winner) => {
                self.emit(GameEvent::GameOver(winner));
                live.into_iter()
                    .for_each(|piece| self.emit(GameEvent::PieceRemoved(piece)));
                self.emit(GameEvent::BoardReset);
                let spawned: Vec<Piece> = self.game.board().iter_pieces().copied().collect();
                spawned
                    .into_iter()
                    .for_each(|piece| self.emit(GameEvent::PieceSpawned(piece)));
            }
            GameResult::Ongoing => (),
        }
        self.emit(GameEvent::TurnChanged(self.game.board().side_to_move()));
        Ok((outcome, result))
    }

    fn publish(&self, report: &MoveReport) {
        for piece in &report.removed {
            self.emit(GameEvent::PieceRemoved(*piece));
        }
        if let Some((from, to)) = report.moved {
            self.emit(GameEvent::PieceMoved { from, to });
        }
        if let Some(piece) = report.spawned {
            self.emit(GameEvent::PieceSpawned(piece));
        }
    }

    fn emit(&self, event: GameEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }

    /// Feeds the session until `inputs` ends. Inputs arriving mid-combat are dropped.
    pub async fn run<S>(&mut self, mut inputs: S)
    where
        S: Stream<Item = InputEvent> + Unpin,
    {
        let lock = self.resolver.subscribe();
        let mut pending: VecDeque<InputEvent> = VecDeque::new();
        let mut exhausted = false;
        loop {
            let event = match pending.pop_front() {
                Some(event) => event,
                None if exhausted => break,
                None => match inputs.next().await {
                    Some(event) => event,
                    None => break,
                },
            };
            let handling = self.handle_input(event);
            tokio::pin!(handling);
            let response = loop {
                // The move is polled first so a combat holds the lock before more input is read.
                tokio::select! {
                    biased;
                    response = &mut handling => break response,
                    next = inputs.next(), if !exhausted => match next {
                        Some(ignored) if lock.borrow().is_locked() => {
                            debug!("Ignoring {:?} while combat is in progress", ignored);
                        }
                        Some(queued) => pending.push_back(queued),
                        None => exhausted = true,
                    },
                }
            };
            match response {
                Ok(InputResponse::Moved { outcome, result }) => {
                    info!("Move finished: {:?} ({:?})", outcome, result)
                }
                Ok(response) => trace!("Input handled: {:?}", response),
                Err(err @ SessionError::Adjudication(_)) => error!("{}", err),
                Err(err) => debug!("Input rejected: {}", err),
            }
        }
    }
}
