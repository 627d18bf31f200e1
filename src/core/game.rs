use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::combat::definitions::{CombatRequest, Verdict};
use crate::core::definitions::{GameResult, MoveOutcome, Square};
use crate::core::engine::{Board, Color, Piece, PieceKind};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MoveError {
    #[error("there is no piece on {0}")]
    EmptySquare(Square),
    #[error("{from} -> {to} is not a legal move")]
    Illegal { from: Square, to: Square },
    #[error("capture on {0} needs a combat verdict")]
    MissingVerdict(Square),
}

/// What has to happen before a move can be committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovePlan {
    /// Quiet move or en passant, commit right away.
    Advance,
    /// Enemy king on the destination, the mover's side wins.
    KingCapture(Color),
    /// Enemy piece on the destination, needs a verdict first.
    Contested(CombatRequest),
}

/// Everything a commit changed, for the UI.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub moved: Option<(Square, Square)>,
    pub removed: Vec<Piece>,
    pub spawned: Option<Piece>,
}

impl MoveReport {
    fn new(outcome: MoveOutcome) -> Self {
        MoveReport {
            outcome,
            moved: None,
            removed: Vec::new(),
            spawned: None,
        }
    }
}

/// Classifies `from -> to` without touching the board.
pub fn plan_move(board: &Board, from: Square, to: Square) -> Result<MovePlan, MoveError> {
    let mover = board.get(from).ok_or(MoveError::EmptySquare(from))?;
    if !board.legal_destinations(from).contains(to) {
        return Err(MoveError::Illegal { from, to });
    }
    Ok(match board.get(to) {
        Some(target) if target.kind == PieceKind::King => MovePlan::KingCapture(mover.color),
        Some(target) => MovePlan::Contested(CombatRequest {
            attacker: *mover,
            defender: *target,
        }),
        None => MovePlan::Advance,
    })
}

/** Apply a ***legal*** move. Contested captures need their `verdict`.
 * Nothing is mutated when an error is returned. */
pub fn commit_move(
    board: &mut Board,
    from: Square,
    to: Square,
    verdict: Option<Verdict>,
) -> Result<MoveReport, MoveError> {
    let mover = *board.get(from).ok_or(MoveError::EmptySquare(from))?;
    let mut report = MoveReport::new(MoveOutcome::Moved);
    let mut mover_survives = true;

    match board.get(to).copied() {
        Some(target) if target.color == mover.color => {
            return Err(MoveError::Illegal { from, to });
        }
        Some(target) if target.kind == PieceKind::King => {
            debug!("{} captures the enemy king on {}", mover.color, to);
            return Ok(MoveReport::new(MoveOutcome::GameEnded(mover.color)));
        }
        Some(target) => match verdict.ok_or(MoveError::MissingVerdict(to))? {
            Verdict::AttackerWins => {
                report.removed.extend(board.take(to));
                report.outcome = MoveOutcome::Captured(target.color);
            }
            Verdict::DefenderWins => {
                report.removed.extend(board.take(from));
                report.outcome = MoveOutcome::Captured(mover.color);
                mover_survives = false;
            }
        },
        None => (),
    }

    let forward = mover.color.forward();
    // enpassant: whoever lands on the target takes the pawn that skipped it
    if board.en_passant() == Some(to) {
        if let Some(skipped) = to.offset(0, -forward).and_then(|behind| board.take(behind)) {
            report.outcome = MoveOutcome::Captured(skipped.color);
            report.removed.push(skipped);
        }
    }

    board.set_en_passant(None);
    if mover_survives
        && mover.kind == PieceKind::Pawn
        && from.y == mover.color.pawn_rank()
        && to.y as i8 == from.y as i8 + 2 * forward
    {
        board.set_en_passant(from.offset(0, forward));
    }

    if mover_survives {
        if mover.kind == PieceKind::Pawn && to.y == mover.color.promotion_rank() {
            report.removed.extend(board.take(from));
            let queen = Piece::new(PieceKind::Queen, mover.color, to, mover.personality);
            board.place(queen);
            trace!("Promoted {:?}", queen);
            report.spawned = Some(queen);
        } else {
            board.relocate(from, to);
            report.moved = Some((from, to));
        }
    }

    let next = board.flip_side();
    trace!("{} -> {}: {:?}, {} to move", from, to, report.outcome, next);
    Ok(report)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub white_wins: u32,
    pub black_wins: u32,
    pub last_winner: Option<Color>,
}

impl Scoreboard {
    pub fn games_played(&self) -> u32 {
        self.white_wins + self.black_wins
    }

    fn record(&mut self, winner: Color) {
        match winner {
            Color::White => self.white_wins += 1,
            Color::Black => self.black_wins += 1,
        }
        self.last_winner = Some(winner);
    }
}

/// Board plus what survives between games.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    scoreboard: Scoreboard,
    rng: StdRng,
}

impl Game {
    pub fn new() -> Game {
        Game::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Game {
        Game::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Game {
        Game {
            board: Board::starting(&mut rng),
            scoreboard: Scoreboard::default(),
            rng,
        }
    }

    /// Starts from an arbitrary position; resets still respawn the standard one.
    pub fn from_board(board: Board) -> Game {
        Game {
            board,
            scoreboard: Scoreboard::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn check_terminal(&mut self, outcome: MoveOutcome) -> GameResult {
        match outcome {
            MoveOutcome::GameEnded(winner) => {
                info!("{} wins!", winner);
                self.scoreboard.record(winner);
                self.reset();
                GameResult::Won(winner)
            }
            MoveOutcome::Moved | MoveOutcome::Captured(_) => GameResult::Ongoing,
        }
    }

    /// Clears the board and sets up a fresh game, White to move.
    pub fn reset(&mut self) -> Vec<Piece> {
        let removed = self.board.clear();
        self.board = Board::starting(&mut self.rng);
        self.board.set_side_to_move(Color::White);
        debug!(
            "Board reset, {} pieces removed, {} spawned",
            removed.len(),
            self.board.iter_pieces().count()
        );
        removed
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
