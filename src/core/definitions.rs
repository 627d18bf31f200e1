use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::engine::{Color, Piece};
use crate::core::utils::{is_valid_coord, pos_to_str};

/// Board coordinate, `x` is the file and `y` the rank (White starts on 0 and 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub x: u8,
    pub y: u8,
}

impl Square {
    pub const fn new(x: u8, y: u8) -> Square {
        Square { x, y }
    }

    pub fn try_new(x: i8, y: i8) -> Option<Square> {
        if is_valid_coord(x, y) {
            Some(Square::new(x as u8, y as u8))
        } else {
            None
        }
    }

    pub fn offset(self, dx: i8, dy: i8) -> Option<Square> {
        Square::try_new(self.x as i8 + dx, self.y as i8 + dy)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|y| (0..8u8).map(move |x| Square::new(x, y)))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(pos_to_str(*self))
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("'{0}' is not a square, expected something like `e2` or `4,1`")]
pub struct ParseSquareError(pub String);

impl FromStr for Square {
    type Err = ParseSquareError;

    /// Accepts algebraic (`e2`) or numeric (`4,1`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError(s.to_string());
        let trimmed = s.trim();
        if let Some((x, y)) = trimmed.split_once(',') {
            let x: i8 = x.trim().parse().map_err(|_| err())?;
            let y: i8 = y.trim().parse().map_err(|_| err())?;
            return Square::try_new(x, y).ok_or_else(err);
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file @ 'a'..='h'), Some(rank @ '1'..='8'), None) => Ok(Square::new(
                file as u8 - b'a',
                rank as u8 - b'1',
            )),
            _ => Err(err()),
        }
    }
}

/// Legal destinations of one piece, indexed `[x][y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestinationMask([[bool; 8]; 8]);

impl DestinationMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, square: Square) {
        self.0[square.x as usize][square.y as usize] = true;
    }

    pub fn contains(&self, square: Square) -> bool {
        self.0[square.x as usize][square.y as usize]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().flatten().any(|marked| *marked)
    }

    pub fn count(&self) -> usize {
        self.0.iter().flatten().filter(|marked| **marked).count()
    }

    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(|square| self.contains(*square))
    }
}

/// Transient selection, lives from a successful pick until the move resolves.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub square: Square,
    pub destinations: DestinationMask,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Moved,
    /// Carries the color of the piece that was removed.
    Captured(Color),
    /// Carries the winner.
    GameEnded(Color),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Ongoing,
    Won(Color),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Select(Square),
}

/// Notifications for whoever draws the board.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Selected {
        square: Square,
        destinations: DestinationMask,
    },
    SelectionCleared,
    PieceMoved {
        from: Square,
        to: Square,
    },
    PieceRemoved(Piece),
    PieceSpawned(Piece),
    CombatStarted {
        attacker: Piece,
        defender: Piece,
    },
    CombatResolved {
        winner: Piece,
        loser: Piece,
    },
    CombatAborted(String),
    TurnChanged(Color),
    GameOver(Color),
    BoardReset,
}
