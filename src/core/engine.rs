use std::fmt::{Debug, Display};

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::definitions::{DestinationMask, Square};
use crate::core::utils::{in_direction, jumps};

#[derive(PartialEq, Eq, Hash, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        if self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Rank step of a pawn push.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        self.opposite().back_rank()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(if self == &Self::White {
            "White"
        } else {
            "Black"
        })
    }
}

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        })
    }
}

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Personality {
    Brave,
    Coward,
    Loyal,
    Treacherous,
    Honest,
    Deceitful,
    Merciful,
    Cruel,
}

impl Personality {
    pub const ALL: [Personality; 8] = [
        Personality::Brave,
        Personality::Coward,
        Personality::Loyal,
        Personality::Treacherous,
        Personality::Honest,
        Personality::Deceitful,
        Personality::Merciful,
        Personality::Cruel,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Personality {
        *Self::ALL
            .choose(rng)
            .unwrap_or(&Personality::Brave)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Brave => "Brave",
            Personality::Coward => "Coward",
            Personality::Loyal => "Loyal",
            Personality::Treacherous => "Treacherous",
            Personality::Honest => "Honest",
            Personality::Deceitful => "Deceitful",
            Personality::Merciful => "Merciful",
            Personality::Cruel => "Cruel",
        }
    }
}

impl Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub position: Square,
    pub personality: Personality,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, position: Square, personality: Personality) -> Piece {
        Piece {
            kind,
            color,
            position,
            personality,
        }
    }

    /// "Brave Knight", the way the narrator talks about a piece.
    pub fn descriptor(&self) -> String {
        format!("{} {}", self.personality, self.kind)
    }
}

impl Debug for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Piece")
            .field("kind", &self.kind)
            .field("color", &self.color)
            .field("position", &self.position.to_string())
            .field("personality", &self.personality)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /** indexed `[x][y]` */
    grid: [[Option<Piece>; 8]; 8],
    side_to_move: Color,
    en_passant: Option<Square>,
}

impl Board {
    /// Empty board, White to move.
    pub fn new() -> Board {
        Board {
            grid: [[None; 8]; 8],
            side_to_move: Color::White,
            en_passant: None,
        }
    }

    /// Standard start position, every piece gets an independent random personality.
    pub fn starting<R: Rng + ?Sized>(rng: &mut R) -> Board {
        let mut board = Board::new();
        for (color, back, pawns) in [
            (Color::White, 0u8, 1u8),
            (Color::Black, 7u8, 6u8),
        ] {
            for (x, kind) in BACK_RANK.iter().enumerate() {
                let x = x as u8;
                // Kings and queens are mirrored across the board.
                let x = match (color, kind) {
                    (Color::Black, PieceKind::King) => 4,
                    (Color::Black, PieceKind::Queen) => 3,
                    _ => x,
                };
                board.place(Piece::new(
                    *kind,
                    color,
                    Square::new(x, back),
                    Personality::random(rng),
                ));
            }
            for x in 0..8u8 {
                board.place(Piece::new(
                    PieceKind::Pawn,
                    color,
                    Square::new(x, pawns),
                    Personality::random(rng),
                ));
            }
        }
        board
    }

    pub fn get(&self, square: Square) -> Option<&Piece> {
        self.grid[square.x as usize][square.y as usize].as_ref()
    }

    /// Puts `piece` on its own `position`, replacing whatever stood there.
    pub fn place(&mut self, piece: Piece) -> Option<Piece> {
        trace!("Placing {:?}", piece);
        self.grid[piece.position.x as usize][piece.position.y as usize].replace(piece)
    }

    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.grid[square.x as usize][square.y as usize].take();
        if let Some(piece) = &piece {
            trace!("Removing {:?}", piece);
        }
        piece
    }

    /// Moves the occupant of `from` to `to`, keeping its stored position in sync.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mut piece = self.take(from)?;
        piece.position = to;
        self.place(piece);
        Some(piece)
    }

    pub fn clear(&mut self) -> Vec<Piece> {
        let removed: Vec<_> = self.iter_pieces().copied().collect();
        self.grid = [[None; 8]; 8];
        self.en_passant = None;
        removed
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub fn flip_side(&mut self) -> Color {
        self.side_to_move = self.side_to_move.opposite();
        self.side_to_move
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn set_en_passant(&mut self, square: Option<Square>) {
        self.en_passant = square;
    }

    pub fn iter_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        Square::all().filter_map(|square| self.get(square))
    }

    pub fn is_enemy(&self, square: Square, color: Color) -> bool {
        self.get(square).is_some_and(|piece| piece.color != color)
    }

    /// Where the piece on `square` may go. Empty unless it belongs to the side to move.
    pub fn legal_destinations(&self, square: Square) -> DestinationMask {
        let mut mask = DestinationMask::new();
        if let Some(piece) = self.get(square) {
            if piece.color == self.side_to_move {
                MOVEMENT[piece.kind as usize](self, piece, &mut mask);
            }
        }
        mask
    }
}

/// Text diagram, rank 8 on top, White in capitals.
impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in (0..8u8).rev() {
            write!(f, "{} ", y + 1)?;
            for x in 0..8u8 {
                let symbol = match self.get(Square::new(x, y)) {
                    None => '.',
                    Some(piece) => {
                        let symbol = match piece.kind {
                            PieceKind::Pawn => 'p',
                            PieceKind::Knight => 'n',
                            PieceKind::Bishop => 'b',
                            PieceKind::Rook => 'r',
                            PieceKind::Queen => 'q',
                            PieceKind::King => 'k',
                        };
                        match piece.color {
                            Color::White => symbol.to_ascii_uppercase(),
                            Color::Black => symbol,
                        }
                    }
                };
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h   {} to move", self.side_to_move)
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting(&mut rand::thread_rng())
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::King,
    PieceKind::Queen,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/** Tables directions for pieces */
const BISHOP_DIR: &[(i8, i8)] = &[(1, 1), (-1, 1), (-1, -1), (1, -1)];
const ROOK_DIR: &[(i8, i8)] = &[(0, 1), (-1, 0), (0, -1), (1, 0)];
const QUEEN_DIR: &[(i8, i8)] = &[
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 0),
];

/** Possible moves for pieces */
const KING_MOVES: &[(i8, i8)] = QUEEN_DIR;
const KNIGHT_MOVES: &[(i8, i8)] = &[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

type MovementFn = fn(&Board, &Piece, &mut DestinationMask);

/** Indexed by `PieceKind as usize` */
const MOVEMENT: [MovementFn; 6] = [
    pawn_moves,
    knight_moves,
    bishop_moves,
    rook_moves,
    queen_moves,
    king_moves,
];

fn pawn_moves(board: &Board, pawn: &Piece, mask: &mut DestinationMask) {
    let step = pawn.color.forward();
    let Some(front) = pawn.position.offset(0, step) else {
        return;
    };
    // push
    if board.get(front).is_none() {
        mask.mark(front);
        // double push
        if pawn.position.y == pawn.color.pawn_rank() {
            if let Some(double) = front.offset(0, step) {
                if board.get(double).is_none() {
                    mask.mark(double);
                }
            }
        }
    }
    // capture
    for side in [1, -1] {
        let Some(target) = front.offset(side, 0) else {
            continue;
        };
        if board.is_enemy(target, pawn.color) || board.en_passant() == Some(target) {
            mask.mark(target);
        }
    }
}

fn knight_moves(board: &Board, knight: &Piece, mask: &mut DestinationMask) {
    step_moves(board, knight, KNIGHT_MOVES, mask)
}

fn king_moves(board: &Board, king: &Piece, mask: &mut DestinationMask) {
    step_moves(board, king, KING_MOVES, mask)
}

fn bishop_moves(board: &Board, bishop: &Piece, mask: &mut DestinationMask) {
    sliding_moves(board, bishop, BISHOP_DIR, mask)
}

fn rook_moves(board: &Board, rook: &Piece, mask: &mut DestinationMask) {
    sliding_moves(board, rook, ROOK_DIR, mask)
}

fn queen_moves(board: &Board, queen: &Piece, mask: &mut DestinationMask) {
    sliding_moves(board, queen, QUEEN_DIR, mask)
}

fn step_moves(
    board: &Board,
    piece: &Piece,
    offsets: &'static [(i8, i8)],
    mask: &mut DestinationMask,
) {
    for pos in jumps(piece.position, offsets) {
        match board.get(pos) {
            None => mask.mark(pos),
            Some(other) if other.color != piece.color => mask.mark(pos),
            Some(_) => (),
        }
    }
}

fn sliding_moves(
    board: &Board,
    piece: &Piece,
    directions: &[(i8, i8)],
    mask: &mut DestinationMask,
) {
    for dir in directions {
        for pos in in_direction(piece.position, *dir) {
            match board.get(pos) {
                None => mask.mark(pos),
                Some(other) => {
                    if other.color != piece.color {
                        mask.mark(pos);
                    }
                    break;
                }
            }
        }
    }
}
