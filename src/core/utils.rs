use crate::core::definitions::Square;

#[derive(Debug)]
pub struct DirectionIterator {
    position: Square,
    direction: (i8, i8),
}

impl Iterator for DirectionIterator {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (dx, dy) = self.direction;
        let next = self.position.offset(dx, dy)?;
        self.position = next;
        Some(next)
    }
}

/// Walks from `position` (exclusive) toward the board edge.
pub fn in_direction(position: Square, direction: (i8, i8)) -> DirectionIterator {
    DirectionIterator {
        position,
        direction,
    }
}

/// Squares reachable from `position` by each of `offsets`, off-board ones skipped.
pub fn jumps(position: Square, offsets: &'static [(i8, i8)]) -> impl Iterator<Item = Square> {
    offsets
        .iter()
        .filter_map(move |(dx, dy)| position.offset(*dx, *dy))
}

pub fn distance(a: Square, b: Square) -> u8 {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

#[inline]
pub fn is_valid_coord(x: i8, y: i8) -> bool {
    (0..8).contains(&x) && (0..8).contains(&y)
}

const POS_TO_STRING: [[&str; 8]; 8] = [
    ["a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1"],
    ["a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2"],
    ["a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3"],
    ["a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4"],
    ["a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5"],
    ["a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6"],
    ["a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7"],
    ["a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8"],
];

pub fn pos_to_str(square: Square) -> &'static str {
    POS_TO_STRING[square.y as usize][square.x as usize]
}
