//! Grid coordinates
//!
//! `z` selects the level (zone); two positions on different levels are never
//! adjacent.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z)
    }

    pub fn same_level(&self, other: &Position) -> bool {
        self.z == other.z
    }

    /// Chessboard distance: diagonal steps cost the same as straight ones.
    pub fn chebyshev(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn manhattan(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Whether `other` is within `radius` on both axes and on the same level.
    pub fn within_box(&self, other: &Position, radius: i32) -> bool {
        self.same_level(other) && self.chebyshev(other) <= radius
    }

    /// Unit step `(dx, dy)` pointing from `self` toward `target`.
    pub fn direction_to(&self, target: &Position) -> (i32, i32) {
        ((target.x - self.x).signum(), (target.y - self.y).signum())
    }

    /// All eight neighbours on the same level.
    pub fn neighbours(&self) -> impl Iterator<Item = Position> + '_ {
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_treats_diagonals_as_one() {
        let a = Position::new(0, 0, 0);
        assert_eq!(a.chebyshev(&Position::new(1, 1, 0)), 1);
        assert_eq!(a.chebyshev(&Position::new(3, -2, 0)), 3);
        assert_eq!(a.manhattan(&Position::new(3, -2, 0)), 5);
    }

    #[test]
    fn within_box_respects_level() {
        let a = Position::new(0, 0, 0);
        assert!(a.within_box(&Position::new(3, 3, 0), 3));
        assert!(!a.within_box(&Position::new(3, 3, 1), 3));
        assert!(!a.within_box(&Position::new(4, 0, 0), 3));
    }

    #[test]
    fn direction_and_neighbours() {
        let a = Position::new(2, 2, 0);
        assert_eq!(a.direction_to(&Position::new(5, 0, 0)), (1, -1));
        assert_eq!(a.direction_to(&a), (0, 0));
        assert_eq!(a.neighbours().count(), 8);
        assert!(a.neighbours().all(|n| n.chebyshev(&a) == 1));
    }
}
