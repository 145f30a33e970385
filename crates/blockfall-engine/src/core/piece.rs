use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// Color of a settled block or piece.
///
/// Every [`PieceKind`] has exactly one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum PieceColor {
    Cyan,
    Yellow,
    Magenta,
    Green,
    Red,
    Orange,
    Blue,
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// Straight line.
    I = 0,
    /// Square.
    O = 1,
    /// Half plus.
    T = 2,
    /// Zed mirror.
    S = 3,
    /// Zed.
    Z = 4,
    /// Ell.
    L = 5,
    /// Ell mirror.
    J = 6,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece kind: {input:?}")]
pub struct ParsePieceKindError {
    input: String,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
    ];

    #[must_use]
    pub const fn color(self) -> PieceColor {
        match self {
            PieceKind::I => PieceColor::Cyan,
            PieceKind::O => PieceColor::Yellow,
            PieceKind::T => PieceColor::Magenta,
            PieceKind::S => PieceColor::Green,
            PieceKind::Z => PieceColor::Red,
            PieceKind::L => PieceColor::Orange,
            PieceKind::J => PieceColor::Blue,
        }
    }

    /// Side length of the bounding square the piece rotates in.
    #[must_use]
    pub const fn size(self) -> i32 {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            PieceKind::T | PieceKind::S | PieceKind::Z | PieceKind::L | PieceKind::J => 3,
        }
    }

    /// Local cells of the piece in its spawn orientation.
    #[must_use]
    pub const fn spawn_cells(self) -> [Coordinate; 4] {
        SPAWN_CELLS[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('L'), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            _ => None,
        }
    }
}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c.to_ascii_uppercase()),
            _ => None,
        };
        kind.ok_or_else(|| ParsePieceKindError {
            input: s.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    Anticlockwise,
}

/// Rotates one local cell a quarter turn inside an `size`×`size` bounding square.
///
/// Clockwise maps `(x, y)` to `(y, size - 1 - x)`; anticlockwise is its inverse.
/// This is the only rotation rule: every piece kind goes through it with its
/// own bounding square size. For the 2×2 square the cell set is unchanged.
#[must_use]
pub const fn rotate_cell(cell: Coordinate, size: i32, direction: RotationDirection) -> Coordinate {
    let n = size - 1;
    match direction {
        RotationDirection::Clockwise => Coordinate::new(cell.y, n - cell.x),
        RotationDirection::Anticlockwise => Coordinate::new(n - cell.y, cell.x),
    }
}

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° anticlockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Option<Self> {
        if quarter_turns < 4 {
            Some(Self(quarter_turns))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => Self((self.0 + 1) % 4),
            RotationDirection::Anticlockwise => Self((self.0 + 3) % 4),
        }
    }
}

/// A piece shape in a given orientation, independent of board position.
///
/// Pieces are immutable; rotation returns a new `Piece`.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, PieceKind, RotationDirection};
///
/// let piece = Piece::new(PieceKind::T);
/// let turned = piece
///     .rotated(RotationDirection::Clockwise)
///     .rotated(RotationDirection::Anticlockwise);
/// assert_eq!(turned, piece);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    cells: [Coordinate; 4],
}

impl Piece {
    /// Creates a piece in its spawn orientation.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: PieceRotation(0),
            cells: kind.spawn_cells(),
        }
    }

    /// Creates a piece turned clockwise from its spawn orientation.
    #[must_use]
    pub fn with_rotation(kind: PieceKind, rotation: PieceRotation) -> Self {
        (0..rotation.quarter_turns()).fold(Self::new(kind), |piece, _| {
            piece.rotated(RotationDirection::Clockwise)
        })
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.kind.color()
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Occupied cells relative to the bottom-left of the bounding square.
    #[must_use]
    pub const fn cells(&self) -> &[Coordinate; 4] {
        &self.cells
    }

    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let size = self.kind.size();
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated(direction),
            cells: self.cells.map(|cell| rotate_cell(cell, size, direction)),
        }
    }

    /// Highest occupied local row.
    #[must_use]
    pub fn top(&self) -> i32 {
        self.cells.iter().map(|c| c.y).fold(0, i32::max)
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn cells_from_rows(size: usize, rows: [[bool; 4]; 4]) -> [Coordinate; 4] {
    let mut cells = [Coordinate::new(0, 0); 4];
    let mut n = 0;
    let mut row = 0;
    while row < size {
        let mut x = 0;
        while x < size {
            if rows[row][x] {
                cells[n] = Coordinate::new(x as i32, (size - 1 - row) as i32);
                n += 1;
            }
            x += 1;
        }
        row += 1;
    }
    assert!(n == 4);
    cells
}

// Rows are listed top to bottom.
const SPAWN_CELLS: [[Coordinate; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I-piece
        cells_from_rows(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        // O-piece
        cells_from_rows(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // T-piece
        cells_from_rows(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // S-piece
        cells_from_rows(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // Z-piece
        cells_from_rows(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // L-piece
        cells_from_rows(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // J-piece
        cells_from_rows(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(cells: &[Coordinate; 4]) -> Vec<Coordinate> {
        let mut cells = cells.to_vec();
        cells.sort();
        cells
    }

    fn is_connected(cells: &[Coordinate; 4]) -> bool {
        let mut reached = vec![cells[0]];
        let mut i = 0;
        while i < reached.len() {
            let c = reached[i];
            for n in cells {
                let adjacent = (c.x - n.x).abs() + (c.y - n.y).abs() == 1;
                if adjacent && !reached.contains(n) {
                    reached.push(*n);
                }
            }
            i += 1;
        }
        reached.len() == 4
    }

    #[test]
    fn test_spawn_cells_inside_bounding_square() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind);
            let size = kind.size();
            for cell in piece.cells() {
                assert!((0..size).contains(&cell.x), "{kind:?} {cell:?}");
                assert!((0..size).contains(&cell.y), "{kind:?} {cell:?}");
            }
            assert_eq!(sorted(piece.cells()).len(), 4);
            assert!(is_connected(piece.cells()), "{kind:?} not connected");
        }
    }

    #[test]
    fn test_four_clockwise_turns_is_identity() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind);
            let mut turned = piece;
            for _ in 0..4 {
                turned = turned.rotated(RotationDirection::Clockwise);
                assert!(is_connected(turned.cells()), "{kind:?} lost connectivity");
            }
            assert_eq!(sorted(turned.cells()), sorted(piece.cells()), "{kind:?}");
            assert_eq!(turned.rotation(), piece.rotation());
        }
    }

    #[test]
    fn test_clockwise_then_anticlockwise_is_identity() {
        for kind in PieceKind::ALL {
            let mut piece = Piece::new(kind);
            for _ in 0..4 {
                let back = piece
                    .rotated(RotationDirection::Clockwise)
                    .rotated(RotationDirection::Anticlockwise);
                assert_eq!(back.cells(), piece.cells(), "{kind:?}");
                let back = piece
                    .rotated(RotationDirection::Anticlockwise)
                    .rotated(RotationDirection::Clockwise);
                assert_eq!(back.cells(), piece.cells(), "{kind:?}");
                piece = piece.rotated(RotationDirection::Clockwise);
            }
        }
    }

    #[test]
    fn test_square_rotation_keeps_cells() {
        let piece = Piece::new(PieceKind::O);
        for direction in [RotationDirection::Clockwise, RotationDirection::Anticlockwise] {
            assert_eq!(sorted(piece.rotated(direction).cells()), sorted(piece.cells()));
        }
    }

    #[test]
    fn test_rotate_cell_three_by_three() {
        let c = Coordinate::new(0, 2);
        assert_eq!(rotate_cell(c, 3, RotationDirection::Clockwise), Coordinate::new(2, 2));
        assert_eq!(rotate_cell(c, 3, RotationDirection::Anticlockwise), Coordinate::new(0, 0));
        // Pivot stays put
        let pivot = Coordinate::new(1, 1);
        assert_eq!(rotate_cell(pivot, 3, RotationDirection::Clockwise), pivot);
    }

    #[test]
    fn test_ell_turns_upright() {
        let upright = Piece::new(PieceKind::L).rotated(RotationDirection::Clockwise);
        assert_eq!(
            sorted(upright.cells()),
            vec![
                Coordinate::new(1, 0),
                Coordinate::new(1, 1),
                Coordinate::new(1, 2),
                Coordinate::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_line_rotation_in_four_by_four() {
        let vertical = Piece::new(PieceKind::I).rotated(RotationDirection::Clockwise);
        assert!(vertical.cells().iter().all(|c| c.x == 2));
        let vertical = Piece::new(PieceKind::I).rotated(RotationDirection::Anticlockwise);
        assert!(vertical.cells().iter().all(|c| c.x == 1));
    }

    #[test]
    fn test_with_rotation_matches_repeated_turns() {
        for kind in PieceKind::ALL {
            let mut piece = Piece::new(kind);
            for turns in 0..4 {
                let rotation = PieceRotation::new(turns).unwrap();
                assert_eq!(Piece::with_rotation(kind, rotation), piece);
                piece = piece.rotated(RotationDirection::Clockwise);
            }
        }
        assert_eq!(PieceRotation::new(4), None);
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(kind.as_char().to_string().parse::<PieceKind>().unwrap(), kind);
        }
        assert_eq!("l".parse::<PieceKind>().unwrap(), PieceKind::L);
        assert!("X".parse::<PieceKind>().is_err());
        assert!("LL".parse::<PieceKind>().is_err());
        assert!("".parse::<PieceKind>().is_err());
    }

    #[test]
    fn test_each_kind_has_distinct_color() {
        let mut colors: Vec<_> = PieceKind::ALL.iter().map(|k| k.color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), PieceKind::LEN);
    }
}
