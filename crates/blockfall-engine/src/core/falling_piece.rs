use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    coordinate::Coordinate,
    piece::{Piece, PieceColor, PieceKind, PieceRotation, RotationDirection},
};

/// Direction of a single-cell move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Left,
    Right,
    Down,
}

/// Upper bound on sideways corrections while rotating.
///
/// The widest piece is 4 cells, so a rotated piece never sticks out of the
/// board by more than 2 columns.
const MAX_EDGE_SHIFTS: usize = 2;

/// A piece together with its position on the board.
///
/// The anchor is the bottom-left corner of the piece's bounding square in
/// board coordinates. It may lie outside the board as long as the occupied
/// cells do not.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, FallingPiece, MoveDirection, PieceKind};
///
/// let board = Board::empty();
/// let piece = FallingPiece::spawn(PieceKind::T);
/// let moved = piece.try_move(MoveDirection::Left, &board).unwrap();
/// assert_eq!(moved.anchor().x, piece.anchor().x - 1);
///
/// let landed = piece.landing_position(&board);
/// assert!(!landed.can_move_down(&board));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingPiece {
    piece: Piece,
    anchor: Coordinate,
}

impl FallingPiece {
    #[must_use]
    pub const fn new(piece: Piece, anchor: Coordinate) -> Self {
        Self { piece, anchor }
    }

    /// Places a fresh piece horizontally centered with its top row on the
    /// board's topmost row.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn spawn(kind: PieceKind) -> Self {
        let piece = Piece::new(kind);
        let width = Board::WIDTH as i32;
        let height = Board::HEIGHT as i32;
        let anchor = Coordinate::new((width - kind.size()) / 2, height - 1 - piece.top());
        Self { piece, anchor }
    }

    #[must_use]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub const fn anchor(&self) -> Coordinate {
        self.anchor
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.piece.kind()
    }

    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.piece.color()
    }

    /// Board coordinates of the piece's cells.
    #[must_use]
    pub fn absolute_cells(&self) -> [Coordinate; 4] {
        self.piece.cells().map(|cell| cell + self.anchor)
    }

    #[must_use]
    pub fn is_valid_position(&self, board: &Board) -> bool {
        board.are_cells_available(self.absolute_cells())
    }

    /// Shifts the piece one cell without checking the board.
    #[must_use]
    pub const fn moved(&self, direction: MoveDirection) -> Self {
        let anchor = match direction {
            MoveDirection::Left => self.anchor.left(),
            MoveDirection::Right => self.anchor.right(),
            MoveDirection::Down => self.anchor.down(),
        };
        Self {
            piece: self.piece,
            anchor,
        }
    }

    /// Shifts the piece one cell, or returns `None` if the target is blocked.
    #[must_use]
    pub fn try_move(&self, direction: MoveDirection, board: &Board) -> Option<Self> {
        let moved = self.moved(direction);
        moved.is_valid_position(board).then_some(moved)
    }

    #[must_use]
    pub fn can_move_down(&self, board: &Board) -> bool {
        self.try_move(MoveDirection::Down, board).is_some()
    }

    /// Rotates the piece a quarter turn around its bounding square.
    ///
    /// While any rotated cell is left of the board the piece is pushed one
    /// column right, and while any is right of the board it is pushed one
    /// column left. The corrected position must then be free, otherwise the
    /// rotation is rejected and `None` is returned. A rotation that leaves
    /// the occupied cells as they were, as for the O piece, is also `None`.
    #[must_use]
    pub fn try_rotate(&self, direction: RotationDirection, board: &Board) -> Option<Self> {
        let mut rotated = Self {
            piece: self.piece.rotated(direction),
            anchor: self.anchor,
        };
        for _ in 0..=MAX_EDGE_SHIFTS {
            match rotated.edge_overflow() {
                Some(direction) => rotated = rotated.moved(direction),
                None => {
                    let cells = self.absolute_cells();
                    let unchanged = rotated.absolute_cells().iter().all(|c| cells.contains(c));
                    return (!unchanged && rotated.is_valid_position(board)).then_some(rotated);
                }
            }
        }
        None
    }

    /// Which way the piece has to be pushed to get back within the side walls.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn edge_overflow(&self) -> Option<MoveDirection> {
        let cells = self.absolute_cells();
        if cells.iter().any(|c| c.x < 0) {
            Some(MoveDirection::Right)
        } else if cells.iter().any(|c| c.x >= Board::WIDTH as i32) {
            Some(MoveDirection::Left)
        } else {
            None
        }
    }

    /// Returns the lowest position reachable by moving straight down.
    ///
    /// Returns `self` unchanged if it cannot move down at all.
    #[must_use]
    pub fn landing_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while let Some(piece) = dropped.try_move(MoveDirection::Down, board) {
            dropped = piece;
        }
        dropped
    }
}

impl Serialize for FallingPiece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "L#1@3,-1")
        let s = format!(
            "{}#{}@{},{}",
            self.kind().as_char(),
            self.piece.rotation().quarter_turns(),
            self.anchor.x,
            self.anchor.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for FallingPiece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            serde::de::Error::custom(format!("expected format 'kind#rotation@x,y', got '{s}'"))
        })?;
        let kind = kind_str
            .parse::<PieceKind>()
            .map_err(serde::de::Error::custom)?;

        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            serde::de::Error::custom(format!("missing '@' in format 'kind#rotation@x,y', got '{s}'"))
        })?;
        let rotation = rotation_str
            .parse::<u8>()
            .ok()
            .and_then(PieceRotation::new)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("rotation must be 0-3, got '{rotation_str}'"))
            })?;

        let (x_str, y_str) = position_str.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!("missing ',' in format 'kind#rotation@x,y', got '{s}'"))
        })?;
        let x = x_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(Self {
            piece: Piece::with_rotation(kind, rotation),
            anchor: Coordinate::new(x, y),
        })
    }
}
