use arrayvec::ArrayVec;

use super::{coordinate::Coordinate, piece::PieceColor};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum Block {
    /// No settled block.
    #[default]
    Empty,
    /// A settled block left behind by a landed piece.
    Occupied(PieceColor),
}

/// Row indexes of a board, lowest first.
pub type RowIndexes = ArrayVec<usize, { Board::HEIGHT }>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardRow {
    cells: [Block; Board::WIDTH],
}

impl BoardRow {
    const EMPTY: Self = Self {
        cells: [Block::Empty; Board::WIDTH],
    };

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| b.is_occupied())
    }
}

/// The settled blocks of a game.
///
/// The board never contains the falling piece: cells are written only when a
/// piece lands. Every operation that changes the board returns a new value and
/// leaves `self` untouched.
///
/// Row `0` is the bottom row and column `0` the leftmost column. Coordinates
/// outside `[0, WIDTH) × [0, HEIGHT)` are never available and are silently
/// skipped when appending.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Coordinate, PieceColor};
///
/// let cells = (0..10).map(|x| Coordinate::new(x, 0));
/// let board = Board::empty().append(PieceColor::Cyan, cells);
///
/// assert_eq!(board.completed_rows().as_slice(), &[0]);
/// let board = board.remove_rows(&board.completed_rows());
/// assert_eq!(board.occupied_cells().count(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; Board::HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub const WIDTH: usize = 10;
    pub const HEIGHT: usize = 20;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; Board::HEIGHT],
    };

    #[must_use]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    fn index(coord: Coordinate) -> Option<(usize, usize)> {
        let x = usize::try_from(coord.x).ok().filter(|x| *x < Self::WIDTH)?;
        let y = usize::try_from(coord.y).ok().filter(|y| *y < Self::HEIGHT)?;
        Some((x, y))
    }

    /// Returns the block at `coord`, or `None` when it lies outside the board.
    #[must_use]
    pub fn block_at(&self, coord: Coordinate) -> Option<Block> {
        let (x, y) = Self::index(coord)?;
        Some(self.rows[y].cells[x])
    }

    /// Returns an iterator over the rows from bottom to top.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Block; Board::WIDTH]> {
        self.rows.iter().map(|row| &row.cells)
    }

    /// Returns every settled block with its position, bottom row first.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Coordinate, PieceColor)> + '_ {
        (0..).zip(&self.rows).flat_map(|(y, row)| {
            (0..).zip(&row.cells).filter_map(move |(x, block)| match block {
                Block::Empty => None,
                Block::Occupied(color) => Some((Coordinate::new(x, y), *color)),
            })
        })
    }

    /// Returns `true` if every coordinate is inside the board and empty.
    pub fn are_cells_available<I>(&self, coords: I) -> bool
    where
        I: IntoIterator<Item = Coordinate>,
    {
        coords
            .into_iter()
            .all(|coord| self.block_at(coord).is_some_and(|b| b.is_empty()))
    }

    /// Returns a board with every in-range coordinate set to `color`.
    ///
    /// Availability is not checked and completed rows are not cleared.
    #[must_use]
    pub fn append<I>(&self, color: PieceColor, coords: I) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut board = *self;
        for (x, y) in coords.into_iter().filter_map(Self::index) {
            board.rows[y].cells[x] = Block::Occupied(color);
        }
        board
    }

    /// Returns the indexes of fully occupied rows in ascending order.
    #[must_use]
    pub fn completed_rows(&self) -> RowIndexes {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_filled())
            .map(|(y, _)| y)
            .collect()
    }

    /// Returns a board with the given rows deleted.
    ///
    /// Remaining rows keep their relative order and drop down to fill the
    /// gaps; one empty row is added at the top for every row removed.
    /// Out-of-range and duplicate indexes are ignored.
    #[must_use]
    pub fn remove_rows(&self, row_indexes: &[usize]) -> Self {
        let mut board = Self::EMPTY;
        let kept = self
            .rows
            .iter()
            .enumerate()
            .filter(|(y, _)| !row_indexes.contains(y))
            .map(|(_, row)| *row);
        for (dst, row) in board.rows.iter_mut().zip(kept) {
            *dst = row;
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &Board, y: i32, color: PieceColor) -> Board {
        board.append(color, (0..10).map(|x| Coordinate::new(x, y)))
    }

    #[test]
    fn test_empty_board() {
        let board = Board::empty();
        assert_eq!(board.occupied_cells().count(), 0);
        assert!(board.completed_rows().is_empty());
        for row in board.rows() {
            assert!(row.iter().all(|b| b.is_empty()));
        }
    }

    #[test]
    fn test_cells_outside_board_are_unavailable() {
        let board = Board::empty();
        assert!(board.are_cells_available([Coordinate::new(0, 0), Coordinate::new(9, 19)]));
        assert!(board.are_cells_available([]));

        for coord in [
            Coordinate::new(-1, 0),
            Coordinate::new(10, 0),
            Coordinate::new(0, -1),
            Coordinate::new(0, 20),
            Coordinate::new(-5, 30),
        ] {
            assert!(!board.are_cells_available([coord]), "{coord:?} should be unavailable");
        }
    }

    #[test]
    fn test_occupied_cells_are_unavailable() {
        let board = Board::empty().append(PieceColor::Red, [Coordinate::new(4, 7)]);
        assert!(!board.are_cells_available([Coordinate::new(4, 7)]));
        assert!(!board.are_cells_available([Coordinate::new(3, 7), Coordinate::new(4, 7)]));
        assert!(board.are_cells_available([Coordinate::new(3, 7), Coordinate::new(4, 8)]));
    }

    #[test]
    fn test_append_ignores_out_of_range() {
        let board = Board::empty().append(
            PieceColor::Blue,
            [Coordinate::new(-1, 0), Coordinate::new(0, 0), Coordinate::new(0, 20)],
        );
        let cells: Vec<_> = board.occupied_cells().collect();
        assert_eq!(cells, vec![(Coordinate::new(0, 0), PieceColor::Blue)]);
    }

    #[test]
    fn test_append_does_not_modify_original() {
        let board = Board::empty();
        let appended = board.append(PieceColor::Green, [Coordinate::new(2, 3)]);
        assert_eq!(board, Board::empty());
        assert_eq!(
            appended.block_at(Coordinate::new(2, 3)),
            Some(Block::Occupied(PieceColor::Green))
        );
    }

    #[test]
    fn test_completed_rows_ascending() {
        let mut board = Board::empty();
        for y in [7, 0, 3] {
            board = fill_row(&board, y, PieceColor::Cyan);
        }
        // Almost complete row
        board = board.append(PieceColor::Cyan, (0..9).map(|x| Coordinate::new(x, 5)));

        assert_eq!(board.completed_rows().as_slice(), &[0, 3, 7]);
    }

    #[test]
    fn test_remove_rows_keeps_relative_order() {
        let mut board = Board::empty();
        board = fill_row(&board, 0, PieceColor::Cyan);
        board = board.append(PieceColor::Red, [Coordinate::new(1, 1)]);
        board = fill_row(&board, 2, PieceColor::Cyan);
        board = board.append(PieceColor::Green, [Coordinate::new(2, 3)]);
        board = board.append(PieceColor::Blue, [Coordinate::new(3, 19)]);

        let cleared = board.remove_rows(&[0, 2]);

        let mut cells: Vec<_> = cleared.occupied_cells().collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                (Coordinate::new(1, 0), PieceColor::Red),
                (Coordinate::new(2, 1), PieceColor::Green),
                (Coordinate::new(3, 17), PieceColor::Blue),
            ]
        );
        for row in cleared.rows().rev().take(2) {
            assert!(row.iter().all(|b| b.is_empty()));
        }
    }

    #[test]
    fn test_remove_rows_bottom_row_only() {
        let mut board = fill_row(&Board::empty(), 0, PieceColor::Orange);
        board = board.append(PieceColor::Magenta, [Coordinate::new(5, 1), Coordinate::new(5, 2)]);

        let cleared = board.remove_rows(&board.completed_rows());
        let mut cells: Vec<_> = cleared.occupied_cells().collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                (Coordinate::new(5, 0), PieceColor::Magenta),
                (Coordinate::new(5, 1), PieceColor::Magenta),
            ]
        );
    }

    #[test]
    fn test_remove_rows_ignores_invalid_indexes() {
        let board = fill_row(&Board::empty(), 4, PieceColor::Yellow);
        assert_eq!(board.remove_rows(&[]), board);
        assert_eq!(board.remove_rows(&[20, 100]), board);
        assert_eq!(board.remove_rows(&[4, 4]).occupied_cells().count(), 0);
    }

    #[test]
    fn test_remove_all_rows() {
        let mut board = Board::empty();
        for y in 0..20 {
            board = fill_row(&board, y, PieceColor::Cyan);
        }
        assert_eq!(board.completed_rows().len(), Board::HEIGHT);
        assert_eq!(board.remove_rows(&board.completed_rows()), Board::empty());
    }
}
