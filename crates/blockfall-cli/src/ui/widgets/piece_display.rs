use blockfall_engine::{Coordinate, Piece, PieceKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{BlockDisplay, CellView};

/// Shows one piece in its spawn orientation, as in the NEXT and HOLD panels.
#[derive(Debug, Default)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    dimmed: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    /// Draws the piece as a ghost outline instead of solid blocks.
    pub fn dimmed(self, dimmed: bool) -> Self {
        Self { dimmed, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Cells of the spawn shape shifted to start at `(0, 0)`, with its size.
fn normalized_cells(kind: PieceKind) -> ([Coordinate; 4], (u16, u16)) {
    let cells = *Piece::new(kind).cells();
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let cells = cells.map(|c| Coordinate::new(c.x - min_x, c.y - min_y));
    let extent = |f: fn(&Coordinate) -> i32| {
        cells
            .iter()
            .map(f)
            .max()
            .map_or(0, |max| u16::try_from(max + 1).unwrap_or(0))
    };
    let size = (extent(|c| c.x), extent(|c| c.y));
    (cells, size)
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(kind) = self.piece else {
            return;
        };
        let (cells, (width, height)) = normalized_cells(kind);
        let piece_area = area.centered(
            Constraint::Length(width * BlockDisplay::width()),
            Constraint::Length(height * BlockDisplay::height()),
        );

        let col_constraints = (0..width).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..height).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let occupied = if self.dimmed {
            CellView::Ghost
        } else {
            CellView::Block(kind.color())
        };
        let occupied_block = BlockDisplay::from_cell(occupied, false);
        let empty_block = BlockDisplay::from_cell(CellView::Empty, false);
        for (row, grid_row) in grid_rows.enumerate() {
            // Screen rows run top-down.
            let y = i32::from(height) - 1 - i32::try_from(row).unwrap_or(0);
            for (x, grid_cell) in grid_row.into_iter().enumerate() {
                let x = i32::try_from(x).unwrap_or(0);
                if cells.contains(&Coordinate::new(x, y)) {
                    Widget::render(&occupied_block, grid_cell, buf);
                } else {
                    Widget::render(&empty_block, grid_cell, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_cells_fit_panel() {
        for kind in PieceKind::ALL {
            let (cells, (width, height)) = normalized_cells(kind);
            assert!(width <= 4 && height <= 2, "{kind:?}");
            assert!(cells.iter().all(|c| c.x >= 0 && c.y >= 0));
        }
    }

    #[test]
    fn test_normalized_line_piece() {
        let (cells, size) = normalized_cells(PieceKind::I);
        assert_eq!(size, (4, 1));
        assert!(cells.iter().all(|c| c.y == 0));
    }
}
