use std::iter;

use blockfall_engine::{Board, Coordinate, RenderBlocks};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::ui::widgets::{BlockDisplay, CellView};

type CellGrid = [[CellView; Board::WIDTH]; Board::HEIGHT];

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    blocks: &'a RenderBlocks,
    ghost: &'a [Coordinate],
    clearing_rows: &'a [usize],
    blink_on: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(blocks: &'a RenderBlocks) -> Self {
        Self {
            blocks,
            ghost: &[],
            clearing_rows: &[],
            blink_on: false,
            block: None,
        }
    }

    pub fn ghost(self, ghost: &'a [Coordinate]) -> Self {
        Self { ghost, ..self }
    }

    /// Rows about to be removed, drawn blinking.
    pub fn clearing_rows(self, rows: &'a [usize], blink_on: bool) -> Self {
        Self {
            clearing_rows: rows,
            blink_on,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        Board::WIDTH as u16 * BlockDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        Board::HEIGHT as u16 * BlockDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Cells indexed by row from the bottom, then column.
    fn cells(&self) -> CellGrid {
        let mut grid = [[CellView::Empty; Board::WIDTH]; Board::HEIGHT];
        let mut put = |coord: Coordinate, cell: CellView| {
            if let (Ok(x), Ok(y)) = (usize::try_from(coord.x), usize::try_from(coord.y))
                && let Some(slot) = grid.get_mut(y).and_then(|row| row.get_mut(x))
            {
                *slot = cell;
            }
        };

        for &coord in self.ghost {
            put(coord, CellView::Ghost);
        }
        for &(coord, color) in &self.blocks.normal {
            put(coord, CellView::Block(color));
        }
        for &(coord, color) in &self.blocks.highlighted {
            put(coord, CellView::Landing(color));
        }
        if self.blink_on {
            for &y in self.clearing_rows {
                if let Some(row) = grid.get_mut(y) {
                    row.fill(CellView::Clearing);
                }
            }
        }
        grid
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..Board::WIDTH).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..Board::HEIGHT).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<{ Board::HEIGHT }>(&vertical)
            .into_iter()
            .map(|row| row.layout::<{ Board::WIDTH }>(&horizontal));

        // Screen rows run top-down, board rows bottom-up.
        let cells = self.cells();
        for (grid_row, row) in iter::zip(grid_cells, cells.iter().rev()) {
            for (grid_cell, cell) in iter::zip(grid_row, row) {
                BlockDisplay::from_cell(*cell, true).render(grid_cell, buf);
            }
        }
    }
}
