use blockfall_engine::GameEngine;
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Whole game screen: hold panel and stats, board, next piece.
#[derive(Debug)]
pub struct GameDisplay<'a, S> {
    engine: &'a GameEngine<S>,
    show_ghost: bool,
    blink_on: bool,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a, S> GameDisplay<'a, S> {
    pub fn new(engine: &'a GameEngine<S>, show_ghost: bool) -> Self {
        Self {
            engine,
            show_ghost,
            blink_on: false,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    pub fn blink_on(self, blink_on: bool) -> Self {
        Self { blink_on, ..self }
    }

    fn border_color(&self) -> Color {
        if self.engine.is_game_over() {
            color::RED
        } else if self.engine.is_paused() {
            color::YELLOW
        } else {
            color::WHITE
        }
    }

    fn panel(&self, title: &'static str) -> Block<'static> {
        Block::bordered()
            .title(Line::from(title).centered())
            .padding(Padding::symmetric(
                self.horizontal_padding,
                self.vertical_padding,
            ))
            .border_style(self.border_color())
            .style(style::DEFAULT)
    }
}

impl<S> Widget for GameDisplay<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl<S> Widget for &GameDisplay<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let blocks = self.engine.blocks();
        let ghost = self
            .show_ghost
            .then(|| self.engine.landing_preview())
            .unwrap_or_default();

        let game_board = BoardDisplay::new(&blocks)
            .ghost(&ghost)
            .clearing_rows(self.engine.rows_being_removed(), self.blink_on)
            .block(
                Block::bordered()
                    .border_style(self.border_color())
                    .style(style::DEFAULT),
            );
        let hold_panel = {
            let panel = PieceDisplay::new().block(self.panel("HOLD"));
            match self.engine.held_piece() {
                Some(held) => panel.piece(held.kind()).dimmed(!held.swap_allowed()),
                None => panel,
            }
        };
        let next_panel = PieceDisplay::new()
            .piece(self.engine.next_piece())
            .block(self.panel("NEXT"));
        let stats = StatsDisplay::new(self.engine.scoring()).block(self.panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(hold_panel.width(), stats.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area, stats_area] = Layout::vertical([
            Constraint::Length(hold_panel.height()),
            Constraint::Length(stats.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let hold_area = hold_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(hold_panel.width())]).flex(Flex::End),
        )[0];
        let stats_area = stats_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(stats.width())]).flex(Flex::End),
        )[0];

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        let popup = if self.engine.is_game_over() {
            Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
        } else if self.engine.is_paused() {
            Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
        } else {
            None
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
