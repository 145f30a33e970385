use std::iter;

use blockfall_engine::Scoring;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

pub struct StatsDisplay<'a> {
    scoring: &'a Scoring,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(scoring: &'a Scoring) -> Self {
        Self {
            scoring,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        ROWS.len() as u16 + super::block_vertical_margin(self.block.as_ref())
    }
}

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(fn(&Scoring) -> String),
    LabelValue(&'static str, fn(&Scoring) -> String),
}

const ROWS: &[Row] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(|scoring| scoring.points().to_string()),
    Row::Empty,
    Row::LabelValue("LEVEL:", |scoring| scoring.level().to_string()),
    Row::LabelValue("LINES:", |scoring| scoring.lines_cleared().to_string()),
    Row::LabelValue("PIECES:", |scoring| scoring.completed_pieces().to_string()),
    Row::Empty,
    Row::LabelValue("SINGLES:", |scoring| scoring.line_clear_counter()[0].to_string()),
    Row::LabelValue("DOUBLES:", |scoring| scoring.line_clear_counter()[1].to_string()),
    Row::LabelValue("TRIPLES:", |scoring| scoring.line_clear_counter()[2].to_string()),
    Row::LabelValue("TETRIS:", |scoring| scoring.line_clear_counter()[3].to_string()),
];

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;

        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(self.scoring), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(self.scoring), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}
