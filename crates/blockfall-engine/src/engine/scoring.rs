use serde::{Deserialize, Serialize};

/// Base points for clearing 0, 1, 2, 3 and 4-or-more lines at once.
const LINE_CLEAR_POINTS: [usize; 5] = [0, 40, 100, 300, 1200];

/// Lines needed to advance one level.
const LINES_PER_LEVEL: usize = 10;

/// Base points for a single clear of `cleared_lines` rows, before the level
/// multiplier.
#[must_use]
pub fn line_clear_points(cleared_lines: usize) -> usize {
    LINE_CLEAR_POINTS[cleared_lines.min(LINE_CLEAR_POINTS.len() - 1)]
}

/// Points, level and line counters of a game.
///
/// `Scoring` is a plain value: every update returns a new one.
///
/// # Scoring
///
/// A clear of `n` rows is worth `line_clear_points(n) × level`, using the
/// level before the clear. The level starts at 1 and goes up by one every 10
/// cleared lines.
///
/// # Example
///
/// ```
/// use blockfall_engine::Scoring;
///
/// let scoring = Scoring::new().plus_removed_lines(4);
///
/// assert_eq!(scoring.points(), 1200);
/// assert_eq!(scoring.lines_cleared(), 4);
/// assert_eq!(scoring.level(), 1);
/// assert_eq!(scoring.line_clear_counter()[3], 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Scoring {
    points: usize,
    level: usize,
    lines_cleared: usize,
    completed_pieces: usize,
    line_clear_counter: [usize; 4],
}

impl Default for Scoring {
    fn default() -> Self {
        Self::new()
    }
}

impl Scoring {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines_cleared: 0,
            completed_pieces: 0,
            line_clear_counter: [0; 4],
        }
    }

    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Total number of lines cleared so far.
    #[must_use]
    pub const fn lines_cleared(&self) -> usize {
        self.lines_cleared
    }

    /// Number of pieces that have landed.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns a histogram of clears by size.
    ///
    /// Array indices represent:
    /// - `[0]`: singles
    /// - `[1]`: doubles
    /// - `[2]`: triples
    /// - `[3]`: four or more lines
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[usize; 4] {
        &self.line_clear_counter
    }

    /// Adds the result of one clear of `cleared_lines` rows.
    #[must_use]
    pub fn plus_removed_lines(&self, cleared_lines: usize) -> Self {
        let mut next = *self;
        if cleared_lines == 0 {
            return next;
        }
        next.points += line_clear_points(cleared_lines) * self.level;
        next.lines_cleared += cleared_lines;
        next.level = (next.lines_cleared + 1).div_ceil(LINES_PER_LEVEL);
        next.line_clear_counter[(cleared_lines - 1).min(3)] += 1;
        next
    }

    /// Counts one more landed piece.
    #[must_use]
    pub const fn plus_landed_piece(&self) -> Self {
        let mut next = *self;
        next.completed_pieces += 1;
        next
    }
}
