use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Runtime;

/// Trait for TUI applications.
///
/// Applications executed by `Runtime::run()` must implement this trait.
pub trait App {
    /// Initializes the application.
    ///
    /// Called at the start of `Runtime::run()`. Use this to configure the tick rate.
    fn init(&mut self, runtime: &mut Runtime);

    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles all terminal events that arrived in one poll cycle, oldest first.
    fn handle_events(&mut self, runtime: &mut Runtime, events: &[Event]);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);

    /// Advances time-driven logic (called on each tick).
    fn update(&mut self, runtime: &mut Runtime);
}
