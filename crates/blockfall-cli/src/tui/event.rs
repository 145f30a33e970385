use crossterm::event::Event as CrosstermEvent;

/// Events processed by TUI applications.
#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    /// Time-driven update (based on the tick interval).
    Tick,
    /// Screen render timing.
    Render,
    /// Terminal events read in the same poll cycle.
    #[from]
    Crossterm(Vec<CrosstermEvent>),
}
