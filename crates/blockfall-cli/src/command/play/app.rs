use std::time::{Duration, Instant};

use blockfall_engine::{
    BagSupplier, GameEngine, MoveDirection, Outcome, RotationDirection, UserAction,
};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};
use tracing::debug;

use crate::{
    tui::{App, Runtime},
    ui::widgets::GameDisplay,
};

const FPS: f64 = 60.0;
const BASE_DROP_INTERVAL_MS: u64 = 1000;
const MIN_DROP_INTERVAL_MS: u64 = 100;
const DROP_INTERVAL_STEP_MS: u64 = 100;
const BLINK_INTERVAL_MS: u128 = 100;

/// Time between timer drops at `level`.
fn drop_interval(level: usize) -> Duration {
    let steps = u64::try_from(level.saturating_sub(1)).unwrap_or(u64::MAX);
    let millis = BASE_DROP_INTERVAL_MS
        .saturating_sub(steps.saturating_mul(DROP_INTERVAL_STEP_MS))
        .max(MIN_DROP_INTERVAL_MS);
    Duration::from_millis(millis)
}

fn key_action(code: KeyCode) -> Option<UserAction> {
    let action = match code {
        KeyCode::Left => UserAction::Move(MoveDirection::Left),
        KeyCode::Right => UserAction::Move(MoveDirection::Right),
        KeyCode::Down => UserAction::Move(MoveDirection::Down),
        KeyCode::Up => UserAction::DropToBottom,
        KeyCode::Char('z') => UserAction::Rotate(RotationDirection::Anticlockwise),
        KeyCode::Char('x') => UserAction::Rotate(RotationDirection::Clockwise),
        KeyCode::Char(' ') => UserAction::Hold,
        KeyCode::Char('p') => UserAction::TogglePause,
        _ => return None,
    };
    Some(action)
}

/// Drives a [`GameEngine`] from wall-clock time and keyboard input.
///
/// The engine itself has no notion of time; this app owns the drop timer and
/// the row-clear animation deadline.
#[derive(Debug)]
pub(crate) struct PlayApp {
    engine: GameEngine<BagSupplier>,
    start_level: usize,
    show_ghost: bool,
    clear_delay: Duration,
    last_drop: Instant,
    clear_started: Option<Instant>,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(
        supplier: BagSupplier,
        start_level: usize,
        show_ghost: bool,
        clear_delay: Duration,
    ) -> Self {
        Self {
            engine: GameEngine::new(supplier),
            start_level,
            show_ghost,
            clear_delay,
            last_drop: Instant::now(),
            clear_started: None,
            is_exiting: false,
        }
    }

    pub(crate) fn engine(&self) -> &GameEngine<BagSupplier> {
        &self.engine
    }

    /// Level used for the drop speed.
    fn speed_level(&self) -> usize {
        self.start_level
            .saturating_add(self.engine.scoring().level().saturating_sub(1))
    }

    fn apply(&mut self, outcome: Outcome<BagSupplier>, now: Instant) {
        match outcome {
            Outcome::NoChange => return,
            Outcome::Continue {
                engine,
                reset_timer_drop,
            } => {
                if reset_timer_drop {
                    self.last_drop = now;
                }
                self.engine = engine;
            }
            Outcome::RowBeingRemoved { engine } => {
                self.clear_started = Some(now);
                self.engine = engine;
            }
            Outcome::RowsRemoved {
                engine,
                cleared_lines,
            } => {
                debug!(cleared_lines, "row clear animation finished");
                self.last_drop = now;
                self.engine = engine;
            }
            Outcome::Paused { engine } | Outcome::GameOver { engine } => self.engine = engine,
        }
        if !self.engine.is_clearing_rows() {
            self.clear_started = None;
        }
    }

    fn is_blink_on(&self) -> bool {
        self.clear_started
            .is_some_and(|started| (started.elapsed().as_millis() / BLINK_INTERVAL_MS) % 2 == 0)
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(FPS));
        self.last_drop = Instant::now();
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_events(&mut self, _runtime: &mut Runtime, events: &[Event]) {
        let mut actions = Vec::new();
        for key in events.iter().filter_map(Event::as_key_press_event) {
            if key.code == KeyCode::Char('q') {
                self.is_exiting = true;
                return;
            }
            actions.extend(key_action(key.code));
        }
        if !actions.is_empty() {
            let outcome = self.engine.execute_user_actions(&actions);
            self.apply(outcome, Instant::now());
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let game_display =
            GameDisplay::new(&self.engine, self.show_ghost).blink_on(self.is_blink_on());
        let help_text = if self.engine.is_game_over() {
            "Controls: Q (Quit)"
        } else if self.engine.is_paused() {
            "Controls: P (Resume) | Q (Quit)"
        } else {
            "Controls: ← → (Move) | ↓ (Soft Drop) | ↑ (Hard Drop) | Z X (Rotate) | Space (Hold) | P (Pause) | Q (Quit)"
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(25), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(game_display, main_area);
        frame.render_widget(help_text, help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        let now = Instant::now();
        if let Some(started) = self.clear_started {
            if now.duration_since(started) >= self.clear_delay {
                let outcome = self.engine.on_row_removal_animation_complete();
                self.apply(outcome, now);
            }
            return;
        }
        if now.duration_since(self.last_drop) >= drop_interval(self.speed_level()) {
            self.last_drop = now;
            let outcome = self.engine.timer_drop();
            self.apply(outcome, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::PieceSeed;
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn app() -> PlayApp {
        let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
        PlayApp::new(
            BagSupplier::with_seed(seed),
            1,
            true,
            Duration::from_millis(300),
        )
    }

    fn key(c: KeyCode) -> Event {
        Event::Key(KeyEvent::new(c, KeyModifiers::NONE))
    }

    #[test]
    fn test_drop_interval_schedule() {
        assert_eq!(drop_interval(1), Duration::from_millis(1000));
        assert_eq!(drop_interval(2), Duration::from_millis(900));
        assert_eq!(drop_interval(9), Duration::from_millis(200));
        assert_eq!(drop_interval(10), Duration::from_millis(100));
        assert_eq!(drop_interval(30), Duration::from_millis(100));
        assert_eq!(drop_interval(usize::MAX), Duration::from_millis(100));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            key_action(KeyCode::Left),
            Some(UserAction::Move(MoveDirection::Left))
        );
        assert_eq!(key_action(KeyCode::Up), Some(UserAction::DropToBottom));
        assert_eq!(
            key_action(KeyCode::Char('x')),
            Some(UserAction::Rotate(RotationDirection::Clockwise))
        );
        assert_eq!(key_action(KeyCode::Char(' ')), Some(UserAction::Hold));
        assert_eq!(key_action(KeyCode::Char('q')), None);
        assert_eq!(key_action(KeyCode::Enter), None);
    }

    #[test]
    fn test_keys_in_one_poll_are_one_batch() {
        let mut app = app();
        let mut runtime = Runtime::default();
        let start = app.engine().falling_piece().unwrap().anchor();

        app.handle_events(&mut runtime, &[key(KeyCode::Left), key(KeyCode::Left)]);
        let moved = app.engine().falling_piece().unwrap().anchor();
        assert_eq!(moved.x, start.x - 2);
        assert_eq!(moved.y, start.y);
    }

    #[test]
    fn test_pause_and_quit() {
        let mut app = app();
        let mut runtime = Runtime::default();

        app.handle_events(&mut runtime, &[key(KeyCode::Char('p'))]);
        assert!(app.engine().is_paused());
        app.handle_events(&mut runtime, &[key(KeyCode::Left)]);
        assert!(app.engine().is_paused());
        app.handle_events(&mut runtime, &[key(KeyCode::Char('p'))]);
        assert!(!app.engine().is_paused());

        assert!(!app.should_exit());
        app.handle_events(&mut runtime, &[key(KeyCode::Char('q'))]);
        assert!(app.should_exit());
    }

    #[test]
    fn test_speed_level_follows_scoring() {
        let app = app();
        assert_eq!(app.speed_level(), 1);
        let faster = PlayApp {
            start_level: 5,
            ..app
        };
        assert_eq!(faster.speed_level(), 5);
        let fastest = PlayApp {
            start_level: usize::MAX,
            ..faster
        };
        assert_eq!(fastest.speed_level(), usize::MAX);
        assert_eq!(
            drop_interval(fastest.speed_level()),
            Duration::from_millis(MIN_DROP_INTERVAL_MS)
        );
    }
}
