use arrayvec::ArrayVec;
use tracing::{debug, info, trace};

use crate::core::{
    board::{Board, RowIndexes},
    coordinate::Coordinate,
    falling_piece::{FallingPiece, MoveDirection},
    piece::{PieceColor, PieceKind, RotationDirection},
};

use super::{piece_supplier::PieceSupplier, scoring::Scoring};

/// An input the player can give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    Move(MoveDirection),
    Rotate(RotationDirection),
    DropToBottom,
    Hold,
    TogglePause,
}

/// The piece set aside with the hold action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldPiece {
    kind: PieceKind,
    swap_allowed: bool,
}

impl HeldPiece {
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Whether the held piece may be swapped back in.
    ///
    /// This is `false` from the moment a piece is put on hold until the next
    /// piece lands.
    #[must_use]
    pub const fn swap_allowed(&self) -> bool {
        self.swap_allowed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GameState {
    Regular {
        falling_piece: FallingPiece,
    },
    ClearingRows {
        completed_rows: RowIndexes,
        next_falling_piece: FallingPiece,
    },
    Paused {
        falling_piece: FallingPiece,
    },
    GameOver,
}

/// What an engine operation did.
///
/// Every variant except `NoChange` carries the engine to use from now on.
/// On `NoChange` the caller keeps the engine it already has.
#[derive(Debug, Clone, derive_more::IsVariant)]
pub enum Outcome<S> {
    /// The event was ignored or rejected.
    NoChange,
    /// Play goes on. If `reset_timer_drop` is set, the caller restarts its
    /// drop timer from zero.
    Continue {
        engine: GameEngine<S>,
        reset_timer_drop: bool,
    },
    /// A landing completed one or more rows. They stay on the board until
    /// [`GameEngine::on_row_removal_animation_complete`] is called.
    RowBeingRemoved { engine: GameEngine<S> },
    /// Completed rows were removed and scored.
    RowsRemoved {
        engine: GameEngine<S>,
        cleared_lines: usize,
    },
    Paused { engine: GameEngine<S> },
    /// A new piece could not be placed. The engine keeps its final board.
    GameOver { engine: GameEngine<S> },
}

impl<S> Outcome<S> {
    /// The engine carried by this outcome, if any.
    #[must_use]
    pub fn engine(&self) -> Option<&GameEngine<S>> {
        match self {
            Outcome::NoChange => None,
            Outcome::Continue { engine, .. }
            | Outcome::RowBeingRemoved { engine }
            | Outcome::RowsRemoved { engine, .. }
            | Outcome::Paused { engine }
            | Outcome::GameOver { engine } => Some(engine),
        }
    }

    #[must_use]
    pub fn into_engine(self) -> Option<GameEngine<S>> {
        match self {
            Outcome::NoChange => None,
            Outcome::Continue { engine, .. }
            | Outcome::RowBeingRemoved { engine }
            | Outcome::RowsRemoved { engine, .. }
            | Outcome::Paused { engine }
            | Outcome::GameOver { engine } => Some(engine),
        }
    }
}

/// Blocks to draw, split by whether they are about to land.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderBlocks {
    /// Settled blocks, plus the falling piece while it can still move down.
    pub normal: Vec<(Coordinate, PieceColor)>,
    /// The falling piece once it rests on something.
    pub highlighted: Vec<(Coordinate, PieceColor)>,
}

/// The game state machine.
///
/// A `GameEngine` is an immutable value. Each operation returns an
/// [`Outcome`] holding the engine to continue with, so an engine can be kept
/// as a snapshot, compared or replayed freely. It never reads the clock and
/// never draws random numbers itself: new pieces come from the
/// [`PieceSupplier`] it was created with.
///
/// # Example
///
/// ```
/// use blockfall_engine::{
///     GameEngine, MoveDirection, Outcome, PieceKind, SequenceSupplier, UserAction,
/// };
///
/// let supplier = SequenceSupplier::new([PieceKind::T, PieceKind::O]).unwrap();
/// let engine = GameEngine::new(supplier);
///
/// let Outcome::Continue { engine, reset_timer_drop } =
///     engine.execute_user_actions(&[UserAction::Move(MoveDirection::Left)])
/// else {
///     panic!("moving left on an empty board always works");
/// };
/// assert!(!reset_timer_drop);
///
/// let outcome = engine.timer_drop();
/// assert!(outcome.is_continue());
/// ```
#[derive(Debug, Clone)]
pub struct GameEngine<S> {
    board: Board,
    state: GameState,
    next_piece: PieceKind,
    held: Option<HeldPiece>,
    scoring: Scoring,
    supplier: S,
}

impl<S> GameEngine<S> {
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    #[must_use]
    pub fn supplier(&self) -> &S {
        &self.supplier
    }

    /// The piece that will spawn after the current one.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next_piece
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<HeldPiece> {
        self.held
    }

    /// The piece under player control, if play is running or paused.
    #[must_use]
    pub fn falling_piece(&self) -> Option<&FallingPiece> {
        match &self.state {
            GameState::Regular { falling_piece } | GameState::Paused { falling_piece } => {
                Some(falling_piece)
            }
            GameState::ClearingRows { .. } | GameState::GameOver => None,
        }
    }

    /// Rows waiting for [`Self::on_row_removal_animation_complete`], lowest first.
    #[must_use]
    pub fn rows_being_removed(&self) -> &[usize] {
        match &self.state {
            GameState::ClearingRows { completed_rows, .. } => completed_rows,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, GameState::Paused { .. })
    }

    #[must_use]
    pub fn is_clearing_rows(&self) -> bool {
        matches!(self.state, GameState::ClearingRows { .. })
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self.state, GameState::GameOver)
    }

    /// Settled blocks and falling-piece blocks, ready for drawing.
    #[must_use]
    pub fn blocks(&self) -> RenderBlocks {
        let mut blocks = RenderBlocks {
            normal: self.board.occupied_cells().collect(),
            highlighted: Vec::new(),
        };
        if let Some(piece) = self.falling_piece() {
            let cells = piece.absolute_cells().map(|cell| (cell, piece.color()));
            if piece.can_move_down(&self.board) {
                blocks.normal.extend(cells);
            } else {
                blocks.highlighted.extend(cells);
            }
        }
        blocks
    }

    /// Where the falling piece would land if dropped now.
    ///
    /// Empty when there is no falling piece or it already rests on something.
    #[must_use]
    pub fn landing_preview(&self) -> ArrayVec<Coordinate, 4> {
        let Some(piece) = self.falling_piece() else {
            return ArrayVec::new();
        };
        let landed = piece.landing_position(&self.board);
        if landed == *piece {
            return ArrayVec::new();
        }
        landed.absolute_cells().into_iter().collect()
    }
}

impl<S> GameEngine<S>
where
    S: PieceSupplier,
{
    /// Starts a game on an empty board.
    ///
    /// Draws two pieces: the first one starts falling, the second one is shown
    /// as the next piece.
    #[must_use]
    pub fn new(supplier: S) -> Self {
        let (first, supplier) = supplier.next_piece();
        let (next_piece, supplier) = supplier.next_piece();
        debug!(first = ?first, next = ?next_piece, "new game");
        Self {
            board: Board::empty(),
            state: GameState::Regular {
                falling_piece: FallingPiece::spawn(first),
            },
            next_piece,
            held: None,
            scoring: Scoring::new(),
            supplier,
        }
    }

    fn with_state(&self, state: GameState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Moves the falling piece one row down, landing it if it is blocked.
    ///
    /// Only acts during regular play.
    #[must_use]
    pub fn timer_drop(&self) -> Outcome<S> {
        let GameState::Regular { falling_piece } = self.state else {
            return Outcome::NoChange;
        };
        match falling_piece.try_move(MoveDirection::Down, &self.board) {
            Some(moved) => Outcome::Continue {
                engine: self.with_state(GameState::Regular {
                    falling_piece: moved,
                }),
                reset_timer_drop: false,
            },
            None => self.land(falling_piece, false),
        }
    }

    /// Applies a batch of simultaneous player inputs.
    ///
    /// At most one kind of input is processed per call, by precedence:
    ///
    /// 1. `TogglePause` (all other inputs are dropped)
    /// 2. `Hold`
    /// 3. `DropToBottom`
    /// 4. Moves and rotations, applied left to right, each starting from the
    ///    position the previous one produced. Invalid ones are skipped.
    ///
    /// Apart from `TogglePause`, inputs are only accepted during regular play.
    #[must_use]
    pub fn execute_user_actions(&self, actions: &[UserAction]) -> Outcome<S> {
        if actions.contains(&UserAction::TogglePause) {
            return self.toggle_pause();
        }
        let GameState::Regular { falling_piece } = self.state else {
            trace!(?actions, "actions ignored outside regular play");
            return Outcome::NoChange;
        };
        if actions.contains(&UserAction::Hold) {
            return self.hold(falling_piece);
        }
        if actions.contains(&UserAction::DropToBottom) {
            return self.land(falling_piece.landing_position(&self.board), true);
        }

        let mut piece = falling_piece;
        let mut changed = false;
        for action in actions {
            let next = match *action {
                UserAction::Move(direction) => piece.try_move(direction, &self.board),
                UserAction::Rotate(direction) => piece.try_rotate(direction, &self.board),
                UserAction::DropToBottom | UserAction::Hold | UserAction::TogglePause => None,
            };
            if let Some(next) = next {
                piece = next;
                changed = true;
            }
        }
        if !changed {
            trace!(?actions, "no action applicable");
            return Outcome::NoChange;
        }
        Outcome::Continue {
            engine: self.with_state(GameState::Regular {
                falling_piece: piece,
            }),
            reset_timer_drop: piece.anchor().y != falling_piece.anchor().y,
        }
    }

    /// Pauses regular play or resumes paused play.
    ///
    /// While rows are being cleared, the clear is finished first and the
    /// resulting game is paused.
    #[must_use]
    pub fn toggle_pause(&self) -> Outcome<S> {
        match &self.state {
            GameState::Regular { falling_piece } => {
                debug!("paused");
                Outcome::Paused {
                    engine: self.with_state(GameState::Paused {
                        falling_piece: *falling_piece,
                    }),
                }
            }
            GameState::Paused { falling_piece } => {
                debug!("resumed");
                Outcome::Continue {
                    engine: self.with_state(GameState::Regular {
                        falling_piece: *falling_piece,
                    }),
                    reset_timer_drop: true,
                }
            }
            GameState::ClearingRows { .. } => match self.on_row_removal_animation_complete() {
                Outcome::RowsRemoved { engine, .. } => engine.toggle_pause(),
                outcome => outcome,
            },
            GameState::GameOver => Outcome::NoChange,
        }
    }

    /// Removes the rows recorded by the last landing and scores them.
    ///
    /// Outside of a row clear this does nothing.
    #[must_use]
    pub fn on_row_removal_animation_complete(&self) -> Outcome<S> {
        let GameState::ClearingRows {
            completed_rows,
            next_falling_piece,
        } = &self.state
        else {
            return Outcome::NoChange;
        };
        let cleared_lines = completed_rows.len();
        let board = self.board.remove_rows(completed_rows);
        let scoring = self.scoring.plus_removed_lines(cleared_lines);
        debug!(
            cleared_lines,
            points = scoring.points(),
            level = scoring.level(),
            "rows removed"
        );

        if !next_falling_piece.is_valid_position(&board) {
            info!(points = scoring.points(), "game over");
            return Outcome::GameOver {
                engine: Self {
                    board,
                    state: GameState::GameOver,
                    scoring,
                    ..self.clone()
                },
            };
        }
        Outcome::RowsRemoved {
            engine: Self {
                board,
                state: GameState::Regular {
                    falling_piece: *next_falling_piece,
                },
                scoring,
                ..self.clone()
            },
            cleared_lines,
        }
    }

    fn hold(&self, falling_piece: FallingPiece) -> Outcome<S> {
        let incoming = match self.held {
            None => self.next_piece,
            Some(held) if held.swap_allowed => held.kind,
            Some(_) => {
                trace!("hold already used for this piece");
                return Outcome::NoChange;
            }
        };
        let spawned = FallingPiece::spawn(incoming);
        if !spawned.is_valid_position(&self.board) {
            trace!(kind = ?incoming, "held piece does not fit");
            return Outcome::NoChange;
        }

        let (next_piece, supplier) = if self.held.is_none() {
            self.supplier.next_piece()
        } else {
            (self.next_piece, self.supplier.clone())
        };
        debug!(held = ?falling_piece.kind(), incoming = ?incoming, "hold");
        Outcome::Continue {
            engine: Self {
                board: self.board,
                state: GameState::Regular {
                    falling_piece: spawned,
                },
                next_piece,
                held: Some(HeldPiece {
                    kind: falling_piece.kind(),
                    swap_allowed: false,
                }),
                scoring: self.scoring,
                supplier,
            },
            reset_timer_drop: true,
        }
    }

    /// Writes `piece` into the board and brings in the next piece.
    fn land(&self, piece: FallingPiece, reset_timer_drop: bool) -> Outcome<S> {
        let board = self.board.append(piece.color(), piece.absolute_cells());
        let next_falling_piece = FallingPiece::spawn(self.next_piece);
        let (next_piece, supplier) = self.supplier.next_piece();
        let completed_rows = board.completed_rows();
        debug!(kind = ?piece.kind(), anchor = ?piece.anchor(), "piece landed");

        let with_state = |state: GameState| Self {
            board,
            state,
            next_piece,
            held: self.held.map(|held| HeldPiece {
                swap_allowed: true,
                ..held
            }),
            scoring: self.scoring.plus_landed_piece(),
            supplier: supplier.clone(),
        };

        if !completed_rows.is_empty() {
            debug!(rows = ?completed_rows, "rows completed");
            Outcome::RowBeingRemoved {
                engine: with_state(GameState::ClearingRows {
                    completed_rows,
                    next_falling_piece,
                }),
            }
        } else if next_falling_piece.is_valid_position(&board) {
            Outcome::Continue {
                engine: with_state(GameState::Regular {
                    falling_piece: next_falling_piece,
                }),
                reset_timer_drop,
            }
        } else {
            info!(points = self.scoring.points(), "game over");
            Outcome::GameOver {
                engine: with_state(GameState::GameOver),
            }
        }
    }
}
