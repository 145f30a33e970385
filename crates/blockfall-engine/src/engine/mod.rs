//! Game rules on top of the board geometry.
//!
//! - [`GameEngine`] - Immutable game state machine driven by timer and player events
//! - [`Outcome`] - What an engine operation did, carrying the engine to continue with
//! - [`Scoring`] - Points, level and line counters
//! - [`PieceSupplier`] - Source of upcoming pieces ([`BagSupplier`], [`SequenceSupplier`])
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameEngine`] from a supplier
//! 2. Feed it timer drops and batches of [`UserAction`]s
//! 3. When a landing completes rows, it reports [`Outcome::RowBeingRemoved`];
//!    play an animation, then call
//!    [`GameEngine::on_row_removal_animation_complete`]
//! 4. Repeat until [`Outcome::GameOver`]
//!
//! The engine holds no clock. Its caller owns the drop timer and restarts it
//! whenever an outcome asks for it.

pub use self::{game_engine::*, piece_supplier::*, scoring::*};

mod game_engine;
mod piece_supplier;
mod scoring;
