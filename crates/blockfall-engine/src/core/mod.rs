//! Board geometry: cells, pieces, and how a falling piece moves over a board.
//!
//! - [`Board`] - Settled blocks on a 10×20 grid
//! - [`Piece`] - One of the seven tetrominoes in a given orientation
//! - [`FallingPiece`] - A piece anchored at a board position

pub use self::{board::*, coordinate::*, falling_piece::*, piece::*};

pub(crate) mod board;
pub(crate) mod coordinate;
pub(crate) mod falling_piece;
pub(crate) mod piece;
