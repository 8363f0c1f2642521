//! Finds the solver's best move for a live chess board and points at the
//! pieces to move, either on demand or automatically every time the turn
//! comes around.

pub mod board;
pub mod controls;
pub mod decode;
pub mod highlight;
pub mod pipeline;
pub mod position;
pub mod resolve;
pub mod solver;
pub mod status;
pub mod sync;

#[cfg(test)]
mod mock;
