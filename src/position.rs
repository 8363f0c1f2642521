use crate::board::Board;
use log::trace;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
   #[error("not your turn")]
   NotPlayerTurn,

   #[error("will cause desync")]
   DesyncRisk,

   #[error("board could not be serialized")]
   NoPosition,
}

/// Gatekeeps a board snapshot for querying and hands back its FEN exactly as
/// the board produced it.
///
/// Checks run in order: whose turn it is, then the desync flag, then the
/// serialization itself.
pub fn encode<B: Board + ?Sized>(board: &B) -> Result<String, EncodeError> {
   if !board.is_player_turn() {
      return Err(EncodeError::NotPlayerTurn);
   }
   if board.will_cause_desync() {
      return Err(EncodeError::DesyncRisk);
   }
   let fen = board.to_fen().ok_or(EncodeError::NoPosition)?;
   trace!("encoded position {}", fen);
   Ok(fen)
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::board::{Color, Coord, FenBoard, START_FEN};
   use std::sync::atomic::{AtomicU32, Ordering};

   struct CountingBoard {
      player_turn: bool,
      desync: bool,
      fen: Option<&'static str>,
      fen_calls: AtomicU32,
   }

   impl Board for CountingBoard {
      type Entity = ();

      fn is_player_turn(&self) -> bool {
         self.player_turn
      }

      fn will_cause_desync(&self) -> bool {
         self.desync
      }

      fn to_fen(&self) -> Option<String> {
         self.fen_calls.fetch_add(1, Ordering::SeqCst);
         self.fen.map(String::from)
      }

      fn game_in_progress(&self) -> bool {
         true
      }

      fn piece_at(&self, _at: Coord) -> Option<()> {
         None
      }

      fn square_at(&self, _at: Coord) -> Option<()> {
         None
      }
   }

   fn counting_board(player_turn: bool, desync: bool, fen: Option<&'static str>) -> CountingBoard {
      CountingBoard {
         player_turn,
         desync,
         fen,
         fen_calls: AtomicU32::new(0),
      }
   }

   #[test]
   fn not_player_turn_wins_over_everything() {
      let board = counting_board(false, true, None);
      assert_eq!(encode(&board), Err(EncodeError::NotPlayerTurn));
      assert_eq!(board.fen_calls.load(Ordering::SeqCst), 0);
   }

   #[test]
   fn desync_checked_before_serializing() {
      let board = counting_board(true, true, Some(START_FEN));
      assert_eq!(encode(&board), Err(EncodeError::DesyncRisk));
      assert_eq!(board.fen_calls.load(Ordering::SeqCst), 0);
   }

   #[test]
   fn missing_serialization_is_an_error() {
      assert_eq!(encode(&counting_board(true, false, None)), Err(EncodeError::NoPosition));
   }

   #[test]
   fn fen_passes_through_untouched() {
      let odd = "8/8/8/8/8/8/8/K6k  w - - 0 1";
      assert_eq!(encode(&counting_board(true, false, Some(odd))).as_deref(), Ok(odd));
   }

   #[test]
   fn encodes_fen_board() {
      let board = FenBoard::from_fen(START_FEN, Color::White).unwrap();
      assert_eq!(encode(&board).as_deref(), Ok(START_FEN));

      let board = FenBoard::from_fen(START_FEN, Color::Black).unwrap();
      assert_eq!(encode(&board), Err(EncodeError::NotPlayerTurn));
   }
}
