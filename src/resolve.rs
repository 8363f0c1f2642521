use crate::board::Board;
use crate::decode::MoveCoordinates;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
   #[error("no piece to move")]
   NoPieceAtSource,

   #[error("no place to move to")]
   NoDestinationSquare,
}

/// The live entities a decoded move points at. Only good until the turn
/// passes.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMove<E> {
   pub piece: E,
   pub destination: E,
}

pub fn resolve<B: Board + ?Sized>(board: &B, coords: &MoveCoordinates) -> Result<ResolvedMove<B::Entity>, ResolveError> {
   let piece = board.piece_at(coords.origin()).ok_or(ResolveError::NoPieceAtSource)?;
   let destination = board.square_at(coords.destination()).ok_or(ResolveError::NoDestinationSquare)?;
   Ok(ResolvedMove { piece, destination })
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::board::{Color, Coord, Entity, FenBoard, START_FEN};
   use crate::decode::decode;

   fn start() -> FenBoard {
      FenBoard::from_fen(START_FEN, Color::White).unwrap()
   }

   #[test]
   fn resolves_piece_and_destination() {
      let resolved = resolve(&start(), &decode("e2e4").unwrap()).unwrap();
      assert_eq!(resolved.piece, Entity::Piece { kind: 'P', at: Coord::new(4, 2) });
      assert_eq!(resolved.destination, Entity::Square(Coord::new(4, 4)));
   }

   #[test]
   fn empty_source_is_an_error() {
      assert_eq!(resolve(&start(), &decode("e4e5").unwrap()), Err(ResolveError::NoPieceAtSource));
   }

   #[test]
   fn missing_destination_is_an_error() {
      let coords = MoveCoordinates {
         from_file: 4,
         from_rank: 2,
         to_file: 4,
         to_rank: 9,
      };
      assert_eq!(resolve(&start(), &coords), Err(ResolveError::NoDestinationSquare));
   }

   #[test]
   fn resolving_twice_gives_the_same_move() {
      let board = start();
      let coords = decode("g1f3").unwrap();
      let first = resolve(&board, &coords).unwrap();
      let second = resolve(&board, &coords).unwrap();
      assert_eq!(first, second);
      assert_eq!(first.piece, Entity::Piece { kind: 'N', at: Coord::new(2, 1) });
   }
}
