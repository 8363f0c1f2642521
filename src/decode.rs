use crate::board::Coord;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
   #[error("A full move has to be 4-5 characters long, got a move ({0}) that was {1} characters long")]
   BadLength(String, usize),

   #[error("{0} is not a valid file, expected a..=h")]
   BadFile(char),

   #[error("{0} is not a valid rank, expected 1..=8")]
   BadRank(char),
}

/// Origin and destination of a solver move in the game's coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveCoordinates {
   pub from_file: u8,
   pub from_rank: u8,
   pub to_file: u8,
   pub to_rank: u8,
}

impl MoveCoordinates {
   pub fn origin(&self) -> Coord {
      Coord::new(self.from_file, self.from_rank)
   }

   pub fn destination(&self) -> Coord {
      Coord::new(self.to_file, self.to_rank)
   }
}

/// Decodes a `<file><rank><file><rank>` solver move.
///
/// Files map through `9 - (letter - 96)`, so `a` is file 8 and `h` is
/// file 1, matching how the game numbers its tiles. A trailing promotion
/// letter is accepted and ignored.
pub fn decode(result: &str) -> Result<MoveCoordinates, DecodeError> {
   let chars: Vec<char> = result.chars().collect();
   if chars.len() < 4 || chars.len() > 5 {
      return Err(DecodeError::BadLength(result.to_string(), chars.len()));
   }
   Ok(MoveCoordinates {
      from_file: file_index(chars[0])?,
      from_rank: rank_index(chars[1])?,
      to_file: file_index(chars[2])?,
      to_rank: rank_index(chars[3])?,
   })
}

fn file_index(letter: char) -> Result<u8, DecodeError> {
   if !('a'..='h').contains(&letter) {
      return Err(DecodeError::BadFile(letter));
   }
   Ok(9 - (letter as u8 - 96))
}

fn rank_index(digit: char) -> Result<u8, DecodeError> {
   match digit.to_digit(10) {
      Some(rank @ 1..=8) => Ok(rank as u8),
      _ => Err(DecodeError::BadRank(digit)),
   }
}

impl FromStr for MoveCoordinates {
   type Err = DecodeError;

   fn from_str(s: &str) -> Result<MoveCoordinates, DecodeError> {
      decode(s)
   }
}

impl fmt::Display for MoveCoordinates {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      // Hand-built coordinates may be off the board
      let letter = |file: u8| {
         if (1..=8).contains(&file) {
            (b'a' + 8 - file) as char
         } else {
            '?'
         }
      };
      write!(
         f,
         "{}{}{}{}",
         letter(self.from_file),
         self.from_rank,
         letter(self.to_file),
         self.to_rank
      )
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn files_are_inverted() {
      assert_eq!(
         decode("a2h4"),
         Ok(MoveCoordinates {
            from_file: 8,
            from_rank: 2,
            to_file: 1,
            to_rank: 4,
         })
      );
      assert_eq!(
         decode("e2e4"),
         Ok(MoveCoordinates {
            from_file: 4,
            from_rank: 2,
            to_file: 4,
            to_rank: 4,
         })
      );
   }

   #[test]
   fn every_file_letter_follows_the_formula() {
      for (i, letter) in "abcdefgh".chars().enumerate() {
         let coords = decode(&format!("{}1{}8", letter, letter)).unwrap();
         assert_eq!(coords.from_file as i32, 9 - (letter as i32 - 96));
         assert_eq!(coords.from_file as usize, 8 - i);
         assert_eq!(coords.to_file, coords.from_file);
         assert_eq!(coords.from_rank, 1);
         assert_eq!(coords.to_rank, 8);
      }
   }

   #[test]
   fn promotion_suffix_is_ignored() {
      assert_eq!(decode("e7e8q"), decode("e7e8"));
   }

   #[test]
   fn bad_moves_are_rejected() {
      assert_eq!(decode("e2e"), Err(DecodeError::BadLength("e2e".into(), 3)));
      assert_eq!(decode("e2e4qq"), Err(DecodeError::BadLength("e2e4qq".into(), 6)));
      assert_eq!(decode("i2e4"), Err(DecodeError::BadFile('i')));
      assert_eq!(decode("E2e4"), Err(DecodeError::BadFile('E')));
      assert_eq!(decode("e0e4"), Err(DecodeError::BadRank('0')));
      assert_eq!(decode("e2e9"), Err(DecodeError::BadRank('9')));
      assert!(decode("(none)").is_err());
   }

   #[test]
   fn coordinates_print_as_algebraic() {
      let coords: MoveCoordinates = "g1f3".parse().unwrap();
      assert_eq!(coords.origin(), Coord::new(2, 1));
      assert_eq!(coords.destination(), Coord::new(3, 3));
      assert_eq!(coords.to_string(), "g1f3");
   }

   #[test]
   fn off_board_files_print_without_panicking() {
      let coords = MoveCoordinates {
         from_file: 0,
         from_rank: 2,
         to_file: 200,
         to_rank: 4,
      };
      assert_eq!(coords.to_string(), "?2?4");
      let coords = MoveCoordinates {
         from_file: 8,
         from_rank: 1,
         to_file: 1,
         to_rank: 8,
      };
      assert_eq!(coords.to_string(), "a1h8");
   }
}
