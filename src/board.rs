use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A tile as the game addresses it. Files are numbered from the h-file (1)
/// to the a-file (8); ranks are the usual 1..=8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
   pub file: u8,
   pub rank: u8,
}

impl Coord {
   pub fn new(file: u8, rank: u8) -> Coord {
      Coord { file, rank }
   }

   pub fn on_board(&self) -> bool {
      (1..=8).contains(&self.file) && (1..=8).contains(&self.rank)
   }
}

// The game names its tiles "file,rank"
impl fmt::Display for Coord {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      write!(f, "{},{}", self.file, self.rank)
   }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
   White,
   Black,
}

impl FromStr for Color {
   type Err = String;

   fn from_str(s: &str) -> Result<Color, String> {
      match s.to_ascii_lowercase().as_str() {
         "w" | "white" => Ok(Color::White),
         "b" | "black" => Ok(Color::Black),
         _ => Err(format!("{} is not a color, expected white or black", s)),
      }
   }
}

/// Read-only view of the live game board.
///
/// The pipeline never mutates the board; it only asks questions of it and
/// looks up entities for the visualization layer to act on.
pub trait Board: Send + Sync {
   /// Opaque handle to a piece or tile in the scene.
   type Entity: Clone + PartialEq + fmt::Debug + Send + 'static;

   fn is_player_turn(&self) -> bool;

   /// True when the client's view may have drifted from the authoritative
   /// game state, so any computed move would be unsafe to act on.
   fn will_cause_desync(&self) -> bool;

   fn to_fen(&self) -> Option<String>;

   fn game_in_progress(&self) -> bool;

   fn piece_at(&self, at: Coord) -> Option<Self::Entity>;

   fn square_at(&self, at: Coord) -> Option<Self::Entity>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
   Piece { kind: char, at: Coord },
   Square(Coord),
}

impl fmt::Display for Entity {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      match self {
         Entity::Piece { kind, at } => write!(f, "{} on {}", kind, at),
         Entity::Square(at) => write!(f, "tile {}", at),
      }
   }
}

/// A board snapshot built from a FEN string, indexed the way the game
/// indexes its pieces and tiles.
#[derive(Clone, Debug)]
pub struct FenBoard {
   fen: String,
   pieces: FxHashMap<Coord, char>,
   side_to_move: Color,
   player: Color,
   desync: bool,
}

impl FenBoard {
   pub fn from_fen(fen: &str, player: Color) -> Result<FenBoard, String> {
      let fen_sections: Vec<&str> = fen.split_whitespace().collect();
      if fen_sections.len() != 6 {
         return Err(format!(
            "malformed FEN; expected 6 whitespace delimited sections, found {}",
            fen_sections.len()
         ));
      }

      let mut pieces = FxHashMap::default();
      let mut rank: u8 = 8;
      let mut col: u8 = 0;
      for ascii_char in fen_sections[0].bytes() {
         match ascii_char {
            b'p' | b'n' | b'b' | b'r' | b'q' | b'k' | b'P' | b'N' | b'B' | b'R' | b'Q' | b'K' => {
               if col >= 8 {
                  return Err(format!("malformed FEN; too many squares in rank {}", rank));
               }
               pieces.insert(Coord::new(8 - col, rank), ascii_char as char);
               col += 1;
            }
            b'1'..=b'8' => {
               col += ascii_char - b'0';
               if col > 8 {
                  return Err(format!("malformed FEN; too many squares in rank {}", rank));
               }
            }
            b'/' => {
               if col != 8 {
                  return Err("malformed FEN; got to end of rank without all squares in rank accounted for".into());
               }
               if rank == 1 {
                  return Err("malformed FEN; too many ranks on board".into());
               }
               rank -= 1;
               col = 0;
            }
            _ => {
               return Err(format!(
                  "malformed FEN; got unexpected byte {} (ASCII: {}) during piece placement, expecting one of ASCII pbnrqkPBNRQK12345678/",
                  ascii_char, ascii_char as char
               ));
            }
         }
      }
      if rank != 1 || col != 8 {
         return Err("malformed FEN; piece placement does not cover the whole board".into());
      }

      let side_to_move = match fen_sections[1] {
         "w" => Color::White,
         "b" => Color::Black,
         other => {
            return Err(format!(
               "malformed FEN; expected w or b for side to move, found {}",
               other
            ))
         }
      };

      Ok(FenBoard {
         fen: fen_sections.join(" "),
         pieces,
         side_to_move,
         player,
         desync: false,
      })
   }

   pub fn side_to_move(&self) -> Color {
      self.side_to_move
   }

   pub fn mark_desync(&mut self, desync: bool) {
      self.desync = desync;
   }
}

impl Board for FenBoard {
   type Entity = Entity;

   fn is_player_turn(&self) -> bool {
      self.side_to_move == self.player
   }

   fn will_cause_desync(&self) -> bool {
      self.desync
   }

   fn to_fen(&self) -> Option<String> {
      Some(self.fen.clone())
   }

   fn game_in_progress(&self) -> bool {
      true
   }

   fn piece_at(&self, at: Coord) -> Option<Entity> {
      self.pieces.get(&at).map(|kind| Entity::Piece { kind: *kind, at })
   }

   fn square_at(&self, at: Coord) -> Option<Entity> {
      if at.on_board() {
         Some(Entity::Square(at))
      } else {
         None
      }
   }
}

/// A board that is replaced wholesale whenever a new position arrives.
/// No position means no game in progress.
pub struct LiveBoard {
   player: Color,
   current: Mutex<Option<FenBoard>>,
}

impl LiveBoard {
   pub fn new(player: Color) -> LiveBoard {
      LiveBoard {
         player,
         current: Mutex::new(None),
      }
   }

   /// Feeds one line of input: a FEN, or a blank line / `end` when the game
   /// is over. A line that fails to parse leaves the previous position in
   /// place but flags it desync-prone.
   pub fn update(&self, line: &str) -> Result<(), String> {
      let line = line.trim();
      let mut current = self.current.lock();
      if line.is_empty() || line == "end" {
         *current = None;
         return Ok(());
      }
      match FenBoard::from_fen(line, self.player) {
         Ok(board) => {
            *current = Some(board);
            Ok(())
         }
         Err(e) => {
            if let Some(board) = current.as_mut() {
               board.mark_desync(true);
            }
            Err(e)
         }
      }
   }

   fn with<R>(&self, f: impl FnOnce(&FenBoard) -> R) -> Option<R> {
      let current = self.current.lock();
      current.as_ref().map(f)
   }
}

impl Board for LiveBoard {
   type Entity = Entity;

   fn is_player_turn(&self) -> bool {
      self.with(|b| b.is_player_turn()).unwrap_or(false)
   }

   fn will_cause_desync(&self) -> bool {
      self.with(|b| b.will_cause_desync()).unwrap_or(false)
   }

   fn to_fen(&self) -> Option<String> {
      self.with(|b| b.to_fen()).flatten()
   }

   fn game_in_progress(&self) -> bool {
      self.with(|_| ()).is_some()
   }

   fn piece_at(&self, at: Coord) -> Option<Entity> {
      self.with(|b| b.piece_at(at)).flatten()
   }

   fn square_at(&self, at: Coord) -> Option<Entity> {
      self.with(|b| b.square_at(at)).flatten()
   }
}
