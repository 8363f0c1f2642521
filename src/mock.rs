//! Test doubles for the solver transport and the game board

use crate::board::{Board, Color, Coord, Entity, FenBoard, START_FEN};
use crate::solver::{RequestError, Transport};
use parking_lot::Mutex;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

type Reply = Box<dyn Fn() -> Result<String, RequestError> + Send + Sync>;

/// Answers every GET with whatever `reply` produces and logs the urls.
pub struct MockTransport {
   reply: Reply,
   urls: Mutex<Vec<Url>>,
}

impl MockTransport {
   pub fn new<F>(reply: F) -> MockTransport
   where
      F: Fn() -> Result<String, RequestError> + Send + Sync + 'static,
   {
      MockTransport {
         reply: Box::new(reply),
         urls: Mutex::new(Vec::new()),
      }
   }

   pub fn replying(body: &str) -> MockTransport {
      let body = body.to_string();
      MockTransport::new(move || Ok(body.clone()))
   }

   /// Hands out `bodies` in order, repeating the last one once they run out.
   pub fn sequence(bodies: &[&str]) -> MockTransport {
      let bodies: Vec<String> = bodies.iter().map(|body| body.to_string()).collect();
      let next = AtomicUsize::new(0);
      MockTransport::new(move || {
         let i = next.fetch_add(1, Ordering::SeqCst).min(bodies.len() - 1);
         Ok(bodies[i].clone())
      })
   }

   pub fn calls(&self) -> usize {
      self.urls.lock().len()
   }

   pub fn urls(&self) -> Vec<Url> {
      self.urls.lock().clone()
   }
}

impl Transport for MockTransport {
   fn get(&self, url: &Url) -> Result<String, RequestError> {
      self.urls.lock().push(url.clone());
      (self.reply)()
   }
}

/// A position whose turn, desync flag and game state are flipped by the
/// test. The position itself can be swapped out mid-test.
pub struct ScriptedBoard {
   position: Mutex<FenBoard>,
   player_turn: AtomicBool,
   desync: AtomicBool,
   in_progress: AtomicBool,
}

impl ScriptedBoard {
   pub fn new(fen: &str) -> ScriptedBoard {
      ScriptedBoard {
         position: Mutex::new(FenBoard::from_fen(fen, Color::White).unwrap()),
         player_turn: AtomicBool::new(true),
         desync: AtomicBool::new(false),
         in_progress: AtomicBool::new(true),
      }
   }

   pub fn start() -> ScriptedBoard {
      ScriptedBoard::new(START_FEN)
   }

   /// Replaces the pieces without touching the scripted turn.
   pub fn set_position(&self, fen: &str) {
      *self.position.lock() = FenBoard::from_fen(fen, Color::White).unwrap();
   }

   pub fn set_player_turn(&self, player_turn: bool) {
      self.player_turn.store(player_turn, Ordering::SeqCst);
   }

   pub fn set_desync(&self, desync: bool) {
      self.desync.store(desync, Ordering::SeqCst);
   }

   pub fn set_in_progress(&self, in_progress: bool) {
      self.in_progress.store(in_progress, Ordering::SeqCst);
   }
}

impl Board for ScriptedBoard {
   type Entity = Entity;

   fn is_player_turn(&self) -> bool {
      self.player_turn.load(Ordering::SeqCst)
   }

   fn will_cause_desync(&self) -> bool {
      self.desync.load(Ordering::SeqCst)
   }

   fn to_fen(&self) -> Option<String> {
      self.position.lock().to_fen()
   }

   fn game_in_progress(&self) -> bool {
      self.in_progress.load(Ordering::SeqCst)
   }

   fn piece_at(&self, at: Coord) -> Option<Entity> {
      self.position.lock().piece_at(at)
   }

   fn square_at(&self, at: Coord) -> Option<Entity> {
      self.position.lock().square_at(at)
   }
}
