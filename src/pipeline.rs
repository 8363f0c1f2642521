use crate::board::Board;
use crate::controls::Controls;
use crate::decode::{decode, DecodeError, MoveCoordinates};
use crate::highlight::Highlighter;
use crate::position::{encode, EncodeError};
use crate::resolve::{resolve, ResolveError, ResolvedMove};
use crate::solver::{RequestError, SolverClient, Transport};
use crate::status::{BotStatus, StatusBoard};
use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
   #[error(transparent)]
   Encode(#[from] EncodeError),

   #[error(transparent)]
   Request(#[from] RequestError),

   #[error(transparent)]
   Decode(#[from] DecodeError),

   #[error(transparent)]
   Resolve(#[from] ResolveError),
}

/// A move the solver picked, pinned to the live board.
#[derive(Clone, Debug, PartialEq)]
pub struct BestMove<E> {
   /// The position the solver was asked about.
   pub fen: String,
   pub result: String,
   pub coords: MoveCoordinates,
   pub resolved: ResolvedMove<E>,
}

#[derive(Debug)]
pub enum Outcome<E> {
   Moved(BestMove<E>),
   Failed(PipelineError),
   /// Another invocation was already in flight; nothing was done.
   Busy,
}

impl<E> Outcome<E> {
   pub fn is_moved(&self) -> bool {
      matches!(self, Outcome::Moved(_))
   }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
   fn drop(&mut self) {
      self.0.store(false, Ordering::Release);
   }
}

/// Clears the highlights of one run once its position is gone.
struct Watcher {
   fen: String,
   stop: mpsc::Sender<()>,
   thread: JoinHandle<()>,
}

impl Watcher {
   /// Stops the thread and hands back the position it was watching.
   fn stop(self) -> String {
      let _ = self.stop.send(());
      if self.thread.join().is_err() {
         error!("highlight watcher thread panicked");
      }
      self.fen
   }
}

/// Everything between "find me a move" and highlighted entities on the
/// board. Shared by the manual trigger and the turn synchronizer; at most one
/// invocation runs at a time.
pub struct Pipeline<B, T, H> {
   board: Arc<B>,
   solver: SolverClient<T>,
   highlighter: Arc<H>,
   controls: Arc<Controls>,
   status: Arc<StatusBoard>,
   busy: AtomicBool,
   watcher: Mutex<Option<Watcher>>,
}

impl<B, T, H> Pipeline<B, T, H> {
   /// Stops the highlight watcher of the last run, if any, leaving its
   /// highlights in place.
   pub fn stop_watcher(&self) {
      let watcher = self.watcher.lock().take();
      if let Some(watcher) = watcher {
         trace!("stopping highlight watcher");
         watcher.stop();
      }
   }

   /// True while the last run's highlights are still being watched.
   pub fn watching(&self) -> bool {
      self.watcher
         .lock()
         .as_ref()
         .map_or(false, |watcher| !watcher.thread.is_finished())
   }
}

impl<B, T, H> Drop for Pipeline<B, T, H> {
   fn drop(&mut self) {
      self.stop_watcher();
   }
}

impl<B, T, H> Pipeline<B, T, H>
where
   B: Board + 'static,
   T: Transport,
   H: Highlighter<B::Entity> + 'static,
{
   pub fn new(
      board: Arc<B>,
      solver: SolverClient<T>,
      highlighter: Arc<H>,
      controls: Arc<Controls>,
      status: Arc<StatusBoard>,
   ) -> Pipeline<B, T, H> {
      Pipeline {
         board,
         solver,
         highlighter,
         controls,
         status,
         busy: AtomicBool::new(false),
         watcher: Mutex::new(None),
      }
   }

   pub fn board(&self) -> &Arc<B> {
      &self.board
   }

   pub fn solver(&self) -> &SolverClient<T> {
      &self.solver
   }

   pub fn controls(&self) -> &Arc<Controls> {
      &self.controls
   }

   pub fn status(&self) -> &Arc<StatusBoard> {
      &self.status
   }

   /// Encode, query, decode, resolve. Touches neither the status nor the
   /// highlights.
   pub fn find_best_move(&self) -> Result<BestMove<B::Entity>, PipelineError> {
      let fen = encode(&*self.board)?;
      let request = self.controls.solve_request(fen.clone());
      let response = self.solver.request_move(&request)?;
      let coords = decode(&response.result)?;
      let resolved = resolve(&*self.board, &coords)?;
      Ok(BestMove {
         fen,
         result: response.result,
         coords,
         resolved,
      })
   }

   /// Runs the pipeline and renders the outcome: highlights and output on
   /// success, a self-clearing error status on failure. Returns `Busy`
   /// straight away if another invocation has not finished yet.
   pub fn run(&self) -> Outcome<B::Entity> {
      if self
         .busy
         .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
         .is_err()
      {
         debug!("pipeline already running, ignoring trigger");
         return Outcome::Busy;
      }
      let _guard = BusyGuard(&self.busy);

      self.status.set_status(BotStatus::Calculating);
      match self.find_best_move() {
         Ok(best_move) => {
            self.replace_watcher(&best_move.fen);
            self.highlighter.highlight(&best_move.resolved.piece);
            self.highlighter.highlight(&best_move.resolved.destination);
            self.status.set_output(format!("Received: {}", best_move.result));
            self.watch(best_move.fen.clone());
            self.status.set_status(BotStatus::Idle);
            info!("best move {}", best_move.result);
            Outcome::Moved(best_move)
         }
         Err(e) => {
            warn!("could not find a move: {}", e);
            self.status.flash_error(e.to_string());
            Outcome::Failed(e)
         }
      }
   }

   /// Retires the previous run's watcher. Its highlights belong to an
   /// older position when `fen` differs, even if the watcher never saw the
   /// turn pass, so they are cleared before the new set goes up.
   fn replace_watcher(&self, fen: &str) {
      let previous = self.watcher.lock().take();
      if let Some(previous) = previous {
         if previous.stop() != fen {
            debug!("position moved on since the last run, clearing stale highlights");
            self.highlighter.clear_all();
         }
      }
   }

   fn watch(&self, fen: String) {
      let board = Arc::clone(&self.board);
      let highlighter = Arc::clone(&self.highlighter);
      let poll = self.controls.turn_poll();
      let (stop_tx, stop_rx) = mpsc::channel::<()>();
      let watched = fen.clone();
      let thread = thread::spawn(move || loop {
         if !board.is_player_turn() || board.to_fen().as_deref() != Some(watched.as_str()) {
            trace!("turn passed, clearing highlights");
            highlighter.clear_all();
            break;
         }
         match stop_rx.recv_timeout(poll) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
         }
      });
      *self.watcher.lock() = Some(Watcher {
         fen,
         stop: stop_tx,
         thread,
      });
   }
}
