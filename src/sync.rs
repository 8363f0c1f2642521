use crate::board::Board;
use crate::highlight::Highlighter;
use crate::pipeline::{Outcome, Pipeline};
use crate::solver::Transport;
use log::{debug, error, trace};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
   /// Auto-calculate is toggled off
   AutoDisabled,
   /// Waiting for the player's turn to come around
   Idle,
   /// Fired on this position, waiting for the opponent to move
   AwaitingOpponent,
   /// Opponent is thinking, waiting for the turn to come back
   AwaitingPlayer,
}

/// Fires the pipeline once per player turn while auto-calculate is on.
pub struct TurnSynchronizer<B, T, H> {
   pipeline: Arc<Pipeline<B, T, H>>,
   state: SyncState,
   fired_on: Option<String>,
}

impl<B, T, H> TurnSynchronizer<B, T, H>
where
   B: Board + 'static,
   T: Transport + 'static,
   H: Highlighter<B::Entity> + 'static,
{
   pub fn new(pipeline: Arc<Pipeline<B, T, H>>) -> TurnSynchronizer<B, T, H> {
      TurnSynchronizer {
         pipeline,
         state: SyncState::AutoDisabled,
         fired_on: None,
      }
   }

   pub fn state(&self) -> SyncState {
      self.state
   }

   /// One poll tick. Returns the outcome when the pipeline was invoked.
   ///
   /// Once fired, the synchronizer waits for the turn to go to the opponent
   /// and come back before it can fire again, whatever the toggle says in
   /// between. A new position on the player's turn counts as the opponent
   /// having moved, so a reply that lands between two ticks is not missed.
   pub fn step(&mut self) -> Option<Outcome<B::Entity>> {
      let pipeline = Arc::clone(&self.pipeline);
      let board = pipeline.board();
      if self.state == SyncState::AwaitingOpponent {
         if board.is_player_turn() && board.to_fen() == self.fired_on {
            return None;
         }
         self.transition(SyncState::AwaitingPlayer);
      }
      if self.state == SyncState::AwaitingPlayer {
         if !board.is_player_turn() {
            return None;
         }
         self.transition(SyncState::Idle);
      }

      if !pipeline.controls().auto_calculate() {
         self.transition(SyncState::AutoDisabled);
         return None;
      }
      self.transition(SyncState::Idle);

      if board.game_in_progress() && board.is_player_turn() {
         self.fired_on = board.to_fen();
         let outcome = pipeline.run();
         // A busy pipeline is already working on this turn
         self.transition(SyncState::AwaitingOpponent);
         return Some(outcome);
      }
      None
   }

   fn transition(&mut self, next: SyncState) {
      if self.state != next {
         trace!("turn synchronizer {:?} -> {:?}", self.state, next);
         self.state = next;
      }
   }

   fn poll_interval(&self) -> Duration {
      let controls = self.pipeline.controls();
      match self.state {
         SyncState::AutoDisabled | SyncState::Idle => controls.idle_poll(),
         SyncState::AwaitingOpponent | SyncState::AwaitingPlayer => controls.turn_poll(),
      }
   }

   /// Runs the loop on its own thread until the returned handle is stopped
   /// or dropped. Stopping also stops the pipeline's highlight watcher.
   pub fn spawn(mut self) -> SyncHandle {
      let (stop_tx, stop_rx) = mpsc::channel::<()>();
      let thread = thread::spawn(move || {
         debug!("turn synchronizer started");
         loop {
            self.step();
            match stop_rx.recv_timeout(self.poll_interval()) {
               Err(RecvTimeoutError::Timeout) => continue,
               Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
         }
         self.pipeline.stop_watcher();
         debug!("turn synchronizer stopped");
      });
      SyncHandle {
         stop: stop_tx,
         thread: Some(thread),
      }
   }
}

/// Owns the synchronizer thread. Stopping waits for an in-flight pipeline
/// call to finish, so nothing is left dangling.
pub struct SyncHandle {
   stop: mpsc::Sender<()>,
   thread: Option<JoinHandle<()>>,
}

impl SyncHandle {
   pub fn stop(mut self) {
      self.shutdown();
   }

   fn shutdown(&mut self) {
      if let Some(thread) = self.thread.take() {
         let _ = self.stop.send(());
         if thread.join().is_err() {
            error!("turn synchronizer thread panicked");
         }
      }
   }
}

impl Drop for SyncHandle {
   fn drop(&mut self) {
      self.shutdown();
   }
}
