use log::{info, trace};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const ERROR_REVERT_DELAY: Duration = Duration::from_millis(2500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotStatus {
   Idle,
   Calculating,
   Error,
}

impl fmt::Display for BotStatus {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      match self {
         BotStatus::Idle => write!(f, "Idle"),
         BotStatus::Calculating => write!(f, "Calculating"),
         BotStatus::Error => write!(f, "Error!"),
      }
   }
}

struct Inner {
   status: BotStatus,
   output: String,
   generation: u64,
   // Dropping this sender wakes and cancels the pending revert
   pending_revert: Option<mpsc::Sender<()>>,
}

/// The status label and output paragraph shared by every trigger.
pub struct StatusBoard {
   inner: Mutex<Inner>,
   revert_delay: Duration,
}

impl Default for StatusBoard {
   fn default() -> StatusBoard {
      StatusBoard::with_revert_delay(ERROR_REVERT_DELAY)
   }
}

impl StatusBoard {
   pub fn new() -> StatusBoard {
      StatusBoard::default()
   }

   pub fn with_revert_delay(revert_delay: Duration) -> StatusBoard {
      StatusBoard {
         inner: Mutex::new(Inner {
            status: BotStatus::Idle,
            output: String::new(),
            generation: 0,
            pending_revert: None,
         }),
         revert_delay,
      }
   }

   fn lock(&self) -> MutexGuard<Inner> {
      self.inner.lock()
   }

   pub fn status(&self) -> BotStatus {
      self.lock().status
   }

   pub fn label(&self) -> String {
      format!("Status: {}", self.status())
   }

   pub fn output(&self) -> String {
      self.lock().output.clone()
   }

   pub fn set_output(&self, content: impl Into<String>) {
      self.lock().output = content.into();
   }

   /// Writes a new status, cancelling any pending revert of an older one.
   pub fn set_status(&self, status: BotStatus) {
      let mut inner = self.lock();
      Self::write_status(&mut inner, status);
   }

   fn write_status(inner: &mut Inner, status: BotStatus) -> u64 {
      inner.pending_revert = None;
      inner.status = status;
      inner.generation += 1;
      trace!("status -> {}", status);
      inner.generation
   }

   /// Shows an error with `message` as the output and puts the label back to
   /// idle after the revert delay, unless something newer was written first.
   pub fn flash_error(self: &Arc<Self>, message: impl Into<String>) {
      let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
      let generation = {
         let mut inner = self.lock();
         inner.output = message.into();
         let generation = Self::write_status(&mut inner, BotStatus::Error);
         inner.pending_revert = Some(cancel_tx);
         generation
      };

      let board = Arc::downgrade(self);
      let delay = self.revert_delay;
      thread::spawn(move || {
         if !matches!(cancel_rx.recv_timeout(delay), Err(RecvTimeoutError::Timeout)) {
            return;
         }
         if let Some(board) = board.upgrade() {
            let mut inner = board.lock();
            if inner.generation == generation {
               info!("clearing error status");
               Self::write_status(&mut inner, BotStatus::Idle);
            }
         }
      });
   }
}
