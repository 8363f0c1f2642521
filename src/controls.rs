use crate::solver::SolveRequest;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

pub const DEFAULT_DEPTH: u32 = 17;
pub const DEFAULT_MAX_THINK_TIME_MS: u64 = 100;
pub const DEFAULT_IDLE_POLL: Duration = Duration::from_millis(500);
pub const DEFAULT_TURN_POLL: Duration = Duration::from_millis(200);

// Anything shorter would have the loops spin without yielding
const MIN_POLL: Duration = Duration::from_millis(1);

/// The knobs a user can turn while a session is running. The pipeline reads
/// them each time it is invoked, never caching a previous value.
#[derive(Debug)]
pub struct Controls {
   depth: AtomicU32,
   max_think_time_ms: AtomicU64,
   disregard_think_time: AtomicBool,
   auto_calculate: AtomicBool,
   idle_poll: Duration,
   turn_poll: Duration,
}

impl Default for Controls {
   fn default() -> Controls {
      Controls {
         depth: AtomicU32::new(DEFAULT_DEPTH),
         max_think_time_ms: AtomicU64::new(DEFAULT_MAX_THINK_TIME_MS),
         disregard_think_time: AtomicBool::new(false),
         auto_calculate: AtomicBool::new(false),
         idle_poll: DEFAULT_IDLE_POLL,
         turn_poll: DEFAULT_TURN_POLL,
      }
   }
}

impl Controls {
   pub fn new(depth: u32, max_think_time_ms: u64, disregard_think_time: bool) -> Controls {
      Controls {
         depth: AtomicU32::new(depth),
         max_think_time_ms: AtomicU64::new(max_think_time_ms),
         disregard_think_time: AtomicBool::new(disregard_think_time),
         ..Controls::default()
      }
   }

   /// `idle` paces the synchronizer while nothing is happening, `turn` paces
   /// the waits for a turn to flip.
   pub fn with_poll_intervals(mut self, idle: Duration, turn: Duration) -> Controls {
      self.idle_poll = idle.max(MIN_POLL);
      self.turn_poll = turn.max(MIN_POLL);
      self
   }

   pub fn depth(&self) -> u32 {
      self.depth.load(Ordering::Relaxed)
   }

   pub fn set_depth(&self, depth: u32) {
      self.depth.store(depth, Ordering::Relaxed);
   }

   pub fn max_think_time_ms(&self) -> u64 {
      self.max_think_time_ms.load(Ordering::Relaxed)
   }

   pub fn set_max_think_time_ms(&self, ms: u64) {
      self.max_think_time_ms.store(ms, Ordering::Relaxed);
   }

   pub fn disregard_think_time(&self) -> bool {
      self.disregard_think_time.load(Ordering::Relaxed)
   }

   pub fn set_disregard_think_time(&self, disregard: bool) {
      self.disregard_think_time.store(disregard, Ordering::Relaxed);
   }

   pub fn auto_calculate(&self) -> bool {
      self.auto_calculate.load(Ordering::Relaxed)
   }

   pub fn set_auto_calculate(&self, on: bool) {
      self.auto_calculate.store(on, Ordering::Relaxed);
   }

   pub fn idle_poll(&self) -> Duration {
      self.idle_poll
   }

   pub fn turn_poll(&self) -> Duration {
      self.turn_poll
   }

   pub fn solve_request(&self, fen: String) -> SolveRequest {
      SolveRequest {
         fen,
         depth: self.depth(),
         max_think_time_ms: self.max_think_time_ms(),
         disregard_think_time: self.disregard_think_time(),
      }
   }
}
