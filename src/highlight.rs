use log::{info, warn};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::fmt;

/// Draws attention to board entities. Creating a highlight never clears
/// older ones; callers clear the whole pool when a turn is over.
pub trait Highlighter<E>: Send + Sync {
   fn highlight(&self, target: &E);

   fn clear_all(&self);
}

/// Keeps the highlighted set in memory and reports it through the log.
pub struct LogHighlighter<E> {
   active: Mutex<SmallVec<[E; 2]>>,
}

impl<E> Default for LogHighlighter<E> {
   fn default() -> LogHighlighter<E> {
      LogHighlighter {
         active: Mutex::new(SmallVec::new()),
      }
   }
}

impl<E: Clone> LogHighlighter<E> {
   pub fn new() -> LogHighlighter<E> {
      LogHighlighter::default()
   }

   pub fn active(&self) -> Vec<E> {
      self.active.lock().to_vec()
   }
}

impl<E> Highlighter<E> for LogHighlighter<E>
where
   E: Clone + PartialEq + fmt::Debug + Send,
{
   fn highlight(&self, target: &E) {
      let mut active = self.active.lock();
      // One marker per entity; a repeat is logged and not created
      if active.contains(target) {
         warn!("trying to highlight already highlighted object {:?}", target);
         return;
      }
      info!("highlighting {:?}", target);
      active.push(target.clone());
   }

   fn clear_all(&self) {
      let mut active = self.active.lock();
      if !active.is_empty() {
         info!("clearing {} highlights", active.len());
      }
      active.clear();
   }
}
