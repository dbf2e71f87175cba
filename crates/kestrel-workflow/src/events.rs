//! Notifiers for observing the execution log as it grows.
//!
//! The workflow forwards every entry it appends. Implementations decide what
//! to do with them: stream to a UI, persist, or ignore.

use tokio::sync::mpsc;

use crate::log::LogEntry;

/// Receives each log entry as it is appended.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, entry: &LogEntry);
}

/// Discards every entry.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _entry: &LogEntry) {}
}

/// Sends entries to an unbounded channel.
///
/// Unbounded so a slow consumer never stalls the scheduler. Volume is a
/// handful of entries per node per cycle.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<LogEntry>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<LogEntry>) -> Self {
    Self { sender }
  }

  /// A notifier together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<LogEntry>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, entry: &LogEntry) {
    // Receiver may have been dropped
    let _ = self.sender.send(entry.clone());
  }
}
