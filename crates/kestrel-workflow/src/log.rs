//! The user-facing execution log.
//!
//! Separate from `tracing`: this is the structured record a dashboard polls or
//! subscribes to. It grows during a run and is trimmed only between repeat
//! cycles, so one chatty run can briefly exceed the cap.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use kestrel_node::ReportKind;
use serde::{Deserialize, Serialize};

/// Entries kept between repeat cycles unless configured otherwise.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
  Info,
  Console,
  Success,
  Error,
  Payment,
}

impl LogKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Info => "info",
      Self::Console => "console",
      Self::Success => "success",
      Self::Error => "error",
      Self::Payment => "payment",
    }
  }
}

impl fmt::Display for LogKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<ReportKind> for LogKind {
  fn from(kind: ReportKind) -> Self {
    match kind {
      ReportKind::Info => Self::Info,
      ReportKind::Console => Self::Console,
      ReportKind::Success => Self::Success,
      ReportKind::Payment => Self::Payment,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  /// Position in the log since creation. Keeps increasing across trims.
  pub seq: u64,
  pub timestamp: DateTime<Utc>,
  pub kind: LogKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node_id: Option<String>,
  pub message: String,
}

/// Append-only log with an explicit trim.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
  entries: VecDeque<LogEntry>,
  next_seq: u64,
}

impl ExecutionLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(
    &mut self,
    kind: LogKind,
    node_id: Option<&str>,
    message: impl Into<String>,
  ) -> &LogEntry {
    let entry = LogEntry {
      seq: self.next_seq,
      timestamp: Utc::now(),
      kind,
      node_id: node_id.map(String::from),
      message: message.into(),
    };
    self.next_seq += 1;
    self.entries.push_back(entry);
    &self.entries[self.entries.len() - 1]
  }

  /// Entries oldest first.
  pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
    self.entries.iter()
  }

  /// Entries appended after `seq`, for observers that poll.
  pub fn since(&self, seq: u64) -> impl Iterator<Item = &LogEntry> {
    self.entries.iter().filter(move |e| e.seq > seq)
  }

  pub fn last(&self) -> Option<&LogEntry> {
    self.entries.back()
  }

  /// Drop the oldest entries until at most `capacity` remain.
  pub fn trim_to(&mut self, capacity: usize) -> usize {
    let excess = self.entries.len().saturating_sub(capacity);
    self.entries.drain(..excess);
    excess
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
