//! Kestrel Workflow
//!
//! Runs a built graph of nodes in dependency order, once or on a timer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Workflow::start                         │
//! │  - run once, then repeat every interval until stopped       │
//! │  - trims the log and resets inputs between cycles           │
//! │  - StopHandle / CancellationToken ends the schedule         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Workflow::run                          │
//! │  - fresh in-degrees, FIFO ready queue                       │
//! │  - conditional nodes prune the branch not taken             │
//! │  - wires outputs into inputs along active edges             │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Node::execute                          │
//! │  - one node in flight at a time                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step is recorded in an [`ExecutionLog`] and forwarded to an
//! [`ExecutionNotifier`].

mod error;
mod events;
mod graph;
mod log;
mod report;
mod schedule;
mod state;
mod wiring;
mod workflow;

pub use error::WorkflowError;
pub use events::{ChannelNotifier, ExecutionNotifier, NoopNotifier};
pub use log::{DEFAULT_LOG_CAPACITY, ExecutionLog, LogEntry, LogKind};
pub use report::{RunReport, ScheduleSummary};
pub use schedule::{FailurePolicy, ScheduleConfig, StopHandle};
pub use state::RunState;
pub use workflow::Workflow;
