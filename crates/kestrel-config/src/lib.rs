//! Kestrel Config
//!
//! This crate contains the serializable workflow description types for Kestrel.
//! These types represent an automation graph before the builder turns it into
//! executable nodes.
//!
//! A description looks like:
//!
//! ```json
//! {
//!   "type": "repeat",
//!   "nodes": {
//!     "feed": { "type": "price_feed", "label": "ETH price", "config": { "symbol": "ETH" } },
//!     "check": { "type": "conditional", "operator": "gt", "threshold": 100 },
//!     "log": { "type": "printer" }
//!   },
//!   "edges": {
//!     "feed": { "check": {} },
//!     "check": { "log": { "true": "trigger" } }
//!   }
//! }
//! ```
//!
//! Map order in the document is significant: node order decides which entry
//! points are queued first and edge order decides which upstream wins when two
//! edges write the same input slot. [`OrderedMap`] keeps that order.

mod context;
mod edge;
mod enums;
mod error;
mod node;
mod ordered;
mod workflow;

pub use context::{ExecutionContext, NetworkParams, WalletCredentials};
pub use edge::{Edge, EdgeSet, Wiring};
pub use enums::{NodeKind, WorkflowType};
pub use error::ConfigError;
pub use node::NodeDef;
pub use ordered::OrderedMap;
pub use workflow::WorkflowDef;
