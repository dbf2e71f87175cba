//! Kestrel Node
//!
//! The uniform contract every automation step implements, and the built-in
//! step kinds.
//!
//! A node owns two JSON bags. The scheduler fills `inputs` from upstream
//! outputs; `execute()` reads them and fills `outputs`. Per-kind settings are
//! typed config structs kept apart from the bags, so resetting inputs between
//! cycles never loses configuration.

mod error;
pub mod kinds;
mod map;
mod misconfigured;
mod node;
mod slots;

pub use error::NodeError;
pub use kestrel_config::NodeKind;
pub use map::NodeMap;
pub use misconfigured::MisconfiguredNode;
pub use node::{Node, NodeBase, NodeReport, ReportKind};
pub use slots::{
  NumberSlot, Slots, TRIGGER_SLOT, as_number, default_trigger, flexible_number, number_slot,
};
