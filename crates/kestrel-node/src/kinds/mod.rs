//! Built-in step kinds.

mod ai_signal;
mod balance;
mod conditional;
mod price_feed;
mod printer;
mod safety_gate;
mod transfer;

pub use ai_signal::{AiSignalConfig, AiSignalNode};
pub use balance::{BalanceConfig, BalanceNode};
pub use conditional::{
  ConditionalConfig, ConditionalNode, Operator, PATH_FALSE, PATH_SLOT, PATH_TRUE,
};
pub use price_feed::{PriceFeedConfig, PriceFeedNode};
pub use printer::{PrinterConfig, PrinterNode};
pub use safety_gate::{SafetyGateConfig, SafetyGateNode};
pub use transfer::{TransferConfig, TransferNode};
