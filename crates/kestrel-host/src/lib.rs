//! Kestrel Host
//!
//! Nodes never talk to the outside world directly. Everything with side
//! effects (price lookups, ledger reads and transfers, model predictions) goes
//! through the capability traits defined here, bundled as [`Capabilities`].
//!
//! The in-memory implementations are deterministic and are what the CLI and
//! the tests run against. [`HttpPriceOracle`] is the one networked capability.

mod capabilities;
mod error;
mod ledger;
mod predictor;
mod price;

pub use capabilities::Capabilities;
pub use error::HostError;
pub use ledger::{Ledger, MemoryLedger, TransferReceipt, TransferRequest};
pub use predictor::{MomentumPredictor, Prediction, PredictionRequest, Predictor, Signal};
pub use price::{HttpPriceOracle, PriceOracle, StaticPriceOracle};
