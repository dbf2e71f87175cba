use std::sync::Arc;

use crate::ledger::{Ledger, MemoryLedger};
use crate::predictor::{MomentumPredictor, Predictor};
use crate::price::{PriceOracle, StaticPriceOracle};

/// The collaborators a node may reach during `execute()`.
///
/// Cloning is cheap; every node gets its own handle to the shared services.
#[derive(Clone)]
pub struct Capabilities {
  pub prices: Arc<dyn PriceOracle>,
  pub ledger: Arc<dyn Ledger>,
  pub predictor: Arc<dyn Predictor>,
}

impl Capabilities {
  pub fn new(
    prices: Arc<dyn PriceOracle>,
    ledger: Arc<dyn Ledger>,
    predictor: Arc<dyn Predictor>,
  ) -> Self {
    Self {
      prices,
      ledger,
      predictor,
    }
  }

  /// Empty in-memory services: no prices, zero balances.
  pub fn in_memory() -> Self {
    Self::new(
      Arc::new(StaticPriceOracle::new()),
      Arc::new(MemoryLedger::new()),
      Arc::new(MomentumPredictor::default()),
    )
  }

  pub fn with_prices(mut self, prices: Arc<dyn PriceOracle>) -> Self {
    self.prices = prices;
    self
  }

  pub fn with_ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
    self.ledger = ledger;
    self
  }

  pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
    self.predictor = predictor;
    self
  }
}

impl std::fmt::Debug for Capabilities {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Capabilities").finish_non_exhaustive()
  }
}
