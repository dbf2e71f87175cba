use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a workflow runs once or keeps re-running on a timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
  #[default]
  Once,
  Repeat,
}

/// The closed set of step kinds the builder knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  PriceFeed,
  Conditional,
  Balance,
  Transfer,
  AiSignal,
  SafetyGate,
  Printer,
}

impl NodeKind {
  pub const ALL: [NodeKind; 7] = [
    NodeKind::PriceFeed,
    NodeKind::Conditional,
    NodeKind::Balance,
    NodeKind::Transfer,
    NodeKind::AiSignal,
    NodeKind::SafetyGate,
    NodeKind::Printer,
  ];

  /// Parse a type tag as written by editors.
  ///
  /// Matching ignores case, `_` and `-`, so `price_feed`, `priceFeed` and
  /// `price-feed` are the same kind. Returns `None` for unknown tags.
  pub fn parse(tag: &str) -> Option<Self> {
    let normalized: String = tag
      .chars()
      .filter(|c| *c != '_' && *c != '-')
      .map(|c| c.to_ascii_lowercase())
      .collect();

    match normalized.as_str() {
      "pricefeed" | "price" => Some(Self::PriceFeed),
      "conditional" | "condition" => Some(Self::Conditional),
      "balance" | "balancequery" => Some(Self::Balance),
      "transfer" => Some(Self::Transfer),
      "aisignal" | "aiprediction" => Some(Self::AiSignal),
      "safetygate" | "safety" => Some(Self::SafetyGate),
      "printer" | "print" => Some(Self::Printer),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::PriceFeed => "price_feed",
      Self::Conditional => "conditional",
      Self::Balance => "balance",
      Self::Transfer => "transfer",
      Self::AiSignal => "ai_signal",
      Self::SafetyGate => "safety_gate",
      Self::Printer => "printer",
    }
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
