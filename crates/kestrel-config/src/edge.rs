use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;

/// Slot wiring for one edge: source output slot -> target input slot.
///
/// An empty wiring is meaningful: it asks the scheduler to wire automatically.
pub type Wiring = OrderedMap<String>;

/// A single directed edge, borrowed from an [`EdgeSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<'a> {
  pub from: &'a str,
  pub to: &'a str,
  pub wiring: &'a Wiring,
}

/// All edges of a workflow, keyed by source id then target id.
///
/// Edges may name nodes that do not exist (for instance when the builder
/// skipped a node of unknown type); consumers are expected to tolerate that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeSet(OrderedMap<OrderedMap<Wiring>>);

impl EdgeSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add or replace the edge `from -> to`.
  pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, wiring: Wiring) {
    self.0.entry_or_default(from).insert(to, wiring);
  }

  /// Builder-style [`insert`](Self::insert).
  pub fn with(mut self, from: &str, to: &str, wiring: &[(&str, &str)]) -> Self {
    let wiring = wiring
      .iter()
      .map(|(out, input)| (*out, input.to_string()))
      .collect();
    self.insert(from, to, wiring);
    self
  }

  /// Outgoing edges of `from`, in description order.
  pub fn outgoing<'a>(&'a self, from: &'a str) -> impl Iterator<Item = Edge<'a>> + 'a {
    self
      .0
      .get(from)
      .into_iter()
      .flat_map(move |targets| targets.iter().map(move |(to, wiring)| Edge { from, to, wiring }))
  }

  /// Every edge, grouped by source in description order.
  pub fn iter(&self) -> impl Iterator<Item = Edge<'_>> {
    self.0.iter().flat_map(|(from, targets)| {
      targets
        .iter()
        .map(move |(to, wiring)| Edge { from, to, wiring })
    })
  }

  pub fn get(&self, from: &str, to: &str) -> Option<&Wiring> {
    self.0.get(from).and_then(|targets| targets.get(to))
  }

  /// Number of edges.
  pub fn len(&self) -> usize {
    self.0.values().map(|targets| targets.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
