use std::collections::HashMap;
use std::fmt;

use crate::node::Node;

/// Nodes keyed by id, remembering the order they were added in.
#[derive(Default)]
pub struct NodeMap {
  order: Vec<String>,
  nodes: HashMap<String, Box<dyn Node>>,
}

impl NodeMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a node under its own id. Replacing an id keeps its original position.
  pub fn insert(&mut self, node: Box<dyn Node>) -> Option<Box<dyn Node>> {
    let id = node.id().to_string();
    let previous = self.nodes.insert(id.clone(), node);
    if previous.is_none() {
      self.order.push(id);
    }
    previous
  }

  pub fn with(mut self, node: impl Node + 'static) -> Self {
    self.insert(Box::new(node));
    self
  }

  pub fn get(&self, id: &str) -> Option<&dyn Node> {
    self.nodes.get(id).map(|n| n.as_ref())
  }

  pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Node + 'static)> {
    self.nodes.get_mut(id).map(|n| n.as_mut())
  }

  pub fn contains(&self, id: &str) -> bool {
    self.nodes.contains_key(id)
  }

  /// Ids in insertion order.
  pub fn ids(&self) -> impl Iterator<Item = &str> {
    self.order.iter().map(String::as_str)
  }

  /// Nodes in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &dyn Node> {
    self
      .order
      .iter()
      .filter_map(|id| self.nodes.get(id).map(|n| n.as_ref()))
  }

  /// Nodes in no particular order.
  pub fn values_mut(&mut self) -> impl Iterator<Item = &mut (dyn Node + 'static)> {
    self.nodes.values_mut().map(|n| n.as_mut())
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }
}

impl FromIterator<Box<dyn Node>> for NodeMap {
  fn from_iter<I: IntoIterator<Item = Box<dyn Node>>>(iter: I) -> Self {
    let mut map = Self::new();
    for node in iter {
      map.insert(node);
    }
    map
  }
}

impl fmt::Debug for NodeMap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.iter().map(|n| (n.id(), n.kind())))
      .finish()
  }
}
