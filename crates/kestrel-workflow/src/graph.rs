use std::collections::HashMap;

use kestrel_config::EdgeSet;
use kestrel_node::NodeMap;

/// Remaining unsatisfied incoming edges per node, rebuilt for every run.
#[derive(Debug, Clone, Default)]
pub(crate) struct InDegrees(HashMap<String, usize>);

impl InDegrees {
  /// Count every edge whose target is a node, including edges from sources
  /// that do not exist and self edges. Such targets therefore never become
  /// ready.
  pub(crate) fn compute(nodes: &NodeMap, edges: &EdgeSet) -> Self {
    let mut degrees: HashMap<String, usize> = nodes.ids().map(|id| (id.to_string(), 0)).collect();
    for edge in edges.iter() {
      if let Some(degree) = degrees.get_mut(edge.to) {
        *degree += 1;
      }
    }
    Self(degrees)
  }

  /// Ids with no incoming edges, in node insertion order.
  pub(crate) fn roots<'a>(&'a self, nodes: &'a NodeMap) -> impl Iterator<Item = &'a str> + 'a {
    nodes
      .ids()
      .filter(move |id| self.0.get(*id).copied() == Some(0))
  }

  /// Satisfy one edge into `id`. Returns true when the node just became ready.
  pub(crate) fn satisfy(&mut self, id: &str) -> bool {
    match self.0.get_mut(id) {
      Some(degree) if *degree > 0 => {
        *degree -= 1;
        *degree == 0
      }
      _ => false,
    }
  }

  #[cfg(test)]
  pub(crate) fn get(&self, id: &str) -> Option<usize> {
    self.0.get(id).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use kestrel_node::NodeBase;
  use kestrel_node::kinds::{PrinterConfig, PrinterNode};

  fn nodes(ids: &[&str]) -> NodeMap {
    ids
      .iter()
      .fold(NodeMap::new(), |map, id| {
        map.with(PrinterNode::new(NodeBase::new(*id, *id), PrinterConfig::default()))
      })
  }

  #[test]
  fn test_counts_edges_from_missing_sources_and_self() {
    let nodes = nodes(&["a", "b", "c"]);
    let edges = EdgeSet::new()
      .with("a", "b", &[])
      .with("ghost", "b", &[])
      .with("c", "c", &[])
      .with("a", "nowhere", &[]);

    let degrees = InDegrees::compute(&nodes, &edges);
    assert_eq!(degrees.get("a"), Some(0));
    assert_eq!(degrees.get("b"), Some(2));
    assert_eq!(degrees.get("c"), Some(1));
    assert_eq!(degrees.get("nowhere"), None);

    let roots: Vec<&str> = degrees.roots(&nodes).collect();
    assert_eq!(roots, vec!["a"]);
  }

  #[test]
  fn test_satisfy_reports_readiness_once() {
    let nodes = nodes(&["a", "b"]);
    let edges = EdgeSet::new().with("a", "b", &[]).with("x", "b", &[]);
    let mut degrees = InDegrees::compute(&nodes, &edges);

    assert!(!degrees.satisfy("b"));
    assert!(degrees.satisfy("b"));
    assert!(!degrees.satisfy("b"));
    assert!(!degrees.satisfy("missing"));
  }
}
