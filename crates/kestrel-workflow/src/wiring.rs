//! Moving data along edges.

use kestrel_config::Wiring;
use kestrel_node::kinds::PATH_SLOT;
use kestrel_node::{Node, NodeKind, Slots};
use serde_json::Value;

/// Whether an edge out of a just-executed node fires.
///
/// Edges out of a conditional fire only when their wiring names the branch
/// the conditional chose. Every other edge always fires.
pub(crate) fn is_active(source_kind: NodeKind, outputs: &Slots, wiring: &Wiring) -> bool {
  if source_kind != NodeKind::Conditional {
    return true;
  }
  match outputs.get(PATH_SLOT).and_then(Value::as_str) {
    Some(path) => wiring.contains_key(path),
    None => false,
  }
}

/// Copy outputs of the source into the target's inputs. Returns how many
/// slots were written.
///
/// An explicit wiring copies each `output -> input` pair whose output exists.
/// An empty wiring falls back to:
/// - price feed into a conditional: `price -> price`;
/// - balance source: `balance -> balance`;
/// - anything else: every non-null output under its own name.
pub(crate) fn wire(source_kind: NodeKind, outputs: &Slots, target: &mut dyn Node, wiring: &Wiring) -> usize {
  let target_kind = target.kind();
  let inputs = target.inputs_mut();

  if !wiring.is_empty() {
    let mut written = 0;
    for (output, input) in wiring.iter() {
      if let Some(value) = outputs.get(output) {
        inputs.insert(input.clone(), value.clone());
        written += 1;
      }
    }
    return written;
  }

  let single = match (source_kind, target_kind) {
    (NodeKind::PriceFeed, NodeKind::Conditional) => Some("price"),
    (NodeKind::Balance, _) => Some("balance"),
    _ => None,
  };

  match single {
    Some(slot) => match outputs.get(slot) {
      Some(value) => {
        inputs.insert(slot.to_string(), value.clone());
        1
      }
      None => 0,
    },
    None => {
      let mut written = 0;
      for (key, value) in outputs.iter().filter(|(_, v)| !v.is_null()) {
        inputs.insert(key.clone(), value.clone());
        written += 1;
      }
      written
    }
  }
}
