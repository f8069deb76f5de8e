//! Structural consistency checks.
//!
//! The mutation primitives on [`Graph`] maintain these properties on their
//! own; the verifier exists for transformation passes that want a cheap
//! way to assert nothing slipped between a batch of edits. Checks run in
//! a fixed order and report the first violation found.

use std::collections::HashSet;

use thiserror::Error;

use super::graph::Graph;
use super::node::NodeId;
use super::value::ValueId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("instruction list is corrupt: {0}")]
    BrokenList(String),
    #[error("input slot {slot} of {node} node has no matching use record on %{value}")]
    MissingUse {
        node: String,
        slot: usize,
        value: String,
    },
    #[error("input slot {slot} of {node} node has {count} use records on %{value}, expected 1")]
    DuplicateUse {
        node: String,
        slot: usize,
        value: String,
        count: usize,
    },
    #[error("%{value} records a use at slot {slot} of {node} node, but that slot reads %{actual}")]
    DanglingUse {
        value: String,
        node: String,
        slot: usize,
        actual: String,
    },
    #[error("{node} node reads %{value}, which is produced by a detached node")]
    DetachedProducer { node: String, value: String },
    #[error("{node} node reads %{value} before its producer in the instruction list")]
    UseBeforeDef { node: String, value: String },
}

/// Checks the instruction list, use/input symmetry, and topological order.
pub fn verify(graph: &Graph) -> Result<(), VerifyError> {
    check_list(graph)?;
    check_use_symmetry(graph)?;
    check_topological_order(graph)?;
    Ok(())
}

/// The list must be a single closed circle through both sentinels, with
/// `prev` the exact mirror of `next`.
fn check_list(graph: &Graph) -> Result<(), VerifyError> {
    let limit = graph.nodes.len() + 2;
    let mut cursor = graph.input;
    let mut seen_output = false;
    for _ in 0..limit {
        let next = graph
            .node(cursor)
            .next
            .ok_or_else(|| VerifyError::BrokenList(format!("{cursor:?} has no next link")))?;
        let back = graph.node(next).prev;
        if back != Some(cursor) {
            return Err(VerifyError::BrokenList(format!(
                "{next:?} prev link does not point back to {cursor:?}"
            )));
        }
        if next == graph.output {
            seen_output = true;
        }
        if next == graph.input {
            if !seen_output {
                return Err(VerifyError::BrokenList(
                    "list closed without passing the output sentinel".into(),
                ));
            }
            return Ok(());
        }
        cursor = next;
    }
    Err(VerifyError::BrokenList(
        "list walk exceeded the number of live nodes".into(),
    ))
}

fn live_node_ids(graph: &Graph) -> impl Iterator<Item = NodeId> + '_ {
    graph.nodes.iter().enumerate().filter_map(|(index, slot)| {
        slot.as_ref().map(|_| NodeId {
            graph: graph.id,
            index: index as u32,
        })
    })
}

/// Every input slot of every live node (attached or not) must have exactly
/// one matching use record, and every use record must point at a slot that
/// actually reads the value.
fn check_use_symmetry(graph: &Graph) -> Result<(), VerifyError> {
    for node in live_node_ids(graph) {
        let record = graph.node(node);
        for (slot, &value) in record.inputs().iter().enumerate() {
            let count = graph
                .value(value)
                .uses()
                .iter()
                .filter(|entry| entry.user == node && entry.offset == slot)
                .count();
            match count {
                1 => {}
                0 => {
                    return Err(VerifyError::MissingUse {
                        node: record.kind().to_string(),
                        slot,
                        value: graph.value(value).unique_name(),
                    })
                }
                _ => {
                    return Err(VerifyError::DuplicateUse {
                        node: record.kind().to_string(),
                        slot,
                        value: graph.value(value).unique_name(),
                        count,
                    })
                }
            }
        }
    }
    for (index, slot) in graph.values.iter().enumerate() {
        let Some(value) = slot.as_ref() else { continue };
        let id = ValueId {
            graph: graph.id,
            index: index as u32,
        };
        for entry in value.uses() {
            let user = graph.node(entry.user);
            let actual = user.inputs().get(entry.offset).copied();
            if actual != Some(id) {
                return Err(VerifyError::DanglingUse {
                    value: value.unique_name(),
                    node: user.kind().to_string(),
                    slot: entry.offset,
                    actual: actual
                        .map(|v| graph.value(v).unique_name())
                        .unwrap_or_else(|| "<nothing>".into()),
                });
            }
        }
    }
    Ok(())
}

/// Walking the list front to back, every input of every node must be
/// produced by a sentinel or by a node already walked.
fn check_topological_order(graph: &Graph) -> Result<(), VerifyError> {
    let mut defined: HashSet<NodeId> = HashSet::new();
    defined.insert(graph.input);
    defined.insert(graph.initializer);
    let consumers = graph.nodes().chain(std::iter::once(graph.output));
    for node in consumers {
        let record = graph.node(node);
        for &input in record.inputs() {
            let producer = graph.value(input).node();
            if defined.contains(&producer) {
                continue;
            }
            if !graph.node(producer).in_graph_list() {
                return Err(VerifyError::DetachedProducer {
                    node: record.kind().to_string(),
                    value: graph.value(input).unique_name(),
                });
            }
            return Err(VerifyError::UseBeforeDef {
                node: record.kind().to_string(),
                value: graph.value(input).unique_name(),
            });
        }
        defined.insert(node);
    }
    Ok(())
}
