//! Development aids for spotting native nodes that outlive their view.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::warn;

use crate::native::{describe, NativeNode};
use crate::view::{Slot, View};

/// Every native node reachable from `view`: its root, its children's roots
/// and anything kept in slots, following nested views and shared cells.
/// Each node and each view is visited once, so cyclic slot graphs are fine.
pub fn collect_nodes(view: &View) -> Vec<NativeNode> {
    let mut collector = Collector::default();
    collector.visit_view(view);
    collector.nodes
}

/// Logs the nodes a disposed view still reaches. Never fails.
pub fn report_stray_nodes(view: &View) -> Vec<NativeNode> {
    let nodes = collect_nodes(view);
    if !nodes.is_empty() {
        warn!(
            target = "view",
            id = %view.id(),
            count = nodes.len(),
            "disposed view still references native nodes; release them in a dispose hook"
        );
        let labels: Vec<String> = nodes.iter().map(describe).collect();
        warn!(target = "view", id = %view.id(), nodes = ?labels, "stray native nodes");
    }
    nodes
}

#[derive(Default)]
struct Collector {
    seen: HashSet<usize>,
    nodes: Vec<NativeNode>,
}

impl Collector {
    fn visit_view(&mut self, view: &View) {
        if !self.seen.insert(view.address()) {
            return;
        }
        if let Some(root) = view.root() {
            self.visit_node(root);
        }
        for child in view.children() {
            self.visit_view(&child);
        }
        for slot in view.slots_snapshot() {
            self.visit_slot(&slot);
        }
    }

    fn visit_node(&mut self, node: NativeNode) {
        if self.seen.insert(Rc::as_ptr(&node.0) as usize) {
            self.nodes.push(node);
        }
    }

    fn visit_slot(&mut self, slot: &Slot) {
        match slot {
            Slot::Node(node) => self.visit_node(node.clone()),
            Slot::View(view) => self.visit_view(view),
            Slot::List(items) => {
                for item in items {
                    self.visit_slot(item);
                }
            }
            Slot::Map(entries) => {
                for item in entries.values() {
                    self.visit_slot(item);
                }
            }
            Slot::Value(_) => {}
            Slot::Shared(cell) => {
                if !self.seen.insert(Rc::as_ptr(cell) as usize) {
                    return;
                }
                // A cell borrowed mutably elsewhere is skipped, not waited on.
                let inner = match cell.try_borrow() {
                    Ok(inner) => inner.clone(),
                    Err(_) => return,
                };
                self.visit_slot(&inner);
            }
        }
    }
}
