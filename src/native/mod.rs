//! Host-document handles and the helpers the tree needs around them.

mod query;
mod template;

use kuchiki::{NodeData, NodeRef};

use crate::error::{TreeError, TreeResult};

pub use query::SelectorQuery;
pub use template::{deep_clone, TemplateCache, DEFAULT_TEMPLATE};

/// Handle to a node of the host document.
pub type NativeNode = NodeRef;

/// Location a child's native root is inserted under.
///
/// Query results can be passed straight through: a one-element sequence is
/// unwrapped to its node.
#[derive(Debug, Clone)]
pub enum InsertionPoint {
    Node(NativeNode),
    Nodes(Vec<NativeNode>),
}

impl InsertionPoint {
    pub(crate) fn resolve(self) -> TreeResult<NativeNode> {
        let node = match self {
            InsertionPoint::Node(node) => node,
            InsertionPoint::Nodes(mut nodes) => {
                if nodes.len() != 1 {
                    return Err(TreeError::InvalidInsertionPoint(format!(
                        "expected a single node, got {}",
                        nodes.len()
                    )));
                }
                nodes.remove(0)
            }
        };
        if !accepts_children(&node) {
            return Err(TreeError::InvalidInsertionPoint(describe(&node)));
        }
        Ok(node)
    }
}

impl From<NativeNode> for InsertionPoint {
    fn from(node: NativeNode) -> Self {
        InsertionPoint::Node(node)
    }
}

impl From<&NativeNode> for InsertionPoint {
    fn from(node: &NativeNode) -> Self {
        InsertionPoint::Node(node.clone())
    }
}

impl From<Vec<NativeNode>> for InsertionPoint {
    fn from(nodes: Vec<NativeNode>) -> Self {
        InsertionPoint::Nodes(nodes)
    }
}

impl From<&[NativeNode]> for InsertionPoint {
    fn from(nodes: &[NativeNode]) -> Self {
        InsertionPoint::Nodes(nodes.to_vec())
    }
}

impl<const N: usize> From<[NativeNode; N]> for InsertionPoint {
    fn from(nodes: [NativeNode; N]) -> Self {
        InsertionPoint::Nodes(nodes.into())
    }
}

/// True when the node's top-most ancestor is a document.
pub fn is_in_document(node: &NativeNode) -> bool {
    node.inclusive_ancestors()
        .last()
        .is_some_and(|top| top.as_document().is_some())
}

fn accepts_children(node: &NativeNode) -> bool {
    matches!(
        node.data(),
        NodeData::Element(_) | NodeData::Document(_) | NodeData::DocumentFragment
    )
}

/// Short human readable label, used in errors and diagnostics.
pub fn describe(node: &NativeNode) -> String {
    match node.data() {
        NodeData::Element(element) => {
            let attributes = element.attributes.borrow();
            match attributes.get("id") {
                Some(id) => format!("<{}#{}>", &*element.name.local, id),
                None => format!("<{}>", &*element.name.local),
            }
        }
        NodeData::Text(_) => "#text".to_string(),
        NodeData::Comment(_) => "#comment".to_string(),
        NodeData::ProcessingInstruction(_) => "#processing-instruction".to_string(),
        NodeData::Doctype(_) => "#doctype".to_string(),
        NodeData::Document(_) => "#document".to_string(),
        NodeData::DocumentFragment => "#document-fragment".to_string(),
    }
}
