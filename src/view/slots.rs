use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value as JsonValue;

use super::View;
use crate::native::NativeNode;

/// Named value kept on a view: widget state, named child views, cached
/// native nodes and the like.
#[derive(Debug, Clone)]
pub enum Slot {
    Node(NativeNode),
    View(View),
    List(Vec<Slot>),
    Map(BTreeMap<String, Slot>),
    Value(JsonValue),
    Shared(Rc<RefCell<Slot>>),
}

impl Slot {
    pub fn shared(slot: Slot) -> Self {
        Slot::Shared(Rc::new(RefCell::new(slot)))
    }

    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&View> {
        match self {
            Slot::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NativeNode> {
        match self {
            Slot::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<NativeNode> for Slot {
    fn from(node: NativeNode) -> Self {
        Slot::Node(node)
    }
}

impl From<View> for Slot {
    fn from(view: View) -> Self {
        Slot::View(view)
    }
}

impl From<JsonValue> for Slot {
    fn from(value: JsonValue) -> Self {
        Slot::Value(value)
    }
}

impl From<Vec<Slot>> for Slot {
    fn from(items: Vec<Slot>) -> Self {
        Slot::List(items)
    }
}

impl From<BTreeMap<String, Slot>> for Slot {
    fn from(entries: BTreeMap<String, Slot>) -> Self {
        Slot::Map(entries)
    }
}
