use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use kuchiki::traits::*;
use kuchiki::{parse_html, NodeData, NodeRef};

use super::NativeNode;
use crate::error::{TreeError, TreeResult};

pub const DEFAULT_TEMPLATE: &str = "<div></div>";

const PREVIEW_CHARS: usize = 20;

/// Parsed templates, keyed by their source text.
///
/// Each template is parsed once; every instantiation gets a deep copy that
/// is not attached to any document.
#[derive(Clone, Default)]
pub struct TemplateCache {
    known: Rc<RefCell<HashMap<String, NativeNode>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instantiate(&self, html: &str) -> TreeResult<NativeNode> {
        if let Some(prototype) = self.known.borrow().get(html) {
            return Ok(deep_clone(prototype));
        }

        let prototype = parse_root(html)?;
        let instance = deep_clone(&prototype);
        self.known.borrow_mut().insert(html.to_string(), prototype);
        Ok(instance)
    }

    pub fn len(&self) -> usize {
        self.known.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.borrow().is_empty()
    }
}

fn parse_root(html: &str) -> TreeResult<NativeNode> {
    let document = parse_html().one(html);
    let body = document
        .select_first("body")
        .map_err(|_| TreeError::TemplateWithoutRoot(preview(html)))?;

    let mut root = None;
    for child in body.as_node().children() {
        if child.as_element().is_none() {
            continue;
        }
        if root.is_some() {
            return Err(TreeError::TemplateWithMultipleRoots(preview(html)));
        }
        root = Some(child);
    }

    let root = root.ok_or_else(|| TreeError::TemplateWithoutRoot(preview(html)))?;
    root.detach();
    Ok(root)
}

fn preview(html: &str) -> String {
    let collapsed = html.split_whitespace().collect::<Vec<_>>().join(" ");
    let head: String = collapsed.chars().take(PREVIEW_CHARS).collect();
    format!("'{head}...'")
}

/// Copies an element subtree. Only elements, text and comments are copied,
/// which is everything an HTML body can hold.
pub fn deep_clone(node: &NativeNode) -> NativeNode {
    let copy = shallow_clone(node).unwrap_or_else(|| NodeRef::new(NodeData::DocumentFragment));
    append_cloned_children(node, &copy);
    copy
}

fn shallow_clone(node: &NativeNode) -> Option<NativeNode> {
    match node.data() {
        NodeData::Element(element) => Some(NodeRef::new_element(
            element.name.clone(),
            element.attributes.borrow().map.clone(),
        )),
        NodeData::Text(text) => Some(NodeRef::new_text(text.borrow().clone())),
        NodeData::Comment(comment) => Some(NodeRef::new_comment(comment.borrow().clone())),
        _ => None,
    }
}

fn append_cloned_children(source: &NativeNode, copy: &NativeNode) {
    for child in source.children() {
        if let Some(child_copy) = shallow_clone(&child) {
            append_cloned_children(&child, &child_copy);
            copy.append(child_copy);
        }
    }
}
