use tracing::debug;

use super::{DocumentTracking, View};
use crate::error::{TreeError, TreeResult};
use crate::event::{types, ViewEvent};
use crate::extensions::{HookPhase, HookPoint};
use crate::native::{InsertionPoint, NativeNode};

/// Pending attachment of `child` under `parent`, returned by
/// [`View::append`]. Nothing changes until [`Appender::at`] is called.
#[must_use = "the child is only attached once `at` is called"]
#[derive(Debug)]
pub struct Appender {
    parent: View,
    child: View,
}

impl Appender {
    pub(crate) fn new(parent: View, child: View) -> Self {
        Self { parent, child }
    }

    /// Attaches the child under the parent's own root.
    pub fn at_root(self) -> TreeResult<()> {
        let root = self
            .parent
            .root()
            .ok_or(TreeError::Disposed(self.parent.id()))?;
        self.at(root)
    }

    /// Inserts the child's native root under `point` and links the views.
    ///
    /// A child that already has a parent is detached from it first.
    pub fn at(self, point: impl Into<InsertionPoint>) -> TreeResult<()> {
        let Appender { parent, child } = self;
        let target = point.into().resolve()?;

        let child_root = check_attachable(&parent, &child, &target)?;
        parent.capabilities().emitter()?;

        child.run_hooks(HookPhase::Before, HookPoint::Attach, Some(&parent))?;

        if child.parent().is_some() {
            child.detach()?;
            // Detach listeners may have moved or disposed either view.
            if child.parent().is_some() {
                return Err(TreeError::Reattached(child.id()));
            }
            check_attachable(&parent, &child, &target)?;
        }

        target.append(child_root);
        child.link_parent(&parent);
        child.0.in_document.set(parent.is_in_document());
        parent.0.children.borrow_mut().push(child.clone());

        debug!(
            target = "view",
            parent = %parent.id(),
            child = %child.id(),
            in_document = child.is_in_document(),
            "attached view"
        );

        let mut attached = ViewEvent::new(types::CHILD)
            .bubbling()
            .with_related(child.clone());
        parent.dispatch_event(&mut attached)?;

        if parent.kind().document_tracking() == DocumentTracking::Broadcast
            && parent.is_in_document()
        {
            let mut entered = ViewEvent::new(types::DOCUMENT).with_related(parent.clone());
            child.broadcast_with(&mut entered, |view| view.0.in_document.set(true))?;
        }

        child.run_hooks(HookPhase::After, HookPoint::Attach, Some(&parent))
    }
}

fn check_attachable(parent: &View, child: &View, target: &NativeNode) -> TreeResult<NativeNode> {
    parent.ensure_live()?;
    child.ensure_live()?;
    let would_cycle = || TreeError::WouldCycle {
        parent: parent.id(),
        child: child.id(),
    };
    if parent == child || child.is_ancestor_of(parent) {
        return Err(would_cycle());
    }
    let child_root = child.root().ok_or(TreeError::Disposed(child.id()))?;
    if target.inclusive_ancestors().any(|node| node == child_root) {
        return Err(would_cycle());
    }
    Ok(child_root)
}
