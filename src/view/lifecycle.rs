use tracing::debug;

use super::{LifecycleState, View};
use crate::diagnostics::report_stray_nodes;
use crate::error::{TreeError, TreeResult};
use crate::event::{types, ViewEvent};
use crate::extensions::{HookPhase, HookPoint};

impl View {
    /// Detaches this view from its parent. Does nothing without a parent.
    pub fn detach(&self) -> TreeResult<()> {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => Ok(()),
        }
    }

    /// Detaches `child` from this view. Views that are not children of this
    /// view are left alone.
    ///
    /// The relationship is fully unlinked before the `detach` event fires on
    /// the child; the event carries the former parent as related view.
    pub fn remove_child(&self, child: &View) -> TreeResult<()> {
        let position = self.0.children.borrow().iter().position(|c| c == child);
        let Some(position) = position else {
            return Ok(());
        };
        child.capabilities().emitter()?;

        child.run_hooks(HookPhase::Before, HookPoint::Detach, Some(self))?;

        self.sever(position, child);

        debug!(
            target = "view",
            parent = %self.id(),
            child = %child.id(),
            "detached view"
        );

        let mut detached = ViewEvent::new(types::DETACH)
            .bubbling()
            .with_related(self.clone());
        child.dispatch_event(&mut detached)?;

        child.run_hooks(HookPhase::After, HookPoint::Detach, Some(self))
    }

    /// Unlinks `child` without hooks or events. Used when teardown has to
    /// go on after a detach failed.
    fn force_remove(&self, child: &View) {
        let position = self.0.children.borrow().iter().position(|c| c == child);
        if let Some(position) = position {
            self.sever(position, child);
            debug!(
                target = "view",
                parent = %self.id(),
                child = %child.id(),
                "force-detached view"
            );
        } else if child.parent().as_ref() == Some(self) {
            child.unlink_parent();
        }
    }

    fn sever(&self, position: usize, child: &View) {
        if let Some(root) = child.root() {
            root.detach();
        }
        child.unlink_parent();
        child.0.in_document.set(false);
        self.0.children.borrow_mut().remove(position);
    }

    /// Tears the view and its whole subtree down.
    ///
    /// Teardown always runs to completion; the first error met on the way
    /// is returned afterwards. Disposing twice is a no-op.
    pub fn dispose(&self) -> TreeResult<()> {
        if self.0.state.get() != LifecycleState::Live {
            return Ok(());
        }
        let capabilities = self.capabilities();
        let emitter = capabilities.emitter()?.clone();
        self.run_hooks(HookPhase::Before, HookPoint::Dispose, None)?;
        self.0.state.set(LifecycleState::Disposing);

        let mut first_error: Option<TreeError> = None;
        let mut keep = |result: TreeResult<()>| {
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        };

        keep(self.detach());
        // A vetoed detach still has to leave the parent consistent.
        if let Some(parent) = self.parent() {
            parent.force_remove(self);
        }

        let mut disposed = capabilities.dispose_event(self);
        keep(self.dispatch_event(&mut disposed).map(|_| ()));

        emitter.remove_all_listeners(self.id());

        // Children detach themselves while disposing.
        for child in self.children() {
            keep(child.dispose());
            if child.parent().as_ref() == Some(self) {
                self.force_remove(&child);
            }
        }
        for child in self.children() {
            self.force_remove(&child);
        }

        let root = self.0.root.borrow_mut().take();
        if let Some(root) = root {
            root.detach();
        }

        if capabilities.dev() {
            report_stray_nodes(self);
        }
        self.0.slots.borrow_mut().clear();
        self.0.in_document.set(false);
        self.0.state.set(LifecycleState::Disposed);

        debug!(target = "view", id = %self.id(), "disposed view");

        keep(self.run_hooks(HookPhase::After, HookPoint::Dispose, None));

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
