//! View tree: composition, propagation and lifecycle of widgets built
//! around host-document nodes.

mod appender;
mod broadcast;
mod dispatch;
mod kind;
mod lifecycle;
mod slots;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::capabilities::Capabilities;
use crate::error::{TreeError, TreeResult};
use crate::event::{normalize_event_type, Listener, ViewEvent};
use crate::extensions::{HookPhase, HookPoint};
use crate::native::NativeNode;

pub use appender::Appender;
pub use kind::{DocumentTracking, IdGenerator, ViewType, ViewTypeBuilder};
pub use slots::Slot;

/// Process-unique view identifier handed out by an [`IdGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Live,
    Disposing,
    Disposed,
}

struct ViewInner {
    id: ViewId,
    kind: ViewType,
    root: RefCell<Option<NativeNode>>,
    parent: RefCell<Weak<ViewInner>>,
    children: RefCell<Vec<View>>,
    in_document: Cell<bool>,
    state: Cell<LifecycleState>,
    capabilities: RefCell<Capabilities>,
    slots: RefCell<BTreeMap<String, Slot>>,
}

/// A node of the view tree.
///
/// Cloning a `View` clones the handle, not the node. A view owns its native
/// root and its children; the parent link is weak.
#[derive(Clone)]
pub struct View(Rc<ViewInner>);

impl View {
    fn new(
        kind: ViewType,
        id: ViewId,
        root: NativeNode,
        in_document: bool,
        slots: BTreeMap<String, Slot>,
    ) -> Self {
        let capabilities = kind.capabilities().clone();
        Self(Rc::new(ViewInner {
            id,
            kind,
            root: RefCell::new(Some(root)),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            in_document: Cell::new(in_document),
            state: Cell::new(LifecycleState::Live),
            capabilities: RefCell::new(capabilities),
            slots: RefCell::new(slots),
        }))
    }

    pub fn id(&self) -> ViewId {
        self.0.id
    }

    pub fn kind(&self) -> &ViewType {
        &self.0.kind
    }

    /// The native root, or `None` once the view has been disposed.
    pub fn root(&self) -> Option<NativeNode> {
        self.0.root.borrow().clone()
    }

    pub fn parent(&self) -> Option<View> {
        self.0.parent.borrow().upgrade().map(View)
    }

    /// Snapshot of the children in attachment order.
    pub fn children(&self) -> Vec<View> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn is_in_document(&self) -> bool {
        self.0.in_document.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.0.state.get() == LifecycleState::Disposed
    }

    /// True when `other` sits somewhere below this view.
    pub fn is_ancestor_of(&self, other: &View) -> bool {
        let mut current = other.parent();
        while let Some(view) = current {
            if view == *self {
                return true;
            }
            current = view.parent();
        }
        false
    }

    pub fn capabilities(&self) -> Capabilities {
        self.0.capabilities.borrow().clone()
    }

    /// Gives this view its own capability set, derived from the current one.
    pub fn override_capabilities<F>(&self, change: F)
    where
        F: FnOnce(Capabilities) -> Capabilities,
    {
        let current = self.capabilities();
        *self.0.capabilities.borrow_mut() = change(current);
    }

    /// Resolves a selector against the native root.
    pub fn find(&self, selector: &str) -> TreeResult<Vec<NativeNode>> {
        let Some(root) = self.root() else {
            return Ok(Vec::new());
        };
        let query = self.capabilities().query()?.clone();
        query.query(&root, selector)
    }

    /// Starts attaching `child`; the mutation happens in [`Appender::at`].
    pub fn append(&self, child: &View) -> Appender {
        Appender::new(self.clone(), child.clone())
    }

    pub fn on(&self, event_type: &str, listener: Listener) -> TreeResult<()> {
        self.ensure_live()?;
        let event_type = normalize_event_type(event_type)?;
        let emitter = self.capabilities().emitter()?.clone();
        emitter.on(self.id(), &event_type, listener);
        Ok(())
    }

    /// Registers `listener` unless it is already registered for the type.
    pub fn add_event_listener(&self, event_type: &str, listener: Listener) -> TreeResult<()> {
        self.ensure_live()?;
        let event_type = normalize_event_type(event_type)?;
        let emitter = self.capabilities().emitter()?.clone();
        if !emitter.has_listener(self.id(), &event_type, &listener) {
            emitter.on(self.id(), &event_type, listener);
        }
        Ok(())
    }

    pub fn remove_event_listener(&self, event_type: &str, listener: &Listener) -> TreeResult<()> {
        let event_type = normalize_event_type(event_type)?;
        let emitter = self.capabilities().emitter()?.clone();
        emitter.remove_listener(self.id(), &event_type, listener);
        Ok(())
    }

    pub fn set_slot(&self, key: impl Into<String>, value: impl Into<Slot>) {
        self.0.slots.borrow_mut().insert(key.into(), value.into());
    }

    pub fn slot(&self, key: &str) -> Option<Slot> {
        self.0.slots.borrow().get(key).cloned()
    }

    pub fn take_slot(&self, key: &str) -> Option<Slot> {
        self.0.slots.borrow_mut().remove(key)
    }

    pub fn slot_names(&self) -> Vec<String> {
        self.0.slots.borrow().keys().cloned().collect()
    }

    pub(crate) fn slots_snapshot(&self) -> Vec<Slot> {
        self.0.slots.borrow().values().cloned().collect()
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Emits `event` on this view only, with this view as current target.
    pub(crate) fn emit(&self, event: &mut ViewEvent) -> TreeResult<()> {
        let emitter = self.capabilities().emitter()?.clone();
        event.set_current_target(self);
        let event_type = event.event_type().to_string();
        emitter.emit(self, &event_type, event)
    }

    pub(crate) fn ensure_live(&self) -> TreeResult<()> {
        if self.0.state.get() == LifecycleState::Live {
            Ok(())
        } else {
            Err(TreeError::Disposed(self.id()))
        }
    }

    pub(crate) fn run_hooks(
        &self,
        phase: HookPhase,
        point: HookPoint,
        related: Option<&View>,
    ) -> TreeResult<()> {
        self.kind().hooks().run(phase, point, self, related)
    }

    fn link_parent(&self, parent: &View) {
        *self.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
    }

    fn unlink_parent(&self) {
        *self.0.parent.borrow_mut() = Weak::new();
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for View {}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id())
            .field("kind", &self.kind().name())
            .field("children", &self.child_count())
            .field("in_document", &self.is_in_document())
            .field("state", &self.0.state.get())
            .finish()
    }
}
