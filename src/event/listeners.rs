use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::capabilities::Emitter;
use crate::error::{TreeError, TreeResult};
use crate::event::ViewEvent;
use crate::view::{View, ViewId};

type ListenerFn = dyn Fn(&View, &mut ViewEvent) -> anyhow::Result<()>;

/// Shared listener callback. Two listeners are the same listener when they
/// wrap the same closure allocation.
#[derive(Clone)]
pub struct Listener(Rc<ListenerFn>);

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&View, &mut ViewEvent) -> anyhow::Result<()> + 'static,
    {
        Self(Rc::new(callback))
    }

    pub fn same(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub(crate) fn call(&self, view: &View, event: &mut ViewEvent) -> anyhow::Result<()> {
        (self.0)(view, event)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Default emitter backend: listeners keyed by view and event type.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RefCell<HashMap<ViewId, HashMap<String, Vec<Listener>>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self, view: ViewId, event_type: &str) -> usize {
        self.listeners
            .borrow()
            .get(&view)
            .and_then(|by_type| by_type.get(event_type))
            .map_or(0, Vec::len)
    }

    pub fn tracked_views(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn snapshot(&self, view: ViewId, event_type: &str) -> Vec<Listener> {
        self.listeners
            .borrow()
            .get(&view)
            .and_then(|by_type| by_type.get(event_type))
            .cloned()
            .unwrap_or_default()
    }
}

impl Emitter for ListenerRegistry {
    fn emit(&self, view: &View, event_type: &str, event: &mut ViewEvent) -> TreeResult<()> {
        // Listeners may register or remove listeners while running.
        for listener in self.snapshot(view.id(), event_type) {
            listener
                .call(view, event)
                .map_err(|source| TreeError::Listener {
                    event_type: event_type.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    fn on(&self, view: ViewId, event_type: &str, listener: Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let bucket = listeners
            .entry(view)
            .or_default()
            .entry(event_type.to_string())
            .or_default();
        if !bucket.iter().any(|existing| existing.same(&listener)) {
            bucket.push(listener);
        }
    }

    fn remove_listener(&self, view: ViewId, event_type: &str, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let Some(by_type) = listeners.get_mut(&view) else {
            return;
        };
        if let Some(bucket) = by_type.get_mut(event_type) {
            bucket.retain(|existing| !existing.same(listener));
            if bucket.is_empty() {
                by_type.remove(event_type);
            }
        }
        if by_type.is_empty() {
            listeners.remove(&view);
        }
    }

    fn remove_all_listeners(&self, view: ViewId) {
        self.listeners.borrow_mut().remove(&view);
    }

    fn has_listener(&self, view: ViewId, event_type: &str, listener: &Listener) -> bool {
        self.listeners
            .borrow()
            .get(&view)
            .and_then(|by_type| by_type.get(event_type))
            .is_some_and(|bucket| bucket.iter().any(|existing| existing.same(listener)))
    }
}
