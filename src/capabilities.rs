use std::fmt;
use std::rc::Rc;

use crate::error::{TreeError, TreeResult};
use crate::event::{Listener, ListenerRegistry, ViewEvent};
use crate::native::{NativeNode, SelectorQuery};
use crate::view::{View, ViewId};

/// Listener backend a view delegates its events to.
pub trait Emitter {
    /// Invokes every listener registered for `event_type` on `view`.
    fn emit(&self, view: &View, event_type: &str, event: &mut ViewEvent) -> TreeResult<()>;
    fn on(&self, view: ViewId, event_type: &str, listener: Listener);
    fn remove_listener(&self, view: ViewId, event_type: &str, listener: &Listener);
    fn remove_all_listeners(&self, view: ViewId);
    fn has_listener(&self, view: ViewId, event_type: &str, listener: &Listener) -> bool;
}

/// Resolves a selector against a view's native root.
pub trait Query {
    fn query(&self, root: &NativeNode, selector: &str) -> TreeResult<Vec<NativeNode>>;
}

type DisposeEventFactory = dyn Fn(&View) -> ViewEvent;

/// Capability set injected into a view type and inherited by its views.
///
/// The value is immutable once built; a view that needs different
/// capabilities gets its own copy through [`View::override_capabilities`].
#[derive(Clone, Default)]
pub struct Capabilities {
    emitter: Option<Rc<dyn Emitter>>,
    query: Option<Rc<dyn Query>>,
    dispose_event: Option<Rc<DisposeEventFactory>>,
    dev: bool,
}

impl Capabilities {
    /// Listener registry plus CSS selector queries.
    pub fn standard() -> Self {
        Self::default()
            .with_emitter(Rc::new(ListenerRegistry::new()))
            .with_query(Rc::new(SelectorQuery))
    }

    pub fn with_emitter(mut self, emitter: Rc<dyn Emitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_query(mut self, query: Rc<dyn Query>) -> Self {
        self.query = Some(query);
        self
    }

    /// Replaces the event dispatched on disposal.
    pub fn with_dispose_event<F>(mut self, factory: F) -> Self
    where
        F: Fn(&View) -> ViewEvent + 'static,
    {
        self.dispose_event = Some(Rc::new(factory));
        self
    }

    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn has_emitter(&self) -> bool {
        self.emitter.is_some()
    }

    pub fn emitter(&self) -> TreeResult<&Rc<dyn Emitter>> {
        self.emitter
            .as_ref()
            .ok_or(TreeError::MissingCapability("emit"))
    }

    pub fn query(&self) -> TreeResult<&Rc<dyn Query>> {
        self.query
            .as_ref()
            .ok_or(TreeError::MissingCapability("query"))
    }

    pub fn dev(&self) -> bool {
        self.dev
    }

    pub(crate) fn dispose_event(&self, view: &View) -> ViewEvent {
        match &self.dispose_event {
            Some(factory) => factory(view),
            None => ViewEvent::new(crate::event::types::DISPOSE).bubbling(),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("emitter", &self.emitter.is_some())
            .field("query", &self.query.is_some())
            .field("dispose_event", &self.dispose_event.is_some())
            .field("dev", &self.dev)
            .finish()
    }
}
