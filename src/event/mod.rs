mod listeners;
mod record;

pub use listeners::{Listener, ListenerRegistry};
pub use record::{normalize_event_type, Propagation, ViewEvent};

/// Event types emitted by the tree itself.
pub mod types {
    /// Dispatched on a parent after a child was attached.
    pub const CHILD: &str = "child";
    /// Broadcast over a subtree that entered the host document.
    pub const DOCUMENT: &str = "document";
    /// Dispatched on a view after it left its parent.
    pub const DETACH: &str = "detach";
    /// Dispatched on a view when it is disposed.
    pub const DISPOSE: &str = "dispose";
}
