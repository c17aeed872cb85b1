//! View-tree runtime for composing widgets around host-document nodes.
//!
//! Views attach and detach through a two-phase [`Appender`], propagate
//! events upward with [`View::dispatch_event`] or downward with
//! [`View::broadcast`], and tear their whole subtree down with
//! [`View::dispose`].

pub mod capabilities;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod extensions;
pub mod native;
pub mod view;

// Re-export commonly used types
pub use capabilities::{Capabilities, Emitter, Query};
pub use config::{ConfigError, RuntimeConfig};
pub use error::{TreeError, TreeResult};
pub use event::{Listener, ListenerRegistry, Propagation, ViewEvent};
pub use extensions::{
    CustomElements, Extension, HookContext, HookPhase, HookPoint, NodeEvents, SelectorQueries,
};
pub use native::{InsertionPoint, NativeNode, TemplateCache};
pub use view::{
    Appender, DocumentTracking, IdGenerator, Slot, View, ViewId, ViewType, ViewTypeBuilder,
};
