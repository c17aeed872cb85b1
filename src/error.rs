use thiserror::Error;

use crate::extensions::HookPoint;
use crate::view::ViewId;

/// Result alias used across the crate.
pub type TreeResult<T> = Result<T, TreeError>;

/// Contract violations raised synchronously by the view tree.
///
/// Every variant signals a programmer error. Detaching an already detached
/// view or removing a view that is not a child are not errors and never
/// show up here.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("event type is missing")]
    MissingEventType,
    #[error("event type '{0}' is not a valid identifier")]
    InvalidEventType(String),
    #[error("broadcast events must not bubble")]
    BubblingBroadcast,
    #[error("stopPropagation() is not supported on broadcast events")]
    UnstoppableBroadcast,
    #[error("insertion point is not a native element handle: {0}")]
    InvalidInsertionPoint(String),
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: ViewId, child: ViewId },
    #[error("{0} was attached elsewhere while leaving its parent")]
    Reattached(ViewId),
    #[error("{0} has been disposed")]
    Disposed(ViewId),
    #[error("capability '{0}' is not configured")]
    MissingCapability(&'static str),
    #[error("capability '{0}' is already defined")]
    CapabilityConflict(&'static str),
    #[error("invalid selector '{0}'")]
    InvalidSelector(String),
    #[error("could not find a root node in template {0}")]
    TemplateWithoutRoot(String),
    #[error("template {0} has more than one root node")]
    TemplateWithMultipleRoots(String),
    #[error("listener for '{event_type}' failed: {source}")]
    Listener {
        event_type: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{point:?} hook failed: {source}")]
    Hook {
        point: HookPoint,
        #[source]
        source: anyhow::Error,
    },
}

impl TreeError {
    /// Returns the contract violation raised inside a listener, if the
    /// listener propagated one with `?`.
    pub fn listener_cause(&self) -> Option<&TreeError> {
        match self {
            TreeError::Listener { source, .. } => source.downcast_ref::<TreeError>(),
            _ => None,
        }
    }
}
