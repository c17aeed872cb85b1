use std::fmt;
use std::time::Instant;

use serde_json::Value as JsonValue;

use crate::error::{TreeError, TreeResult};
use crate::view::View;

/// How an event is travelling through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Target first, then each ancestor while the event bubbles.
    Dispatch,
    /// Target first, then every descendant level by level.
    Broadcast,
}

/// Event record carried through one propagation pass.
///
/// Listeners receive it mutably: they may prevent the default action (when
/// the event is cancelable) or stop a dispatch from reaching further
/// ancestors. Everything else is driven by the propagation engine.
#[derive(Clone)]
pub struct ViewEvent {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    default_prevented: bool,
    target: Option<View>,
    current_target: Option<View>,
    related: Option<View>,
    detail: JsonValue,
    time_stamp: Instant,
    propagation_stopped: bool,
    mode: Option<Propagation>,
}

impl ViewEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: false,
            cancelable: false,
            default_prevented: false,
            target: None,
            current_target: None,
            related: None,
            detail: JsonValue::Null,
            time_stamp: Instant::now(),
            propagation_stopped: false,
            mode: None,
        }
    }

    pub fn bubbling(mut self) -> Self {
        self.bubbles = true;
        self
    }

    pub fn cancelable(mut self) -> Self {
        self.cancelable = true;
        self
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Auxiliary view, e.g. the former parent of a detached view.
    pub fn with_related(mut self, related: View) -> Self {
        self.related = Some(related);
        self
    }

    pub fn with_detail(mut self, detail: JsonValue) -> Self {
        self.detail = detail;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn target(&self) -> Option<&View> {
        self.target.as_ref()
    }

    pub fn current_target(&self) -> Option<&View> {
        self.current_target.as_ref()
    }

    pub fn related(&self) -> Option<&View> {
        self.related.as_ref()
    }

    pub fn detail(&self) -> &JsonValue {
        &self.detail
    }

    pub fn time_stamp(&self) -> Instant {
        self.time_stamp
    }

    pub fn propagation(&self) -> Option<Propagation> {
        self.mode
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Has no effect unless the event is cancelable.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Keeps the event from reaching further ancestors. The view currently
    /// processing the event still runs all of its listeners.
    pub fn stop_propagation(&mut self) -> TreeResult<()> {
        if self.mode == Some(Propagation::Broadcast) {
            return Err(TreeError::UnstoppableBroadcast);
        }
        self.propagation_stopped = true;
        Ok(())
    }

    /// Validates and lower-cases the event type in place.
    pub(crate) fn normalize_type(&mut self) -> TreeResult<()> {
        self.event_type = normalize_event_type(&self.event_type)?;
        Ok(())
    }

    pub(crate) fn begin(&mut self, mode: Propagation, target: &View) {
        self.mode = Some(mode);
        self.propagation_stopped = false;
        self.target = Some(target.clone());
        self.current_target = None;
    }

    pub(crate) fn set_current_target(&mut self, view: &View) {
        self.current_target = Some(view.clone());
    }

    pub(crate) fn finish(&mut self) {
        self.current_target = None;
    }
}

impl Default for ViewEvent {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for ViewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEvent")
            .field("type", &self.event_type)
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("default_prevented", &self.default_prevented)
            .field("target", &self.target.as_ref().map(View::id))
            .field("current_target", &self.current_target.as_ref().map(View::id))
            .field("mode", &self.mode)
            .finish()
    }
}

/// Canonical, lower-case form of an event type.
pub fn normalize_event_type(raw: &str) -> TreeResult<String> {
    if raw.is_empty() {
        return Err(TreeError::MissingEventType);
    }
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TreeError::InvalidEventType(raw.to_string()));
    }
    Ok(raw.to_lowercase())
}
