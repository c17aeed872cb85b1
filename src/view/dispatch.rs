use super::View;
use crate::error::TreeResult;
use crate::event::{Propagation, ViewEvent};

impl View {
    /// Emits `event` on this view, then on each ancestor while the event
    /// bubbles and nobody stopped it.
    ///
    /// The parent is re-read after every level, so a listener that detaches
    /// the current view ends the walk there. Returns whether the default
    /// action was prevented.
    pub fn dispatch_event(&self, event: &mut ViewEvent) -> TreeResult<bool> {
        event.normalize_type()?;
        event.begin(Propagation::Dispatch, self);

        let result = self.bubble(event);
        event.finish();
        result?;

        Ok(event.default_prevented())
    }

    fn bubble(&self, event: &mut ViewEvent) -> TreeResult<()> {
        let mut current = self.clone();
        loop {
            current.emit(event)?;
            if !event.bubbles() || event.propagation_stopped() {
                return Ok(());
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Ok(()),
            }
        }
    }
}
