use super::View;
use crate::error::{TreeError, TreeResult};
use crate::event::{Propagation, ViewEvent};

impl View {
    /// Emits `event` on this view and then on every descendant, one level
    /// at a time. Broadcasts cannot bubble and cannot be stopped.
    pub fn broadcast(&self, event: &mut ViewEvent) -> TreeResult<()> {
        self.broadcast_with(event, |_| {})
    }

    /// Like [`View::broadcast`], calling `visit` on each view right before
    /// the event is emitted on it.
    pub(crate) fn broadcast_with<F>(&self, event: &mut ViewEvent, mut visit: F) -> TreeResult<()>
    where
        F: FnMut(&View),
    {
        event.normalize_type()?;
        if event.bubbles() {
            return Err(TreeError::BubblingBroadcast);
        }
        event.begin(Propagation::Broadcast, self);

        let result = self.emit_levels(event, &mut visit);
        event.finish();
        result
    }

    fn emit_levels<F>(&self, event: &mut ViewEvent, visit: &mut F) -> TreeResult<()>
    where
        F: FnMut(&View),
    {
        let mut level = vec![self.clone()];
        while !level.is_empty() {
            for view in &level {
                if view.is_disposed() {
                    continue;
                }
                visit(view);
                view.emit(event)?;
            }
            // Gathered after the level ran so listeners' mutations are seen.
            level = level
                .iter()
                .filter(|view| !view.is_disposed())
                .flat_map(View::children)
                .collect();
        }
        Ok(())
    }
}
