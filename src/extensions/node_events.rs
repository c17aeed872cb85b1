use std::rc::Rc;

use super::Extension;
use crate::error::{TreeError, TreeResult};
use crate::event::ListenerRegistry;
use crate::native::SelectorQuery;
use crate::view::ViewTypeBuilder;

/// Installs a fresh [`ListenerRegistry`] as the view type's emitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeEvents;

impl Extension for NodeEvents {
    fn install(self, builder: &mut ViewTypeBuilder) -> TreeResult<()> {
        let capabilities = builder.capabilities_mut();
        if capabilities.has_emitter() {
            return Err(TreeError::CapabilityConflict("emit"));
        }
        let installed = std::mem::take(capabilities).with_emitter(Rc::new(ListenerRegistry::new()));
        *capabilities = installed;
        Ok(())
    }
}

/// Installs CSS selector queries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorQueries;

impl Extension for SelectorQueries {
    fn install(self, builder: &mut ViewTypeBuilder) -> TreeResult<()> {
        let capabilities = builder.capabilities_mut();
        let installed = std::mem::take(capabilities).with_query(Rc::new(SelectorQuery));
        *capabilities = installed;
        Ok(())
    }
}
