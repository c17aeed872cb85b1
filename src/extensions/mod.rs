//! Extension points of a [`ViewType`](crate::view::ViewType).
//!
//! An extension runs once against a [`ViewTypeBuilder`] while the type is
//! being configured. It can inject capabilities, or register hooks that run
//! before or after the named view operations.

mod custom_elements;
mod node_events;

use std::fmt;
use std::rc::Rc;

use crate::error::{TreeError, TreeResult};
use crate::view::{View, ViewTypeBuilder};

pub use custom_elements::CustomElements;
pub use node_events::{NodeEvents, SelectorQueries};

/// Operations hooks can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    Construct,
    Attach,
    Detach,
    Dispose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Before,
    After,
}

/// What a hook gets to see. For attach and detach hooks `view` is the child
/// and `related` the parent.
pub struct HookContext<'a> {
    pub view: &'a View,
    pub related: Option<&'a View>,
    pub point: HookPoint,
    pub phase: HookPhase,
}

type HookFn = dyn Fn(&HookContext<'_>) -> anyhow::Result<()>;

#[derive(Clone, Default)]
pub(crate) struct Hooks {
    entries: Vec<(HookPhase, HookPoint, Rc<HookFn>)>,
}

impl Hooks {
    pub(crate) fn add<F>(&mut self, phase: HookPhase, point: HookPoint, hook: F)
    where
        F: Fn(&HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.entries.push((phase, point, Rc::new(hook)));
    }

    pub(crate) fn run(
        &self,
        phase: HookPhase,
        point: HookPoint,
        view: &View,
        related: Option<&View>,
    ) -> TreeResult<()> {
        let context = HookContext {
            view,
            related,
            point,
            phase,
        };
        for (_, _, hook) in self
            .entries
            .iter()
            .filter(|(p, o, _)| *p == phase && *o == point)
        {
            hook(&context).map_err(|source| TreeError::Hook { point, source })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Something that configures a view type once, at registration time.
pub trait Extension {
    fn install(self, builder: &mut ViewTypeBuilder) -> TreeResult<()>;
}

impl<F> Extension for F
where
    F: FnOnce(&mut ViewTypeBuilder) -> TreeResult<()>,
{
    fn install(self, builder: &mut ViewTypeBuilder) -> TreeResult<()> {
        self(builder)
    }
}
