use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use tracing::debug;

use super::{Slot, View, ViewId};
use crate::capabilities::Capabilities;
use crate::config::RuntimeConfig;
use crate::error::{TreeError, TreeResult};
use crate::extensions::{Extension, HookContext, HookPhase, HookPoint, Hooks};
use crate::native::{describe, is_in_document, NativeNode, TemplateCache, DEFAULT_TEMPLATE};

/// Hands out monotonic view ids. Clones share the same counter, so every
/// view type built from one generator produces distinct ids.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: Rc<Cell<u64>>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> ViewId {
        let id = self.last.get() + 1;
        self.last.set(id);
        ViewId::new(id)
    }

    pub fn issued(&self) -> u64 {
        self.last.get()
    }
}

/// How the in-document flag travels when a view is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTracking {
    /// Only the attached child inherits its new parent's flag.
    #[default]
    Inherit,
    /// The whole subtree is marked and receives a `document` broadcast.
    Broadcast,
}

struct ViewTypeInner {
    name: String,
    template: String,
    templates: TemplateCache,
    capabilities: Capabilities,
    hooks: Hooks,
    ids: IdGenerator,
    tracking: DocumentTracking,
}

/// A kind of view: template, capability set, hooks and id source shared
/// by every view it constructs.
#[derive(Clone)]
pub struct ViewType(Rc<ViewTypeInner>);

impl ViewType {
    pub fn builder(name: impl Into<String>, ids: &IdGenerator) -> ViewTypeBuilder {
        ViewTypeBuilder {
            name: name.into(),
            template: DEFAULT_TEMPLATE.to_string(),
            templates: TemplateCache::new(),
            capabilities: Capabilities::default(),
            hooks: Hooks::default(),
            ids: ids.clone(),
            tracking: DocumentTracking::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn template(&self) -> &str {
        &self.0.template
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.0.capabilities
    }

    pub fn document_tracking(&self) -> DocumentTracking {
        self.0.tracking
    }

    /// Builds a view whose root is a fresh copy of the template.
    pub fn create(&self) -> TreeResult<View> {
        self.create_with(BTreeMap::new())
    }

    /// Like [`ViewType::create`], starting with the given slots.
    pub fn create_with(&self, slots: BTreeMap<String, Slot>) -> TreeResult<View> {
        let root = self.0.templates.instantiate(&self.0.template)?;
        self.construct(root, slots)
    }

    /// Builds a view around an existing element. The view is in document
    /// when the element is.
    pub fn adopt(&self, root: NativeNode) -> TreeResult<View> {
        if root.as_element().is_none() {
            return Err(TreeError::InvalidInsertionPoint(describe(&root)));
        }
        self.construct(root, BTreeMap::new())
    }

    fn construct(&self, root: NativeNode, slots: BTreeMap<String, Slot>) -> TreeResult<View> {
        let in_document = is_in_document(&root);
        let view = View::new(self.clone(), self.0.ids.next_id(), root, in_document, slots);

        view.run_hooks(HookPhase::Before, HookPoint::Construct, None)?;
        debug!(
            target = "view",
            id = %view.id(),
            kind = %self.name(),
            in_document,
            "constructed view"
        );
        view.run_hooks(HookPhase::After, HookPoint::Construct, None)?;

        Ok(view)
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.0.hooks
    }
}

impl PartialEq for ViewType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewType")
            .field("name", &self.0.name)
            .field("template", &self.0.template)
            .field("capabilities", &self.0.capabilities)
            .field("tracking", &self.0.tracking)
            .finish()
    }
}

/// Configures a [`ViewType`]. Extensions receive the builder mutably and
/// may inject capabilities or hooks.
pub struct ViewTypeBuilder {
    name: String,
    template: String,
    templates: TemplateCache,
    capabilities: Capabilities,
    hooks: Hooks,
    ids: IdGenerator,
    tracking: DocumentTracking,
}

impl ViewTypeBuilder {
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Shares a template cache with other view types.
    pub fn templates(mut self, templates: &TemplateCache) -> Self {
        self.templates = templates.clone();
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn dev(mut self, dev: bool) -> Self {
        self.capabilities = self.capabilities.with_dev(dev);
        self
    }

    pub fn document_tracking(mut self, tracking: DocumentTracking) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn config(self, config: &RuntimeConfig) -> Self {
        self.template(config.template.clone())
            .dev(config.dev)
            .document_tracking(config.document_tracking)
    }

    /// Runs `extension` once against this builder.
    pub fn use_extension(mut self, extension: impl Extension) -> TreeResult<Self> {
        extension.install(&mut self)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    pub fn before<F>(&mut self, point: HookPoint, hook: F) -> &mut Self
    where
        F: Fn(&HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.hooks.add(HookPhase::Before, point, hook);
        self
    }

    pub fn after<F>(&mut self, point: HookPoint, hook: F) -> &mut Self
    where
        F: Fn(&HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.hooks.add(HookPhase::After, point, hook);
        self
    }

    pub fn build(self) -> ViewType {
        ViewType(Rc::new(ViewTypeInner {
            name: self.name,
            template: self.template,
            templates: self.templates,
            capabilities: self.capabilities,
            hooks: self.hooks,
            ids: self.ids,
            tracking: self.tracking,
        }))
    }
}
