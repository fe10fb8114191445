//! Type-key to constructor lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use tlm_node::NodeTypeRegistry;
use tracing::warn;

use crate::component::{Component, ComponentInstance};
use crate::error::ComponentResult;
use crate::library;

pub type CreatorFn = fn() -> Box<dyn Component>;

/// Explicit factory: owned by whoever builds models, never global.
#[derive(Clone)]
pub struct ComponentRegistry {
    node_types: Arc<NodeTypeRegistry>,
    creators: BTreeMap<String, CreatorFn>,
}

impl core::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.creators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(NodeTypeRegistry::with_builtin())
    }
}

impl ComponentRegistry {
    /// An empty registry over the given node types.
    pub fn new(node_types: NodeTypeRegistry) -> Self {
        Self {
            node_types: Arc::new(node_types),
            creators: BTreeMap::new(),
        }
    }

    /// Built-in node types and the built-in component library.
    pub fn with_builtin() -> Self {
        let mut reg = Self::default();
        library::register_all(&mut reg);
        reg
    }

    pub fn node_types(&self) -> &Arc<NodeTypeRegistry> {
        &self.node_types
    }

    /// Register `creator` under `type_key`. The first registration wins;
    /// later ones are logged and ignored.
    pub fn register(&mut self, type_key: &str, creator: CreatorFn) -> bool {
        if self.creators.contains_key(type_key) {
            warn!(type_key, "component type already registered, keeping the first");
            return false;
        }
        self.creators.insert(type_key.to_string(), creator);
        true
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.creators.contains_key(type_key)
    }

    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.creators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    /// Construct and configure an instance; `None` for an unknown key.
    pub fn create(&self, type_key: &str, name: &str) -> Option<ComponentInstance> {
        match self.try_create(type_key, name)? {
            Ok(instance) => Some(instance),
            Err(e) => {
                warn!(type_key, name, "component failed to configure: {e}");
                None
            }
        }
    }

    /// Like [`Self::create`], keeping the configure error.
    pub fn try_create(
        &self,
        type_key: &str,
        name: &str,
    ) -> Option<ComponentResult<ComponentInstance>> {
        let Some(creator) = self.creators.get(type_key) else {
            warn!(type_key, "unknown component type");
            return None;
        };
        Some(ComponentInstance::new(
            type_key,
            name,
            creator(),
            Arc::clone(&self.node_types),
        ))
    }
}
