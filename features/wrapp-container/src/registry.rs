use std::collections::HashMap;

use crate::{
    component::Component,
    errors::RequireError,
    types::{ComponentId, Instance, Shared},
};

/// Initialized components, keyed by identity
///
/// Filled one component at a time by the initialization loop.
/// Iterates in insertion order, which is the initialization order.
#[derive(Default)]
pub struct ComponentRegistry {
    instances: HashMap<ComponentId, Instance>,
    order: Vec<ComponentId>,
}

impl ComponentRegistry {
    /// Adds an initialized component - every identity can only be added once
    pub fn insert(&mut self, instance: Instance) -> Result<(), RequireError> {
        if self.instances.contains_key(instance.id()) {
            return Err(RequireError::DuplicateComponent(instance.id().clone()));
        }

        self.order.push(instance.id().clone());
        self.instances.insert(instance.id().clone(), instance);
        Ok(())
    }

    /// Returns the component registered under `id`
    pub fn get_required(&self, id: &ComponentId) -> Result<&Instance, RequireError> {
        self.instances
            .get(id)
            .ok_or_else(|| RequireError::ComponentNotFound(id.clone()))
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    /// Attempts to get the typed handle of the component registered as `T`
    pub fn require<T: Component>(&self) -> Result<Shared<T>, RequireError> {
        self.get_required(&ComponentId::of::<T>())?.downcast()
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Components in initialization order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Instance> + '_ {
        self.order.iter().filter_map(|id| self.instances.get(id))
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(Instance::id)).finish()
    }
}
