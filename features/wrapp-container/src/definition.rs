use std::{collections::BTreeMap, sync::Arc};

use crate::{
    component::{ComponentCell, Descriptor, Slot},
    dependency_graph::DependencyGraph,
    errors::RegisterError,
    injectors::{func::InjectorMethod, InjectorKind, Injectors},
    types::ComponentId,
};

/// Registration time metadata of a component
pub(crate) struct Definition {
    pub id: ComponentId,
    /// One entry per slot, in declaration order
    pub dependencies: Vec<ComponentId>,
    /// Distinct injector kinds, in order of first use
    pub injectors: Vec<InjectorKind>,
    pub initialized: bool,
    /// Released once the container has started
    pub instance: Option<Arc<dyn ComponentCell>>,
    pub slots: Vec<Slot>,
    pub method: Option<InjectorMethod>,
}

impl Definition {
    /// Slots routed to the given injector kind
    pub fn slots_of(&self, kind: InjectorKind) -> Vec<&Slot> {
        self.slots.iter().filter(|slot| slot.kind() == kind).collect()
    }
}

/// All definitions known before the container starts
#[derive(Default)]
pub(crate) struct Definitions {
    map: BTreeMap<ComponentId, Definition>,
}

impl Definitions {
    /// Stores the definition of a component - nothing changes if registration fails
    pub fn register(
        &mut self,
        id: ComponentId,
        cell: Arc<dyn ComponentCell>,
        injectors: &Injectors,
    ) -> Result<&Definition, RegisterError> {
        if self.map.contains_key(&id) {
            return Err(RegisterError::DuplicateComponent(id));
        }

        let Descriptor { slots, method } = cell.describe();

        let mut dependencies = Vec::with_capacity(slots.len());
        let mut kinds = Vec::new();
        for slot in &slots {
            if injectors.strategy(slot.kind()).is_none() {
                return Err(RegisterError::UnknownInjectorKind {
                    component: id,
                    dependency: slot.dependency().clone(),
                    kind: slot.kind(),
                });
            }

            if !kinds.contains(&slot.kind()) {
                kinds.push(slot.kind());
            }
            dependencies.push(slot.dependency().clone());
        }

        let definition = Definition {
            id: id.clone(),
            dependencies,
            injectors: kinds,
            initialized: false,
            instance: Some(cell),
            slots,
            method,
        };

        Ok(self.map.entry(id).or_insert(definition))
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Definition> {
        self.map.get(id)
    }

    pub fn get_mut(&mut self, id: &ComponentId) -> Option<&mut Definition> {
        self.map.get_mut(id)
    }

    pub fn is_initialized(&self, id: &ComponentId) -> bool {
        self.map.get(id).is_some_and(|definition| definition.initialized)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.map.values()
    }

    /// Identity-only view of the definitions
    pub fn graph(&self) -> DependencyGraph {
        self.map
            .values()
            .map(|definition| (definition.id.clone(), definition.dependencies.clone()))
            .collect()
    }

    /// Drops every component reference held by the definitions
    pub fn release(&mut self) {
        for definition in self.map.values_mut() {
            definition.instance = None;
        }
    }

    pub fn holds_instances(&self) -> bool {
        self.map.values().any(|definition| definition.instance.is_some())
    }
}
