use crate::{
    definition::Definitions,
    dependency_graph::DependencyGraph,
    errors::{InjectError, RequireError, StartError},
    injectors::{InjectionTarget, Injectors},
    registry::ComponentRegistry,
    types::{ComponentId, Instance},
};

/// Initializes all registered definitions
///
/// Moves every component from the definitions into the component registry,
/// one pass at a time, in dependency order.
pub(crate) struct Initiator<'a> {
    definitions: &'a mut Definitions,
    components: &'a mut ComponentRegistry,
    injectors: &'a Injectors,
}
impl<'a> Initiator<'a> {
    pub fn new(
        definitions: &'a mut Definitions,
        components: &'a mut ComponentRegistry,
        injectors: &'a Injectors,
    ) -> Self {
        Self {
            definitions,
            components,
            injectors,
        }
    }

    /// Verifies the graph and initializes every definition
    ///
    /// Returns the verified graph on success.
    pub fn initiate(mut self, max_cycle_hops: usize) -> Result<DependencyGraph, StartError> {
        let graph = self.definitions.graph();
        if let Err(error) = graph.check(max_cycle_hops) {
            tracing::error!("Dependency graph verification failed: {error}");
            return Err(error.into());
        }
        tracing::debug!("Verified dependency graph of {} components", graph.len());

        // Fewest dependencies first - leaves mostly initialize in the first pass
        let mut pending: Vec<ComponentId> = self
            .definitions
            .iter()
            .map(|definition| definition.id.clone())
            .collect();
        pending.sort_by_key(|id| graph.dependencies_of(id).map_or(0, <[_]>::len));

        let mut pass = 0;
        while !pending.is_empty() {
            pass += 1;
            let before = pending.len();

            let mut remaining = Vec::with_capacity(before);
            for id in pending {
                if !self.is_ready(&id) {
                    remaining.push(id);
                    continue;
                }

                if let Err(error) = self.initialize(&id) {
                    tracing::error!("Initialization of '{id}' failed in pass {pass}: {error}");
                    return Err(error);
                }
                tracing::debug!("Initialized '{id}' in pass {pass}");
            }
            pending = remaining;

            tracing::debug!(
                "Pass {pass} initialized {} components, {} pending",
                before - pending.len(),
                pending.len()
            );

            if pending.len() == before {
                let error = StartError::InitializationDeadlock { pending };
                tracing::error!("{error}");
                return Err(error);
            }
        }

        Ok(graph)
    }

    /// A definition is ready once all of its dependencies are initialized
    fn is_ready(&self, id: &ComponentId) -> bool {
        self.definitions.get(id).is_some_and(|definition| {
            !definition.initialized
                && definition
                    .dependencies
                    .iter()
                    .all(|dependency| self.definitions.is_initialized(dependency))
        })
    }

    fn initialize(&mut self, id: &ComponentId) -> Result<(), StartError> {
        let definition = self
            .definitions
            .get(id)
            .ok_or_else(|| RequireError::ComponentNotFound(id.clone()))?;
        let cell = definition
            .instance
            .clone()
            .ok_or_else(|| RequireError::ComponentNotFound(id.clone()))?;

        cell.pre_init();

        {
            let mut instance = cell.write_erased();

            for &kind in &definition.injectors {
                let injection_failed = |source| StartError::InjectionFailed {
                    component: id.clone(),
                    kind,
                    source,
                };

                let strategy = self
                    .injectors
                    .strategy(kind)
                    .ok_or_else(|| injection_failed(InjectError::StrategyMissing(kind)))?;

                let slots = definition.slots_of(kind);
                let target = InjectionTarget {
                    component: id,
                    instance: &mut *instance,
                    slots: &slots,
                    method: definition.method.as_ref(),
                };

                strategy
                    .inject(target, self.components)
                    .map_err(injection_failed)?;
            }
        }

        cell.post_init();

        if let Some(definition) = self.definitions.get_mut(id) {
            definition.initialized = true;
        }
        self.components.insert(Instance::new(id.clone(), cell))?;

        Ok(())
    }
}
