use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::types::{ComponentId, CyclePath};

/// Default bound for reconstructing a cycle path
pub const DEFAULT_MAX_CYCLE_HOPS: usize = 25;

/// Graph of all registered components
///
/// Holds identities only, never component instances - so it may outlive
/// the definitions it was built from, e.g. for visualization.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    map: BTreeMap<ComponentId, Vec<ComponentId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        id: ComponentId,
        dependencies: Vec<ComponentId>,
    ) -> Result<(), DependencyGraphError> {
        if self.map.contains_key(&id) {
            return Err(DependencyGraphError::Duplicate(id));
        }

        self.map.insert(id, dependencies);
        Ok(())
    }

    pub fn dependencies_of(&self, id: &ComponentId) -> Option<&[ComponentId]> {
        self.map.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &[ComponentId])> + '_ {
        self.map.iter().map(|(id, deps)| (id, deps.as_slice()))
    }

    /// Validate the graph - first for missing dependencies, then for cycles
    pub fn check(&self, max_cycle_hops: usize) -> Result<(), DependencyGraphError> {
        self.check_dependencies_exist()?;
        self.check_circular_dependencies(max_cycle_hops)
    }

    /// Every declared dependency must be part of the graph
    pub fn check_dependencies_exist(&self) -> Result<(), DependencyGraphError> {
        for (component, dependencies) in &self.map {
            if let Some(missing) = dependencies.iter().find(|dep| !self.map.contains_key(*dep)) {
                return Err(DependencyGraphError::MissingDependency {
                    component: component.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        Ok(())
    }

    /// Searches for a component which is (transitively) injected into one of its own dependencies
    pub fn check_circular_dependencies(
        &self,
        max_cycle_hops: usize,
    ) -> Result<(), DependencyGraphError> {
        let injected_by = self.injected_by();

        for component in self.map.keys() {
            let mut visited = BTreeSet::new();
            let mut frontier = injected_by[component].clone();

            while !frontier.is_empty() {
                if frontier.contains(component) {
                    let path = find_loop_path(component, &injected_by, max_cycle_hops)?;
                    return Err(DependencyGraphError::CircularDependency { path });
                }

                // Expand to the dependents of the current frontier
                let mut next: BTreeSet<&ComponentId> = BTreeSet::new();
                for dependent in frontier {
                    if visited.insert(dependent) {
                        next.extend(
                            injected_by[dependent]
                                .iter()
                                .copied()
                                .filter(|id| !visited.contains(id)),
                        );
                    }
                }
                frontier = next;
            }
        }

        Ok(())
    }

    /// Maps every component to the components declaring it as a dependency
    fn injected_by(&self) -> BTreeMap<&ComponentId, BTreeSet<&ComponentId>> {
        let mut injected_by: BTreeMap<&ComponentId, BTreeSet<&ComponentId>> =
            self.map.keys().map(|id| (id, BTreeSet::new())).collect();

        for (dependent, dependencies) in &self.map {
            for dependency in dependencies {
                if let Some(dependents) = injected_by.get_mut(dependency) {
                    dependents.insert(dependent);
                }
            }
        }

        injected_by
    }
}

/// Builds the graph from `(component, dependencies)` pairs
///
/// A later pair replaces an earlier one with the same identity, use [DependencyGraph::add]
/// to reject duplicates instead.
impl FromIterator<(ComponentId, Vec<ComponentId>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (ComponentId, Vec<ComponentId>)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Breadth first search for the shortest loop through `start`, following the dependents
///
/// Every component is expanded at most once, so the search is linear in the graph size.
fn find_loop_path<'a>(
    start: &'a ComponentId,
    injected_by: &BTreeMap<&'a ComponentId, BTreeSet<&'a ComponentId>>,
    max_hops: usize,
) -> Result<CyclePath, DependencyGraphError> {
    let mut parents: BTreeMap<&'a ComponentId, &'a ComponentId> = BTreeMap::new();
    let mut frontier = vec![start];
    let mut hops = 0;

    while !frontier.is_empty() && hops < max_hops {
        hops += 1;

        let mut next = Vec::new();
        for &node in &frontier {
            for &dependent in injected_by.get(node).into_iter().flatten() {
                if dependent == start {
                    return Ok(loop_path(start, node, &parents));
                }

                if !parents.contains_key(dependent) {
                    parents.insert(dependent, node);
                    next.push(dependent);
                }
            }
        }
        frontier = next;
    }

    Err(DependencyGraphError::CycleSearchExhausted {
        component: start.clone(),
        max_hops,
    })
}

/// Walks the parents back from `last` - the result reads as "depends on"
fn loop_path<'a>(
    start: &ComponentId,
    last: &'a ComponentId,
    parents: &BTreeMap<&'a ComponentId, &'a ComponentId>,
) -> CyclePath {
    let mut path = vec![start.clone()];
    let mut node = last;
    loop {
        path.push(node.clone());
        match parents.get(node) {
            Some(&parent) => node = parent,
            None => break,
        }
    }
    CyclePath(path)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("A component has been registered twice: '{0}'")]
    Duplicate(ComponentId),
    #[error("component '{component}' cannot be initialized, dependency '{dependency}' is missing")]
    MissingDependency {
        component: ComponentId,
        dependency: ComponentId,
    },
    #[error("circular dependency detected: {path}")]
    CircularDependency { path: CyclePath },
    /// Internal error - a detected cycle could not be walked within the hop bound
    #[error("circular dependency detected in component '{component}', but its path exceeds {max_hops} hops")]
    CycleSearchExhausted {
        component: ComponentId,
        max_hops: usize,
    },
}
