//! Lifecycle aware dependency injection container
//!
//! Components are constructed by the caller and registered behind a [Shared] handle.
//! Each component declares its dependency slots through [Component::describe].
//! On [Container::start] the container verifies the dependency graph, then
//! initializes every component once its dependencies are initialized:
//!
//! 1. `pre_init`
//! 2. every slot is injected, by field assignment or through the injector method
//! 3. `post_init`
//!
//! Once all components are initialized, `on_container_ready` is called on each of them.
//! [Container::destroy] calls `on_destroy` in reverse initialization order.

mod builder;
mod component;
mod container;
mod definition;
mod dependency_graph;
mod errors;
pub mod global;
mod initiator;
mod injectors;
mod registry;
mod types;

pub use builder::{ContainerBuilder, ContainerOptions};
pub use component::{Component, Slot, Slots};
pub use container::{Container, ContainerState};
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DEFAULT_MAX_CYCLE_HOPS};
pub use errors::*;
pub use injectors::{
    field::{FieldInjector, Inject},
    func::{FuncInjector, InjectFn, InjectorMethod},
    InjectionStrategy, InjectionTarget, InjectorKind,
};
pub use registry::ComponentRegistry;
pub use types::{shared, ComponentId, CyclePath, Erased, Instance, Shared};
