//! Process wide container
//!
//! Created and initialized on first access. Every access is serialized through a mutex,
//! so hooks and injector methods must not call back into this module.

use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::{
    component::Component,
    container::Container,
    errors::{RegisterError, StartError, StateError},
    types::{ComponentId, Shared},
};

static GLOBAL_CONTAINER: OnceLock<Mutex<Container>> = OnceLock::new();

fn global() -> &'static Mutex<Container> {
    GLOBAL_CONTAINER.get_or_init(|| Mutex::new(Container::initialized()))
}

/// Runs `f` with exclusive access to the global container
pub fn with<R>(f: impl FnOnce(&mut Container) -> R) -> R {
    f(&mut global().lock())
}

/// Registers a component with the global container
pub fn register<C: Component>(component: Shared<C>) -> Result<(), RegisterError> {
    with(|container| container.register(component))
}

pub fn register_named<C: Component>(
    name: impl Into<ComponentId>,
    component: Shared<C>,
) -> Result<(), RegisterError> {
    with(|container| container.register_named(name, component))
}

/// Starts the global container
pub fn start() -> Result<(), StartError> {
    with(Container::start)
}

pub fn destroy() -> Result<(), StateError> {
    with(Container::destroy)
}

pub fn get_component<C: Component>() -> Option<Shared<C>> {
    with(|container| container.get_component())
}
