use thiserror::Error;

use crate::{
    container::ContainerState,
    dependency_graph::DependencyGraphError,
    injectors::InjectorKind,
    types::{join_ids, ComponentId},
};

/// Errors a custom injection strategy may raise
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// An operation was called in a state which does not allow it
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {operation} while the container is {state}")]
pub struct StateError {
    pub operation: &'static str,
    pub state: ContainerState,
}

/// Errors while registering a component
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error(transparent)]
    State(#[from] StateError),
    /// The identity is already taken
    #[error("component '{0}' is already registered")]
    DuplicateComponent(ComponentId),
    /// The component was not handed over behind a shared, mutable handle
    #[error("component '{0}' must be registered as a shared handle")]
    NotShared(ComponentId),
    /// A slot uses a kind with no registered strategy
    #[error("slot '{dependency}' of component '{component}' has unknown injection kind '{kind}'")]
    UnknownInjectorKind {
        component: ComponentId,
        dependency: ComponentId,
        kind: InjectorKind,
    },
}

/// Errors when looking up initialized components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    #[error("component '{0}' not found")]
    ComponentNotFound(ComponentId),
    #[error("cannot add component '{0}', component already exists")]
    DuplicateComponent(ComponentId),
    #[error("Failed to downcast '{component}', required: '{required}' actual: '{actual}'")]
    DowncastFailed {
        component: ComponentId,
        required: &'static str,
        actual: &'static str,
    },
}

/// Errors raised by injection strategies
#[derive(Error, Debug)]
pub enum InjectError {
    #[error(transparent)]
    Require(#[from] RequireError),
    #[error("slot for '{dependency}' cannot be assigned: {reason}")]
    SlotNotAssignable {
        dependency: ComponentId,
        reason: &'static str,
    },
    #[error("component declares func slots but no injector method")]
    InjectorMethodMissing,
    #[error("injector method without arguments is redundant, use `pre_init` or `post_init` instead")]
    ZeroArgInjector,
    #[error(
        "injector method arguments mismatch - declared but not accepted: [{}], accepted but not declared: [{}]",
        join_ids(.missing, ", "),
        join_ids(.unexpected, ", ")
    )]
    InjectorArgMismatch {
        /// Declared as func slots, missing from the method parameters
        missing: Vec<ComponentId>,
        /// Method parameters which were never declared as func slots
        unexpected: Vec<ComponentId>,
    },
    #[error("injection target is not a '{expected}'")]
    TargetMismatch { expected: &'static str },
    #[error("no strategy registered for injection kind '{0}'")]
    StrategyMissing(InjectorKind),
    /// Generic error raised by a custom strategy
    #[error("Error during injection: {0}")]
    Other(DynError),
}

/// Errors while starting the container
#[derive(Error, Debug)]
pub enum StartError {
    #[error(transparent)]
    State(#[from] StateError),
    /// The dependency graph failed verification - nothing was initialized
    #[error(transparent)]
    DependencyGraph(#[from] DependencyGraphError),
    #[error("injecting '{component}' with the '{kind}' injector failed - error: {source}")]
    InjectionFailed {
        component: ComponentId,
        kind: InjectorKind,
        source: InjectError,
    },
    #[error(transparent)]
    Registry(#[from] RequireError),
    /// A pass made no progress - verification should make this unreachable
    #[error(
        "components initialization made no progress, pending: [{}]",
        join_ids(.pending, ", ")
    )]
    InitializationDeadlock { pending: Vec<ComponentId> },
}
