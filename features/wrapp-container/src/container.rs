use std::{fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{
    builder::{ContainerBuilder, ContainerOptions},
    component::{erase, ComponentCell, Component},
    definition::Definitions,
    dependency_graph::DependencyGraph,
    errors::{RegisterError, RequireError, StartError, StateError},
    initiator::Initiator,
    injectors::{InjectorKind, Injectors},
    registry::ComponentRegistry,
    types::{ComponentId, Erased, Instance, Shared},
};

/// Lifecycle state of a [Container]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Uninitialized,
    /// Accepting registrations
    Initialized,
    Starting,
    Started,
    Destroyed,
    /// A start was aborted - the container is unusable
    Failed,
}
impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainerState::Uninitialized => "uninitialized",
            ContainerState::Initialized => "initialized",
            ContainerState::Starting => "starting",
            ContainerState::Started => "started",
            ContainerState::Destroyed => "destroyed",
            ContainerState::Failed => "failed",
        })
    }
}

/// Container wiring all registered components
///
/// Components are constructed by the caller, registered behind a [Shared] handle
/// and wired on [Container::start]. The caller's handle and the container's handle
/// point to the same instance.
///
/// ```rust
/// use wrapp_container::{shared, Component, Container, Inject, Slots};
///
/// struct Database;
/// impl Component for Database {}
///
/// struct Repository {
///     database: Inject<Database>,
/// }
/// impl Component for Repository {
///     fn describe(&self, slots: &mut Slots<Self>) {
///         slots.field(|repository| &mut repository.database);
///     }
/// }
///
/// let database = shared(Database);
/// let repository = shared(Repository { database: Inject::empty() });
///
/// let mut container = Container::initialized();
/// container.register(repository.clone()).unwrap();
/// container.register(database.clone()).unwrap();
/// container.start().unwrap();
///
/// assert!(std::sync::Arc::ptr_eq(repository.read().database.get(), &database));
/// ```
pub struct Container {
    state: ContainerState,
    options: ContainerOptions,
    injectors: Injectors,
    /// Only present between `init` and a successful `start`
    definitions: Option<Definitions>,
    components: ComponentRegistry,
    graph: Option<DependencyGraph>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Uninitialized container with default options
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default(), Injectors::default())
    }

    /// Container ready for registration
    pub fn initialized() -> Self {
        ContainerBuilder::new().build_initialized()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn with_options(options: ContainerOptions, injectors: Injectors) -> Self {
        Self {
            state: ContainerState::Uninitialized,
            options,
            injectors,
            definitions: None,
            components: ComponentRegistry::default(),
            graph: None,
        }
    }

    pub(crate) fn init_definitions(&mut self) {
        self.definitions = Some(Definitions::default());
        self.state = ContainerState::Initialized;
    }

    /// Prepares the container for registrations
    pub fn init(&mut self) -> Result<(), StateError> {
        self.expect_state("init", ContainerState::Uninitialized)?;
        self.init_definitions();

        tracing::debug!("Container initialized");
        Ok(())
    }

    /// Registers a component under the identity of its type
    pub fn register<C: Component>(&mut self, component: Shared<C>) -> Result<(), RegisterError> {
        self.register_cell(ComponentId::of::<C>(), erase(component))
    }

    /// Registers a component under an explicit name
    ///
    /// Dependents must declare the slot with the same name, through `Slots::field_named`
    /// or `Slots::func_named`.
    pub fn register_named<C: Component>(
        &mut self,
        name: impl Into<ComponentId>,
        component: Shared<C>,
    ) -> Result<(), RegisterError> {
        self.register_cell(name.into(), erase(component))
    }

    /// Registers a type erased component which must be a [Shared] handle of `C`
    pub fn register_any<C: Component>(&mut self, component: Arc<Erased>) -> Result<(), RegisterError> {
        self.expect_state("register", ContainerState::Initialized)?;

        let component = component
            .downcast::<RwLock<C>>()
            .map_err(|_| RegisterError::NotShared(ComponentId::of::<C>()))?;
        self.register_cell(ComponentId::of::<C>(), erase(component))
    }

    fn register_cell(&mut self, id: ComponentId, cell: Arc<dyn ComponentCell>) -> Result<(), RegisterError> {
        self.expect_state("register", ContainerState::Initialized)?;

        let Some(definitions) = self.definitions.as_mut() else {
            return Err(StateError {
                operation: "register",
                state: self.state,
            }
            .into());
        };

        let definition = definitions.register(id, cell, &self.injectors)?;
        if definition.method.is_some() && !definition.injectors.contains(&InjectorKind::Func) {
            tracing::warn!(
                "Component '{}' has an injector method but no func slots, the method is never called",
                definition.id
            );
        }

        tracing::debug!(
            "Registered '{}' with {} dependencies",
            definition.id,
            definition.dependencies.len()
        );
        Ok(())
    }

    /// Verifies the dependency graph and initializes every registered component
    ///
    /// On success every component has been wired and notified through
    /// `on_container_ready`, and the container no longer holds any definition.
    /// On failure the container is left in [ContainerState::Failed].
    pub fn start(&mut self) -> Result<(), StartError> {
        self.expect_state("start", ContainerState::Initialized)?;
        self.state = ContainerState::Starting;

        let Some(mut definitions) = self.definitions.take() else {
            self.state = ContainerState::Failed;
            return Err(StateError {
                operation: "start",
                state: ContainerState::Uninitialized,
            }
            .into());
        };

        tracing::debug!("Starting container with {} components", definitions.len());

        let result = Initiator::new(&mut definitions, &mut self.components, &self.injectors)
            .initiate(self.options.max_cycle_hops);

        // Definitions must not keep components alive - whatever the outcome
        definitions.release();
        debug_assert!(!definitions.holds_instances());
        drop(definitions);

        match result {
            Ok(graph) => self.graph = Some(graph),
            Err(error) => {
                self.state = ContainerState::Failed;
                return Err(error);
            }
        }

        for instance in self.components.iter() {
            instance.cell().on_container_ready();
        }

        self.state = ContainerState::Started;
        tracing::info!("Container started with {} components", self.components.len());
        Ok(())
    }

    /// Calls `on_destroy` on every component, in reverse initialization order
    ///
    /// Components stay registered, the container is inert afterwards.
    pub fn destroy(&mut self) -> Result<(), StateError> {
        self.expect_state("destroy", ContainerState::Started)?;

        for instance in self.components.iter().rev() {
            instance.cell().on_destroy();
        }

        self.state = ContainerState::Destroyed;
        tracing::info!("Container destroyed");
        Ok(())
    }

    /// Typed handle of the component registered as `C`
    pub fn get_component<C: Component>(&self) -> Option<Shared<C>> {
        self.require().ok()
    }

    /// Type erased component registered under `name`
    pub fn get_component_by_name(&self, name: &str) -> Option<&Instance> {
        self.components.get(name)
    }

    /// Attempts to get the typed handle of the component registered as `C`
    pub fn require<C: Component>(&self) -> Result<Shared<C>, RequireError> {
        self.components.require()
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Verified dependency graph - present once the container has started
    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref()
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    fn expect_state(&self, operation: &'static str, expected: ContainerState) -> Result<(), StateError> {
        if self.state != expected {
            return Err(StateError {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("definitions", &self.definitions.as_ref().map(Definitions::len))
            .field("components", &self.components)
            .finish()
    }
}
