use std::{any::type_name, marker::PhantomData, sync::Arc};

use parking_lot::{MappedRwLockWriteGuard, RwLock, RwLockWriteGuard};

use crate::{
    errors::InjectError,
    injectors::{
        field::Inject,
        func::{InjectFn, InjectorMethod},
        InjectorKind,
    },
    types::{ComponentId, Erased, Instance, Shared},
};

/// A component managed by the container
///
/// Components are constructed by the caller and only *wired* by the container.
/// Every hook has a no-op default, so a component implements only what it needs.
///
/// # Example
/// ```rust
/// use wrapp_container::{Component, Inject, Slots};
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
/// ```
pub trait Component: Send + Sync + Sized + 'static {
    /// Declares the injection slots of this component
    ///
    /// Called once, on registration. The declared slots are the component's
    /// dependencies and never change afterwards.
    fn describe(&self, slots: &mut Slots<Self>) {
        let _ = slots;
    }

    /// Called before any dependency is injected
    fn pre_init(&mut self) {}

    /// Called once all dependencies have been injected
    fn post_init(&mut self) {}

    /// Called once every component of the container is initialized
    fn on_container_ready(&mut self) {}

    /// Called when the container is destroyed
    fn on_destroy(&mut self) {}
}

pub(crate) type Assign = Box<dyn Fn(&mut Erased, &Instance) -> Result<(), InjectError> + Send + Sync>;

/// A declared injection slot
pub struct Slot {
    kind: InjectorKind,
    dependency: ComponentId,
    assign: Option<Assign>,
}
impl Slot {
    pub fn kind(&self) -> InjectorKind {
        self.kind
    }

    /// Identity of the component this slot expects
    pub fn dependency(&self) -> &ComponentId {
        &self.dependency
    }

    /// Whether the slot can be assigned directly
    pub fn is_assignable(&self) -> bool {
        self.assign.is_some()
    }

    /// Assigns the dependency to the slot on the target component
    pub fn assign(&self, target: &mut Erased, dependency: &Instance) -> Result<(), InjectError> {
        match &self.assign {
            Some(assign) => assign(target, dependency),
            None => Err(InjectError::SlotNotAssignable {
                dependency: self.dependency.clone(),
                reason: "slot has no setter",
            }),
        }
    }
}
impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("kind", &self.kind)
            .field("dependency", &self.dependency)
            .finish()
    }
}

/// Static descriptor of a component's injection slots
pub struct Slots<C> {
    slots: Vec<Slot>,
    method: Option<InjectorMethod>,
    /// `(type identity, registered name)` of every named func slot
    func_names: Vec<(ComponentId, ComponentId)>,
    _component: PhantomData<fn(&mut C)>,
}

impl<C: Component> Slots<C> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            method: None,
            func_names: Vec::new(),
            _component: PhantomData,
        }
    }

    /// Declares a field slot for the component registered as `D`
    pub fn field<D, F>(&mut self, accessor: F) -> &mut Self
    where
        D: Component,
        F: Fn(&mut C) -> &mut Inject<D> + Send + Sync + 'static,
    {
        self.assignable(InjectorKind::Field, ComponentId::of::<D>(), accessor)
    }

    /// Declares a field slot for a component registered under an explicit name
    pub fn field_named<D, F>(&mut self, name: impl Into<ComponentId>, accessor: F) -> &mut Self
    where
        D: Component,
        F: Fn(&mut C) -> &mut Inject<D> + Send + Sync + 'static,
    {
        self.assignable(InjectorKind::Field, name.into(), accessor)
    }

    /// Declares a dependency on `D`, delivered through the injector method
    pub fn func<D: Component>(&mut self) -> &mut Self {
        self.slots.push(Slot {
            kind: InjectorKind::Func,
            dependency: ComponentId::of::<D>(),
            assign: None,
        });
        self
    }

    /// Declares a dependency on a component registered under an explicit name,
    /// delivered through the injector method
    ///
    /// Binds to the first parameter of type `D` not yet bound to another name,
    /// so several named components of one type are matched in declaration order.
    pub fn func_named<D: Component>(&mut self, name: impl Into<ComponentId>) -> &mut Self {
        let name = name.into();
        self.func_names.push((ComponentId::of::<D>(), name.clone()));
        self.slots.push(Slot {
            kind: InjectorKind::Func,
            dependency: name,
            assign: None,
        });
        self
    }

    /// Declares a slot handled by a custom strategy registered under `kind`
    pub fn custom<D, F>(&mut self, kind: &'static str, accessor: F) -> &mut Self
    where
        D: Component,
        F: Fn(&mut C) -> &mut Inject<D> + Send + Sync + 'static,
    {
        self.assignable(InjectorKind::Custom(kind), ComponentId::of::<D>(), accessor)
    }

    /// Designates the injector method receiving all func slots
    ///
    /// The method is called once, with every parameter resolved from the container.
    pub fn injector<Args, M: InjectFn<C, Args>>(&mut self, method: M) -> &mut Self {
        self.method = Some(method.into_method());
        self
    }

    fn assignable<D, F>(&mut self, kind: InjectorKind, dependency: ComponentId, accessor: F) -> &mut Self
    where
        D: Component,
        F: Fn(&mut C) -> &mut Inject<D> + Send + Sync + 'static,
    {
        let slot_dependency = dependency.clone();
        let assign: Assign = Box::new(move |target: &mut Erased, instance: &Instance| {
            let component = target
                .downcast_mut::<C>()
                .ok_or(InjectError::TargetMismatch {
                    expected: type_name::<C>(),
                })?;
            let handle = instance.downcast::<D>()?;
            accessor(component)
                .bind(handle)
                .map_err(|_| InjectError::SlotNotAssignable {
                    dependency: slot_dependency.clone(),
                    reason: "slot is already bound",
                })
        });

        self.slots.push(Slot {
            kind,
            dependency,
            assign: Some(assign),
        });
        self
    }

    pub(crate) fn into_descriptor(self) -> Descriptor {
        let mut method = self.method;
        if let Some(method) = method.as_mut() {
            method.bind_names(&self.func_names);
        }

        Descriptor {
            slots: self.slots,
            method,
        }
    }
}

/// Type erased result of [Component::describe]
pub(crate) struct Descriptor {
    pub slots: Vec<Slot>,
    pub method: Option<InjectorMethod>,
}

/// Type erased access to a registered component
pub(crate) trait ComponentCell: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn describe(&self) -> Descriptor;

    fn pre_init(&self);

    fn post_init(&self);

    fn on_container_ready(&self);

    fn on_destroy(&self);

    /// Locks the component for injection
    fn write_erased(&self) -> MappedRwLockWriteGuard<'_, Erased>;

    fn into_any(self: Arc<Self>) -> Arc<Erased>;
}
// Impl ComponentCell for any Component behind a shared handle
impl<C: Component> ComponentCell for RwLock<C> {
    fn type_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn describe(&self) -> Descriptor {
        let mut slots = Slots::new();
        self.read().describe(&mut slots);
        slots.into_descriptor()
    }

    fn pre_init(&self) {
        self.write().pre_init();
    }

    fn post_init(&self) {
        self.write().post_init();
    }

    fn on_container_ready(&self) {
        self.write().on_container_ready();
    }

    fn on_destroy(&self) {
        self.write().on_destroy();
    }

    fn write_erased(&self) -> MappedRwLockWriteGuard<'_, Erased> {
        RwLockWriteGuard::map(self.write(), |component| component as &mut Erased)
    }

    fn into_any(self: Arc<Self>) -> Arc<Erased> {
        self
    }
}

pub(crate) fn erase<C: Component>(component: Shared<C>) -> Arc<dyn ComponentCell> {
    component
}
