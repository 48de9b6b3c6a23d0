use std::{
    any::{type_name, Any},
    borrow::{Borrow, Cow},
    fmt,
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{
    component::{Component, ComponentCell},
    errors::RequireError,
};

/// Type erased component, as seen by injection strategies
pub type Erased = dyn Any + Send + Sync;

/// Shared, mutable handle to a component
///
/// The caller keeps one handle and the container keeps another one,
/// so injection mutates the very instance the caller constructed.
pub type Shared<T> = Arc<RwLock<T>>;

/// Moves a component behind a [Shared] handle
pub fn shared<T: Component>(component: T) -> Shared<T> {
    Arc::new(RwLock::new(component))
}

/// Identity of a component
///
/// Derived from the concrete type name, or given explicitly on registration.
/// It is the only key used to join the definition and component registries.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComponentId(Cow<'static, str>);

impl ComponentId {
    /// Identity derived from the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    /// Explicitly named identity
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl From<&'static str> for ComponentId {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}
impl From<String> for ComponentId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// A type erased, initialized component held by the container
#[derive(Clone)]
pub struct Instance {
    id: ComponentId,
    cell: Arc<dyn ComponentCell>,
}

impl Instance {
    pub(crate) fn new(id: ComponentId, cell: Arc<dyn ComponentCell>) -> Self {
        Self { id, cell }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Name of the concrete type behind this instance
    pub fn type_name(&self) -> &'static str {
        self.cell.type_name()
    }

    /// Returns the typed handle - the same allocation the component was registered with
    pub fn downcast<T: Component>(&self) -> Result<Shared<T>, RequireError> {
        self.cell
            .clone()
            .into_any()
            .downcast::<RwLock<T>>()
            .map_err(|_| RequireError::DowncastFailed {
                component: self.id.clone(),
                required: type_name::<T>(),
                actual: self.cell.type_name(),
            })
    }

    pub(crate) fn cell(&self) -> &Arc<dyn ComponentCell> {
        &self.cell
    }
}
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("type", &self.type_name())
            .finish()
    }
}

/// Closed loop of components depending on each other
///
/// Read left to right, every component depends on the next one.
/// The first and the last entry are the same component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath(pub Vec<ComponentId>);

impl CyclePath {
    pub fn components(&self) -> &[ComponentId] {
        &self.0
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.0.contains(id)
    }
}
impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_ids(&self.0, " -> "))
    }
}

pub(crate) fn join_ids(ids: &[ComponentId], separator: &str) -> String {
    ids.iter()
        .map(ComponentId::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}
