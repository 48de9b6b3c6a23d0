use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    component::Slot,
    errors::InjectError,
    registry::ComponentRegistry,
    types::{ComponentId, Erased},
};

pub mod field;
pub mod func;

use field::FieldInjector;
use func::{FuncInjector, InjectorMethod};

/// Strategy used to populate a group of slots
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum InjectorKind {
    /// Direct assignment to a field
    Field,
    /// Call of the component's injector method
    Func,
    /// A strategy registered through [crate::ContainerBuilder::injector]
    Custom(&'static str),
}
impl fmt::Display for InjectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectorKind::Field => f.write_str("field"),
            InjectorKind::Func => f.write_str("func"),
            InjectorKind::Custom(name) => f.write_str(name),
        }
    }
}

/// Everything a strategy may touch while injecting one component
pub struct InjectionTarget<'a> {
    pub component: &'a ComponentId,
    /// The component itself, locked for the duration of the injection
    pub instance: &'a mut Erased,
    /// The slots routed to this strategy, in declaration order
    pub slots: &'a [&'a Slot],
    pub method: Option<&'a InjectorMethod>,
}

/// Populates the slots of a component from already initialized components
pub trait InjectionStrategy: Send + Sync {
    fn inject(
        &self,
        target: InjectionTarget<'_>,
        components: &ComponentRegistry,
    ) -> Result<(), InjectError>;
}

/// Dispatch table from [InjectorKind] to strategy
#[derive(Clone, Default)]
pub(crate) struct Injectors {
    custom: BTreeMap<&'static str, Arc<dyn InjectionStrategy>>,
}
impl Injectors {
    pub fn register(&mut self, kind: &'static str, strategy: Arc<dyn InjectionStrategy>) {
        if self.custom.insert(kind, strategy).is_some() {
            tracing::warn!("Injection strategy '{kind}' was registered twice, keeping the last one");
        }
    }

    pub fn strategy(&self, kind: InjectorKind) -> Option<&dyn InjectionStrategy> {
        match kind {
            InjectorKind::Field => Some(&FieldInjector),
            InjectorKind::Func => Some(&FuncInjector),
            InjectorKind::Custom(name) => self.custom.get(name).map(|strategy| strategy.as_ref()),
        }
    }
}
