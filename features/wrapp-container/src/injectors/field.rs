use std::{fmt::Debug, ops::Deref};

use crate::{
    errors::InjectError,
    injectors::{InjectionStrategy, InjectionTarget},
    registry::ComponentRegistry,
    types::Shared,
};

/// Field holding an injected dependency
///
/// Empty until the container wires the owning component.
///
/// ### Panics
///
/// Dereferencing panics while the slot is still empty - e.g. when it is accessed
/// in `pre_init`, or on a component which was never registered.
pub struct Inject<T>(Option<Shared<T>>);

impl<T> Inject<T> {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    /// Accesses the dependency
    ///
    /// # Panics
    /// - When accessed before the dependency has been injected
    pub fn get(&self) -> &Shared<T> {
        self.try_get()
            .expect("Inject accessed before the dependency was injected")
    }

    pub fn try_get(&self) -> Option<&Shared<T>> {
        self.0.as_ref()
    }

    /// Binds the slot once - returns the handle back if it was already bound
    pub(crate) fn bind(&mut self, handle: Shared<T>) -> Result<(), Shared<T>> {
        if self.0.is_some() {
            return Err(handle);
        }
        self.0 = Some(handle);
        Ok(())
    }
}
impl<T> Default for Inject<T> {
    fn default() -> Self {
        Self::empty()
    }
}
impl<T> Deref for Inject<T> {
    type Target = Shared<T>;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}
impl<T: Debug> Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(handle) => f.debug_tuple("Inject").field(handle).finish(),
            None => f.debug_tuple("Inject").field(&"empty").finish(),
        }
    }
}

/// Assigns every slot directly from the component registry
pub struct FieldInjector;

impl InjectionStrategy for FieldInjector {
    fn inject(
        &self,
        target: InjectionTarget<'_>,
        components: &ComponentRegistry,
    ) -> Result<(), InjectError> {
        for slot in target.slots {
            if !slot.is_assignable() {
                return Err(InjectError::SlotNotAssignable {
                    dependency: slot.dependency().clone(),
                    reason: "slot has no setter",
                });
            }

            let dependency = components.get_required(slot.dependency())?;
            slot.assign(target.instance, dependency)?;

            tracing::trace!("Injected '{}' into '{}'", dependency.id(), target.component);
        }

        Ok(())
    }
}
