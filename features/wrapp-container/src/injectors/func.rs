use std::{any::type_name, collections::BTreeSet};

use crate::{
    component::Component,
    errors::{InjectError, RequireError},
    injectors::{InjectionStrategy, InjectionTarget},
    registry::ComponentRegistry,
    types::{ComponentId, Erased, Instance, Shared},
};

type CallInjector = Box<dyn Fn(&mut Erased, &[Instance]) -> Result<(), InjectError> + Send + Sync>;

/// Type erased injector method of a component
pub struct InjectorMethod {
    parameters: Vec<ComponentId>,
    call: CallInjector,
}

impl InjectorMethod {
    fn new<C, F>(parameters: Vec<ComponentId>, call: F) -> Self
    where
        C: Component,
        F: Fn(&mut C, &[Instance]) -> Result<(), InjectError> + Send + Sync + 'static,
    {
        let call: CallInjector = Box::new(move |target: &mut Erased, arguments: &[Instance]| {
            let component = target
                .downcast_mut::<C>()
                .ok_or(InjectError::TargetMismatch {
                    expected: type_name::<C>(),
                })?;
            call(component, arguments)
        });

        Self { parameters, call }
    }

    /// Identities of the parameters, excluding the receiver
    pub fn parameters(&self) -> &[ComponentId] {
        &self.parameters
    }

    /// Resolves parameters by registered name instead of by type
    ///
    /// Every `(type, name)` pair renames the first parameter of that type which still
    /// resolves by type.
    pub(crate) fn bind_names(&mut self, names: &[(ComponentId, ComponentId)]) {
        let mut bound = vec![false; self.parameters.len()];
        for (type_id, name) in names {
            let position = self
                .parameters
                .iter()
                .zip(&bound)
                .position(|(parameter, &bound)| !bound && parameter == type_id);

            if let Some(position) = position {
                self.parameters[position] = name.clone();
                bound[position] = true;
            }
        }
    }

    /// Calls the method - `arguments` must follow the order of [InjectorMethod::parameters]
    pub fn call(&self, target: &mut Erased, arguments: &[Instance]) -> Result<(), InjectError> {
        (self.call)(target, arguments)
    }
}
impl std::fmt::Debug for InjectorMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectorMethod")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Functions usable as injector method of `C`
///
/// Implemented for `Fn(&mut C, Shared<A>, Shared<B>, ...)` with up to eight dependencies,
/// and for `Fn(&mut C)` - which the func strategy rejects as redundant.
pub trait InjectFn<C, Args>: Send + Sync + 'static {
    fn into_method(self) -> InjectorMethod;
}

impl<C, F> InjectFn<C, ()> for F
where
    C: Component,
    F: Fn(&mut C) + Send + Sync + 'static,
{
    fn into_method(self) -> InjectorMethod {
        InjectorMethod::new::<C, _>(Vec::new(), move |component: &mut C, _: &[Instance]| {
            self(component);
            Ok(())
        })
    }
}

macro_rules! impl_inject_fn {
    ($($arg:ident),+) => {
        impl<C, F, $($arg),+> InjectFn<C, ($($arg,)+)> for F
        where
            C: Component,
            $($arg: Component,)+
            F: Fn(&mut C, $(Shared<$arg>),+) + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            fn into_method(self) -> InjectorMethod {
                let parameters = vec![$(ComponentId::of::<$arg>()),+];
                InjectorMethod::new::<C, _>(parameters, move |component: &mut C, arguments: &[Instance]| {
                    let mut arguments = arguments.iter();
                    $(let $arg = next_argument::<$arg>(&mut arguments)?;)+
                    self(component, $($arg),+);
                    Ok(())
                })
            }
        }
    };
}

impl_inject_fn!(A1);
impl_inject_fn!(A1, A2);
impl_inject_fn!(A1, A2, A3);
impl_inject_fn!(A1, A2, A3, A4);
impl_inject_fn!(A1, A2, A3, A4, A5);
impl_inject_fn!(A1, A2, A3, A4, A5, A6);
impl_inject_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_inject_fn!(A1, A2, A3, A4, A5, A6, A7, A8);

fn next_argument<'a, T: Component>(
    arguments: &mut impl Iterator<Item = &'a Instance>,
) -> Result<Shared<T>, InjectError> {
    let instance = arguments
        .next()
        .ok_or_else(|| RequireError::ComponentNotFound(ComponentId::of::<T>()))?;
    Ok(instance.downcast::<T>()?)
}

/// Resolves the parameters of the injector method and calls it once
pub struct FuncInjector;

impl InjectionStrategy for FuncInjector {
    fn inject(
        &self,
        target: InjectionTarget<'_>,
        components: &ComponentRegistry,
    ) -> Result<(), InjectError> {
        let method = target.method.ok_or(InjectError::InjectorMethodMissing)?;
        let parameters = method.parameters();

        if parameters.is_empty() {
            return Err(InjectError::ZeroArgInjector);
        }

        // Declared slots and accepted parameters must match as sets
        let declared: BTreeSet<&ComponentId> =
            target.slots.iter().map(|slot| slot.dependency()).collect();
        let accepted: BTreeSet<&ComponentId> = parameters.iter().collect();

        if declared != accepted {
            return Err(InjectError::InjectorArgMismatch {
                missing: declared.difference(&accepted).map(|id| (*id).clone()).collect(),
                unexpected: accepted.difference(&declared).map(|id| (*id).clone()).collect(),
            });
        }

        let arguments = parameters
            .iter()
            .map(|id| components.get_required(id).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        method.call(target.instance, &arguments)?;

        tracing::trace!(
            "Called injector method of '{}' with {} arguments",
            target.component,
            arguments.len()
        );
        Ok(())
    }
}
