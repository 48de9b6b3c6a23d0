use std::sync::Arc;

use crate::{
    container::Container,
    dependency_graph::DEFAULT_MAX_CYCLE_HOPS,
    injectors::{InjectionStrategy, Injectors},
};

/// Tunables of a [Container]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Upper bound of hops when reconstructing the path of a detected cycle
    pub max_cycle_hops: usize,
}
impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_cycle_hops: DEFAULT_MAX_CYCLE_HOPS,
        }
    }
}

/// Assembles a [Container] with custom options and injection strategies
///
/// ```rust
/// use wrapp_container::ContainerBuilder;
///
/// let mut container = ContainerBuilder::new().max_cycle_hops(10).build();
/// container.init().unwrap();
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    options: ContainerOptions,
    injectors: Injectors,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_cycle_hops(mut self, max_cycle_hops: usize) -> Self {
        self.options.max_cycle_hops = max_cycle_hops;
        self
    }

    /// Routes every slot declared with `Slots::custom(kind, ..)` to `strategy`
    ///
    /// The built-in `field` and `func` kinds are never replaced by this.
    pub fn injector<S: InjectionStrategy + 'static>(mut self, kind: &'static str, strategy: S) -> Self {
        self.injectors.register(kind, Arc::new(strategy));
        self
    }

    /// Builds an uninitialized container
    pub fn build(self) -> Container {
        Container::with_options(self.options, self.injectors)
    }

    /// Builds a container ready for registration
    pub fn build_initialized(self) -> Container {
        let mut container = self.build();
        container.init_definitions();
        container
    }
}
