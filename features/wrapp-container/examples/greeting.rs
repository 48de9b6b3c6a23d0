use std::error::Error;

use tracing_subscriber::{prelude::*, EnvFilter};
use wrapp_container::{shared, Component, Container, Inject, Shared, Slots};

fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = shared(Config {
        greeting: "Hello".to_string(),
    });
    let service = shared(GreetingService {
        repository: Inject::empty(),
        greeting: String::new(),
    });

    let mut container = Container::initialized();
    container.register(service.clone())?;
    container.register(shared(Repository {
        config: Inject::empty(),
        names: Vec::new(),
    }))?;
    container.register(config)?;
    container.start()?;

    println!("{container:?}");
    println!("{}", service.read().greet());

    container.destroy()?;
    Ok(())
}

#[derive(Debug)]
struct Config {
    greeting: String,
}
impl Component for Config {}

#[derive(Debug)]
struct Repository {
    config: Inject<Config>,
    names: Vec<String>,
}
impl Component for Repository {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.field(|repository| &mut repository.config);
    }

    fn post_init(&mut self) {
        self.names = vec!["Ada".to_string(), "Grace".to_string()];
    }

    fn on_destroy(&mut self) {
        tracing::info!("Closing repository with {} names", self.names.len());
    }
}

#[derive(Debug)]
struct GreetingService {
    repository: Inject<Repository>,
    greeting: String,
}
impl Component for GreetingService {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .func::<Config>()
            .field(|service| &mut service.repository)
            .injector(|service: &mut Self, config: Shared<Config>| {
                service.greeting = config.read().greeting.clone();
            });
    }

    fn on_container_ready(&mut self) {
        tracing::info!("Greeting service ready");
    }
}
impl GreetingService {
    fn greet(&self) -> String {
        let repository = self.repository.read();
        repository
            .names
            .iter()
            .map(|name| format!("{} {name}!", self.greeting))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
