use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;
use wrapp_container::{
    shared, Component, ComponentId, ComponentRegistry, Container, ContainerState, DependencyGraphError,
    Erased, Inject, InjectError, InjectionStrategy, InjectionTarget, InjectorKind, RegisterError,
    RequireError, Shared, Slots, StartError,
};

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct Database;
impl Component for Database {}

struct Repository {
    database: Inject<Database>,
}
impl Component for Repository {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.field(|repository| &mut repository.database);
    }
}

fn repository() -> Shared<Repository> {
    shared(Repository {
        database: Inject::empty(),
    })
}

#[test]
fn field_slots_receive_the_registered_instance() {
    let database = shared(Database);
    let repository = repository();

    let mut container = Container::initialized();
    container.register(repository.clone()).unwrap();
    container.register(database.clone()).unwrap();
    container.start().unwrap();

    assert!(Arc::ptr_eq(repository.read().database.get(), &database));
    assert!(Arc::ptr_eq(&container.require::<Database>().unwrap(), &database));
    assert_eq!(container.state(), ContainerState::Started);
}

struct Left {
    right: Inject<Right>,
}
impl Component for Left {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.field(|left| &mut left.right);
    }
}

struct Right {
    left: Inject<Left>,
}
impl Component for Right {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.field(|right| &mut right.left);
    }
}

#[test]
fn cycles_are_reported_with_their_path() {
    let left = shared(Left {
        right: Inject::empty(),
    });

    let mut container = Container::initialized();
    container.register(left.clone()).unwrap();
    container
        .register(shared(Right {
            left: Inject::empty(),
        }))
        .unwrap();

    let err = container.start().unwrap_err();
    let StartError::DependencyGraph(DependencyGraphError::CircularDependency { path }) = &err else {
        panic!("expected a cycle, got {err:?}");
    };

    assert!(path.contains(&ComponentId::of::<Left>()));
    assert!(path.contains(&ComponentId::of::<Right>()));
    assert_eq!(path.components().first(), path.components().last());
    assert!(err.to_string().contains(" -> "));

    // Nothing was initialized
    assert!(!left.read().right.is_bound());
    assert!(container.components().is_empty());
    assert_eq!(container.state(), ContainerState::Failed);
}

#[test]
fn missing_dependencies_abort_the_start() {
    let mut container = Container::initialized();
    container.register(repository()).unwrap();

    let err = container.start().unwrap_err();
    assert!(matches!(
        &err,
        StartError::DependencyGraph(DependencyGraphError::MissingDependency { component, dependency })
            if *component == ComponentId::of::<Repository>() && *dependency == ComponentId::of::<Database>()
    ));
}

struct Sensor {
    name: &'static str,
    log: Log,
}
impl Sensor {
    fn record(&self, event: &str) {
        self.log.lock().push(format!("{}.{event}", self.name));
    }
}
impl Component for Sensor {
    fn pre_init(&mut self) {
        self.record("pre_init");
    }

    fn post_init(&mut self) {
        self.record("post_init");
    }

    fn on_container_ready(&mut self) {
        self.record("ready");
    }

    fn on_destroy(&mut self) {
        self.record("destroy");
    }
}

struct Observer {
    sensor: Inject<Sensor>,
    log: Log,
}
impl Component for Observer {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.field(|observer| &mut observer.sensor);
    }

    fn pre_init(&mut self) {
        let bound = self.sensor.is_bound();
        self.log.lock().push(format!("observer.pre_init bound={bound}"));
    }

    fn post_init(&mut self) {
        let bound = self.sensor.is_bound();
        self.log.lock().push(format!("observer.post_init bound={bound}"));
    }

    fn on_container_ready(&mut self) {
        self.log.lock().push("observer.ready".to_string());
    }

    fn on_destroy(&mut self) {
        self.log.lock().push("observer.destroy".to_string());
    }
}

#[test]
fn hooks_follow_the_lifecycle() {
    let log = Log::default();

    let mut container = Container::initialized();
    container
        .register(shared(Observer {
            sensor: Inject::empty(),
            log: log.clone(),
        }))
        .unwrap();
    container
        .register(shared(Sensor {
            name: "sensor",
            log: log.clone(),
        }))
        .unwrap();

    container.start().unwrap();
    container.destroy().unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "sensor.pre_init",
            "sensor.post_init",
            "observer.pre_init bound=false",
            "observer.post_init bound=true",
            "sensor.ready",
            "observer.ready",
            "observer.destroy",
            "sensor.destroy",
        ]
    );
    assert_eq!(container.state(), ContainerState::Destroyed);
}

struct Mailer {
    database: Option<Shared<Database>>,
    repository: Option<Shared<Repository>>,
    calls: usize,
}
impl Mailer {
    fn new() -> Self {
        Self {
            database: None,
            repository: None,
            calls: 0,
        }
    }
}
impl Component for Mailer {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .func::<Database>()
            .func::<Repository>()
            .injector(|mailer: &mut Self, repository: Shared<Repository>, database: Shared<Database>| {
                mailer.repository = Some(repository);
                mailer.database = Some(database);
                mailer.calls += 1;
            });
    }
}

#[test]
fn injector_method_is_called_once_with_resolved_arguments() {
    let database = shared(Database);
    let mailer = shared(Mailer::new());

    let mut container = Container::initialized();
    container.register(mailer.clone()).unwrap();
    container.register(repository()).unwrap();
    container.register(database.clone()).unwrap();
    container.start().unwrap();

    let mailer = mailer.read();
    assert_eq!(mailer.calls, 1);
    assert!(Arc::ptr_eq(mailer.database.as_ref().unwrap(), &database));
    assert!(mailer.repository.is_some());
}

struct NoMethod;
impl Component for NoMethod {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.func::<Database>();
    }
}

struct ZeroArgs;
impl Component for ZeroArgs {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots.func::<Database>().injector(|_: &mut Self| {});
    }
}

struct WrongArgs;
impl Component for WrongArgs {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .func::<Database>()
            .injector(|_: &mut Self, _: Shared<Repository>| {});
    }
}

fn start_with<C: Component>(component: C) -> StartError {
    let mut container = Container::initialized();
    container.register(shared(component)).unwrap();
    container.register(shared(Database)).unwrap();
    container.start().unwrap_err()
}

#[test]
fn injector_method_must_be_declared() {
    assert!(matches!(
        start_with(NoMethod),
        StartError::InjectionFailed {
            kind: InjectorKind::Func,
            source: InjectError::InjectorMethodMissing,
            ..
        }
    ));
}

#[test]
fn injector_method_without_arguments_is_rejected() {
    let err = start_with(ZeroArgs);
    assert!(matches!(
        err,
        StartError::InjectionFailed {
            source: InjectError::ZeroArgInjector,
            ..
        }
    ));
}

#[test]
fn injector_method_arguments_must_match_func_slots() {
    let err = start_with(WrongArgs);
    let StartError::InjectionFailed {
        component,
        source: InjectError::InjectorArgMismatch { missing, unexpected },
        ..
    } = &err
    else {
        panic!("expected an argument mismatch, got {err:?}");
    };

    assert_eq!(*component, ComponentId::of::<WrongArgs>());
    assert_eq!(*missing, vec![ComponentId::of::<Database>()]);
    assert_eq!(*unexpected, vec![ComponentId::of::<Repository>()]);
    assert!(err.to_string().contains(ComponentId::of::<WrongArgs>().as_str()));
}

struct Twice {
    database: Inject<Database>,
}
impl Component for Twice {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .field(|twice| &mut twice.database)
            .field(|twice| &mut twice.database);
    }
}

#[test]
fn bound_slots_are_not_reassigned() {
    let err = start_with(Twice {
        database: Inject::empty(),
    });
    assert!(matches!(
        err,
        StartError::InjectionFailed {
            kind: InjectorKind::Field,
            source: InjectError::SlotNotAssignable { .. },
            ..
        }
    ));
}

/// Binds slots like the field strategy and counts every call
struct Counting {
    calls: Arc<AtomicUsize>,
}
impl InjectionStrategy for Counting {
    fn inject(&self, target: InjectionTarget<'_>, components: &ComponentRegistry) -> Result<(), InjectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for slot in target.slots {
            let dependency = components.get_required(slot.dependency())?;
            slot.assign(target.instance, dependency)?;
        }
        Ok(())
    }
}

struct Rejecting;
impl InjectionStrategy for Rejecting {
    fn inject(&self, target: InjectionTarget<'_>, _: &ComponentRegistry) -> Result<(), InjectError> {
        Err(InjectError::Other(format!("'{}' is not welcome", target.component).into()))
    }
}

struct Cached {
    database: Inject<Database>,
    repository: Inject<Repository>,
}
impl Component for Cached {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .custom("counted", |cached| &mut cached.database)
            .custom("counted", |cached| &mut cached.repository);
    }
}

fn cached() -> Shared<Cached> {
    shared(Cached {
        database: Inject::empty(),
        repository: Inject::empty(),
    })
}

#[test]
fn custom_strategies_run_once_per_component() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cached = cached();

    let mut container = Container::builder()
        .injector("counted", Counting { calls: calls.clone() })
        .build_initialized();
    container.register(cached.clone()).unwrap();
    container.register(repository()).unwrap();
    container.register(shared(Database)).unwrap();
    container.start().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(cached.read().database.is_bound());
    assert!(cached.read().repository.is_bound());
}

#[test]
fn custom_strategy_errors_abort_the_start() {
    let mut container = Container::builder()
        .injector("counted", Rejecting)
        .build_initialized();
    container.register(cached()).unwrap();
    container.register(repository()).unwrap();
    container.register(shared(Database)).unwrap();

    let err = container.start().unwrap_err();
    assert!(matches!(
        &err,
        StartError::InjectionFailed {
            kind: InjectorKind::Custom("counted"),
            source: InjectError::Other(_),
            ..
        }
    ));
    assert!(err.to_string().contains("is not welcome"));
}

#[test]
fn unknown_injector_kinds_are_rejected_on_registration() {
    let mut container = Container::initialized();

    let err = container.register(cached()).unwrap_err();
    assert_eq!(
        err,
        RegisterError::UnknownInjectorKind {
            component: ComponentId::of::<Cached>(),
            dependency: ComponentId::of::<Database>(),
            kind: InjectorKind::Custom("counted"),
        }
    );
}

#[test]
fn registration_is_closed_after_start() {
    let mut container = Container::initialized();
    container.register(shared(Database)).unwrap();
    container.start().unwrap();

    assert!(matches!(
        container.register(repository()),
        Err(RegisterError::State(_))
    ));
    assert!(matches!(container.start(), Err(StartError::State(_))));
}

#[test]
fn start_requires_init() {
    let mut container = Container::new();
    let err = container.start().unwrap_err();

    assert_eq!(err.to_string(), "cannot start while the container is uninitialized");
    assert_eq!(container.state(), ContainerState::Uninitialized);
}

struct Reporting {
    primary: Inject<Database>,
    replica: Inject<Database>,
}
impl Component for Reporting {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .field_named("primary", |reporting| &mut reporting.primary)
            .field_named("replica", |reporting| &mut reporting.replica);
    }
}

#[test]
fn named_components_are_injected_by_name() {
    let primary = shared(Database);
    let replica = shared(Database);
    let reporting = shared(Reporting {
        primary: Inject::empty(),
        replica: Inject::empty(),
    });

    let mut container = Container::initialized();
    container.register(reporting.clone()).unwrap();
    container.register_named("primary", primary.clone()).unwrap();
    container.register_named("replica", replica.clone()).unwrap();
    container.start().unwrap();

    assert!(Arc::ptr_eq(reporting.read().primary.get(), &primary));
    assert!(Arc::ptr_eq(reporting.read().replica.get(), &replica));

    let instance = container.get_component_by_name("replica").unwrap();
    assert!(Arc::ptr_eq(&instance.downcast::<Database>().unwrap(), &replica));
    // Registered by name only
    assert!(container.get_component::<Database>().is_none());
}

struct Replicator {
    primary: Option<Shared<Database>>,
    replica: Option<Shared<Database>>,
}
impl Component for Replicator {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .func_named::<Database>("primary")
            .func_named::<Database>("replica")
            .injector(
                |replicator: &mut Self, primary: Shared<Database>, replica: Shared<Database>| {
                    replicator.primary = Some(primary);
                    replicator.replica = Some(replica);
                },
            );
    }
}

#[test]
fn named_components_are_passed_to_the_injector_method() {
    let primary = shared(Database);
    let replica = shared(Database);
    let replicator = shared(Replicator {
        primary: None,
        replica: None,
    });

    let mut container = Container::initialized();
    container.register(replicator.clone()).unwrap();
    container.register_named("replica", replica.clone()).unwrap();
    container.register_named("primary", primary.clone()).unwrap();
    container.start().unwrap();

    let replicator = replicator.read();
    assert!(Arc::ptr_eq(replicator.primary.as_ref().unwrap(), &primary));
    assert!(Arc::ptr_eq(replicator.replica.as_ref().unwrap(), &replica));
}

struct Archiver;
impl Component for Archiver {
    fn describe(&self, slots: &mut Slots<Self>) {
        slots
            .func_named::<Database>("archive")
            .injector(|_: &mut Self, _: Shared<Repository>| {});
    }
}

#[test]
fn named_func_slots_need_a_parameter_of_their_type() {
    let mut container = Container::initialized();
    container.register(shared(Archiver)).unwrap();
    container.register_named("archive", shared(Database)).unwrap();

    let err = container.start().unwrap_err();
    let StartError::InjectionFailed {
        source: InjectError::InjectorArgMismatch { missing, unexpected },
        ..
    } = &err
    else {
        panic!("expected an argument mismatch, got {err:?}");
    };

    assert_eq!(*missing, vec![ComponentId::from("archive")]);
    assert_eq!(*unexpected, vec![ComponentId::of::<Repository>()]);
}

#[test]
fn mistyped_named_components_fail_to_inject() {
    let mut container = Container::initialized();
    container
        .register(shared(Reporting {
            primary: Inject::empty(),
            replica: Inject::empty(),
        }))
        .unwrap();
    container.register_named("primary", shared(Database)).unwrap();
    container.register_named("replica", repository()).unwrap();
    container.register(shared(Database)).unwrap();

    let err = container.start().unwrap_err();
    assert!(matches!(
        err,
        StartError::InjectionFailed {
            source: InjectError::Require(RequireError::DowncastFailed { .. }),
            ..
        }
    ));
}

#[test]
fn erased_registration_requires_a_shared_handle() {
    let mut container = Container::initialized();

    let plain: Arc<Erased> = Arc::new(Database);
    assert_eq!(
        container.register_any::<Database>(plain).unwrap_err(),
        RegisterError::NotShared(ComponentId::of::<Database>())
    );

    let database = shared(Database);
    let handle: Arc<Erased> = database.clone();
    container.register_any::<Database>(handle).unwrap();
    container.start().unwrap();

    assert!(Arc::ptr_eq(&container.require::<Database>().unwrap(), &database));
}
