use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use stratum::{Container, InstantiateErrorKind, Lifetime, Provider, RegisterErrorKind, ResolveErrorKind, Token};

struct Logger;

#[derive(Debug, PartialEq, Eq)]
struct RequestId(String);

fn random_request_id() -> RequestId {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    RequestId(format!("req-{:08x}", COUNTER.fetch_add(1, Ordering::Relaxed).wrapping_mul(0x9e37_79b9)))
}

#[test]
fn test_tokens_with_same_name_are_distinct() {
    let a: Token<Logger> = Token::new("Logger");
    let b: Token<Logger> = Token::new("Logger");

    assert_ne!(a, b);
    assert_ne!(a.id(), b.id());
    assert_eq!(a.name(), b.name());

    let container = Container::new();
    container.register(&a, Provider::singleton(|_| Ok(Logger))).unwrap();

    assert!(container.is_registered(&a));
    assert!(matches!(container.resolve(&b), Err(ResolveErrorKind::UnregisteredToken { .. })));
}

#[test]
fn test_duplicate_registration_rejected() {
    let token: Token<u32> = Token::new("Number");

    let container = Container::new();
    container.register(&token, Provider::value(1)).unwrap();
    let err = container.register(&token, Provider::value(2)).unwrap_err();

    assert!(matches!(err, RegisterErrorKind::DuplicateRegistration { .. }));
    assert_eq!(*container.resolve(&token).unwrap(), 1);
}

#[test]
fn test_singleton_identity() {
    let token: Token<Logger> = Token::new("Logger");

    let root = Container::new();
    root.register(&token, Provider::singleton(|_| Ok(Logger))).unwrap();

    let child = root.create_scope();
    let grandchild = child.create_scope();

    let from_root = root.resolve(&token).unwrap();
    assert!(Arc::ptr_eq(&from_root, &root.resolve(&token).unwrap()));
    assert!(Arc::ptr_eq(&from_root, &child.resolve(&token).unwrap()));
    assert!(Arc::ptr_eq(&from_root, &grandchild.resolve(&token).unwrap()));
}

#[test]
fn test_singleton_resolved_in_scope_seen_by_root() {
    let token: Token<Logger> = Token::new("Logger");

    let root = Container::new();
    root.register(&token, Provider::singleton(|_| Ok(Logger))).unwrap();

    let from_scope = root.create_scope().resolve(&token).unwrap();
    assert!(Arc::ptr_eq(&from_scope, &root.resolve(&token).unwrap()));
}

#[test]
fn test_scoped_isolation() {
    let token: Token<RequestId> = Token::new("RequestId");

    let root = Container::new();
    root.register(&token, Provider::scoped(|_| Ok(random_request_id()))).unwrap();

    let scope_a = root.create_scope();
    let scope_b = root.create_scope();

    let a = scope_a.resolve(&token).unwrap();
    assert!(Arc::ptr_eq(&a, &scope_a.resolve(&token).unwrap()));
    assert!(Arc::ptr_eq(&a, &scope_a.clone().resolve(&token).unwrap()));
    assert!(!Arc::ptr_eq(&a, &scope_b.resolve(&token).unwrap()));

    // The parent isn't shared with its children either
    assert!(!Arc::ptr_eq(&a, &root.resolve(&token).unwrap()));
    assert!(!Arc::ptr_eq(&a, &scope_a.create_scope().resolve(&token).unwrap()));
}

#[test]
fn test_transient_freshness() {
    let token: Token<RequestId> = Token::new("RequestId");
    let calls = Arc::new(AtomicU32::new(0));

    let root = Container::new();
    root.register(
        &token,
        Provider::transient({
            let calls = calls.clone();
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(random_request_id())
            }
        }),
    )
    .unwrap();

    let scope = root.create_scope();
    let first = scope.resolve(&token).unwrap();
    let second = scope.resolve(&token).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unregistered_lookup_fails() {
    let registered: Token<Logger> = Token::new("Logger");
    let unregistered: Token<Logger> = Token::new("Unregistered");

    let root = Container::new();
    root.register(&registered, Provider::scoped(|_| Ok(Logger))).unwrap();
    let scope = root.create_scope();

    match scope.resolve(&unregistered) {
        Err(ResolveErrorKind::UnregisteredToken { token }) => assert_eq!(token, unregistered.info()),
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("unregistered token resolved"),
    }
    assert!(!scope.is_registered(&unregistered));
}

#[test]
fn test_value_provider_bypass() {
    let value = Arc::new(Logger);

    for lifetime in Lifetime::all() {
        let token: Token<Logger> = Token::new("Logger");

        let root = Container::new();
        root.register(&token, Provider::value_rc(value.clone()).with_lifetime(lifetime))
            .unwrap();

        let scope_a = root.create_scope();
        let scope_b = root.create_scope();

        assert!(Arc::ptr_eq(&value, &root.resolve(&token).unwrap()));
        assert!(Arc::ptr_eq(&value, &scope_a.resolve(&token).unwrap()));
        assert!(Arc::ptr_eq(&value, &scope_b.resolve(&token).unwrap()));
    }
}

#[test]
fn test_lifetime_tag_registration() {
    let scoped: Token<RequestId> = Token::new("RequestId");
    let unknown: Token<RequestId> = Token::new("Unknown");

    let root = Container::new();
    root.register(
        &scoped,
        Provider::new().with_lifetime_tag("scoped").with_factory(|_| Ok(random_request_id())),
    )
    .unwrap();
    let err = root
        .register(
            &unknown,
            Provider::new().with_lifetime_tag("request").with_factory(|_| Ok(random_request_id())),
        )
        .unwrap_err();

    assert!(err.to_string().contains("unknown lifetime `request`"));
    assert!(!root.is_registered(&unknown));

    let scope = root.create_scope();
    assert!(Arc::ptr_eq(&scope.resolve(&scoped).unwrap(), &scope.resolve(&scoped).unwrap()));
}

#[test]
fn test_failed_scoped_factory_is_retried() {
    let token: Token<RequestId> = Token::new("RequestId");
    let calls = Arc::new(AtomicU32::new(0));

    let root = Container::new();
    root.register(
        &token,
        Provider::scoped({
            let calls = calls.clone();
            move |_| match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(anyhow::anyhow!("id generator unavailable").into()),
                _ => Ok(random_request_id()),
            }
        }),
    )
    .unwrap();

    let scope = root.create_scope();
    match scope.resolve(&token) {
        Err(ResolveErrorKind::Instantiate(InstantiateErrorKind::Custom(err))) => {
            assert_eq!(err.to_string(), "id generator unavailable");
        }
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("failing factory resolved"),
    }

    let first = scope.resolve(&token).unwrap();
    assert!(Arc::ptr_eq(&first, &scope.resolve(&token).unwrap()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_logger_and_request_id_scenario() {
    let logger_calls = Arc::new(AtomicU32::new(0));

    let logger: Token<Logger> = Token::new("Logger");
    let request_id: Token<RequestId> = Token::new("RequestId");

    let root = Container::new();
    root.register(
        &logger,
        Provider::singleton({
            let logger_calls = logger_calls.clone();
            move |_| {
                logger_calls.fetch_add(1, Ordering::SeqCst);
                Ok(Logger)
            }
        }),
    )
    .unwrap();
    root.register(&request_id, Provider::scoped(|_| Ok(random_request_id()))).unwrap();

    let a = root.create_scope();
    let b = root.create_scope();

    let root_logger = root.resolve(&logger).unwrap();
    assert!(Arc::ptr_eq(&root_logger, &a.resolve(&logger).unwrap()));
    assert!(Arc::ptr_eq(&root_logger, &b.resolve(&logger).unwrap()));
    assert_eq!(logger_calls.load(Ordering::SeqCst), 1);

    let a_id = a.resolve(&request_id).unwrap();
    let b_id = b.resolve(&request_id).unwrap();
    assert!(!Arc::ptr_eq(&a_id, &b_id));
    assert_ne!(a_id, b_id);
    assert!(Arc::ptr_eq(&a_id, &a.resolve(&request_id).unwrap()));
}

#[test]
fn test_boxed_trait_object() {
    trait UserRepo: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct PostgresUserRepo;

    impl UserRepo for PostgresUserRepo {
        fn name(&self) -> &'static str {
            "postgres"
        }
    }

    let token: Token<Box<dyn UserRepo>> = Token::new("UserRepo");

    let root = Container::new();
    root.register(&token, Provider::scoped(|_| Ok(Box::new(PostgresUserRepo) as Box<dyn UserRepo>)))
        .unwrap();

    assert_eq!(root.create_scope().resolve(&token).unwrap().name(), "postgres");
}
