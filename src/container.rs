use alloc::sync::Arc;
use core::any::type_name;
use tracing::{debug, error, info_span};

use crate::{
    cache::{Cache, Resolved},
    context::Context,
    errors::{RegisterErrorKind, ResolveErrorKind},
    guard::TransientGuard,
    lifetime::Lifetime,
    provider::{BoxedFactory, Provider, Source},
    registry::{ProviderData, Registry},
    slot::SlotError,
    token::{RcAny, Token, TokenInfo},
};

/// Registers providers and resolves tokens to instances.
///
/// A container is a handle: clones refer to the same scope.
/// Scopes created with [`Container::create_scope`] share the registry and the singleton cache of the root,
/// each with its own cache of scoped instances.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use stratum::{Container, Provider, Token};
///
/// struct Logger;
/// struct RequestId(u64);
///
/// let logger: Token<Logger> = Token::new("Logger");
/// let request_id: Token<RequestId> = Token::new("RequestId");
///
/// let root = Container::new();
/// root.register(&logger, Provider::singleton(|_| Ok(Logger))).unwrap();
/// root.register(&request_id, Provider::scoped(|_| Ok(RequestId(0)))).unwrap();
///
/// let a = root.create_scope();
/// let b = root.create_scope();
///
/// assert!(Arc::ptr_eq(&a.resolve(&logger).unwrap(), &b.resolve(&logger).unwrap()));
/// assert!(!Arc::ptr_eq(&a.resolve(&request_id).unwrap(), &b.resolve(&request_id).unwrap()));
/// ```
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    /// Creates a root container with an empty registry and empty caches.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                scoped: Cache::new(),
                singletons: Arc::new(Cache::new()),
                registry: Arc::new(Registry::new()),
                depth: 0,
            }),
        }
    }

    /// Registers a provider for the token.
    /// The registration is visible to every container sharing the registry.
    ///
    /// # Errors
    /// - Returns [`RegisterErrorKind::MalformedProvider`] if the provider has no source, both sources or an unknown lifetime
    /// - Returns [`RegisterErrorKind::DuplicateRegistration`] if the token is already registered.
    ///   The registered provider stays in force.
    pub fn register<T: Send + Sync + 'static>(&self, token: &Token<T>, provider: Provider<T>) -> Result<(), RegisterErrorKind> {
        let info = token.info();
        let span = info_span!("register", token = info.name, id = info.id, provides = type_name::<T>());
        let _guard = span.enter();

        let data = match provider.into_data() {
            Ok(data) => data,
            Err(kind) => {
                let err = RegisterErrorKind::MalformedProvider { token: info, kind };
                error!("{}", err);
                return Err(err);
            }
        };
        let lifetime = data.lifetime;

        if let Err(err) = self.inner.registry.insert(info, data) {
            error!("{}", err);
            return Err(err);
        }
        debug!(%lifetime, registered = self.inner.registry.len(), "Registered");

        Ok(())
    }

    /// Resolves the token.
    ///
    /// - A value provider returns its value.
    /// - A singleton is taken from the cache shared by the whole container tree, constructed on a miss.
    /// - A scoped instance is taken from the cache of this container, constructed on a miss.
    /// - A transient instance is constructed on every call.
    ///
    /// Concurrent resolutions of the same uncached singleton or scoped token call the factory once.
    /// If the factory fails, nothing is cached and the next resolution calls it again.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UnregisteredToken`] if the token isn't registered
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if the factory requires the token it constructs.
    ///   Transient cycles are only detected with the `std` feature
    /// - Returns [`ResolveErrorKind::Instantiate`] with the error of the factory if it fails
    pub fn resolve<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>, ResolveErrorKind> {
        let info = token.info();
        let span = info_span!("resolve", token = info.name, id = info.id, scope = self.inner.depth);
        let _guard = span.enter();

        let Some(ProviderData {
            lifetime,
            source,
            finalizer,
        }) = self.inner.registry.get(&info)
        else {
            let err = ResolveErrorKind::UnregisteredToken { token: info };
            error!("{}", err);
            return Err(err);
        };

        let factory = match source.downcast::<Source<T>>() {
            Ok(source) => match &*source {
                Source::Value(value) => {
                    debug!("Provided by value");
                    return Ok(value.clone());
                }
                Source::Factory(factory) => factory.clone(),
            },
            Err(_) => return Err(incorrect_type::<T>(info)),
        };

        let cache = match lifetime {
            Lifetime::Singleton => &*self.inner.singletons,
            Lifetime::Scoped => &self.inner.scoped,
            Lifetime::Transient => {
                let Some(_guard) = TransientGuard::enter(info) else {
                    let err = ResolveErrorKind::CyclicDependency { token: info };
                    error!("{}", err);
                    return Err(err);
                };
                return self.instantiate(&factory).map(Arc::new);
            }
        };

        let mut constructed = false;
        let result = cache.slot(info).get_or_try_init(|| -> Result<RcAny, ResolveErrorKind> {
            debug!("Not found in cache");
            let dependency = Arc::new(self.instantiate(&factory)?);
            constructed = true;

            if let Some(finalizer) = &finalizer {
                cache.push_resolved(Resolved {
                    token: info,
                    dependency: dependency.clone(),
                    finalizer: finalizer.clone(),
                });
                debug!("Pushed to resolved set");
            }

            Ok(dependency as RcAny)
        });

        match result {
            Ok(dependency) => {
                if constructed {
                    debug!(%lifetime, "Cached");
                } else {
                    debug!(%lifetime, "Found in cache");
                }
                dependency.downcast::<T>().map_err(|_| incorrect_type::<T>(info))
            }
            Err(SlotError::Reentrant) => {
                let err = ResolveErrorKind::CyclicDependency { token: info };
                error!("{}", err);
                Err(err)
            }
            Err(SlotError::Init(err)) => Err(err),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_registered<T>(&self, token: &Token<T>) -> bool {
        self.inner.registry.contains(&token.info())
    }

    /// Returns `true` if an instance of the token is cached in this scope or in the singleton cache.
    /// Value and transient providers are never cached.
    ///
    /// Doesn't wait for a construction in progress: a token being constructed by another thread isn't resolved yet.
    #[must_use]
    pub fn is_resolved<T>(&self, token: &Token<T>) -> bool {
        let info = token.info();
        self.inner.scoped.get(&info).is_some() || self.inner.singletons.get(&info).is_some()
    }

    /// Creates a child scope with an empty cache of scoped instances.
    #[inline]
    #[must_use]
    pub fn create_scope(&self) -> Container {
        self.create_scope_with_context(Context::new())
    }

    /// Creates a child scope whose cache of scoped instances starts with the context values.
    #[must_use]
    pub fn create_scope_with_context(&self, context: Context) -> Container {
        let depth = self.inner.depth + 1;
        debug!(depth, context = context.len(), "Scope created");

        Container {
            inner: Arc::new(ContainerInner {
                scoped: Cache::with_context(context),
                singletons: self.inner.singletons.clone(),
                registry: self.inner.registry.clone(),
                depth,
            }),
        }
    }

    /// Number of scopes between this container and the root, `0` for the root itself.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.depth == 0
    }

    /// Closes the container, calling finalizers of its scoped instances in LIFO order of resolution.
    /// On the root container singletons are finalized too.
    ///
    /// # Warning
    /// This method can be called multiple times, but it will only call finalizers for instances resolved since the last call.
    /// Instances are constructed again when resolved after closing.
    pub fn close(&self) {
        let span = info_span!("close", scope = self.inner.depth);
        let _guard = span.enter();

        self.inner.close();
        if self.is_root() {
            self.inner.singletons.close();
            debug!("Singletons closed");
        }
    }
}

impl Container {
    fn instantiate<T>(&self, factory: &BoxedFactory<T>) -> Result<T, ResolveErrorKind> {
        match factory(self) {
            Ok(dependency) => {
                debug!("Instantiated");
                Ok(dependency)
            }
            Err(err) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiate(err))
            }
        }
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn incorrect_type<T>(token: TokenInfo) -> ResolveErrorKind {
    let err = ResolveErrorKind::IncorrectType {
        token,
        expected: type_name::<T>(),
    };
    error!("{}", err);
    err
}

pub(crate) struct ContainerInner {
    pub(crate) scoped: Cache,
    pub(crate) singletons: Arc<Cache>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) depth: usize,
}

impl ContainerInner {
    fn close(&self) {
        self.scoped.close();
        debug!("Container closed");
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        // Scoped instances go before the singletons they may depend on
        self.close();
    }
}
