use alloc::sync::Arc;
use core::any::type_name;
use tracing::debug;

use crate::{
    errors::{InstantiateResult, MalformedProviderKind},
    finalizer::{boxed_finalizer_factory, BoxedFinalizer, Finalizer},
    lifetime::Lifetime,
    registry::ProviderData,
    token::RcAny,
    Container,
};

pub(crate) type BoxedFactory<T> = Arc<dyn Fn(&Container) -> InstantiateResult<T> + Send + Sync>;

pub(crate) enum Source<T> {
    Value(Arc<T>),
    Factory(BoxedFactory<T>),
}

/// Describes how a [`Container`] produces a value for a token.
///
/// A provider holds exactly one source, either a ready value or a factory.
/// The raw builder methods can express zero or two sources, such providers are
/// rejected by [`Container::register`].
///
/// # Examples
/// ```rust
/// use stratum::{Container, Lifetime, Provider, Token};
///
/// struct Config {
///     url: &'static str,
/// }
/// struct Client {
///     url: &'static str,
/// }
///
/// let config: Token<Config> = Token::new("Config");
/// let client: Token<Client> = Token::new("Client");
///
/// let container = Container::new();
/// container.register(&config, Provider::value(Config { url: "localhost" })).unwrap();
/// container
///     .register(
///         &client,
///         Provider::new()
///             .with_lifetime(Lifetime::Scoped)
///             .with_factory(move |container| {
///                 let config = container.resolve(&config)?;
///                 Ok(Client { url: config.url })
///             }),
///     )
///     .unwrap();
///
/// assert_eq!(container.create_scope().resolve(&client).unwrap().url, "localhost");
/// ```
pub struct Provider<T> {
    lifetime: Result<Lifetime, MalformedProviderKind>,
    value: Option<Arc<T>>,
    factory: Option<BoxedFactory<T>>,
    finalizer: Option<BoxedFinalizer>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    /// Creates a provider without a source and with [`Lifetime::Singleton`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            lifetime: Ok(Lifetime::default()),
            value: None,
            factory: None,
            finalizer: None,
        }
    }

    /// Provider of a value created outside the container.
    /// Every resolution returns the same instance.
    #[inline]
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::new().with_value(value)
    }

    #[inline]
    #[must_use]
    pub fn value_rc(value: Arc<T>) -> Self {
        Self::new().with_value_rc(value)
    }

    #[inline]
    #[must_use]
    pub fn singleton<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> InstantiateResult<T> + Send + Sync + 'static,
    {
        Self::new().with_lifetime(Lifetime::Singleton).with_factory(factory)
    }

    #[inline]
    #[must_use]
    pub fn scoped<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> InstantiateResult<T> + Send + Sync + 'static,
    {
        Self::new().with_lifetime(Lifetime::Scoped).with_factory(factory)
    }

    /// Provider whose factory is called on every resolution.
    ///
    /// # Warning
    /// A transient factory requiring its own token, directly or through other transients,
    /// fails with [`crate::ResolveErrorKind::CyclicDependency`] only with the `std` feature.
    /// Without it such a cycle recurses until the stack overflows.
    #[inline]
    #[must_use]
    pub fn transient<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> InstantiateResult<T> + Send + Sync + 'static,
    {
        Self::new().with_lifetime(Lifetime::Transient).with_factory(factory)
    }

    #[inline]
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Ok(lifetime);
        self
    }

    /// Sets the lifetime from its textual name.
    /// An unknown name makes the registration fail with [`MalformedProviderKind::UnknownLifetime`].
    #[inline]
    #[must_use]
    pub fn with_lifetime_tag(mut self, tag: &str) -> Self {
        self.lifetime = tag.parse();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_value(self, value: T) -> Self {
        self.with_value_rc(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn with_value_rc(mut self, value: Arc<T>) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the factory. It's called with the container performing the resolution,
    /// so nested resolutions see the same scope.
    #[inline]
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Container) -> InstantiateResult<T> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Adds a finalizer for the cached instances of the provider.
    /// The finalizer is called when the cache holding the instance is closed, in LIFO order of resolution.
    ///
    /// # Warning
    /// The finalizer is ignored for transient and value providers, because the container doesn't keep their instances.
    #[inline]
    #[must_use]
    pub fn with_finalizer(mut self, finalizer: impl Finalizer<T>) -> Self {
        self.finalizer = Some(boxed_finalizer_factory(finalizer));
        self
    }

    /// Declared lifetime, [`None`] if it was set from an unknown tag.
    #[inline]
    #[must_use]
    pub fn lifetime(&self) -> Option<Lifetime> {
        self.lifetime.as_ref().ok().copied()
    }

    pub(crate) fn into_data(self) -> Result<ProviderData, MalformedProviderKind> {
        let lifetime = self.lifetime?;
        let source = match (self.value, self.factory) {
            (Some(value), None) => Source::Value(value),
            (None, Some(factory)) => Source::Factory(factory),
            (None, None) => return Err(MalformedProviderKind::NoSource),
            (Some(_), Some(_)) => return Err(MalformedProviderKind::ConflictingSources),
        };

        let finalizer = match (&source, self.finalizer) {
            (Source::Factory(_), Some(finalizer)) if lifetime.is_cached() => Some(finalizer),
            (_, Some(_)) => {
                debug!(%lifetime, provides = type_name::<T>(), "Finalizer ignored");
                None
            }
            (_, None) => None,
        };

        Ok(ProviderData {
            lifetime,
            source: Arc::new(source) as RcAny,
            finalizer,
        })
    }
}

impl<T: Send + Sync + 'static> Default for Provider<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
