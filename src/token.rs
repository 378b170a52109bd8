use alloc::sync::Arc;
use core::{
    any::Any,
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};

pub(crate) type RcAny = Arc<dyn Any + Send + Sync>;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Untyped view of a [`Token`].
///
/// Equality and ordering only look at `id`, the name is kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub id: u64,
    pub name: &'static str,
}

impl PartialEq for TokenInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TokenInfo {}

impl PartialOrd for TokenInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TokenInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TokenInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Opaque key of a registration that resolves to `T`.
///
/// Every call to [`Token::new`] produces a token distinct from all others,
/// even when the names are equal.
///
/// # Examples
/// ```rust
/// use stratum::Token;
///
/// struct Logger;
///
/// let a: Token<Logger> = Token::new("Logger");
/// let b: Token<Logger> = Token::new("Logger");
///
/// assert_eq!(a, a);
/// assert_ne!(a, b);
/// ```
pub struct Token<T> {
    info: TokenInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let id = NEXT_TOKEN_ID.fetch_add(1, AtomicOrdering::Relaxed);
        Self {
            info: TokenInfo { id, name },
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> TokenInfo {
        self.info
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.info.id
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.info.name
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Token<T> {}

impl<T> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}

impl<T> Eq for Token<T> {}

impl<T> PartialOrd for Token<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Token<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.info.cmp(&other.info)
    }
}

impl<T> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.hash(state);
    }
}

impl<T> Debug for Token<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.info.id)
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T> From<Token<T>> for TokenInfo {
    fn from(token: Token<T>) -> Self {
        token.info
    }
}
