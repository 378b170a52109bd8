use alloc::{collections::BTreeMap, sync::Arc};

use crate::token::{RcAny, Token, TokenInfo};

/// Pre-resolved instances seeding the scoped cache of a new scope.
///
/// Only tokens registered with [`crate::Lifetime::Scoped`] read from it.
#[derive(Default, Clone)]
pub struct Context {
    pub(crate) map: BTreeMap<TokenInfo, RcAny>,
}

impl Context {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, token: &Token<T>, value: T) -> Option<Arc<T>> {
        self.insert_rc(token, Arc::new(value))
    }

    #[inline]
    pub fn insert_rc<T: Send + Sync + 'static>(&mut self, token: &Token<T>, value: Arc<T>) -> Option<Arc<T>> {
        self.map
            .insert(token.info(), value)
            .and_then(|boxed| boxed.downcast().ok())
    }

    #[inline]
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, token: &Token<T>, value: T) -> Self {
        self.insert(token, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn contains<T>(&self, token: &Token<T>) -> bool {
        self.map.contains_key(&token.info())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
