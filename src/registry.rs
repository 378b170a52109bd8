use alloc::collections::{btree_map::Entry, BTreeMap};
use parking_lot::RwLock;

use crate::{errors::RegisterErrorKind, finalizer::BoxedFinalizer, lifetime::Lifetime, token::{RcAny, TokenInfo}};

/// Erased provider. `source` holds a `provider::Source<T>` of the token type.
#[derive(Clone)]
pub(crate) struct ProviderData {
    pub(crate) lifetime: Lifetime,
    pub(crate) source: RcAny,
    pub(crate) finalizer: Option<BoxedFinalizer>,
}

/// Append-only map of providers shared by a root container and all of its scopes.
#[derive(Default)]
pub(crate) struct Registry {
    providers: RwLock<BTreeMap<TokenInfo, ProviderData>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, token: TokenInfo, data: ProviderData) -> Result<(), RegisterErrorKind> {
        match self.providers.write().entry(token) {
            Entry::Vacant(entry) => {
                entry.insert(data);
                Ok(())
            }
            Entry::Occupied(_) => Err(RegisterErrorKind::DuplicateRegistration { token }),
        }
    }

    #[must_use]
    pub(crate) fn get(&self, token: &TokenInfo) -> Option<ProviderData> {
        self.providers.read().get(token).cloned()
    }

    #[must_use]
    pub(crate) fn contains(&self, token: &TokenInfo) -> bool {
        self.providers.read().contains_key(token)
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.providers.read().len()
    }
}
