use alloc::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
};
use core::mem;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    context::Context,
    finalizer::BoxedFinalizer,
    slot::Slot,
    token::{RcAny, TokenInfo},
};

/// Instances of one lifetime: the singletons of a container tree or the scoped instances of one scope.
pub(crate) struct Cache {
    slots: Mutex<BTreeMap<TokenInfo, Arc<Slot>>>,
    resolved: Mutex<ResolvedSet>,
    context: Context,
}

impl Cache {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::with_context(Context::new())
    }

    #[must_use]
    pub(crate) fn with_context(context: Context) -> Self {
        Self {
            slots: Mutex::new(seeded_slots(&context)),
            resolved: Mutex::new(ResolvedSet::new()),
            context,
        }
    }

    /// Returns the slot of the token, creating a vacant one if absent.
    #[must_use]
    pub(crate) fn slot(&self, token: TokenInfo) -> Arc<Slot> {
        self.slots.lock().entry(token).or_default().clone()
    }

    #[must_use]
    pub(crate) fn get(&self, token: &TokenInfo) -> Option<RcAny> {
        let slot = self.slots.lock().get(token).cloned()?;
        slot.get()
    }

    #[inline]
    pub(crate) fn push_resolved(&self, resolved: Resolved) {
        self.resolved.lock().push(resolved);
    }

    /// Calls finalizers of the resolved instances in LIFO order and resets the cache to its context.
    pub(crate) fn close(&self) {
        let mut resolved_set = mem::take(&mut *self.resolved.lock());
        let slots = mem::replace(&mut *self.slots.lock(), seeded_slots(&self.context));

        while let Some(Resolved {
            token,
            dependency,
            finalizer,
        }) = resolved_set.0.pop_back()
        {
            finalizer(dependency);
            debug!(%token, "Finalizer called");
        }

        drop(slots);
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.close();
    }
}

fn seeded_slots(context: &Context) -> BTreeMap<TokenInfo, Arc<Slot>> {
    context
        .map
        .iter()
        .map(|(token, value)| (*token, Arc::new(Slot::occupied(value.clone()))))
        .collect()
}

pub(crate) struct Resolved {
    pub(crate) token: TokenInfo,
    pub(crate) dependency: RcAny,
    pub(crate) finalizer: BoxedFinalizer,
}

#[derive(Default)]
pub(crate) struct ResolvedSet(pub(crate) VecDeque<Resolved>);

impl ResolvedSet {
    pub(crate) fn new() -> Self {
        Self(VecDeque::new())
    }

    pub(crate) fn push(&mut self, resolved: Resolved) {
        self.0.push_back(resolved);
    }
}
