use core::{cell::RefCell, mem};
use parking_lot::ReentrantMutex;

use crate::token::RcAny;

enum SlotState {
    Vacant,
    Constructing,
    Occupied(RcAny),
}

pub(crate) enum SlotError<E> {
    /// The slot was entered again by the thread constructing its value.
    Reentrant,
    Init(E),
}

/// Per-token construction cell of a cache.
///
/// At most one initializer runs at a time. Other threads block on the slot until
/// it finishes, then either observe the value or, if it failed, run their own initializer.
pub(crate) struct Slot {
    state: ReentrantMutex<RefCell<SlotState>>,
}

impl Slot {
    #[inline]
    #[must_use]
    pub(crate) fn vacant() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(SlotState::Vacant)),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn occupied(value: RcAny) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(SlotState::Occupied(value))),
        }
    }

    /// Returns the value without waiting. A slot locked by another thread reads as empty.
    #[must_use]
    pub(crate) fn get(&self) -> Option<RcAny> {
        let guard = self.state.try_lock()?;
        let state = guard.borrow();
        match &*state {
            SlotState::Occupied(value) => Some(value.clone()),
            SlotState::Vacant | SlotState::Constructing => None,
        }
    }

    pub(crate) fn get_or_try_init<F, E>(&self, init: F) -> Result<RcAny, SlotError<E>>
    where
        F: FnOnce() -> Result<RcAny, E>,
    {
        let guard = self.state.lock();
        match &*guard.borrow() {
            SlotState::Occupied(value) => return Ok(value.clone()),
            SlotState::Constructing => return Err(SlotError::Reentrant),
            SlotState::Vacant => {}
        }

        let reset = ResetOnUnwind { state: &*guard };
        guard.replace(SlotState::Constructing);
        let result = init();
        mem::forget(reset);

        match result {
            Ok(value) => {
                guard.replace(SlotState::Occupied(value.clone()));
                Ok(value)
            }
            Err(err) => {
                guard.replace(SlotState::Vacant);
                Err(SlotError::Init(err))
            }
        }
    }
}

impl Default for Slot {
    #[inline]
    fn default() -> Self {
        Self::vacant()
    }
}

// Puts a slot back to vacant if its initializer panics
struct ResetOnUnwind<'a> {
    state: &'a RefCell<SlotState>,
}

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        self.state.replace(SlotState::Vacant);
    }
}
