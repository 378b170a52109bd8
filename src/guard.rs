use crate::token::TokenInfo;

#[cfg(feature = "std")]
std::thread_local! {
    static CONSTRUCTING: core::cell::RefCell<alloc::vec::Vec<TokenInfo>> =
        const { core::cell::RefCell::new(alloc::vec::Vec::new()) };
}

/// Marks a transient token as being constructed on the current thread.
///
/// Without the `std` feature there's no thread-local state and every entry succeeds.
#[cfg_attr(not(feature = "std"), allow(dead_code))]
pub(crate) struct TransientGuard {
    token: TokenInfo,
}

impl TransientGuard {
    /// Returns [`None`] if the token is already being constructed by this thread.
    #[cfg(feature = "std")]
    #[must_use]
    pub(crate) fn enter(token: TokenInfo) -> Option<Self> {
        CONSTRUCTING.with(|constructing| {
            let mut constructing = constructing.borrow_mut();
            if constructing.contains(&token) {
                return None;
            }
            constructing.push(token);
            Some(Self { token })
        })
    }

    #[cfg(not(feature = "std"))]
    #[must_use]
    pub(crate) fn enter(token: TokenInfo) -> Option<Self> {
        Some(Self { token })
    }
}

#[cfg(feature = "std")]
impl Drop for TransientGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let _ = CONSTRUCTING.try_with(|constructing| {
            let mut constructing = constructing.borrow_mut();
            if let Some(pos) = constructing.iter().rposition(|token| *token == self.token) {
                constructing.remove(pos);
            }
        });
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    extern crate std;

    use super::TransientGuard;
    use crate::Token;

    use std::{
        panic::{self, AssertUnwindSafe},
        thread,
    };

    #[test]
    fn test_nested_enter_rejected() {
        let token: Token<u8> = Token::new("Number");

        let guard = TransientGuard::enter(token.info()).unwrap();
        assert!(TransientGuard::enter(token.info()).is_none());

        drop(guard);
        assert!(TransientGuard::enter(token.info()).is_some());
    }

    #[test]
    fn test_other_thread_not_affected() {
        let token: Token<u8> = Token::new("Number");

        let _guard = TransientGuard::enter(token.info()).unwrap();
        let info = token.info();
        assert!(thread::spawn(move || TransientGuard::enter(info).is_some()).join().unwrap());
    }

    #[test]
    fn test_released_on_unwind() {
        let token: Token<u8> = Token::new("Number");

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = TransientGuard::enter(token.info()).unwrap();
            panic!("factory panicked");
        }));
        assert!(result.is_err());

        assert!(TransientGuard::enter(token.info()).is_some());
    }
}
