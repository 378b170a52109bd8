use alloc::boxed::Box;

use super::resolve::ResolveErrorKind;

/// Error returned by a factory.
///
/// Nested resolutions inside a factory can be propagated with `?`,
/// any other failure is carried as [`anyhow::Error`].
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}
