use alloc::borrow::ToOwned as _;
use core::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::errors::MalformedProviderKind;

/// How long a constructed instance is reused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Lifetime {
    /// One instance per container tree.
    #[default]
    Singleton,
    /// One instance per scope.
    Scoped,
    /// A new instance per resolution.
    Transient,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Scoped)
    }

    #[inline]
    #[must_use]
    pub const fn all() -> [Self; 3] {
        use Lifetime::*;

        [Singleton, Scoped, Transient]
    }
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lifetime {
    type Err = MalformedProviderKind;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|lifetime| lifetime.name() == tag)
            .ok_or_else(|| MalformedProviderKind::UnknownLifetime(tag.to_owned()))
    }
}
