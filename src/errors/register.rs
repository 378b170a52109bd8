use alloc::string::String;

use crate::token::TokenInfo;

#[derive(thiserror::Error, Debug)]
pub enum RegisterErrorKind {
    #[error("Token {token} is already registered")]
    DuplicateRegistration { token: TokenInfo },
    #[error("Malformed provider for token {token}: {kind}")]
    MalformedProvider { token: TokenInfo, kind: MalformedProviderKind },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedProviderKind {
    #[error("provider has neither a value nor a factory")]
    NoSource,
    #[error("provider has both a value and a factory")]
    ConflictingSources,
    #[error("unknown lifetime `{0}`, expected one of: singleton, scoped, transient")]
    UnknownLifetime(String),
}
