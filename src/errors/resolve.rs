use super::instantiate::InstantiateErrorKind;
use crate::token::TokenInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Token {token} is not registered")]
    UnregisteredToken { token: TokenInfo },
    #[error("Provider of token {token} doesn't hold the expected type {expected}")]
    IncorrectType { token: TokenInfo, expected: &'static str },
    #[error("Cyclic dependency detected: token {token} is required while it's being constructed")]
    CyclicDependency { token: TokenInfo },
    #[error(transparent)]
    Instantiate(InstantiateErrorKind),
}
