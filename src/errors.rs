mod instantiate;
mod register;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use register::{MalformedProviderKind, RegisterErrorKind};
pub use resolve::ResolveErrorKind;

pub type InstantiateResult<T> = Result<T, InstantiateErrorKind>;
