//! A dependency container keyed by typed tokens, with singleton, scoped and transient lifetimes.
//!
//! ```rust
//! use std::sync::Arc;
//! use stratum::{Container, Provider, Token};
//!
//! struct Logger;
//! struct RequestId(String);
//!
//! let logger: Token<Logger> = Token::new("Logger");
//! let request_id: Token<RequestId> = Token::new("RequestId");
//!
//! let root = Container::new();
//! root.register(&logger, Provider::singleton(|_| Ok(Logger))).unwrap();
//! root.register(&request_id, Provider::scoped(|_| Ok(RequestId("req".to_owned())))).unwrap();
//!
//! let request = root.create_scope();
//! assert!(Arc::ptr_eq(&root.resolve(&logger).unwrap(), &request.resolve(&logger).unwrap()));
//! assert!(Arc::ptr_eq(&request.resolve(&request_id).unwrap(), &request.resolve(&request_id).unwrap()));
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub(crate) mod cache;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod errors;
pub(crate) mod finalizer;
pub(crate) mod guard;
pub(crate) mod lifetime;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod slot;
pub(crate) mod token;

pub use container::Container;
pub use context::Context;
pub use errors::{InstantiateErrorKind, InstantiateResult, MalformedProviderKind, RegisterErrorKind, ResolveErrorKind};
pub use finalizer::Finalizer;
pub use lifetime::Lifetime;
pub use provider::Provider;
pub use token::{Token, TokenInfo};
