//! Error surface of the engine.
//!
//! Two of the three failure classes never reach this type: programming
//! errors (misusing a dynamic getter, referencing through a primary env)
//! are contract panics, and benign absence (missing bucket, empty env) is
//! an empty result. What remains is client code failing underneath a
//! lookup, which propagates out as [`EnvError`].

use std::error::Error as StdError;
use std::fmt;

/// Result alias used throughout the engine.
pub type EnvResult<T> = Result<T, EnvError>;

/// An error surfaced to callers of the lookup engine.
#[derive(Debug)]
pub enum EnvError {
    /// A client resolver failed during lookup. The original error is
    /// preserved and exposed through `source()`.
    Resolver(Box<dyn StdError + 'static>),
}

impl EnvError {
    /// Wrap a client error raised inside a resolver.
    pub fn resolver(err: impl StdError + 'static) -> Self {
        EnvError::Resolver(Box::new(err))
    }
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::Resolver(err) => write!(f, "resolver failed during lookup: {}", err),
        }
    }
}

impl StdError for EnvError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EnvError::Resolver(err) => Some(err.as_ref()),
        }
    }
}
