//! On-demand environment handles.
//!
//! A getter is either a fixed environment or a deferred one computed from
//! captured state. Parents of lexical envs are getters so that an env can
//! name its parent before the parent exists (forward references during
//! unit population) or compute it per lookup.

use crate::env::LexicalEnv;
use crate::lang::Language;
use std::fmt;
use std::rc::Rc;

/// Callback behind a dynamic getter: captured state plus code, resolving
/// to an owned environment handle.
pub type DynGetter<L> = Rc<dyn Fn() -> LexicalEnv<L>>;

/// A handle that resolves, on demand, to an environment.
pub enum EnvGetter<L: Language> {
    /// Wraps a fixed environment and holds a share of it.
    Static(LexicalEnv<L>),
    /// Defers to a callback over opaque captured state.
    Dynamic(DynGetter<L>),
}

impl<L: Language> EnvGetter<L> {
    /// The getter that resolves to the empty environment. Used as "no
    /// parent".
    pub fn none() -> Self {
        EnvGetter::Static(LexicalEnv::empty())
    }

    /// Build a dynamic getter from a closure.
    pub fn dynamic(resolve: impl Fn() -> LexicalEnv<L> + 'static) -> Self {
        EnvGetter::Dynamic(Rc::new(resolve))
    }

    /// Resolve to an owned environment handle. Static getters hand out a
    /// fresh share; dynamic getters run their callback, which returns an
    /// owned handle itself.
    pub fn get_env(&self) -> LexicalEnv<L> {
        match self {
            EnvGetter::Static(env) => env.clone(),
            EnvGetter::Dynamic(resolve) => resolve(),
        }
    }

    /// Whether resolution can be answered without running client code.
    pub fn is_static(&self) -> bool {
        matches!(self, EnvGetter::Static(_))
    }

    /// Compare the resolved environment identity of two static getters.
    ///
    /// # Panics
    ///
    /// Panics if either operand is dynamic: deciding equivalence there
    /// would require running client code with observable side effects.
    pub fn is_equivalent(&self, other: &EnvGetter<L>) -> bool {
        match (self, other) {
            (EnvGetter::Static(a), EnvGetter::Static(b)) => a.ptr_eq(b),
            _ => panic!("EnvGetter::is_equivalent: dynamic getter operand"),
        }
    }
}

impl<L: Language> Clone for EnvGetter<L> {
    fn clone(&self) -> Self {
        match self {
            EnvGetter::Static(env) => EnvGetter::Static(env.clone()),
            EnvGetter::Dynamic(resolve) => EnvGetter::Dynamic(resolve.clone()),
        }
    }
}

impl<L: Language> fmt::Debug for EnvGetter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvGetter::Static(env) => write!(f, "<env-getter:static {:?}>", env),
            EnvGetter::Dynamic(_) => write!(f, "<env-getter:dynamic>"),
        }
    }
}
