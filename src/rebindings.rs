//! Rebinding chains: ordered `(old env → new env)` substitutions.
//!
//! During generic instantiation a lookup must pretend one environment is
//! another. Rebindings record that substitution as an immutable, shared
//! chain; lookup consults the chain from most recent to oldest, so a later
//! rebinding of the same env shadows an earlier one.

use crate::getter::EnvGetter;
use crate::lang::Language;
use std::fmt;
use std::rc::Rc;

/// One substitution directive: during lookup, `old_env` is looked up as
/// `new_env`.
pub struct EnvRebinding<L: Language> {
    pub old_env: EnvGetter<L>,
    pub new_env: EnvGetter<L>,
}

impl<L: Language> EnvRebinding<L> {
    pub fn new(old_env: EnvGetter<L>, new_env: EnvGetter<L>) -> Self {
        EnvRebinding { old_env, new_env }
    }

    /// The identity rebinding: both sides empty. Appending it to a chain
    /// is a no-op.
    pub fn none() -> Self {
        EnvRebinding {
            old_env: EnvGetter::none(),
            new_env: EnvGetter::none(),
        }
    }

    /// Whether this is the identity rebinding.
    pub fn is_none(&self) -> bool {
        match (&self.old_env, &self.new_env) {
            (EnvGetter::Static(old), EnvGetter::Static(new)) => {
                old.is_empty() && new.is_empty()
            }
            _ => false,
        }
    }

    /// Pair-wise getter equivalence.
    ///
    /// # Panics
    ///
    /// Panics if any of the four getters involved is dynamic (see
    /// [`EnvGetter::is_equivalent`]).
    pub fn is_equivalent(&self, other: &EnvRebinding<L>) -> bool {
        self.old_env.is_equivalent(&other.old_env) && self.new_env.is_equivalent(&other.new_env)
    }
}

impl<L: Language> Clone for EnvRebinding<L> {
    fn clone(&self) -> Self {
        EnvRebinding {
            old_env: self.old_env.clone(),
            new_env: self.new_env.clone(),
        }
    }
}

impl<L: Language> fmt::Debug for EnvRebinding<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?} -> {:?})", self.old_env, self.new_env)
    }
}

/// An immutable, shared chain of rebindings. The empty chain allocates
/// nothing; non-empty chains are reference-counted and never mutated after
/// construction — every operation below builds a new chain or hands out a
/// fresh share of an existing one.
pub struct EnvRebindings<L: Language>(Option<Rc<[EnvRebinding<L>]>>);

impl<L: Language> EnvRebindings<L> {
    /// The empty chain.
    pub fn empty() -> Self {
        EnvRebindings(None)
    }

    /// Build a chain from a sequence of rebindings. An empty sequence
    /// yields the empty chain.
    pub fn create(bindings: Vec<EnvRebinding<L>>) -> Self {
        if bindings.is_empty() {
            EnvRebindings(None)
        } else {
            EnvRebindings(Some(bindings.into()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |b| b.len())
    }

    /// The chain's rebindings, oldest first. Empty slice for the empty
    /// chain.
    pub fn bindings(&self) -> &[EnvRebinding<L>] {
        self.0.as_deref().unwrap_or(&[])
    }

    /// A new chain with `binding` appended. Appending the identity
    /// rebinding hands back a share of `self` unchanged.
    pub fn append(&self, binding: EnvRebinding<L>) -> Self {
        if binding.is_none() {
            return self.clone();
        }
        let mut bindings: Vec<EnvRebinding<L>> = self.bindings().to_vec();
        bindings.push(binding);
        EnvRebindings(Some(bindings.into()))
    }

    /// Concatenate two chains, `self`'s entries first. When either side is
    /// empty the other side is shared rather than copied.
    pub fn combine(&self, other: &EnvRebindings<L>) -> Self {
        match (&self.0, &other.0) {
            (None, None) => EnvRebindings(None),
            (None, Some(_)) => other.clone(),
            (Some(_), None) => self.clone(),
            (Some(left), Some(right)) => {
                let mut bindings: Vec<EnvRebinding<L>> = Vec::with_capacity(left.len() + right.len());
                bindings.extend(left.iter().cloned());
                bindings.extend(right.iter().cloned());
                EnvRebindings(Some(bindings.into()))
            }
        }
    }

    /// Structural equivalence: equal length and slot-wise equivalent
    /// rebindings. Two empty chains are equivalent.
    ///
    /// # Panics
    ///
    /// Panics if a compared slot holds a dynamic getter.
    pub fn is_equivalent(&self, other: &EnvRebindings<L>) -> bool {
        self.len() == other.len()
            && self
                .bindings()
                .iter()
                .zip(other.bindings())
                .all(|(a, b)| a.is_equivalent(b))
    }
}

impl<L: Language> Clone for EnvRebindings<L> {
    fn clone(&self) -> Self {
        EnvRebindings(self.0.clone())
    }
}

impl<L: Language> fmt::Debug for EnvRebindings<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<rebindings:{}>", self.len())
    }
}
