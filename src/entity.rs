//! Lookup results.
//!
//! A lookup hit is not a bare node: it carries the metadata accumulated on
//! the way to the entry and the rebindings that were in effect when the
//! entry was found. `(node, info)` pairs are what semantic analyses consume.

use crate::lang::Language;
use crate::rebindings::EnvRebindings;
use std::fmt;

/// Decoration carried by every lookup result.
pub struct EntityInfo<L: Language> {
    /// Entry metadata combined with the default metadata of the env the
    /// entry was found in.
    pub metadata: L::Metadata,
    /// Rebindings in effect at the point the entry was found.
    pub rebindings: EnvRebindings<L>,
}

impl<L: Language> EntityInfo<L> {
    /// The identity decoration: empty metadata, empty rebindings chain.
    pub fn identity() -> Self {
        EntityInfo {
            metadata: L::empty_metadata(),
            rebindings: EnvRebindings::empty(),
        }
    }

    /// Whether this is the identity decoration.
    pub fn is_identity(&self) -> bool {
        self.metadata == L::empty_metadata() && self.rebindings.is_empty()
    }
}

impl<L: Language> Clone for EntityInfo<L> {
    fn clone(&self) -> Self {
        EntityInfo {
            metadata: self.metadata.clone(),
            rebindings: self.rebindings.clone(),
        }
    }
}

impl<L: Language> fmt::Debug for EntityInfo<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInfo")
            .field("metadata", &self.metadata)
            .field("rebindings", &self.rebindings)
            .finish()
    }
}

/// A decorated lookup result: a client node plus its [`EntityInfo`].
pub struct Entity<L: Language> {
    pub node: L::Node,
    pub info: EntityInfo<L>,
}

impl<L: Language> Entity<L> {
    /// An entity with identity decoration.
    pub fn bare(node: L::Node) -> Self {
        Entity {
            node,
            info: EntityInfo::identity(),
        }
    }
}

impl<L: Language> Clone for Entity<L> {
    fn clone(&self) -> Self {
        Entity {
            node: self.node,
            info: self.info.clone(),
        }
    }
}

impl<L: Language> fmt::Debug for Entity<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("node", &self.node)
            .field("info", &self.info)
            .finish()
    }
}
