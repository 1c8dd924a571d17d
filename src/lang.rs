//! Host-side parameterization of the engine.
//!
//! The engine does not know what a symbol, an AST node, or a metadata
//! value is; a generated frontend supplies all three through one trait
//! implemented on a marker type. Every engine type is generic over that
//! instantiation.

use std::fmt::Debug;
use std::hash::Hash;

/// The bundle of host-supplied types and hooks an engine instance runs on.
///
/// Implementations are expected to be zero-sized markers; the trait has no
/// methods taking `self`.
pub trait Language: 'static {
    /// Interned identifier key. Owned by the host's symbol table; the
    /// engine only copies and hashes it.
    type Symbol: Copy + Eq + Hash + Debug;

    /// Opaque handle to a client AST node. The engine never frees one.
    type Node: Copy + Eq + Debug;

    /// Small value-typed decoration attached to map entries and to whole
    /// environments.
    type Metadata: Clone + PartialEq + Debug;

    /// Identity element for [`combine_metadata`](Language::combine_metadata).
    fn empty_metadata() -> Self::Metadata;

    /// Combine two metadata values. Must be associative and treat
    /// [`empty_metadata`](Language::empty_metadata) as identity; the engine
    /// assumes both laws but only asserts the identity law in debug builds.
    fn combine_metadata(left: &Self::Metadata, right: &Self::Metadata) -> Self::Metadata;

    /// Reachability predicate between nodes: whether a declaration at
    /// `node` is visible from the point of use `from`. Lookup callers
    /// disable filtering by passing `from = None`.
    fn can_reach(node: Self::Node, from: Self::Node) -> bool;
}
