//! # lexenv — lexical environments for generated language frontends
//!
//! `lexenv` is the name-resolution runtime a generated frontend hangs its
//! semantic analysis on. Parsed programs expose *lexical environments*
//! mapping symbols to declarations; lookup walks a graph of parent links,
//! filtered and transitive references, and *rebindings* that re-target one
//! env to another during generic instantiation — in a deterministic order,
//! honoring caller-supplied reachability, and safely under sharing.
//!
//! The engine is parameterized by one [`Language`] implementation
//! supplying the host's symbol, node, and metadata types.
//!
//! ## Quick start
//!
//! ```
//! use lexenv::{EnvGetter, EnvKind, Language, LexicalEnv, Symbol, SymbolTable};
//!
//! // A minimal host: symbols from the bundled interner, nodes as plain
//! // ids, no metadata.
//! struct Toy;
//!
//! impl Language for Toy {
//!     type Symbol = Symbol;
//!     type Node = u32;
//!     type Metadata = ();
//!
//!     fn empty_metadata() -> Self::Metadata {}
//!     fn combine_metadata(_: &Self::Metadata, _: &Self::Metadata) -> Self::Metadata {}
//!     fn can_reach(_node: u32, _from: u32) -> bool {
//!         true
//!     }
//! }
//!
//! let mut symbols = SymbolTable::new();
//! let x = symbols.intern("x");
//!
//! let globals: LexicalEnv<Toy> = LexicalEnv::new(EnvGetter::none(), None, EnvKind::Primary, ());
//! globals.add(x, 1);
//!
//! let scope = LexicalEnv::new(EnvGetter::Static(globals.clone()), None, EnvKind::Primary, ());
//! scope.add(x, 2);
//!
//! // Innermost declaration first, then the parent's.
//! let hits = scope.get(x, None).unwrap();
//! let nodes: Vec<u32> = hits.iter().map(|e| e.node).collect();
//! assert_eq!(nodes, vec![2, 1]);
//! ```
//!
//! ## Ownership
//!
//! Env handles are cheap clones of shared payloads; the last handle
//! dropped destroys the env. Primary envs belong to analysis units;
//! derived envs ([`LexicalEnv::orphan`], [`LexicalEnv::group`],
//! [`LexicalEnv::rebind`]) live as long as someone holds them. The engine
//! is single-threaded by construction.

pub mod entity;
pub mod env;
pub mod error;
pub mod getter;
pub mod lang;
pub mod rebindings;
pub mod symbols;

pub use entity::{Entity, EntityInfo};
pub use env::{EntityResolver, EnvKind, EnvResolver, LexicalEnv, WeakEnv};
pub use error::{EnvError, EnvResult};
pub use getter::{DynGetter, EnvGetter};
pub use lang::Language;
pub use rebindings::{EnvRebinding, EnvRebindings};
pub use symbols::{Symbol, SymbolTable};
