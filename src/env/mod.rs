//! Lexical environments: construction, mutation, and derived forms.
//!
//! An environment maps symbols to declarations and composes with the rest
//! of the env graph through a parent getter, filtered and transitive
//! references, and an attached rebindings chain. Two ownership regimes
//! share one representation: *primary* envs belong to an analysis unit and
//! allocate their internal map; *derived* envs (orphans, groups, rebound
//! envs) share a primary's map or carry none.
//!
//! Handles are cheap clones of a shared payload; the last handle dropped
//! destroys the env. The lookup algorithm lives in [`lookup`](self) — see
//! [`LexicalEnv::get`].

mod lookup;

use crate::entity::Entity;
use crate::error::EnvResult;
use crate::getter::EnvGetter;
use crate::lang::Language;
use crate::rebindings::EnvRebindings;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

// ---------------------------------------------------------------------------
// Resolver callbacks
// ---------------------------------------------------------------------------

/// Per-entry hook invoked during lookup; its return value replaces the
/// preliminary entity. May re-enter the engine.
pub type EntityResolver<L> = Rc<dyn Fn(&Entity<L>) -> EnvResult<Entity<L>>>;

/// Lazy resolver from a reference origin to its environment, invoked with
/// `(origin node, identity info)` during lookup.
pub type EnvResolver<L> = Rc<dyn Fn(&Entity<L>) -> EnvResult<LexicalEnv<L>>>;

// ---------------------------------------------------------------------------
// Internal representation
// ---------------------------------------------------------------------------

/// Ownership regime of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    /// Owned by an analysis unit, which controls its lifetime.
    Primary,
    /// Produced by [`LexicalEnv::orphan`], [`LexicalEnv::group`] or
    /// [`LexicalEnv::rebind`]; lives as long as some handle does.
    Derived,
}

/// A raw entry in the internal map.
pub(crate) struct MapEntry<L: Language> {
    pub(crate) node: L::Node,
    pub(crate) metadata: L::Metadata,
    pub(crate) resolver: Option<EntityResolver<L>>,
}

impl<L: Language> Clone for MapEntry<L> {
    fn clone(&self) -> Self {
        MapEntry {
            node: self.node,
            metadata: self.metadata.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

/// Entries for one symbol, in insertion order. Lookup reverses the bucket
/// so the newest entry wins.
pub(crate) type Bucket<L> = SmallVec<[MapEntry<L>; 2]>;

pub(crate) type EnvMap<L> = FxHashMap<<L as Language>::Symbol, Bucket<L>>;

/// A filtered reference: consulted during lookup only when the lookup
/// origin can reach `from_node`.
pub(crate) struct ReferencedEnv<L: Language> {
    pub(crate) from_node: L::Node,
    pub(crate) resolver: EnvResolver<L>,
}

impl<L: Language> Clone for ReferencedEnv<L> {
    fn clone(&self) -> Self {
        ReferencedEnv {
            from_node: self.from_node,
            resolver: self.resolver.clone(),
        }
    }
}

pub(crate) struct EnvData<L: Language> {
    pub(crate) parent: EnvGetter<L>,
    pub(crate) node: Option<L::Node>,
    pub(crate) kind: EnvKind,
    /// `None` for groups and rebound envs. Orphans alias their source's
    /// map; only primary envs (and envs built directly with
    /// [`LexicalEnv::new`]) allocate a fresh one.
    pub(crate) map: Option<Rc<RefCell<EnvMap<L>>>>,
    pub(crate) referenced: RefCell<Vec<ReferencedEnv<L>>>,
    pub(crate) transitive: RefCell<Vec<LexicalEnv<L>>>,
    pub(crate) default_metadata: L::Metadata,
    pub(crate) rebindings: EnvRebindings<L>,
}

impl<L: Language> Drop for EnvData<L> {
    fn drop(&mut self) {
        tracing::trace!(kind = ?self.kind, "destroying lexical env");
    }
}

// ---------------------------------------------------------------------------
// LexicalEnv / WeakEnv handles
// ---------------------------------------------------------------------------

/// Handle to a lexical environment.
///
/// The distinguished empty environment is a handle value
/// ([`LexicalEnv::empty`]): allocation-free, inert under mutation, and
/// empty under every lookup. Cloning any handle acquires a share of the
/// env; dropping the last share destroys it (releasing transitive
/// references, the rebindings chain, and the parent getter with it).
pub struct LexicalEnv<L: Language>(Option<Rc<EnvData<L>>>);

impl<L: Language> LexicalEnv<L> {
    /// The distinguished empty environment.
    pub fn empty() -> Self {
        LexicalEnv(None)
    }

    /// Create a fresh environment with an empty internal map.
    ///
    /// `parent` is resolved lazily at lookup time; `node` is the client
    /// node the env is attached to, if any.
    pub fn new(
        parent: EnvGetter<L>,
        node: Option<L::Node>,
        kind: EnvKind,
        default_metadata: L::Metadata,
    ) -> Self {
        debug_assert!(
            L::combine_metadata(&L::empty_metadata(), &default_metadata) == default_metadata,
            "combine_metadata must treat empty_metadata as its identity"
        );
        tracing::trace!(?kind, ?node, "creating lexical env");
        LexicalEnv(Some(Rc::new(EnvData {
            parent,
            node,
            kind,
            map: Some(Rc::new(RefCell::new(EnvMap::<L>::default()))),
            referenced: RefCell::new(Vec::new()),
            transitive: RefCell::new(Vec::new()),
            default_metadata,
            rebindings: EnvRebindings::empty(),
        })))
    }

    /// Whether this handle is the distinguished empty environment.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Whether this is a primary (unit-owned) environment. False for the
    /// empty environment.
    pub fn is_primary(&self) -> bool {
        self.data().is_some_and(|d| d.kind == EnvKind::Primary)
    }

    /// The client node this env is attached to.
    pub fn node(&self) -> Option<L::Node> {
        self.data().and_then(|d| d.node)
    }

    /// The rebindings chain attached to this env (empty for the empty
    /// environment).
    pub fn rebindings(&self) -> EnvRebindings<L> {
        self.data()
            .map_or_else(EnvRebindings::empty, |d| d.rebindings.clone())
    }

    /// Identity comparison. All empty handles are the same environment.
    pub fn ptr_eq(&self, other: &LexicalEnv<L>) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Create a non-owning handle. Upgrading it fails once the env has
    /// been destroyed, so hosts can hold references across unit reparses
    /// without dangling.
    pub fn downgrade(&self) -> WeakEnv<L> {
        WeakEnv(self.0.as_ref().map(Rc::downgrade))
    }

    pub(crate) fn data(&self) -> Option<&EnvData<L>> {
        self.0.as_deref()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert an entry for `key` with identity metadata and no resolver.
    /// No-op on the empty environment.
    pub fn add(&self, key: L::Symbol, node: L::Node) {
        self.add_with(key, node, L::empty_metadata(), None);
    }

    /// Insert an entry for `key`. Entries in a bucket keep insertion
    /// order; lookup returns the newest first. No-op on the empty
    /// environment.
    ///
    /// # Panics
    ///
    /// Panics on a derived env with no internal map (a group or a rebound
    /// env).
    pub fn add_with(
        &self,
        key: L::Symbol,
        node: L::Node,
        metadata: L::Metadata,
        resolver: Option<EntityResolver<L>>,
    ) {
        let Some(data) = self.data() else { return };
        let map = data
            .map
            .as_ref()
            .expect("LexicalEnv::add: env has no internal map");
        map.borrow_mut().entry(key).or_default().push(MapEntry {
            node,
            metadata,
            resolver,
        });
    }

    /// Remove the first entry under `key` whose node equals `node`.
    /// Remaining entries keep their order; no-op if the entry is absent
    /// or the env is empty.
    pub fn remove(&self, key: L::Symbol, node: L::Node) {
        let Some(data) = self.data() else { return };
        let Some(map) = data.map.as_ref() else { return };
        let mut map = map.borrow_mut();
        if let Some(bucket) = map.get_mut(&key) {
            if let Some(pos) = bucket.iter().position(|e| e.node == node) {
                bucket.remove(pos);
            }
        }
    }

    /// Append a filtered reference resolved lazily during lookup. The
    /// referenced env is consulted only when the lookup origin can reach
    /// `from_node`, and is not kept alive by this env.
    ///
    /// The engine never owns `from_node`; if the host destroys that node
    /// while this env lives, it must keep `can_reach` well-defined for it.
    pub fn reference(&self, from_node: L::Node, resolver: EnvResolver<L>) {
        let Some(data) = self.data() else { return };
        data.referenced.borrow_mut().push(ReferencedEnv {
            from_node,
            resolver,
        });
    }

    /// Append a transitive reference: always consulted during lookup, and
    /// kept alive by this env.
    ///
    /// # Panics
    ///
    /// Panics on a primary env (unit-owned envs must not take ownership
    /// shares) and on the empty environment.
    pub fn transitive_reference(&self, target: &LexicalEnv<L>) {
        let data = self
            .data()
            .expect("LexicalEnv::transitive_reference: empty env");
        assert!(
            data.kind != EnvKind::Primary,
            "LexicalEnv::transitive_reference: primary env"
        );
        data.transitive.borrow_mut().push(target.clone());
    }

    // -----------------------------------------------------------------------
    // Derived environments
    // -----------------------------------------------------------------------

    /// A parentless copy of this env: same (shared) internal map, same
    /// references, same rebindings. Lookups through an orphan never climb
    /// the original's parent chain. The orphan shares the source's map,
    /// not its lifetime — it does not keep the source env alive.
    pub fn orphan(&self) -> LexicalEnv<L> {
        let Some(data) = self.data() else {
            return LexicalEnv::empty();
        };
        LexicalEnv(Some(Rc::new(EnvData {
            parent: EnvGetter::none(),
            node: data.node,
            kind: EnvKind::Derived,
            map: data.map.clone(),
            referenced: RefCell::new(data.referenced.borrow().clone()),
            transitive: RefCell::new(data.transitive.borrow().clone()),
            default_metadata: data.default_metadata.clone(),
            rebindings: data.rebindings.clone(),
        })))
    }

    /// Compose several envs into one: lookups consult each input in
    /// order. No inputs yields the empty env; a single input is returned
    /// as-is.
    pub fn group(envs: &[LexicalEnv<L>]) -> LexicalEnv<L> {
        Self::group_with_md(envs, L::empty_metadata())
    }

    /// [`group`](LexicalEnv::group) with a default metadata applied to
    /// every result found through the group. The single-input
    /// short-circuit only applies when `default_metadata` is the
    /// identity.
    pub fn group_with_md(envs: &[LexicalEnv<L>], default_metadata: L::Metadata) -> LexicalEnv<L> {
        match envs {
            [] => LexicalEnv::empty(),
            [single] if default_metadata == L::empty_metadata() => single.clone(),
            _ => {
                let group = LexicalEnv(Some(Rc::new(EnvData {
                    parent: EnvGetter::none(),
                    node: None,
                    kind: EnvKind::Derived,
                    map: None,
                    referenced: RefCell::new(Vec::new()),
                    transitive: RefCell::new(Vec::new()),
                    default_metadata,
                    rebindings: EnvRebindings::empty(),
                })));
                for env in envs {
                    group.transitive_reference(env);
                }
                group
            }
        }
    }

    /// An env that looks up like this one but with `(to_rebind →
    /// rebind_to)` appended to the rebindings in effect.
    pub fn rebind(&self, to_rebind: EnvGetter<L>, rebind_to: EnvGetter<L>) -> LexicalEnv<L> {
        use crate::rebindings::EnvRebinding;
        let rebindings = self
            .rebindings()
            .append(EnvRebinding::new(to_rebind, rebind_to));
        self.rebound_with(rebindings)
    }

    /// An env that looks up like this one under `info`'s rebindings.
    /// Hands back a share of `self` when `info` is the identity.
    pub fn rebind_with_info(&self, info: &crate::entity::EntityInfo<L>) -> LexicalEnv<L> {
        if info.is_identity() {
            return self.clone();
        }
        let rebindings = self.rebindings().combine(&info.rebindings);
        self.rebound_with(rebindings)
    }

    /// A contentless derived env carrying `rebindings` and transitively
    /// referencing `self`.
    fn rebound_with(&self, rebindings: EnvRebindings<L>) -> LexicalEnv<L> {
        let rebound = LexicalEnv(Some(Rc::new(EnvData {
            parent: EnvGetter::none(),
            node: None,
            kind: EnvKind::Derived,
            map: None,
            referenced: RefCell::new(Vec::new()),
            transitive: RefCell::new(Vec::new()),
            default_metadata: L::empty_metadata(),
            rebindings,
        })));
        rebound.transitive_reference(self);
        rebound
    }
}

impl<L: Language> Clone for LexicalEnv<L> {
    fn clone(&self) -> Self {
        LexicalEnv(self.0.clone())
    }
}

impl<L: Language> fmt::Debug for LexicalEnv<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(data) = self.data() else {
            return write!(f, "<lexical-env:empty>");
        };
        let kind = match data.kind {
            EnvKind::Primary => "primary",
            EnvKind::Derived => "derived",
        };
        // try_borrow: Debug must not panic when called mid-mutation.
        let entries = data
            .map
            .as_ref()
            .and_then(|m| m.try_borrow().ok().map(|m| m.values().map(|b| b.len()).sum::<usize>()));
        match entries {
            Some(n) => write!(
                f,
                "<lexical-env:{} entries={} refs={} trans={}>",
                kind,
                n,
                data.referenced.borrow().len(),
                data.transitive.borrow().len()
            ),
            None => write!(
                f,
                "<lexical-env:{} refs={} trans={}>",
                kind,
                data.referenced.borrow().len(),
                data.transitive.borrow().len()
            ),
        }
    }
}

/// A non-owning handle to a lexical environment, used to observe env
/// lifetimes without extending them.
pub struct WeakEnv<L: Language>(Option<Weak<EnvData<L>>>);

impl<L: Language> WeakEnv<L> {
    /// Attempt to upgrade to a strong handle. Returns `None` once the env
    /// has been destroyed. A weak handle to the empty environment always
    /// upgrades (the empty env is never destroyed).
    pub fn upgrade(&self) -> Option<LexicalEnv<L>> {
        match &self.0 {
            None => Some(LexicalEnv::empty()),
            Some(weak) => weak.upgrade().map(|rc| LexicalEnv(Some(rc))),
        }
    }
}

impl<L: Language> Clone for WeakEnv<L> {
    fn clone(&self) -> Self {
        WeakEnv(self.0.clone())
    }
}

impl<L: Language> fmt::Debug for WeakEnv<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<weak-lexical-env>")
    }
}
