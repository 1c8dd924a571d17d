//! Name lookup over the env graph.
//!
//! One pass over: own entries of the (possibly rebound) env, filtered
//! references gated by reachability, transitive references, then the
//! parent chain. The concatenation order is a contract — semantic
//! analyses depend on it. Inward recursions (references) descend with
//! `recursive = false`, so only the parent walk re-enters the full
//! algorithm; that static discipline is what makes cyclic reference
//! graphs terminate without visited-set bookkeeping.

use super::{Bucket, LexicalEnv, ReferencedEnv};
use crate::entity::{Entity, EntityInfo};
use crate::error::EnvResult;
use crate::lang::Language;
use crate::rebindings::{EnvRebinding, EnvRebindings};

impl<L: Language> LexicalEnv<L> {
    /// Full recursive lookup of `key`, with no caller rebindings.
    ///
    /// `from` is the point of use: when set, filtered references whose
    /// origin it cannot reach are skipped and unreachable results are
    /// dropped. Pass `None` to disable visibility filtering.
    pub fn get(&self, key: L::Symbol, from: Option<L::Node>) -> EnvResult<Vec<Entity<L>>> {
        self.lookup(key, from, true, &EnvRebindings::empty())
    }

    /// First result of [`get`](LexicalEnv::get), if any.
    pub fn get_first(&self, key: L::Symbol, from: Option<L::Node>) -> EnvResult<Option<Entity<L>>> {
        Ok(self.get(key, from)?.into_iter().next())
    }

    /// Look up `key` in this env and the graph reachable from it.
    ///
    /// Results come in a fixed order: own entries (newest insertion
    /// first), filtered references, transitive references, parent chain.
    /// `rebindings` are the caller's, applied ahead of the env's own
    /// chain; the most recent rebinding targeting this env redirects its
    /// own entries. With `recursive = false` only own entries and
    /// transitive references are consulted.
    ///
    /// A resolver failure anywhere aborts the lookup; partial results are
    /// never returned.
    pub fn lookup(
        &self,
        key: L::Symbol,
        from: Option<L::Node>,
        recursive: bool,
        rebindings: &EnvRebindings<L>,
    ) -> EnvResult<Vec<Entity<L>>> {
        let Some(data) = self.data() else {
            return Ok(Vec::new());
        };
        tracing::trace!(?key, recursive, "lookup");

        // Caller rebindings first, then the env's own.
        let current = rebindings.combine(&data.rebindings);

        // The most recent rebinding of this env wins: pop it and take own
        // entries from its replacement.
        let (popped, lookup_env) = extract_rebinding(&current, self);

        let mut results: Vec<Entity<L>> = Vec::new();

        // Own entries, newest first, decorated with the env's default
        // metadata and the remaining rebindings.
        if let Some(lookup_data) = lookup_env.data() {
            if let Some(map) = lookup_data.map.as_ref() {
                // Copy the bucket out: an entity resolver may re-enter the
                // engine and mutate this same map.
                let bucket: Option<Bucket<L>> = map.borrow().get(&key).cloned();
                for entry in bucket.iter().flat_map(|b| b.iter()).rev() {
                    let entity = Entity {
                        node: entry.node,
                        info: EntityInfo {
                            metadata: L::combine_metadata(
                                &entry.metadata,
                                &lookup_data.default_metadata,
                            ),
                            rebindings: popped.clone(),
                        },
                    };
                    results.push(match entry.resolver.as_ref() {
                        Some(resolve) => resolve(&entity)?,
                        None => entity,
                    });
                }
            }
        }

        // Filtered references, gated by whether the lookup origin can
        // reach the reference origin.
        if recursive {
            let referenced: Vec<ReferencedEnv<L>> = data.referenced.borrow().clone();
            for reference in referenced {
                if let Some(from_node) = from {
                    if !L::can_reach(reference.from_node, from_node) {
                        continue;
                    }
                }
                let origin = Entity::bare(reference.from_node);
                let child = (reference.resolver)(&origin)?;
                results.extend(child.lookup(key, from, false, &popped)?);
            }
        }

        // Transitive references, never gated. A composition env with its
        // own default metadata (a group built with `group_with_md`)
        // decorates everything found through it; the combine is a no-op
        // for identity metadata.
        let transitive: Vec<LexicalEnv<L>> = data.transitive.borrow().clone();
        let fold_md = data.default_metadata != L::empty_metadata();
        for env in transitive {
            let found = env.lookup(key, from, false, &popped)?;
            if fold_md {
                results.extend(found.into_iter().map(|mut entity| {
                    entity.info.metadata =
                        L::combine_metadata(&entity.info.metadata, &data.default_metadata);
                    entity
                }));
            } else {
                results.extend(found);
            }
        }

        // Parent chain.
        if recursive {
            let parent = data.parent.get_env();
            results.extend(parent.lookup(key, from, true, &popped)?);
        }

        // Visibility filter over the concatenated results.
        if let Some(from_node) = from {
            results.retain(|entity| L::can_reach(entity.node, from_node));
        }

        Ok(results)
    }
}

/// Scan `chain` from most recent to oldest for a rebinding whose old side
/// is `env`. On a match, return the chain with that one slot removed and
/// the resolved replacement env; otherwise the chain and `env` unchanged.
fn extract_rebinding<L: Language>(
    chain: &EnvRebindings<L>,
    env: &LexicalEnv<L>,
) -> (EnvRebindings<L>, LexicalEnv<L>) {
    let bindings = chain.bindings();
    for index in (0..bindings.len()).rev() {
        let old = bindings[index].old_env.get_env();
        if old.ptr_eq(env) {
            let mut rest: Vec<EnvRebinding<L>> = Vec::with_capacity(bindings.len() - 1);
            rest.extend(bindings[..index].iter().cloned());
            rest.extend(bindings[index + 1..].iter().cloned());
            return (
                EnvRebindings::create(rest),
                bindings[index].new_env.get_env(),
            );
        }
    }
    (chain.clone(), env.clone())
}
