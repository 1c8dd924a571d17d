// DEFENSE: reachability gates both reference traversal and final results
use crate::common::{nodes, root, NodeId, TestLang};
use lexenv::{Entity, EnvResult, LexicalEnv};
use std::rc::Rc;

/// A filtered reference from `from_node` resolving to a fixed env.
fn reference_to(env: &crate::common::Env, origin: NodeId, target: &crate::common::Env) {
    let weak = target.downgrade();
    env.reference(
        origin,
        Rc::new(move |_: &Entity<TestLang>| -> EnvResult<LexicalEnv<TestLang>> {
            Ok(weak.upgrade().unwrap_or_else(LexicalEnv::empty))
        }),
    );
}

#[test]
fn test_reference_gated_by_reachability() {
    // Declarations: node 1 in the env itself, node 2 in a referenced env
    // whose reference originates at node 5.
    let env = root();
    env.add("z", NodeId(1));
    let referenced = root();
    referenced.add("z", NodeId(2));
    reference_to(&env, NodeId(5), &referenced);

    // From node 3 the reference origin (5) is not reachable: own entry only.
    let gated = env.get("z", Some(NodeId(3))).unwrap();
    assert_eq!(nodes(&gated), vec![NodeId(1)]);

    // From node 6 it is: own entry first, then the referenced env's.
    let open = env.get("z", Some(NodeId(6))).unwrap();
    assert_eq!(nodes(&open), vec![NodeId(1), NodeId(2)]);

    // No origin disables filtering entirely.
    let all = env.get("z", None).unwrap();
    assert_eq!(nodes(&all), vec![NodeId(1), NodeId(2)]);
}

#[test]
fn test_final_filter_drops_unreachable_own_entries() {
    let env = root();
    env.add("x", NodeId(1));
    env.add("x", NodeId(9));

    let visible = env.get("x", Some(NodeId(5))).unwrap();
    assert_eq!(nodes(&visible), vec![NodeId(1)]);
}

#[test]
fn test_references_resolved_lazily() {
    use std::cell::Cell;

    let env = root();
    env.add("a", NodeId(1));
    let referenced = root();
    let hits = Rc::new(Cell::new(0u32));
    let counter = hits.clone();
    let weak = referenced.downgrade();
    env.reference(
        NodeId(2),
        Rc::new(move |_: &Entity<TestLang>| {
            counter.set(counter.get() + 1);
            Ok(weak.upgrade().unwrap_or_else(LexicalEnv::empty))
        }),
    );

    assert_eq!(hits.get(), 0);
    env.get("a", None).unwrap();
    assert_eq!(hits.get(), 1);

    // Non-recursive lookups never consult filtered references.
    env.lookup("a", None, false, &lexenv::EnvRebindings::empty())
        .unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_referenced_env_is_not_kept_alive() {
    let env = root();
    let referenced = root();
    referenced.add("gone", NodeId(1));
    reference_to(&env, NodeId(0), &referenced);

    assert_eq!(nodes(&env.get("gone", None).unwrap()), vec![NodeId(1)]);

    // Dropping the last strong handle destroys the referenced env even
    // though a reference to it is still installed.
    drop(referenced);
    assert!(env.get("gone", None).unwrap().is_empty());
}

#[derive(Debug)]
struct Unresolvable;

impl std::fmt::Display for Unresolvable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unresolvable reference")
    }
}

impl std::error::Error for Unresolvable {}

#[test]
fn test_reference_resolver_failure_propagates() {
    let env = root();
    env.add("x", NodeId(1));
    env.reference(
        NodeId(0),
        Rc::new(|_: &Entity<TestLang>| Err(lexenv::EnvError::resolver(Unresolvable))),
    );

    assert!(env.get("x", None).is_err());
}
