// Property tests for lookup ordering and filtering invariants.
//
// Lookup results are an observable contract: insertion history determines
// order, and visibility filtering may only ever drop results, stably.

use crate::common::{nodes, root, Env, Md, NodeId};
use crate::property::strategies::{arb_inserts, arb_key, arb_node};
use lexenv::LexicalEnv;
use proptest::prelude::*;

fn build(inserts: &[(&'static str, NodeId, Md)]) -> Env {
    let env = root();
    for (key, node, md) in inserts {
        env.add_with(*key, *node, *md, None);
    }
    env
}

/// Whether `needle` appears in `haystack` in order (not necessarily
/// contiguously).
fn is_subsequence(needle: &[NodeId], haystack: &[NodeId]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|n| rest.any(|h| h == n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn adding_never_removes_results(
        inserts in arb_inserts(),
        key in arb_key(),
        node in arb_node(),
    ) {
        let env = build(&inserts);
        let before = nodes(&env.get(key, None).unwrap());

        env.add(key, node);
        let after = nodes(&env.get(key, None).unwrap());

        prop_assert_eq!(after[0], node, "newest entry must come first");
        prop_assert_eq!(&after[1..], &before[..], "older results must survive unchanged");
    }

    #[test]
    fn filtered_results_are_a_stable_subset(
        inserts in arb_inserts(),
        key in arb_key(),
        from in arb_node(),
    ) {
        let env = build(&inserts);
        let all = nodes(&env.get(key, None).unwrap());
        let filtered = nodes(&env.get(key, Some(from)).unwrap());

        prop_assert!(
            is_subsequence(&filtered, &all),
            "filtering must preserve order: {:?} vs {:?}",
            filtered,
            all
        );
        for node in &filtered {
            prop_assert!(node.0 <= from.0, "unreachable node {:?} survived", node);
        }
    }

    #[test]
    fn constant_true_reachability_filters_nothing(
        inserts in arb_inserts(),
        key in arb_key(),
    ) {
        let env = build(&inserts);
        let all = nodes(&env.get(key, None).unwrap());
        // Every generated node is below 100, so origin 100 reaches all.
        let filtered = nodes(&env.get(key, Some(NodeId(100))).unwrap());
        prop_assert_eq!(filtered, all);
    }

    #[test]
    fn lookups_are_deterministic(inserts in arb_inserts(), key in arb_key()) {
        let first = build(&inserts);
        let second = build(&inserts);

        let a = nodes(&first.get(key, None).unwrap());
        let b = nodes(&second.get(key, None).unwrap());
        prop_assert_eq!(&a, &b, "same insertion history produced different results");

        let again = nodes(&first.get(key, None).unwrap());
        prop_assert_eq!(a, again, "repeated lookup produced different results");
    }

    #[test]
    fn empty_env_stays_empty(key in arb_key(), node in arb_node()) {
        let env = Env::empty();
        env.add(key, node);
        prop_assert!(env.get(key, None).unwrap().is_empty());
    }

    #[test]
    fn group_of_one_behaves_as_the_env(
        inserts in arb_inserts(),
        key in arb_key(),
        from in proptest::option::of(arb_node()),
    ) {
        let env = build(&inserts);
        let group = LexicalEnv::group(std::slice::from_ref(&env));
        prop_assert_eq!(
            nodes(&group.get(key, from).unwrap()),
            nodes(&env.get(key, from).unwrap())
        );
    }

    #[test]
    fn parent_results_always_trail_own_results(
        parent_inserts in arb_inserts(),
        child_inserts in arb_inserts(),
        key in arb_key(),
    ) {
        let parent = build(&parent_inserts);
        let child = crate::common::child_of(&parent);
        for (k, node, md) in &child_inserts {
            child.add_with(*k, *node, *md, None);
        }

        let own = nodes(&child.lookup(key, None, false, &lexenv::EnvRebindings::empty()).unwrap());
        let inherited = nodes(&parent.get(key, None).unwrap());
        let full = nodes(&child.get(key, None).unwrap());

        let expected: Vec<NodeId> = own.iter().chain(inherited.iter()).copied().collect();
        prop_assert_eq!(full, expected, "own entries must precede the parent's");
    }
}
