use kindred::{RestError, RouteMeta, RouteTable, SharedFactory, Verb, testing::StaticFactory};
use proptest::prelude::*;
use std::sync::Arc;

mod common;
use common::{Store, change_table};

fn verb() -> impl Strategy<Value = Verb> {
    prop::sample::select(Verb::ALL.to_vec())
}

/// Segments drawn mostly from words the change table knows, so generated
/// paths reach deep into it.
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec![
            "changes", "accounts", "revisions", "files", "reviewers", "votes",
            "commit", "content", "topic", "edit", "abandon", "delete",
        ])
        .prop_map(str::to_owned),
        2 => "[a-z0-9]{1,6}",
        1 => "[a-z]{1,4}~[a-z]{1,4}",
    ]
}

proptest! {
    /// Resolution never panics, and every chain it returns follows parent
    /// links from a root kind.
    #[test]
    fn resolved_chains_follow_the_forest(
        verb in verb(),
        segments in prop::collection::vec(segment(), 0..10),
    ) {
        let (table, _) = change_table(Store::with_changes(&[]));
        if let Ok(res) = table.resolve(verb, &segments) {
            let forest = table.forest();
            let kinds: Vec<_> = res.chain.kinds().collect();
            prop_assert!(kinds.len() <= segments.len());
            if let Some(first) = kinds.first() {
                prop_assert!(forest.is_root(*first));
            }
            for pair in kinds.windows(2) {
                prop_assert_eq!(forest.parent(pair[1]), Some(pair[0]));
            }
            if let Some(route) = res.route() {
                prop_assert_eq!(route.verb(), verb);
            }
        }
    }

    /// The last binding of a (verb, action) pair is the one that resolves.
    #[test]
    fn latest_binding_resolves(
        binds in prop::collection::vec(
            (verb(), prop::sample::select(vec!["", "topic", "hashtags"])),
            1..20,
        ),
    ) {
        let mut builder = RouteTable::builder();
        let change = builder.declare_kind("change", None).unwrap();
        builder.mount("changes", change).unwrap();

        let mut last: Vec<((Verb, &str), SharedFactory)> = Vec::new();
        for (verb, action) in &binds {
            let factory: SharedFactory = Arc::new(StaticFactory::empty());
            builder
                .bind_shared(change, *verb, action, factory.clone(), RouteMeta::new())
                .unwrap();
            last.retain(|(key, _)| *key != (*verb, *action));
            last.push(((*verb, *action), factory));
        }
        let table = builder.build();
        prop_assert_eq!(table.len(), last.len());

        for ((verb, action), factory) in &last {
            let mut segments = vec!["changes", "1"];
            if !action.is_empty() {
                segments.push(*action);
            }
            let res = table.resolve(*verb, &segments).unwrap();
            prop_assert!(Arc::ptr_eq(res.route().unwrap().factory(), factory));
        }
    }

    /// An endpoint answers 405 for an unbound verb exactly when some other
    /// verb is bound there, and 404 otherwise.
    #[test]
    fn method_not_allowed_iff_endpoint_bound(
        bound in prop::sample::subsequence(Verb::ALL.to_vec(), 0..=4),
        probe in verb(),
    ) {
        let mut builder = RouteTable::builder();
        let change = builder.declare_kind("change", None).unwrap();
        builder.mount("changes", change).unwrap();
        builder.bind(change, Verb::Get, "", StaticFactory::empty()).unwrap();
        for verb in &bound {
            builder.bind(change, *verb, "submit", StaticFactory::empty()).unwrap();
        }
        let table = builder.build();

        let result = table.resolve(probe, &["changes", "1", "submit"]);
        match result {
            Ok(res) => prop_assert!(bound.contains(&res.route().unwrap().verb())),
            Err(RestError::MethodNotAllowed { verb, .. }) => {
                prop_assert!(!bound.is_empty());
                prop_assert!(!bound.contains(&verb));
            }
            Err(RestError::NoSuchRoute(_)) => prop_assert!(bound.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
