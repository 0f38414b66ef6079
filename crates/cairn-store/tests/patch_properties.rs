//! Property tests for the semantic-update patch path.

use cairn_core::{Patch, RepresentationPreferences, Term, Triple};
use cairn_store::patch::ntriples;
use cairn_store::{InMemoryStore, PatchingStore, ResourceStore, SemanticUpdatePatcher};
use cairn_test::fixtures;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn store() -> Arc<dyn ResourceStore> {
    let memory: Arc<dyn ResourceStore> = Arc::new(InMemoryStore::new(fixtures::strategy()));
    Arc::new(PatchingStore::new(memory, Arc::new(SemanticUpdatePatcher)))
}

fn triple_strategy() -> impl Strategy<Value = Triple> {
    ("[a-c]", "[p-r]", "[x-z][0-9]").prop_map(|(s, p, o)| fixtures::triple(&s, &p, &o))
}

fn term_strategy() -> impl Strategy<Value = Term> {
    prop_oneof![
        "[a-z:/#. <>]{1,10}".prop_map(Term::named),
        "[a-z0-9_. -]{1,5}".prop_map(Term::blank),
        ("[ -~\n\t]{0,8}", prop::option::of("[a-z-]{0,3}"), prop::option::of("[a-z:/ ]{1,6}"))
            .prop_map(|(value, language, datatype)| Term::Literal {
                value,
                datatype,
                language,
            }),
    ]
}

fn any_triple_strategy() -> impl Strategy<Value = Triple> {
    (term_strategy(), term_strategy(), term_strategy())
        .prop_map(|(s, p, o)| Triple::new(s, p, o))
}

async fn stored_triples(store: &Arc<dyn ResourceStore>) -> BTreeSet<Triple> {
    let read = store
        .get_representation(&fixtures::document(), &RepresentationPreferences::default(), None)
        .await
        .unwrap();
    ntriples::parse(read.text().unwrap()).unwrap()
}

proptest! {
    #[test]
    fn prop_sequential_inserts_accumulate(
        batches in prop::collection::vec(prop::collection::vec(triple_strategy(), 1..4), 1..6)
    ) {
        let store = store();
        let expected: BTreeSet<Triple> = batches.iter().flatten().cloned().collect();

        let stored = tokio_test::block_on(async {
            for batch in &batches {
                store
                    .modify_resource(
                        &fixtures::document(),
                        &fixtures::insert(batch.clone()),
                        None,
                        &RepresentationPreferences::default(),
                    )
                    .await
                    .unwrap();
            }
            stored_triples(&store).await
        });

        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_delete_then_insert_replaces(
        initial in prop::collection::btree_set(triple_strategy(), 1..6),
        replacement in triple_strategy(),
    ) {
        let store = store();
        let removed = initial.iter().next().cloned().unwrap();

        let stored = tokio_test::block_on(async {
            store
                .modify_resource(
                    &fixtures::document(),
                    &fixtures::insert(initial.clone()),
                    None,
                    &RepresentationPreferences::default(),
                )
                .await
                .unwrap();
            let patch = Patch::semantic_update([removed.clone()], [replacement.clone()]).unwrap();
            store
                .modify_resource(&fixtures::document(), &patch, None, &RepresentationPreferences::default())
                .await
                .unwrap();
            stored_triples(&store).await
        });

        let mut expected = initial.clone();
        expected.remove(&removed);
        expected.insert(replacement);
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_valid_triples_survive_the_codec(
        candidates in prop::collection::vec(any_triple_strategy(), 0..8)
    ) {
        let valid: BTreeSet<Triple> = candidates
            .into_iter()
            .filter(|triple| triple.validate().is_ok())
            .collect();

        let written = ntriples::serialize(&valid);
        prop_assert_eq!(ntriples::parse(&written).unwrap(), valid);
    }
}
