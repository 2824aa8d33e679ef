use quadsync_domain::{Term, vocab::xsd};

use super::*;
use crate::coordinator::IndexSyncStatus;

#[tokio::test]
async fn repeated_add_stores_one_quad() {
    let harness = setup().await;
    let stored = quad("a", "p", Term::literal("1"), "g");

    for _ in 0..2 {
        harness
            .coordinator
            .add_quads(DATASET, std::slice::from_ref(&stored), None)
            .await
            .unwrap();
    }
    harness
        .coordinator
        .add_quads(DATASET, &[stored.clone(), stored.clone()], None)
        .await
        .unwrap();

    assert_eq!(
        harness
            .coordinator
            .count_quads(DATASET, Some(&ex("g")))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn removing_absent_quad_changes_nothing() {
    let harness = setup().await;
    let stored = quad("a", "p", Term::literal("1"), "g");
    harness
        .coordinator
        .add_quads(DATASET, std::slice::from_ref(&stored), None)
        .await
        .unwrap();

    let outcome = harness
        .coordinator
        .remove_quads(DATASET, &[quad("a", "p", Term::literal("2"), "g")], None)
        .await
        .unwrap();

    assert_eq!(outcome.removed, 0);
    assert!(outcome.ambiguous_matches.is_empty());
    assert_eq!(
        harness.coordinator.count_quads(DATASET, None).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn removing_absent_numeric_quad_keeps_close_neighbour() {
    let harness = setup().await;
    let stored = [
        quad("a", "count", Term::typed_literal("5000", xsd::INTEGER), "g"),
        quad("a", "label", Term::literal("10115"), "g"),
        quad("a", "price", Term::typed_literal("100.5", xsd::DECIMAL), "g"),
    ];
    harness
        .coordinator
        .add_quads(DATASET, &stored, None)
        .await
        .unwrap();

    let outcome = harness
        .coordinator
        .remove_quads(
            DATASET,
            &[
                quad("a", "count", Term::typed_literal("5001", xsd::INTEGER), "g"),
                quad("a", "label", Term::literal("10117"), "g"),
                quad("a", "price", Term::typed_literal("100.4", xsd::DECIMAL), "g"),
            ],
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.removed, 0);
    assert!(outcome.ambiguous_matches.is_empty());
    assert_eq!(
        harness.coordinator.count_quads(DATASET, None).await.unwrap(),
        3
    );
    for kept in &stored {
        assert!(indexed(&harness, kept).await, "{kept}");
    }
}

#[tokio::test]
async fn insert_data_then_delete_data_leaves_nothing() {
    let harness = setup().await;

    let inserted = harness
        .coordinator
        .execute_update(
            DATASET,
            "INSERT DATA { <http://example.org/a> <http://example.org/p> <http://example.org/b> . }",
            None,
        )
        .await
        .unwrap();
    assert_eq!(inserted.inserted, 1);
    assert_eq!(inserted.index, IndexSyncStatus::Synced);

    let deleted = harness
        .coordinator
        .execute_update(
            DATASET,
            "DELETE DATA { <http://example.org/a> <http://example.org/p> <http://example.org/b> . }",
            None,
        )
        .await
        .unwrap();
    assert_eq!(deleted.removed, 1);

    assert_eq!(
        harness
            .coordinator
            .count_quads(DATASET, Some(&Term::default_graph()))
            .await
            .unwrap(),
        0
    );
    let triple = Quad::in_default_graph(ex("a"), ex("p"), ex("b"));
    assert!(!indexed(&harness, &triple).await);
}

#[tokio::test]
async fn truncated_double_removes_stored_value_from_both_stores() {
    let harness = setup().await;
    let stored = quad(
        "x",
        "value",
        Term::typed_literal("32785.67923076924", xsd::DOUBLE),
        "g",
    );
    harness
        .coordinator
        .add_quads(DATASET, std::slice::from_ref(&stored), None)
        .await
        .unwrap();

    let outcome = harness
        .coordinator
        .remove_quads(
            DATASET,
            &[quad(
                "x",
                "value",
                Term::typed_literal("32785.68", xsd::DOUBLE),
                "g",
            )],
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.removed, 1);
    assert!(outcome.ambiguous_matches.is_empty());
    assert_eq!(outcome.index, IndexSyncStatus::Synced);
    assert_eq!(
        harness.coordinator.count_quads(DATASET, None).await.unwrap(),
        0
    );
    assert!(!indexed(&harness, &stored).await);
}

#[tokio::test]
async fn second_close_value_makes_truncated_double_ambiguous() {
    let harness = setup().await;
    let first = quad(
        "x",
        "value",
        Term::typed_literal("32785.67923076924", xsd::DOUBLE),
        "g",
    );
    let second = quad(
        "y",
        "value",
        Term::typed_literal("32785.681", xsd::DOUBLE),
        "g",
    );
    harness
        .coordinator
        .add_quads(DATASET, &[first.clone(), second.clone()], None)
        .await
        .unwrap();

    let truncated = Term::typed_literal("32785.68", xsd::DOUBLE);
    let outcome = harness
        .coordinator
        .remove_quads(
            DATASET,
            &[quad("x", "value", truncated.clone(), "g")],
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.removed, 0);
    assert_eq!(outcome.ambiguous_matches.len(), 1);
    let ambiguous = &outcome.ambiguous_matches[0];
    assert_eq!(ambiguous.term, truncated);
    assert_eq!(ambiguous.candidates.len(), 2);
    assert_eq!(
        harness.coordinator.count_quads(DATASET, None).await.unwrap(),
        2
    );
}
