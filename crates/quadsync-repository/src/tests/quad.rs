use quadsync_domain::{Quad, Term, vocab::xsd};

use super::{DATASET, quad, setup_manager};
use crate::NumericFallbackConfig;

#[tokio::test]
async fn insert_is_idempotent() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let batch = vec![
        quad("a", "p", Term::literal("1"), "g"),
        quad("a", "p", Term::literal("1"), "g"),
        quad("b", "p", Term::uri("http://example.org/a"), "g"),
    ];

    for _ in 0..2 {
        let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
        let report = quads.insert_batch(&tx, DATASET, &batch).await.unwrap();
        assert_eq!(report.quads, 2);
        tx.commit().await.unwrap();
    }

    assert_eq!(quads.count(DATASET, None).await.unwrap(), 2);
}

#[tokio::test]
async fn insert_chunks_large_batches() {
    let (manager, _dir) = setup_manager(3).await;
    let quads = manager.quad_repository();
    let batch: Vec<Quad> = (0..10)
        .map(|i| quad(&format!("s{i}"), "p", Term::literal(i.to_string()), "g"))
        .collect();

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &batch).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(quads.count(DATASET, None).await.unwrap(), 10);
    let graph = Term::uri("http://example.org/g");
    let mut stored = quads.quads_in_graph(DATASET, &graph).await.unwrap();
    stored.sort_by_key(|quad| quad.subject.text().to_string());
    let mut expected = batch;
    expected.sort_by_key(|quad| quad.subject.text().to_string());
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn removing_absent_quads_is_a_no_op() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let present = quad("a", "p", Term::literal("1"), "g");

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads
        .insert_batch(&tx, DATASET, std::slice::from_ref(&present))
        .await
        .unwrap();
    let report = quads
        .remove_batch(
            &tx,
            DATASET,
            &[quad("missing", "p", Term::literal("1"), "g")],
            &NumericFallbackConfig::default(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(report.removed, 0);
    assert_eq!(quads.count(DATASET, None).await.unwrap(), 1);
}

#[tokio::test]
async fn removing_absent_numeric_quads_leaves_close_neighbours() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let stored = vec![
        quad("a", "count", Term::typed_literal("5000", xsd::INTEGER), "g"),
        quad("a", "label", Term::literal("10115"), "g"),
        quad("a", "price", Term::typed_literal("100.5", xsd::DECIMAL), "g"),
        quad("a", "ratio", Term::typed_literal("2.5", xsd::DOUBLE), "g"),
    ];
    let absent = vec![
        quad("a", "count", Term::typed_literal("5001", xsd::INTEGER), "g"),
        quad("a", "label", Term::literal("10117"), "g"),
        quad("a", "price", Term::typed_literal("100.4", xsd::DECIMAL), "g"),
        // Same length as the stored double: not a shortened rendering of it.
        quad("a", "ratio", Term::typed_literal("2.4", xsd::DOUBLE), "g"),
    ];

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &stored).await.unwrap();
    let report = quads
        .remove_batch(&tx, DATASET, &absent, &NumericFallbackConfig::default())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(report.removed, 0);
    assert!(report.substitutions.is_empty());
    assert!(report.ambiguous.is_empty());
    assert_eq!(quads.count(DATASET, None).await.unwrap(), 4);
}

#[tokio::test]
async fn remove_deletes_only_listed_quads() {
    let (manager, _dir) = setup_manager(2).await;
    let quads = manager.quad_repository();
    let batch: Vec<Quad> = (0..5)
        .map(|i| quad("a", "p", Term::literal(i.to_string()), "g"))
        .collect();

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &batch).await.unwrap();
    let report = quads
        .remove_batch(&tx, DATASET, &batch[..3], &NumericFallbackConfig::default())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(report.removed, 3);
    assert_eq!(quads.count(DATASET, None).await.unwrap(), 2);
}

#[tokio::test]
async fn remove_resolves_truncated_double() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let stored = quad(
        "x",
        "value",
        Term::typed_literal("32785.67923076924", xsd::DOUBLE),
        "g",
    );
    let truncated = quad(
        "x",
        "value",
        Term::typed_literal("32785.68", xsd::DOUBLE),
        "g",
    );

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &[stored]).await.unwrap();
    let report = quads
        .remove_batch(&tx, DATASET, &[truncated], &NumericFallbackConfig::default())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(report.substitutions.len(), 1);
    assert!(report.ambiguous.is_empty());
    assert_eq!(quads.count(DATASET, None).await.unwrap(), 0);
}

#[tokio::test]
async fn remove_leaves_ambiguous_operands_in_place() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let batch = vec![
        quad("x", "value", Term::typed_literal("32785.67923076924", xsd::DOUBLE), "g"),
        quad("x", "value", Term::typed_literal("32785.6812", xsd::DOUBLE), "g"),
    ];

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &batch).await.unwrap();
    let report = quads
        .remove_batch(
            &tx,
            DATASET,
            &[quad("x", "value", Term::typed_literal("32785.68", xsd::DOUBLE), "g")],
            &NumericFallbackConfig::default(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(report.removed, 0);
    assert_eq!(report.ambiguous.len(), 1);
    assert_eq!(report.ambiguous[0].candidates.len(), 2);
    assert_eq!(quads.count(DATASET, None).await.unwrap(), 2);
}

#[tokio::test]
async fn disabled_fallback_requires_exact_match() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let stored = quad("x", "value", Term::typed_literal("1.23456", xsd::DOUBLE), "g");

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &[stored]).await.unwrap();
    let fallback = NumericFallbackConfig {
        enabled: false,
        ..NumericFallbackConfig::default()
    };
    let report = quads
        .remove_batch(
            &tx,
            DATASET,
            &[quad("x", "value", Term::typed_literal("1.2346", xsd::DOUBLE), "g")],
            &fallback,
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(report.removed, 0);
    assert!(report.substitutions.is_empty());
}

#[tokio::test]
async fn count_filters_by_graph() {
    let (manager, _dir) = setup_manager(100).await;
    let quads = manager.quad_repository();
    let batch = vec![
        quad("a", "p", Term::literal("1"), "g1"),
        quad("a", "p", Term::literal("1"), "g2"),
        Quad::in_default_graph(
            Term::uri("http://example.org/a"),
            Term::uri("http://example.org/p"),
            Term::literal("1"),
        ),
    ];

    let tx = manager.transaction_manager().begin(DATASET).await.unwrap();
    quads.insert_batch(&tx, DATASET, &batch).await.unwrap();
    tx.commit().await.unwrap();

    let g1 = Term::uri("http://example.org/g1");
    assert_eq!(quads.count(DATASET, Some(&g1)).await.unwrap(), 1);
    assert_eq!(
        quads
            .count(DATASET, Some(&Term::default_graph()))
            .await
            .unwrap(),
        1
    );
    assert_eq!(quads.count(DATASET, None).await.unwrap(), 3);
    assert_eq!(quads.count("other", None).await.unwrap(), 0);
}
