//! 一括評価テスト

use serde_json::json;
use skin_ai_common::{CitationStore, ProtocolCatalog, ReportOptions};
use skin_ai_rust::batch;
use skin_ai_rust::error::SkinAiError;
use tempfile::tempdir;

fn profile(surface_spots: i64, redness: i64, deep_melanin: i64, dullness: i64) -> serde_json::Value {
    json!({
        "surfaceSpots": surface_spots,
        "redness": redness,
        "deepMelanin": deep_melanin,
        "dullness": dullness,
    })
}

/// 出力順は入力順、1件の失敗は他に影響しない
#[test]
fn test_batch_preserves_order_and_isolates_failures() {
    let items = vec![
        json!({"id": "a", "profile": profile(75, 60, 85, 40), "week": 4}),
        json!({"id": "b", "profile": {"surfaceSpots": 75, "deepMelanin": 85, "dullness": 40}}),
        json!({"profile": profile(10, 10, 10, 90)}),
    ];

    let outcomes = batch::evaluate_batch(
        &items,
        &ProtocolCatalog::builtin(),
        &CitationStore::builtin(),
        &ReportOptions::default(),
    );

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].id, "a");
    assert_eq!(outcomes[1].id, "b");
    assert_eq!(outcomes[2].id, "#3");

    assert!(outcomes[0].is_ok());
    let report = outcomes[0].report.as_ref().unwrap();
    assert_eq!(report.recommendations.len(), 3);
    assert_eq!(report.week, 4);

    assert!(!outcomes[1].is_ok());
    assert!(outcomes[1].error.as_ref().unwrap().contains("redness"));

    let peel_only = outcomes[2].report.as_ref().unwrap();
    assert_eq!(peel_only.recommendations.len(), 1);
    assert_eq!(peel_only.recommendations[0].protocol, "chemical_peel");
}

/// 大量入力でも順序が崩れない
#[test]
fn test_batch_order_many_items() {
    let items: Vec<_> = (0..64)
        .map(|i| json!({"id": format!("r{}", i), "profile": profile(i, 0, 0, 0)}))
        .collect();

    let outcomes = batch::evaluate_batch(
        &items,
        &ProtocolCatalog::builtin(),
        &CitationStore::builtin(),
        &ReportOptions::default(),
    );

    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.id, format!("r{}", i));
        let recommended = !outcome.report.as_ref().unwrap().recommendations.is_empty();
        assert_eq!(recommended, i > 50);
    }
}

#[test]
fn test_load_requests_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("requests.json");
    std::fs::write(&path, r#"[{"profile": {"surfaceSpots": 1, "redness": 2, "deepMelanin": 3, "dullness": 4}}]"#)
        .unwrap();

    let items = batch::load_requests(&path).expect("読み込み失敗");
    assert_eq!(items.len(), 1);
}

#[test]
fn test_load_requests_rejects_non_array() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("requests.json");
    std::fs::write(&path, r#"{"profile": {}}"#).unwrap();

    let err = batch::load_requests(&path).unwrap_err();
    assert!(matches!(err, SkinAiError::InvalidInput(_)));
}

#[test]
fn test_load_requests_missing_file() {
    let dir = tempdir().unwrap();
    let err = batch::load_requests(&dir.path().join("none.json")).unwrap_err();
    assert!(matches!(err, SkinAiError::FileNotFound(_)));
}
