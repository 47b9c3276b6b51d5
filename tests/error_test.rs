//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use skin_ai_common::{CitationStore, ProtocolCatalog};
use skin_ai_rust::cli::ProfileArgs;
use skin_ai_rust::config::Config;
use skin_ai_rust::error::SkinAiError;
use skin_ai_rust::intake;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 存在しない写真
#[test]
fn test_photo_not_found() {
    let result = intake::inspect_photo(Path::new("/nonexistent/path/12345.jpg"));
    assert!(matches!(result.unwrap_err(), SkinAiError::FileNotFound(_)));
}

/// 写真以外のファイル
#[test]
fn test_photo_wrong_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let err = intake::inspect_photo(&path).unwrap_err();
    assert!(matches!(err, SkinAiError::UnsupportedPhoto(_)));
    assert!(err.to_string().contains("jpg/png"));
}

/// 重症度JSONに指標が欠けている
#[test]
fn test_profile_file_missing_metric() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, r#"{"surfaceSpots": 75, "deepMelanin": 85, "dullness": 40}"#).unwrap();

    let args = ProfileArgs {
        profile: Some(path),
        ..Default::default()
    };
    let err = args.to_profile().unwrap_err();
    match err {
        SkinAiError::Common(skin_ai_common::Error::InvalidProfile { field, .. }) => {
            assert_eq!(field, "redness");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// 重症度が範囲外
#[test]
fn test_profile_out_of_range() {
    let args = ProfileArgs {
        surface_spots: Some(75),
        redness: Some(101),
        deep_melanin: Some(85),
        dullness: Some(-1),
        ..Default::default()
    };
    let err = args.to_profile().unwrap_err();
    assert!(matches!(
        err,
        SkinAiError::Common(skin_ai_common::Error::InvalidProfile { .. })
    ));
}

/// 重症度ファイルが存在しない
#[test]
fn test_profile_file_not_found() {
    let args = ProfileArgs {
        profile: Some(PathBuf::from("/nonexistent/profile.json")),
        ..Default::default()
    };
    assert!(matches!(args.to_profile().unwrap_err(), SkinAiError::FileNotFound(_)));
}

/// 不正なカタログJSON
#[test]
fn test_invalid_catalog_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "{ invalid json }").unwrap();

    let config = Config {
        catalog_path: Some(path),
        ..Default::default()
    };
    assert!(config.load_catalog().is_err());
}

/// 存在しない施術を参照する排他ルール
#[test]
fn test_catalog_unknown_exclusion_target() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"[{
            "name": "ipl",
            "displayName": "IPL",
            "category": "laserLight",
            "targetMetrics": ["redness"],
            "mechanism": "血管標的",
            "frequency": "every 3-4 weeks",
            "exclusions": [{"protocol": "ghost", "minIntervalWeeks": 1}]
        }]"#,
    )
    .unwrap();

    let config = Config {
        catalog_path: Some(path),
        ..Default::default()
    };
    let err = config.load_catalog().unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

/// 文献ストアの重複ID
#[test]
fn test_duplicate_citation_ids() {
    let json = r#"[
        {"id": "1", "source": "A", "summary": "a"},
        {"id": "1", "source": "B", "summary": "b"}
    ]"#;
    assert!(CitationStore::from_json(json).is_err());
}

/// 未知の施術名でスケジュール
#[test]
fn test_schedule_unknown_protocol() {
    let catalog = ProtocolCatalog::builtin();
    let err = skin_ai_common::resolve(&["ghost"], &catalog, 0, 8).unwrap_err();
    assert!(matches!(err, skin_ai_common::Error::UnknownProtocol(ref name) if name == "ghost"));
}
