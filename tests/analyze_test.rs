//! 解析パイプライン統合テスト
//!
//! 写真チェック → 測定値 → 評価 → スケジュール → 出力 を通しで検証

use skin_ai_common::{build_report, AnalysisRequest, CitationStore, ClientInfo, ProtocolCatalog, ReportOptions, ScheduleStatus};
use skin_ai_rust::cli::ProfileArgs;
use skin_ai_rust::config::Config;
use skin_ai_rust::{fingerprint, intake, render};
use tempfile::tempdir;

fn scenario_profile() -> ProfileArgs {
    ProfileArgs {
        surface_spots: Some(75),
        redness: Some(60),
        deep_melanin: Some(85),
        dullness: Some(40),
        ..Default::default()
    }
}

/// 第4週: 美白カプセル・ピコは実施、IPL はピコと重なるため延期、ピーリングは推奨外
#[test]
fn test_analyze_scenario_week4() {
    let dir = tempdir().unwrap();
    let photo_path = dir.path().join("face.jpg");
    image::RgbImage::new(16, 16).save(&photo_path).unwrap();

    let photo = intake::inspect_photo(&photo_path).expect("写真チェック失敗");
    let request = AnalysisRequest {
        client: ClientInfo::default(),
        profile: scenario_profile().to_profile().unwrap(),
        week: 4,
    };

    let catalog = ProtocolCatalog::builtin();
    let citations = CitationStore::builtin();
    let report = build_report(&request, &catalog, &citations, &ReportOptions::default()).unwrap();

    let relevance: Vec<_> = report
        .recommendations
        .iter()
        .map(|r| (r.protocol.as_str(), r.relevance))
        .collect();
    assert_eq!(
        relevance,
        vec![("whitening_chamber", 85), ("pico_laser", 75), ("ipl", 60)]
    );

    let status = |name: &str| {
        report
            .schedule
            .iter()
            .find(|e| e.protocol == name)
            .map(|e| e.status.clone())
            .unwrap()
    };
    assert_eq!(status("whitening_chamber"), ScheduleStatus::Immediate);
    assert_eq!(status("pico_laser"), ScheduleStatus::Immediate);
    assert_eq!(
        status("ipl"),
        ScheduleStatus::Deferred { conflict_with: "pico_laser".into() }
    );

    let fp = fingerprint::fingerprint(&catalog, &citations).unwrap();
    let text = render::render_report(&report, &photo, &fp, &catalog);
    assert!(text.contains("face.jpg"));
    assert!(text.contains("延期"));
    assert!(text.contains("麻酔"));
    assert!(!text.contains("警告"));

    let json = serde_json::to_value(render::AnalyzeOutput {
        fingerprint: &fp,
        photo: &photo,
        report: &report,
    })
    .unwrap();
    assert_eq!(json["fingerprint"], fp.as_str());
    assert_eq!(json["report"]["recommendations"][0]["protocol"], "whitening_chamber");
    assert_eq!(json["report"]["schedule"][2]["status"], "deferred");
}

/// 閾値を上げると推奨が減る
#[test]
fn test_analyze_custom_threshold() {
    let request = AnalysisRequest {
        client: ClientInfo::default(),
        profile: scenario_profile().to_profile().unwrap(),
        week: 0,
    };
    let options = ReportOptions {
        relevance_threshold: 75,
        ..Default::default()
    };
    let report = build_report(
        &request,
        &ProtocolCatalog::builtin(),
        &CitationStore::builtin(),
        &options,
    )
    .unwrap();

    let names: Vec<_> = report.recommendations.iter().map(|r| r.protocol.as_str()).collect();
    assert_eq!(names, vec!["whitening_chamber"]);
}

/// カタログ・文献をファイルから読み込み、欠けた文献は警告になる
#[test]
fn test_analyze_with_external_files() {
    let dir = tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    let citations_path = dir.path().join("citations.json");

    std::fs::write(
        &catalog_path,
        r#"[{
            "name": "led",
            "displayName": "LED",
            "category": "phototherapy",
            "targetMetrics": ["deepMelanin"],
            "mechanism": "MITF 抑制",
            "citations": ["1", "99"],
            "frequency": "2x weekly"
        }]"#,
    )
    .unwrap();
    std::fs::write(&citations_path, r#"[{"id": "1", "source": "Lab", "summary": "ok"}]"#).unwrap();

    let config = Config {
        catalog_path: Some(catalog_path),
        citations_path: Some(citations_path),
        ..Default::default()
    };
    let catalog = config.load_catalog().unwrap();
    let citations = config.load_citations().unwrap();

    let request = AnalysisRequest {
        client: ClientInfo::default(),
        profile: scenario_profile().to_profile().unwrap(),
        week: 0,
    };
    let report = build_report(&request, &catalog, &citations, &ReportOptions::default()).unwrap();

    assert_eq!(report.recommendations.len(), 1);
    assert!(report.has_warnings());
    assert!(report.warnings.iter().any(|w| w.to_string().contains("[99]")));
    assert_eq!(catalog.missing_citations(&citations), vec!["99".to_string()]);
}
