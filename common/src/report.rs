//! 解析レポートの組み立て
//!
//! 評価 → スケジュール解決 → 文献解決 をまとめ、
//! 表示層（CLIのテキスト/JSON出力）が読むだけのスナップショットを作る。
//!
//! 文献が見つからない場合もレポートは返す。該当文献は空欄 + `missing`、
//! `warnings` に記録する。

use crate::catalog::{Category, ProtocolCatalog};
use crate::citation::CitationStore;
use crate::error::Result;
use crate::evaluator::{self, DEFAULT_RELEVANCE_THRESHOLD};
use crate::schedule::{self, ScheduleEntry, DEFAULT_WEEKS_PER_CYCLE};
use crate::types::{ClientInfo, Metric, SeverityProfile};
use serde::{Deserialize, Serialize};

/// 解析リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub client: ClientInfo,
    pub profile: SeverityProfile,
    /// 週番号（省略時 0）
    #[serde(default)]
    pub week: u32,
}

/// レポート作成オプション
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub relevance_threshold: u8,
    pub weeks_per_cycle: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            weeks_per_cycle: DEFAULT_WEEKS_PER_CYCLE,
        }
    }
}

/// 指標の読み値
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReading {
    pub metric: Metric,
    pub label: String,
    pub value: u8,
    pub note: String,
}

/// 解決済み文献（見つからなければ空欄 + missing）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCitation {
    pub id: String,
    pub source: String,
    pub summary: String,
    #[serde(default)]
    pub missing: bool,
}

/// 推奨施術（表示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProtocol {
    pub rank: usize,
    pub protocol: String,
    pub display_name: String,
    pub category: Category,
    pub relevance: u8,
    pub primary_metric: Metric,
    pub mechanism: String,
    pub frequency: String,
    pub citations: Vec<ResolvedCitation>,
}

/// 予後の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrognosisKind {
    /// 未処置の場合のリスク
    Untreated,
    /// 全施術完了後の見込み
    Treated,
}

/// 予後メモ
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrognosisNote {
    pub kind: PrognosisKind,
    pub text: String,
    pub citations: Vec<ResolvedCitation>,
}

/// レポート警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportWarning {
    CitationNotFound { id: String, context: String },
}

impl std::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportWarning::CitationNotFound { id, context } => {
                write!(f, "文献 [{}] が見つかりません ({})", id, context)
            }
        }
    }
}

/// 解析レポート
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub client: ClientInfo,
    pub profile: SeverityProfile,
    pub metrics: Vec<MetricReading>,
    pub threshold: u8,
    pub week: u32,
    pub weeks_per_cycle: u32,
    pub recommendations: Vec<RecommendedProtocol>,
    pub schedule: Vec<ScheduleEntry>,
    pub prognosis: Vec<PrognosisNote>,
    #[serde(default)]
    pub warnings: Vec<ReportWarning>,
}

impl AnalysisReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// レポートを組み立てる
pub fn build_report(
    request: &AnalysisRequest,
    catalog: &ProtocolCatalog,
    citations: &CitationStore,
    options: &ReportOptions,
) -> Result<AnalysisReport> {
    let mut warnings = Vec::new();

    let set = evaluator::evaluate(&request.profile, catalog, options.relevance_threshold);
    let schedule = schedule::resolve(
        &set.protocol_names(),
        catalog,
        request.week,
        options.weeks_per_cycle,
    )?;

    let mut recommendations = Vec::with_capacity(set.len());
    for (i, item) in set.items.iter().enumerate() {
        let protocol = catalog.require(&item.protocol)?;
        recommendations.push(RecommendedProtocol {
            rank: i + 1,
            protocol: protocol.name.clone(),
            display_name: protocol.display_name.clone(),
            category: protocol.category,
            relevance: item.relevance,
            primary_metric: item.primary_metric,
            mechanism: protocol.mechanism.clone(),
            frequency: protocol.frequency.to_string(),
            citations: resolve_citations(&protocol.citations, citations, &protocol.name, &mut warnings),
        });
    }

    let prognosis = prognosis_notes()
        .into_iter()
        .map(|(kind, text, ids)| {
            let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
            PrognosisNote {
                kind,
                text: text.to_string(),
                citations: resolve_citations(&ids, citations, "prognosis", &mut warnings),
            }
        })
        .collect();

    let metrics = request
        .profile
        .entries()
        .map(|(metric, value)| MetricReading {
            metric,
            label: metric.label().to_string(),
            value,
            note: metric.note().to_string(),
        })
        .collect();

    Ok(AnalysisReport {
        client: request.client.clone(),
        profile: request.profile,
        metrics,
        threshold: set.threshold,
        week: request.week,
        weeks_per_cycle: options.weeks_per_cycle,
        recommendations,
        schedule,
        prognosis,
        warnings,
    })
}

fn resolve_citations(
    ids: &[String],
    store: &CitationStore,
    context: &str,
    warnings: &mut Vec<ReportWarning>,
) -> Vec<ResolvedCitation> {
    ids.iter()
        .map(|id| match store.lookup(id) {
            Ok(c) => ResolvedCitation {
                id: c.id.clone(),
                source: c.source.clone(),
                summary: c.summary.clone(),
                missing: false,
            },
            Err(_) => {
                warnings.push(ReportWarning::CitationNotFound {
                    id: id.clone(),
                    context: context.to_string(),
                });
                ResolvedCitation {
                    id: id.clone(),
                    source: String::new(),
                    summary: String::new(),
                    missing: true,
                }
            }
        })
        .collect()
}

fn prognosis_notes() -> [(PrognosisKind, &'static str, &'static [&'static str]); 2] {
    [
        (
            PrognosisKind::Untreated,
            "介入しない場合、UVB 誘導の c-KIT / EDNRB 受容体の高発現が続き、\
             メラノサイトが刺激に対してより敏感になる。1年後に斑点が 20-30% 濃くなる見込み。",
            &["3173"],
        ),
        (
            PrognosisKind::Treated,
            "LED 光療法 8 週間の臨床データでは Melanin Index が有意に低下し、\
             皮膚明度（L* 値）が上昇した。上腕内側の本来の肌色まで戻せる見込み。",
            &["2822"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::Citation;
    use crate::schedule::ScheduleStatus;

    fn scenario_request() -> AnalysisRequest {
        AnalysisRequest {
            client: ClientInfo::default(),
            profile: SeverityProfile::new(75, 60, 85, 40).unwrap(),
            week: 4,
        }
    }

    #[test]
    fn test_build_report_scenario() {
        let report = build_report(
            &scenario_request(),
            &ProtocolCatalog::builtin(),
            &CitationStore::builtin(),
            &ReportOptions::default(),
        )
        .expect("レポート作成失敗");

        let names: Vec<_> = report.recommendations.iter().map(|r| r.protocol.as_str()).collect();
        assert_eq!(names, vec!["whitening_chamber", "pico_laser", "ipl"]);
        assert_eq!(report.recommendations[0].rank, 1);
        assert_eq!(report.metrics.len(), 4);
        assert_eq!(report.prognosis.len(), 2);
        assert!(!report.has_warnings());

        // スケジュールは推奨施術のみ
        assert_eq!(report.schedule.len(), 3);
        let ipl = report.schedule.iter().find(|e| e.protocol == "ipl").unwrap();
        assert_eq!(ipl.status, ScheduleStatus::Deferred { conflict_with: "pico_laser".into() });
    }

    #[test]
    fn test_missing_citation_is_warning() {
        let store = CitationStore::new(vec![Citation {
            id: "2281".into(),
            source: "Mima et al.".into(),
            summary: "MITF".into(),
        }])
        .unwrap();

        let report = build_report(
            &scenario_request(),
            &ProtocolCatalog::builtin(),
            &store,
            &ReportOptions::default(),
        )
        .expect("文献欠損でもレポートは返る");

        let chamber = &report.recommendations[0];
        assert!(!chamber.citations[0].missing);
        let missing = &chamber.citations[1];
        assert!(missing.missing);
        assert_eq!(missing.id, "2341");
        assert!(missing.source.is_empty());

        assert!(report.warnings.contains(&ReportWarning::CitationNotFound {
            id: "2341".into(),
            context: "whitening_chamber".into(),
        }));
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, ReportWarning::CitationNotFound { context, .. } if context == "prognosis")));
    }

    #[test]
    fn test_no_recommendations() {
        let request = AnalysisRequest {
            profile: SeverityProfile::new(10, 10, 10, 10).unwrap(),
            ..scenario_request()
        };
        let report = build_report(
            &request,
            &ProtocolCatalog::builtin(),
            &CitationStore::builtin(),
            &ReportOptions::default(),
        )
        .unwrap();

        assert!(report.recommendations.is_empty());
        assert!(report.schedule.is_empty());
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let json = r#"{"profile": {"surfaceSpots": 75, "redness": 60, "deepMelanin": 85, "dullness": 40}}"#;
        let request: AnalysisRequest = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(request.week, 0);
        assert_eq!(request.client.name, "Guest");
    }

    #[test]
    fn test_request_missing_metric_rejected() {
        let json = r#"{"profile": {"surfaceSpots": 75, "deepMelanin": 85, "dullness": 40}}"#;
        let err = serde_json::from_str::<AnalysisRequest>(json).unwrap_err();
        assert!(err.to_string().contains("redness"));
    }
}
