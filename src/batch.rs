//! 一括評価
//!
//! リクエストの配列（JSON）を並列に評価する。各リクエストは独立で、
//! 共有するのは読み取り専用のカタログと文献ストアのみ。
//! 1件の失敗は他の結果に影響しない。

use crate::error::{Result, SkinAiError};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use skin_ai_common::{build_report, AnalysisReport, AnalysisRequest, CitationStore, ProtocolCatalog, ReportOptions};
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.report.is_some()
    }
}

/// 入力ファイルを読み込み（トップレベルは配列）
pub fn load_requests(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Err(SkinAiError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Array(items) => Ok(items),
        _ => Err(SkinAiError::InvalidInput(format!(
            "{}: リクエストの配列が必要です",
            path.display()
        ))),
    }
}

/// 並列評価（出力順は入力順）
pub fn evaluate_batch(
    items: &[Value],
    catalog: &ProtocolCatalog,
    citations: &CitationStore,
    options: &ReportOptions,
) -> Vec<BatchOutcome> {
    items
        .par_iter()
        .enumerate()
        .map(|(i, item)| {
            let id = item
                .get("id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("#{}", i + 1));

            match evaluate_one(item, catalog, citations, options) {
                Ok(report) => BatchOutcome {
                    id,
                    report: Some(report),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "batch item rejected");
                    BatchOutcome {
                        id,
                        report: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

fn evaluate_one(
    item: &Value,
    catalog: &ProtocolCatalog,
    citations: &CitationStore,
    options: &ReportOptions,
) -> Result<AnalysisReport> {
    let request: AnalysisRequest = serde_json::from_value(item.clone())?;
    Ok(build_report(&request, catalog, citations, options)?)
}
