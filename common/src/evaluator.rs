//! 重症度評価
//!
//! プロファイルとカタログから推奨施術を選び、関連度の降順に並べる。
//! 関連度 = 施術が対象とする指標のうち最大の重症度。

use crate::catalog::{ProtocolCatalog, TreatmentProtocol};
use crate::error::{Error, Result};
use crate::types::{Metric, SeverityProfile, MAX_SEVERITY};
use serde::{Deserialize, Serialize};

/// 関連度閾値のデフォルト
pub const DEFAULT_RELEVANCE_THRESHOLD: u8 = 50;

/// 推奨1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub protocol: String,
    pub relevance: u8,
    /// 関連度を決めた指標
    pub primary_metric: Metric,
}

/// 推奨セット（関連度の降順、同点はカタログ順）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub threshold: u8,
    pub items: Vec<Recommendation>,
}

impl RecommendationSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 推奨施術名（順位順）
    pub fn protocol_names(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.protocol.as_str()).collect()
    }
}

/// 関連度閾値を検証
pub fn check_threshold(threshold: i64) -> Result<u8> {
    if !(0..=MAX_SEVERITY).contains(&threshold) {
        return Err(Error::InvalidThreshold(threshold));
    }
    Ok(threshold as u8)
}

/// 施術の関連度と、それを決めた指標
///
/// 同値の場合は表示順で先の指標を返す。
pub fn relevance(protocol: &TreatmentProtocol, profile: &SeverityProfile) -> Option<(u8, Metric)> {
    profile
        .entries()
        .filter(|(metric, _)| protocol.targets(*metric))
        .fold(None, |best, (metric, value)| match best {
            Some((top, _)) if top >= value => best,
            _ => Some((value, metric)),
        })
}

/// プロファイルを評価して推奨セットを返す
///
/// 関連度が閾値を超える（>）施術のみ採用。副作用なし。
pub fn evaluate(profile: &SeverityProfile, catalog: &ProtocolCatalog, threshold: u8) -> RecommendationSet {
    let mut items: Vec<Recommendation> = catalog
        .iter()
        .filter_map(|protocol| {
            relevance(protocol, profile).map(|(score, metric)| Recommendation {
                protocol: protocol.name.clone(),
                relevance: score,
                primary_metric: metric,
            })
        })
        .filter(|r| r.relevance > threshold)
        .collect();

    // 安定ソートなので同点はカタログ順のまま
    items.sort_by(|a, b| b.relevance.cmp(&a.relevance));

    RecommendationSet { threshold, items }
}
