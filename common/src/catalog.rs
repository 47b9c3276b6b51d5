//! 施術プロトコルカタログ
//!
//! 施術ごとの対象指標・メカニズム・文献・推奨頻度・排他ルールを保持する。
//! 起動時に一度だけ読み込み、プロセス終了まで変更しない。
//!
//! カタログの並び順は意味を持つ:
//! - 評価結果の同点タイブレーク
//! - スケジュール衝突時の優先順位（先に並ぶ施術が枠を取る）

use crate::error::{Error, Result};
use crate::frequency::Frequency;
use crate::types::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 施術カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// 光療法（美白カプセル等）
    Phototherapy,
    /// レーザー / IPL
    LaserLight,
    /// ケミカルピーリング
    Peel,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Phototherapy => write!(f, "光療法"),
            Category::LaserLight => write!(f, "光電レーザー"),
            Category::Peel => write!(f, "ピーリング・修復"),
        }
    }
}

/// 排他ルール: 指定施術と最小間隔（週）以内に重ねない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    pub protocol: String,
    pub min_interval_weeks: u32,
}

/// 施術プロトコル
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentProtocol {
    /// 一意な識別子
    pub name: String,
    pub display_name: String,
    pub category: Category,
    pub target_metrics: BTreeSet<Metric>,
    pub mechanism: String,
    /// 文献ID（表示順）
    #[serde(default)]
    pub citations: Vec<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
    /// 施術前の準備（麻酔クリーム等）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
}

impl TreatmentProtocol {
    pub fn targets(&self, metric: Metric) -> bool {
        self.target_metrics.contains(&metric)
    }
}

/// 施術カタログ（検証済み・順序付き）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<TreatmentProtocol>", into = "Vec<TreatmentProtocol>")]
pub struct ProtocolCatalog {
    protocols: Vec<TreatmentProtocol>,
}

impl ProtocolCatalog {
    /// プロトコル一覧から構築
    ///
    /// 名前の重複・空の対象指標・解決できない排他参照・自己排他・間隔0 はエラー。
    pub fn new(protocols: Vec<TreatmentProtocol>) -> Result<Self> {
        for (i, protocol) in protocols.iter().enumerate() {
            if protocol.name.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!("protocol #{} has an empty name", i + 1)));
            }
            if protocols[..i].iter().any(|p| p.name == protocol.name) {
                return Err(Error::InvalidCatalog(format!("duplicate protocol name: {}", protocol.name)));
            }
            if protocol.target_metrics.is_empty() {
                return Err(Error::InvalidCatalog(format!("{}: no target metrics", protocol.name)));
            }

            for rule in &protocol.exclusions {
                if rule.protocol == protocol.name {
                    return Err(Error::InvalidCatalog(format!("{}: excludes itself", protocol.name)));
                }
                if !protocols.iter().any(|p| p.name == rule.protocol) {
                    return Err(Error::InvalidCatalog(format!(
                        "{}: exclusion references unknown protocol '{}'",
                        protocol.name, rule.protocol
                    )));
                }
                if rule.min_interval_weeks == 0 {
                    return Err(Error::InvalidCatalog(format!(
                        "{}: exclusion with '{}' needs an interval of at least 1 week",
                        protocol.name, rule.protocol
                    )));
                }
            }
        }

        Ok(Self { protocols })
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let protocols: Vec<TreatmentProtocol> = serde_json::from_str(json)?;
        Self::new(protocols)
    }

    pub fn get(&self, name: &str) -> Option<&TreatmentProtocol> {
        self.protocols.iter().find(|p| p.name == name)
    }

    /// 名前で引く（なければ `UnknownProtocol`）
    pub fn require(&self, name: &str) -> Result<&TreatmentProtocol> {
        self.get(name)
            .ok_or_else(|| Error::UnknownProtocol(name.to_string()))
    }

    /// カタログ内の位置
    pub fn position(&self, name: &str) -> Option<usize> {
        self.protocols.iter().position(|p| p.name == name)
    }

    /// 2施術間の最小間隔（週）
    ///
    /// どちら側に書かれたルールでも衝突とみなし、両方あれば大きい方を採用する。
    pub fn conflict_interval(&self, a: &str, b: &str) -> Option<u32> {
        let declared = |from: &str, to: &str| {
            self.get(from).and_then(|p| {
                p.exclusions
                    .iter()
                    .filter(|r| r.protocol == to)
                    .map(|r| r.min_interval_weeks)
                    .max()
            })
        };

        match (declared(a, b), declared(b, a)) {
            (Some(x), Some(y)) => Some(x.max(y)),
            (x, y) => x.or(y),
        }
    }

    /// カタログが参照している文献IDのうち、ストアにないもの
    pub fn missing_citations(&self, store: &crate::citation::CitationStore) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for id in self.protocols.iter().flat_map(|p| &p.citations) {
            if !store.contains(id) && !missing.contains(id) {
                missing.push(id.clone());
            }
        }
        missing
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreatmentProtocol> {
        self.protocols.iter()
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// 組み込みカタログ
    pub fn builtin() -> Self {
        let protocols = vec![
            TreatmentProtocol {
                name: "whitening_chamber".into(),
                display_name: "全身美白カプセル (550-680nm)".into(),
                category: Category::Phototherapy,
                target_metrics: [Metric::DeepMelanin, Metric::Redness].into_iter().collect(),
                mechanism: "550nm 帯で MITF 転写因子を抑制してメラニン生成を減らし、\
                            600-680nm 帯で PGE2 などの炎症因子を低下させる。\
                            毎日の照射でも細胞生存率に影響がなく、高頻度のメンテナンスに適する。"
                    .into(),
                citations: vec!["2281".into(), "2341".into()],
                frequency: Frequency::TimesPerWeek(2),
                exclusions: Vec::new(),
                preparation: None,
            },
            TreatmentProtocol {
                name: "pico_laser".into(),
                display_name: "ピコ / トーニングレーザー".into(),
                category: Category::LaserLight,
                target_metrics: [Metric::SurfaceSpots].into_iter().collect(),
                mechanism: "表皮に形成された Supranuclear Melanin Cap を熱破壊し、\
                            メラノソームを粉砕する。施術後は修復期間が必要。"
                    .into(),
                citations: Vec::new(),
                frequency: Frequency::EveryWeeks(4),
                exclusions: Vec::new(),
                preparation: Some("表面麻酔クリームが必要".into()),
            },
            TreatmentProtocol {
                name: "ipl".into(),
                display_name: "IPL 光治療".into(),
                category: Category::LaserLight,
                target_metrics: [Metric::Redness].into_iter().collect(),
                mechanism: "拡張した血管を収縮・閉塞させ、ET-1 の供給を遮断して炎症を抑える。".into(),
                citations: vec!["1961".into()],
                frequency: Frequency::EveryWeeksRange(3, 4),
                exclusions: vec![ExclusionRule {
                    protocol: "pico_laser".into(),
                    min_interval_weeks: 1,
                }],
                preparation: None,
            },
            TreatmentProtocol {
                name: "chemical_peel".into(),
                display_name: "ケミカルピーリング".into(),
                category: Category::Peel,
                target_metrics: [Metric::Dullness].into_iter().collect(),
                mechanism: "表皮ターンオーバーを促進し、メラニンを含む角化細胞の脱落を早める。\
                            オートファジー促進がメラノソーム分解の鍵となる。\
                            ピーリング後は光療法の浸透性が向上する。"
                    .into(),
                citations: vec!["502".into(), "506".into()],
                frequency: Frequency::EveryWeeksRange(2, 3),
                exclusions: vec![ExclusionRule {
                    protocol: "pico_laser".into(),
                    min_interval_weeks: 1,
                }],
                preparation: None,
            },
        ];

        Self { protocols }
    }
}

impl TryFrom<Vec<TreatmentProtocol>> for ProtocolCatalog {
    type Error = Error;

    fn try_from(protocols: Vec<TreatmentProtocol>) -> Result<Self> {
        Self::new(protocols)
    }
}

impl From<ProtocolCatalog> for Vec<TreatmentProtocol> {
    fn from(catalog: ProtocolCatalog) -> Self {
        catalog.protocols
    }
}
