//! 検査データの型定義
//!
//! CLIとバッチ処理で共有される型:
//! - Metric: 皮膚指標（表層斑点・発赤・深層メラニン・くすみ）
//! - SeverityProfile: 4指標すべてを持つ重症度プロファイル（0-100）
//! - ClientInfo: 顧客情報（レポートのヘッダー表示のみ）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 重症度の上限値
pub const MAX_SEVERITY: i64 = 100;

/// 皮膚指標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    #[serde(alias = "surface_spots")]
    SurfaceSpots,
    Redness,
    #[serde(alias = "deep_melanin")]
    DeepMelanin,
    Dullness,
}

impl Metric {
    /// 全指標（表示順）
    pub const ALL: [Metric; 4] = [
        Metric::SurfaceSpots,
        Metric::Redness,
        Metric::DeepMelanin,
        Metric::Dullness,
    ];

    /// レコードのキー名（camelCase）
    pub fn key(&self) -> &'static str {
        match self {
            Metric::SurfaceSpots => "surfaceSpots",
            Metric::Redness => "redness",
            Metric::DeepMelanin => "deepMelanin",
            Metric::Dullness => "dullness",
        }
    }

    /// snake_case のキー名（旧形式の入力用）
    fn snake_key(&self) -> &'static str {
        match self {
            Metric::SurfaceSpots => "surface_spots",
            Metric::Redness => "redness",
            Metric::DeepMelanin => "deep_melanin",
            Metric::Dullness => "dullness",
        }
    }

    /// キー名から指標を取得（camelCase / snake_case 両対応）
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.key() == key || m.snake_key() == key)
    }

    /// 表示名
    pub fn label(&self) -> &'static str {
        match self {
            Metric::SurfaceSpots => "表層斑点",
            Metric::Redness => "炎症性発赤",
            Metric::DeepMelanin => "深層メラニン",
            Metric::Dullness => "角質肥厚",
        }
    }

    /// 所見メモ
    pub fn note(&self) -> &'static str {
        match self {
            Metric::SurfaceSpots => "物理的破砕が必要",
            Metric::Redness => "毛細血管拡張",
            Metric::DeepMelanin => "MITF 高活性",
            Metric::Dullness => "ターンオーバー遅延",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 重症度プロファイル
///
/// 4指標すべてが 0-100 の整数で揃っていることを構築時に保証する。
/// 構築後は不変。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Map<String, Value>")]
pub struct SeverityProfile {
    surface_spots: u8,
    redness: u8,
    deep_melanin: u8,
    dullness: u8,
}

impl SeverityProfile {
    pub fn new(surface_spots: i64, redness: i64, deep_melanin: i64, dullness: i64) -> Result<Self> {
        Ok(Self {
            surface_spots: check_range(Metric::SurfaceSpots, surface_spots)?,
            redness: check_range(Metric::Redness, redness)?,
            deep_melanin: check_range(Metric::DeepMelanin, deep_melanin)?,
            dullness: check_range(Metric::Dullness, dullness)?,
        })
    }

    /// キー付きレコードから構築
    ///
    /// 欠損・重複・非整数・範囲外・未知のキーはすべて `InvalidProfile`（該当フィールド名付き）。
    pub fn from_record(record: &Map<String, Value>) -> Result<Self> {
        let mut values = [0i64; 4];

        for (slot, metric) in values.iter_mut().zip(Metric::ALL) {
            let camel = record.get(metric.key());
            let snake = if metric.snake_key() == metric.key() {
                None
            } else {
                record.get(metric.snake_key())
            };

            let value = match (camel, snake) {
                (Some(_), Some(_)) => {
                    return Err(Error::invalid_profile(
                        metric.key(),
                        format!("given as both '{}' and '{}'", metric.key(), metric.snake_key()),
                    ))
                }
                (Some(v), None) | (None, Some(v)) => v,
                (None, None) => return Err(Error::invalid_profile(metric.key(), "missing")),
            };

            *slot = value
                .as_i64()
                .ok_or_else(|| Error::invalid_profile(metric.key(), format!("not an integer: {}", value)))?;
        }

        if let Some(unknown) = record.keys().find(|k| Metric::from_key(k).is_none()) {
            return Err(Error::invalid_profile(unknown.as_str(), "unknown metric"));
        }

        Self::new(values[0], values[1], values[2], values[3])
    }

    /// JSON文字列から構築
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(record) => Self::from_record(&record),
            _ => Err(Error::invalid_profile("profile", "expected a JSON object")),
        }
    }

    /// 指標の値を取得
    pub fn get(&self, metric: Metric) -> u8 {
        match metric {
            Metric::SurfaceSpots => self.surface_spots,
            Metric::Redness => self.redness,
            Metric::DeepMelanin => self.deep_melanin,
            Metric::Dullness => self.dullness,
        }
    }

    /// (指標, 値) の一覧（表示順）
    pub fn entries(&self) -> impl Iterator<Item = (Metric, u8)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

impl TryFrom<Map<String, Value>> for SeverityProfile {
    type Error = Error;

    fn try_from(record: Map<String, Value>) -> Result<Self> {
        Self::from_record(&record)
    }
}

fn check_range(metric: Metric, value: i64) -> Result<u8> {
    if !(0..=MAX_SEVERITY).contains(&value) {
        return Err(Error::invalid_profile(
            metric.key(),
            format!("{} is outside range [0, {}]", value, MAX_SEVERITY),
        ));
    }
    Ok(value as u8)
}

/// 肌質
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkinType {
    Dry,
    Oily,
    #[default]
    Combination,
    Sensitive,
}

impl SkinType {
    pub fn label(&self) -> &'static str {
        match self {
            SkinType::Dry => "乾燥肌",
            SkinType::Oily => "脂性肌",
            SkinType::Combination => "混合肌",
            SkinType::Sensitive => "敏感肌",
        }
    }
}

impl std::str::FromStr for SkinType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dry" | "乾燥肌" | "乾性" => Ok(SkinType::Dry),
            "oily" | "脂性肌" | "油性" => Ok(SkinType::Oily),
            "combination" | "mixed" | "混合肌" | "混合性" => Ok(SkinType::Combination),
            "sensitive" | "敏感肌" | "敏感性" => Ok(SkinType::Sensitive),
            _ => Err(format!(
                "Unknown skin type: {}. Use dry, oily, combination, or sensitive",
                s
            )),
        }
    }
}

/// 顧客情報
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub name: String,
    pub skin_type: SkinType,
    /// 既往歴・特徴（肝斑、日光黒子、PIH など）
    pub history: Vec<String>,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "Guest".to_string(),
            skin_type: SkinType::default(),
            history: Vec::new(),
        }
    }
}
