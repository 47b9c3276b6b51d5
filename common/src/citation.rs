//! 文献ストア
//!
//! 施術メカニズムや予後の根拠となる文献を ID で引く。
//! 起動時に一度だけ構築し、以降は読み取り専用。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 文献
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub id: String,
    /// 出典（著者・誌名・年）
    pub source: String,
    /// 要旨
    pub summary: String,
}

/// 文献ストア
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Citation>", into = "Vec<Citation>")]
pub struct CitationStore {
    entries: Vec<Citation>,
}

impl CitationStore {
    /// 文献リストから構築（ID重複はエラー）
    pub fn new(entries: Vec<Citation>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!("citation #{} has an empty id", i + 1)));
            }
            if entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(Error::InvalidCatalog(format!("duplicate citation id: {}", entry.id)));
            }
        }
        Ok(Self { entries })
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<Citation> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// ID で文献を引く
    pub fn lookup(&self, id: &str) -> Result<&Citation> {
        self.entries
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::CitationNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 組み込み文献
    pub fn builtin() -> Self {
        let cite = |id: &str, source: &str, summary: &str| Citation {
            id: id.to_string(),
            source: source.to_string(),
            summary: summary.to_string(),
        };

        Self {
            entries: vec![
                cite(
                    "2281",
                    "Mima et al., J. Dermatol. (2025)",
                    "550nm 光照射が MITF 転写因子とチロシナーゼを抑制し、メラニン生成を減少させる",
                ),
                cite(
                    "2341",
                    "Mima et al., J. Dermatol. (2025)",
                    "毎日の照射でも細胞生存率に影響なし",
                ),
                cite(
                    "2822",
                    "Mima et al., J. Dermatol. (2025)",
                    "LED 光療法 8 週間で Melanin Index が有意に低下し、L* 値が上昇",
                ),
                cite(
                    "1961",
                    "Pigment Cell Res. (2000)",
                    "血管内皮由来 ET-1 がメラノサイトを活性化する。血管閉塞で供給を遮断できる",
                ),
                cite(
                    "3173",
                    "Pigment Cell Res. (2000)",
                    "UVB 誘導による c-KIT / EDNRB 受容体の高発現がメラノサイトの感受性を高める",
                ),
                cite(
                    "506",
                    "Serre et al., Int. J. Cosmet. Sci. (2018)",
                    "オートファジー促進がメラノソーム分解の主要経路である",
                ),
                cite(
                    "502",
                    "Serre et al., Int. J. Cosmet. Sci. (2018)",
                    "表皮ターンオーバー促進でメラニン含有角化細胞の脱落が加速する",
                ),
            ],
        }
    }
}

impl TryFrom<Vec<Citation>> for CitationStore {
    type Error = Error;

    fn try_from(entries: Vec<Citation>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<CitationStore> for Vec<Citation> {
    fn from(store: CitationStore) -> Self {
        store.entries
    }
}
