use crate::error::{Result, SkinAiError};
use serde::{Deserialize, Serialize};
use skin_ai_common::{evaluator, CitationStore, ProtocolCatalog};
use std::path::{Path, PathBuf};

const ENV_THRESHOLD: &str = "SKIN_AI_RELEVANCE_THRESHOLD";
const ENV_WEEKS: &str = "SKIN_AI_WEEKS_PER_CYCLE";
const ENV_CATALOG: &str = "SKIN_AI_CATALOG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 推奨に含める関連度の閾値（これを超える施術のみ）
    pub relevance_threshold: u8,
    /// 1サイクルの週数
    pub weeks_per_cycle: u32,
    /// 施術カタログJSON（未指定なら組み込み）
    pub catalog_path: Option<PathBuf>,
    /// 文献JSON（未指定なら組み込み）
    pub citations_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relevance_threshold: skin_ai_common::DEFAULT_RELEVANCE_THRESHOLD,
            weeks_per_cycle: skin_ai_common::DEFAULT_WEEKS_PER_CYCLE,
            catalog_path: None,
            citations_path: None,
        }
    }
}

impl Config {
    /// 設定ファイル + 環境変数から読み込み
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let config = Self::load_from(&config_path)?;
        config.with_env_overrides()
    }

    /// 指定パスから読み込み（なければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::load_unchecked_from(path)?;
        config.validate()?;
        Ok(config)
    }

    /// 値を検証せずに読み込み（config コマンドで不正値を上書きするため）
    pub fn load_unchecked_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SkinAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("skin-ai").join("config.json"))
    }

    /// 環境変数を優先
    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(ENV_THRESHOLD) {
            self.relevance_threshold = parse_env(ENV_THRESHOLD, &value)?;
        }
        if let Ok(value) = std::env::var(ENV_WEEKS) {
            self.weeks_per_cycle = parse_env(ENV_WEEKS, &value)?;
        }
        if let Ok(value) = std::env::var(ENV_CATALOG) {
            self.catalog_path = Some(PathBuf::from(value));
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        evaluator::check_threshold(self.relevance_threshold as i64)?;
        if self.weeks_per_cycle == 0 {
            return Err(skin_ai_common::Error::InvalidCycle.into());
        }
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: i64) -> Result<()> {
        self.relevance_threshold = evaluator::check_threshold(threshold)?;
        Ok(())
    }

    pub fn set_weeks_per_cycle(&mut self, weeks: u32) -> Result<()> {
        if weeks == 0 {
            return Err(skin_ai_common::Error::InvalidCycle.into());
        }
        self.weeks_per_cycle = weeks;
        Ok(())
    }

    /// 施術カタログを読み込み
    pub fn load_catalog(&self) -> Result<ProtocolCatalog> {
        match &self.catalog_path {
            Some(path) => {
                if !path.exists() {
                    return Err(SkinAiError::FileNotFound(path.display().to_string()));
                }
                tracing::debug!(path = %path.display(), "loading protocol catalog");
                Ok(ProtocolCatalog::from_file(path)?)
            }
            None => Ok(ProtocolCatalog::builtin()),
        }
    }

    /// 文献ストアを読み込み
    pub fn load_citations(&self) -> Result<CitationStore> {
        match &self.citations_path {
            Some(path) => {
                if !path.exists() {
                    return Err(SkinAiError::FileNotFound(path.display().to_string()));
                }
                tracing::debug!(path = %path.display(), "loading citation store");
                Ok(CitationStore::from_file(path)?)
            }
            None => Ok(CitationStore::builtin()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SkinAiError::Config(format!("{} の値が不正です: {}", key, value)))
}
