//! CLI 引数からリクエストを組み立てる

use crate::cli::{ProfileArgs, WeekArgs};
use crate::error::{Result, SkinAiError};
use chrono::NaiveDate;
use skin_ai_common::{Metric, SeverityProfile};

impl ProfileArgs {
    /// 重症度プロファイルを構築（欠けた指標は `InvalidProfile`）
    pub fn to_profile(&self) -> Result<SeverityProfile> {
        if let Some(path) = &self.profile {
            if !path.exists() {
                return Err(SkinAiError::FileNotFound(path.display().to_string()));
            }
            let content = std::fs::read_to_string(path)?;
            return Ok(SeverityProfile::from_json(&content)?);
        }

        let require = |metric: Metric, value: Option<i64>| {
            value.ok_or_else(|| skin_ai_common::Error::InvalidProfile {
                field: metric.key().to_string(),
                reason: "missing".to_string(),
            })
        };

        Ok(SeverityProfile::new(
            require(Metric::SurfaceSpots, self.surface_spots)?,
            require(Metric::Redness, self.redness)?,
            require(Metric::DeepMelanin, self.deep_melanin)?,
            require(Metric::Dullness, self.dullness)?,
        )?)
    }
}

impl WeekArgs {
    /// 週番号を決定（--week > --start-date > 0）
    pub fn resolve(&self, today: NaiveDate) -> Result<u32> {
        if let Some(week) = self.week {
            return Ok(week);
        }

        match &self.start_date {
            Some(text) => week_since(text, today),
            None => Ok(0),
        }
    }
}

/// 開始日から today までの経過週
pub fn week_since(start: &str, today: NaiveDate) -> Result<u32> {
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
        .map_err(|e| SkinAiError::InvalidInput(format!("開始日の形式が不正です ({}): {}", start, e)))?;

    let days = (today - start).num_days();
    if days < 0 {
        return Err(SkinAiError::InvalidInput(format!("開始日が未来です: {}", start)));
    }

    Ok((days / 7) as u32)
}
