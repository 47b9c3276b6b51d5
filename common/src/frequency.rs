//! 施術頻度
//!
//! "every 4 weeks" / "每 3-4 週 1 次" / "2x weekly" などの表記を解析し、
//! 週番号に対して施術予定週かどうかを判定する。

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 推奨頻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    /// 週 n 回（毎週が予定週）
    TimesPerWeek(u32),
    /// n 週ごと
    EveryWeeks(u32),
    /// min-max 週ごと（上限側で予定を組む）
    EveryWeeksRange(u32, u32),
}

impl Frequency {
    /// 予定の間隔（週）
    pub fn period_weeks(&self) -> u32 {
        match *self {
            Frequency::TimesPerWeek(_) => 1,
            Frequency::EveryWeeks(n) => n,
            Frequency::EveryWeeksRange(_, max) => max,
        }
    }

    /// 予定週から後ろにずらせる週数（範囲指定の幅）
    pub fn slack_weeks(&self) -> u32 {
        match *self {
            Frequency::EveryWeeksRange(min, max) => max - min,
            _ => 0,
        }
    }

    /// 指定週が予定週か
    pub fn is_due(&self, week: u32) -> bool {
        week % self.period_weeks() == 0
    }

    /// 頻度表記を解析
    pub fn parse(text: &str) -> Result<Self> {
        lazy_static::lazy_static! {
            // every 3-4 weeks / 每 3-4 週 1 次
            static ref RANGE_RE: Regex =
                Regex::new(r"(?i)^(?:every|每)\s*(\d+)\s*[-~〜]\s*(\d+)\s*(?:weeks?|週)(?:\s*1\s*次)?$").unwrap();
            // every 4 weeks / 每 4 週 1 次
            static ref EVERY_RE: Regex =
                Regex::new(r"(?i)^(?:every|每)\s*(\d+)\s*(?:weeks?|週)(?:\s*1\s*次)?$").unwrap();
            // 2x weekly / 2 times per week / 每週 2 次
            static ref TIMES_RE: Regex =
                Regex::new(r"(?i)^(?:(\d+)\s*(?:x|times)\s*(?:weekly|per\s+week|a\s+week)|每週\s*(\d+)\s*次)$").unwrap();
        }

        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "weekly" | "every week" | "每週" => return Ok(Frequency::EveryWeeks(1)),
            "twice weekly" | "twice a week" => return Ok(Frequency::TimesPerWeek(2)),
            _ => {}
        }

        let frequency = if let Some(cap) = RANGE_RE.captures(trimmed) {
            let min = parse_count(&cap[1], text)?;
            let max = parse_count(&cap[2], text)?;
            if min > max {
                return Err(Error::InvalidFrequency(format!("{} (range is reversed)", text)));
            }
            if min == max {
                Frequency::EveryWeeks(min)
            } else {
                Frequency::EveryWeeksRange(min, max)
            }
        } else if let Some(cap) = EVERY_RE.captures(trimmed) {
            Frequency::EveryWeeks(parse_count(&cap[1], text)?)
        } else if let Some(cap) = TIMES_RE.captures(trimmed) {
            let count = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str()).unwrap_or("0");
            Frequency::TimesPerWeek(parse_count(count, text)?)
        } else {
            return Err(Error::InvalidFrequency(text.to_string()));
        };

        Ok(frequency)
    }
}

fn parse_count(digits: &str, text: &str) -> Result<u32> {
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidFrequency(format!("{} (count must be positive)", text))),
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::TimesPerWeek(n) => write!(f, "{}x weekly", n),
            Frequency::EveryWeeks(1) => write!(f, "weekly"),
            Frequency::EveryWeeks(n) => write!(f, "every {} weeks", n),
            Frequency::EveryWeeksRange(min, max) => write!(f, "every {}-{} weeks", min, max),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Frequency::parse(s)
    }
}

impl TryFrom<String> for Frequency {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        Frequency::parse(&text)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.to_string()
    }
}
