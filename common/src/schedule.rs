//! 週次スケジュール解決
//!
//! 選択された施術ごとに「今週実施」「延期」「予定外」を判定する。
//!
//! ## 判定ルール
//! 1. 推奨頻度から今週が予定週かを判定（例: 4週ごと → week % 4 == 0）
//! 2. 排他ルールは双方向に適用し、間隔は宣言された大きい方を使う
//! 3. 同じ週の衝突はカタログ順で先の施術が枠を取り、後の施術は延期
//! 4. 履歴はサイクル（weeks_per_cycle 週）の先頭から再生し、サイクル境界でリセット
//! 5. 範囲指定（every 3-4 weeks）は上限週が予定週。延期されたら幅（max - min 週）の
//!    範囲内で空いている最初の週に繰り越す
//!
//! 延期された施術は「実施済み」に数えない。固定頻度の施術は繰り越さない。

use crate::catalog::{ProtocolCatalog, TreatmentProtocol};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// サイクル週数のデフォルト（8週計画）
pub const DEFAULT_WEEKS_PER_CYCLE: u32 = 8;

/// 週ごとの判定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ScheduleStatus {
    /// 今週実施
    Immediate,
    /// 排他ルールにより延期
    Deferred {
        #[serde(rename = "conflictWith")]
        conflict_with: String,
    },
    /// 今週は予定週ではない
    NotDue,
}

impl ScheduleStatus {
    pub fn is_immediate(&self) -> bool {
        matches!(self, ScheduleStatus::Immediate)
    }
}

/// スケジュールエントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub protocol: String,
    pub week: u32,
    #[serde(flatten)]
    pub status: ScheduleStatus,
    /// 実施時の準備事項
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
}

/// 1週分のスケジュール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSchedule {
    pub week: u32,
    pub entries: Vec<ScheduleEntry>,
}

/// サイクル全体の計画
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlan {
    pub weeks_per_cycle: u32,
    pub weeks: Vec<WeekSchedule>,
}

/// 指定週のスケジュールを解決
///
/// `selected` の並び順は無視し、カタログ順で処理する。重複は1件にまとめる。
pub fn resolve<S: AsRef<str>>(
    selected: &[S],
    catalog: &ProtocolCatalog,
    week_index: u32,
    weeks_per_cycle: u32,
) -> Result<Vec<ScheduleEntry>> {
    if weeks_per_cycle == 0 {
        return Err(Error::InvalidCycle);
    }

    let mut replay = Replay::new(select(selected, catalog)?, catalog);
    let cycle_start = week_index - week_index % weeks_per_cycle;

    let mut entries = Vec::new();
    for week in cycle_start..=week_index {
        entries = replay.place_week(week);
    }

    Ok(entries)
}

/// サイクル全体（0 .. weeks_per_cycle）の計画を作成
pub fn plan<S: AsRef<str>>(
    selected: &[S],
    catalog: &ProtocolCatalog,
    weeks_per_cycle: u32,
) -> Result<SchedulePlan> {
    if weeks_per_cycle == 0 {
        return Err(Error::InvalidCycle);
    }

    let mut replay = Replay::new(select(selected, catalog)?, catalog);
    let weeks = (0..weeks_per_cycle)
        .map(|week| WeekSchedule {
            week,
            entries: replay.place_week(week),
        })
        .collect();

    Ok(SchedulePlan { weeks_per_cycle, weeks })
}

/// 選択施術をカタログ順に並べる（未知の名前は `UnknownProtocol`）
fn select<'a, S: AsRef<str>>(
    selected: &[S],
    catalog: &'a ProtocolCatalog,
) -> Result<Vec<&'a TreatmentProtocol>> {
    for name in selected {
        catalog.require(name.as_ref())?;
    }

    Ok(catalog
        .iter()
        .filter(|p| selected.iter().any(|s| s.as_ref() == p.name))
        .collect())
}

/// サイクル内の実施履歴を再生する
struct Replay<'a> {
    protocols: Vec<&'a TreatmentProtocol>,
    catalog: &'a ProtocolCatalog,
    /// 各施術が最後に「今週実施」となった週
    last_placed: Vec<Option<u32>>,
    /// 延期中の範囲指定施術の元の予定週
    pending: Vec<Option<u32>>,
}

impl<'a> Replay<'a> {
    fn new(protocols: Vec<&'a TreatmentProtocol>, catalog: &'a ProtocolCatalog) -> Self {
        let last_placed = vec![None; protocols.len()];
        let pending = vec![None; protocols.len()];
        Self {
            protocols,
            catalog,
            last_placed,
            pending,
        }
    }

    fn place_week(&mut self, week: u32) -> Vec<ScheduleEntry> {
        let mut entries = Vec::with_capacity(self.protocols.len());

        for (i, protocol) in self.protocols.iter().enumerate() {
            let frequency = protocol.frequency;
            if frequency.is_due(week) {
                self.pending[i] = None;
            }
            let carried = self.pending[i].filter(|&due| week - due <= frequency.slack_weeks());

            let status = if !frequency.is_due(week) && carried.is_none() {
                self.pending[i] = None;
                ScheduleStatus::NotDue
            } else {
                match self.conflict(i, week) {
                    Some(other) => {
                        if frequency.slack_weeks() > 0 {
                            self.pending[i] = carried.or(Some(week));
                        }
                        ScheduleStatus::Deferred {
                            conflict_with: other.to_string(),
                        }
                    }
                    None => {
                        self.last_placed[i] = Some(week);
                        self.pending[i] = None;
                        ScheduleStatus::Immediate
                    }
                }
            };

            let preparation = if status.is_immediate() {
                protocol.preparation.clone()
            } else {
                None
            };

            entries.push(ScheduleEntry {
                protocol: protocol.name.clone(),
                week,
                status,
                preparation,
            });
        }

        entries
    }

    /// 最小間隔内に実施された排他相手（カタログ順で最初のもの）
    fn conflict(&self, i: usize, week: u32) -> Option<&'a str> {
        let name = &self.protocols[i].name;

        self.protocols
            .iter()
            .zip(&self.last_placed)
            .enumerate()
            .filter(|(j, _)| *j != i)
            .find_map(|(_, (&other, last))| {
                let interval = self.catalog.conflict_interval(name, &other.name)?;
                let last = (*last)?;
                (week - last < interval).then_some(other.name.as_str())
            })
    }
}
