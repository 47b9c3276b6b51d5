//! Skin AI Common Library
//!
//! CLIとバッチ処理で共有される型と施術ルールエンジン
//!
//! - 重症度プロファイルの検証
//! - 施術カタログの参照と関連度評価
//! - 排他ルール付きの週次スケジュール解決
//! - 文献ストア

pub mod types;
pub mod error;
pub mod frequency;
pub mod citation;
pub mod catalog;
pub mod evaluator;
pub mod schedule;
pub mod report;

pub use types::{ClientInfo, Metric, SeverityProfile, SkinType};
pub use error::{Error, Result};
pub use frequency::Frequency;
pub use citation::{Citation, CitationStore};
pub use catalog::{Category, ExclusionRule, ProtocolCatalog, TreatmentProtocol};
pub use evaluator::{evaluate, Recommendation, RecommendationSet, DEFAULT_RELEVANCE_THRESHOLD};
pub use schedule::{plan, resolve, ScheduleEntry, SchedulePlan, ScheduleStatus, WeekSchedule, DEFAULT_WEEKS_PER_CYCLE};
pub use report::{build_report, AnalysisReport, AnalysisRequest, ReportOptions, ReportWarning};
