use clap::{Args, Parser, Subcommand};
use skin_ai_common::SkinType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skin-ai")]
#[command(about = "肌画像診断・施術プラン作成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 施術カタログJSON（設定より優先）
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// 文献JSON（設定より優先）
    #[arg(long, global = true)]
    pub citations: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真と測定値から施術プランを作成
    Analyze {
        /// 検査写真（jpg/png）
        #[arg(short, long, required = true)]
        photo: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        week: WeekArgs,

        /// 関連度の閾値（0-100、設定より優先）
        #[arg(short, long)]
        threshold: Option<i64>,

        /// 顧客名
        #[arg(long, default_value = "Guest")]
        name: String,

        /// 肌質 (dry/oily/combination/sensitive)
        #[arg(long, default_value = "combination")]
        skin_type: SkinType,

        /// 既往歴・特徴（複数指定可）
        #[arg(long)]
        history: Vec<String>,

        /// 出力形式 (text/json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 指定週の施術スケジュールを判定
    Schedule {
        /// 施術名（カタログの name）
        #[arg(required = true)]
        protocols: Vec<String>,

        #[command(flatten)]
        week: WeekArgs,

        /// 出力形式 (text/json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// サイクル全体のタイムラインを表示
    Plan {
        /// 施術名（カタログの name）
        #[arg(required = true)]
        protocols: Vec<String>,

        /// 出力形式 (text/json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// 施術カタログを表示
    Catalog {
        /// 文献一覧も表示
        #[arg(long)]
        list_citations: bool,
    },

    /// リクエスト配列（JSON）を一括評価
    Batch {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 関連度の閾値を設定
        #[arg(long)]
        set_threshold: Option<i64>,

        /// サイクル週数を設定
        #[arg(long)]
        set_weeks: Option<u32>,

        /// 施術カタログJSONを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 重症度の入力（ファイル or 個別指定）
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// 重症度JSONファイル（{"surfaceSpots":75, ...}）
    #[arg(long, conflicts_with_all = ["surface_spots", "redness", "deep_melanin", "dullness"])]
    pub profile: Option<PathBuf>,

    /// 表層斑点 (0-100)
    #[arg(long, allow_hyphen_values = true)]
    pub surface_spots: Option<i64>,

    /// 炎症性発赤 (0-100)
    #[arg(long, allow_hyphen_values = true)]
    pub redness: Option<i64>,

    /// 深層メラニン (0-100)
    #[arg(long, allow_hyphen_values = true)]
    pub deep_melanin: Option<i64>,

    /// 角質肥厚 (0-100)
    #[arg(long, allow_hyphen_values = true)]
    pub dullness: Option<i64>,
}

/// 週番号の指定
#[derive(Args, Debug, Clone, Default)]
pub struct WeekArgs {
    /// 週番号（0始まり）
    #[arg(short, long, conflicts_with = "start_date")]
    pub week: Option<u32>,

    /// 施術開始日 (YYYY-MM-DD)。今日までの経過週を週番号にする
    #[arg(long)]
    pub start_date: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("skin-ai").chain(args.iter().copied()))
    }

    #[test]
    fn test_analyze_with_metrics() {
        let cli = parse(&[
            "analyze", "-p", "face.jpg",
            "--surface-spots", "75", "--redness", "60", "--deep-melanin", "85", "--dullness", "40",
            "--week", "4", "--format", "json",
        ])
        .expect("引数解析失敗");

        match cli.command {
            Commands::Analyze { profile, week, format, name, skin_type, .. } => {
                assert_eq!(profile.redness, Some(60));
                assert!(profile.profile.is_none());
                assert_eq!(week.week, Some(4));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(name, "Guest");
                assert_eq!(skin_type, SkinType::Combination);
            }
            _ => panic!("analyze 以外に解析された"),
        }
    }

    #[test]
    fn test_profile_file_conflicts_with_metric_flags() {
        let err = parse(&["analyze", "-p", "face.jpg", "--profile", "p.json", "--redness", "60"])
            .err()
            .expect("--profile と個別指定は同時に使えない");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_week_conflicts_with_start_date() {
        let err = parse(&["schedule", "ipl", "--week", "2", "--start-date", "2026-01-01"])
            .err()
            .expect("--week と --start-date は同時に使えない");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_analyze_requires_photo() {
        let err = parse(&["analyze", "--profile", "p.json"]).err().expect("写真は必須");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&["catalog", "--list-citations", "--catalog", "c.json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.catalog, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Catalog { list_citations: true }));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(parse(&["plan", "ipl", "--format", "xml"]).is_err());
    }
}
