use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use skin_ai_common::{build_report, evaluator, schedule, AnalysisRequest, ClientInfo, ReportOptions};
use skin_ai_rust::{batch, cli, config, error, fingerprint, intake, render};
use cli::{Cli, Commands, OutputFormat};
use config::Config;
use error::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            eprintln!("✔ 結果を保存: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// 設定ファイル → 環境変数 → CLI の順に上書きした実効設定
fn load_config(catalog: Option<&Path>, citations: Option<&Path>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(path) = catalog {
        config.catalog_path = Some(path.to_path_buf());
    }
    if let Some(path) = citations {
        config.citations_path = Some(path.to_path_buf());
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let Cli { command, catalog, citations, .. } = cli;
    let load = || load_config(catalog.as_deref(), citations.as_deref());
    let today = chrono::Local::now().date_naive();

    match command {
        Commands::Analyze { photo, profile, week, threshold, name, skin_type, history, format, output } => {
            let config = load()?;
            let pb = spinner();

            // 1. 写真チェック
            pb.set_message("[1/4] 写真を確認中...");
            let photo = intake::inspect_photo(&photo)?;

            // 2. 測定値
            pb.set_message("[2/4] 測定値を検証中...");
            let profile = profile.to_profile()?;
            let week = week.resolve(today)?;
            let relevance_threshold = match threshold {
                Some(t) => evaluator::check_threshold(t)?,
                None => config.relevance_threshold,
            };

            let catalog = config.load_catalog()?;
            let citations = config.load_citations()?;

            // 3. 評価 + 4. スケジュール
            pb.set_message("[3/4] 施術を評価中...");
            let request = AnalysisRequest {
                client: ClientInfo { name, skin_type, history },
                profile,
                week,
            };
            let options = ReportOptions {
                relevance_threshold,
                weeks_per_cycle: config.weeks_per_cycle,
            };
            pb.set_message("[4/4] スケジュールを解決中...");
            let report = build_report(&request, &catalog, &citations, &options)?;
            let fingerprint = fingerprint::fingerprint(&catalog, &citations)?;
            pb.finish_and_clear();

            for warning in &report.warnings {
                tracing::warn!("{}", warning);
            }

            let content = match format {
                OutputFormat::Text => render::render_report(&report, &photo, &fingerprint, &catalog),
                OutputFormat::Json => serde_json::to_string_pretty(&render::AnalyzeOutput {
                    fingerprint: &fingerprint,
                    photo: &photo,
                    report: &report,
                })?,
            };
            write_output(&content, output.as_deref())?;
        }

        Commands::Schedule { protocols, week, format } => {
            let config = load()?;
            let catalog = config.load_catalog()?;
            let week = week.resolve(today)?;
            let entries = schedule::resolve(&protocols, &catalog, week, config.weeks_per_cycle)?;

            match format {
                OutputFormat::Text => {
                    println!("🗓️ 第{}週 / {}週サイクル\n", week, config.weeks_per_cycle);
                    print!("{}", render::render_schedule(&entries, &catalog));
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
            }
        }

        Commands::Plan { protocols, format } => {
            let config = load()?;
            let catalog = config.load_catalog()?;
            let plan = schedule::plan(&protocols, &catalog, config.weeks_per_cycle)?;

            match format {
                OutputFormat::Text => print!("{}", render::render_plan(&plan, &catalog)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
        }

        Commands::Catalog { list_citations } => {
            let config = load()?;
            let catalog = config.load_catalog()?;
            let citations = config.load_citations()?;

            for id in catalog.missing_citations(&citations) {
                tracing::warn!(id = %id, "citation referenced by catalog is missing");
            }

            println!("カタログ: {}\n", fingerprint::fingerprint(&catalog, &citations)?);
            print!("{}", render::render_catalog(&catalog, &citations, list_citations));
        }

        Commands::Batch { input, output } => {
            let config = load()?;
            eprintln!("📦 skin-ai - 一括評価\n");

            let catalog = config.load_catalog()?;
            let citations = config.load_citations()?;
            let items = batch::load_requests(&input)?;
            eprintln!("✔ {}件のリクエストを読み込み", items.len());

            let options = ReportOptions {
                relevance_threshold: config.relevance_threshold,
                weeks_per_cycle: config.weeks_per_cycle,
            };

            let pb = spinner();
            pb.set_message("評価中...");
            let outcomes = batch::evaluate_batch(&items, &catalog, &citations, &options);
            pb.finish_and_clear();

            let ok = outcomes.iter().filter(|o| o.is_ok()).count();
            let content = serde_json::to_string_pretty(&outcomes)?;
            write_output(&content, output.as_deref())?;

            eprintln!("\n✅ 完了: 成功 {}件 / 失敗 {}件", ok, outcomes.len() - ok);
        }

        // 保存済みの値が不正でも修正できるよう、実効設定は読まない
        Commands::Config { set_threshold, set_weeks, set_catalog, show } => {
            edit_config(set_threshold, set_weeks, set_catalog, show)?;
        }
    }

    Ok(())
}

/// 設定ファイルのみを編集（環境変数・CLI の上書きは保存しない）
fn edit_config(
    set_threshold: Option<i64>,
    set_weeks: Option<u32>,
    set_catalog: Option<PathBuf>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load_unchecked_from(&Config::config_path()?)?;
    let mut changed = false;

    if let Some(threshold) = set_threshold {
        config.set_threshold(threshold)?;
        println!("✔ 関連度の閾値を設定しました: {}", config.relevance_threshold);
        changed = true;
    }

    if let Some(weeks) = set_weeks {
        config.set_weeks_per_cycle(weeks)?;
        println!("✔ サイクル週数を設定しました: {}", config.weeks_per_cycle);
        changed = true;
    }

    if let Some(path) = set_catalog {
        if !path.exists() {
            return Err(error::SkinAiError::FileNotFound(path.display().to_string()));
        }
        config.catalog_path = Some(path);
        println!("✔ 施術カタログを設定しました");
        changed = true;
    }

    if changed {
        config.save()?;
    }

    if show || !changed {
        let builtin = || "組み込み".to_string();
        println!("設定:");
        println!("  関連度の閾値: {}", config.relevance_threshold);
        println!("  サイクル週数: {}", config.weeks_per_cycle);
        println!(
            "  施術カタログ: {}",
            config.catalog_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(builtin)
        );
        println!(
            "  文献: {}",
            config.citations_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(builtin)
        );
    }

    Ok(())
}
