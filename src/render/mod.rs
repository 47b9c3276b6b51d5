//! テキスト出力
//!
//! レポート・スケジュール・カタログを端末表示用の文字列にする。
//! 判定ロジックは持たない（common のスナップショットを読むだけ）。

use crate::intake::PhotoInfo;
use serde::Serialize;
use skin_ai_common::report::{PrognosisKind, ResolvedCitation};
use skin_ai_common::{
    AnalysisReport, CitationStore, ProtocolCatalog, ScheduleEntry, SchedulePlan, ScheduleStatus,
};
use std::fmt;

/// analyze の JSON 出力
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput<'a> {
    pub fingerprint: &'a str,
    pub photo: &'a PhotoInfo,
    pub report: &'a AnalysisReport,
}

fn display_name<'a>(catalog: &'a ProtocolCatalog, name: &'a str) -> &'a str {
    catalog
        .get(name)
        .map(|p| p.display_name.as_str())
        .unwrap_or(name)
}

/// 判定の表示文言
pub fn status_label(entry: &ScheduleEntry, catalog: &ProtocolCatalog) -> String {
    match &entry.status {
        ScheduleStatus::Immediate => match &entry.preparation {
            Some(prep) => format!("⚠️ 今週実施（{}）", prep),
            None => "✅ 今週実施".to_string(),
        },
        ScheduleStatus::Deferred { conflict_with } => {
            format!("❌ 延期（{} と間隔を空ける）", display_name(catalog, conflict_with))
        }
        ScheduleStatus::NotDue => "- 予定週ではない".to_string(),
    }
}

fn citation_refs(citations: &[ResolvedCitation]) -> String {
    citations
        .iter()
        .map(|c| {
            if c.missing {
                format!("[{}: 文献なし]", c.id)
            } else {
                format!("[{}]", c.id)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 解析レポートの端末表示
pub struct ReportText<'a> {
    pub report: &'a AnalysisReport,
    pub photo: &'a PhotoInfo,
    pub fingerprint: &'a str,
    pub catalog: &'a ProtocolCatalog,
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let client = &report.client;

        writeln!(f, "🧬 肌光学分析・施術プラン")?;
        write!(f, "対象: {} | 肌質: {}", client.name, client.skin_type.label())?;
        if !client.history.is_empty() {
            write!(f, " | 既往: {}", client.history.join(", "))?;
        }
        writeln!(f)?;

        let photo = self.photo;
        write!(f, "写真: {} ({}x{})", photo.file_name, photo.width, photo.height)?;
        if let Some(date) = &photo.date {
            write!(f, " 撮影 {}", date)?;
        }
        writeln!(f)?;
        writeln!(f, "カタログ: {}\n", self.fingerprint)?;

        writeln!(f, "### 1. 皮膚測定データ")?;
        for m in &report.metrics {
            writeln!(f, "- {}: {}/100 ({})", m.label, m.value, m.note)?;
        }
        writeln!(f)?;

        writeln!(f, "### 2. 推奨施術（関連度 > {}）", report.threshold)?;
        if report.recommendations.is_empty() {
            writeln!(f, "閾値を超える指標はありません。")?;
        }
        for rec in &report.recommendations {
            writeln!(
                f,
                "{}. {} [{}] 関連度 {} ({})",
                rec.rank,
                rec.display_name,
                rec.category,
                rec.relevance,
                rec.primary_metric.label()
            )?;
            writeln!(f, "   機序: {}", rec.mechanism)?;
            writeln!(f, "   頻度: {}", rec.frequency)?;
            if !rec.citations.is_empty() {
                writeln!(f, "   文献: {}", citation_refs(&rec.citations))?;
            }
        }
        writeln!(f)?;

        writeln!(
            f,
            "### 3. 今週の施術（第{}週 / {}週サイクル）",
            report.week, report.weeks_per_cycle
        )?;
        write!(f, "{}", ScheduleText { entries: &report.schedule, catalog: self.catalog })?;
        writeln!(f)?;

        writeln!(f, "### 4. 予後")?;
        for note in &report.prognosis {
            let heading = match note.kind {
                PrognosisKind::Untreated => "未処置の場合",
                PrognosisKind::Treated => "全施術完了後",
            };
            writeln!(f, "- {}: {} {}", heading, note.text, citation_refs(&note.citations))?;
        }

        let mut cited: Vec<&ResolvedCitation> = Vec::new();
        for c in report
            .recommendations
            .iter()
            .flat_map(|r| &r.citations)
            .chain(report.prognosis.iter().flat_map(|p| &p.citations))
        {
            if !c.missing && !cited.iter().any(|seen| seen.id == c.id) {
                cited.push(c);
            }
        }
        if !cited.is_empty() {
            writeln!(f, "\n### 文献")?;
            for c in cited {
                writeln!(f, "[{}] {} : {}", c.id, c.source, c.summary)?;
            }
        }

        if report.has_warnings() {
            writeln!(f, "\n### 警告")?;
            for w in &report.warnings {
                writeln!(f, "- {}", w)?;
            }
        }

        Ok(())
    }
}

/// 1週分の判定表
pub struct ScheduleText<'a> {
    pub entries: &'a [ScheduleEntry],
    pub catalog: &'a ProtocolCatalog,
}

impl fmt::Display for ScheduleText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "（対象施術なし）");
        }

        for entry in self.entries {
            let frequency = self
                .catalog
                .get(&entry.protocol)
                .map(|p| p.frequency.to_string())
                .unwrap_or_default();
            writeln!(
                f,
                "- {} | {} | {}",
                display_name(self.catalog, &entry.protocol),
                frequency,
                status_label(entry, self.catalog)
            )?;
        }
        Ok(())
    }
}

/// サイクル全体のタイムライン
pub struct PlanText<'a> {
    pub plan: &'a SchedulePlan,
    pub catalog: &'a ProtocolCatalog,
}

impl fmt::Display for PlanText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🗓️ 統合施術タイムライン（{}週計画）", self.plan.weeks_per_cycle)?;
        for week in &self.plan.weeks {
            writeln!(f, "\n第{}週", week.week)?;
            write!(f, "{}", ScheduleText { entries: &week.entries, catalog: self.catalog })?;
        }
        Ok(())
    }
}

/// 施術カタログ一覧
pub struct CatalogText<'a> {
    pub catalog: &'a ProtocolCatalog,
    pub citations: &'a CitationStore,
    pub show_citations: bool,
}

impl fmt::Display for CatalogText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.catalog.iter().enumerate() {
            let targets = p
                .target_metrics
                .iter()
                .map(|m| m.label())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{}. {} ({}) [{}]", i + 1, p.display_name, p.name, p.category)?;
            writeln!(f, "   対象: {}", targets)?;
            writeln!(f, "   頻度: {}", p.frequency)?;
            for rule in &p.exclusions {
                writeln!(
                    f,
                    "   排他: {} と {}週以上あける",
                    display_name(self.catalog, &rule.protocol),
                    rule.min_interval_weeks
                )?;
            }
            if let Some(prep) = &p.preparation {
                writeln!(f, "   準備: {}", prep)?;
            }
            if !p.citations.is_empty() {
                writeln!(f, "   文献: {}", p.citations.join(", "))?;
            }
        }

        if self.show_citations {
            writeln!(f, "\n文献一覧")?;
            for c in self.citations.iter() {
                writeln!(f, "[{}] {} : {}", c.id, c.source, c.summary)?;
            }
        }
        Ok(())
    }
}

pub fn render_report(
    report: &AnalysisReport,
    photo: &PhotoInfo,
    fingerprint: &str,
    catalog: &ProtocolCatalog,
) -> String {
    ReportText { report, photo, fingerprint, catalog }.to_string()
}

pub fn render_schedule(entries: &[ScheduleEntry], catalog: &ProtocolCatalog) -> String {
    ScheduleText { entries, catalog }.to_string()
}

pub fn render_plan(plan: &SchedulePlan, catalog: &ProtocolCatalog) -> String {
    PlanText { plan, catalog }.to_string()
}

pub fn render_catalog(catalog: &ProtocolCatalog, citations: &CitationStore, show_citations: bool) -> String {
    CatalogText { catalog, citations, show_citations }.to_string()
}
