//! Markdown report assembly and file output

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::commentary::{self, Commentaries};
use crate::error::Result;
use crate::model::Symbol;
use crate::prompts::{Language, PromptKind};

struct Labels {
    title: &'static str,
    generated: &'static str,
    subjects: &'static str,
    summary: &'static str,
    disclaimer: &'static str,
}

const EN: Labels = Labels {
    title: "📈 AI Investment Analysis Report",
    generated: "Generated",
    subjects: "Subjects",
    summary: "📊 Data Summary",
    disclaimer: "Disclaimer: this report was generated automatically by AI and is for reference only. \
                 All investments carry risk; evaluate carefully before making any decision.",
};

const ZH_TW: Labels = Labels {
    title: "📈 AI 投資分析報告",
    generated: "生成日期",
    subjects: "分析標的",
    summary: "📊 數據摘要",
    disclaimer: "免責聲明：本報告由 AI 自動生成，僅供參考。投資必有風險，決策前請務必謹慎評估。",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::English => &EN,
        Language::TraditionalChinese => &ZH_TW,
    }
}

/// Downloadable analysis report
#[derive(Debug, Clone)]
pub struct Report {
    generated_at: DateTime<Local>,
    language: Language,
    subjects: Vec<Symbol>,
    summary: String,
    commentaries: Commentaries,
    capital: u64,
}

impl Report {
    /// Subjects are listed in the header once each, in first-seen order.
    pub fn new(
        subjects: &[Symbol],
        summary: impl Into<String>,
        commentaries: Commentaries,
        language: Language,
        capital: u64,
    ) -> Self {
        let mut unique: Vec<Symbol> = Vec::with_capacity(subjects.len());
        for symbol in subjects {
            if !unique.contains(symbol) {
                unique.push(symbol.clone());
            }
        }

        Self {
            generated_at: Local::now(),
            language,
            subjects: unique,
            summary: summary.into(),
            commentaries,
            capital,
        }
    }

    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn subjects(&self) -> &[Symbol] {
        &self.subjects
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    /// `Stock_Report_<YYYYMMDD_HHMM>.md`
    pub fn file_name(&self) -> String {
        self.generated_at
            .format("Stock_Report_%Y%m%d_%H%M.md")
            .to_string()
    }

    pub fn render(&self) -> String {
        let l = labels(self.language);
        let subjects = self
            .subjects
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        out.push_str(&format!("# {}\n", l.title));
        out.push_str(&format!(
            "**{}**: {}\n",
            l.generated,
            self.generated_at.format("%Y-%m-%d %H:%M")
        ));
        out.push_str(&format!("**{}**: {}\n", l.subjects, subjects));

        for kind in PromptKind::ALL {
            let text = self
                .commentaries
                .get(kind)
                .text_or(commentary::placeholder(kind, self.language));
            out.push_str(&format!(
                "\n---\n\n## {}\n{}\n",
                commentary::title(kind, self.language, self.capital),
                text.trim_end()
            ));
        }

        out.push_str(&format!(
            "\n---\n\n## {}\n```text\n{}```\n",
            l.summary, self.summary
        ));
        out.push_str(&format!("\n---\n*{}*\n", l.disclaimer));
        out
    }

    /// Write the rendered report into `dir`, creating it if needed
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.render())?;
        info!(path = %path.display(), "Report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::Commentary;
    use chrono::TimeZone;

    fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| Symbol::new(n).unwrap()).collect()
    }

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 1, 9, 5, 0).unwrap()
    }

    fn report(subjects: &[&str], language: Language) -> Report {
        Report::new(
            &symbols(subjects),
            "Stock: 2330.TW\n---\n",
            Commentaries {
                ranking: Commentary::Generated("Ranking text".into()),
                allocation: Commentary::unavailable("quota"),
            },
            language,
            1_000_000,
        )
        .with_timestamp(timestamp())
    }

    fn header_subjects(rendered: &str, label: &str) -> Vec<String> {
        let prefix = format!("**{label}**: ");
        rendered
            .lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .map(|list| list.split(", ").map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            report(&["2330.TW"], Language::English).file_name(),
            "Stock_Report_20250701_0905.md"
        );
    }

    #[test]
    fn test_header_lists_each_subject_once() {
        let rendered = report(
            &["2330.TW", "2317.TW", "2330.TW", "2454.TW"],
            Language::TraditionalChinese,
        )
        .render();

        let listed = header_subjects(&rendered, "分析標的");
        assert_eq!(listed, vec!["2330.TW", "2317.TW", "2454.TW"]);
    }

    #[test]
    fn test_render_sections() {
        let rendered = report(&["2330.TW"], Language::TraditionalChinese).render();

        assert!(rendered.starts_with("# 📈 AI 投資分析報告\n"));
        assert!(rendered.contains("**生成日期**: 2025-07-01 09:05"));
        assert!(rendered.contains("## 🔍 綜合實力排名\nRanking text"));
        assert!(rendered.contains("## 💰 100 萬台幣投資建議\n建議暫時無法生成"));
        assert!(rendered.contains("```text\nStock: 2330.TW\n---\n```"));
        assert!(rendered.contains("免責聲明"));
    }

    #[test]
    fn test_english_placeholder() {
        let rendered = report(&["2330.TW"], Language::English).render();
        assert!(rendered.contains("Recommendation is temporarily unavailable."));
        assert_eq!(header_subjects(&rendered, "Subjects"), vec!["2330.TW"]);
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports");
        let report = report(&["2330.TW", "2317.TW"], Language::English);

        let path = report.write_to(&target).unwrap();

        assert_eq!(path, target.join("Stock_Report_20250701_0905.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, report.render());
    }
}
