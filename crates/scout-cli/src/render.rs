//! Terminal rendering of screening results, analysis cards and commentary

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use scout_stock::commentary::{self, busy_notice};
use scout_stock::model::format_optional;
use scout_stock::{
    ChartPoint, Commentaries, Commentary, Language, PromptKind, ScreeningResult, SymbolAnalysis,
};

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Scale `values` onto block characters within `[min, max]`; gaps render blank
fn spark(values: impl Iterator<Item = Option<f64>>, min: f64, max: f64) -> String {
    let span = max - min;
    values
        .map(|v| match v {
            Some(v) if span > 0.0 => {
                let idx = ((v - min) / span * (LEVELS.len() - 1) as f64).round() as usize;
                LEVELS[idx.min(LEVELS.len() - 1)]
            }
            Some(_) => LEVELS[LEVELS.len() / 2],
            None => ' ',
        })
        .collect()
}

/// Two aligned sparklines, close over SMA, sharing one scale
pub fn sparkline(chart: &[ChartPoint]) -> (String, String) {
    let all = chart
        .iter()
        .flat_map(|p| std::iter::once(p.close).chain(p.sma));
    let (min, max) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    (
        spark(chart.iter().map(|p| Some(p.close)), min, max),
        spark(chart.iter().map(|p| p.sma), min, max),
    )
}

pub fn screening(result: &ScreeningResult, language: Language) -> String {
    let mut out = String::new();
    let picks = result
        .selected
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    match language {
        Language::English => {
            out.push_str(&format!(
                "Scanned {} symbols, {} passed.\n",
                result.sampled.len(),
                result.passed.len()
            ));
            if result.used_fallback {
                out.push_str("Nothing passed the filter; using the default pair.\n");
            }
            out.push_str(&format!("✅ Scan complete! Watch list for today: {picks}\n"));
        }
        Language::TraditionalChinese => {
            out.push_str(&format!(
                "已掃描 {} 檔，{} 檔符合條件。\n",
                result.sampled.len(),
                result.passed.len()
            ));
            if result.used_fallback {
                out.push_str("沒有標的符合條件，改用預設組合。\n");
            }
            out.push_str(&format!("✅ 掃描完成！今日推薦關注：{picks}\n"));
        }
    }
    out
}

/// One table row per symbol, followed by each symbol's sparkline
pub fn cards(analyses: &[SymbolAnalysis], language: Language) -> String {
    let header = match language {
        Language::English => ["Symbol", "Close", "RSI", "Trend", "Stop", "Target"],
        Language::TraditionalChinese => ["代碼", "現價", "RSI", "趨勢", "止損", "止盈"],
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h)));

    for a in analyses {
        table.add_row(vec![
            Cell::new(a.symbol.as_str()),
            Cell::new(format!("{:.0}", a.close)).set_alignment(CellAlignment::Right),
            Cell::new(format_optional(a.rsi, 1)).set_alignment(CellAlignment::Right),
            Cell::new(a.trend.label(language)),
            Cell::new(format_optional(a.risk.map(|r| r.stop_loss), 1))
                .set_alignment(CellAlignment::Right),
            Cell::new(format_optional(a.risk.map(|r| r.take_profit), 1))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    let mut out = format!("{table}\n");
    for a in analyses {
        let (close, sma) = sparkline(&a.chart);
        out.push_str(&format!(
            "\n{} ({} bars)\n  close {close}\n  sma   {sma}\n",
            a.symbol,
            a.chart.len()
        ));
    }
    out
}

fn disabled_notice(language: Language) -> &'static str {
    match language {
        Language::English => "Commentary disabled (--no-commentary).",
        Language::TraditionalChinese => "已停用 AI 評論 (--no-commentary)。",
    }
}

/// Both commentaries under their headings. A missing one shows the busy
/// notice, or the disabled notice when no provider is configured.
pub fn commentaries(
    commentaries: &Commentaries,
    language: Language,
    capital: u64,
    enabled: bool,
) -> String {
    let mut out = String::new();
    for kind in PromptKind::ALL {
        let c = commentaries.get(kind);
        out.push_str(&format!(
            "\n== {} ==\n",
            commentary::title(kind, language, capital)
        ));
        if c.is_generated() {
            out.push_str(c.text_or(""));
        } else if enabled {
            out.push_str(busy_notice(kind, language));
        } else {
            out.push_str(disabled_notice(language));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, close: f64, sma: Option<f64>) -> ChartPoint {
        ChartPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            close,
            sma,
        }
    }

    #[test]
    fn test_sparkline_scales_to_shared_range() {
        let chart = [
            point(1, 10.0, None),
            point(2, 15.0, Some(12.0)),
            point(3, 20.0, Some(14.0)),
        ];
        let (close, sma) = sparkline(&chart);
        assert_eq!(close.chars().count(), 3);
        assert_eq!(close.chars().next(), Some('▁'));
        assert_eq!(close.chars().last(), Some('█'));
        assert_eq!(sma.chars().next(), Some(' '));
    }

    #[test]
    fn test_flat_sparkline() {
        let chart = [point(1, 5.0, Some(5.0)), point(2, 5.0, Some(5.0))];
        let (close, _) = sparkline(&chart);
        assert_eq!(close, "▅▅");
    }

    #[test]
    fn test_missing_commentary_notices() {
        let commentaries = Commentaries {
            ranking: Commentary::unavailable("commentary disabled"),
            allocation: Commentary::Generated("Keep 15% cash".to_string()),
        };

        let disabled = commentaries_text(&commentaries, false);
        assert!(disabled.contains("Commentary disabled"));
        assert!(!disabled.contains("busy"));
        assert!(disabled.contains("Keep 15% cash"));

        let busy = commentaries_text(&commentaries, true);
        assert!(busy.contains("The generation service is busy"));
        assert!(!busy.contains("Commentary disabled"));
    }

    fn commentaries_text(c: &Commentaries, enabled: bool) -> String {
        commentaries(c, Language::English, 1_000_000, enabled)
    }
}
