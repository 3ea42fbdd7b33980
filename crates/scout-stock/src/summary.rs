//! Plain-text numeric summary handed to the commentary prompts and the report

use crate::analysis::SymbolAnalysis;
use crate::model::format_optional;
use crate::prompts::Language;

struct Labels {
    stock: &'static str,
    technicals: &'static str,
    close: &'static str,
    trend: &'static str,
    fundamentals: &'static str,
    pe: &'static str,
    pb: &'static str,
    revenue_growth: &'static str,
    stop_loss: &'static str,
    take_profit: &'static str,
}

const EN: Labels = Labels {
    stock: "Stock",
    technicals: "Technicals",
    close: "close",
    trend: "trend",
    fundamentals: "Fundamentals",
    pe: "P/E",
    pb: "P/B",
    revenue_growth: "revenue growth",
    stop_loss: "Suggested stop-loss",
    take_profit: "Suggested take-profit",
};

const ZH_TW: Labels = Labels {
    stock: "股票",
    technicals: "技術面",
    close: "現價",
    trend: "趨勢",
    fundamentals: "基本面",
    pe: "本益比(PE)",
    pb: "股價淨值比(PB)",
    revenue_growth: "營收成長率",
    stop_loss: "建議防守價(停損)",
    take_profit: "建議進攻價(停利)",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::English => &EN,
        Language::TraditionalChinese => &ZH_TW,
    }
}

/// Render one symbol's block, terminated by a `---` line
pub fn symbol_block(analysis: &SymbolAnalysis, language: Language) -> String {
    let l = labels(language);
    let f = &analysis.fundamentals;
    let mut out = String::new();

    out.push_str(&format!("{}: {}\n", l.stock, analysis.symbol));
    out.push_str(&format!(
        "- {}: {} {:.2}, RSI {}, {} {}\n",
        l.technicals,
        l.close,
        analysis.close,
        format_optional(analysis.rsi, 2),
        l.trend,
        analysis.trend.label(language),
    ));
    out.push_str(&format!(
        "- {}: {} {}, {} {}, {} {}\n",
        l.fundamentals,
        l.pe,
        f.pe_display(),
        l.pb,
        f.pb_display(),
        l.revenue_growth,
        f.revenue_growth_display(),
    ));
    out.push_str(&format!(
        "- {}: {}\n",
        l.stop_loss,
        format_optional(analysis.risk.map(|r| r.stop_loss), 2)
    ));
    out.push_str(&format!(
        "- {}: {}\n",
        l.take_profit,
        format_optional(analysis.risk.map(|r| r.take_profit), 2)
    ));
    out.push_str("---\n");
    out
}

/// Concatenate the blocks of every analysed symbol in order
pub fn compose_summary(analyses: &[SymbolAnalysis], language: Language) -> String {
    analyses
        .iter()
        .map(|a| symbol_block(a, language))
        .collect()
}
