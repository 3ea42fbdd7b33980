//! Commentary prompt templates
//!
//! Two prompts are sent per run, each in English and Traditional Chinese:
//! - `ranking`: a fund manager ranks the subjects on trend and valuation
//! - `allocation`: a private banker splits a fixed capital, keeping a cash reserve
//!
//! Templates are MiniJinja sources registered once into an [`Environment`].
//! The persona of each prompt travels separately as the system instruction.

mod language;

pub use language::Language;

use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const RANKING_EN: &str = r"Analyse the following data in depth:

{{ summary }}
Answer in English:
1. **Overall strength ranking**: weigh whether the trend is up and whether the valuation (P/E, P/B) is reasonable.
2. **Reading the numbers**: using the RSI and the ATR-based levels, say whether now is a suitable entry point.
3. **Red flags**: which stocks are rising but have already become too expensive?
";

const RANKING_ZH_TW: &str = r"請針對以下數據進行深度分析：

{{ summary }}
請以繁體中文提供分析：
1. 【綜合實力排名】：考量「趨勢是否向上」且「估值是否合理(PE/PB)」。
2. 【數據解讀】：針對 RSI 與 ATR 提供的點位，說明目前是否為合適進場點。
3. 【避雷提醒】：哪些股票雖然股價在漲但其實已經「太貴」？
";

const ALLOCATION_EN: &str = r"Based on the following stock data:

{{ summary }}
The client has {{ capital }}. Recommend an allocation:
1. **Allocation table**: include a cash reserve (suggested {{ reserve_min }}-{{ reserve_max }}%) and split the rest across the stocks.
2. **Rationale**: explain why the cash is kept (market swings, waiting to add on dips).
3. **Risk control**: state the portfolio drawdown at which the cash should be deployed defensively or positions reduced.

Answer in English.
";

const ALLOCATION_ZH_TW: &str = r"基於以下股票數據：

{{ summary }}
如果客戶有 {{ capital }}，請提供配置建議：
1. 【資產配置表】：盡量包含「現金保留比例」(建議 {{ reserve_min }}-{{ reserve_max }}%)，其餘才分配給股票。
2. 【配置邏輯】：說明為何保留這些現金（例如應對市場波動、等待加碼點）。
3. 【風控提醒】：提供整體組合跌幅超過多少時，應動用現金防守或減碼。

請以繁體中文回答。
";

/// Suggested cash reserve band for the allocation prompt, in percent
const CASH_RESERVE: (u8, u8) = (10, 20);

/// The two commentary prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    Ranking,
    Allocation,
}

impl PromptKind {
    pub const ALL: [PromptKind; 2] = [PromptKind::Ranking, PromptKind::Allocation];

    /// System instruction setting who answers the prompt
    pub fn persona(self, language: Language) -> &'static str {
        match (self, language) {
            (PromptKind::Ranking, Language::English) => "You are a senior fund manager.",
            (PromptKind::Ranking, Language::TraditionalChinese) => "你是一個資深基金經理人。",
            (PromptKind::Allocation, Language::English) => "You are a private banking advisor.",
            (PromptKind::Allocation, Language::TraditionalChinese) => "你是私人銀行顧問。",
        }
    }

    fn template_name(self, language: Language) -> &'static str {
        match (self, language) {
            (PromptKind::Ranking, Language::English) => "ranking.en",
            (PromptKind::Ranking, Language::TraditionalChinese) => "ranking.zh-TW",
            (PromptKind::Allocation, Language::English) => "allocation.en",
            (PromptKind::Allocation, Language::TraditionalChinese) => "allocation.zh-TW",
        }
    }
}

/// Registered prompt templates for one output language
pub struct PromptSet {
    env: Environment<'static>,
    language: Language,
}

impl PromptSet {
    pub fn new(language: Language) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("ranking.en", RANKING_EN)?;
        env.add_template("ranking.zh-TW", RANKING_ZH_TW)?;
        env.add_template("allocation.en", ALLOCATION_EN)?;
        env.add_template("allocation.zh-TW", ALLOCATION_ZH_TW)?;
        Ok(Self { env, language })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Render `kind` around the numeric summary
    pub fn render(&self, kind: PromptKind, summary: &str, capital: u64) -> Result<String> {
        let template = self.env.get_template(kind.template_name(self.language))?;
        let rendered = template.render(context! {
            summary => summary,
            capital => format_capital(capital, self.language),
            reserve_min => CASH_RESERVE.0,
            reserve_max => CASH_RESERVE.1,
        })?;
        Ok(rendered)
    }
}

/// Group digits in threes: `1000000` becomes `1,000,000`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human-readable capital amount in TWD
pub fn format_capital(capital: u64, language: Language) -> String {
    match language {
        Language::English => format!("{} TWD", group_thousands(capital)),
        Language::TraditionalChinese if capital >= 10_000 && capital % 10_000 == 0 => {
            format!("{} 萬台幣", group_thousands(capital / 10_000))
        }
        Language::TraditionalChinese => format!("{} 元台幣", group_thousands(capital)),
    }
}
