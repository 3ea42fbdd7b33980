//! Generated commentary on the numeric summary
//!
//! Generation is best-effort. A missing provider, a failed request or an
//! empty answer all produce [`Commentary::Unavailable`], which the report
//! renders as a placeholder instead of failing.

use scout_llm::{CompletionRequest, LLMProvider, Message};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::StockConfig;
use crate::error::Result;
use crate::prompts::{Language, PromptKind, PromptSet, format_capital};

/// Outcome of one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Commentary {
    Generated(String),
    Unavailable { reason: String },
}

impl Commentary {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Commentary::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Commentary::Generated(_))
    }

    /// The generated text, or `placeholder`
    pub fn text_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            Commentary::Generated(text) => text,
            Commentary::Unavailable { .. } => placeholder,
        }
    }
}

/// Section heading for a commentary
pub fn title(kind: PromptKind, language: Language, capital: u64) -> String {
    let capital = format_capital(capital, language);
    match (kind, language) {
        (PromptKind::Ranking, Language::English) => "🔍 Overall Strength Ranking".to_string(),
        (PromptKind::Ranking, Language::TraditionalChinese) => "🔍 綜合實力排名".to_string(),
        (PromptKind::Allocation, Language::English) => format!("💰 Allocation Plan for {capital}"),
        (PromptKind::Allocation, Language::TraditionalChinese) => format!("💰 {capital}投資建議"),
    }
}

/// Text shown in the report when a commentary is unavailable
pub fn placeholder(kind: PromptKind, language: Language) -> &'static str {
    match (kind, language) {
        (PromptKind::Ranking, Language::English) => "Analysis is temporarily unavailable.",
        (PromptKind::Ranking, Language::TraditionalChinese) => "分析暫時無法生成",
        (PromptKind::Allocation, Language::English) => "Recommendation is temporarily unavailable.",
        (PromptKind::Allocation, Language::TraditionalChinese) => "建議暫時無法生成",
    }
}

/// Notice shown to the user when a commentary could not be generated
pub fn busy_notice(kind: PromptKind, language: Language) -> &'static str {
    match (kind, language) {
        (PromptKind::Ranking, Language::English) => {
            "The generation service is busy. Try again in a minute or check the API key."
        }
        (PromptKind::Ranking, Language::TraditionalChinese) => {
            "目前 API 配額忙碌中，請稍候一分鐘再試，或檢查 API Key。"
        }
        (PromptKind::Allocation, Language::English) => "Could not generate the allocation plan.",
        (PromptKind::Allocation, Language::TraditionalChinese) => "無法生成配置建議。",
    }
}

/// Both commentaries of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentaries {
    pub ranking: Commentary,
    pub allocation: Commentary,
}

impl Commentaries {
    pub fn get(&self, kind: PromptKind) -> &Commentary {
        match kind {
            PromptKind::Ranking => &self.ranking,
            PromptKind::Allocation => &self.allocation,
        }
    }
}

/// Renders the prompts and asks the provider for prose
pub struct CommentaryWriter {
    provider: Option<Arc<dyn LLMProvider>>,
    prompts: PromptSet,
    model: String,
    max_tokens: usize,
    temperature: f32,
    capital: u64,
}

impl CommentaryWriter {
    /// `provider = None` disables generation; every commentary is then unavailable.
    pub fn new(provider: Option<Arc<dyn LLMProvider>>, config: &StockConfig) -> Result<Self> {
        Ok(Self {
            provider,
            prompts: PromptSet::new(config.language)?,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            capital: config.allocation_capital,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Generate one commentary. Never fails.
    pub async fn write(&self, kind: PromptKind, summary: &str) -> Commentary {
        let Some(provider) = &self.provider else {
            return Commentary::unavailable("commentary disabled");
        };

        let prompt = match self.prompts.render(kind, summary, self.capital) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(?kind, error = %e, "Prompt rendering failed");
                return Commentary::unavailable(e.to_string());
            }
        };

        let request = CompletionRequest::builder(&self.model)
            .system(kind.persona(self.prompts.language()))
            .add_message(Message::user(prompt))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build();

        debug!(?kind, provider = provider.name(), model = %self.model, "Requesting commentary");

        match provider.complete(request).await {
            Ok(response) => match response.text() {
                Some(text) => {
                    info!(?kind, tokens = response.usage.total(), "Commentary generated");
                    Commentary::Generated(text.to_string())
                }
                None => {
                    warn!(?kind, stop_reason = ?response.stop_reason, "Empty commentary");
                    Commentary::unavailable(format!(
                        "empty response ({:?})",
                        response.stop_reason
                    ))
                }
            },
            Err(e) => {
                warn!(?kind, error = %e, "Commentary generation failed");
                Commentary::unavailable(e.to_string())
            }
        }
    }

    /// Generate the ranking, then the allocation commentary
    pub async fn write_all(&self, summary: &str) -> Commentaries {
        Commentaries {
            ranking: self.write(PromptKind::Ranking, summary).await,
            allocation: self.write(PromptKind::Allocation, summary).await,
        }
    }
}
