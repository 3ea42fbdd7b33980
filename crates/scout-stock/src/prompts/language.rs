//! Output language for prompts, summaries and reports

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StockError;

/// Languages the prompts and report are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English
    English,
    /// Traditional Chinese (Taiwan)
    #[default]
    TraditionalChinese,
}

impl Language {
    /// BCP 47 tag
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::TraditionalChinese => "zh-TW",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::TraditionalChinese => "繁體中文",
        }
    }
}

impl FromStr for Language {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Language::English),
            "zh" | "zh-tw" | "zh-hant" | "tw" | "chinese" | "中文" | "繁體中文" => {
                Ok(Language::TraditionalChinese)
            }
            other => Err(StockError::ConfigError(format!(
                "Unsupported language: {other} (expected en or zh-TW)"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
