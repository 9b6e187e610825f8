//! Generative summarisation backend.
//!
//! The LLM is an opaque collaborator: it receives an instruction prompt plus
//! the request options and returns text. Gemini is reached through rstructor.

use crate::config::{Config, ConfigError};
use crate::style::Style;
use crate::summary::SummaryOptions;
use async_trait::async_trait;
use rstructor::{GeminiClient, GeminiModel, LLMClient};
use thiserror::Error;

const SOURCE_START: &str = "―― 原文ここから ――";
const SOURCE_END: &str = "―― 原文ここまで ――";

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Anything that turns a prompt into summary text
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn summarize(&self, prompt: &str, options: &SummaryOptions)
        -> Result<String, AgentError>;
}

/// Gemini through rstructor
pub struct GeminiBackend {
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Fails with [`AgentError::ConfigError`] when no key is configured
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let api_key = config.api_key()?.to_string();
        Ok(Self {
            api_key,
            model: config.agent.model.clone(),
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn summarize(
        &self,
        prompt: &str,
        _options: &SummaryOptions,
    ) -> Result<String, AgentError> {
        let client = GeminiClient::new(self.api_key.as_str())
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?
            .model(parse_gemini_model(&self.model));

        let result = client
            .generate_with_metadata(prompt)
            .await
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;

        Ok(result.text.trim().to_string())
    }
}

/// Build the instruction prompt: read the whole source first, then summarise
/// in the requested style within the character budget.
pub fn build_prompt(source: &str, options: &SummaryOptions, persona: Option<&str>) -> String {
    let style_line = match options.style {
        Style::Bullet => "・箇条書きで要点のみを列挙してください。",
        Style::Business => {
            "丁寧だが簡潔なビジネス文体で、断定を避けつつ要点を明確にしてください。"
        }
        Style::Plain => "装飾のない平易な文章で、簡潔にまとめてください。",
        Style::Friendly => "フレンドリーな自然体の日本語で、やさしく簡潔にまとめてください。",
    };
    let length_line = format!(
        "全体でおおむね {} 文字以内に収めてください。",
        options.target_chars
    );

    let mut lines: Vec<&str> = Vec::new();
    if let Some(persona) = persona.map(str::trim).filter(|p| !p.is_empty()) {
        lines.push(persona);
    }
    lines.extend([
        "あなたは要約アシスタントです。以下の原文をまず全体把握し、論旨・主張・根拠・結論・注意点の順で最短経路でまとめてください。",
        "出力は必ず日本語。固有名詞や数値は保持し、推測や創作はしないでください。",
        style_line,
        length_line.as_str(),
        "語尾や表現はAIの裁量に任せます（敬語・常体は文脈に合わせて自然に）。",
        SOURCE_START,
        source,
        SOURCE_END,
    ]);

    lines.join("\n")
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        _ => GeminiModel::Gemini20Flash, // Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Length;

    #[test]
    fn prompt_wraps_source_between_markers() {
        let options = SummaryOptions::new(Length::Medium, None, Style::Bullet);
        let prompt = build_prompt("本文です。", &options, None);
        let lines: Vec<&str> = prompt.lines().collect();

        assert!(lines[0].starts_with("あなたは要約アシスタントです"));
        assert!(prompt.contains("箇条書き"));
        assert!(prompt.contains("300 文字以内"));
        assert_eq!(&lines[lines.len() - 3..], [SOURCE_START, "本文です。", SOURCE_END]);
    }

    #[test]
    fn persona_comes_first_when_set() {
        let options = SummaryOptions::default();
        let prompt = build_prompt("x", &options, Some("  あなたは編集者です。 "));
        assert!(prompt.starts_with("あなたは編集者です。\nあなたは要約アシスタントです"));
        assert!(prompt.contains("100 文字以内"));

        let blank = build_prompt("x", &options, Some("   "));
        assert!(blank.starts_with("あなたは要約アシスタントです"));
    }

    #[test]
    fn gemini_backend_needs_a_key() {
        let config = Config::default();
        assert!(matches!(
            GeminiBackend::from_config(&config),
            Err(AgentError::ConfigError(ConfigError::MissingApiKey(_)))
        ));
    }
}
