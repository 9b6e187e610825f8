//! Request orchestration: source resolution, engine dispatch and the busy flag.
//!
//! Every failure is caught here and turned into a fixed status message; raw
//! error text only goes to the log.

use crate::agent::{build_prompt, AgentError, GeminiBackend, GenerativeBackend};
use crate::config::{Config, EngineKind};
use crate::pdf::{extract_pdf_text, looks_like_pdf};
use crate::scraper::{looks_like_html, normalize_html, Fetcher, ScraperError};
use crate::selector::pick_key_sentences;
use crate::splitter::split_sentences;
use crate::style::render_by_style;
use crate::summary::SummaryOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Status shown after a successful run
pub const STATUS_DONE: &str = "完了";

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("no text, file or URL supplied")]
    InputMissing,
    #[error("retrieval failed: {0}")]
    Retrieval(ScraperError),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("source contains no extractable text")]
    NoExtractableText,
    #[error("summarisation engine not configured: {0}")]
    EngineUnavailable(String),
    #[error("summarisation engine failed: {0}")]
    Engine(String),
    #[error("nothing left to summarise within the length budget")]
    TooShort,
    #[error("a summary is already running")]
    Busy,
}

impl SummarizeError {
    /// Fixed user-facing status line for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            SummarizeError::InputMissing => {
                "本文を貼り付けるか、URLまたはファイルを指定してください。"
            }
            SummarizeError::Retrieval(_) => {
                "ページの取得に失敗しました。本文をコピーして貼り付けてください。"
            }
            SummarizeError::Extraction(_) => {
                "ファイルを読み取れませんでした。別のファイルをお試しください。"
            }
            SummarizeError::NoExtractableText => {
                "テキストを抽出できませんでした。スキャン画像のPDFかもしれません。"
            }
            SummarizeError::EngineUnavailable(_) => {
                "要約エンジンが未設定です。APIキーを設定してください。"
            }
            SummarizeError::Engine(_) => "要約に失敗しました。時間をおいて再度お試しください。",
            SummarizeError::TooShort => {
                "要約できる文が見つかりませんでした。長さを増やすか、本文を見直してください。"
            }
            SummarizeError::Busy => "処理中です。完了までお待ちください。",
        }
    }
}

impl From<ScraperError> for SummarizeError {
    fn from(err: ScraperError) -> Self {
        match err {
            ScraperError::NoContent => SummarizeError::NoExtractableText,
            other => SummarizeError::Retrieval(other),
        }
    }
}

impl From<AgentError> for SummarizeError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::ConfigError(e) => SummarizeError::EngineUnavailable(e.to_string()),
            AgentError::RequestFailed(e) => SummarizeError::Engine(e),
        }
    }
}

/// Where the source text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Text(String),
    File(PathBuf),
    Url(String),
}

/// One summarisation request as collected from the user controls
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub options: SummaryOptions,
}

impl Request {
    /// The source to use: pasted text first, then file, then URL
    pub fn source(&self) -> Option<Source> {
        let filled = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(text) = filled(&self.text) {
            return Some(Source::Text(text));
        }
        if let Some(path) = self.file.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Some(Source::File(path.clone()));
        }
        filled(&self.url).map(Source::Url)
    }
}

/// Result of one request: the text to display and a status line
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub status: String,
    pub error: Option<SummarizeError>,
}

impl Outcome {
    fn done(output: String) -> Self {
        Self {
            output,
            status: STATUS_DONE.to_string(),
            error: None,
        }
    }

    fn failed(error: SummarizeError) -> Self {
        Self {
            output: String::new(),
            status: error.user_message().to_string(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The summariser that turns resolved text into output
pub enum Engine {
    Extractive,
    Generative {
        backend: Box<dyn GenerativeBackend>,
        persona: Option<String>,
    },
    /// Generative engine selected but unusable, with the reason
    Unavailable(String),
}

impl Engine {
    pub fn from_config(config: &Config) -> Self {
        match config.summary.engine {
            EngineKind::Extractive => Engine::Extractive,
            EngineKind::Generative => match GeminiBackend::from_config(config) {
                Ok(backend) => Engine::Generative {
                    backend: Box::new(backend),
                    persona: config.agent.persona.clone(),
                },
                Err(e) => Engine::Unavailable(e.to_string()),
            },
        }
    }
}

/// Holds the busy flag for the lifetime of one request
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives source resolution → split → select → render for one request at a time
pub struct Orchestrator {
    fetcher: Fetcher,
    engine: Engine,
    max_source_chars: usize,
    busy: AtomicBool,
}

impl Orchestrator {
    pub fn new(fetcher: Fetcher, engine: Engine, max_source_chars: usize) -> Self {
        Self {
            fetcher,
            engine,
            max_source_chars,
            busy: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScraperError> {
        Ok(Self::new(
            Fetcher::new(&config.fetch)?,
            Engine::from_config(config),
            config.fetch.max_source_chars,
        ))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one request. A request arriving while another runs is rejected.
    pub async fn summarize(&self, request: &Request) -> Outcome {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return Outcome::failed(SummarizeError::Busy);
        };

        match self.run(request).await {
            Ok(output) => {
                info!(chars = output.chars().count(), "summary ready");
                Outcome::done(output)
            }
            Err(e) => {
                warn!(error = %e, "summary failed");
                Outcome::failed(e)
            }
        }
    }

    async fn run(&self, request: &Request) -> Result<String, SummarizeError> {
        let source = request.source().ok_or(SummarizeError::InputMissing)?;
        let text = self.resolve_source(&source).await?;
        self.summarize_text(&text, &request.options).await
    }

    /// Turn a source into normalised plain text
    pub async fn resolve_source(&self, source: &Source) -> Result<String, SummarizeError> {
        match source {
            Source::Text(text) => Ok(text.clone()),
            Source::File(path) => read_file(path).await,
            Source::Url(url) => {
                debug!(url = %url, relay = self.fetcher.has_relay(), "fetching");
                let content = self.fetcher.fetch_content(url).await?;
                debug!(title = ?content.title, chars = content.text.len(), "fetched page");
                Ok(truncate_chars(content.text, self.max_source_chars))
            }
        }
    }

    /// Summarise already-resolved text with the configured engine
    pub async fn summarize_text(
        &self,
        text: &str,
        options: &SummaryOptions,
    ) -> Result<String, SummarizeError> {
        match &self.engine {
            Engine::Extractive => extractive_summary(text, options),
            Engine::Generative { backend, persona } => {
                let prompt = build_prompt(text, options, persona.as_deref());
                let output = backend.summarize(&prompt, options).await?;
                if output.trim().is_empty() {
                    return Err(SummarizeError::TooShort);
                }
                Ok(output.trim().to_string())
            }
            Engine::Unavailable(reason) => Err(SummarizeError::EngineUnavailable(reason.clone())),
        }
    }
}

/// Split, select within the budget, then render
pub fn extractive_summary(text: &str, options: &SummaryOptions) -> Result<String, SummarizeError> {
    let sentences = split_sentences(text);
    let picked = pick_key_sentences(&sentences, options.target_chars);
    debug!(
        sentences = sentences.len(),
        picked = picked.len(),
        budget = options.target_chars,
        "selected sentences"
    );

    if picked.is_empty() {
        return Err(SummarizeError::TooShort);
    }
    Ok(render_by_style(&picked, options.style))
}

/// Read a local file as PDF, HTML or plain text depending on its contents
async fn read_file(path: &Path) -> Result<String, SummarizeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SummarizeError::Extraction(e.to_string()))?;

    let text = if looks_like_pdf(&bytes) {
        extract_pdf_text(bytes)
            .await
            .map_err(|e| SummarizeError::Extraction(e.to_string()))?
    } else if looks_like_html(&bytes) {
        normalize_html(&String::from_utf8_lossy(&bytes))
    } else {
        String::from_utf8_lossy(&bytes).trim().to_string()
    };

    if text.trim().is_empty() {
        return Err(SummarizeError::NoExtractableText);
    }
    Ok(text)
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
