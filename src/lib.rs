//! # yoyaku
//!
//! Summarises pasted text, web pages and PDF files.
//!
//! ## Features
//!
//! - **Extractive engine**: punctuation-based sentence splitting, keyword
//!   density scoring and deduplicated selection under a character budget
//! - **Source normalisation**: HTML-to-text with content-block preference and
//!   per-page PDF text extraction
//! - **Styles**: plain, bullet, friendly and business renderings
//! - **Optional generative backend**: Gemini via rstructor

pub mod agent;
pub mod config;
pub mod orchestrator;
pub mod pdf;
pub mod scraper;
pub mod selector;
pub mod splitter;
pub mod style;
pub mod summary;
pub mod ui;

pub use config::Config;
pub use orchestrator::{Orchestrator, Outcome, Request, Source, SummarizeError};
pub use style::Style;
pub use summary::{Length, SummaryOptions};
