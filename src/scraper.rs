//! Web retrieval and HTML-to-text normalisation.
//!
//! Uses reqwest for fetching (direct first, then the configured relay) and
//! scraper for HTML parsing.

use crate::config::FetchConfig;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("yoyaku/", env!("CARGO_PKG_VERSION"));

/// Elements that never carry readable content
const REMOVED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "form", "header", "aside", "noscript", "iframe",
];

/// Lowercased openings of an HTML document
const HTML_PREFIXES: [&[u8]; 4] = [b"<!doctype", b"<html", b"<head", b"<body"];

/// Elements that start a new line when rendering text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

lazy_static! {
    static ref READABLE: Selector = Selector::parse(
        "h1, h2, h3, h4, h5, h6, p, li, article, section, main, [role='main']"
    )
    .unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref NON_CONTENT_BLOCK: Regex =
        Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>")
            .unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(StatusCode),
    #[error("relay endpoint is not configured")]
    ProxyNotConfigured,
    #[error("invalid relay endpoint: {0}")]
    InvalidProxy(String),
    #[error("no content found at URL")]
    NoContent,
}

/// Extracted content from a webpage
#[derive(Debug, Clone)]
pub struct WebContent {
    /// The original URL
    pub url: String,
    /// Page title
    pub title: Option<String>,
    /// Normalised text content
    pub text: String,
}

/// Create a configured HTTP client
fn create_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// An endpoint that is empty or still holds a `<<<...>>>` placeholder is unset
fn relay_configured(endpoint: &str) -> bool {
    let endpoint = endpoint.trim();
    !endpoint.is_empty() && !endpoint.starts_with("<<<")
}

/// Build the relay request URL carrying the target as the `url` parameter
pub fn relay_url(endpoint: &str, target: &str) -> Result<Url, ScraperError> {
    let mut url =
        Url::parse(endpoint.trim()).map_err(|e| ScraperError::InvalidProxy(e.to_string()))?;
    url.query_pairs_mut().append_pair("url", target);
    Ok(url)
}

/// HTTP retrieval with a single direct → relay fallback
pub struct Fetcher {
    client: Client,
    relay_endpoint: Option<String>,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ScraperError> {
        let client = create_client(Duration::from_secs(config.timeout_secs))?;
        let relay_endpoint = config
            .proxy_endpoint
            .clone()
            .filter(|endpoint| relay_configured(endpoint));

        Ok(Self {
            client,
            relay_endpoint,
        })
    }

    pub fn has_relay(&self) -> bool {
        self.relay_endpoint.is_some()
    }

    /// Fetch the document body, trying the relay once if the direct request fails
    pub async fn fetch_with_fallback(&self, url: &str) -> Result<String, ScraperError> {
        match self.get_text(url).await {
            Ok(body) => return Ok(body),
            Err(e) => warn!(url, error = %e, "direct fetch failed"),
        }

        let endpoint = self
            .relay_endpoint
            .as_deref()
            .ok_or(ScraperError::ProxyNotConfigured)?;
        let relayed = relay_url(endpoint, url)?;
        debug!(relay = %relayed, "retrying through relay");

        self.get_text(relayed.as_str()).await
    }

    /// Fetch a page and extract its title and readable text
    pub async fn fetch_content(&self, url: &str) -> Result<WebContent, ScraperError> {
        let html = self.fetch_with_fallback(url).await?;
        let document = Html::parse_document(&html);

        let title = extract_title(&document);
        let text = normalize_document(&document, &html);

        if text.is_empty() {
            return Err(ScraperError::NoContent);
        }

        Ok(WebContent {
            url: url.to_string(),
            title,
            text,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status(status));
        }
        Ok(response.text().await?)
    }
}

/// Best-effort guess for whether bytes are an HTML document
pub fn looks_like_html(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head: Vec<u8> = bytes[start..]
        .iter()
        .take(9)
        .map(u8::to_ascii_lowercase)
        .collect();

    HTML_PREFIXES.iter().any(|prefix| head.starts_with(prefix))
}

/// Convert raw HTML into plain text with tidy whitespace.
///
/// Never fails: markup the DOM walk cannot make sense of is reduced by
/// stripping tags instead.
pub fn normalize_html(html: &str) -> String {
    let document = Html::parse_document(html);
    normalize_document(&document, html)
}

fn normalize_document(document: &Html, raw: &str) -> String {
    let blocks = extract_blocks(document);
    if !blocks.is_empty() {
        return markup_free(&blocks.join("\n"));
    }

    let body = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    let mut text = String::new();
    push_visible_text(body, &mut text);
    let text = markup_free(&text);
    if !text.is_empty() {
        return text;
    }

    let stripped = strip_tags(raw);
    if !stripped.is_empty() {
        warn!("DOM yielded no text, fell back to tag stripping");
    }
    stripped
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    [&*TITLE, &*H1].into_iter().find_map(|selector| {
        let element = document.select(selector).next()?;
        let title = element.text().collect::<String>();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        (!title.is_empty()).then_some(title)
    })
}

/// Readable blocks of the whole document, in document order.
///
/// Headings, paragraphs and list items are taken as they are. A container
/// (`article`, `section`, `main`) only counts as a block of its own when it
/// holds no readable elements, so its content is never emitted twice.
fn extract_blocks(document: &Html) -> Vec<String> {
    let mut blocks = Vec::new();

    for element in document.select(&READABLE) {
        if inside_removed(element) || inside_content_block(element) {
            continue;
        }
        if !is_content_block(element.value().name()) && has_readable_descendant(element) {
            continue;
        }
        let mut text = String::new();
        push_visible_text(element, &mut text);
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.chars().count() > 1 {
            blocks.push(cleaned);
        }
    }

    blocks
}

fn is_content_block(name: &str) -> bool {
    matches!(name, "p" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn has_readable_descendant(container: ElementRef<'_>) -> bool {
    container
        .select(&READABLE)
        .any(|element| element.id() != container.id() && !inside_removed(element))
}

fn ancestor_names<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|ancestor| ancestor.value().name())
}

fn inside_removed(element: ElementRef<'_>) -> bool {
    REMOVED_ELEMENTS.contains(&element.value().name())
        || ancestor_names(element).any(|name| REMOVED_ELEMENTS.contains(&name))
}

/// A list item wrapping a paragraph is rendered once, through the outer element
fn inside_content_block(element: ElementRef<'_>) -> bool {
    ancestor_names(element).any(is_content_block)
}

/// Append the text of `element`, skipping non-content subtrees
fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if REMOVED_ELEMENTS.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    push_visible_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Regex tag stripping, the last resort for markup the DOM walk cannot read
pub fn strip_tags(html: &str) -> String {
    let without_code = NON_CONTENT_BLOCK.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_code, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tidy text with tag-shaped runs removed, so decoded `&lt;b&gt;` cannot
/// turn into markup on a second pass
fn markup_free(text: &str) -> String {
    tidy_whitespace(&TAG.replace_all(text, " "))
}

/// Collapse spaces within lines, squeeze blank-line runs to one, trim the ends
fn tidy_whitespace(text: &str) -> String {
    let lines = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_LINES.replace_all(&lines, "\n\n").trim().to_string()
}
