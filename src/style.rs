//! Output styles and the renderer that formats selected sentences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Marker placed in front of every bullet line
pub const BULLET: &str = "・";

const FRIENDLY_LEAD: &str = "ざっくりまとめると、こんな感じです。";
const FRIENDLY_HINT: &str = "（もっと短く・長くしたいときは「長さ」を変えてみてください）";
const BUSINESS_LABEL: &str = "【要約】";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown style: {0}")]
pub struct UnknownStyle(pub String);

/// Formatting applied to the selected sentences. Never affects selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Plain,
    #[serde(alias = "bullets")]
    Bullet,
    #[default]
    Friendly,
    Business,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Plain => "plain",
            Style::Bullet => "bullet",
            Style::Friendly => "friendly",
            Style::Business => "business",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Style::Plain),
            "bullet" | "bullets" => Ok(Style::Bullet),
            "friendly" => Ok(Style::Friendly),
            "business" => Ok(Style::Business),
            other => Err(UnknownStyle(other.to_string())),
        }
    }
}

/// Format sentences for display. Content and order are left untouched.
pub fn render_by_style<S: AsRef<str>>(sentences: &[S], style: Style) -> String {
    let paragraph = || {
        sentences
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
    };

    match style {
        Style::Bullet => sentences
            .iter()
            .map(|s| format!("{}{}", BULLET, s.as_ref()))
            .collect::<Vec<_>>()
            .join("\n"),
        Style::Friendly => format!("{}\n{}\n\n{}", FRIENDLY_LEAD, paragraph(), FRIENDLY_HINT),
        Style::Business => format!("{}\n{}", BUSINESS_LABEL, paragraph()),
        Style::Plain => paragraph(),
    }
}
