//! Summary options: length presets and the character budget they resolve to.

use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Budget used when a custom length is missing, unparsable or non-positive
pub const DEFAULT_CUSTOM_CHARS: usize = 200;
/// Smallest budget a custom length may resolve to
pub const MIN_CHARS: usize = 10;
/// Largest budget a custom length may resolve to
pub const MAX_CHARS: usize = 2000;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown length preset: {0}")]
pub struct UnknownLength(pub String);

/// Length preset selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    #[default]
    Short,
    Medium,
    Long,
    Custom,
}

impl Length {
    /// Fixed budget of the preset, `None` for `Custom`
    pub fn preset_chars(self) -> Option<usize> {
        match self {
            Length::Short => Some(100),
            Length::Medium => Some(300),
            Length::Long => Some(750),
            Length::Custom => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
            Length::Custom => "custom",
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Length {
    type Err = UnknownLength;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Length::Short),
            "medium" => Ok(Length::Medium),
            "long" => Ok(Length::Long),
            "custom" => Ok(Length::Custom),
            other => Err(UnknownLength(other.to_string())),
        }
    }
}

/// Resolve a length selection plus the raw custom field into a character budget.
///
/// The custom field is taken as typed by the user, so it may be empty or junk.
pub fn target_length(length: Length, custom: Option<&str>) -> usize {
    if let Some(chars) = length.preset_chars() {
        return chars;
    }

    match custom.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n > 0 => n.clamp(MIN_CHARS as i64, MAX_CHARS as i64) as usize,
        _ => DEFAULT_CUSTOM_CHARS,
    }
}

/// Options for one summarisation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub length: Length,
    /// Resolved character budget
    pub target_chars: usize,
    pub style: Style,
}

impl SummaryOptions {
    pub fn new(length: Length, custom: Option<&str>, style: Style) -> Self {
        Self {
            length,
            target_chars: target_length(length, custom),
            style,
        }
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self::new(Length::default(), None, Style::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_to_fixed_budgets() {
        assert_eq!(target_length(Length::Short, None), 100);
        assert_eq!(target_length(Length::Medium, Some("5")), 300);
        assert_eq!(target_length(Length::Long, None), 750);
    }

    #[test]
    fn custom_zero_falls_back_to_default() {
        assert_eq!(target_length(Length::Custom, Some("0")), DEFAULT_CUSTOM_CHARS);
    }

    #[test]
    fn custom_junk_or_missing_falls_back_to_default() {
        assert_eq!(target_length(Length::Custom, None), 200);
        assert_eq!(target_length(Length::Custom, Some("")), 200);
        assert_eq!(target_length(Length::Custom, Some("abc")), 200);
        assert_eq!(target_length(Length::Custom, Some("-40")), 200);
    }

    #[test]
    fn custom_values_are_clamped() {
        assert_eq!(target_length(Length::Custom, Some("3")), MIN_CHARS);
        assert_eq!(target_length(Length::Custom, Some(" 450 ")), 450);
        assert_eq!(target_length(Length::Custom, Some("99999")), MAX_CHARS);
    }

    #[test]
    fn custom_values_beyond_usize_range_clamp_to_max() {
        assert_eq!(target_length(Length::Custom, Some("9999999999999")), MAX_CHARS);
        assert_eq!(target_length(Length::Custom, Some(&i64::MAX.to_string())), MAX_CHARS);
    }

    #[test]
    fn length_parses_case_insensitively() {
        assert_eq!("Medium".parse::<Length>(), Ok(Length::Medium));
        assert!("huge".parse::<Length>().is_err());
    }
}
