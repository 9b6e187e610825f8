//! Terminal front end.
//!
//! The interactive session mirrors the controls of the web form: pick a source
//! tab, a length and a style, then show the summary and a status line.

use crate::config::SummaryConfig;
use crate::orchestrator::{Orchestrator, Outcome, Request};
use crate::style::Style;
use crate::summary::{Length, SummaryOptions, DEFAULT_CUSTOM_CHARS};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};
use tracing::warn;

const TABS: [&str; 4] = ["貼り付け", "URL", "ファイル (PDF / HTML / テキスト)", "終了"];
const LENGTHS: [Length; 4] = [Length::Short, Length::Medium, Length::Long, Length::Custom];
const STYLES: [Style; 4] = [Style::Friendly, Style::Bullet, Style::Business, Style::Plain];

/// Print the output to stdout and the status line to stderr
pub fn print_outcome(outcome: &Outcome) {
    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }
    print_status(&outcome.status, outcome.is_ok());
}

pub fn print_status(status: &str, ok: bool) {
    if ok {
        eprintln!("{}", status.green());
    } else {
        eprintln!("{}", status.red());
    }
}

/// Write the summary to `path` and return the status line for it.
///
/// Failure is reported in the returned status, never raised.
pub fn save_output(path: &Path, output: &str) -> (String, bool) {
    if output.is_empty() {
        return ("保存する要約がありません。".to_string(), false);
    }
    match std::fs::write(path, output) {
        Ok(()) => (format!("{} に保存しました。", path.display()), true),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not save summary");
            ("保存に失敗しました。".to_string(), false)
        }
    }
}

fn length_label(length: Length) -> String {
    match length.preset_chars() {
        Some(chars) => format!("{} ({}字)", length, chars),
        None => format!("{} (文字数を指定)", length),
    }
}

fn choose_options(theme: &ColorfulTheme, defaults: &SummaryConfig) -> anyhow::Result<SummaryOptions> {
    let labels: Vec<String> = LENGTHS.iter().map(|l| length_label(*l)).collect();
    let length_index = Select::with_theme(theme)
        .with_prompt("長さ")
        .items(&labels)
        .default(LENGTHS.iter().position(|l| *l == defaults.length).unwrap_or(0))
        .interact()?;
    let length = LENGTHS[length_index];

    let custom = if length == Length::Custom {
        let initial = defaults
            .custom_length
            .clone()
            .unwrap_or_else(|| DEFAULT_CUSTOM_CHARS.to_string());
        Some(
            Input::<String>::with_theme(theme)
                .with_prompt("文字数")
                .with_initial_text(initial)
                .allow_empty(true)
                .interact_text()?,
        )
    } else {
        None
    };

    let style_labels: Vec<&str> = STYLES.iter().map(|s| s.as_str()).collect();
    let style_index = Select::with_theme(theme)
        .with_prompt("スタイル")
        .items(&style_labels)
        .default(STYLES.iter().position(|s| *s == defaults.style).unwrap_or(0))
        .interact()?;

    Ok(SummaryOptions::new(length, custom.as_deref(), STYLES[style_index]))
}

/// Interactive loop; returns when the user picks the exit tab
pub async fn run(orchestrator: &Orchestrator, defaults: &SummaryConfig) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();

    loop {
        let tab = Select::with_theme(&theme)
            .with_prompt("入力方法")
            .items(&TABS)
            .default(0)
            .interact()?;

        let mut request = Request::default();
        match tab {
            0 => request.text = Some(edit::edit("")?),
            1 => {
                request.url = Some(
                    Input::<String>::with_theme(&theme)
                        .with_prompt("URL")
                        .allow_empty(true)
                        .interact_text()?,
                )
            }
            2 => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("ファイルのパス")
                    .allow_empty(true)
                    .interact_text()?;
                request.file = Some(PathBuf::from(path.trim()));
            }
            _ => return Ok(()),
        }
        request.options = choose_options(&theme, defaults)?;

        eprintln!("{}", "要約中…".dimmed());
        let outcome = orchestrator.summarize(&request).await;
        println!();
        print_outcome(&outcome);
        println!();

        if outcome.is_ok()
            && Confirm::with_theme(&theme)
                .with_prompt("ファイルに保存しますか？")
                .default(false)
                .interact()?
        {
            let path: String = Input::with_theme(&theme)
                .with_prompt("保存先")
                .default("summary.txt".to_string())
                .interact_text()?;
            let (status, ok) = save_output(Path::new(path.trim()), &outcome.output);
            print_status(&status, ok);
        }
    }
}
