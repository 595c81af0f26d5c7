//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, one-line-per-row text for pipes,
//! or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `GUWEN_FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use guwen_core::CorpusError;
use guwen_core::config::ReadingPreferences;
use guwen_core::record::Record;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Plain text, one row per line, for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {}
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("GUWEN_FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a list of plain names: one per line, or a JSON array.
pub fn render_names(mode: OutputMode, heading: &str, names: &[String]) -> anyhow::Result<()> {
    render_mode(
        mode,
        &names,
        |names, w| {
            for name in *names {
                writeln!(w, "{name}")?;
            }
            Ok(())
        },
        |names, w| {
            pretty_section(w, &format!("{heading} ({})", names.len()))?;
            for name in *names {
                writeln!(w, "  {name}")?;
            }
            Ok(())
        },
    )
}

/// Full human rendering of one record, honouring the translation toggles.
pub fn pretty_record(
    w: &mut dyn Write,
    record: &Record,
    prefs: ReadingPreferences,
) -> io::Result<()> {
    pretty_section(w, &format!("#{}  {}", record.id, record.original))?;
    if !record.description.is_empty() {
        pretty_kv(w, "description", &record.description)?;
    }
    if prefs.show_translation_en && !record.en.is_empty() {
        pretty_kv(w, "en", &record.en)?;
    }
    if prefs.show_translation_jp && !record.jp.is_empty() {
        pretty_kv(w, "jp", &record.jp)?;
    }
    if !record.annotation.is_empty() {
        writeln!(w, "annotations:")?;
        for note in &record.annotation {
            writeln!(w, "  {}  {}", note.term, note.gloss)?;
        }
    }
    writeln!(w)
}

/// One tab-separated line: id, source text, then any enabled translations.
pub fn text_record(
    w: &mut dyn Write,
    record: &Record,
    prefs: ReadingPreferences,
) -> io::Result<()> {
    write!(w, "{}\t{}", record.id, record.original)?;
    if prefs.show_translation_en {
        write!(w, "\t{}", record.en)?;
    }
    if prefs.show_translation_jp {
        write!(w, "\t{}", record.jp)?;
    }
    writeln!(w)
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }
}

impl From<&CorpusError> for CliError {
    fn from(err: &CorpusError) -> Self {
        let code = err.code();
        Self {
            message: err.to_string(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render a corpus error to stderr and turn it into the command's failure.
pub fn report(mode: OutputMode, err: CorpusError) -> anyhow::Error {
    if let Err(render_err) = render_error(mode, &CliError::from(&err)) {
        return render_err;
    }
    anyhow::Error::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guwen_core::record::Annotation;

    fn sample() -> Record {
        let mut record = Record::new(6, "行也宜，立也宜。");
        record.en = "Fit to walk, fit to stand.".into();
        record.jp = "行くも宜し".into();
        record.annotation = vec![Annotation::new("宜", "适宜，恰当")];
        record
    }

    fn rendered(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_case_insensitive() {
        let mode = resolve_output_mode_inner(None, false, Some("JSON"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_unknown_falls_through_to_tty() {
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("fancy"), true),
            OutputMode::Pretty
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("fancy"), false),
            OutputMode::Text
        );
    }

    #[test]
    fn pretty_record_hides_translations_by_default() {
        let out = rendered(|w| pretty_record(w, &sample(), ReadingPreferences::default()));
        assert!(out.contains("#6  行也宜，立也宜。"));
        assert!(out.contains("宜  适宜，恰当"));
        assert!(!out.contains("Fit to walk"));
        assert!(!out.contains("行くも宜し"));
    }

    #[test]
    fn pretty_record_shows_enabled_translations() {
        let prefs = ReadingPreferences {
            show_translation_en: true,
            ..ReadingPreferences::default()
        };
        let out = rendered(|w| pretty_record(w, &sample(), prefs));
        assert!(out.contains("Fit to walk"));
        assert!(!out.contains("行くも宜し"));
    }

    #[test]
    fn text_record_is_tab_separated() {
        let prefs = ReadingPreferences {
            show_translation_jp: true,
            ..ReadingPreferences::default()
        };
        let out = rendered(|w| text_record(w, &sample(), prefs));
        assert_eq!(out, "6\t行也宜，立也宜。\t行くも宜し\n");
    }

    #[test]
    fn corpus_error_carries_code_and_hint() {
        let err = guwen_core::parse_id("x").expect_err("bad id");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert!(cli.suggestion.is_some());
    }
}
