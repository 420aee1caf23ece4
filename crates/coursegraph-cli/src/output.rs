//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format`
//! 2. `--json`
//! 3. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 4. `output` in the user config
//! 5. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! Steps 2 to 5 are settled by `coursegraph_core::config::resolve_config`.

use clap::ValueEnum;
use coursegraph_core::{CatalogError, CyclicGraphError, ErrorCode};
use serde::Serialize;
use std::io::{self, Write};

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
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Plain line-oriented text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Parse a resolved mode name (`pretty`, `text` or `json`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns `true` if pretty output was requested.
    pub const fn is_pretty(self) -> bool {
        matches!(self, Self::Pretty)
    }
}

/// An explicit `--format` wins; otherwise use the mode the config layer
/// resolved from `--json`, `FORMAT`, the user config and the TTY check.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, resolved: &str) -> OutputMode {
    format_flag
        .or_else(|| OutputMode::from_name(resolved))
        .unwrap_or(OutputMode::Text)
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
    /// Create an error carrying the hint and code of `code`.
    pub fn with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&CatalogError> for CliError {
    fn from(err: &CatalogError) -> Self {
        Self::with_code(err.to_string(), err.error_code())
    }
}

impl From<&CyclicGraphError> for CliError {
    fn from(err: &CyclicGraphError) -> Self {
        Self::with_code(err.to_string(), ErrorCode::CycleDetected)
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text mode,
/// the provided `human_fn` closure is called to produce text output.
/// For distinct text/pretty rendering, use [`render_mode`].
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
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

/// Write an error in the requested format.
pub fn write_error(mode: OutputMode, error: &CliError, w: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *w, &wrapper)?;
            writeln!(w)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(w, "error[{code}]: {}", error.message)?,
                None => writeln!(w, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(w, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursegraph_core::Course;

    fn written(mode: OutputMode, error: &CliError) -> String {
        let mut out = Vec::new();
        write_error(mode, error, &mut out).expect("write");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn format_flag_wins_over_resolved_mode() {
        let mode = resolve_output_mode(Some(OutputMode::Pretty), "json");
        assert_eq!(mode, OutputMode::Pretty);
    }

    #[test]
    fn resolved_mode_used_without_flag() {
        assert_eq!(resolve_output_mode(None, "json"), OutputMode::Json);
        assert_eq!(resolve_output_mode(None, "pretty"), OutputMode::Pretty);
        assert_eq!(resolve_output_mode(None, "bogus"), OutputMode::Text);
    }

    #[test]
    fn output_mode_predicates() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Text.is_json());
        assert!(OutputMode::Pretty.is_pretty());
    }

    #[test]
    fn cycle_error_carries_code_and_hint() {
        let err = CyclicGraphError {
            courses: vec![Course::from("A"), Course::from("B")],
        };
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2003"));
        assert!(cli.suggestion.is_some());

        let text = written(OutputMode::Text, &cli);
        assert!(text.starts_with(
            "error[E2003]: cannot order courses: cyclic prerequisite detected among A, B"
        ));
    }

    #[test]
    fn json_error_is_wrapped() {
        let error = CliError {
            message: "boom".to_string(),
            suggestion: None,
            error_code: None,
        };
        let text = written(OutputMode::Json, &error);
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["error"]["message"], "boom");
        assert!(value["error"].get("error_code").is_none());
    }
}
