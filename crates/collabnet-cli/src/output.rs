//! Shared output layer for human/JSON parity across CLI commands.
//!
//! Results go to stdout; errors go to stderr. With `--json` both are a single
//! pretty-printed JSON document so scripted pipelines can parse them.

use std::io::{self, Write};

use serde::Serialize;

/// Shared width for human separators.
pub const RULE_WIDTH: usize = 60;

/// Write a section heading followed by a separator.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Render a left-aligned key/value line in human output.
pub fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "  {:<22} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A structured error with an optional hint and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Fixed one-line description of the error code.
    pub summary: String,
    /// Full error chain.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Stable `E####` code.
    pub error_code: String,
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is serialized with `serde_json`; otherwise
/// `human_fn` writes the text form.
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
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)
        }
        OutputMode::Human => {
            writeln!(out, "error[{}]: {}", error.error_code, error.summary)?;
            writeln!(out, "  cause: {}", error.message)?;
            if let Some(hint) = &error.hint {
                writeln!(out, "  hint: {hint}")?;
            }
            Ok(())
        }
    }
}

/// Format a ratio in `[0, 1]` as a percentage.
pub fn percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_pads_keys() {
        let mut buf = Vec::new();
        kv(&mut buf, "nodes", "42").expect("write");
        let line = String::from_utf8(buf).expect("utf8");
        assert!(line.starts_with("  nodes:"));
        assert!(line.trim_end().ends_with("42"));
    }

    #[test]
    fn section_underlines_heading() {
        let mut buf = Vec::new();
        section(&mut buf, "Graph").expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Graph");
        assert_eq!(lines[1].len(), RULE_WIDTH);
    }

    #[test]
    fn cli_error_omits_missing_hint() {
        let err = CliError {
            summary: "Internal unexpected error".into(),
            message: "boom".into(),
            hint: None,
            error_code: "E9001".into(),
        };
        let json = serde_json::to_value(&err).expect("serialize");
        assert!(json.get("hint").is_none());
        assert_eq!(json["error_code"], "E9001");
        assert_eq!(json["summary"], "Internal unexpected error");
    }

    #[test]
    fn percent_formats_one_decimal() {
        assert_eq!(percent(0.5), "50.0%");
        assert_eq!(percent(1.0), "100.0%");
    }
}
