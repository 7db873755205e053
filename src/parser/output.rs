// CLASSIFICATION: COMMUNITY
// Filename: output.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Diagnostic line tagging for compiler stdout/stderr.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::result::{MessageTag, ResultLine, Severity};

/// Placeholder substituted for the request's input path.
pub const SOURCE_PLACEHOLDER: &str = "<source>";

static ANSI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ansi pattern"));
static SOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<source>[(:](\d+)(?::?,?(\d+):?)?[):]*\s*(.*)").expect("source pattern")
});
static FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([\w./\\-]+)[(:](\d+)(?::?,?(\d+):?)?[):]*\s*(.*)").expect("file pattern")
});

/// Split `text` into lines and tag each diagnostic-shaped one.
pub fn parse_output(text: &str, input_filename: Option<&str>) -> Vec<ResultLine> {
    parse_lines(text.lines(), input_filename)
}

/// Like [`parse_output`] over lines that were already split.
pub fn parse_lines<I, S>(lines: I, input_filename: Option<&str>) -> Vec<ResultLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| parse_line(line.as_ref(), input_filename))
        .collect()
}

fn parse_line(raw: &str, input_filename: Option<&str>) -> ResultLine {
    let text = match input_filename {
        Some(name) if !name.is_empty() => raw.replace(name, SOURCE_PLACEHOLDER),
        _ => raw.to_owned(),
    };
    let plain = ANSI_RE.replace_all(&text, "");
    let tag = tag_source(&plain).or_else(|| tag_file(&plain));
    ResultLine { text, tag }
}

fn tag_source(line: &str) -> Option<MessageTag> {
    let caps = SOURCE_RE.captures(line)?;
    let message = caps.get(3).map_or("", |m| m.as_str()).trim();
    Some(MessageTag {
        line: caps[1].parse().ok()?,
        column: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        file: None,
        text: message.to_owned(),
        severity: severity_of(message),
    })
}

fn tag_file(line: &str) -> Option<MessageTag> {
    let caps = FILE_RE.captures(line)?;
    let file = &caps[1];
    // Bare words such as "note" or "Segment" are not file names.
    if !file.contains('.') {
        return None;
    }
    let message = caps.get(4).map_or("", |m| m.as_str()).trim();
    Some(MessageTag {
        line: caps[2].parse().ok()?,
        column: caps.get(3).and_then(|m| m.as_str().parse().ok()),
        file: Some(file.to_owned()),
        text: message.to_owned(),
        severity: severity_of(message),
    })
}

fn severity_of(message: &str) -> Severity {
    let lower = message.trim_start().to_ascii_lowercase();
    if lower.starts_with("error") || lower.starts_with("fatal error") {
        Severity::Error
    } else if lower.starts_with("warning") {
        Severity::Warning
    } else {
        Severity::Info
    }
}
