// CLASSIFICATION: COMMUNITY
// Filename: opt_remarks.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! LLVM optimization-remark streams.
//!
//! A stream is a sequence of YAML documents, each opened by `--- !<Kind>` and
//! closed by `...`. The kind tag is split off before the body is handed to
//! `serde_yaml`, so bodies deserialize as plain mappings.

use std::fs;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::result::CompilationResult;

const DOC_START: &str = "--- !";
const DOC_END: &str = "...";

/// Source position of a remark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DebugLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// One parsed optimization remark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptRemark {
    #[serde(rename = "Pass")]
    pub pass: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DebugLoc", default, skip_serializing_if = "Option::is_none")]
    pub debug_loc: Option<DebugLoc>,
    #[serde(rename = "Function")]
    pub function: String,
    /// Records in document order; each keeps its keys in order.
    #[serde(rename = "Args")]
    pub args: Vec<Mapping>,
    #[serde(rename = "displayString")]
    pub display_string: String,
    /// The `!<Kind>` tag, e.g. `Missed`, `Passed`, `Analysis`.
    #[serde(rename = "optType")]
    pub opt_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RemarkBody {
    pass: String,
    name: String,
    #[serde(default)]
    debug_loc: Option<DebugLoc>,
    #[serde(default)]
    function: String,
    #[serde(default)]
    args: Option<Vec<Mapping>>,
}

/// Parse a raw remark stream taken from process output.
///
/// Documents that fail to parse are skipped; text without any document
/// yields an empty vector.
pub fn process_raw_opt_remarks(text: &str) -> Vec<OptRemark> {
    split_documents(text)
        .into_iter()
        .filter_map(|(kind, body)| match serde_yaml::from_str::<RemarkBody>(&body) {
            Ok(parsed) => Some(into_remark(kind, parsed)),
            Err(err) => {
                warn!("skipping malformed opt remark of kind {kind}: {err}");
                None
            }
        })
        .collect()
}

/// Parse the remark file a compilation wrote to `result.opt_path`.
pub fn process_opt_output(result: &CompilationResult) -> Vec<OptRemark> {
    let Some(path) = &result.opt_path else {
        return Vec::new();
    };
    match fs::read_to_string(path) {
        Ok(text) => process_raw_opt_remarks(&text),
        Err(err) => {
            debug!("no opt remarks at {}: {err}", path.display());
            Vec::new()
        }
    }
}

/// Concatenate the scalar values of every arg record, in order.
pub fn display_string(args: &[Mapping]) -> String {
    let mut out = String::new();
    for record in args {
        for value in record.values() {
            match value {
                Value::String(s) => out.push_str(s),
                Value::Number(n) => out.push_str(&n.to_string()),
                Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                _ => {}
            }
        }
    }
    out
}

fn into_remark(kind: String, body: RemarkBody) -> OptRemark {
    let args = body.args.unwrap_or_default();
    OptRemark {
        display_string: display_string(&args),
        pass: body.pass,
        name: body.name,
        debug_loc: body.debug_loc,
        function: body.function,
        args,
        opt_type: kind,
    }
}

/// Split a stream into `(kind, body)` pairs; unterminated documents are dropped.
fn split_documents(text: &str) -> Vec<(String, String)> {
    let mut docs = Vec::new();
    let mut open: Option<(String, String)> = None;
    for line in text.lines() {
        if let Some(kind) = line.strip_prefix(DOC_START) {
            open = Some((kind.trim().to_owned(), String::new()));
        } else if line.trim_end() == DOC_END {
            if let Some(doc) = open.take() {
                docs.push(doc);
            }
        } else if let Some((_, body)) = open.as_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }
    docs
}
