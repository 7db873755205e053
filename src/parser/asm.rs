// CLASSIFICATION: COMMUNITY
// Filename: asm.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Assembly listing normalisation.
//!
//! Understands GNU/LLVM `.file`/`.loc` line tables and cc65 `.dbg line`
//! records, so each emitted line can carry the source line it came from.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::request::Filters;

static FILE_DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*\.file\s+(\d+)\s+"([^"]*)"(?:\s+"([^"]*)")?"#).expect("file pattern")
});
static LOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\.loc\s+(\d+)\s+(\d+)(?:\s+(\d+))?").expect("loc pattern"));
static DBG_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*\.dbg\s+line(?:,\s*"([^"]*)",\s*(\d+))?"#).expect("dbg pattern")
});
static LABEL_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([.\w$@]+):").expect("label pattern"));
static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\.[A-Za-z_]\w*").expect("directive pattern"));
static COMMENT_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[#;@]|//)").expect("comment pattern"));
static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.\w$@]+").expect("identifier pattern"));

/// Source position attached to an assembly line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsmSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// One line of processed assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AsmSource>,
}

/// Parse an assembly listing according to `filters`.
pub fn parse_asm(text: &str, filters: &Filters) -> Vec<AsmLine> {
    let used_labels = if filters.labels {
        referenced_labels(text)
    } else {
        HashSet::new()
    };

    let mut files: HashMap<u32, String> = HashMap::new();
    let mut current: Option<AsmSource> = None;
    let mut out = Vec::new();
    let mut last_blank = false;

    for raw in text.lines() {
        if let Some(caps) = FILE_DIRECTIVE_RE.captures(raw) {
            if let Ok(idx) = caps[1].parse::<u32>() {
                // DWARF5 style carries the directory first.
                let name = match caps.get(3) {
                    Some(file) => format!("{}/{}", &caps[2], file.as_str()),
                    None => caps[2].to_owned(),
                };
                files.insert(idx, name);
            }
        } else if let Some(caps) = LOC_RE.captures(raw) {
            let file_idx: u32 = caps[1].parse().unwrap_or(0);
            let line: u32 = caps[2].parse().unwrap_or(0);
            current = (line > 0).then(|| AsmSource {
                file: files.get(&file_idx).cloned(),
                line,
                column: caps.get(3).and_then(|c| c.as_str().parse().ok()).filter(|c| *c > 0),
            });
        } else if let Some(caps) = DBG_LINE_RE.captures(raw) {
            current = match (caps.get(1), caps.get(2)) {
                (Some(file), Some(line)) => line.as_str().parse().ok().map(|line| AsmSource {
                    file: Some(file.as_str().to_owned()),
                    line,
                    column: None,
                }),
                _ => None,
            };
        }

        if raw.trim().is_empty() {
            if !last_blank && !out.is_empty() {
                out.push(AsmLine {
                    text: String::new(),
                    source: None,
                });
            }
            last_blank = true;
            continue;
        }

        let label = LABEL_DEF_RE.captures(raw).map(|c| c[1].to_owned());
        if let Some(name) = &label {
            if filters.labels && !used_labels.contains(name) {
                continue;
            }
        }
        if filters.comment_only && COMMENT_ONLY_RE.is_match(raw) {
            continue;
        }
        if filters.directives && label.is_none() && DIRECTIVE_RE.is_match(raw) {
            continue;
        }

        let text = if filters.trim {
            squash_whitespace(raw)
        } else {
            raw.to_owned()
        };
        let source = if label.is_some() { None } else { current.clone() };
        out.push(AsmLine { text, source });
        last_blank = false;
    }

    while out.last().is_some_and(|l| l.text.is_empty()) {
        out.pop();
    }
    out
}

/// Labels mentioned by any line that is not itself a label definition.
fn referenced_labels(text: &str) -> HashSet<String> {
    let mut used = HashSet::new();
    for raw in text.lines() {
        let body = match LABEL_DEF_RE.find(raw) {
            Some(def) => &raw[def.end()..],
            None => raw,
        };
        let body = strip_comment(body);
        let mut tokens = IDENT_RE.find_iter(body);
        // The mnemonic or directive name itself is not a reference.
        tokens.next();
        for token in tokens {
            used.insert(token.as_str().to_owned());
        }
    }
    used
}

fn strip_comment(line: &str) -> &str {
    let end = line.find([';', '#']).unwrap_or(line.len());
    &line[..end]
}

fn squash_whitespace(line: &str) -> String {
    let indented = line.starts_with(char::is_whitespace);
    let body = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if indented {
        format!("  {body}")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GNU: &str = "\t.file\t\"example.c\"\n\t.text\n\t.file 1 \"example.c\"\nsquare:\n.LFB0:\n\t.loc 1 2 17\n\tpushq\t%rbp\n\t.loc 1 3 12\n\tmovl\t%edi, %eax\n\tjmp\t.L2\n.L2:\n\tret\n.Lunused:\n\t# just a comment\n";

    fn filters() -> Filters {
        Filters {
            labels: true,
            directives: true,
            comment_only: true,
            ..Filters::default()
        }
    }

    #[test]
    fn gnu_listing_with_filters() {
        let lines = parse_asm(GNU, &filters());
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            ["\tpushq\t%rbp", "\tmovl\t%edi, %eax", "\tjmp\t.L2", ".L2:", "\tret"]
        );
        let src = lines[1].source.as_ref().unwrap();
        assert_eq!(src.file.as_deref(), Some("example.c"));
        assert_eq!((src.line, src.column), (3, Some(12)));
        assert!(lines[3].source.is_none());
    }

    #[test]
    fn unfiltered_listing_keeps_everything() {
        let lines = parse_asm(GNU, &Filters::default());
        assert!(lines.iter().any(|l| l.text == ".Lunused:"));
        assert!(lines.iter().any(|l| l.text.contains(".loc")));
    }

    #[test]
    fn cc65_dbg_lines_and_trim() {
        let asm = "\t.dbg\tline, \"example.c\", 5\n\tlda     #$01\n\t.dbg\tline\n\trts\n";
        let f = Filters {
            directives: true,
            trim: true,
            ..Filters::default()
        };
        let lines = parse_asm(asm, &f);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "  lda #$01");
        assert_eq!(lines[0].source.as_ref().unwrap().line, 5);
        assert!(lines[1].source.is_none());
    }

    #[test]
    fn blank_runs_collapse() {
        let lines = parse_asm("a:\n\n\n\tnop\n\n", &Filters::default());
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["a:", "", "\tnop"]);
    }
}
