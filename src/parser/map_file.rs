// CLASSIFICATION: COMMUNITY
// Filename: map_file.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Linker map files surfaced next to compiler diagnostics.

use std::fs;
use std::path::Path;

use log::debug;

use crate::parser::output::parse_output;
use crate::result::{BuildStepResult, ResultLine};

/// Fixed name of the map file the linker is asked to write.
pub const MAP_FILE_NAME: &str = "map.txt";

/// Parse map text into the same line shape as stderr.
pub fn parse_map_file(text: &str) -> Vec<ResultLine> {
    parse_output(text, None)
}

/// Append `dir/map.txt` to the step's stderr after its own lines.
///
/// Returns whether a map file was found.
pub fn append_map_file(step: &mut BuildStepResult, dir: &Path) -> bool {
    let path = dir.join(MAP_FILE_NAME);
    match fs::read(&path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            step.stderr.extend(parse_map_file(&text));
            true
        }
        Err(err) => {
            debug!("no map file at {}: {err}", path.display());
            false
        }
    }
}
