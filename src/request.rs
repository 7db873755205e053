// CLASSIFICATION: COMMUNITY
// Filename: request.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Compilation requests as received from the UI layer.

use serde::{Deserialize, Serialize};

/// Output shaping requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    /// Link a binary instead of stopping at textual assembly.
    pub binary: bool,
    /// Drop label definitions nothing refers to.
    pub labels: bool,
    /// Drop assembler directives.
    pub directives: bool,
    /// Drop comment-only lines.
    pub comment_only: bool,
    /// Squash horizontal whitespace.
    pub trim: bool,
    /// Prefer Intel syntax where the toolchain supports it.
    pub intel: bool,
}

/// Library version picked in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedLibrary {
    pub id: String,
    pub version: String,
}

/// Extra file written next to the main source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub filename: String,
    pub contents: String,
}

/// How the request is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    /// One `compile` step.
    #[default]
    Single,
    /// `cmake` configure then `build`, driven by a CMakeLists.txt in `files`.
    CMake,
}

/// One compilation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileRequest {
    pub compiler: String,
    pub source: String,
    /// User-supplied compiler options, already split into arguments.
    pub options: Vec<String>,
    pub filters: Filters,
    pub libraries: Vec<SelectedLibrary>,
    pub files: Vec<SourceFile>,
    pub build: BuildKind,
    pub produce_opt_info: bool,
    pub produce_macro_expansion: bool,
}

impl CompileRequest {
    pub fn new(compiler: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// File name of the primary output inside its step directory.
    #[must_use]
    pub fn output_name(&self) -> &'static str {
        match self.build {
            BuildKind::Single => "output.s",
            BuildKind::CMake => "output",
        }
    }
}

/// Parse a `id:version` library selector.
pub fn parse_library_selector(text: &str) -> Option<SelectedLibrary> {
    let (id, version) = text.split_once(':')?;
    let (id, version) = (id.trim(), version.trim());
    if id.is_empty() || version.is_empty() {
        return None;
    }
    Some(SelectedLibrary {
        id: id.to_owned(),
        version: version.to_owned(),
    })
}
