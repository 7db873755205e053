// CLASSIFICATION: COMMUNITY
// Filename: artifact.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Typed side products of a build.
//!
//! Probing never fails a compilation: a file that is missing or unreadable
//! is simply not attached.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::result::CompilationResult;

/// Kind of produced file, as understood by the UI's viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    /// NES cartridge image.
    NesRom,
    /// Commodore 64 program image.
    C64Prg,
    /// Sega Master System cartridge image.
    SmsRom,
    /// Game Boy cartridge image.
    GbRom,
    /// Chrome trace-event JSON from `-ftime-trace`.
    TimeTrace,
}

/// Fixed file names probed in every step directory.
pub const KNOWN_ARTIFACTS: &[(&str, ArtifactType)] = &[
    ("example.nes", ArtifactType::NesRom),
    ("example.sms", ArtifactType::SmsRom),
    ("example.gb", ArtifactType::GbRom),
];

/// Descriptor of one produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Location inside the request's scratch directory.
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Base64 file content captured at extraction time.
    pub content: String,
}

impl Artifact {
    /// Read `path` and build a descriptor; `None` if the file cannot be read.
    pub fn from_file(
        path: &Path,
        artifact_type: ArtifactType,
        display_name: Option<String>,
    ) -> Option<Self> {
        match fs::read(path) {
            Ok(bytes) => Some(Self {
                artifact_type,
                path: path.to_path_buf(),
                display_name,
                content: STANDARD.encode(bytes),
            }),
            Err(err) => {
                debug!("skipping artifact {}: {err}", path.display());
                None
            }
        }
    }

    /// Name shown to the user: the override, else the file name.
    pub fn name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Decoded file content.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.content).ok()
    }
}

/// Attach `path` to `result` if it can be read. Returns whether it was added.
pub fn add_artifact(
    result: &mut CompilationResult,
    path: &Path,
    artifact_type: ArtifactType,
    display_name: Option<String>,
) -> bool {
    match Artifact::from_file(path, artifact_type, display_name) {
        Some(artifact) => {
            result.add_artifact(artifact);
            true
        }
        None => false,
    }
}

/// Attach every [`KNOWN_ARTIFACTS`] entry present in `dir`.
pub fn probe_known_artifacts(dir: &Path, result: &mut CompilationResult) {
    for (name, artifact_type) in KNOWN_ARTIFACTS {
        let path = dir.join(name);
        if path.is_file() {
            add_artifact(result, &path, *artifact_type, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn probes_fixed_names_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("example.nes"), b"NES\x1a").unwrap();
        fs::write(dir.path().join("other.nes"), b"NES\x1a").unwrap();
        let mut result = CompilationResult::default();
        probe_known_artifacts(dir.path(), &mut result);
        assert_eq!(result.artifacts.len(), 1);
        let art = &result.artifacts[0];
        assert_eq!(art.artifact_type, ArtifactType::NesRom);
        assert_eq!(art.name(), "example.nes");
        assert_eq!(art.bytes().unwrap(), b"NES\x1a");
    }

    #[test]
    fn missing_file_is_skipped() {
        let dir = tempdir().unwrap();
        let mut result = CompilationResult::default();
        assert!(!add_artifact(
            &mut result,
            &dir.path().join("nope.prg"),
            ArtifactType::C64Prg,
            None
        ));
        assert!(result.artifacts.is_empty());
    }

    #[test]
    fn display_name_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.s");
        fs::write(&path, [1u8, 8]).unwrap();
        let art =
            Artifact::from_file(&path, ArtifactType::C64Prg, Some("output.s.prg".into())).unwrap();
        assert_eq!(art.name(), "output.s.prg");
        let json = serde_json::to_value(&art).unwrap();
        assert_eq!(json["type"], "c64prg");
    }
}
