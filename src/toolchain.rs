// CLASSIFICATION: COMMUNITY
// Filename: toolchain.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::path::{Path, PathBuf};

use crate::logging;

/// Installation root of a compiler: the parent of the directory holding its
/// executable, with helper tools under `bin/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainRoot {
    base: PathBuf,
}

impl ToolchainRoot {
    pub fn new<P: Into<PathBuf>>(base: P) -> anyhow::Result<Self> {
        let base = base.into();
        if base.as_os_str().is_empty() {
            anyhow::bail!("toolchain directory cannot be empty");
        }
        Ok(ToolchainRoot { base })
    }

    /// Root for the compiler at `exe` (`<root>/bin/<exe>`).
    pub fn from_compiler_exe(exe: &Path) -> Option<Self> {
        let bin_dir = exe.parent()?;
        let root = bin_dir.parent()?;
        Self::new(root).ok()
    }

    pub fn get_tool_path(&self, tool_name: &str) -> anyhow::Result<PathBuf> {
        if tool_name.trim().is_empty() {
            anyhow::bail!("tool name cannot be empty");
        }
        if tool_name.contains('/') || tool_name.contains("..") {
            anyhow::bail!("invalid tool name");
        }
        Ok(self.base.join("bin").join(tool_name))
    }

    /// Path of `tool_name` only if it exists on disk.
    pub fn existing_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let path = self.get_tool_path(tool_name).ok()?;
        if path.is_file() {
            logging::log_invocation(log::Level::Debug, "toolchain", &path, &[], "resolve");
            Some(path)
        } else {
            None
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}
