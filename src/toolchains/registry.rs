// CLASSIFICATION: COMMUNITY
// Filename: registry.rs v0.5
// Author: Lukas Bower
// Date Modified: 2026-10-19

use crate::toolchains::cc65::Cc65Toolchain;
use crate::toolchains::clang::ClangToolchain;
use crate::toolchains::default::DefaultToolchain;
use crate::toolchains::rustc::RustcToolchain;
use crate::toolchains::ToolchainStrategy;

/// Families accepted in the `family` key of a compiler entry.
pub const KNOWN_FAMILIES: &[&str] = &["default", "gcc", "cc65", "clang", "rustc"];

pub fn get_strategy(name: &str) -> anyhow::Result<Box<dyn ToolchainStrategy>> {
    match name {
        "" | "default" | "gcc" => Ok(Box::new(DefaultToolchain)),
        "cc65" => Ok(Box::new(Cc65Toolchain)),
        "clang" => Ok(Box::new(ClangToolchain)),
        "rustc" | "rust" => Ok(Box::new(RustcToolchain)),
        other => Err(anyhow::anyhow!("Unknown toolchain family {other}")),
    }
}
