// CLASSIFICATION: COMMUNITY
// Filename: cc65.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! cc65 6502 toolchain driven through `cl65`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::artifact::{add_artifact, ArtifactType};
use crate::parser::map_file::append_map_file;
use crate::request::Filters;
use crate::result::{BuildStepResult, CompilationResult};
use crate::toolchain::ToolchainRoot;
use crate::toolchains::{CompileContext, ToolchainStrategy};

/// Helper tools exported to downstream build systems when installed.
const HELPER_TOOLS: &[(&str, &str)] = &[("LD", "ld65"), ("AR", "ar65"), ("AS", "as65")];

pub struct Cc65Toolchain;

impl ToolchainStrategy for Cc65Toolchain {
    fn key(&self) -> &'static str {
        "cc65"
    }

    fn options_for_filter(&self, filters: &Filters, output: &Path) -> Vec<String> {
        let out = output.display().to_string();
        if filters.binary {
            vec!["-g".into(), "-o".into(), out]
        } else {
            vec!["-g".into(), "-S".into(), "-c".into(), "-o".into(), out]
        }
    }

    fn compiler_env(&self, ctx: &CompileContext<'_>) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("CC".to_owned(), ctx.info.exe.display().to_string());
        let flags = format!("{} {}", ctx.info.options, ctx.user_options.join(" "));
        env.insert("CFLAGS".to_owned(), flags.trim().to_owned());
        if let Some(root) = ToolchainRoot::from_compiler_exe(&ctx.info.exe) {
            for (var, tool) in HELPER_TOOLS {
                if let Some(path) = root.existing_tool(tool) {
                    env.insert((*var).to_owned(), path.display().to_string());
                }
            }
        }
        env
    }

    fn after_step(&self, name: &str, cwd: &Path, step: &mut BuildStepResult) {
        if name == "build" {
            append_map_file(step, cwd);
        }
    }

    fn post_build_artifacts(&self, ctx: &CompileContext<'_>, result: &mut CompilationResult) {
        // Only a linked program is loadable.
        if !ctx.request.filters.binary || !result.has_option("c64") || !ctx.output.is_file() {
            return;
        }
        let display_name = if ctx.output.to_string_lossy().ends_with(".prg") {
            None
        } else {
            ctx.output
                .file_name()
                .map(|name| format!("{}.prg", name.to_string_lossy()))
        };
        add_artifact(result, &ctx.output, ArtifactType::C64Prg, display_name);
    }
}
