// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Per-family customisation of the generic build pipeline.
//!
//! A toolchain is a [`ToolchainStrategy`]: a fixed set of hooks with shared
//! fallbacks in the trait's default methods. Families override only the
//! hooks where their conventions differ; the pipeline never inspects which
//! family it is driving.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{CompilerInfo, LibraryInfo, StepFailurePolicy};
use crate::exec::{ExecOptions, Executor};
use crate::languages::Language;
use crate::parser::asm::parse_asm;
use crate::request::{CompileRequest, Filters};
use crate::result::{BuildStepResult, CompilationResult};

pub mod cc65;
pub mod clang;
pub mod default;
pub mod registry;
pub mod rustc;

/// Name of the optimization-record file inside the scratch directory.
pub const OPT_RECORD_NAME: &str = "output.opt.yaml";

/// Everything a hook may need to know about the request being built.
#[derive(Debug, Clone)]
pub struct CompileContext<'a> {
    pub info: &'a CompilerInfo,
    pub request: &'a CompileRequest,
    pub language: &'static Language,
    /// Request-scoped scratch directory.
    pub workdir: &'a Path,
    /// Working directory of the final step; holds the primary output.
    pub step_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    /// User options after guarding.
    pub user_options: &'a [String],
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl CompileContext<'_> {
    pub fn opt_path(&self) -> PathBuf {
        self.workdir.join(OPT_RECORD_NAME)
    }

    /// Execution options for an auxiliary invocation in `cwd`.
    pub fn exec_options(&self, cwd: &Path) -> ExecOptions {
        ExecOptions {
            cwd: Some(cwd.to_path_buf()),
            env: BTreeMap::new(),
            timeout: self.timeout,
            max_output_bytes: self.max_output_bytes,
        }
    }

    /// True if `option` appears in the configured or the user options.
    pub fn has_option(&self, option: &str) -> bool {
        self.info.option_args().iter().any(|o| o == option)
            || self.user_options.iter().any(|o| o == option)
    }
}

pub trait ToolchainStrategy: Send + Sync {
    /// Registry key of the family.
    fn key(&self) -> &'static str;

    /// Linker search-path flags for the selected libraries.
    fn library_path_args(
        &self,
        info: &CompilerInfo,
        libraries: &[LibraryInfo],
        download_path: Option<&str>,
    ) -> Vec<String> {
        default::library_path_args(info, libraries, download_path)
    }

    /// Include-path flags for the selected libraries.
    fn include_args(&self, info: &CompilerInfo, libraries: &[LibraryInfo]) -> Vec<String> {
        default::include_args(info, libraries)
    }

    /// Flags selecting the output mode and naming the output file.
    fn options_for_filter(&self, filters: &Filters, output: &Path) -> Vec<String> {
        default::options_for_filter(filters, output)
    }

    /// Additional flags for optional outputs (remarks, traces).
    fn extra_options(&self, _ctx: &CompileContext<'_>) -> Vec<String> {
        Vec::new()
    }

    /// Variables exported to every step, for build systems driven downstream.
    fn compiler_env(&self, ctx: &CompileContext<'_>) -> BTreeMap<String, String> {
        default::compiler_env(ctx)
    }

    /// Called after step `name` ran in `cwd`, before it is recorded.
    fn after_step(&self, _name: &str, _cwd: &Path, _step: &mut BuildStepResult) {}

    /// Turn the primary output text into listings on `result`.
    fn process_assembly(&self, text: &str, filters: &Filters, result: &mut CompilationResult) {
        result.asm.extend(parse_asm(text, filters));
    }

    /// Derive side-channel outputs once all steps finished.
    fn post_compile(
        &self,
        _ctx: &CompileContext<'_>,
        _executor: &dyn Executor,
        _result: &mut CompilationResult,
    ) {
    }

    /// Attach family-specific artifacts after the default probe.
    fn post_build_artifacts(&self, _ctx: &CompileContext<'_>, _result: &mut CompilationResult) {}

    fn step_failure_policy(&self) -> StepFailurePolicy {
        StepFailurePolicy::Continue
    }

    fn supports_opt_output(&self) -> bool {
        false
    }

    fn supports_macro_expansion(&self) -> bool {
        false
    }
}
