// CLASSIFICATION: COMMUNITY
// Filename: rustc.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::collections::BTreeMap;
use std::path::Path;

use crate::exec::Executor;
use crate::parser::output::parse_lines;
use crate::request::Filters;
use crate::result::CompilationResult;
use crate::toolchains::{CompileContext, ToolchainStrategy};

pub struct RustcToolchain;

impl RustcToolchain {
    fn macro_expansion_args(input: &Path) -> Vec<String> {
        vec![
            "--edition".into(),
            "2021".into(),
            "-Zunpretty=expanded".into(),
            input.display().to_string(),
        ]
    }
}

impl ToolchainStrategy for RustcToolchain {
    fn key(&self) -> &'static str {
        "rustc"
    }

    fn options_for_filter(&self, filters: &Filters, output: &Path) -> Vec<String> {
        let mut opts = vec![
            "-C".to_owned(),
            "debuginfo=2".to_owned(),
            "-o".to_owned(),
            output.display().to_string(),
        ];
        if filters.binary {
            opts.extend(["--crate-type".to_owned(), "bin".to_owned()]);
        } else {
            opts.extend([
                "--emit".to_owned(),
                "asm".to_owned(),
                "--crate-type".to_owned(),
                "rlib".to_owned(),
            ]);
            if filters.intel {
                opts.extend(["-C".to_owned(), "llvm-args=--x86-asm-syntax=intel".to_owned()]);
            }
        }
        opts
    }

    // rustc is never driven by a downstream build system.
    fn compiler_env(&self, _ctx: &CompileContext<'_>) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn post_compile(
        &self,
        ctx: &CompileContext<'_>,
        executor: &dyn Executor,
        result: &mut CompilationResult,
    ) {
        if !ctx.request.produce_macro_expansion {
            return;
        }
        let args = Self::macro_expansion_args(&ctx.input);
        let mut options = ctx.exec_options(ctx.workdir);
        options.env.insert("RUSTC_BOOTSTRAP".into(), "1".into());
        let exec = executor.execute(&ctx.info.exe, &args, &options);
        let input_name = result.input_filename.clone();
        let lines = if exec.succeeded() {
            parse_lines(&exec.stdout, input_name.as_deref())
        } else {
            crate::cohcc_warn!(self.key(), &ctx.info.exe, &args, "macro expansion failed");
            parse_lines(&exec.stderr, input_name.as_deref())
        };
        result.macro_expansion_output = Some(lines);
    }

    fn supports_macro_expansion(&self) -> bool {
        true
    }
}
