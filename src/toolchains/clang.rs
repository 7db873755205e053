// CLASSIFICATION: COMMUNITY
// Filename: clang.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::collections::BTreeMap;

use log::debug;

use crate::artifact::{add_artifact, ArtifactType};
use crate::exec::Executor;
use crate::parser::asm::parse_asm;
use crate::parser::device_bundle::{host_target, split_device_code};
use crate::parser::opt_remarks::process_opt_output;
use crate::request::Filters;
use crate::result::CompilationResult;
use crate::toolchains::{CompileContext, ToolchainStrategy};

const TIME_TRACE_FLAG: &str = "-ftime-trace";

/// Clang and clang-based offloading compilers.
pub struct ClangToolchain;

impl ToolchainStrategy for ClangToolchain {
    fn key(&self) -> &'static str {
        "clang"
    }

    fn extra_options(&self, ctx: &CompileContext<'_>) -> Vec<String> {
        if !ctx.request.produce_opt_info {
            return Vec::new();
        }
        vec![
            "-fsave-optimization-record".to_owned(),
            format!("-foptimization-record-file={}", ctx.opt_path().display()),
        ]
    }

    fn process_assembly(&self, text: &str, filters: &Filters, result: &mut CompilationResult) {
        let Some(bundle) = split_device_code(text) else {
            result.asm.extend(parse_asm(text, filters));
            return;
        };
        let host = host_target(&bundle).map(str::to_owned);
        match host.as_deref().and_then(|h| bundle.get(h)) {
            Some(host_text) => result.asm.extend(parse_asm(host_text, filters)),
            None => result.asm.extend(parse_asm(text, filters)),
        }
        let devices: BTreeMap<_, _> = bundle
            .iter()
            .filter(|(name, _)| Some(name.as_str()) != host.as_deref())
            .map(|(name, body)| (name.clone(), parse_asm(body, filters)))
            .collect();
        debug!("split offload bundle into {} device listing(s)", devices.len());
        result.devices = Some(devices);
    }

    fn post_compile(
        &self,
        ctx: &CompileContext<'_>,
        _executor: &dyn Executor,
        result: &mut CompilationResult,
    ) {
        if ctx.request.produce_opt_info {
            result.opt_path = Some(ctx.opt_path());
            result.opt_output = Some(process_opt_output(result));
        }
    }

    fn post_build_artifacts(&self, ctx: &CompileContext<'_>, result: &mut CompilationResult) {
        if !ctx.has_option(TIME_TRACE_FLAG) {
            return;
        }
        let trace = ctx.output.with_extension("json");
        if trace.is_file() {
            add_artifact(result, &trace, ArtifactType::TimeTrace, None);
        }
    }

    fn supports_opt_output(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED: &str = "\
# __CLANG_OFFLOAD_BUNDLE____START__ openmp-nvptx64
\tmov.u32 %r1, 0;
# __CLANG_OFFLOAD_BUNDLE____END__ openmp-nvptx64
# __CLANG_OFFLOAD_BUNDLE____START__ host-x86_64-unknown-linux-gnu
square:
\tret
# __CLANG_OFFLOAD_BUNDLE____END__ host-x86_64-unknown-linux-gnu
";

    #[test]
    fn bundle_host_becomes_asm() {
        let mut result = CompilationResult::default();
        ClangToolchain.process_assembly(BUNDLED, &Filters::default(), &mut result);
        let asm: Vec<_> = result.asm.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(asm, ["square:", "\tret"]);
        let devices = result.devices.unwrap();
        assert_eq!(devices.keys().collect::<Vec<_>>(), ["openmp-nvptx64"]);
        assert_eq!(devices["openmp-nvptx64"][0].text, "\tmov.u32 %r1, 0;");
    }

    #[test]
    fn plain_text_has_no_devices() {
        let mut result = CompilationResult::default();
        ClangToolchain.process_assembly("square:\n\tret\n", &Filters::default(), &mut result);
        assert_eq!(result.asm.len(), 2);
        assert!(result.devices.is_none());
    }
}
