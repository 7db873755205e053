// CLASSIFICATION: COMMUNITY
// Filename: test_explorer_clang_rustc.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

mod common;

use std::fs;
use std::path::Path;

use cohcc::artifact::ArtifactType;
use cohcc::config::{CompilerInfo, ExplorerConfig, LibraryInfo};
use cohcc::exec::ExecResult;
use cohcc::request::{CompileRequest, Filters, SelectedLibrary};
use cohcc::Explorer;
use common::{arg_after, exited, ok, strings, timed_out, Scripted};
use tempfile::tempdir;

const REMARKS: &str = "--- !Analysis
Pass:            prologepilog
Name:            StackSize
DebugLoc:        { File: example.cpp, Line: 1, Column: 0 }
Function:        _Z6squarei
Args:
  - NumStackBytes:   '8'
  - String:          ' stack bytes in function'
...
";

const BUNDLED: &str = "# __CLANG_OFFLOAD_BUNDLE____START__ hip-amdgcn-amd-amdhsa--gfx906
\ts_endpgm
# __CLANG_OFFLOAD_BUNDLE____END__ hip-amdgcn-amd-amdhsa--gfx906
# __CLANG_OFFLOAD_BUNDLE____START__ host-x86_64-unknown-linux-gnu
square:
\tret
# __CLANG_OFFLOAD_BUNDLE____END__ host-x86_64-unknown-linux-gnu
";

fn config(family: &str, lang: &str, exe: &str) -> ExplorerConfig {
    let mut info = CompilerInfo::new("cc", exe);
    info.family = family.into();
    info.lang = lang.into();
    let mut cfg = ExplorerConfig::default();
    cfg.compilers.push(info);
    cfg
}

fn write_output(call: &common::Call, text: &str) {
    if let Some(out) = arg_after(&call.args, "-o") {
        fs::write(out, text).unwrap();
    }
}

#[test]
fn clang_optimization_remarks() {
    let exec = Scripted::new(|call| {
        write_output(call, "square:\n\tret\n");
        let record = call
            .args
            .iter()
            .find_map(|a| a.strip_prefix("-foptimization-record-file="));
        if let Some(path) = record {
            fs::write(path, REMARKS).unwrap();
        }
        ok()
    });
    let explorer =
        Explorer::with_executor(config("clang", "c++", "/usr/bin/clang++"), exec.boxed()).unwrap();
    let mut req = CompileRequest::new("cc", "int square(int x) { return x * x; }");
    req.produce_opt_info = true;
    let result = explorer.compile(&req).unwrap();

    let args = &exec.calls()[0].args;
    assert!(args.iter().any(|a| a == "-fsave-optimization-record"));
    let remarks = result.opt_output.unwrap();
    assert_eq!(remarks.len(), 1);
    assert_eq!(remarks[0].name, "StackSize");
    assert_eq!(remarks[0].display_string, "8 stack bytes in function");
    assert!(result.opt_path.unwrap().ends_with("output.opt.yaml"));
}

#[test]
fn clang_without_request_has_no_remarks() {
    let exec = Scripted::new(|call| {
        write_output(call, "square:\n\tret\n");
        ok()
    });
    let explorer =
        Explorer::with_executor(config("clang", "c++", "/usr/bin/clang++"), exec.boxed()).unwrap();
    let result = explorer.compile(&CompileRequest::new("cc", "int x;")).unwrap();
    assert!(!exec.calls()[0].args.iter().any(|a| a.starts_with("-fsave")));
    assert!(result.opt_output.is_none());
    assert!(result.devices.is_none());
}

#[test]
fn clang_device_bundle() {
    let exec = Scripted::new(|call| {
        write_output(call, BUNDLED);
        ok()
    });
    let explorer =
        Explorer::with_executor(config("clang", "c++", "/usr/bin/clang++"), exec.boxed()).unwrap();
    let result = explorer.compile(&CompileRequest::new("cc", "__global__ void k() {}")).unwrap();

    let asm: Vec<_> = result.asm.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(asm, ["square:", "\tret"]);
    let devices = result.devices.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices["hip-amdgcn-amd-amdhsa--gfx906"][0].text, "\ts_endpgm");
}

#[test]
fn clang_time_trace_artifact() {
    let exec = Scripted::new(|call| {
        write_output(call, "square:\n\tret\n");
        let out = Path::new(arg_after(&call.args, "-o").unwrap());
        fs::write(out.with_extension("json"), "{\"traceEvents\":[]}").unwrap();
        ok()
    });
    let explorer =
        Explorer::with_executor(config("clang", "c++", "/usr/bin/clang++"), exec.boxed()).unwrap();
    let mut req = CompileRequest::new("cc", "int x;");
    req.options = strings(&["-ftime-trace"]);
    let result = explorer.compile(&req).unwrap();
    assert_eq!(result.artifacts.len(), 1);
    assert_eq!(result.artifacts[0].artifact_type, ArtifactType::TimeTrace);
    assert_eq!(result.artifacts[0].name(), "output.json");
}

#[test]
fn rustc_macro_expansion() {
    let exec = Scripted::new(|call| {
        if call.args.iter().any(|a| a == "-Zunpretty=expanded") {
            assert_eq!(call.options.env.get("RUSTC_BOOTSTRAP").map(String::as_str), Some("1"));
            return exited(0, &["#[prelude_import]", "use std::prelude::rust_2021::*;"], &[]);
        }
        write_output(call, "square:\n\tret\n");
        ok()
    });
    let cfg = config("rustc", "rust", "/opt/rust/bin/rustc");
    let explorer = Explorer::with_executor(cfg, exec.boxed()).unwrap();
    let mut req = CompileRequest::new("cc", "pub fn square(x: i32) -> i32 { x * x }");
    req.produce_macro_expansion = true;
    let result = explorer.compile(&req).unwrap();

    let calls = exec.calls();
    assert_eq!(calls.len(), 2);
    assert!(common::contains_run(&calls[0].args, &["--emit", "asm", "--crate-type", "rlib"]));
    assert!(calls[1].args.last().unwrap().ends_with("example.rs"));
    let expanded: Vec<_> = result
        .macro_expansion_output
        .unwrap()
        .into_iter()
        .map(|l| l.text)
        .collect();
    assert_eq!(expanded, ["#[prelude_import]", "use std::prelude::rust_2021::*;"]);
    // The auxiliary run is not a build step.
    assert_eq!(result.build_steps.len(), 1);
}

#[test]
fn library_paths_in_binary_mode() {
    let exec = Scripted::new(|_| ok());
    let mut cfg = config("default", "c++", "/usr/bin/g++");
    cfg.compilers[0].lib_path = strings(&["/opt/lib", "."]);
    cfg.libraries.push(LibraryInfo {
        id: "fmt".into(),
        version: "10".into(),
        lib_path: strings(&["libA", "/opt/lib"]),
        include_path: strings(&["/opt/fmt/include"]),
    });
    let explorer = Explorer::with_executor(cfg, exec.boxed()).unwrap();
    let mut req = CompileRequest::new("cc", "int main() {}");
    req.filters = Filters {
        binary: true,
        ..Filters::default()
    };
    req.libraries.push(SelectedLibrary {
        id: "fmt".into(),
        version: "10".into(),
    });
    explorer.compile(&req).unwrap();

    let args = &exec.calls()[0].args;
    let lib_args: Vec<_> = args
        .iter()
        .filter(|a| a.starts_with("-L"))
        .map(String::as_str)
        .collect();
    assert_eq!(lib_args, ["-LlibA", "-L/opt/lib", "-L."]);
    assert!(args.iter().any(|a| a == "-I/opt/fmt/include"));
}

#[test]
fn forbidden_user_options_never_reach_the_compiler() {
    let exec = Scripted::new(|_| ok());
    let explorer =
        Explorer::with_executor(config("default", "c", "/usr/bin/gcc"), exec.boxed()).unwrap();
    let mut req = CompileRequest::new("cc", "int x;");
    req.options = strings(&["-O2", "-B/tmp/evil", "--sysroot=/"]);
    explorer.compile(&req).unwrap();
    let args = &exec.calls()[0].args;
    assert!(args.iter().any(|a| a == "-O2"));
    assert!(!args.iter().any(|a| a.starts_with("-B") || a.starts_with("--sysroot")));
}

fn counting_explorer(cache_dir: &Path, answer: fn() -> ExecResult) -> (Explorer, Scripted) {
    let exec = Scripted::new(move |_| answer());
    let mut cfg = config("default", "c", "/usr/bin/gcc");
    cfg.explorer.cache_dir = Some(cache_dir.to_path_buf());
    (Explorer::with_executor(cfg, exec.boxed()).unwrap(), exec)
}

#[test]
fn successful_results_are_cached() {
    let dir = tempdir().unwrap();
    let (explorer, exec) = counting_explorer(dir.path(), || exited(0, &["hello"], &[]));
    let req = CompileRequest::new("cc", "int x;");
    let first = explorer.compile(&req).unwrap();
    let second = explorer.compile(&req).unwrap();
    assert_eq!(exec.calls().len(), 1);
    assert_eq!(first, second);

    let mut other = req.clone();
    other.options = strings(&["-O1"]);
    explorer.compile(&other).unwrap();
    assert_eq!(exec.calls().len(), 2);
}

#[test]
fn timeouts_are_not_cached() {
    let dir = tempdir().unwrap();
    let (explorer, exec) = counting_explorer(dir.path(), timed_out);
    let req = CompileRequest::new("cc", "int x;");
    let result = explorer.compile(&req).unwrap();
    assert!(result.timed_out);
    explorer.compile(&req).unwrap();
    assert_eq!(exec.calls().len(), 2);
}

#[test]
fn unknown_compiler_and_family() {
    let exec = Scripted::new(|_| ok());
    let explorer = Explorer::with_executor(config("msvc", "c", "cl.exe"), exec.boxed()).unwrap();
    assert!(explorer.compile(&CompileRequest::new("nope", "")).is_err());
    assert!(explorer.compile(&CompileRequest::new("cc", "")).is_err());
    assert!(exec.calls().is_empty());
}
