// CLASSIFICATION: COMMUNITY
// Filename: guard.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

use log::warn;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::CompilerInfo;
use crate::request::{BuildKind, CompileRequest, Filters, SelectedLibrary, SourceFile};

/// Flags that redirect the toolchain outside the scratch directory.
pub const DEFAULT_FORBIDDEN_FLAGS: &[&str] = &["-fplugin", "-B", "--sysroot", "-specs"];

/// Drop user options matching a forbidden flag, in either the exact,
/// `flag=value` or joined (`-Bdir`) spelling.
pub fn filter_user_options(options: &[String], forbidden: &[String]) -> Vec<String> {
    options
        .iter()
        .filter(|opt| {
            let blocked = forbidden.iter().any(|flag| is_forbidden(opt, flag));
            if blocked {
                warn!("dropping forbidden option {opt}");
            }
            !blocked
        })
        .cloned()
        .collect()
}

fn is_forbidden(option: &str, flag: &str) -> bool {
    if flag.is_empty() {
        return false;
    }
    option == flag || option.starts_with(flag)
}

/// Validate the name of an extra file written into the scratch directory.
pub fn validate_filename(name: &str) -> anyhow::Result<()> {
    if name.is_empty() {
        anyhow::bail!("file name must not be empty");
    }
    if name == "." || name == ".." || name.contains("..") {
        anyhow::bail!("file name '{name}' is not permitted");
    }
    if name.starts_with('/') || name.contains('\\') {
        anyhow::bail!("file name '{name}' must be relative");
    }
    if name.as_bytes().contains(&0) {
        anyhow::bail!("file name contains NUL byte");
    }
    Ok(())
}

#[derive(Serialize)]
struct CacheKeyInput<'a> {
    compiler: &'a str,
    exe: &'a std::path::Path,
    compiler_options: &'a str,
    options: &'a [String],
    filters: &'a Filters,
    source: &'a str,
    files: &'a [SourceFile],
    libraries: &'a [SelectedLibrary],
    build: BuildKind,
    opt: bool,
    macro_expansion: bool,
}

/// Stable hash identifying a request against a specific compiler.
pub fn cache_key(info: &CompilerInfo, request: &CompileRequest, options: &[String]) -> String {
    let input = CacheKeyInput {
        compiler: &info.id,
        exe: &info.exe,
        compiler_options: &info.options,
        options,
        filters: &request.filters,
        source: &request.source,
        files: &request.files,
        libraries: &request.libraries,
        build: request.build,
        opt: request.produce_opt_info,
        macro_expansion: request.produce_macro_expansion,
    };
    // Serialising plain data into a Vec cannot fail.
    let bytes = serde_json::to_vec(&input).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}
