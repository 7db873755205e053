// CLASSIFICATION: COMMUNITY
// Filename: default.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! GCC-like behaviour shared by every family unless overridden.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::config::{CompilerInfo, LibraryInfo};
use crate::request::Filters;
use crate::toolchains::{CompileContext, ToolchainStrategy};

pub const DEFAULT_LIBPATH_FLAG: &str = "-L";
pub const DEFAULT_INCLUDE_FLAG: &str = "-I";
/// Download path used when none is configured.
pub const DEFAULT_DOWNLOAD_PATH: &str = ".";

/// Strategy with no overrides.
pub struct DefaultToolchain;

impl ToolchainStrategy for DefaultToolchain {
    fn key(&self) -> &'static str {
        "default"
    }
}

/// Library paths, then configured paths, then the download path, each with
/// the compiler's flag; later duplicates are dropped.
pub fn library_path_args(
    info: &CompilerInfo,
    libraries: &[LibraryInfo],
    download_path: Option<&str>,
) -> Vec<String> {
    let flag = info.libpath_flag.as_deref().unwrap_or(DEFAULT_LIBPATH_FLAG);
    let download = download_path
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_DOWNLOAD_PATH);
    let paths = libraries
        .iter()
        .flat_map(|lib| lib.lib_path.iter().map(String::as_str))
        .chain(info.lib_path.iter().map(String::as_str))
        .chain(std::iter::once(download));
    unique_prefixed(flag, paths)
}

pub fn include_args(info: &CompilerInfo, libraries: &[LibraryInfo]) -> Vec<String> {
    let flag = info.include_flag.as_deref().unwrap_or(DEFAULT_INCLUDE_FLAG);
    unique_prefixed(
        flag,
        libraries
            .iter()
            .flat_map(|lib| lib.include_path.iter().map(String::as_str)),
    )
}

fn unique_prefixed<'a>(flag: &str, paths: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .map(|p| format!("{flag}{p}"))
        .filter(|arg| seen.insert(arg.clone()))
        .collect()
}

pub fn options_for_filter(filters: &Filters, output: &Path) -> Vec<String> {
    let mut opts = vec!["-g".to_owned(), "-o".to_owned(), output.display().to_string()];
    if !filters.binary {
        if filters.intel {
            opts.push("-masm=intel".to_owned());
        }
        opts.push("-S".to_owned());
    }
    opts
}

pub fn compiler_env(ctx: &CompileContext<'_>) -> BTreeMap<String, String> {
    let var = if ctx.language.id == "c++" { "CXX" } else { "CC" };
    BTreeMap::from([(var.to_owned(), ctx.info.exe.display().to_string())])
}
