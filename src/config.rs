// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::guard::DEFAULT_FORBIDDEN_FLAGS;
use crate::languages::{self, Language};
use crate::request::SelectedLibrary;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compile source through a configured toolchain and print the normalized result"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Compiler table (TOML).
    #[arg(long, default_value = "cohcc.toml")]
    pub config: PathBuf,
    /// Directory for cached results.
    #[arg(long = "cache-dir")]
    pub cache_dir: Option<PathBuf>,
    /// Keep scratch directories for inspection.
    #[arg(long = "keep-workdir")]
    pub keep_workdir: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile one source file.
    Compile {
        /// Defaults to the first compiler for the source file's language.
        #[arg(long)]
        compiler: Option<String>,
        /// Source file; read from stdin when omitted.
        source: Option<PathBuf>,
        #[arg(long)]
        binary: bool,
        /// Apply the label, directive, comment and trim filters.
        #[arg(long)]
        filter: bool,
        #[arg(long)]
        intel: bool,
        /// Build through CMake; the source directory must hold CMakeLists.txt.
        #[arg(long)]
        cmake: bool,
        #[arg(long = "opt-remarks")]
        opt_remarks: bool,
        #[arg(long = "macro-expansion")]
        macro_expansion: bool,
        /// Library selector `id:version`, repeatable.
        #[arg(long = "lib")]
        libs: Vec<String>,
        #[arg(last = true)]
        options: Vec<String>,
    },
    /// List configured compilers.
    Compilers,
    /// List known languages.
    Languages,
}

/// Per-toolchain policy for steps after a failed one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepFailurePolicy {
    /// Run remaining steps so they can surface further diagnostics.
    #[default]
    Continue,
    /// Skip remaining steps.
    Abort,
}

/// One configured compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub exe: PathBuf,
    /// Toolchain strategy key.
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Options always passed, space separated.
    #[serde(default)]
    pub options: String,
    #[serde(default)]
    pub lib_path: Vec<String>,
    #[serde(default)]
    pub libpath_flag: Option<String>,
    #[serde(default)]
    pub include_flag: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub objdumper: Option<PathBuf>,
    #[serde(default)]
    pub step_failure_policy: Option<StepFailurePolicy>,
}

fn default_family() -> String {
    "default".to_owned()
}

fn default_lang() -> String {
    "c++".to_owned()
}

impl CompilerInfo {
    pub fn new(id: impl Into<String>, exe: impl Into<PathBuf>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            exe: exe.into(),
            family: default_family(),
            lang: default_lang(),
            options: String::new(),
            lib_path: Vec::new(),
            libpath_flag: None,
            include_flag: None,
            timeout_ms: None,
            objdumper: None,
            step_failure_policy: None,
        }
    }

    /// Configured options split on whitespace.
    pub fn option_args(&self) -> Vec<String> {
        self.options.split_whitespace().map(str::to_owned).collect()
    }
}

/// One library version available for linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryInfo {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub lib_path: Vec<String>,
    #[serde(default)]
    pub include_path: Vec<String>,
}

/// Service-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    pub timeout_ms: u64,
    pub max_output_bytes: usize,
    pub lib_download_path: Option<String>,
    pub keep_workdir: bool,
    pub cmake: PathBuf,
    pub invocation_log: Option<PathBuf>,
    pub forbidden_flags: Vec<String>,
    pub cache_dir: Option<PathBuf>,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_output_bytes: 64 * 1024,
            lib_download_path: None,
            keep_workdir: false,
            cmake: PathBuf::from("cmake"),
            invocation_log: None,
            forbidden_flags: DEFAULT_FORBIDDEN_FLAGS.iter().map(|s| (*s).to_owned()).collect(),
            cache_dir: None,
        }
    }
}

/// Resolved configuration: settings plus the compiler and library tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub explorer: ExplorerSettings,
    #[serde(default, rename = "compiler")]
    pub compilers: Vec<CompilerInfo>,
    #[serde(default, rename = "library")]
    pub libraries: Vec<LibraryInfo>,
}

impl ExplorerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let cfg: ExplorerConfig = toml::from_str(text)?;
        for (i, c) in cfg.compilers.iter().enumerate() {
            if cfg.compilers[..i].iter().any(|o| o.id == c.id) {
                anyhow::bail!("duplicate compiler id {}", c.id);
            }
        }
        Ok(cfg)
    }

    /// Load the file named on the command line and apply CLI overrides.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut cfg = Self::load(&cli.config)?;
        if cli.keep_workdir {
            cfg.explorer.keep_workdir = true;
        }
        if let Some(dir) = &cli.cache_dir {
            cfg.explorer.cache_dir = Some(dir.clone());
        }
        Ok(cfg)
    }

    pub fn compiler(&self, id: &str) -> anyhow::Result<&CompilerInfo> {
        self.compilers
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow!("unknown compiler {id}"))
    }

    /// First configured compiler for `language`.
    pub fn default_compiler_for(&self, language: &Language) -> Option<&CompilerInfo> {
        self.compilers
            .iter()
            .find(|c| languages::lookup(&c.lang).is_some_and(|l| l.id == language.id))
    }

    /// Timeout for `info`, falling back to the service default.
    pub fn timeout_for(&self, info: &CompilerInfo) -> Duration {
        Duration::from_millis(info.timeout_ms.unwrap_or(self.explorer.timeout_ms))
    }

    /// Look up requested libraries; unknown ones are skipped.
    pub fn resolve_libraries(&self, requested: &[SelectedLibrary]) -> Vec<LibraryInfo> {
        requested
            .iter()
            .filter_map(|sel| {
                let found = self
                    .libraries
                    .iter()
                    .find(|lib| lib.id == sel.id && lib.version == sel.version);
                if found.is_none() {
                    warn!("unknown library {}:{}", sel.id, sel.version);
                }
                found.cloned()
            })
            .collect()
    }
}
