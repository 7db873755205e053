// CLASSIFICATION: COMMUNITY
// Filename: main.rs v2.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use cohcc::config::{Cli, Command, ExplorerConfig};
use cohcc::request::{parse_library_selector, BuildKind, CompileRequest, Filters, SourceFile};
use cohcc::{languages, logging, Explorer};

#[derive(Serialize)]
struct CompilerSummary<'a> {
    id: &'a str,
    name: &'a str,
    family: &'a str,
    lang: &'a str,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_source(source: Option<&Path>) -> anyhow::Result<String> {
    match source {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("read stdin")?;
            Ok(text)
        }
    }
}

/// Compiler for a request that named none: the first one configured for the
/// source file's language.
fn pick_compiler(cfg: &ExplorerConfig, source: Option<&Path>) -> anyhow::Result<String> {
    let path = source.context("--compiler is required when reading stdin")?;
    let language = languages::detect_language(path)
        .with_context(|| format!("cannot tell the language of {}", path.display()))?;
    let info = cfg
        .default_compiler_for(language)
        .with_context(|| format!("no compiler configured for {}", language.name))?;
    Ok(info.id.clone())
}

/// Top-level files of a CMake project directory.
fn read_project(dir: &Path) -> anyhow::Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let contents =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        files.push(SourceFile {
            filename: entry.file_name().to_string_lossy().into_owned(),
            contents,
        });
    }
    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}

/// Entry point for the cohcc binary.
pub fn main_entry() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Languages => print_json(&languages::all().collect::<Vec<_>>()),
        Command::Compilers => {
            let cfg = ExplorerConfig::from_cli(&cli)?;
            let list: Vec<_> = cfg
                .compilers
                .iter()
                .map(|c| CompilerSummary {
                    id: &c.id,
                    name: &c.name,
                    family: &c.family,
                    lang: &c.lang,
                })
                .collect();
            print_json(&list)
        }
        Command::Compile {
            ref compiler,
            ref source,
            binary,
            filter,
            intel,
            cmake,
            opt_remarks,
            macro_expansion,
            ref libs,
            ref options,
        } => {
            let cfg = ExplorerConfig::from_cli(&cli)?;
            if let Some(log) = &cfg.explorer.invocation_log {
                logging::init_audit(log);
            }
            let compiler = match compiler {
                Some(id) => id.clone(),
                None if cmake => anyhow::bail!("--cmake needs --compiler"),
                None => pick_compiler(&cfg, source.as_deref())?,
            };
            let mut request = CompileRequest::new(compiler, String::new());
            if cmake {
                let dir = source.as_deref().context("--cmake needs a project directory")?;
                request.files = read_project(dir)?;
                request.build = BuildKind::CMake;
            } else {
                request.source = read_source(source.as_deref())?;
            }
            request.options = options.clone();
            request.filters = Filters {
                binary,
                labels: filter,
                directives: filter,
                comment_only: filter,
                trim: filter,
                intel,
            };
            for selector in libs {
                let lib = parse_library_selector(selector)
                    .with_context(|| format!("bad library selector {selector}"))?;
                request.libraries.push(lib);
            }
            request.produce_opt_info = opt_remarks;
            request.produce_macro_expansion = macro_expansion;

            let explorer = Explorer::new(cfg)?;
            let result = explorer.compile(&request)?;
            print_json(&result)?;
            if result.code != 0 {
                std::process::exit(result.code.clamp(1, 255));
            }
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = main_entry() {
        eprintln!("cohcc: {e:#}");
        std::process::exit(1);
    }
}
