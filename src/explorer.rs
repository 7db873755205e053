// CLASSIFICATION: COMMUNITY
// Filename: explorer.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Request flow: from a [`CompileRequest`] to a finished [`CompilationResult`].
//!
//! Each request owns a scratch directory for its whole lifetime. Steps run
//! strictly in order inside it and every probe of its contents happens after
//! the producing step returned. The directory is removed when the request
//! ends unless `keep_workdir` is set.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use log::{debug, info, warn};

use crate::artifact::probe_known_artifacts;
use crate::cache::FileCache;
use crate::config::{CompilerInfo, ExplorerConfig};
use crate::exec::{Executor, ProcessExecutor};
use crate::guard::{cache_key, filter_user_options, validate_filename};
use crate::languages::{self, Language};
use crate::pipeline::{BuildStep, StepRunner};
use crate::request::{BuildKind, CompileRequest};
use crate::result::{CompilationResult, ResultLine};
use crate::toolchains::registry::get_strategy;
use crate::toolchains::{CompileContext, ToolchainStrategy};

const CMAKE_LISTS: &str = "CMakeLists.txt";
const CMAKE_BUILD_DIR: &str = "build";

pub struct Explorer {
    config: ExplorerConfig,
    executor: Box<dyn Executor>,
    cache: Option<FileCache>,
}

impl Explorer {
    /// Explorer running real processes, with the configured cache.
    pub fn new(config: ExplorerConfig) -> anyhow::Result<Self> {
        Self::with_executor(config, Box::new(ProcessExecutor::new()))
    }

    pub fn with_executor(
        config: ExplorerConfig,
        executor: Box<dyn Executor>,
    ) -> anyhow::Result<Self> {
        let cache = match &config.explorer.cache_dir {
            Some(dir) => Some(FileCache::new(dir)?),
            None => None,
        };
        Ok(Self {
            config,
            executor,
            cache,
        })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Run one request to completion.
    ///
    /// Errors are setup failures only (unknown compiler, unusable scratch
    /// directory). Tool failures are reported inside the result.
    pub fn compile(&self, request: &CompileRequest) -> anyhow::Result<CompilationResult> {
        let info = self.config.compiler(&request.compiler)?;
        let strategy = get_strategy(&info.family)
            .with_context(|| format!("compiler {}", info.id))?;
        let language = languages::lookup(&info.lang)
            .ok_or_else(|| anyhow!("compiler {} has unknown language {}", info.id, info.lang))?;
        for file in &request.files {
            validate_filename(&file.filename)?;
        }
        if request.build == BuildKind::CMake
            && !request.files.iter().any(|f| f.filename == CMAKE_LISTS)
        {
            anyhow::bail!("cmake build requires a {CMAKE_LISTS}");
        }
        if request.produce_opt_info && !strategy.supports_opt_output() {
            warn!("{} does not produce optimization remarks", info.id);
        }
        if request.produce_macro_expansion && !strategy.supports_macro_expansion() {
            warn!("{} does not support macro expansion", info.id);
        }

        let user_options =
            filter_user_options(&request.options, &self.config.explorer.forbidden_flags);
        let key = cache_key(info, request, &user_options);
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            info!("compile {} served from cache", info.id);
            return Ok(hit);
        }

        let workdir = tempfile::Builder::new()
            .prefix("cohcc")
            .tempdir()
            .context("create scratch directory")?;
        info!(
            "compile {} ({}) in {}",
            info.id,
            strategy.key(),
            workdir.path().display()
        );
        let outcome = self.compile_in(
            workdir.path(),
            info,
            strategy.as_ref(),
            language,
            request,
            &user_options,
        );
        if self.config.explorer.keep_workdir {
            let kept = workdir.into_path();
            info!("kept scratch directory {}", kept.display());
        }
        let result = outcome?;

        if let Some(cache) = &self.cache {
            if result.has_process_failure() {
                debug!("not caching {key}: process failure");
            } else if let Err(err) = cache.put(&key, &result) {
                warn!("cache store failed: {err:#}");
            }
        }
        Ok(result)
    }

    fn compile_in(
        &self,
        workdir: &Path,
        info: &CompilerInfo,
        strategy: &dyn ToolchainStrategy,
        language: &'static Language,
        request: &CompileRequest,
        user_options: &[String],
    ) -> anyhow::Result<CompilationResult> {
        let input = workdir.join(language.source_filename());
        fs::write(&input, &request.source)
            .with_context(|| format!("write {}", input.display()))?;
        for file in &request.files {
            let path = workdir.join(&file.filename);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &file.contents)
                .with_context(|| format!("write {}", path.display()))?;
        }

        let step_dir = match request.build {
            BuildKind::Single => workdir.to_path_buf(),
            BuildKind::CMake => {
                let dir = workdir.join(CMAKE_BUILD_DIR);
                fs::create_dir_all(&dir)
                    .with_context(|| format!("create {}", dir.display()))?;
                dir
            }
        };
        let output = step_dir.join(request.output_name());
        let ctx = CompileContext {
            info,
            request,
            language,
            workdir,
            step_dir: step_dir.clone(),
            input: input.clone(),
            output: output.clone(),
            user_options,
            timeout: self.config.timeout_for(info),
            max_output_bytes: self.config.explorer.max_output_bytes,
        };

        let options = self.compiler_options(&ctx, strategy);
        let input_name = input.display().to_string();
        let mut result = CompilationResult::new(Some(input_name.clone()), options.clone());
        let steps = self.build_steps(&ctx, strategy, options);

        let policy = info
            .step_failure_policy
            .unwrap_or_else(|| strategy.step_failure_policy());
        StepRunner::new(self.executor.as_ref(), strategy)
            .with_policy(policy)
            .with_input_filename(Some(input_name))
            .run_steps(&mut result, &steps);

        if output.is_file() {
            if request.filters.binary {
                self.disassemble(&ctx, strategy, &mut result);
            } else {
                match fs::read(&output) {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes);
                        strategy.process_assembly(&text, &request.filters, &mut result);
                    }
                    Err(err) => warn!("unreadable output {}: {err}", output.display()),
                }
            }
        } else {
            debug!("no primary output at {}", output.display());
        }

        strategy.post_compile(&ctx, self.executor.as_ref(), &mut result);
        probe_known_artifacts(&step_dir, &mut result);
        strategy.post_build_artifacts(&ctx, &mut result);
        Ok(result)
    }

    /// Full compiler argument list, input last.
    fn compiler_options(
        &self,
        ctx: &CompileContext<'_>,
        strategy: &dyn ToolchainStrategy,
    ) -> Vec<String> {
        let filters = &ctx.request.filters;
        let libraries = self.config.resolve_libraries(&ctx.request.libraries);
        let mut options = ctx.info.option_args();
        options.extend(strategy.options_for_filter(filters, &ctx.output));
        options.extend(strategy.extra_options(ctx));
        options.extend(strategy.include_args(ctx.info, &libraries));
        options.extend(ctx.user_options.iter().cloned());
        if filters.binary {
            options.extend(strategy.library_path_args(
                ctx.info,
                &libraries,
                self.config.explorer.lib_download_path.as_deref(),
            ));
        }
        options.push(ctx.input.display().to_string());
        options
    }

    fn build_steps(
        &self,
        ctx: &CompileContext<'_>,
        strategy: &dyn ToolchainStrategy,
        compiler_options: Vec<String>,
    ) -> Vec<BuildStep> {
        match ctx.request.build {
            BuildKind::Single => {
                let exec = ctx.exec_options(ctx.workdir);
                vec![BuildStep::new("compile", ctx.info.exe.clone(), compiler_options, exec)]
            }
            BuildKind::CMake => {
                let mut exec = ctx.exec_options(&ctx.step_dir);
                exec.env = strategy.compiler_env(ctx);
                let cmake = self.config.explorer.cmake.clone();
                let mut configure: Vec<String> = ctx.user_options.to_vec();
                configure.push(ctx.workdir.display().to_string());
                vec![
                    BuildStep::new("cmake", cmake.clone(), configure, exec.clone()),
                    BuildStep::new("build", cmake, vec!["--build".into(), ".".into()], exec),
                ]
            }
        }
    }

    /// Binary mode: list the output through the configured disassembler.
    fn disassemble(
        &self,
        ctx: &CompileContext<'_>,
        strategy: &dyn ToolchainStrategy,
        result: &mut CompilationResult,
    ) {
        let Some(objdumper) = &ctx.info.objdumper else {
            debug!("{} has no disassembler configured", ctx.info.id);
            return;
        };
        let mut args: Vec<String> = vec!["-d".into(), "-l".into(), "-C".into()];
        if ctx.request.filters.intel {
            args.extend(["-M".to_owned(), "intel".to_owned()]);
        }
        args.push(ctx.output.display().to_string());
        let exec = self
            .executor
            .execute(objdumper, &args, &ctx.exec_options(&ctx.step_dir));
        if exec.succeeded() {
            strategy.process_assembly(&exec.stdout.join("\n"), &ctx.request.filters, result);
        } else {
            warn!("disassembly of {} failed", ctx.output.display());
            for line in &exec.stderr {
                result.push_stderr(ResultLine::plain(line.as_str()));
            }
        }
    }
}

