// CLASSIFICATION: COMMUNITY
// Filename: pipeline.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Sequential execution of named build steps.

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::StepFailurePolicy;
use crate::exec::{ExecOptions, Executor, StepFailure};
use crate::parser::output::parse_lines;
use crate::result::{BuildStepResult, CompilationResult};
use crate::toolchains::ToolchainStrategy;
use crate::{cohcc_info, cohcc_warn};

/// One external invocation contributing to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub options: ExecOptions,
}

impl BuildStep {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<PathBuf>,
        args: Vec<String>,
        options: ExecOptions,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            options,
        }
    }
}

fn describe(failure: &StepFailure) -> String {
    match failure {
        StepFailure::Launch(msg) => format!("launch failure: {msg}"),
        StepFailure::Supervision(msg) => format!("lost track of process: {msg}"),
        StepFailure::Timeout => "timed out".to_owned(),
        StepFailure::Exit(code) => format!("exit code {code}"),
    }
}

/// Runs steps through an executor and folds them into a result.
pub struct StepRunner<'a> {
    executor: &'a dyn Executor,
    strategy: &'a dyn ToolchainStrategy,
    input_filename: Option<String>,
    policy: StepFailurePolicy,
}

impl<'a> StepRunner<'a> {
    /// Runner using the strategy's own failure policy.
    pub fn new(executor: &'a dyn Executor, strategy: &'a dyn ToolchainStrategy) -> Self {
        Self {
            executor,
            strategy,
            input_filename: None,
            policy: strategy.step_failure_policy(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: StepFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Occurrences of `name` in step output are replaced by `<source>`.
    #[must_use]
    pub fn with_input_filename(mut self, name: Option<String>) -> Self {
        self.input_filename = name;
        self
    }

    pub fn policy(&self) -> StepFailurePolicy {
        self.policy
    }

    /// Execute one step and record it. Returns true if the step failed.
    pub fn run_step(&self, result: &mut CompilationResult, step: &BuildStep) -> bool {
        let key = self.strategy.key();
        let exec = self.executor.execute(&step.command, &step.args, &step.options);
        let input = self.input_filename.as_deref();
        let mut step_result = BuildStepResult::from_exec(
            step.name.as_str(),
            step.command.display().to_string(),
            step.args.clone(),
            &exec,
            parse_lines(&exec.stdout, input),
            parse_lines(&exec.stderr, input),
        );

        let cwd = step.options.cwd.as_deref().unwrap_or(Path::new("."));
        self.strategy.after_step(&step.name, cwd, &mut step_result);

        match exec.failure() {
            None => cohcc_info!(key, &step.command, &step.args, &format!("{} ok", step.name)),
            Some(failure) => cohcc_warn!(
                key,
                &step.command,
                &step.args,
                &format!("{} failed: {}", step.name, describe(&failure))
            ),
        }

        let failed = step_result.failed();
        result.record_step(step_result);
        failed
    }

    /// Run `steps` in order. Returns how many were executed.
    pub fn run_steps(&self, result: &mut CompilationResult, steps: &[BuildStep]) -> usize {
        for (i, step) in steps.iter().enumerate() {
            let failed = self.run_step(result, step);
            if failed && self.policy == StepFailurePolicy::Abort {
                let skipped = steps.len() - i - 1;
                if skipped > 0 {
                    debug!("step {} failed, skipping {skipped} remaining", step.name);
                }
                return i + 1;
            }
        }
        steps.len()
    }
}
