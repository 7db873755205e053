// CLASSIFICATION: COMMUNITY
// Filename: result.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Aggregate outcome of one compilation request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::exec::ExecResult;
use crate::parser::asm::AsmLine;
use crate::parser::opt_remarks::OptRemark;

/// Diagnostic severity derived from a message prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Location and message parsed out of a diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTag {
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Absent when the line referred to the request's own source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub text: String,
    pub severity: Severity,
}

/// One line of captured tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<MessageTag>,
}

impl ResultLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }
}

/// Outcome of one named build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStepResult {
    pub step: String,
    pub command: String,
    pub args: Vec<String>,
    pub code: i32,
    pub timed_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_failure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervision_failure: Option<String>,
    pub stdout: Vec<ResultLine>,
    pub stderr: Vec<ResultLine>,
    pub exec_time_ms: u64,
}

impl BuildStepResult {
    /// Wrap a raw execution result; lines are tagged by the caller.
    pub fn from_exec(
        step: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
        exec: &ExecResult,
        stdout: Vec<ResultLine>,
        stderr: Vec<ResultLine>,
    ) -> Self {
        Self {
            step: step.into(),
            command: command.into(),
            args,
            code: exec.code,
            timed_out: exec.timed_out,
            launch_failure: exec.launch_failure.clone(),
            supervision_failure: exec.supervision_failure.clone(),
            stdout,
            stderr,
            exec_time_ms: u64::try_from(exec.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.code != 0
            || self.timed_out
            || self.launch_failure.is_some()
            || self.supervision_failure.is_some()
    }
}

/// Normalized result returned to the UI layer.
///
/// Built up additively by the orchestrator; nothing here removes content
/// that was previously recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub code: i32,
    pub timed_out: bool,
    pub stdout: Vec<ResultLine>,
    pub stderr: Vec<ResultLine>,
    pub asm: Vec<AsmLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<BTreeMap<String, Vec<AsmLine>>>,
    pub artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_output: Option<Vec<OptRemark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_expansion_output: Option<Vec<ResultLine>>,
    #[serde(rename = "buildsteps")]
    pub build_steps: Vec<BuildStepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_filename: Option<String>,
    pub compilation_options: Vec<String>,
    pub exec_time_ms: u64,
}

impl CompilationResult {
    pub fn new(input_filename: Option<String>, compilation_options: Vec<String>) -> Self {
        Self {
            input_filename,
            compilation_options,
            ..Self::default()
        }
    }

    /// Append a finished step and merge its output into the aggregate.
    ///
    /// The first non-zero code wins and `timed_out` is sticky.
    pub fn record_step(&mut self, step: BuildStepResult) {
        if self.code == 0 {
            self.code = step.code;
        }
        self.timed_out |= step.timed_out;
        self.exec_time_ms = self.exec_time_ms.saturating_add(step.exec_time_ms);
        self.stdout.extend(step.stdout.iter().cloned());
        self.stderr.extend(step.stderr.iter().cloned());
        self.build_steps.push(step);
    }

    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn push_stderr(&mut self, line: ResultLine) {
        self.stderr.push(line);
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.compilation_options.iter().any(|o| o == option)
    }

    /// True when a recorded step never reached a normal exit.
    #[must_use]
    pub fn has_process_failure(&self) -> bool {
        self.timed_out
            || self
                .build_steps
                .iter()
                .any(|s| s.launch_failure.is_some() || s.supervision_failure.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, code: i32, stderr: &[&str]) -> BuildStepResult {
        BuildStepResult {
            step: name.into(),
            command: "cc".into(),
            args: vec![],
            code,
            timed_out: false,
            launch_failure: None,
            supervision_failure: None,
            stdout: vec![],
            stderr: stderr.iter().map(|s| ResultLine::plain(*s)).collect(),
            exec_time_ms: 3,
        }
    }

    #[test]
    fn record_step_is_additive_and_ordered() {
        let mut res = CompilationResult::new(Some("example.c".into()), vec![]);
        res.record_step(step("cmake", 0, &["configured"]));
        res.record_step(step("build", 2, &["e1", "e2"]));
        res.record_step(step("post", 5, &["late"]));
        let texts: Vec<_> = res.stderr.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["configured", "e1", "e2", "late"]);
        assert_eq!(res.code, 2);
        assert_eq!(res.build_steps.len(), 3);
        assert_eq!(res.build_steps[1].step, "build");
        assert_eq!(res.exec_time_ms, 9);
    }

    #[test]
    fn lost_process_counts_as_process_failure() {
        let mut res = CompilationResult::default();
        res.record_step(step("compile", 1, &["error: x"]));
        assert!(!res.has_process_failure());
        let mut lost = step("link", 125, &[]);
        lost.supervision_failure = Some("failed waiting for ld".into());
        assert!(lost.failed());
        res.record_step(lost);
        assert!(res.has_process_failure());
    }

    #[test]
    fn serializes_buildsteps_key() {
        let mut res = CompilationResult::default();
        res.record_step(step("compile", 0, &[]));
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("buildsteps").is_some());
        assert_eq!(json["timedOut"], serde_json::json!(false));
        assert!(json.get("optOutput").is_none());
    }
}
