// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Scripted executor shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cohcc::exec::{ExecOptions, ExecResult, Executor, TIMEOUT_EXIT_CODE};

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub options: ExecOptions,
}

type Handler = dyn Fn(&Call) -> ExecResult + Send + Sync;

/// Executor that records every call and answers through a closure.
#[derive(Clone)]
pub struct Scripted {
    calls: Arc<Mutex<Vec<Call>>>,
    handler: Arc<Handler>,
}

impl Scripted {
    pub fn new(handler: impl Fn(&Call) -> ExecResult + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            handler: Arc::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn boxed(&self) -> Box<dyn Executor> {
        Box::new(self.clone())
    }
}

impl Executor for Scripted {
    fn execute(&self, command: &Path, args: &[String], options: &ExecOptions) -> ExecResult {
        let call = Call {
            command: command.to_path_buf(),
            args: args.to_vec(),
            options: options.clone(),
        };
        self.calls.lock().unwrap().push(call.clone());
        (self.handler)(&call)
    }
}

pub fn exited(code: i32, stdout: &[&str], stderr: &[&str]) -> ExecResult {
    ExecResult {
        code,
        stdout: stdout.iter().map(|s| (*s).to_owned()).collect(),
        stderr: stderr.iter().map(|s| (*s).to_owned()).collect(),
        timed_out: false,
        launch_failure: None,
        supervision_failure: None,
        truncated: false,
        elapsed: Duration::from_millis(1),
    }
}

pub fn ok() -> ExecResult {
    exited(0, &[], &[])
}

pub fn timed_out() -> ExecResult {
    ExecResult {
        timed_out: true,
        ..exited(TIMEOUT_EXIT_CODE, &[], &["Killed - processing time exceeded"])
    }
}

/// Value following `flag` in `args`.
pub fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// True if `needle` appears as a contiguous run in `args`.
pub fn contains_run(args: &[String], needle: &[&str]) -> bool {
    args.windows(needle.len())
        .any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
