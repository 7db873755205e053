// CLASSIFICATION: COMMUNITY
// Filename: logging.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use log::Level;
use once_cell::sync::OnceCell;

static AUDIT_PATH: OnceCell<PathBuf> = OnceCell::new();
static AUDIT_LOCK: Mutex<()> = Mutex::new(());

/// Route invocation records to `path` in addition to the `log` facade.
///
/// Only the first call takes effect.
pub fn init_audit(path: impl Into<PathBuf>) -> bool {
    AUDIT_PATH.set(path.into()).is_ok()
}

fn append(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let _guard = AUDIT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{} {}", Utc::now().to_rfc3339(), line)?;
    f.flush()
}

pub fn format_record(
    level: Level,
    toolchain: &str,
    command: &Path,
    args: &[String],
    msg: &str,
) -> String {
    format!(
        "level={level} toolchain={toolchain} command={} args={:?} msg={}",
        command.display(),
        args,
        msg
    )
}

/// Record one tool invocation.
pub fn log_invocation(level: Level, toolchain: &str, command: &Path, args: &[String], msg: &str) {
    let record = format_record(level, toolchain, command, args, msg);
    log::log!(target: "cohcc::invocation", level, "{record}");
    if let Some(path) = AUDIT_PATH.get() {
        let _ = append(path, &record);
    }
}

#[macro_export]
macro_rules! cohcc_info {
    ($toolchain:expr, $command:expr, $args:expr, $msg:expr $(,)?) => {
        $crate::logging::log_invocation(::log::Level::Info, $toolchain, $command, $args, $msg)
    };
}

#[macro_export]
macro_rules! cohcc_warn {
    ($toolchain:expr, $command:expr, $args:expr, $msg:expr $(,)?) => {
        $crate::logging::log_invocation(::log::Level::Warn, $toolchain, $command, $args, $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_format() {
        let rec = format_record(
            Level::Info,
            "cc65",
            Path::new("/opt/cc65/bin/cl65"),
            &["-g".to_owned()],
            "compile",
        );
        assert_eq!(
            rec,
            "level=INFO toolchain=cc65 command=/opt/cc65/bin/cl65 args=[\"-g\"] msg=compile"
        );
    }
}
