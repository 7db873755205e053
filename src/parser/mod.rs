// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Pure parsers over tool output. None of them fail; absent or malformed
//! structured data degrades to an empty or `None` result and the raw text
//! stays in the captured stdout/stderr.

pub mod asm;
pub mod device_bundle;
pub mod map_file;
pub mod opt_remarks;
pub mod output;
