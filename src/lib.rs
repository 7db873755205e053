// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v2.0
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Compilation execution and result normalization for the cohcc explorer.
//!
//! A [`CompileRequest`](request::CompileRequest) is laid out in a scratch
//! directory, built by the compiler family's
//! [`ToolchainStrategy`](toolchains::ToolchainStrategy) as a sequence of
//! named steps, and folded into one
//! [`CompilationResult`](result::CompilationResult): tagged diagnostics,
//! parsed assembly, optimization remarks, device listings and artifacts.

/// Invocation audit log and logging macros
pub mod logging;

pub mod artifact;
pub mod cache;
pub mod config;
pub mod exec;
pub mod explorer;
pub mod guard;
pub mod languages;
pub mod parser;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod toolchain;
pub mod toolchains;

pub use explorer::Explorer;
pub use request::CompileRequest;
pub use result::CompilationResult;
