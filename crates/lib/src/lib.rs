//! slsrust-lib: Core types and logic for building Rust functions for a
//! serverless `provided` runtime.
//!
//! This crate provides the pieces the packaging lifecycle hooks are built from:
//! - `toolchain`: cargo arguments, cross-compilation environment, output paths and invocation
//! - `stage`: copying the built binary to the fixed `bootstrap` name
//! - `build` / `clean`: the per-function orchestrators run before and after packaging
//! - `plugin`: lifecycle hook registration and dispatch
//! - `config` / `registry`: the service definition and the packaging state the hooks update

pub mod build;
pub mod clean;
pub mod config;
pub mod consts;
pub mod platform;
pub mod plugin;
pub mod registry;
pub mod stage;
pub mod toolchain;
#[cfg(test)]
pub(crate) mod util;
