//! cbuild-lib: a self-hosting build-orchestration engine.
//!
//! A build descriptor is an ordinary program that uses this crate to say how
//! to compile sources, link or archive them, export a compile-command
//! database and run the result. The crate provides:
//! - `bootstrap`: rebuild and relaunch the descriptor when its source changed
//! - `target`: the per-artifact configuration and its build stages
//! - `process`: blocking shell invocations and process replacement
//! - `config`: settings read from the environment

pub mod bootstrap;
pub mod config;
pub mod consts;
pub mod process;
pub mod target;

pub use bootstrap::{Bootstrap, Outcome, Staleness, rebuild_self};
pub use config::Settings;
pub use process::LaunchMode;
pub use target::{BuildError, CompileCommand, Target};
