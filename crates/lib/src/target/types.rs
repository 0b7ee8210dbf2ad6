//! Error and record types shared by every build stage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while bootstrapping or driving a target.
///
/// Every variant is terminal for the pipeline that produced it: stages stop
/// at the first failure and nothing is rolled back.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Recompiling the stale descriptor failed.
  #[error("rebuilding the descriptor failed with exit code {code:?}: {cmd}")]
  Rebuild { cmd: String, code: Option<i32> },

  /// A source unit's compiler invocation exited non-zero.
  #[error("compilation failed at {file} (exit code {code:?}): {cmd}")]
  Compile { file: String, cmd: String, code: Option<i32> },

  /// Two sources of one target map to the same object file.
  #[error("{first} and {second} both compile to {object}")]
  ObjectCollision { object: String, first: String, second: String },

  /// The final link invocation exited non-zero.
  #[error("linking {output} failed with exit code {code:?}: {cmd}")]
  Link { output: String, cmd: String, code: Option<i32> },

  /// The archive tool exited non-zero.
  #[error("archiving {output} failed with exit code {code:?}: {cmd}")]
  Archive { output: String, cmd: String, code: Option<i32> },

  /// Handing control to the built artifact failed.
  #[error("failed to run {}: {source}", path.display())]
  Run { path: PathBuf, source: std::io::Error },

  /// A process could not be started at all.
  #[error("failed to start `{cmd}`: {source}")]
  Spawn { cmd: String, source: std::io::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write {}: {source}", path.display())]
  WriteCompileCommands { path: PathBuf, source: std::io::Error },

  #[error("failed to remove {}: {source}", path.display())]
  Clean { path: PathBuf, source: std::io::Error },

  /// A terminal action was invoked on a target that already ran one.
  #[error("target {output} has already been built")]
  AlreadyBuilt { output: String },

  #[error("failed to determine working directory: {0}")]
  WorkingDir(#[source] std::io::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// One entry of the compile-command database.
///
/// `directory` and `file` are absolute; `command` is the literal invocation
/// string that produced the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
  pub directory: String,
  pub command: String,
  pub file: String,
}
