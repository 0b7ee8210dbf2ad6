//! Compile-command database writer.

use std::io;

use tracing::info;

use super::{BuildError, Target};
use crate::consts::COMPILE_COMMANDS_FILE;

impl Target {
  /// Write the accumulated compile commands, in order, to
  /// `compile_commands.json` in the working directory.
  ///
  /// The file is a strict JSON array with two-space indentation. An existing
  /// database is overwritten.
  pub fn export_compile_commands(self) -> Result<Self, BuildError> {
    let path = self.resolve_workdir()?.join(COMPILE_COMMANDS_FILE);

    let mut json = serde_json::to_string_pretty(&self.compile_commands)
      .map_err(|e| BuildError::WriteCompileCommands {
        path: path.clone(),
        source: io::Error::other(e),
      })?;
    json.push('\n');

    std::fs::write(&path, json).map_err(|source| BuildError::WriteCompileCommands {
      path: path.clone(),
      source,
    })?;

    info!(path = ?path, entries = self.compile_commands.len(), "wrote compile commands");
    Ok(self)
  }
}
