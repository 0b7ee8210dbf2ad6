//! Link and archive stages.
//!
//! Both run the compilation stage first and then turn the accumulated
//! objects into the final artifact. A target runs exactly one of them.

use std::path::Path;

use tracing::{error, info};

use super::{BuildError, Target, join_command, prefixed};

impl Target {
  /// Compile all sources, then link them into `out_dir/out_file` with the
  /// compiler driver.
  pub fn build(mut self) -> Result<Self, BuildError> {
    self.ensure_unbuilt()?;
    let workdir = self.resolve_workdir()?;
    self.compile_sources(&workdir)?;
    self.ensure_out_dir(&workdir)?;

    let cmd = self.link_command_line();
    let status = self.invoke(&cmd, &workdir)?;
    if !status.success() {
      error!(output = %self.output_path(), "building failed");
      return Err(BuildError::Link {
        output: self.output_path(),
        cmd,
        code: status.code(),
      });
    }

    self.built = true;
    info!(output = %self.out_file, "successfully built");
    Ok(self)
  }

  /// Compile all sources, then archive the objects with the archive tool.
  ///
  /// Flags, library paths and library names do not reach the archiver.
  pub fn build_static_lib(mut self) -> Result<Self, BuildError> {
    self.ensure_unbuilt()?;
    let workdir = self.resolve_workdir()?;
    self.compile_sources(&workdir)?;
    self.ensure_out_dir(&workdir)?;

    let cmd = self.archive_command_line();
    let status = self.invoke(&cmd, &workdir)?;
    if !status.success() {
      error!(output = %self.output_path(), "archiving failed");
      return Err(BuildError::Archive {
        output: self.output_path(),
        cmd,
        code: status.code(),
      });
    }

    self.built = true;
    info!(output = %self.out_file, "successfully built");
    Ok(self)
  }

  pub(super) fn link_command_line(&self) -> String {
    join_command(
      std::iter::once(self.compiler.clone())
        .chain(self.flags.iter().cloned())
        .chain(["-o".to_string(), self.output_path()])
        .chain(self.objects.iter().cloned())
        .chain(prefixed("-L", &self.library_paths))
        .chain(prefixed("-l", &self.libraries)),
    )
  }

  pub(super) fn archive_command_line(&self) -> String {
    join_command(
      [self.archiver.clone(), "rcs".to_string(), self.output_path()]
        .into_iter()
        .chain(self.objects.iter().cloned()),
    )
  }

  // `out` already created it; this covers a workdir changed afterwards.
  fn ensure_out_dir(&self, workdir: &Path) -> Result<(), BuildError> {
    if self.out_dir.is_empty() {
      return Ok(());
    }
    let path = workdir.join(&self.out_dir);
    std::fs::create_dir_all(&path).map_err(|source| BuildError::CreateDir { path, source })
  }
}
