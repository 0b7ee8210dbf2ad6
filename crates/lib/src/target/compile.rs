//! Compilation stage.

use std::collections::HashMap;
use std::path::Path;

use tracing::error;

use super::{BuildError, CompileCommand, Target, join_command, prefixed};
use crate::consts::OBJECT_EXTENSION;

impl Target {
  /// Compile every declared source, in order, stopping at the first failure.
  ///
  /// Objects already produced stay on disk when a later source fails.
  /// Sources that would share an object file are rejected before anything
  /// is compiled.
  pub(super) fn compile_sources(&mut self, workdir: &Path) -> Result<(), BuildError> {
    check_object_collisions(&self.sources)?;

    let sources = self.sources.clone();
    for src in &sources {
      self.compile(src, workdir)?;
    }
    Ok(())
  }

  fn compile(&mut self, src: &str, workdir: &Path) -> Result<(), BuildError> {
    let obj = object_path(src);
    let cmd = self.compile_command_line(src, &obj);
    self.objects.push(obj);
    self.compile_commands.push(CompileCommand {
      directory: workdir.to_string_lossy().into_owned(),
      command: cmd.clone(),
      file: workdir.join(src).to_string_lossy().into_owned(),
    });

    let status = self.invoke(&cmd, workdir)?;
    if !status.success() {
      error!(src = %src, "compilation failed");
      return Err(BuildError::Compile {
        file: src.to_string(),
        cmd,
        code: status.code(),
      });
    }
    Ok(())
  }

  pub(super) fn compile_command_line(&self, src: &str, obj: &str) -> String {
    join_command(
      std::iter::once(self.compiler.clone())
        .chain(self.flags.iter().cloned())
        .chain(prefixed("-I", &self.include_paths))
        .chain(["-o".to_string(), obj.to_string(), "-c".to_string(), src.to_string()]),
    )
  }
}

fn check_object_collisions(sources: &[String]) -> Result<(), BuildError> {
  let mut seen: HashMap<String, &str> = HashMap::new();
  for src in sources {
    let object = object_path(src);
    if let Some(first) = seen.get(&object) {
      error!(object = %object, "object path collision");
      return Err(BuildError::ObjectCollision {
        first: first.to_string(),
        second: src.clone(),
        object,
      });
    }
    seen.insert(object, src);
  }
  Ok(())
}

/// Derive the object path for a source by replacing its trailing extension.
///
/// `lib/lib.cpp` and `lib/lib.c` both become `lib/lib.o` (so they cannot
/// share a target); a source without an extension gets one appended.
pub fn object_path(src: &str) -> String {
  Path::new(src).with_extension(OBJECT_EXTENSION).to_string_lossy().into_owned()
}
