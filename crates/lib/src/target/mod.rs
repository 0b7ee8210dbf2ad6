//! Build targets.
//!
//! A [`Target`] is one logical artifact (a static archive, a shared object
//! or an executable) together with everything needed to produce it. It is an
//! owned value threaded through each stage:
//!
//! ```no_run
//! use cbuild_lib::target::Target;
//!
//! # fn main() -> Result<(), cbuild_lib::target::BuildError> {
//! Target::new("g++")
//!   .out("bin", "test")?
//!   .flags(["-Wall"])
//!   .inc_paths(["lib"])
//!   .lib_paths(["bin"])
//!   .libs(["sum"])
//!   .src(["src/main.cpp"])
//!   .build()?
//!   .export_compile_commands()?
//!   .clean()?
//!   .run(std::env::args_os())?;
//! # Ok(())
//! # }
//! ```
//!
//! Every configuration setter replaces its field wholesale. The derived
//! state (`objects`, `compile_commands`) only ever grows.
//!
//! # Submodules
//!
//! - `compile` - Compilation stage, one object per source
//! - `link` - Link and archive stages
//! - `export` - Compile-command database writer
//! - `lifecycle` - Run and clean

mod compile;
mod export;
mod lifecycle;
mod link;
mod types;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::DEFAULT_ARCHIVER;
use crate::process::{self, LaunchMode};

pub use compile::object_path;
pub use types::*;

#[derive(Debug, Clone)]
pub struct Target {
  compiler: String,
  archiver: String,
  out_dir: String,
  out_file: String,
  flags: Vec<String>,
  sources: Vec<String>,
  include_paths: Vec<String>,
  library_paths: Vec<String>,
  libraries: Vec<String>,
  objects: Vec<String>,
  compile_commands: Vec<CompileCommand>,
  workdir: Option<PathBuf>,
  shell: Option<String>,
  launch_mode: LaunchMode,
  built: bool,
}

impl Target {
  /// Create a target driven by the given compiler identity (e.g. `g++`).
  pub fn new(compiler: impl Into<String>) -> Self {
    Self {
      compiler: compiler.into(),
      archiver: DEFAULT_ARCHIVER.to_string(),
      out_dir: String::new(),
      out_file: String::new(),
      flags: Vec::new(),
      sources: Vec::new(),
      include_paths: Vec::new(),
      library_paths: Vec::new(),
      libraries: Vec::new(),
      objects: Vec::new(),
      compile_commands: Vec::new(),
      workdir: None,
      shell: None,
      launch_mode: LaunchMode::default(),
      built: false,
    }
  }

  /// Set the output location to `dir`/`file`.
  ///
  /// A non-empty `dir` is created (recursively, idempotently) right away.
  /// An empty `dir` writes the artifact straight into the working directory.
  pub fn out(mut self, dir: impl Into<String>, file: impl Into<String>) -> Result<Self, BuildError> {
    let dir = dir.into();
    if !dir.is_empty() {
      let path = self.resolve_workdir()?.join(&dir);
      info!(dir = %dir, "generating directory");
      std::fs::create_dir_all(&path).map_err(|source| BuildError::CreateDir { path, source })?;
    }
    self.out_dir = dir;
    self.out_file = file.into();
    Ok(self)
  }

  pub fn flags<I, S>(mut self, flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.flags = collect(flags);
    self
  }

  pub fn src<I, S>(mut self, sources: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.sources = collect(sources);
    self
  }

  /// Include search paths, each passed as `-I<path>` when compiling.
  pub fn inc_paths<I, S>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.include_paths = collect(paths);
    self
  }

  /// Library search paths, each passed as `-L<path>` when linking.
  pub fn lib_paths<I, S>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.library_paths = collect(paths);
    self
  }

  /// Library names, each passed as `-l<name>` when linking.
  pub fn libs<I, S>(mut self, libs: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.libraries = collect(libs);
    self
  }

  /// Archive tool used by [`Target::build_static_lib`].
  pub fn archiver(mut self, archiver: impl Into<String>) -> Self {
    self.archiver = archiver.into();
    self
  }

  /// Directory that relative paths resolve against and invocations run in.
  ///
  /// Defaults to the process working directory. Set it before [`Target::out`]
  /// so the output directory is created in the right place.
  pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.workdir = Some(dir.into());
    self
  }

  pub fn shell(mut self, shell: impl Into<String>) -> Self {
    self.shell = Some(shell.into());
    self
  }

  pub fn launch_mode(mut self, mode: LaunchMode) -> Self {
    self.launch_mode = mode;
    self
  }

  pub fn sources(&self) -> &[String] {
    &self.sources
  }

  /// Object files produced so far, in source order.
  pub fn objects(&self) -> &[String] {
    &self.objects
  }

  /// Compile-command records, one per compiled source.
  pub fn compile_commands(&self) -> &[CompileCommand] {
    &self.compile_commands
  }

  /// Output location as used on command lines: `dir/file`, or just `file`
  /// when no directory was given.
  pub fn output_path(&self) -> String {
    if self.out_dir.is_empty() {
      self.out_file.clone()
    } else {
      format!("{}/{}", self.out_dir, self.out_file)
    }
  }

  fn resolve_workdir(&self) -> Result<PathBuf, BuildError> {
    let cwd = || std::env::current_dir().map_err(BuildError::WorkingDir);
    match &self.workdir {
      Some(dir) if dir.is_absolute() => Ok(dir.clone()),
      Some(dir) => Ok(cwd()?.join(dir)),
      None => cwd(),
    }
  }

  fn invoke(&self, cmd: &str, workdir: &Path) -> Result<std::process::ExitStatus, BuildError> {
    info!(cmd = %cmd, "running");
    process::run_shell(cmd, workdir, self.shell.as_deref()).map_err(|source| BuildError::Spawn {
      cmd: cmd.to_string(),
      source,
    })
  }

  fn ensure_unbuilt(&self) -> Result<(), BuildError> {
    if self.built {
      return Err(BuildError::AlreadyBuilt {
        output: self.output_path(),
      });
    }
    Ok(())
  }
}

fn collect<I, S>(items: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  items.into_iter().map(Into::into).collect()
}

/// Join command-line parts with single spaces, dropping empty parts.
fn join_command<I, S>(parts: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out = String::new();
  for part in parts {
    let part = part.as_ref();
    if part.is_empty() {
      continue;
    }
    if !out.is_empty() {
      out.push(' ');
    }
    out.push_str(part);
  }
  out
}

/// Prefix every item, e.g. `-I` onto include paths.
fn prefixed<'a>(prefix: &'a str, items: &'a [String]) -> impl Iterator<Item = String> + 'a {
  items.iter().map(move |item| format!("{prefix}{item}"))
}
