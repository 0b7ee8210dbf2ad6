//! Self-rebuild bootstrap.
//!
//! A build descriptor is itself a compiled program. Before it configures any
//! target, it compares the modification time of its own source with that of
//! its compiled artifact. When the source is strictly newer, the descriptor
//! is recompiled and the fresh artifact replaces the running process with the
//! same argument vector, so execution restarts from the top with no state
//! carried over.
//!
//! A relaunched process carries `CBUILD_RELAUNCHED=1` and never relaunches
//! again, which bounds the cycle to one rebuild per invocation.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use tracing::{debug, error, info, warn};

use crate::consts::RELAUNCHED_ENV;
use crate::process::{self, LaunchMode};
use crate::target::BuildError;

static BOOTSTRAPPED: AtomicBool = AtomicBool::new(false);

/// Freshness of the descriptor's artifact relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
  /// Artifact is at least as new as the source.
  Fresh,
  /// Source is strictly newer than the artifact.
  Stale,
  /// No artifact yet (first run).
  MissingArtifact,
  /// Source is not on disk, so there is nothing to rebuild from.
  MissingSource,
}

impl Staleness {
  pub fn needs_rebuild(self) -> bool {
    matches!(self, Staleness::Stale | Staleness::MissingArtifact)
  }
}

/// What the caller should do after [`Bootstrap::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The running artifact is current; carry on building.
  Proceed,
  /// A fresh artifact ran in a child process and exited with this status.
  /// Only reachable in [`LaunchMode::Spawn`]; `Replace` never returns here
  /// on Unix.
  Relaunched(ExitStatus),
}

#[derive(Debug, Clone)]
pub struct Bootstrap {
  source: PathBuf,
  artifact: PathBuf,
  rebuild_command: String,
  launch_mode: LaunchMode,
}

impl Bootstrap {
  /// Bootstrap for a descriptor compiled from `source` into `artifact`.
  ///
  /// The default rebuild command is `rustc -o <artifact> <source>`.
  pub fn new(source: impl Into<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
    let source = source.into();
    let artifact = artifact.into();
    let rebuild_command = format!("rustc -o {} {}", artifact.display(), source.display());
    Self {
      source,
      artifact,
      rebuild_command,
      launch_mode: LaunchMode::default(),
    }
  }

  /// Bootstrap for the currently running executable.
  pub fn for_current_exe(source: impl Into<PathBuf>) -> Result<Self, BuildError> {
    let artifact = std::env::current_exe().map_err(BuildError::Io)?;
    Ok(Self::new(source, artifact))
  }

  /// Shell command that recompiles the descriptor.
  pub fn rebuild_command(mut self, cmd: impl Into<String>) -> Self {
    self.rebuild_command = cmd.into();
    self
  }

  pub fn launch_mode(mut self, mode: LaunchMode) -> Self {
    self.launch_mode = mode;
    self
  }

  pub fn source(&self) -> &Path {
    &self.source
  }

  pub fn artifact(&self) -> &Path {
    &self.artifact
  }

  /// Compare the modification times of source and artifact.
  pub fn staleness(&self) -> Result<Staleness, BuildError> {
    let Some(src_time) = modified(&self.source)? else {
      return Ok(Staleness::MissingSource);
    };
    let Some(bin_time) = modified(&self.artifact)? else {
      return Ok(Staleness::MissingArtifact);
    };

    debug!(source = ?self.source, artifact = ?self.artifact, ?src_time, ?bin_time, "checking staleness");
    if src_time > bin_time {
      Ok(Staleness::Stale)
    } else {
      Ok(Staleness::Fresh)
    }
  }

  /// Rebuild and relaunch if the artifact is stale.
  ///
  /// `argv` is forwarded verbatim, `argv[0]` included.
  pub fn run<I, S>(&self, argv: I) -> Result<Outcome, BuildError>
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    if std::env::var_os(RELAUNCHED_ENV).is_some() {
      debug!("already relaunched, skipping staleness check");
      return Ok(Outcome::Proceed);
    }

    match self.staleness()? {
      Staleness::Fresh => return Ok(Outcome::Proceed),
      Staleness::MissingSource => {
        warn!(source = ?self.source, "descriptor source not found, skipping rebuild");
        return Ok(Outcome::Proceed);
      }
      Staleness::Stale | Staleness::MissingArtifact => {}
    }

    info!(source = ?self.source, "rebuilding descriptor");
    self.rebuild()?;

    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    info!(artifact = ?self.artifact, "relaunching");
    let env = [(RELAUNCHED_ENV, "1")];
    let status = process::launch(&self.artifact, &argv, &env, self.launch_mode).map_err(|source| BuildError::Run {
      path: self.artifact.clone(),
      source,
    })?;
    Ok(Outcome::Relaunched(status))
  }

  fn rebuild(&self) -> Result<(), BuildError> {
    let cmd = &self.rebuild_command;
    info!(cmd = %cmd, "running");

    let cwd = std::env::current_dir().map_err(BuildError::WorkingDir)?;
    let status = process::run_shell(cmd, &cwd, None).map_err(|source| BuildError::Spawn {
      cmd: cmd.clone(),
      source,
    })?;
    if !status.success() {
      error!("rebuilding failed");
      return Err(BuildError::Rebuild {
        cmd: cmd.clone(),
        code: status.code(),
      });
    }
    Ok(())
  }
}

/// Process-wide, run-once bootstrap.
///
/// The first call behaves like [`Bootstrap::run`]; every later call in the
/// same process returns [`Outcome::Proceed`] without touching the
/// filesystem.
pub fn rebuild_self<I, S>(bootstrap: &Bootstrap, argv: I) -> Result<Outcome, BuildError>
where
  I: IntoIterator<Item = S>,
  S: Into<OsString>,
{
  if BOOTSTRAPPED.swap(true, Ordering::SeqCst) {
    return Ok(Outcome::Proceed);
  }
  bootstrap.run(argv)
}

fn modified(path: &Path) -> Result<Option<SystemTime>, BuildError> {
  match std::fs::metadata(path) {
    Ok(meta) => Ok(Some(meta.modified()?)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e.into()),
  }
}
