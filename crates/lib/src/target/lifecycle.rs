//! Run and clean.

use std::ffi::OsString;
use std::io;
use std::process::ExitStatus;

use tracing::{error, info};

use super::{BuildError, Target};
use crate::process;

impl Target {
  /// Hand control to the built artifact, forwarding `argv[1..]`.
  ///
  /// The artifact's own path becomes its `argv[0]`. In
  /// [`LaunchMode::Replace`](crate::process::LaunchMode::Replace) this does
  /// not return on success; in `Spawn` mode it returns the child's status.
  pub fn run<I, S>(self, argv: I) -> Result<ExitStatus, BuildError>
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    let path = self.resolve_workdir()?.join(self.output_path());
    let forwarded: Vec<OsString> = std::iter::once(path.clone().into_os_string())
      .chain(argv.into_iter().skip(1).map(Into::into))
      .collect();

    info!(path = ?path, "running");
    process::launch(&path, &forwarded, &[], self.launch_mode).map_err(|source| {
      error!(path = ?path, error = %source, "run failed");
      BuildError::Run { path, source }
    })
  }

  /// Delete every object file produced so far.
  ///
  /// The in-memory object list is kept, so this should be the last step
  /// before `run` or dropping the target. Objects that are already gone are
  /// skipped.
  pub fn clean(self) -> Result<Self, BuildError> {
    info!(objects = self.objects.len(), "cleaning");
    let workdir = self.resolve_workdir()?;

    for obj in &self.objects {
      let path = workdir.join(obj);
      match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(BuildError::Clean { path, source }),
      }
    }
    Ok(self)
  }
}
