//! Blocking subprocess invocation and process replacement.
//!
//! Every external tool (compiler, archiver, rebuild command) is run through a
//! shell so invocation strings behave exactly as they would when typed at a
//! prompt. Relaunching the descriptor and running a built artifact go through
//! [`launch`], which replaces the current process image where the platform
//! supports it.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::consts::RELAUNCHED_ENV;

/// How [`launch`] hands control to the new program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchMode {
  /// Replace the current process image. On Unix this is `exec` and only
  /// returns on failure; elsewhere the child is spawned and the current
  /// process exits with the child's status.
  #[default]
  Replace,
  /// Spawn the program as a child, wait for it and return its status.
  Spawn,
}

/// Run `cmd` through the shell in `cwd`, blocking until it exits.
///
/// Standard streams are inherited so compiler diagnostics reach the user.
pub fn run_shell(cmd: &str, cwd: &Path, shell: Option<&str>) -> io::Result<ExitStatus> {
  let (shell_cmd, shell_args) = get_shell(shell);
  debug!(shell = %shell_cmd, cwd = ?cwd, "spawning process");

  Command::new(&shell_cmd).args(&shell_args).arg(cmd).current_dir(cwd).status()
}

/// Hand control to `program`, forwarding `argv`.
///
/// `argv[0]` becomes the new program's own `argv[0]` on Unix; the remaining
/// elements are passed as arguments. `env` is added to the inherited
/// environment, minus the relaunch marker, which only reaches the program
/// when `env` sets it again.
pub fn launch(program: &Path, argv: &[OsString], env: &[(&str, &str)], mode: LaunchMode) -> io::Result<ExitStatus> {
  let mut command = Command::new(program);
  if let Some((arg0, rest)) = argv.split_first() {
    set_arg0(&mut command, arg0);
    command.args(rest);
  }
  command.env_remove(RELAUNCHED_ENV);
  for (key, value) in env {
    command.env(key, value);
  }

  debug!(program = ?program, args = ?argv, ?mode, "launching");

  match mode {
    LaunchMode::Spawn => command.status(),
    LaunchMode::Replace => replace(command),
  }
}

#[cfg(unix)]
fn set_arg0(command: &mut Command, arg0: &OsString) {
  use std::os::unix::process::CommandExt;
  command.arg0(arg0);
}

#[cfg(not(unix))]
fn set_arg0(_command: &mut Command, _arg0: &OsString) {}

#[cfg(unix)]
fn replace(mut command: Command) -> io::Result<ExitStatus> {
  use std::os::unix::process::CommandExt;
  Err(command.exec())
}

#[cfg(not(unix))]
fn replace(mut command: Command) -> io::Result<ExitStatus> {
  let status = command.status()?;
  std::process::exit(status.code().unwrap_or(1));
}

/// Get the shell command and argument for the current platform.
///
/// An explicit override picks its argument style from the shell's name;
/// otherwise `/bin/sh -c` on Unix and `cmd.exe /C` on Windows.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}
