//! Shared helpers for library integration tests.

use std::path::{Path, PathBuf};

use cbuild_lib::Target;
use tempfile::TempDir;

const FAKE_CC: &str = include_str!("../fixtures/fakecc.sh");
const FAKE_AR: &str = include_str!("../fixtures/fakear.sh");

/// Isolated build tree.
///
/// `tools/` holds the fake toolchain and its invocation log; `work/` is the
/// working directory targets build in.
pub struct TestEnv {
  pub temp: TempDir,
  pub cc: String,
  pub ar: String,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let tools = temp.path().join("tools");
    std::fs::create_dir_all(&tools).unwrap();
    std::fs::create_dir_all(temp.path().join("work")).unwrap();

    let write_tool = |name: &str, script: &str| {
      let path = tools.join(name);
      std::fs::write(&path, script).unwrap();
      format!("sh {}", path.display())
    };
    let cc = write_tool("fakecc", FAKE_CC);
    let ar = write_tool("fakear", FAKE_AR);

    Self { temp, cc, ar }
  }

  pub fn work(&self) -> PathBuf {
    self.temp.path().join("work")
  }

  /// A target wired to the fake toolchain and the work directory.
  pub fn target(&self) -> Target {
    Target::new(&self.cc).archiver(&self.ar).workdir(self.work())
  }

  /// Write a source file relative to the work directory.
  pub fn write_source(&self, relative_path: &str) {
    let path = self.work().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, "int f() { return 0; }\n").unwrap();
  }

  /// Every recorded tool invocation, in order.
  pub fn log(&self) -> Vec<String> {
    std::fs::read_to_string(self.temp.path().join("tools").join("toolchain.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  pub fn exists(&self, relative_path: &str) -> bool {
    self.work().join(relative_path).exists()
  }
}

/// Write an executable shell script.
pub fn write_script(path: &Path, body: &str) {
  use std::os::unix::fs::PermissionsExt;

  std::fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
