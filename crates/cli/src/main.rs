//! Sample build descriptor.
//!
//! Builds the demo `sum` library (shared by default, static with
//! `--static`), links it into the demo executable, exports
//! `compile_commands.json`, removes the objects and runs the result. Before
//! any of that, argument validation included, it rebuilds and relaunches
//! itself if this file changed since the running binary was compiled.

mod output;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use cbuild_lib::consts::COMPILE_COMMANDS_FILE;
use cbuild_lib::{Bootstrap, Outcome, Settings, Target, rebuild_self};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::{format_duration, print_info, print_stat, print_success};

const DEFAULT_PROJECT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demo");

#[cfg(target_os = "windows")]
const SHARED_LIB: &str = "libsum.dll";
#[cfg(target_os = "macos")]
const SHARED_LIB: &str = "libsum.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SHARED_LIB: &str = "libsum.so";

const STATIC_LIB: &str = "libsum.a";

/// cbuild - build the demo library and executable
#[derive(Parser)]
#[command(name = "cbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project directory containing lib/ and src/
  #[arg(short = 'C', long, default_value = DEFAULT_PROJECT_DIR)]
  dir: PathBuf,

  /// Compiler driver (overrides CBUILD_CC)
  #[arg(long)]
  cc: Option<String>,

  /// Build libsum as a static archive instead of a shared library
  #[arg(long = "static")]
  static_lib: bool,

  /// Stop after building; do not run the executable
  #[arg(long)]
  no_run: bool,

  /// Keep object files instead of cleaning them
  #[arg(long)]
  keep_objects: bool,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,

  /// Arguments forwarded to the demo executable
  #[arg(last = true)]
  args: Vec<OsString>,
}

/// Everything a target needs that does not change between targets.
struct Toolchain {
  cc: String,
  ar: String,
  shell: Option<String>,
  dir: PathBuf,
}

impl Toolchain {
  fn target(&self) -> Target {
    let target = Target::new(&self.cc).archiver(&self.ar).workdir(&self.dir);
    match &self.shell {
      Some(shell) => target.shell(shell),
      None => target,
    }
  }
}

fn main() -> Result<()> {
  let settings = Settings::from_env();
  // Argument errors and --help are reported only after the bootstrap.
  let parsed = Cli::try_parse();

  let verbose = parsed.as_ref().is_ok_and(|cli| cli.verbose);
  let filter = if verbose { "debug" } else { settings.log_filter.as_str() };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if !settings.no_rebuild {
    bootstrap()?;
  }
  let cli = parsed.unwrap_or_else(|e| e.exit());

  let dir = dunce::canonicalize(&cli.dir)
    .with_context(|| format!("project directory not found: {}", cli.dir.display()))?;
  debug!(dir = ?dir, "project directory");
  let toolchain = Toolchain {
    cc: cli.cc.clone().unwrap_or(settings.compiler),
    ar: settings.archiver,
    shell: settings.shell,
    dir,
  };

  build_demo(&toolchain, &cli)
}

/// Rebuild this descriptor through cargo when its source is newer than the
/// running binary, then relaunch with the same arguments.
fn bootstrap() -> Result<()> {
  let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
  let profile = if cfg!(debug_assertions) { "" } else { " --release" };
  let bootstrap = Bootstrap::for_current_exe(manifest_dir.join("src").join("main.rs"))?.rebuild_command(format!(
    "cargo build --quiet --manifest-path {} --bin cbuild{}",
    manifest_dir.join("Cargo.toml").display(),
    profile
  ));

  match rebuild_self(&bootstrap, std::env::args_os()).context("self-rebuild failed")? {
    Outcome::Proceed => Ok(()),
    Outcome::Relaunched(status) => std::process::exit(status.code().unwrap_or(1)),
  }
}

fn build_shared(toolchain: &Toolchain) -> Result<Target> {
  toolchain
    .target()
    .out("bin", SHARED_LIB)?
    .flags(["-shared", "-fPIC"])
    .src(["lib/lib.cpp"])
    .build()
    .context("building shared libsum")
}

fn build_static(toolchain: &Toolchain) -> Result<Target> {
  toolchain
    .target()
    .out("bin", STATIC_LIB)?
    .flags(["-Wall"])
    .src(["lib/lib.cpp"])
    .build_static_lib()
    .context("building static libsum")
}

fn build_demo(toolchain: &Toolchain, cli: &Cli) -> Result<()> {
  let start = Instant::now();

  let lib = if cli.static_lib {
    build_static(toolchain)?
  } else {
    build_shared(toolchain)?
  };
  let lib = if cli.keep_objects { lib } else { lib.clean()? };

  let exe = toolchain
    .target()
    .out("bin", "test")?
    .flags(["-Wall", "-Wl,-rpath='$ORIGIN'"])
    .inc_paths(["lib"])
    .lib_paths(["bin"])
    .libs(["sum"])
    .src(["src/main.cpp"])
    .build()
    .context("building demo executable")?
    .export_compile_commands()?;
  let exe = if cli.keep_objects { exe } else { exe.clean()? };

  print_success(&format!("Built {}", exe.output_path()));
  print_stat("Library", &lib.output_path());
  print_stat("Compile commands", &toolchain.dir.join(COMPILE_COMMANDS_FILE).display().to_string());
  print_stat("Duration", &format_duration(start.elapsed()));

  if cli.no_run {
    print_info("Skipping run");
    return Ok(());
  }

  let argv = std::iter::once(OsString::from("cbuild")).chain(cli.args.iter().cloned());
  let status = exe.run(argv).context("running demo executable")?;
  if !status.success() {
    std::process::exit(status.code().unwrap_or(1));
  }
  Ok(())
}
