//! Environment-driven settings.
//!
//! Every setting has a default, so an empty environment is a valid
//! configuration. Descriptors read [`Settings::from_env`] once and feed the
//! values into their targets.

use std::env;

use crate::consts::{AR_ENV, CC_ENV, DEFAULT_ARCHIVER, LOG_ENV, NO_REBUILD_ENV, SHELL_ENV};

/// Compiler used when `CBUILD_CC` is unset.
pub const DEFAULT_COMPILER: &str = "g++";

/// Log filter used when `CBUILD_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  /// Compiler driver identity (`CBUILD_CC`).
  pub compiler: String,
  /// Archive tool (`CBUILD_AR`).
  pub archiver: String,
  /// Shell override for invocations (`CBUILD_SHELL`).
  pub shell: Option<String>,
  /// Skip the self-rebuild step (`CBUILD_NO_REBUILD`).
  pub no_rebuild: bool,
  /// `tracing` filter directive (`CBUILD_LOG`).
  pub log_filter: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      compiler: DEFAULT_COMPILER.to_string(),
      archiver: DEFAULT_ARCHIVER.to_string(),
      shell: None,
      no_rebuild: false,
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl Settings {
  /// Load settings from the process environment.
  ///
  /// Empty values are treated as unset.
  pub fn from_env() -> Self {
    let defaults = Self::default();

    Self {
      compiler: non_empty_var(CC_ENV).unwrap_or(defaults.compiler),
      archiver: non_empty_var(AR_ENV).unwrap_or(defaults.archiver),
      shell: non_empty_var(SHELL_ENV),
      no_rebuild: non_empty_var(NO_REBUILD_ENV).is_some_and(|v| is_truthy(&v)),
      log_filter: non_empty_var(LOG_ENV).unwrap_or(defaults.log_filter),
    }
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
  !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
