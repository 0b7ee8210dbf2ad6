/// File name of the exported compile-command database.
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// Extension given to object files derived from sources.
pub const OBJECT_EXTENSION: &str = "o";

/// Archive tool used by `build_static_lib` unless overridden.
pub const DEFAULT_ARCHIVER: &str = "ar";

/// Set in the environment of a process relaunched by the bootstrap step.
pub const RELAUNCHED_ENV: &str = "CBUILD_RELAUNCHED";

pub const CC_ENV: &str = "CBUILD_CC";
pub const AR_ENV: &str = "CBUILD_AR";
pub const SHELL_ENV: &str = "CBUILD_SHELL";
pub const NO_REBUILD_ENV: &str = "CBUILD_NO_REBUILD";
pub const LOG_ENV: &str = "CBUILD_LOG";
