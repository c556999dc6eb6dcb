//! Global constants used throughout the atconf codebase.
//!
//! File names, syntax characters and search defaults live here so the
//! parsers, the orchestrator and the CLI agree on them.

/// Placeholder delimiter. `@@` is an escaped delimiter, `@NAME@` a reference.
pub const DELIMITER: char = '@';

/// Comment marker in the cache file.
pub const COMMENT_MARKER: char = '#';

/// Trailing line continuation marker in the cache file.
pub const CONTINUATION_MARKER: char = '\\';

/// Suffix every configure template must carry. The output path is the template
/// path with this suffix removed.
pub const TEMPLATE_SUFFIX: &str = ".in";

/// Default cache file written by `atconf configure`, relative to the project root.
pub const CACHE_FILENAME: &str = "config.cache";

/// Project manifest file name.
pub const MANIFEST_FILENAME: &str = "atconf.toml";

/// Subcommand token after which `NAME=VALUE` overrides are accepted.
pub const CONFIGURE_COMMAND: &str = "configure";

/// Default file extension of the generated constants module.
pub const DEFAULT_CONSTANTS_EXTENSION: &str = "py";

/// Directories appended to the program search path when defaults are included.
pub const DEFAULT_PROGRAM_DIRS: &[&str] =
    &["/bin", "/sbin", "/usr/local/bin", "/usr/local/sbin", "/usr/bin", "/usr/sbin"];

/// Fallback search path when `PATH` is not set.
pub const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";
