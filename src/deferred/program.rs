//! Program lookup on a search path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{optional_text, text_list};
use crate::constants::{DEFAULT_PROGRAM_DIRS, DEFAULT_SEARCH_PATH};
use crate::core::{ConfigureError, Result};
use crate::substitution::{Deferred, SubstitutionTable, Value, substitute};

/// Render candidates as `a`, `a or b`, `a, b or c`.
pub fn format_program_list(programs: &[String]) -> String {
    match programs {
        [] => String::new(),
        [single] => single.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Parameters shared by [`FindProgram`] and [`RequireProgram`], unresolved.
#[derive(Debug, Clone)]
struct ProgramQuery {
    programs: Value,
    default: Value,
    path: Value,
    include_defaults: bool,
}

/// Parameters after substitution.
struct ResolvedQuery {
    programs: Vec<String>,
    default: Option<String>,
    search_path: OsString,
}

impl ProgramQuery {
    fn from_values(programs: Value, default: Value, path: Value, include_defaults: bool) -> Self {
        Self {
            programs,
            default,
            path,
            include_defaults,
        }
    }

    fn resolve(&self, table: &mut SubstitutionTable) -> Result<ResolvedQuery> {
        let programs = text_list(&substitute(&self.programs, table)?, "programs")?;
        let default = optional_text(&substitute(&self.default, table)?, "default")?;
        let path = optional_text(&substitute(&self.path, table)?, "path")?;

        let path = path
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_else(|| OsString::from(DEFAULT_SEARCH_PATH));
        let search_path =
            if self.include_defaults { with_default_dirs(&path) } else { path };

        Ok(ResolvedQuery {
            programs,
            default,
            search_path,
        })
    }
}

/// Append the standard system directories that are not already on `path`.
fn with_default_dirs(path: &OsString) -> OsString {
    let mut dirs: Vec<PathBuf> = std::env::split_paths(path).collect();
    for dir in DEFAULT_PROGRAM_DIRS {
        let dir = PathBuf::from(dir);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    std::env::join_paths(dirs).unwrap_or_else(|_| path.clone())
}

impl ResolvedQuery {
    /// First candidate found on the search path.
    fn search(&self) -> Option<PathBuf> {
        info!("Looking for {}", format_program_list(&self.programs));
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        self.programs.iter().find_map(|program| {
            match which::which_in(program, Some(&self.search_path), &cwd) {
                Ok(found) => {
                    debug!("Found {} at {}", program, found.display());
                    Some(found)
                }
                Err(e) => {
                    debug!("{} not found: {}", program, e);
                    None
                }
            }
        })
    }
}

fn path_value(path: &Path) -> Value {
    Value::text(path.to_string_lossy())
}

/// Constructors and builders shared by the program lookups, all delegating to
/// the wrapped [`ProgramQuery`].
macro_rules! program_lookup_builders {
    ($lookup:ident) => {
        impl $lookup {
            /// Look for `programs`, tried in order.
            pub fn new<I, S>(programs: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                let programs = programs.into_iter().map(Value::text).collect();
                Self::from_values(Value::Sequence(programs), Value::Absent, Value::Absent, true)
            }

            /// Build from unresolved parameter values, as read from a manifest.
            pub fn from_values(
                programs: Value,
                default: Value,
                path: Value,
                include_defaults: bool,
            ) -> Self {
                Self {
                    query: ProgramQuery::from_values(programs, default, path, include_defaults),
                }
            }

            /// Value used when no candidate is found.
            #[must_use]
            pub fn with_default(mut self, default: impl Into<String>) -> Self {
                self.query.default = Value::text(default);
                self
            }

            /// Search this path instead of `PATH`.
            #[must_use]
            pub fn with_path(mut self, path: impl Into<String>) -> Self {
                self.query.path = Value::text(path);
                self
            }

            /// Whether the standard system directories are appended to the search path.
            #[must_use]
            pub fn include_defaults(mut self, include: bool) -> Self {
                self.query.include_defaults = include;
                self
            }
        }
    };
}

/// Locate the first of several candidate programs.
///
/// Evaluates to the full path of the first candidate found, otherwise to the
/// default, otherwise to [`Value::Absent`]. Not finding anything is not an
/// error; use [`RequireProgram`] for that.
///
/// # Examples
///
/// ```rust,no_run
/// use atconf::deferred::FindProgram;
/// use atconf::substitution::{flatten, SubstitutionTable, Value};
///
/// let mut table = SubstitutionTable::new();
/// table.insert(
///     "PYTHON",
///     Value::deferred(FindProgram::new(["python3", "python"]).with_default("/usr/bin/python")),
/// );
/// flatten(&mut table)?;
/// # Ok::<(), atconf::core::ConfigureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FindProgram {
    query: ProgramQuery,
}

program_lookup_builders!(FindProgram);

impl Deferred for FindProgram {
    fn evaluate(&self, table: &mut SubstitutionTable) -> Result<Value> {
        let query = self.query.resolve(table)?;
        Ok(match query.search() {
            Some(found) => path_value(&found),
            None => query.default.map_or(Value::Absent, Value::Text),
        })
    }
}

/// Locate a program that must exist.
///
/// Like [`FindProgram`], but the default is only accepted when it names an
/// existing executable file, and finding nothing is a
/// [`ConfigureError::ProgramNotFound`].
#[derive(Debug, Clone)]
pub struct RequireProgram {
    query: ProgramQuery,
}

program_lookup_builders!(RequireProgram);

impl Deferred for RequireProgram {
    fn evaluate(&self, table: &mut SubstitutionTable) -> Result<Value> {
        let query = self.query.resolve(table)?;
        if let Some(found) = query.search() {
            return Ok(path_value(&found));
        }
        if let Some(default) = query.default.as_deref() {
            if is_executable_file(Path::new(default)) {
                debug!("Using default {}", default);
                return Ok(Value::text(default));
            }
        }
        Err(ConfigureError::ProgramNotFound {
            programs: format_program_list(&query.programs),
        })
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_program_list() {
        assert_eq!(format_program_list(&["a".into()]), "a");
        assert_eq!(format_program_list(&["a".into(), "b".into()]), "a or b");
        assert_eq!(format_program_list(&["a".into(), "b".into(), "c".into()]), "a, b or c");
    }

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_find_program_prefers_first_candidate() {
        let temp = TempDir::new().unwrap();
        make_executable(temp.path(), "tool-b");
        let expected = make_executable(temp.path(), "tool-a");

        let find = FindProgram::new(["tool-a", "tool-b"])
            .with_path(temp.path().to_string_lossy())
            .include_defaults(false);
        let mut table = SubstitutionTable::new();
        let value = find.evaluate(&mut table).unwrap();
        assert_eq!(value, Value::text(expected.to_string_lossy()));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_program_tries_later_candidates() {
        let temp = TempDir::new().unwrap();
        let expected = make_executable(temp.path(), "fallback-tool");

        let find = FindProgram::new(["atconf-missing-tool", "fallback-tool"])
            .with_path(temp.path().to_string_lossy())
            .include_defaults(false);
        let value = find.evaluate(&mut SubstitutionTable::new()).unwrap();
        assert_eq!(value, Value::text(expected.to_string_lossy()));
    }

    #[test]
    fn test_find_program_missing_uses_default_or_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().to_string_lossy().to_string();

        let find = FindProgram::new(["atconf-missing-tool"]).with_path(path.clone()).include_defaults(false);
        assert_eq!(find.evaluate(&mut SubstitutionTable::new()).unwrap(), Value::Absent);

        let find = FindProgram::new(["atconf-missing-tool"])
            .with_path(path)
            .include_defaults(false)
            .with_default("/opt/tool");
        assert_eq!(find.evaluate(&mut SubstitutionTable::new()).unwrap(), Value::text("/opt/tool"));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_program_parameters_are_substituted() {
        let temp = TempDir::new().unwrap();
        let expected = make_executable(temp.path(), "subst-tool");

        let mut table = SubstitutionTable::new();
        table.insert("TOOLDIR", temp.path().to_string_lossy().to_string());
        table.insert("TOOLNAME", "subst-tool");
        let find = FindProgram::from_values(
            Value::text("@TOOLNAME@"),
            Value::Absent,
            Value::text("@TOOLDIR@"),
            false,
        );
        assert_eq!(find.evaluate(&mut table).unwrap(), Value::text(expected.to_string_lossy()));
    }

    #[test]
    fn test_require_program_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let require = RequireProgram::new(["atconf-missing-a", "atconf-missing-b"])
            .with_path(temp.path().to_string_lossy())
            .include_defaults(false)
            .with_default(temp.path().join("not-there").to_string_lossy());
        let err = require.evaluate(&mut SubstitutionTable::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find required program atconf-missing-a or atconf-missing-b"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_require_program_accepts_executable_default() {
        let search = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let default = make_executable(elsewhere.path(), "custom-tool");

        let require = RequireProgram::new(["atconf-missing-tool"])
            .with_path(search.path().to_string_lossy())
            .include_defaults(false)
            .with_default(default.to_string_lossy());
        assert_eq!(
            require.evaluate(&mut SubstitutionTable::new()).unwrap(),
            Value::text(default.to_string_lossy())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_require_program_rejects_directory_default() {
        let search = TempDir::new().unwrap();
        let require = RequireProgram::new(["atconf-missing-tool"])
            .with_path(search.path().to_string_lossy())
            .include_defaults(false)
            .with_default(search.path().to_string_lossy());
        assert!(matches!(
            require.evaluate(&mut SubstitutionTable::new()),
            Err(ConfigureError::ProgramNotFound { .. })
        ));
    }

    #[test]
    fn test_lookups_share_builders() {
        let find = FindProgram::new(["cc", "gcc"]).with_default("/usr/bin/cc").with_path("/opt/bin").include_defaults(false);
        let require =
            RequireProgram::new(["cc", "gcc"]).with_default("/usr/bin/cc").with_path("/opt/bin").include_defaults(false);

        for query in [&find.query, &require.query] {
            assert_eq!(query.programs, Value::Sequence(vec![Value::text("cc"), Value::text("gcc")]));
            assert_eq!(query.default, Value::text("/usr/bin/cc"));
            assert_eq!(query.path, Value::text("/opt/bin"));
            assert!(!query.include_defaults);
        }
        assert!(RequireProgram::new(["cc"]).query.include_defaults);
        assert_eq!(FindProgram::new(["cc"]).query.default, Value::Absent);
    }

    #[test]
    fn test_default_dirs_appended_once() {
        let joined = with_default_dirs(&OsString::from("/usr/bin"));
        let dirs: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(dirs.iter().filter(|d| d.as_path() == Path::new("/usr/bin")).count(), 1);
        assert!(dirs.contains(&PathBuf::from("/usr/local/sbin")));
        assert_eq!(dirs[0], PathBuf::from("/usr/bin"));
    }
}
