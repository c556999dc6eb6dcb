//! External command execution.

use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::text_list;
use crate::core::{ConfigureError, Result};
use crate::substitution::{Deferred, SubstitutionTable, Value, substitute};

/// Run a command and capture its output.
///
/// The first argument is the program, the rest are passed verbatim (no shell
/// is involved). Arguments are substituted against the table first, so
/// `@PYTHON@` can name a program located by [`FindProgram`](super::FindProgram).
///
/// Evaluates to the standard output with surrounding whitespace removed. A
/// command that cannot be started or exits unsuccessfully is a
/// [`ConfigureError::ExternalFailure`] carrying its standard error.
#[derive(Debug, Clone)]
pub struct ExecuteProcess {
    args: Value,
}

impl ExecuteProcess {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_value(Value::Sequence(args.into_iter().map(Value::text).collect()))
    }

    /// Build from an unresolved argument list, as read from a manifest.
    pub fn from_value(args: Value) -> Self {
        Self {
            args,
        }
    }
}

impl Deferred for ExecuteProcess {
    fn evaluate(&self, table: &mut SubstitutionTable) -> Result<Value> {
        let args = text_list(&substitute(&self.args, table)?, "command arguments")?;
        let Some((program, rest)) = args.split_first() else {
            return Err(ConfigureError::Other {
                message: "cannot execute an empty command".to_string(),
            });
        };
        let command_line = args.join(" ");
        info!("Executing {}", command_line);

        let output = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ConfigureError::ExternalFailure {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            debug!("{} exited with {}", program, output.status);
            return Err(ConfigureError::ExternalFailure {
                command: command_line,
                reason: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(Value::text(String::from_utf8_lossy(&output.stdout).trim()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_trimmed_stdout() {
        let exec = ExecuteProcess::new(["sh", "-c", "echo '  hello world  '"]);
        let value = exec.evaluate(&mut SubstitutionTable::new()).unwrap();
        assert_eq!(value, Value::text("hello world"));
    }

    #[test]
    fn test_arguments_are_substituted() {
        let mut table = SubstitutionTable::new();
        table.insert("GREETING", "hi there");
        let exec = ExecuteProcess::new(["echo", "@GREETING@"]);
        assert_eq!(exec.evaluate(&mut table).unwrap(), Value::text("hi there"));
    }

    #[test]
    fn test_failure_reports_stderr() {
        let exec = ExecuteProcess::new(["sh", "-c", "echo broken >&2; exit 3"]);
        let err = exec.evaluate(&mut SubstitutionTable::new()).unwrap_err();
        match &err {
            ConfigureError::ExternalFailure {
                command,
                reason,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(reason, "broken");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().starts_with("error executing sh -c"));
    }

    #[test]
    fn test_missing_program_is_external_failure() {
        let exec = ExecuteProcess::new(["atconf-definitely-missing-program"]);
        assert!(matches!(
            exec.evaluate(&mut SubstitutionTable::new()),
            Err(ConfigureError::ExternalFailure { .. })
        ));
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let exec = ExecuteProcess::from_value(Value::Sequence(vec![]));
        assert!(exec.evaluate(&mut SubstitutionTable::new()).is_err());
    }

    #[test]
    fn test_evaluated_once_through_table() {
        crate::test_utils::init_test_logging(None);
        let temp = tempfile::TempDir::new().unwrap();
        let counter = temp.path().join("count");
        let script = format!("echo x >> '{}'; echo done", counter.display());

        let mut table = SubstitutionTable::new();
        table.insert("RUN", Value::deferred(ExecuteProcess::new(["sh", "-c", script.as_str()])));
        table.insert("A", "@RUN@");
        table.insert("B", "@RUN@-@RUN@");
        crate::substitution::flatten(&mut table).unwrap();

        assert_eq!(table.text("B"), Some("done-done"));
        let runs = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(runs.lines().count(), 1);
    }
}
