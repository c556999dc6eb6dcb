//! Error handling for atconf
//!
//! This module provides the error type shared by every layer of atconf and the
//! user-facing reporting built on top of it. The error system follows two rules:
//! 1. **Strongly-typed errors** so library callers can match on failure modes
//! 2. **Located messages** so a user can find the offending template line, cache
//!    record or reference chain without re-running with extra diagnostics
//!
//! # Architecture
//!
//! - [`ConfigureError`] - Enumerated error type for all failures in atconf
//! - [`ErrorContext`] - Wrapper that adds a suggestion and details for CLI display
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Error Categories
//!
//! - **Substitution**: [`ConfigureError::UnknownVariable`], [`ConfigureError::CycleDetected`],
//!   [`ConfigureError::NonScalarReference`], [`ConfigureError::TemplateLine`]
//! - **Validation**: [`ConfigureError::InvalidTemplateName`],
//!   [`ConfigureError::InvalidVariableName`], [`ConfigureError::DuplicateVariable`],
//!   [`ConfigureError::InvalidModuleName`]
//! - **Persistence**: [`ConfigureError::MalformedCacheRecord`],
//!   [`ConfigureError::ManifestParse`], [`ConfigureError::FileSystem`]
//! - **External**: [`ConfigureError::ProgramNotFound`], [`ConfigureError::ExternalFailure`]
//!
//! All of them are fatal to the current top-level operation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use atconf::core::{ConfigureError, user_friendly_error};
//!
//! fn lookup() -> Result<(), ConfigureError> {
//!     Err(ConfigureError::UnknownVariable {
//!         name: "PREFIX".to_string(),
//!     })
//! }
//!
//! if let Err(e) = lookup() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for atconf operations.
///
/// Library functions return `Result<T, ConfigureError>`; the binary wraps them in
/// [`anyhow::Error`] and converts back with [`user_friendly_error`] for display.
///
/// # Examples
///
/// ```rust,no_run
/// use atconf::core::ConfigureError;
///
/// let error = ConfigureError::CycleDetected {
///     chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
/// };
/// assert_eq!(error.to_string(), "Cycle detected: A->B->A");
/// ```
#[derive(Error, Debug)]
pub enum ConfigureError {
    /// A placeholder names a variable that is not in the substitution table
    #[error("Can't expand unknown variable {name}")]
    UnknownVariable {
        /// The referenced variable name
        name: String,
    },

    /// A variable refers back to itself, directly or through other variables
    ///
    /// The chain lists every name on the expansion path in traversal order and
    /// ends with the name that closed the cycle.
    #[error("Cycle detected: {}", chain.join("->"))]
    CycleDetected {
        /// Names on the expansion path, in order
        chain: Vec<String>,
    },

    /// A placeholder refers to a mapping, sequence or absent value, which cannot
    /// be spliced into text
    #[error("Variable {name} does not hold a text value and cannot be substituted into text")]
    NonScalarReference {
        /// The referenced variable name
        name: String,
    },

    /// A logical line of the cache file does not match `name = value`
    #[error("{file}, {locator}: Invalid configure cache record")]
    MalformedCacheRecord {
        /// Path of the cache file
        file: String,
        /// Physical line locator, e.g. `line 3` or `lines 3-4`
        locator: String,
    },

    /// A configure file does not carry the template suffix
    #[error("Configure files must end with .in: {file}")]
    InvalidTemplateName {
        /// The offending file name
        file: String,
    },

    /// A substitution variable name is not an identifier
    #[error("{name} is not a valid substitution variable name")]
    InvalidVariableName {
        /// The offending name
        name: String,
    },

    /// The same variable is declared by more than one manifest section
    #[error("Substitution variable {name} is defined more than once")]
    DuplicateVariable {
        /// The duplicated name
        name: String,
    },

    /// The constants module is not a dotted sequence of identifiers
    #[error("{name} is not a valid module name")]
    InvalidModuleName {
        /// The offending module name
        name: String,
    },

    /// None of the candidates of a required program could be found
    #[error("Could not find required program {programs}")]
    ProgramNotFound {
        /// Human readable candidate list, e.g. `python3 or python`
        programs: String,
    },

    /// A deferred computation's external operation failed
    #[error("error executing {command}:\n{reason}")]
    ExternalFailure {
        /// The command line that was executed
        command: String,
        /// Diagnostic output of the failed operation
        reason: String,
    },

    /// Substituting a template line failed
    #[error("{file}, line {line}: {source}")]
    TemplateLine {
        /// The template file being configured
        file: String,
        /// 0-based line number within the template
        line: usize,
        /// The substitution failure
        #[source]
        source: Box<ConfigureError>,
    },

    /// A file system operation failed
    #[error("Failed {operation} {}: {source}", path.display())]
    FileSystem {
        /// What was being done, e.g. "reading template"
        operation: String,
        /// The path involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The project manifest is not valid TOML or has the wrong shape
    #[error("Invalid manifest file syntax in {file}: {reason}")]
    ManifestParse {
        /// Path of the manifest
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Any other error, already rendered to text
    #[error("{message}")]
    Other {
        /// The rendered error message
        message: String,
    },
}

impl ConfigureError {
    /// Build a [`ConfigureError::FileSystem`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }
}

impl Clone for ConfigureError {
    fn clone(&self) -> Self {
        match self {
            Self::UnknownVariable {
                name,
            } => Self::UnknownVariable {
                name: name.clone(),
            },
            Self::CycleDetected {
                chain,
            } => Self::CycleDetected {
                chain: chain.clone(),
            },
            Self::NonScalarReference {
                name,
            } => Self::NonScalarReference {
                name: name.clone(),
            },
            Self::MalformedCacheRecord {
                file,
                locator,
            } => Self::MalformedCacheRecord {
                file: file.clone(),
                locator: locator.clone(),
            },
            Self::InvalidTemplateName {
                file,
            } => Self::InvalidTemplateName {
                file: file.clone(),
            },
            Self::InvalidVariableName {
                name,
            } => Self::InvalidVariableName {
                name: name.clone(),
            },
            Self::DuplicateVariable {
                name,
            } => Self::DuplicateVariable {
                name: name.clone(),
            },
            Self::InvalidModuleName {
                name,
            } => Self::InvalidModuleName {
                name: name.clone(),
            },
            Self::ProgramNotFound {
                programs,
            } => Self::ProgramNotFound {
                programs: programs.clone(),
            },
            Self::ExternalFailure {
                command,
                reason,
            } => Self::ExternalFailure {
                command: command.clone(),
                reason: reason.clone(),
            },
            Self::TemplateLine {
                file,
                line,
                source,
            } => Self::TemplateLine {
                file: file.clone(),
                line: *line,
                source: source.clone(),
            },
            // io::Error is not Clone; keep the kind and message
            Self::FileSystem {
                operation,
                path,
                source,
            } => Self::FileSystem {
                operation: operation.clone(),
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Self::ManifestParse {
                file,
                reason,
            } => Self::ManifestParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ConfigureError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without suggestion or details.
    #[must_use]
    pub fn new(error: ConfigureError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] for display.
///
/// The error chain is searched for a [`ConfigureError`]; when one is found the
/// context carries a suggestion tailored to it. Otherwise the full chain is
/// rendered into a generic message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(configure_error) =
        error.chain().find_map(|cause| cause.downcast_ref::<ConfigureError>())
    {
        return create_error_context(configure_error.clone());
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ConfigureError::Other {
        message,
    })
}

fn create_error_context(error: ConfigureError) -> ErrorContext {
    match &error {
        ConfigureError::UnknownVariable {
            name,
        } => {
            let suggestion = format!(
                "Define {name} in the [substitutions] section of atconf.toml or pass {name}=VALUE after 'configure'"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ConfigureError::CycleDetected {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Break the cycle by giving one of the variables a value that does not reference the others")
            .with_details("Variables cannot depend on themselves directly or indirectly"),

        ConfigureError::NonScalarReference {
            ..
        } => ErrorContext::new(error)
            .with_details("Only text, booleans and numbers can appear inside @...@ placeholders"),

        ConfigureError::MalformedCacheRecord {
            file,
            ..
        } => {
            let suggestion =
                format!("Fix the record or delete {file} and run 'atconf configure' again");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Every cache line must have the form NAME=VALUE")
        }

        ConfigureError::TemplateLine {
            source,
            ..
        } => {
            let inner = create_error_context((**source).clone());
            let mut ctx = ErrorContext::new(error);
            ctx.suggestion = inner.suggestion;
            ctx.details = inner.details;
            ctx
        }

        ConfigureError::ProgramNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Install the program, add its directory to PATH, or override the variable on the command line"),

        ConfigureError::ManifestParse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax in atconf.toml. Verify quotes, brackets and section names"),

        ConfigureError::FileSystem {
            source,
            ..
        } => {
            let suggestion = match source.kind() {
                std::io::ErrorKind::NotFound => {
                    "Check that the file or directory exists and the path is correct"
                }
                std::io::ErrorKind::PermissionDenied => "Check file ownership and permissions",
                _ => "Check the path and try again",
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        _ => ErrorContext::new(error),
    }
}
