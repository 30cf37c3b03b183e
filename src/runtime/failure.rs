use std::fmt;

use thiserror::Error;

use super::value::Value;

/// What a failed assertion reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureRecord {
    /// `value of: <display name>` / `expected` / `but was`.
    Comparison { display_name: String, expected: Value, actual: Value },
    /// One descriptive fact plus the framework's `but was` line.
    Fact { fact: String, but_was: Value },
    /// Element-wise container checks.
    Containment {
        display_name: String,
        check: String,
        missing: Vec<Value>,
        unexpected: Vec<Value>,
    },
}

impl FailureRecord {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            FailureRecord::Comparison { display_name, .. } | FailureRecord::Containment { display_name, .. } => {
                Some(display_name)
            }
            FailureRecord::Fact { .. } => None,
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureRecord::Comparison { display_name, expected, actual } => {
                writeln!(f, "value of: {display_name}")?;
                writeln!(f, "expected: {expected}")?;
                write!(f, "but was : {actual}")
            }
            FailureRecord::Fact { fact, but_was } => {
                writeln!(f, "{fact}")?;
                write!(f, "but was: {but_was}")
            }
            FailureRecord::Containment { display_name, check, missing, unexpected } => {
                writeln!(f, "value of: {display_name}")?;
                write!(f, "{check} failed")?;
                if !missing.is_empty() {
                    write!(f, "\nmissing ({}): {}", missing.len(), Value::List(missing.clone()))?;
                }
                if !unexpected.is_empty() {
                    write!(f, "\nunexpected ({}): {}", unexpected.len(), Value::List(unexpected.clone()))?;
                }
                Ok(())
            }
        }
    }
}

/// Misuse of a generated subject: the call would not have compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("{subject} has no method `{method}`")]
    UnknownMethod { subject: String, method: String },
    #[error("`{method}` takes {expected} argument(s), got {got}")]
    Arity { method: String, expected: usize, got: usize },
    #[error("argument {value} does not conform to the declared type of `{method}`")]
    ArgumentType { method: String, value: Value },
    #[error("subject-under-test has no property `{0}`")]
    MissingProperty(String),
    #[error("`{operation}` is not available on {handle}")]
    NotApplicable { operation: &'static str, handle: String },
}
