//! Host-framework emulation.
//!
//! Interprets a `GeneratedSubject` against a dynamic `Value` the way the
//! emitted Java would run against the assertion framework, so the observable
//! behaviour of generated subjects can be checked without a JVM.

mod failure;
mod handle;
mod subject;
mod value;

pub use failure::{FailureRecord, RuntimeError};
pub use handle::Handle;
pub use subject::SubjectRunner;
pub use value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(FailureRecord),
    Handle(Handle),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            Outcome::Fail(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_handle(self) -> Option<Handle> {
        match self {
            Outcome::Handle(handle) => Some(handle),
            _ => None,
        }
    }
}
