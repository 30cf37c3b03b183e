//! Type-directed assertion-subject generator.
//!
//! Value type descriptions go in, one Truth-style `Subject` per value type comes
//! out. The core (`classify` → `naming` → `synth` → `generics` → `compose`) is
//! pure; `discovery`, `emit` and `cli` are the host glue around it.

pub mod classify;
pub mod cli;
pub mod codegen;
pub mod compose;
pub mod config;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod generics;
pub mod ir;
pub mod link;
pub mod logging;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod runtime;
pub mod synth;

pub use config::GeneratorConfig;
pub use error::{ConfigError, DiscoveryError, EmissionError, GenerationError, GenerationWarning};
pub use ir::GeneratedSubject;
pub use model::{Property, TypeDescriptor, ValueType};
pub use pipeline::{BatchReport, generate_batch};
