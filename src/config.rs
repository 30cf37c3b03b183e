//! Generator settings. Everything has a default; a JSON file and CLI flags
//! override in that order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::ValueType;
use crate::naming;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub prefix: String,
    pub suffix: String,
    pub indent: String,
    pub generated_annotation: bool,
    /// Value written into `@Generated(..)`.
    pub generator_name: String,
    pub assert_that: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: "Auto".into(),
            suffix: String::new(),
            indent: "    ".into(),
            generated_annotation: true,
            generator_name: "auto-subject".into(),
            assert_that: true,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let de = &mut serde_json::Deserializer::from_str(&src);
        let config: Self = serde_path_to_error::deserialize(de).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            json_path: err.path().to_string(),
            message: err.into_inner().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        if let Some(prefix) = prefix {
            self.prefix = prefix.to_string();
        }
        self
    }

    pub fn with_suffix(mut self, suffix: Option<&str>) -> Self {
        if let Some(suffix) = suffix {
            self.suffix = suffix.to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("prefix", &self.prefix), ("suffix", &self.suffix)] {
            if !is_identifier_fragment(value) {
                return Err(ConfigError::InvalidIdentifier { field, value: value.clone() });
            }
        }
        if self.prefix.is_empty() && self.suffix.is_empty() {
            return Err(ConfigError::SubjectShadowsValueType);
        }
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::InvalidIdentifier { field: "indent", value: self.indent.clone() });
        }
        Ok(())
    }

    /// prefix + enclosing names + name + suffix, e.g. `AutoUserType`.
    pub fn subject_name(&self, value_type: &ValueType) -> String {
        let mut out = self.prefix.clone();
        for outer in &value_type.enclosing {
            out.push_str(outer);
        }
        out.push_str(&value_type.name);
        out.push_str(&self.suffix);
        out
    }

    /// Static factory method name: the decapitalized flattened type name.
    pub fn factory_name(&self, value_type: &ValueType) -> String {
        let flat: String = value_type
            .enclosing
            .iter()
            .chain(std::iter::once(&value_type.name))
            .map(String::as_str)
            .collect();
        naming::escape_keyword(naming::decapitalize(&flat))
    }
}

fn is_identifier_fragment(s: &str) -> bool {
    s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
