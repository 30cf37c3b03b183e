//! JSON discovery adapter: files (or glob patterns) → `ValueType`s.
//!
//! A file holds either one value type object or an array of them. Parse
//! errors name the JSON path of the node that failed.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DiscoveryError;
use crate::model::ValueType;

pub fn load_value_types<I>(patterns: I) -> Result<Vec<ValueType>, DiscoveryError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = Vec::new();
    for path in resolve_file_path_patterns(patterns)? {
        let src = std::fs::read_to_string(&path).map_err(|source| DiscoveryError::Io {
            path: path.clone(),
            source,
        })?;
        let found = parse_value_types(&path, &src)?;
        debug!(path = %path.display(), value_types = found.len(), "loaded");
        out.extend(found);
    }
    Ok(out)
}

pub fn parse_value_types(path: &Path, src: &str) -> Result<Vec<ValueType>, DiscoveryError> {
    let root: serde_json::Value = from_str_with_path(path, src)?;
    match root {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                from_value_with_path(item).map_err(|(json_path, message)| DiscoveryError::Parse {
                    path: path.to_path_buf(),
                    json_path: format!("[{i}].{json_path}").trim_end_matches('.').to_string(),
                    message,
                })
            })
            .collect(),
        other => from_value_with_path(other)
            .map(|vt| vec![vt])
            .map_err(|(json_path, message)| DiscoveryError::Parse { path: path.to_path_buf(), json_path, message }),
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(path: &Path, src: &str) -> Result<T, DiscoveryError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| DiscoveryError::Parse {
        path: path.to_path_buf(),
        json_path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, (String, String)> {
    serde_path_to_error::deserialize::<_, T>(value)
        .map_err(|err| (err.path().to_string(), err.into_inner().to_string()))
}

/// Literal paths pass through; anything with glob characters is expanded and
/// must match at least one file.
pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, DiscoveryError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|e| DiscoveryError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            let before = out.len();
            for entry in entries {
                let p = entry.map_err(|e| DiscoveryError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })?;
                out.push(p);
            }
            if out.len() == before {
                return Err(DiscoveryError::NoMatch(pattern.to_string()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeDescriptor;

    const USER: &str = r#"{
        "name": "User",
        "package": "com.example",
        "properties": [
            {"name": "name", "accessor": "getName", "type": {"kind": "declared", "package": "java.lang", "name": "String"}}
        ]
    }"#;

    #[test]
    fn single_object_and_array_are_both_accepted() {
        let one = parse_value_types(Path::new("user.json"), USER).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].properties[0].ty, TypeDescriptor::string());
        let many = parse_value_types(Path::new("users.json"), &format!("[{USER}, {USER}]")).unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let bad = r#"[{"name": "A", "properties": []}, {"name": "B", "properties": [{"name": "x", "accessor": "getX", "type": {"kind": "sparkle"}}]}]"#;
        let err = parse_value_types(Path::new("bad.json"), bad).unwrap_err();
        match err {
            DiscoveryError::Parse { json_path, .. } => assert!(json_path.starts_with("[1].properties[0]"), "{json_path}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn globs_expand_and_must_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), USER).unwrap();
        std::fs::write(dir.path().join("b.json"), format!("[{USER}]")).unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let loaded = load_value_types([pattern.as_str()]).unwrap();
        assert_eq!(loaded.len(), 2);

        let missing = format!("{}/*.nothing", dir.path().display());
        assert!(matches!(load_value_types([missing.as_str()]), Err(DiscoveryError::NoMatch(_))));
    }

    #[test]
    fn missing_literal_path_is_an_io_error() {
        let err = load_value_types(["/definitely/not/here.json"]).unwrap_err();
        assert!(matches!(err, DiscoveryError::Io { .. }));
    }
}
