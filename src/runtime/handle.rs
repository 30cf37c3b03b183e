use crate::ir::HandleType;

use super::Outcome;
use super::failure::{FailureRecord, RuntimeError};
use super::value::Value;

/// A nested sub-assertion bound to one property value, keyed by its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    display_name: String,
    kind: HandleType,
    actual: Value,
}

impl Handle {
    pub fn new(display_name: &str, kind: HandleType, actual: Value) -> Self {
        Self { display_name: display_name.to_string(), kind, actual }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> &HandleType {
        &self.kind
    }

    pub fn actual(&self) -> &Value {
        &self.actual
    }

    pub fn is_equal_to(&self, expected: &Value) -> Outcome {
        if self.actual.java_eq(expected) {
            Outcome::Pass
        } else {
            Outcome::Fail(FailureRecord::Comparison {
                display_name: self.display_name.clone(),
                expected: expected.clone(),
                actual: self.actual.clone(),
            })
        }
    }

    // ---- iterable-like ---- //

    pub fn contains_exactly(&self, expected: &[Value]) -> Result<Outcome, RuntimeError> {
        let Some(items) = self.iterable("containsExactly")? else { return Ok(self.null_failure()) };
        let (missing, unexpected) = multiset_difference(items, expected);
        Ok(self.containment("containsExactly", missing, unexpected))
    }

    pub fn contains_at_least(&self, expected: &[Value]) -> Result<Outcome, RuntimeError> {
        let Some(items) = self.iterable("containsAtLeast")? else { return Ok(self.null_failure()) };
        let (missing, _) = multiset_difference(items, expected);
        Ok(self.containment("containsAtLeast", missing, Vec::new()))
    }

    pub fn contains_none_of(&self, excluded: &[Value]) -> Result<Outcome, RuntimeError> {
        let Some(items) = self.iterable("containsNoneOf")? else { return Ok(self.null_failure()) };
        let mut unexpected: Vec<Value> = Vec::new();
        for e in excluded {
            if items.iter().any(|a| a.java_eq(e)) && !unexpected.iter().any(|u| u.java_eq(e)) {
                unexpected.push(e.clone());
            }
        }
        Ok(self.containment("containsNoneOf", Vec::new(), unexpected))
    }

    pub fn has_count(&self, element: &Value, count: usize) -> Result<Outcome, RuntimeError> {
        if self.kind != HandleType::Multiset {
            return Err(self.not_applicable("hasCount"));
        }
        let Some(items) = self.actual.elements() else { return Ok(self.null_failure()) };
        let actual = items.iter().filter(|a| a.java_eq(element)).count();
        Ok(self.compare(format!("{}.count({element})", self.display_name), count, actual))
    }

    pub fn has_length(&self, length: usize) -> Result<Outcome, RuntimeError> {
        if !matches!(self.kind, HandleType::PrimitiveArray { .. } | HandleType::ObjectArray { .. }) {
            return Err(self.not_applicable("hasLength"));
        }
        let Some(items) = self.actual.elements() else { return Ok(self.null_failure()) };
        Ok(self.compare(format!("{}.length", self.display_name), length, items.len()))
    }

    // ---- map-like ---- //

    pub fn contains_entry(&self, key: &Value, value: &Value) -> Result<Outcome, RuntimeError> {
        let Some(entries) = self.entries("containsEntry")? else { return Ok(self.null_failure()) };
        let Some((_, found)) = entries.iter().find(|(k, _)| k.java_eq(key)) else {
            return Ok(self.containment("containsEntry", vec![key.clone()], Vec::new()));
        };
        let matches = match (&self.kind, found) {
            (HandleType::Multimap, Value::List(values)) => values.iter().any(|v| v.java_eq(value)),
            _ => found.java_eq(value),
        };
        if matches {
            Ok(Outcome::Pass)
        } else {
            Ok(Outcome::Fail(FailureRecord::Comparison {
                display_name: format!("{}.get({key})", self.display_name),
                expected: value.clone(),
                actual: found.clone(),
            }))
        }
    }

    pub fn contains_key(&self, key: &Value) -> Result<Outcome, RuntimeError> {
        let Some(entries) = self.entries("containsKey")? else { return Ok(self.null_failure()) };
        if entries.iter().any(|(k, _)| k.java_eq(key)) {
            Ok(Outcome::Pass)
        } else {
            Ok(self.containment("containsKey", vec![key.clone()], Vec::new()))
        }
    }

    // ---- optional-like ---- //

    pub fn is_present(&self) -> Result<Outcome, RuntimeError> {
        match self.optional("isPresent")? {
            Some(Some(_)) => Ok(Outcome::Pass),
            _ => Ok(self.fact("expected to be present")),
        }
    }

    pub fn has_value(&self, expected: &Value) -> Result<Outcome, RuntimeError> {
        match self.optional("hasValue")? {
            Some(Some(inner)) if inner.java_eq(expected) => Ok(Outcome::Pass),
            Some(Some(inner)) => Ok(Outcome::Fail(FailureRecord::Comparison {
                display_name: format!("{}.get()", self.display_name),
                expected: expected.clone(),
                actual: inner.clone(),
            })),
            _ => Ok(self.fact(&format!("expected to have value {expected}"))),
        }
    }

    /// Optionals, iterables and maps.
    pub fn is_empty(&self) -> Result<Outcome, RuntimeError> {
        let empty = match (&self.kind, &self.actual) {
            (_, Value::Null) => return Ok(self.null_failure()),
            (HandleType::Optional { .. }, Value::Optional(inner)) => inner.is_none(),
            (HandleType::Map | HandleType::Multimap | HandleType::Table, Value::Map(entries)) => entries.is_empty(),
            (HandleType::Iterable | HandleType::Multiset | HandleType::Stream { .. }, Value::List(items))
            | (HandleType::ObjectArray { .. } | HandleType::PrimitiveArray { .. }, Value::Array(items)) => {
                items.is_empty()
            }
            _ => return Err(self.not_applicable("isEmpty")),
        };
        Ok(if empty { Outcome::Pass } else { self.fact("expected to be empty") })
    }

    // ---- class / path ---- //

    pub fn is_assignable_to(&self, target: &str) -> Result<Outcome, RuntimeError> {
        if self.kind != HandleType::Class {
            return Err(self.not_applicable("isAssignableTo"));
        }
        match &self.actual {
            Value::Class { name, supertypes } if name == target || supertypes.iter().any(|s| s == target) => {
                Ok(Outcome::Pass)
            }
            Value::Null => Ok(self.null_failure()),
            _ => Ok(self.fact(&format!("expected to be assignable to {target}"))),
        }
    }

    // ————————————————————————————————————————————————————————————————————————

    fn iterable(&self, operation: &'static str) -> Result<Option<&[Value]>, RuntimeError> {
        match self.kind {
            HandleType::Iterable
            | HandleType::Multiset
            | HandleType::Stream { .. }
            | HandleType::ObjectArray { .. }
            | HandleType::PrimitiveArray { .. } => Ok(self.actual.elements()),
            _ => Err(self.not_applicable(operation)),
        }
    }

    fn entries(&self, operation: &'static str) -> Result<Option<&[(Value, Value)]>, RuntimeError> {
        match (&self.kind, &self.actual) {
            (HandleType::Map | HandleType::Multimap, Value::Map(entries)) => Ok(Some(entries)),
            (HandleType::Map | HandleType::Multimap, _) => Ok(None),
            _ => Err(self.not_applicable(operation)),
        }
    }

    fn optional(&self, operation: &'static str) -> Result<Option<Option<&Value>>, RuntimeError> {
        match (&self.kind, &self.actual) {
            (HandleType::Optional { .. }, Value::Optional(inner)) => Ok(Some(inner.as_deref())),
            (HandleType::Optional { .. }, _) => Ok(None),
            _ => Err(self.not_applicable(operation)),
        }
    }

    fn containment(&self, check: &str, missing: Vec<Value>, unexpected: Vec<Value>) -> Outcome {
        if missing.is_empty() && unexpected.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Fail(FailureRecord::Containment {
                display_name: self.display_name.clone(),
                check: check.to_string(),
                missing,
                unexpected,
            })
        }
    }

    fn compare(&self, display_name: String, expected: usize, actual: usize) -> Outcome {
        if expected == actual {
            Outcome::Pass
        } else {
            Outcome::Fail(FailureRecord::Comparison {
                display_name,
                expected: Value::Int(expected as i64),
                actual: Value::Int(actual as i64),
            })
        }
    }

    fn fact(&self, fact: &str) -> Outcome {
        Outcome::Fail(FailureRecord::Fact { fact: fact.to_string(), but_was: self.actual.clone() })
    }

    fn null_failure(&self) -> Outcome {
        self.fact("expected not to be null")
    }

    fn not_applicable(&self, operation: &'static str) -> RuntimeError {
        RuntimeError::NotApplicable { operation, handle: self.kind.simple_name() }
    }
}

/// `(expected but absent, present but not expected)`, counting duplicates.
fn multiset_difference(actual: &[Value], expected: &[Value]) -> (Vec<Value>, Vec<Value>) {
    let mut remaining: Vec<&Value> = actual.iter().collect();
    let mut missing = Vec::new();
    for e in expected {
        match remaining.iter().position(|a| a.java_eq(e)) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => missing.push(e.clone()),
        }
    }
    (missing, remaining.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionalKind;

    fn names() -> Handle {
        Handle::new(
            "getNames()",
            HandleType::Iterable,
            Value::list([Value::str("Alice"), Value::str("Bob"), Value::str("Charlie")]),
        )
    }

    #[test]
    fn exactly_reports_extra_elements() {
        let outcome = names().contains_exactly(&[Value::str("Alice"), Value::str("Bob")]).unwrap();
        match outcome {
            Outcome::Fail(FailureRecord::Containment { display_name, missing, unexpected, .. }) => {
                assert_eq!(display_name, "getNames()");
                assert!(missing.is_empty());
                assert_eq!(unexpected, vec![Value::str("Charlie")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn at_least_ignores_extra_elements() {
        let outcome = names().contains_at_least(&[Value::str("Alice"), Value::str("Bob")]).unwrap();
        assert_eq!(outcome, Outcome::Pass);
        let outcome = names().contains_at_least(&[Value::str("Dave")]).unwrap();
        assert!(matches!(outcome, Outcome::Fail(FailureRecord::Containment { ref missing, .. }) if missing.len() == 1));
    }

    #[test]
    fn none_of_reports_each_hit_once() {
        let outcome = names().contains_none_of(&[Value::str("Bob"), Value::str("Bob"), Value::str("Eve")]).unwrap();
        assert!(matches!(outcome, Outcome::Fail(FailureRecord::Containment { ref unexpected, .. }) if unexpected == &[Value::str("Bob")]));
    }

    #[test]
    fn map_entry_failure_is_value_level() {
        let handle = Handle::new(
            "getUsers()",
            HandleType::Map,
            Value::map([(Value::Int(1), Value::str("Alice")), (Value::Int(2), Value::str("Bob"))]),
        );
        let outcome = handle.contains_entry(&Value::Int(1), &Value::str("Charlie")).unwrap();
        assert_eq!(
            outcome,
            Outcome::Fail(FailureRecord::Comparison {
                display_name: "getUsers().get(1)".into(),
                expected: Value::str("Charlie"),
                actual: Value::str("Alice"),
            })
        );
        assert_eq!(handle.contains_key(&Value::Int(2)).unwrap(), Outcome::Pass);
    }

    #[test]
    fn optional_operations() {
        let handle = Handle::new(
            "getNickname()",
            HandleType::Optional { optional: OptionalKind::Object },
            Value::present(Value::str("Al")),
        );
        assert_eq!(handle.is_present().unwrap(), Outcome::Pass);
        assert_eq!(handle.has_value(&Value::str("Al")).unwrap(), Outcome::Pass);
        assert!(matches!(handle.is_empty().unwrap(), Outcome::Fail(_)));
    }

    #[test]
    fn wrong_operation_is_a_misuse() {
        let err = names().contains_entry(&Value::Int(1), &Value::Int(2)).unwrap_err();
        assert_eq!(err, RuntimeError::NotApplicable { operation: "containsEntry", handle: "IterableSubject".into() });
    }

    #[test]
    fn class_assignability_walks_supertypes() {
        let handle = Handle::new(
            "getType()",
            HandleType::Class,
            Value::Class { name: "java.util.ArrayList".into(), supertypes: vec!["java.util.List".into()] },
        );
        assert_eq!(handle.is_assignable_to("java.util.List").unwrap(), Outcome::Pass);
        assert!(matches!(handle.is_assignable_to("java.util.Map").unwrap(), Outcome::Fail(_)));
    }
}
