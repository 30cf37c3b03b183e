use indexmap::IndexMap;

use crate::ir::{Containment, FailureTemplate, GeneratedMethod, GeneratedSubject, HandleType, MethodBody};
use crate::model::TypeDescriptor;

use super::Outcome;
use super::failure::{FailureRecord, RuntimeError};
use super::handle::Handle;
use super::value::Value;

/// One generated subject wrapped around one actual value, as `assertThat(actual)` would give.
pub struct SubjectRunner<'a> {
    subject: &'a GeneratedSubject,
    actual: Value,
    type_arguments: IndexMap<String, TypeDescriptor>,
}

impl<'a> SubjectRunner<'a> {
    pub fn new(subject: &'a GeneratedSubject, actual: Value) -> Self {
        Self { subject, actual, type_arguments: IndexMap::new() }
    }

    /// Instantiates a type parameter, e.g. `T = Integer`, for argument checking.
    pub fn with_type_argument(mut self, name: &str, ty: TypeDescriptor) -> Self {
        self.type_arguments.insert(name.to_string(), ty);
        self
    }

    pub fn invoke(&self, method_name: &str, args: &[Value]) -> Result<Outcome, RuntimeError> {
        let method = self.subject.method(method_name).ok_or_else(|| RuntimeError::UnknownMethod {
            subject: self.subject.subject_name.clone(),
            method: method_name.to_string(),
        })?;
        self.check_arguments(method, args)?;

        if let MethodBody::EnumConstant { constant, negated } = &method.body {
            let is_constant = matches!(&self.actual, Value::Enum { constant: c, .. } if c == constant);
            return Ok(if is_constant != *negated { Outcome::Pass } else { self.fact_failure(method, self.actual.clone()) });
        }

        if self.actual.is_null() {
            return Ok(Outcome::Fail(FailureRecord::Fact {
                fact: "expected not to be null".into(),
                but_was: Value::Null,
            }));
        }

        match &method.body {
            MethodBody::Truthy { access, negated, .. } => {
                let value = self.property(&access.accessor)?;
                // a null box is neither true nor false: `isX` fails, `isNotX` passes
                let truthy = matches!(value, Value::Bool(true));
                let fails = if *negated { truthy } else { !truthy };
                Ok(if fails { self.fact_failure(method, value.clone()) } else { Outcome::Pass })
            }
            MethodBody::Equals { access, .. } => {
                let value = self.property(&access.accessor)?;
                let expected = &args[0];
                if value.java_eq(expected) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(Outcome::Fail(FailureRecord::Comparison {
                        display_name: display_name(method, &access.expression),
                        expected: expected.clone(),
                        actual: value.clone(),
                    }))
                }
            }
            MethodBody::Delegate { access, handle, .. } => {
                let value = self.property(&access.accessor)?;
                Ok(Outcome::Handle(Handle::new(&display_name(method, &access.expression), handle.clone(), value.clone())))
            }
            MethodBody::Contains { access, handle, mode } => {
                let value = self.property(&access.accessor)?;
                let handle = Handle::new(&display_name(method, &access.expression), contained(handle), value.clone());
                match mode {
                    Containment::AtLeast => handle.contains_at_least(args),
                    Containment::NoneOf => handle.contains_none_of(args),
                }
            }
            MethodBody::EnumConstant { .. } => Ok(Outcome::Pass),
        }
    }

    fn property(&self, accessor: &str) -> Result<&Value, RuntimeError> {
        self.actual.field(accessor).ok_or_else(|| RuntimeError::MissingProperty(accessor.to_string()))
    }

    fn check_arguments(&self, method: &GeneratedMethod, args: &[Value]) -> Result<(), RuntimeError> {
        let varargs = method.params.last().is_some_and(|p| p.varargs);
        if !varargs && args.len() != method.params.len() {
            return Err(RuntimeError::Arity {
                method: method.name.clone(),
                expected: method.params.len(),
                got: args.len(),
            });
        }
        let bind = |name: &str| self.type_arguments.get(name).cloned();
        for (i, arg) in args.iter().enumerate() {
            let param = &method.params[i.min(method.params.len() - 1)];
            if !arg.conforms_to(&param.ty, &bind) {
                return Err(RuntimeError::ArgumentType { method: method.name.clone(), value: arg.clone() });
            }
        }
        Ok(())
    }

    fn fact_failure(&self, method: &GeneratedMethod, but_was: Value) -> Outcome {
        let fact = match &method.failure {
            FailureTemplate::Fact { fact } => fact.clone(),
            _ => String::new(),
        };
        Outcome::Fail(FailureRecord::Fact { fact, but_was })
    }
}

fn display_name(method: &GeneratedMethod, fallback: &str) -> String {
    match &method.failure {
        FailureTemplate::Comparison { display_name } | FailureTemplate::Delegated { display_name } => display_name.clone(),
        FailureTemplate::Fact { .. } => fallback.to_string(),
    }
}

/// Convenience methods run on the iterable view of their handle.
fn contained(handle: &HandleType) -> HandleType {
    match handle {
        HandleType::Multiset => HandleType::Multiset,
        _ => HandleType::Iterable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::model::{PrimitiveKind, Property, TypeParameter, ValueType};
    use crate::pipeline::generate_batch;

    fn value_type(name: &str, properties: Vec<Property>) -> ValueType {
        ValueType {
            name: name.into(),
            package: "com.example".into(),
            enclosing: Vec::new(),
            properties,
            type_parameters: Vec::new(),
            enum_constants: Vec::new(),
        }
    }

    fn generate(vt: ValueType) -> GeneratedSubject {
        let mut report = generate_batch(&[vt], &GeneratorConfig::default());
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        report.subjects.remove(0)
    }

    fn boxed() -> GeneratedSubject {
        let mut vt = value_type("Box", vec![Property::getter("value", "getValue", TypeDescriptor::type_variable("T"))]);
        vt.type_parameters = vec![TypeParameter::unbounded("T")];
        generate(vt)
    }

    fn user() -> GeneratedSubject {
        generate(value_type("User", vec![
            Property::getter("name", "getName", TypeDescriptor::string()),
            Property::getter("active", "isActive", TypeDescriptor::primitive(PrimitiveKind::Boolean)),
            Property::getter("verified", "getVerified", TypeDescriptor::boxed(PrimitiveKind::Boolean)).nullable(),
            Property::getter("score", "getScore", TypeDescriptor::primitive(PrimitiveKind::Double)),
            Property::getter("friends", "getFriends", TypeDescriptor::list_of(TypeDescriptor::string())),
            Property::getter(
                "attributes",
                "getAttributes",
                TypeDescriptor::map_of(TypeDescriptor::boxed(PrimitiveKind::Int), TypeDescriptor::string()),
            ),
        ]))
    }

    fn alice() -> Value {
        Value::object("com.example.User", [
            ("getName", Value::str("Alice")),
            ("isActive", Value::Bool(true)),
            ("getVerified", Value::Null),
            ("getScore", Value::float(f64::NAN)),
            ("getFriends", Value::list([Value::str("Alice"), Value::str("Bob"), Value::str("Charlie")])),
            ("getAttributes", Value::map([(Value::Int(1), Value::str("Alice"))])),
        ])
    }

    #[test]
    fn generic_equality_reports_expected_and_actual() {
        let subject = boxed();
        let runner = SubjectRunner::new(&subject, Value::object("com.example.Box", [("getValue", Value::str("a"))]))
            .with_type_argument("T", TypeDescriptor::string());
        let outcome = runner.invoke("hasValue", &[Value::str("b")]).unwrap();
        match outcome.failure() {
            Some(FailureRecord::Comparison { expected, actual, .. }) => {
                assert_eq!(expected, &Value::str("b"));
                assert_eq!(actual, &Value::str("a"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn instantiated_type_parameter_rejects_other_argument_types() {
        let subject = boxed();
        let runner = SubjectRunner::new(&subject, Value::object("com.example.Box", [("getValue", Value::Int(1))]))
            .with_type_argument("T", TypeDescriptor::boxed(PrimitiveKind::Int));
        assert!(runner.invoke("hasValue", &[Value::Int(1)]).unwrap().is_pass());
        assert!(matches!(
            runner.invoke("hasValue", &[Value::str("1")]),
            Err(RuntimeError::ArgumentType { .. })
        ));
    }

    #[test]
    fn collection_handle_reports_unexpected_elements() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        let handle = runner.invoke("friends", &[]).unwrap().into_handle().unwrap();

        let outcome = handle.contains_exactly(&[Value::str("Alice"), Value::str("Bob")]).unwrap();
        match outcome.failure() {
            Some(FailureRecord::Containment { missing, unexpected, .. }) => {
                assert!(missing.is_empty());
                assert_eq!(unexpected, &vec![Value::str("Charlie")]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(handle.contains_at_least(&[Value::str("Alice"), Value::str("Bob")]).unwrap().is_pass());
    }

    #[test]
    fn collection_convenience_methods_take_varargs() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        assert!(runner.invoke("hasFriends", &[Value::str("Bob"), Value::str("Charlie")]).unwrap().is_pass());
        assert!(!runner.invoke("doesNotHaveFriends", &[Value::str("Bob")]).unwrap().is_pass());
        assert!(runner.invoke("doesNotHaveFriends", &[Value::str("Dave")]).unwrap().is_pass());
    }

    #[test]
    fn map_entry_mismatch_names_the_key() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        let handle = runner.invoke("attributes", &[]).unwrap().into_handle().unwrap();
        let outcome = handle.contains_entry(&Value::Int(1), &Value::str("Charlie")).unwrap();
        match outcome.failure() {
            Some(FailureRecord::Comparison { display_name, expected, actual }) => {
                assert!(display_name.ends_with(".get(1)"), "{display_name}");
                assert_eq!(expected, &Value::str("Charlie"));
                assert_eq!(actual, &Value::str("Alice"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn boolean_facts_follow_the_value() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        assert!(runner.invoke("isActive", &[]).unwrap().is_pass());
        assert_eq!(
            runner.invoke("isNotActive", &[]).unwrap().failure(),
            Some(&FailureRecord::Fact { fact: "expected not to be active".into(), but_was: Value::Bool(true) })
        );
    }

    #[test]
    fn null_boxed_boolean_is_neither_true_nor_false() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        assert_eq!(
            runner.invoke("isVerified", &[]).unwrap().failure(),
            Some(&FailureRecord::Fact { fact: "expected to be verified".into(), but_was: Value::Null })
        );
        assert!(runner.invoke("isNotVerified", &[]).unwrap().is_pass());
    }

    #[test]
    fn floating_equality_is_bitwise() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        assert!(runner.invoke("hasScore", &[Value::float(f64::NAN)]).unwrap().is_pass());
        assert!(!runner.invoke("hasScore", &[Value::float(0.0)]).unwrap().is_pass());
    }

    #[test]
    fn null_actual_fails_before_reading_properties() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, Value::Null);
        assert_eq!(
            runner.invoke("hasName", &[Value::str("Alice")]).unwrap().failure(),
            Some(&FailureRecord::Fact { fact: "expected not to be null".into(), but_was: Value::Null })
        );
    }

    #[test]
    fn misuse_is_a_runtime_error() {
        let subject = user();
        let runner = SubjectRunner::new(&subject, alice());
        assert!(matches!(runner.invoke("hasAge", &[Value::Int(3)]), Err(RuntimeError::UnknownMethod { .. })));
        assert!(matches!(runner.invoke("hasName", &[]), Err(RuntimeError::Arity { expected: 1, got: 0, .. })));
        assert!(matches!(runner.invoke("isActive", &[Value::Bool(true)]), Err(RuntimeError::Arity { .. })));
    }

    #[test]
    fn enum_constants_check_identity() {
        let mut vt = value_type("Role", Vec::new());
        vt.enclosing = vec!["User".into()];
        vt.enum_constants = vec!["GUEST".into(), "MEMBER".into()];
        let subject = generate(vt);
        let runner = SubjectRunner::new(&subject, Value::constant("com.example.User.Role", "MEMBER"));
        assert!(runner.invoke("isMember", &[]).unwrap().is_pass());
        assert!(runner.invoke("isNotGuest", &[]).unwrap().is_pass());
        assert!(!runner.invoke("isGuest", &[]).unwrap().is_pass());
    }
}
