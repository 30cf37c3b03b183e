use std::fmt;

use ordered_float::OrderedFloat;

use crate::model::{PrimitiveKind, TypeDescriptor};

/// Dynamic stand-in for a JVM value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Char(char),
    Float(OrderedFloat<f64>),
    Str(String),
    Array(Vec<Value>),
    /// Lists, sets, multisets and streams alike; order is kept for display.
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Optional(Option<Box<Value>>),
    Class { name: String, supertypes: Vec<String> },
    Path(String),
    Enum { type_name: String, constant: String },
    /// Properties keyed by accessor name.
    Object { type_name: String, fields: Vec<(String, Value)> },
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(s.to_string())
    }

    pub fn float(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }

    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn map<I: IntoIterator<Item = (Value, Value)>>(entries: I) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    pub fn present(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn object<I: IntoIterator<Item = (&'static str, Value)>>(type_name: &str, fields: I) -> Self {
        Value::Object {
            type_name: type_name.to_string(),
            fields: fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn constant(type_name: &str, constant: &str) -> Self {
        Value::Enum { type_name: type_name.to_string(), constant: constant.to_string() }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn field(&self, accessor: &str) -> Option<&Value> {
        match self {
            Value::Object { fields, .. } => fields.iter().find(|(k, _)| k == accessor).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Elements of anything iterable-shaped.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Boxed-object equality: floating values compare by bit pattern with NaN
    /// canonicalised, so `NaN == NaN` and `0.0 != -0.0`.
    pub fn java_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => canonical_bits(a.0) == canonical_bits(b.0),
            (Value::Array(a), Value::Array(b)) | (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.java_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter().any(|(k2, v2)| k.java_eq(k2) && v.java_eq(v2))
                    })
            }
            (Value::Optional(a), Value::Optional(b)) => match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => x.java_eq(y),
                _ => false,
            },
            (
                Value::Object { type_name: ta, fields: fa },
                Value::Object { type_name: tb, fields: fb },
            ) => {
                ta == tb
                    && fa.len() == fb.len()
                    && fa.iter().zip(fb).all(|((ka, va), (kb, vb))| ka == kb && va.java_eq(vb))
            }
            (a, b) => a == b,
        }
    }

    /// Whether this value may be passed where `ty` is declared.
    pub fn conforms_to(&self, ty: &TypeDescriptor, bind: &dyn Fn(&str) -> Option<TypeDescriptor>) -> bool {
        match ty {
            TypeDescriptor::Primitive { primitive } => self.matches_primitive(*primitive),
            TypeDescriptor::Boxed { primitive } => self.is_null() || self.matches_primitive(*primitive),
            TypeDescriptor::TypeVariable { name } => match bind(name) {
                Some(bound) => self.conforms_to(&bound, bind),
                None => true,
            },
            TypeDescriptor::Wildcard { upper } => match upper {
                Some(u) => self.conforms_to(u, bind),
                None => true,
            },
            TypeDescriptor::Opaque { .. } => true,
            _ if self.is_null() => true,
            TypeDescriptor::Array { element } => match self {
                Value::Array(items) => items.iter().all(|i| i.conforms_to(element, bind)),
                _ => false,
            },
            TypeDescriptor::Collection { element, .. } | TypeDescriptor::Stream { element, .. } => match self {
                Value::List(items) => match element {
                    Some(e) => items.iter().all(|i| i.conforms_to(e, bind)),
                    None => true,
                },
                _ => false,
            },
            TypeDescriptor::Map { .. } => matches!(self, Value::Map(_)),
            TypeDescriptor::Optional { .. } => matches!(self, Value::Optional(_)),
            TypeDescriptor::Container { .. } => matches!(self, Value::List(_) | Value::Map(_) | Value::Object { .. }),
            TypeDescriptor::ClassRef { .. } => matches!(self, Value::Class { .. }),
            TypeDescriptor::Path => matches!(self, Value::Path(_)),
            TypeDescriptor::Declared(declared) => match declared.qualified_name().as_str() {
                "java.lang.Object" => true,
                "java.lang.String" | "java.lang.CharSequence" => matches!(self, Value::Str(_)),
                qualified => match self {
                    Value::Object { type_name, .. } | Value::Enum { type_name, .. } => type_name == qualified,
                    _ => false,
                },
            },
        }
    }

    fn matches_primitive(&self, kind: PrimitiveKind) -> bool {
        match kind {
            PrimitiveKind::Boolean => matches!(self, Value::Bool(_)),
            PrimitiveKind::Char => matches!(self, Value::Char(_)),
            PrimitiveKind::Float | PrimitiveKind::Double => matches!(self, Value::Float(_)),
            PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long => {
                matches!(self, Value::Int(_))
            }
        }
    }
}

fn canonical_bits(f: f64) -> u64 {
    if f.is_nan() { f64::NAN.to_bits() } else { f.to_bits() }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Array(items) | Value::List(items) => {
                write!(f, "[")?;
                join(f, items)?;
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
            Value::Optional(None) => write!(f, "Optional.empty"),
            Value::Optional(Some(v)) => write!(f, "Optional[{v}]"),
            Value::Class { name, .. } => write!(f, "class {name}"),
            Value::Path(p) => write!(f, "{p}"),
            Value::Enum { constant, .. } => write!(f, "{constant}"),
            Value::Object { type_name, fields } => {
                let simple = type_name.rsplit('.').next().unwrap_or(type_name);
                write!(f, "{simple}{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
