// Strongly-typed IR for generated subjects. No source text here.

use serde::Serialize;

use crate::error::GenerationWarning;
use crate::model::{OptionalKind, PrimitiveKind, StreamKind, TypeDescriptor, ValueType};

pub const TRUTH_PACKAGE: &str = "com.google.common.truth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSubject {
    pub value_type: ValueType,
    pub subject_name: String,
    pub groups: Vec<MethodGroup>,
    pub type_parameters: Vec<TypeParameterBinding>,
    pub warnings: Vec<GenerationWarning>,
}

impl GeneratedSubject {
    pub fn methods(&self) -> impl Iterator<Item = &GeneratedMethod> {
        self.groups.iter().flat_map(|g| g.methods.iter())
    }

    pub fn method(&self, name: &str) -> Option<&GeneratedMethod> {
        self.methods().find(|m| m.name == name)
    }
}

/// A type parameter redeclared on the subject, its constructor and its factories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeParameterBinding {
    pub name: String,
    pub bounds: Vec<TypeDescriptor>,
    /// True when the variable was not declared by the value type but used by a property.
    pub inferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum GroupOrigin {
    Property { accessor: String },
    EnumConstant { constant: String },
}

/// All methods produced for one property (or enum constant), handle first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodGroup {
    pub origin: GroupOrigin,
    pub methods: Vec<GeneratedMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMethod {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: ReturnKind,
    pub body: MethodBody,
    pub failure: FailureTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub varargs: bool,
    pub nullable: bool,
}

impl Parameter {
    pub fn expected(ty: TypeDescriptor) -> Self {
        Self { name: "expected".into(), ty, varargs: false, nullable: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "handle", rename_all = "snake_case")]
pub enum ReturnKind {
    Void,
    Handle(HandleType),
}

/// Nested sub-assertion types a handle-returning method can hand out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "handle", rename_all = "snake_case")]
pub enum HandleType {
    PrimitiveArray { primitive: PrimitiveKind },
    ObjectArray { element: TypeDescriptor },
    Map,
    Iterable,
    Optional { optional: OptionalKind },
    Stream { stream: StreamKind },
    Multiset,
    Multimap,
    Table,
    Class,
    Path,
    /// The generated subject of another value type in the same batch.
    Subject { package: String, subject_name: String, factory: String },
}

impl HandleType {
    pub fn simple_name(&self) -> String {
        match self {
            HandleType::PrimitiveArray { primitive } => {
                let keyword = primitive.keyword();
                let mut chars = keyword.chars();
                let cap: String = chars
                    .next()
                    .map(|c| c.to_ascii_uppercase())
                    .into_iter()
                    .chain(chars)
                    .collect();
                format!("Primitive{cap}ArraySubject")
            }
            HandleType::ObjectArray { .. } => "ObjectArraySubject".into(),
            HandleType::Map => "MapSubject".into(),
            HandleType::Iterable => "IterableSubject".into(),
            HandleType::Optional { optional } => match optional {
                OptionalKind::Int => "OptionalIntSubject".into(),
                OptionalKind::Long => "OptionalLongSubject".into(),
                OptionalKind::Double => "OptionalDoubleSubject".into(),
                OptionalKind::Object => "OptionalSubject".into(),
                OptionalKind::Library => "GuavaOptionalSubject".into(),
            },
            HandleType::Stream { stream } => match stream {
                StreamKind::Int => "IntStreamSubject".into(),
                StreamKind::Long => "LongStreamSubject".into(),
                StreamKind::Double => "DoubleStreamSubject".into(),
                StreamKind::Object => "StreamSubject".into(),
            },
            HandleType::Multiset => "MultisetSubject".into(),
            HandleType::Multimap => "MultimapSubject".into(),
            HandleType::Table => "TableSubject".into(),
            HandleType::Class => "ClassSubject".into(),
            HandleType::Path => "PathSubject".into(),
            HandleType::Subject { subject_name, .. } => subject_name.clone(),
        }
    }

    pub fn package(&self) -> &str {
        match self {
            HandleType::Subject { package, .. } => package,
            _ => TRUTH_PACKAGE,
        }
    }

    /// Subject factory used with `check(..).about(..)`; `None` means the
    /// framework's own `check(..).that(..)` overload applies.
    pub fn factory(&self) -> Option<String> {
        match self {
            HandleType::Optional { optional } => match optional {
                OptionalKind::Int => Some("optionalInts".into()),
                OptionalKind::Long => Some("optionalLongs".into()),
                OptionalKind::Double => Some("optionalDoubles".into()),
                OptionalKind::Object => Some("optionals".into()),
                OptionalKind::Library => None,
            },
            HandleType::Stream { stream } => match stream {
                StreamKind::Int => Some("intStreams".into()),
                StreamKind::Long => Some("longStreams".into()),
                StreamKind::Double => Some("doubleStreams".into()),
                StreamKind::Object => Some("streams".into()),
            },
            HandleType::Path => Some("paths".into()),
            HandleType::Subject { factory, .. } => Some(factory.clone()),
            _ => None,
        }
    }
}

/// Accessor as declared plus the literal invocation text used in failure messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Access {
    pub accessor: String,
    pub expression: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Containment {
    AtLeast,
    NoneOf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "body", rename_all = "snake_case")]
pub enum MethodBody {
    /// `isX` / `isNotX`; `boxed` adds the null-as-false branch.
    Truthy { access: Access, negated: bool, boxed: bool },
    /// `hasX(expected)`; `ty` is the declared property type.
    Equals { access: Access, ty: TypeDescriptor, null_sensitive: bool },
    /// Handle-returning `x()`.
    Delegate { access: Access, ty: TypeDescriptor, handle: HandleType },
    /// `hasX(T...)` / `doesNotHaveX(T...)` over an iterable-like handle.
    Contains { access: Access, handle: HandleType, mode: Containment },
    /// Whole-subject comparison against one enum constant.
    EnumConstant { constant: String, negated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "failure", rename_all = "snake_case")]
pub enum FailureTemplate {
    /// display name + expected + actual.
    Comparison { display_name: String },
    /// A single descriptive fact; the actual value comes from the framework's "but was".
    Fact { fact: String },
    /// Failures are raised by the handle, keyed by the display name.
    Delegated { display_name: String },
}
