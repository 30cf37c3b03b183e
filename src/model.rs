//! Input model handed over by type discovery.
//!
//! A `ValueType` is immutable for the duration of one generation pass. Property
//! order is the declaration order and is carried through to the emitted subject.

use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// VALUE TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueType {
    pub name: String,
    #[serde(default)]
    pub package: String,
    /// Enclosing type names, outermost first (`User.Type` → `["User"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enclosing: Vec<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_constants: Vec<String>,
}

impl ValueType {
    /// Source-level reference relative to the package, e.g. `User.Type`.
    pub fn nested_name(&self) -> String {
        let mut parts = self.enclosing.clone();
        parts.push(self.name.clone());
        parts.join(".")
    }

    /// Fully qualified name used as the key of the batch mapping table.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.nested_name()
        } else {
            format!("{}.{}", self.package, self.nested_name())
        }
    }

    /// The value type itself as a descriptor, parameterized by its own type variables.
    pub fn self_type(&self) -> TypeDescriptor {
        TypeDescriptor::Declared(DeclaredType {
            package: self.package.clone(),
            name: self.nested_name(),
            type_arguments: self
                .type_parameters
                .iter()
                .map(|p| TypeDescriptor::TypeVariable { name: p.name.clone() })
                .collect(),
            supertypes: Vec::new(),
        })
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[default]
    Getter,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Getter method name or field name as declared.
    pub accessor: String,
    #[serde(default)]
    pub kind: PropertyKind,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub nullable: bool,
}

impl Property {
    pub fn getter(name: &str, accessor: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            accessor: accessor.to_string(),
            kind: PropertyKind::Getter,
            ty,
            nullable: false,
        }
    }

    pub fn field(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            accessor: name.to_string(),
            kind: PropertyKind::Field,
            ty,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeDescriptor>,
}

impl TypeParameter {
    pub fn unbounded(name: &str) -> Self {
        Self { name: name.to_string(), bounds: Vec::new() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE DESCRIPTORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Char,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Char => "Character",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Iterable,
    Collection,
    List,
    Set,
    SortedSet,
    Queue,
    Deque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    Map,
    SortedMap,
    NavigableMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalKind {
    Int,
    Long,
    Double,
    Object,
    /// The library variant (`com.google.common.base.Optional`).
    Library,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Int,
    Long,
    Double,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Bag with counts.
    Multiset,
    Multimap,
    Table,
}

impl ContainerKind {
    pub fn arity(self) -> usize {
        match self {
            ContainerKind::Multiset => 1,
            ContainerKind::Multimap => 2,
            ContainerKind::Table => 3,
        }
    }
}

/// A user-declared (or otherwise named) reference type together with its
/// resolved assignability chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclaredType {
    #[serde(default)]
    pub package: String,
    /// Simple name, dotted for nested types.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeDescriptor>,
    /// Direct supertypes, already substituted for this use site.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<TypeDescriptor>,
}

impl DeclaredType {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive {
        primitive: PrimitiveKind,
    },
    Boxed {
        primitive: PrimitiveKind,
    },
    Array {
        element: Box<TypeDescriptor>,
    },
    Collection {
        collection: CollectionKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<TypeDescriptor>>,
    },
    Map {
        map: MapKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<Box<TypeDescriptor>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<TypeDescriptor>>,
    },
    Optional {
        optional: OptionalKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<TypeDescriptor>>,
    },
    Stream {
        stream: StreamKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<TypeDescriptor>>,
    },
    Container {
        container: ContainerKind,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<TypeDescriptor>,
    },
    ClassRef {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Box<TypeDescriptor>>,
    },
    Path,
    TypeVariable {
        name: String,
    },
    Wildcard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper: Option<Box<TypeDescriptor>>,
    },
    Declared(DeclaredType),
    /// Anything discovery could not describe structurally; rendered verbatim.
    Opaque {
        name: String,
    },
}

impl TypeDescriptor {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive { primitive: kind }
    }

    pub fn boxed(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Boxed { primitive: kind }
    }

    pub fn string() -> Self {
        TypeDescriptor::Declared(DeclaredType {
            package: "java.lang".into(),
            name: "String".into(),
            type_arguments: Vec::new(),
            supertypes: Vec::new(),
        })
    }

    pub fn declared(package: &str, name: &str) -> Self {
        TypeDescriptor::Declared(DeclaredType {
            package: package.into(),
            name: name.into(),
            type_arguments: Vec::new(),
            supertypes: Vec::new(),
        })
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array { element: Box::new(element) }
    }

    pub fn list_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Collection {
            collection: CollectionKind::List,
            element: Some(Box::new(element)),
        }
    }

    pub fn map_of(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map {
            map: MapKind::Map,
            key: Some(Box::new(key)),
            value: Some(Box::new(value)),
        }
    }

    pub fn type_variable(name: &str) -> Self {
        TypeDescriptor::TypeVariable { name: name.into() }
    }

    /// Direct supertypes inspected during classification; only declared types have any.
    pub fn supertypes(&self) -> &[TypeDescriptor] {
        match self {
            TypeDescriptor::Declared(declared) => &declared.supertypes,
            _ => &[],
        }
    }

    /// Type variables referenced anywhere in this descriptor, in first-seen order.
    pub fn type_variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_type_variables(&mut out);
        out
    }

    fn collect_type_variables(&self, out: &mut Vec<String>) {
        if let TypeDescriptor::TypeVariable { name } = self {
            if !out.contains(name) {
                out.push(name.clone());
            }
            return;
        }
        for child in self.children() {
            child.collect_type_variables(out);
        }
    }

    /// Immediate type arguments / component types, not supertypes.
    pub fn children(&self) -> Vec<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array { element } => vec![element.as_ref()],
            TypeDescriptor::Collection { element, .. }
            | TypeDescriptor::Optional { element, .. }
            | TypeDescriptor::Stream { element, .. } => element.iter().map(|e| e.as_ref()).collect(),
            TypeDescriptor::Map { key, value, .. } => {
                key.iter().chain(value.iter()).map(|t| t.as_ref()).collect()
            }
            TypeDescriptor::Container { arguments, .. } => arguments.iter().collect(),
            TypeDescriptor::ClassRef { target } => target.iter().map(|t| t.as_ref()).collect(),
            TypeDescriptor::Wildcard { upper } => upper.iter().map(|t| t.as_ref()).collect(),
            TypeDescriptor::Declared(declared) => declared.type_arguments.iter().collect(),
            TypeDescriptor::Primitive { .. }
            | TypeDescriptor::Boxed { .. }
            | TypeDescriptor::Path
            | TypeDescriptor::TypeVariable { .. }
            | TypeDescriptor::Opaque { .. } => Vec::new(),
        }
    }

    pub fn mentions_type_variable(&self) -> bool {
        !self.type_variables().is_empty()
    }
}
