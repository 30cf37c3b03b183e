//! Source writer, import collector and type rendering for emitted Java units.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::generics;
use crate::ir::{HandleType, TypeParameterBinding};
use crate::model::{CollectionKind, ContainerKind, MapKind, OptionalKind, StreamKind, TypeDescriptor};

// ————————————————————————————————————————————————————————————————————————————
// WRITER
// ————————————————————————————————————————————————————————————————————————————

/// Line-oriented writer with block indentation.
#[derive(Debug)]
pub struct Codegen {
    out: String,
    indent: String,
    level: usize,
}

impl Codegen {
    pub fn new(indent: &str) -> Self {
        Self { out: String::new(), indent: indent.to_string(), level: 0 }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `header {` then one level deeper.
    pub fn open(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.level += 1;
    }

    pub fn close(&mut self) {
        self.level = self.level.saturating_sub(1);
        self.line("}");
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPORTS
// ————————————————————————————————————————————————————————————————————————————

/// Tracks which simple names a unit has bound. The first type to claim a
/// simple name gets it; any later type with the same simple name is written
/// fully qualified.
#[derive(Debug)]
pub struct Imports {
    package: String,
    claimed: IndexMap<String, String>,
    lines: BTreeSet<String>,
}

impl Imports {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string(), claimed: IndexMap::new(), lines: BTreeSet::new() }
    }

    /// Binds a name declared in this unit (the subject itself) so nothing else takes it.
    pub fn reserve(&mut self, simple_name: &str) {
        let qualified = qualify(&self.package, simple_name);
        self.claimed.entry(simple_name.to_string()).or_insert(qualified);
    }

    /// Returns the text to write for `package.name`; `name` may be dotted for
    /// nested types, in which case the outermost type is imported.
    pub fn reference(&mut self, package: &str, name: &str) -> String {
        let outer = name.split('.').next().unwrap_or(name);
        let qualified_outer = qualify(package, outer);
        match self.claimed.get(outer) {
            Some(existing) if *existing == qualified_outer => name.to_string(),
            Some(_) => qualify(package, name),
            None => {
                self.claimed.insert(outer.to_string(), qualified_outer.clone());
                if !package.is_empty() && package != "java.lang" && package != self.package {
                    self.lines.insert(qualified_outer);
                }
                name.to_string()
            }
        }
    }

    /// Sorted `import` statements.
    pub fn statements(&self) -> Vec<String> {
        self.lines.iter().map(|q| format!("import {q};")).collect()
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE RENDERING
// ————————————————————————————————————————————————————————————————————————————

pub fn render_type(ty: &TypeDescriptor, imports: &mut Imports) -> String {
    match ty {
        TypeDescriptor::Primitive { primitive } => primitive.keyword().to_string(),
        TypeDescriptor::Boxed { primitive } => imports.reference("java.lang", primitive.boxed_name()),
        TypeDescriptor::Array { element } => format!("{}[]", render_type(element, imports)),
        TypeDescriptor::Collection { collection, element } => {
            let (package, name) = match collection {
                CollectionKind::Iterable => ("java.lang", "Iterable"),
                CollectionKind::Collection => ("java.util", "Collection"),
                CollectionKind::List => ("java.util", "List"),
                CollectionKind::Set => ("java.util", "Set"),
                CollectionKind::SortedSet => ("java.util", "SortedSet"),
                CollectionKind::Queue => ("java.util", "Queue"),
                CollectionKind::Deque => ("java.util", "Deque"),
            };
            let head = imports.reference(package, name);
            with_arguments(head, element.iter().map(|e| e.as_ref()), imports)
        }
        TypeDescriptor::Map { map, key, value } => {
            let name = match map {
                MapKind::Map => "Map",
                MapKind::SortedMap => "SortedMap",
                MapKind::NavigableMap => "NavigableMap",
            };
            let head = imports.reference("java.util", name);
            match (key, value) {
                (Some(k), Some(v)) => with_arguments(head, [k.as_ref(), v.as_ref()], imports),
                _ => head,
            }
        }
        TypeDescriptor::Optional { optional, element } => {
            let (package, name) = match optional {
                OptionalKind::Int => ("java.util", "OptionalInt"),
                OptionalKind::Long => ("java.util", "OptionalLong"),
                OptionalKind::Double => ("java.util", "OptionalDouble"),
                OptionalKind::Object => ("java.util", "Optional"),
                OptionalKind::Library => ("com.google.common.base", "Optional"),
            };
            let head = imports.reference(package, name);
            with_arguments(head, element.iter().map(|e| e.as_ref()), imports)
        }
        TypeDescriptor::Stream { stream, element } => {
            let name = match stream {
                StreamKind::Int => "IntStream",
                StreamKind::Long => "LongStream",
                StreamKind::Double => "DoubleStream",
                StreamKind::Object => "Stream",
            };
            let head = imports.reference("java.util.stream", name);
            with_arguments(head, element.iter().map(|e| e.as_ref()), imports)
        }
        TypeDescriptor::Container { container, arguments } => {
            let name = match container {
                ContainerKind::Multiset => "Multiset",
                ContainerKind::Multimap => "Multimap",
                ContainerKind::Table => "Table",
            };
            let head = imports.reference("com.google.common.collect", name);
            if arguments.len() == container.arity() {
                with_arguments(head, arguments.iter(), imports)
            } else {
                head
            }
        }
        TypeDescriptor::ClassRef { target } => {
            let head = imports.reference("java.lang", "Class");
            match target {
                Some(t) => format!("{head}<{}>", render_type(t, imports)),
                None => format!("{head}<?>"),
            }
        }
        TypeDescriptor::Path => imports.reference("java.nio.file", "Path"),
        TypeDescriptor::TypeVariable { name } => name.clone(),
        TypeDescriptor::Wildcard { upper } => match upper {
            Some(u) => format!("? extends {}", render_type(u, imports)),
            None => "?".to_string(),
        },
        TypeDescriptor::Declared(declared) => {
            let head = imports.reference(&declared.package, &declared.name);
            with_arguments(head, declared.type_arguments.iter(), imports)
        }
        TypeDescriptor::Opaque { name } => name.clone(),
    }
}

fn with_arguments<'a>(
    head: String,
    arguments: impl IntoIterator<Item = &'a TypeDescriptor>,
    imports: &mut Imports,
) -> String {
    let rendered: Vec<String> = arguments.into_iter().map(|a| render_type(a, imports)).collect();
    if rendered.is_empty() {
        head
    } else {
        format!("{head}<{}>", rendered.join(", "))
    }
}

/// Return type of a handle method; only the object-array handle is generic.
pub fn render_handle(handle: &HandleType, imports: &mut Imports) -> String {
    let head = imports.reference(handle.package(), &handle.simple_name());
    match handle {
        HandleType::ObjectArray { element } => format!("{head}<{}>", render_type(element, imports)),
        _ => head,
    }
}

/// `<T extends Comparable<T>, U>`, or empty for non-generic subjects.
pub fn render_declaration(bindings: &[TypeParameterBinding], imports: &mut Imports) -> String {
    if bindings.is_empty() {
        return String::new();
    }
    let params: Vec<String> = bindings
        .iter()
        .map(|b| {
            if b.bounds.is_empty() {
                b.name.clone()
            } else {
                let bounds: Vec<String> = b.bounds.iter().map(|t| render_type(t, imports)).collect();
                format!("{} extends {}", b.name, bounds.join(" & "))
            }
        })
        .collect();
    format!("<{}>", params.join(", "))
}

/// `<T, U>`, or empty.
pub fn render_arguments(bindings: &[TypeParameterBinding]) -> String {
    if bindings.is_empty() {
        String::new()
    } else {
        format!("<{}>", generics::argument_names(bindings).join(", "))
    }
}

/// Java string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
