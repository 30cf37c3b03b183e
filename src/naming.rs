//! Naming resolver: accessor name → (base name, access expression).

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::PropertyKind;

static IS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^is(\p{Lu}.*)$").expect("is-prefix pattern"));
static GET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^get(\p{Lu}.*)$").expect("get-prefix pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub base: String,
    /// Literal accessor invocation (`getName()` or `name` for fields).
    pub access: String,
}

/// `boolean` is true for both the primitive and the boxed boolean.
pub fn derive(accessor: &str, kind: PropertyKind, boolean: bool) -> ResolvedName {
    ResolvedName {
        base: base_name(accessor, boolean),
        access: access_expression(accessor, kind),
    }
}

pub fn base_name(accessor: &str, boolean: bool) -> String {
    if boolean {
        if let Some(rest) = IS_PREFIX.captures(accessor).and_then(|c| c.get(1)) {
            return decapitalize(rest.as_str());
        }
    }
    match GET_PREFIX.captures(accessor).and_then(|c| c.get(1)) {
        Some(rest) => decapitalize(rest.as_str()),
        None => accessor.to_string(),
    }
}

pub fn access_expression(accessor: &str, kind: PropertyKind) -> String {
    match kind {
        PropertyKind::Getter => format!("{accessor}()"),
        PropertyKind::Field => accessor.to_string(),
    }
}

/// `SUPER_USER` → `superUser`.
pub fn constant_base_name(constant: &str) -> String {
    let mut out = String::with_capacity(constant.len());
    for (i, word) in constant.split('_').filter(|w| !w.is_empty()).enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            out.push_str(&capitalize(&lower));
        }
    }
    out
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null",
];

/// Appends `_` to reserved words so a derived name stays a legal identifier.
pub fn escape_keyword(name: String) -> String {
    if JAVA_KEYWORDS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Two names that clash: `(name, first owner, second owner)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clash {
    pub name: String,
    pub first: String,
    pub second: String,
}

/// Verifies the name → owner mapping is injective; owners are reported verbatim.
pub fn ensure_unique<'a, I>(entries: I) -> Result<(), Clash>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut seen: IndexMap<&str, &str> = IndexMap::new();
    for (name, owner) in entries {
        if let Some(first) = seen.insert(name, owner) {
            return Err(Clash {
                name: name.to_string(),
                first: first.to_string(),
                second: owner.to_string(),
            });
        }
    }
    Ok(())
}
