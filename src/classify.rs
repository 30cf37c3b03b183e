//! Type classifier.
//!
//! Maps a property's `TypeDescriptor` to exactly one `Category`. Rules are an
//! ordered list of structural predicates; each rule is tried against the whole
//! assignability chain (the type, then its supertypes depth-first) before the
//! next rule is considered, so a user subtype of a known shape resolves by that
//! shape and never by the fallback.

use std::fmt;

use serde::Serialize;

use crate::model::{ContainerKind, OptionalKind, PrimitiveKind, StreamKind, TypeDescriptor};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Category {
    Boolean,
    Primitive { primitive: PrimitiveKind },
    BoxedBoolean,
    Boxed { primitive: PrimitiveKind },
    PrimitiveArray { primitive: PrimitiveKind },
    ObjectArray { element: TypeDescriptor },
    Map,
    Iterable { element: Option<TypeDescriptor> },
    Optional { optional: OptionalKind },
    Stream { stream: StreamKind },
    Container { container: ContainerKind, element: Option<TypeDescriptor> },
    ClassRef,
    Path,
    TypeVariable { name: String },
    Object,
}

/// Rule identity, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Boolean,
    Primitive,
    BoxedBoolean,
    Boxed,
    PrimitiveArray,
    ObjectArray,
    Map,
    Iterable,
    Optional,
    Stream,
    Container,
    ClassRef,
    Path,
    TypeVariable,
    Object,
}

/// More than one incompatible shape matched the winning rule along the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub rule: Rule,
    pub candidates: Vec<Category>,
}

type Matcher = fn(&TypeDescriptor) -> Option<Category>;

// ------------------------------- Policy ---------------------------------- //

const RULES: [(Rule, Matcher); 14] = [
    (Rule::Boolean, match_boolean),
    (Rule::Primitive, match_primitive),
    (Rule::BoxedBoolean, match_boxed_boolean),
    (Rule::Boxed, match_boxed),
    (Rule::PrimitiveArray, match_primitive_array),
    (Rule::ObjectArray, match_object_array),
    (Rule::Map, match_map),
    (Rule::Iterable, match_iterable),
    (Rule::Optional, match_optional),
    (Rule::Stream, match_stream),
    (Rule::Container, match_container),
    (Rule::ClassRef, match_class_ref),
    (Rule::Path, match_path),
    (Rule::TypeVariable, match_type_variable),
];

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// Total and deterministic: the first rule matching anywhere on the chain wins,
/// within a rule the first chain position wins.
pub fn classify(ty: &TypeDescriptor) -> Category {
    let chain = assignability_chain(ty);
    for (_, matcher) in RULES.iter() {
        let mut found: Option<Category> = None;
        for node in &chain {
            if let Some(category) = matcher(node) {
                found = Some(match found {
                    None => category,
                    Some(prev) => refine(prev, category),
                });
            }
        }
        if let Some(category) = found {
            return category;
        }
    }
    Category::Object
}

/// Like [`classify`], but reports an [`Ambiguity`] when the winning rule saw two
/// shapes that cannot both be true (e.g. `IntStream` and `LongStream`, or two
/// different concrete element types).
pub fn classify_strict(ty: &TypeDescriptor) -> Result<Category, Ambiguity> {
    let chain = assignability_chain(ty);
    for (rule, matcher) in RULES.iter() {
        // each match is checked against everything folded in so far, so a raw
        // node early on the chain cannot hide two conflicting later ones
        let mut refined: Option<Category> = None;
        let mut candidates: Vec<Category> = Vec::new();
        for node in &chain {
            let Some(category) = matcher(node) else { continue };
            refined = match refined.take() {
                None => Some(category),
                Some(current) if current.conflicts_with(&category) => {
                    if candidates.is_empty() {
                        candidates.push(current.clone());
                    }
                    candidates.push(category);
                    Some(current)
                }
                Some(current) => Some(refine(current, category)),
            };
        }
        if !candidates.is_empty() {
            return Err(Ambiguity { rule: *rule, candidates });
        }
        if let Some(category) = refined {
            return Ok(category);
        }
    }
    Ok(Category::Object)
}

/// The type followed by its supertypes, depth-first in declaration order,
/// without repeats.
pub fn assignability_chain(ty: &TypeDescriptor) -> Vec<&TypeDescriptor> {
    fn walk<'a>(ty: &'a TypeDescriptor, out: &mut Vec<&'a TypeDescriptor>) {
        if out.iter().any(|seen| *seen == ty) {
            return;
        }
        out.push(ty);
        for sup in ty.supertypes() {
            walk(sup, out);
        }
    }
    let mut out = Vec::new();
    walk(ty, &mut out);
    out
}

// Two matches for the same rule on one chain: keep the first, but let a later
// node fill in an element type the first one left raw.
fn refine(first: Category, later: Category) -> Category {
    match (first, later) {
        (Category::Iterable { element: None }, Category::Iterable { element: Some(e) }) => {
            Category::Iterable { element: Some(e) }
        }
        (
            Category::Container { container, element: None },
            Category::Container { container: later_container, element: Some(e) },
        ) if container == later_container => Category::Container { container, element: Some(e) },
        (first, _) => first,
    }
}

impl Category {
    pub fn rule(&self) -> Rule {
        match self {
            Category::Boolean => Rule::Boolean,
            Category::Primitive { .. } => Rule::Primitive,
            Category::BoxedBoolean => Rule::BoxedBoolean,
            Category::Boxed { .. } => Rule::Boxed,
            Category::PrimitiveArray { .. } => Rule::PrimitiveArray,
            Category::ObjectArray { .. } => Rule::ObjectArray,
            Category::Map => Rule::Map,
            Category::Iterable { .. } => Rule::Iterable,
            Category::Optional { .. } => Rule::Optional,
            Category::Stream { .. } => Rule::Stream,
            Category::Container { .. } => Rule::Container,
            Category::ClassRef => Rule::ClassRef,
            Category::Path => Rule::Path,
            Category::TypeVariable { .. } => Rule::TypeVariable,
            Category::Object => Rule::Object,
        }
    }

    /// 1-based priority; lower wins.
    pub fn priority(&self) -> u8 {
        self.rule() as u8 + 1
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Category::Boolean | Category::BoxedBoolean)
    }

    fn conflicts_with(&self, other: &Category) -> bool {
        match (self, other) {
            (Category::Optional { optional: a }, Category::Optional { optional: b }) => a != b,
            (Category::Stream { stream: a }, Category::Stream { stream: b }) => a != b,
            (Category::Iterable { element: Some(a) }, Category::Iterable { element: Some(b) }) => a != b,
            (
                Category::Container { container: a, element: ea },
                Category::Container { container: b, element: eb },
            ) => a != b || matches!((ea, eb), (Some(x), Some(y)) if x != y),
            _ => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Boolean => write!(f, "boolean"),
            Category::Primitive { primitive } => write!(f, "primitive {}", primitive.keyword()),
            Category::BoxedBoolean => write!(f, "boxed boolean"),
            Category::Boxed { primitive } => write!(f, "boxed {}", primitive.boxed_name()),
            Category::PrimitiveArray { primitive } => write!(f, "{}[]", primitive.keyword()),
            Category::ObjectArray { .. } => write!(f, "object array"),
            Category::Map => write!(f, "map"),
            Category::Iterable { element: Some(_) } => write!(f, "iterable"),
            Category::Iterable { element: None } => write!(f, "raw iterable"),
            Category::Optional { optional } => write!(f, "optional ({optional:?})"),
            Category::Stream { stream } => write!(f, "stream ({stream:?})"),
            Category::Container { container, .. } => write!(f, "{container:?}"),
            Category::ClassRef => write!(f, "class reference"),
            Category::Path => write!(f, "path"),
            Category::TypeVariable { name } => write!(f, "type variable {name}"),
            Category::Object => write!(f, "object"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// STRUCTURAL PREDICATES
// ————————————————————————————————————————————————————————————————————————————

fn match_boolean(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Primitive { primitive: PrimitiveKind::Boolean } => Some(Category::Boolean),
        _ => None,
    }
}

fn match_primitive(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Primitive { primitive } if *primitive != PrimitiveKind::Boolean => {
            Some(Category::Primitive { primitive: *primitive })
        }
        _ => None,
    }
}

fn match_boxed_boolean(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Boxed { primitive: PrimitiveKind::Boolean } => Some(Category::BoxedBoolean),
        _ => None,
    }
}

fn match_boxed(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Boxed { primitive } if *primitive != PrimitiveKind::Boolean => {
            Some(Category::Boxed { primitive: *primitive })
        }
        _ => None,
    }
}

fn match_primitive_array(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Array { element } => match element.as_ref() {
            TypeDescriptor::Primitive { primitive } => {
                Some(Category::PrimitiveArray { primitive: *primitive })
            }
            _ => None,
        },
        _ => None,
    }
}

fn match_object_array(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Array { element } if !matches!(element.as_ref(), TypeDescriptor::Primitive { .. }) => {
            Some(Category::ObjectArray { element: element.as_ref().clone() })
        }
        _ => None,
    }
}

fn match_map(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Map { .. } => Some(Category::Map),
        _ => None,
    }
}

fn match_iterable(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Collection { element, .. } => Some(Category::Iterable {
            element: element.as_deref().cloned(),
        }),
        _ => None,
    }
}

fn match_optional(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Optional { optional, .. } => Some(Category::Optional { optional: *optional }),
        _ => None,
    }
}

fn match_stream(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Stream { stream, .. } => Some(Category::Stream { stream: *stream }),
        _ => None,
    }
}

fn match_container(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Container { container, arguments } => {
            let element = match container {
                ContainerKind::Multiset => arguments.first().cloned(),
                ContainerKind::Multimap | ContainerKind::Table => None,
            };
            Some(Category::Container { container: *container, element })
        }
        _ => None,
    }
}

fn match_class_ref(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::ClassRef { .. } => Some(Category::ClassRef),
        _ => None,
    }
}

fn match_path(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::Path => Some(Category::Path),
        _ => None,
    }
}

fn match_type_variable(ty: &TypeDescriptor) -> Option<Category> {
    match ty {
        TypeDescriptor::TypeVariable { name } => Some(Category::TypeVariable { name: name.clone() }),
        _ => None,
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CollectionKind, DeclaredType, MapKind};
    use proptest::prelude::*;

    fn user_type(name: &str, supertypes: Vec<TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor::Declared(DeclaredType {
            package: "com.example".into(),
            name: name.into(),
            type_arguments: Vec::new(),
            supertypes,
        })
    }

    #[test]
    fn primitives_and_boxes_split_on_boolean() {
        assert_eq!(classify(&TypeDescriptor::primitive(PrimitiveKind::Boolean)), Category::Boolean);
        assert_eq!(
            classify(&TypeDescriptor::primitive(PrimitiveKind::Double)),
            Category::Primitive { primitive: PrimitiveKind::Double }
        );
        assert_eq!(classify(&TypeDescriptor::boxed(PrimitiveKind::Boolean)), Category::BoxedBoolean);
        assert_eq!(
            classify(&TypeDescriptor::boxed(PrimitiveKind::Char)),
            Category::Boxed { primitive: PrimitiveKind::Char }
        );
    }

    #[test]
    fn arrays_split_on_element_kind() {
        for kind in PrimitiveKind::ALL {
            let ty = TypeDescriptor::array_of(TypeDescriptor::primitive(kind));
            assert_eq!(classify(&ty), Category::PrimitiveArray { primitive: kind });
        }
        let strings = TypeDescriptor::array_of(TypeDescriptor::string());
        assert_eq!(classify(&strings), Category::ObjectArray { element: TypeDescriptor::string() });
        let boxed = TypeDescriptor::array_of(TypeDescriptor::boxed(PrimitiveKind::Int));
        assert_eq!(classify(&boxed).rule(), Rule::ObjectArray);
    }

    #[test]
    fn user_subtype_of_list_is_iterable_not_object() {
        let custom = user_type("CustomList", vec![TypeDescriptor::list_of(TypeDescriptor::string())]);
        assert_eq!(
            classify(&custom),
            Category::Iterable { element: Some(TypeDescriptor::string()) }
        );
    }

    #[test]
    fn deep_chain_is_followed() {
        let base = user_type("Base", vec![TypeDescriptor::map_of(
            TypeDescriptor::string(),
            TypeDescriptor::boxed(PrimitiveKind::Int),
        )]);
        let derived = user_type("Derived", vec![base]);
        assert_eq!(classify(&derived), Category::Map);
    }

    #[test]
    fn map_outranks_iterable_on_the_same_chain() {
        let both = user_type("Both", vec![
            TypeDescriptor::list_of(TypeDescriptor::string()),
            TypeDescriptor::Map { map: MapKind::SortedMap, key: None, value: None },
        ]);
        assert_eq!(classify(&both), Category::Map);
        assert_eq!(classify_strict(&both), Ok(Category::Map));
    }

    #[test]
    fn raw_supertype_is_refined_by_a_later_parameterized_one() {
        let ty = user_type("Tags", vec![
            TypeDescriptor::Collection { collection: CollectionKind::Iterable, element: None },
            TypeDescriptor::Collection {
                collection: CollectionKind::Set,
                element: Some(Box::new(TypeDescriptor::string())),
            },
        ]);
        assert_eq!(classify(&ty), Category::Iterable { element: Some(TypeDescriptor::string()) });
        assert!(classify_strict(&ty).is_ok());
    }

    #[test]
    fn conflicting_stream_shapes_are_ambiguous() {
        let ty = user_type("Weird", vec![
            TypeDescriptor::Stream { stream: StreamKind::Int, element: None },
            TypeDescriptor::Stream { stream: StreamKind::Long, element: None },
        ]);
        let err = classify_strict(&ty).unwrap_err();
        assert_eq!(err.rule, Rule::Stream);
        assert_eq!(err.candidates.len(), 2);
        // the lenient classifier still answers, first position wins
        assert_eq!(classify(&ty), Category::Stream { stream: StreamKind::Int });
    }

    #[test]
    fn conflicting_element_types_are_ambiguous() {
        let ty = user_type("Mixed", vec![
            TypeDescriptor::list_of(TypeDescriptor::string()),
            TypeDescriptor::list_of(TypeDescriptor::boxed(PrimitiveKind::Int)),
        ]);
        assert!(classify_strict(&ty).is_err());
    }

    #[test]
    fn raw_supertype_does_not_hide_later_conflicts() {
        let ty = user_type("Mixed", vec![
            TypeDescriptor::Collection { collection: CollectionKind::Iterable, element: None },
            TypeDescriptor::list_of(TypeDescriptor::string()),
            TypeDescriptor::list_of(TypeDescriptor::boxed(PrimitiveKind::Int)),
        ]);
        let err = classify_strict(&ty).unwrap_err();
        assert_eq!(err.rule, Rule::Iterable);
        assert_eq!(err.candidates, vec![
            Category::Iterable { element: Some(TypeDescriptor::string()) },
            Category::Iterable { element: Some(TypeDescriptor::boxed(PrimitiveKind::Int)) },
        ]);

        let bag = |arguments: Vec<TypeDescriptor>| TypeDescriptor::Container { container: ContainerKind::Multiset, arguments };
        let ty = user_type("Bags", vec![
            bag(Vec::new()),
            bag(vec![TypeDescriptor::string()]),
            bag(vec![TypeDescriptor::boxed(PrimitiveKind::Long)]),
        ]);
        assert_eq!(classify_strict(&ty).unwrap_err().rule, Rule::Container);
    }

    #[test]
    fn type_variables_and_unknowns() {
        assert_eq!(
            classify(&TypeDescriptor::type_variable("T")),
            Category::TypeVariable { name: "T".into() }
        );
        assert_eq!(classify(&TypeDescriptor::string()), Category::Object);
        assert_eq!(classify(&TypeDescriptor::Opaque { name: "x.Y".into() }), Category::Object);
        assert_eq!(classify(&user_type("Plain", Vec::new())), Category::Object);
    }

    #[test]
    fn multiset_keeps_element_for_convenience_methods() {
        let ty = TypeDescriptor::Container {
            container: ContainerKind::Multiset,
            arguments: vec![TypeDescriptor::string()],
        };
        assert_eq!(
            classify(&ty),
            Category::Container { container: ContainerKind::Multiset, element: Some(TypeDescriptor::string()) }
        );
    }

    #[test]
    fn priorities_follow_rule_order() {
        assert_eq!(Category::Boolean.priority(), 1);
        assert_eq!(Category::Map.priority(), 7);
        assert_eq!(Category::Object.priority(), 15);
    }

    fn arb_descriptor() -> impl Strategy<Value = TypeDescriptor> {
        let leaf = prop_oneof![
            prop::sample::select(PrimitiveKind::ALL.to_vec()).prop_map(TypeDescriptor::primitive),
            prop::sample::select(PrimitiveKind::ALL.to_vec()).prop_map(TypeDescriptor::boxed),
            Just(TypeDescriptor::Path),
            Just(TypeDescriptor::string()),
            "[A-Z]".prop_map(|n| TypeDescriptor::type_variable(&n)),
            "[a-z]{1,4}\\.[A-Z][a-z]{0,4}".prop_map(|name| TypeDescriptor::Opaque { name }),
        ];
        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(TypeDescriptor::array_of),
                inner.clone().prop_map(TypeDescriptor::list_of),
                (inner.clone(), inner.clone()).prop_map(|(k, v)| TypeDescriptor::map_of(k, v)),
                inner.clone().prop_map(|e| TypeDescriptor::Optional {
                    optional: OptionalKind::Object,
                    element: Some(Box::new(e)),
                }),
                inner.clone().prop_map(|e| TypeDescriptor::Container {
                    container: ContainerKind::Multiset,
                    arguments: vec![e],
                }),
                inner.clone().prop_map(|t| TypeDescriptor::ClassRef { target: Some(Box::new(t)) }),
                prop::collection::vec(inner, 0..3).prop_map(|supertypes| TypeDescriptor::Declared(DeclaredType {
                    package: "com.example".into(),
                    name: "Custom".into(),
                    type_arguments: Vec::new(),
                    supertypes,
                })),
            ]
        })
    }

    proptest! {
        #[test]
        fn classification_is_total_and_deterministic(ty in arb_descriptor()) {
            let first = classify(&ty);
            let second = classify(&ty);
            prop_assert_eq!(&first, &second);
            if let Ok(strict) = classify_strict(&ty) {
                prop_assert_eq!(strict, first);
            }
        }

        #[test]
        fn nullability_never_enters_classification(ty in arb_descriptor()) {
            use crate::model::Property;
            let plain = Property::getter("value", "getValue", ty.clone());
            let nullable = plain.clone().nullable();
            prop_assert_eq!(classify(&plain.ty), classify(&nullable.ty));
        }
    }
}
