//! Method synthesizer: (property, category, base name) → assertion methods.
//!
//! Pure; one call per property. Handle methods come before convenience methods.

use tracing::debug;

use crate::classify::Category;
use crate::error::{GenerationWarning, WarningKind};
use crate::ir::{
    Access, Containment, FailureTemplate, GeneratedMethod, GroupOrigin, HandleType, MethodBody,
    MethodGroup, Parameter, ReturnKind,
};
use crate::model::{ContainerKind, Property, TypeDescriptor};
use crate::naming::{self, ResolvedName};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Synthesis {
    pub methods: Vec<GeneratedMethod>,
    pub warnings: Vec<GenerationWarning>,
}

pub fn synthesize(
    value_type: &str,
    property: &Property,
    category: &Category,
    name: &ResolvedName,
) -> Synthesis {
    debug!(value_type, accessor = %property.accessor, %category, "synthesizing");
    let access = Access {
        accessor: property.accessor.clone(),
        expression: name.access.clone(),
    };
    let base = name.base.as_str();
    let mut out = Synthesis::default();

    match category {
        Category::Boolean => {
            out.methods.push(truthy(base, &access, false, false));
            out.methods.push(truthy(base, &access, true, false));
        }
        Category::BoxedBoolean => {
            out.methods.push(truthy(base, &access, false, true));
            out.methods.push(truthy(base, &access, true, true));
        }
        Category::Primitive { .. } => {
            out.methods.push(equals(base, &access, &property.ty, false));
        }
        Category::Boxed { .. } => {
            out.methods.push(equals(base, &access, &property.ty, true));
        }
        Category::TypeVariable { .. } | Category::Object => {
            out.methods.push(equals(base, &access, &property.ty, property.nullable));
        }
        Category::PrimitiveArray { primitive } => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::PrimitiveArray {
                primitive: *primitive,
            }));
        }
        Category::ObjectArray { element } => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::ObjectArray {
                element: element.clone(),
            }));
            if element.mentions_type_variable() {
                out.warnings.push(degraded(value_type, property, element, "an array component"));
            }
        }
        Category::Map => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::Map));
        }
        Category::Iterable { element } => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::Iterable));
            convenience(&mut out, value_type, property, base, &access, HandleType::Iterable, element.as_ref());
        }
        Category::Optional { optional } => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::Optional {
                optional: *optional,
            }));
        }
        Category::Stream { stream } => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::Stream { stream: *stream }));
        }
        Category::Container { container, element } => {
            let handle = match container {
                ContainerKind::Multiset => HandleType::Multiset,
                ContainerKind::Multimap => HandleType::Multimap,
                ContainerKind::Table => HandleType::Table,
            };
            out.methods.push(delegate(base, &access, &property.ty, handle.clone()));
            if *container == ContainerKind::Multiset {
                convenience(&mut out, value_type, property, base, &access, handle, element.as_ref());
            }
        }
        Category::ClassRef => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::Class));
        }
        Category::Path => {
            out.methods.push(delegate(base, &access, &property.ty, HandleType::Path));
        }
    }
    out
}

/// `isC()` / `isNotC()` for one enum constant of the value type itself.
pub fn synthesize_constant(constant: &str) -> MethodGroup {
    let base = naming::capitalize(&naming::constant_base_name(constant));
    let method = |negated: bool| GeneratedMethod {
        name: if negated { format!("isNot{base}") } else { format!("is{base}") },
        params: Vec::new(),
        returns: ReturnKind::Void,
        body: MethodBody::EnumConstant { constant: constant.to_string(), negated },
        failure: FailureTemplate::Fact {
            fact: if negated {
                format!("expected not to be {constant}")
            } else {
                format!("expected to be {constant}")
            },
        },
    };
    MethodGroup {
        origin: GroupOrigin::EnumConstant { constant: constant.to_string() },
        methods: vec![method(false), method(true)],
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn truthy(base: &str, access: &Access, negated: bool, boxed: bool) -> GeneratedMethod {
    let cap = naming::capitalize(base);
    let (name, fact) = if negated {
        (format!("isNot{cap}"), format!("expected not to be {base}"))
    } else {
        (format!("is{cap}"), format!("expected to be {base}"))
    };
    GeneratedMethod {
        name,
        params: Vec::new(),
        returns: ReturnKind::Void,
        body: MethodBody::Truthy { access: access.clone(), negated, boxed },
        failure: FailureTemplate::Fact { fact },
    }
}

fn equals(base: &str, access: &Access, ty: &TypeDescriptor, null_sensitive: bool) -> GeneratedMethod {
    let mut param = Parameter::expected(ty.clone());
    param.nullable = null_sensitive;
    GeneratedMethod {
        name: format!("has{}", naming::capitalize(base)),
        params: vec![param],
        returns: ReturnKind::Void,
        body: MethodBody::Equals { access: access.clone(), ty: ty.clone(), null_sensitive },
        failure: FailureTemplate::Comparison { display_name: access.expression.clone() },
    }
}

pub(crate) fn delegate(base: &str, access: &Access, ty: &TypeDescriptor, handle: HandleType) -> GeneratedMethod {
    GeneratedMethod {
        name: naming::escape_keyword(base.to_string()),
        params: Vec::new(),
        returns: ReturnKind::Handle(handle.clone()),
        body: MethodBody::Delegate { access: access.clone(), ty: ty.clone(), handle },
        failure: FailureTemplate::Delegated { display_name: access.expression.clone() },
    }
}

fn convenience(
    out: &mut Synthesis,
    value_type: &str,
    property: &Property,
    base: &str,
    access: &Access,
    handle: HandleType,
    element: Option<&TypeDescriptor>,
) {
    let Some(element) = element else { return };
    if matches!(element, TypeDescriptor::Wildcard { .. }) {
        return;
    }
    if element.mentions_type_variable() {
        out.warnings.push(degraded(value_type, property, element, "an element type"));
        return;
    }
    let cap = naming::capitalize(base);
    for (name, mode) in [
        (format!("has{cap}"), Containment::AtLeast),
        (format!("doesNotHave{cap}"), Containment::NoneOf),
    ] {
        out.methods.push(GeneratedMethod {
            name,
            params: vec![Parameter {
                name: "expected".into(),
                ty: element.clone(),
                varargs: true,
                nullable: false,
            }],
            returns: ReturnKind::Void,
            body: MethodBody::Contains { access: access.clone(), handle: handle.clone(), mode },
            failure: FailureTemplate::Delegated { display_name: access.expression.clone() },
        });
    }
}

fn degraded(value_type: &str, property: &Property, at: &TypeDescriptor, position: &str) -> GenerationWarning {
    let variables = at.type_variables().join(", ");
    GenerationWarning {
        kind: WarningKind::UnsupportedTypeParameterUsage,
        value_type: value_type.to_string(),
        accessor: property.accessor.clone(),
        message: format!(
            "type variable {variables} used as {position}; only the accessor handle was generated"
        ),
    }
}
