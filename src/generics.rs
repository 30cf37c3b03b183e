//! Generic propagator.
//!
//! A generic value type's parameters are redeclared, bounds included, on the
//! subject class, its constructor, its factory and `assertThat`. Variables a
//! property uses without the value type declaring them (a nested type reading an
//! outer parameter, say) are appended after the declared ones so the subject
//! still compiles as a generic class.

use tracing::debug;

use crate::ir::TypeParameterBinding;
use crate::model::ValueType;

pub fn propagate(value_type: &ValueType) -> Vec<TypeParameterBinding> {
    let mut bindings: Vec<TypeParameterBinding> = value_type
        .type_parameters
        .iter()
        .map(|p| TypeParameterBinding {
            name: p.name.clone(),
            bounds: p.bounds.clone(),
            inferred: false,
        })
        .collect();

    for property in &value_type.properties {
        for name in property.ty.type_variables() {
            if bindings.iter().any(|b| b.name == name) {
                continue;
            }
            debug!(value_type = %value_type.qualified_name(), variable = %name, "inferring free type variable");
            bindings.push(TypeParameterBinding { name, bounds: Vec::new(), inferred: true });
        }
    }
    bindings
}

/// Names only, in declaration order: `T, U`.
pub fn argument_names(bindings: &[TypeParameterBinding]) -> Vec<&str> {
    bindings.iter().map(|b| b.name.as_str()).collect()
}
