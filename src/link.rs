//! Batch mapping table for cross-type linkage.
//!
//! Built once per batch, before any subject is generated, and passed by
//! reference. A fallback-category property whose declared type is another
//! (non-generic) value type of the same batch gets a handle returning that
//! type's generated subject.

use indexmap::IndexMap;

use crate::classify::Category;
use crate::config::GeneratorConfig;
use crate::ir::{Access, GeneratedMethod, HandleType};
use crate::model::{Property, TypeDescriptor, ValueType};
use crate::naming::ResolvedName;
use crate::synth;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedSubject {
    pub package: String,
    pub subject_name: String,
    pub factory: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectTable {
    entries: IndexMap<String, LinkedSubject>,
}

impl SubjectTable {
    pub fn build(batch: &[ValueType], config: &GeneratorConfig) -> Self {
        let entries = batch
            .iter()
            .filter(|vt| !vt.is_generic())
            .map(|vt| {
                let linked = LinkedSubject {
                    package: vt.package.clone(),
                    subject_name: config.subject_name(vt),
                    factory: config.factory_name(vt),
                };
                (vt.qualified_name(), linked)
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&LinkedSubject> {
        self.entries.get(qualified_name)
    }

    /// Unlists a type whose subject will not be emitted.
    pub fn remove(&mut self, qualified_name: &str) -> Option<LinkedSubject> {
        self.entries.shift_remove(qualified_name)
    }

    /// Only raw, non-parameterized references resolve.
    pub fn resolve(&self, ty: &TypeDescriptor) -> Option<&LinkedSubject> {
        match ty {
            TypeDescriptor::Declared(declared) if declared.type_arguments.is_empty() => {
                self.entries.get(&declared.qualified_name())
            }
            _ => None,
        }
    }
}

/// The extra `x()` handle for a linked property, if any.
pub fn linked_handle(
    table: &SubjectTable,
    property: &Property,
    category: &Category,
    name: &ResolvedName,
) -> Option<GeneratedMethod> {
    if *category != Category::Object {
        return None;
    }
    let linked = table.resolve(&property.ty)?;
    let handle = HandleType::Subject {
        package: linked.package.clone(),
        subject_name: linked.subject_name.clone(),
        factory: linked.factory.clone(),
    };
    let access = Access { accessor: property.accessor.clone(), expression: name.access.clone() };
    Some(synth::delegate(&name.base, &access, &property.ty, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ReturnKind;
    use crate::model::{PropertyKind, TypeParameter};
    use crate::naming;

    fn vt(name: &str, generic: bool) -> ValueType {
        ValueType {
            name: name.into(),
            package: "com.example".into(),
            enclosing: Vec::new(),
            properties: Vec::new(),
            type_parameters: if generic { vec![TypeParameter::unbounded("T")] } else { Vec::new() },
            enum_constants: Vec::new(),
        }
    }

    #[test]
    fn table_skips_generic_types() {
        let table = SubjectTable::build(&[vt("Address", false), vt("Box", true)], &GeneratorConfig::default());
        assert_eq!(table.len(), 1);
        let linked = table.get("com.example.Address").unwrap();
        assert_eq!(linked.subject_name, "AutoAddress");
        assert_eq!(linked.factory, "address");
        assert!(table.get("com.example.Box").is_none());
    }

    #[test]
    fn object_property_of_a_batch_type_gets_a_subject_handle() {
        let table = SubjectTable::build(&[vt("Address", false)], &GeneratorConfig::default());
        let property = Property::getter("address", "getAddress", TypeDescriptor::declared("com.example", "Address"));
        let name = naming::derive(&property.accessor, PropertyKind::Getter, false);
        let method = linked_handle(&table, &property, &Category::Object, &name).unwrap();
        assert_eq!(method.name, "address");
        match method.returns {
            ReturnKind::Handle(HandleType::Subject { subject_name, .. }) => assert_eq!(subject_name, "AutoAddress"),
            other => panic!("unexpected return {other:?}"),
        }
    }

    #[test]
    fn unrelated_types_are_not_linked() {
        let table = SubjectTable::build(&[vt("Address", false)], &GeneratorConfig::default());
        let property = Property::getter("name", "getName", TypeDescriptor::string());
        let name = naming::derive(&property.accessor, PropertyKind::Getter, false);
        assert!(linked_handle(&table, &property, &Category::Object, &name).is_none());
    }
}
