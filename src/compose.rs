//! Subject composer.
//!
//! `assemble` turns per-property synthesis results into a `GeneratedSubject`
//! (declared property order, enum constants last, linkage applied, method names
//! checked); `render` writes one Java unit for it. Rendering is a pure function
//! of the subject and the config, so the same input always yields the same bytes.

use std::path::PathBuf;

use tracing::debug;

use crate::classify::Category;
use crate::codegen::{self, Codegen, Imports};
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationWarning};
use crate::ir::{
    Containment, FailureTemplate, GeneratedMethod, GeneratedSubject, GroupOrigin, MethodBody, MethodGroup,
    Parameter, ReturnKind, TRUTH_PACKAGE, TypeParameterBinding,
};
use crate::link::{self, SubjectTable};
use crate::model::{Property, ValueType};
use crate::naming::{self, ResolvedName};
use crate::synth::{self, Synthesis};

const ANNOTATION_PACKAGE: &str = "javax.annotation";
const GENERATED_PACKAGE: &str = "javax.annotation.processing";

/// Everything the synthesizer decided about one property.
#[derive(Debug, Clone)]
pub struct PropertyPlan<'a> {
    pub property: &'a Property,
    pub category: Category,
    pub name: ResolvedName,
    pub synthesis: Synthesis,
}

/// One composed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    pub package: String,
    pub subject_name: String,
    pub source: String,
}

impl OutputUnit {
    /// `com/example/AutoUser.java`
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.package.split('.').filter(|s| !s.is_empty()).collect();
        path.push(format!("{}.java", self.subject_name));
        path
    }

    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.subject_name.clone()
        } else {
            format!("{}.{}", self.package, self.subject_name)
        }
    }
}

pub struct Composer<'a> {
    config: &'a GeneratorConfig,
    table: &'a SubjectTable,
}

impl<'a> Composer<'a> {
    pub fn new(config: &'a GeneratorConfig, table: &'a SubjectTable) -> Self {
        Self { config, table }
    }

    pub fn assemble(
        &self,
        value_type: &ValueType,
        plans: Vec<PropertyPlan<'_>>,
        type_parameters: Vec<TypeParameterBinding>,
    ) -> Result<GeneratedSubject, GenerationError> {
        let mut groups = Vec::with_capacity(plans.len() + value_type.enum_constants.len());
        let mut warnings: Vec<GenerationWarning> = Vec::new();

        for plan in plans {
            let mut methods = plan.synthesis.methods;
            if let Some(handle) = link::linked_handle(self.table, plan.property, &plan.category, &plan.name) {
                debug!(value_type = %value_type.qualified_name(), accessor = %plan.property.accessor, "linked to batch subject");
                methods.insert(0, handle);
            }
            warnings.extend(plan.synthesis.warnings);
            groups.push(MethodGroup {
                origin: GroupOrigin::Property { accessor: plan.property.accessor.clone() },
                methods,
            });
        }
        for constant in &value_type.enum_constants {
            groups.push(synth::synthesize_constant(constant));
        }

        let subject = GeneratedSubject {
            value_type: value_type.clone(),
            subject_name: self.config.subject_name(value_type),
            groups,
            type_parameters,
            warnings,
        };
        self.check_method_names(&subject)?;
        Ok(subject)
    }

    fn check_method_names(&self, subject: &GeneratedSubject) -> Result<(), GenerationError> {
        let factory = self.config.factory_name(&subject.value_type);
        let mut entries: Vec<(&str, &str)> = vec![(factory.as_str(), "static factory")];
        if self.config.assert_that {
            entries.push(("assertThat", "static assertThat"));
        }
        for group in &subject.groups {
            let owner = match &group.origin {
                GroupOrigin::Property { accessor } => accessor.as_str(),
                GroupOrigin::EnumConstant { constant } => constant.as_str(),
            };
            entries.extend(group.methods.iter().map(|m| (m.name.as_str(), owner)));
        }
        naming::ensure_unique(entries).map_err(|clash| GenerationError::NamingCollision {
            value_type: subject.value_type.qualified_name(),
            name: clash.name,
            first: clash.first,
            second: clash.second,
        })
    }

    pub fn render(&self, subject: &GeneratedSubject) -> OutputUnit {
        let vt = &subject.value_type;
        let mut imports = Imports::new(&vt.package);
        imports.reserve(&subject.subject_name);

        let value_ty = codegen::render_type(&vt.self_type(), &mut imports);
        let subject_ty = format!("{}{}", subject.subject_name, codegen::render_arguments(&subject.type_parameters));
        let declaration = codegen::render_declaration(&subject.type_parameters, &mut imports);
        let base = imports.reference(TRUTH_PACKAGE, "Subject");
        let metadata = imports.reference(TRUTH_PACKAGE, "FailureMetadata");
        let nonnull = format!("@{}", imports.reference(ANNOTATION_PACKAGE, "Nonnull"));
        let nullable = format!("@{}", imports.reference(ANNOTATION_PACKAGE, "Nullable"));
        let factory = self.config.factory_name(vt);
        let static_generics = if declaration.is_empty() { String::new() } else { format!("{declaration} ") };

        let mut cg = Codegen::new(&self.config.indent);
        if self.config.generated_annotation {
            let generated = imports.reference(GENERATED_PACKAGE, "Generated");
            cg.line(format!("@{generated}({})", codegen::quote(&self.config.generator_name)));
        }
        cg.line("@SuppressWarnings(\"unchecked\")");
        cg.open(format!("public class {}{declaration} extends {base}", subject.subject_name));
        cg.line(format!("private final {value_ty} actual;"));
        cg.blank();

        cg.open(format!(
            "protected {}({nonnull} {metadata} failureMetadata, {nullable} {value_ty} actual)",
            subject.subject_name
        ));
        cg.line("super(failureMetadata, actual);");
        cg.line("this.actual = actual;");
        cg.close();
        cg.blank();

        cg.line(&nonnull);
        cg.open(format!("public static {static_generics}{base}.Factory<{subject_ty}, {value_ty}> {factory}()"));
        cg.line(format!("return {}::new;", subject.subject_name));
        cg.close();

        if self.config.assert_that {
            let truth = imports.reference(TRUTH_PACKAGE, "Truth");
            let factory_call = if subject.type_parameters.is_empty() {
                format!("{factory}()")
            } else {
                format!("{}.{}{factory}()", subject.subject_name, codegen::render_arguments(&subject.type_parameters))
            };
            cg.blank();
            cg.line(&nonnull);
            cg.open(format!("public static {static_generics}{subject_ty} assertThat({nullable} {value_ty} actual)"));
            cg.line(format!("return {truth}.assertAbout({factory_call}).that(actual);"));
            cg.close();
        }

        for method in subject.methods() {
            cg.blank();
            render_method(&mut cg, &mut imports, method, &value_ty);
        }
        cg.close();

        let mut out = Codegen::new(&self.config.indent);
        if !vt.package.is_empty() {
            out.line(format!("package {};", vt.package));
            out.blank();
        }
        let statements = imports.statements();
        if !statements.is_empty() {
            for statement in statements {
                out.line(statement);
            }
            out.blank();
        }
        let mut source = out.into_string();
        source.push_str(&cg.into_string());

        OutputUnit {
            package: vt.package.clone(),
            subject_name: subject.subject_name.clone(),
            source,
        }
    }
}

fn render_method(cg: &mut Codegen, imports: &mut Imports, method: &GeneratedMethod, value_ty: &str) {
    let params: Vec<String> = method.params.iter().map(|p| render_parameter(p, imports)).collect();
    let returns = match &method.returns {
        ReturnKind::Void => "void".to_string(),
        ReturnKind::Handle(handle) => {
            cg.line(format!("@{}", imports.reference(ANNOTATION_PACKAGE, "Nonnull")));
            codegen::render_handle(handle, imports)
        }
    };
    cg.open(format!("public {returns} {}({})", method.name, params.join(", ")));

    match &method.body {
        MethodBody::Truthy { access, negated, boxed } => {
            let fact = imports.reference(TRUTH_PACKAGE, "Fact");
            let local = if *boxed { "Boolean" } else { "boolean" };
            let condition = match (negated, boxed) {
                (false, false) => "!value",
                (true, false) => "value",
                (false, true) => "value == null || !value",
                (true, true) => "value != null && value",
            };
            let text = match &method.failure {
                FailureTemplate::Fact { fact } => fact.clone(),
                _ => String::new(),
            };
            cg.line("isNotNull();");
            cg.line(format!("final {local} value = actual.{};", access.expression));
            cg.open(format!("if ({condition})"));
            cg.line(format!(
                "failWithoutActual({fact}.simpleFact({}), {fact}.fact(\"but was\", value));",
                codegen::quote(&text)
            ));
            cg.close();
        }
        MethodBody::Equals { access, .. } => {
            cg.line("isNotNull();");
            cg.line(format!(
                "check({}).that(actual.{}).isEqualTo(expected);",
                codegen::quote(&access.expression),
                access.expression
            ));
        }
        MethodBody::Delegate { access, handle, .. } => {
            cg.line("isNotNull();");
            let about = match handle.factory() {
                Some(factory) => {
                    let owner = imports.reference(handle.package(), &handle.simple_name());
                    format!(".about({owner}.{factory}())")
                }
                None => String::new(),
            };
            cg.line(format!(
                "return check({}){about}.that(actual.{});",
                codegen::quote(&access.expression),
                access.expression
            ));
        }
        MethodBody::Contains { access, mode, .. } => {
            let arrays = imports.reference("java.util", "Arrays");
            let verb = match mode {
                Containment::AtLeast => "containsAtLeastElementsIn",
                Containment::NoneOf => "containsNoneIn",
            };
            cg.line("isNotNull();");
            cg.line(format!(
                "check({}).that(actual.{}).{verb}({arrays}.asList(expected));",
                codegen::quote(&access.expression),
                access.expression
            ));
        }
        MethodBody::EnumConstant { constant, negated } => {
            let fact = imports.reference(TRUTH_PACKAGE, "Fact");
            let op = if *negated { "==" } else { "!=" };
            let text = match &method.failure {
                FailureTemplate::Fact { fact } => fact.clone(),
                _ => String::new(),
            };
            cg.open(format!("if (actual {op} {value_ty}.{constant})"));
            cg.line(format!("failWithActual({fact}.simpleFact({}));", codegen::quote(&text)));
            cg.close();
        }
    }
    cg.close();
}

fn render_parameter(param: &Parameter, imports: &mut Imports) -> String {
    let ty = codegen::render_type(&param.ty, imports);
    let annotation = if param.nullable {
        format!("@{} ", imports.reference(ANNOTATION_PACKAGE, "Nullable"))
    } else {
        String::new()
    };
    let dots = if param.varargs { "..." } else { "" };
    format!("{annotation}{ty}{dots} {}", param.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::generics;
    use crate::model::{PrimitiveKind, TypeDescriptor, TypeParameter};

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

    fn plans(vt: &ValueType) -> Vec<PropertyPlan<'_>> {
        vt.properties
            .iter()
            .map(|property| {
                let category = classify(&property.ty);
                let name = naming::derive(&property.accessor, property.kind, category.is_boolean());
                let synthesis = synth::synthesize(&vt.qualified_name(), property, &category, &name);
                PropertyPlan { property, category, name, synthesis }
            })
            .collect()
    }

    fn compose(vt: &ValueType, table: &SubjectTable) -> Result<(GeneratedSubject, OutputUnit), GenerationError> {
        let config = GeneratorConfig::default();
        let composer = Composer::new(&config, table);
        let subject = composer.assemble(vt, plans(vt), generics::propagate(vt))?;
        let unit = composer.render(&subject);
        Ok((subject, unit))
    }

    fn user() -> ValueType {
        value_type("User", vec![
            Property::getter("name", "getName", TypeDescriptor::string()),
            Property::getter("age", "getAge", TypeDescriptor::primitive(PrimitiveKind::Int)),
            Property::getter("active", "isActive", TypeDescriptor::primitive(PrimitiveKind::Boolean)),
            Property::getter("tags", "getTags", TypeDescriptor::list_of(TypeDescriptor::string())),
        ])
    }

    #[test]
    fn groups_follow_declared_order() {
        let (subject, _) = compose(&user(), &SubjectTable::default()).unwrap();
        let origins: Vec<_> = subject
            .groups
            .iter()
            .map(|g| match &g.origin {
                GroupOrigin::Property { accessor } => accessor.clone(),
                GroupOrigin::EnumConstant { constant } => constant.clone(),
            })
            .collect();
        assert_eq!(origins, ["getName", "getAge", "isActive", "getTags"]);
    }

    #[test]
    fn rendered_unit_has_header_constructor_and_factory() {
        let (_, unit) = compose(&user(), &SubjectTable::default()).unwrap();
        assert_eq!(unit.relative_path(), PathBuf::from("com/example/AutoUser.java"));
        let src = &unit.source;
        assert!(src.starts_with("package com.example;\n\nimport com.google.common.truth.Fact;\n"), "{src}");
        assert!(src.contains("@Generated(\"auto-subject\")\n@SuppressWarnings(\"unchecked\")\npublic class AutoUser extends Subject {"));
        assert!(src.contains("protected AutoUser(@Nonnull FailureMetadata failureMetadata, @Nullable User actual) {"));
        assert!(src.contains("public static Subject.Factory<AutoUser, User> user() {\n        return AutoUser::new;"));
        assert!(src.contains("return Truth.assertAbout(user()).that(actual);"));
        assert!(src.contains("check(\"getAge()\").that(actual.getAge()).isEqualTo(expected);"));
        assert!(src.contains("public IterableSubject tags() {"));
        assert!(src.contains("public void hasTags(String... expected) {"));
        assert!(src.contains("failWithoutActual(Fact.simpleFact(\"expected not to be active\"), Fact.fact(\"but was\", value));"));
    }

    #[test]
    fn imports_are_sorted_and_unique() {
        let (_, unit) = compose(&user(), &SubjectTable::default()).unwrap();
        let imports: Vec<&str> = unit.source.lines().filter(|l| l.starts_with("import ")).collect();
        let mut sorted = imports.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(imports, sorted);
        assert!(imports.contains(&"import java.util.Arrays;"));
        assert!(!imports.iter().any(|l| l.contains("java.lang")));
    }

    #[test]
    fn rendering_is_idempotent() {
        let table = SubjectTable::default();
        let (_, first) = compose(&user(), &table).unwrap();
        let (_, second) = compose(&user(), &table).unwrap();
        assert_eq!(first.source, second.source);
    }

    #[test]
    fn generic_subject_redeclares_parameters() {
        let mut vt = value_type("Box", vec![Property::getter("value", "value", TypeDescriptor::type_variable("T"))]);
        vt.type_parameters = vec![TypeParameter::unbounded("T")];
        let (_, unit) = compose(&vt, &SubjectTable::default()).unwrap();
        let src = &unit.source;
        assert!(src.contains("public class AutoBox<T> extends Subject {"));
        assert!(src.contains("private final Box<T> actual;"));
        assert!(src.contains("public static <T> Subject.Factory<AutoBox<T>, Box<T>> box() {"));
        assert!(src.contains("public static <T> AutoBox<T> assertThat(@Nullable Box<T> actual) {"));
        assert!(src.contains("return Truth.assertAbout(AutoBox.<T>box()).that(actual);"));
        assert!(src.contains("public void hasValue(T expected) {"));
    }

    #[test]
    fn linked_property_gets_handle_before_equality() {
        let address = value_type("Address", vec![Property::getter("city", "getCity", TypeDescriptor::string())]);
        let person = value_type("Person", vec![Property::getter(
            "address",
            "getAddress",
            TypeDescriptor::declared("com.example", "Address"),
        )]);
        let table = SubjectTable::build(&[address, person.clone()], &GeneratorConfig::default());
        let (subject, unit) = compose(&person, &table).unwrap();
        let names: Vec<_> = subject.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["address", "hasAddress"]);
        assert!(unit.source.contains("return check(\"getAddress()\").about(AutoAddress.address()).that(actual.getAddress());"));
    }

    #[test]
    fn enum_constants_come_after_properties() {
        let mut vt = value_type("Role", Vec::new());
        vt.enclosing = vec!["User".into()];
        vt.enum_constants = vec!["GUEST".into(), "SUPER_USER".into()];
        let (subject, unit) = compose(&vt, &SubjectTable::default()).unwrap();
        let names: Vec<_> = subject.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["isGuest", "isNotGuest", "isSuperUser", "isNotSuperUser"]);
        assert_eq!(unit.subject_name, "AutoUserRole");
        assert!(unit.source.contains("if (actual != User.Role.SUPER_USER) {"));
    }

    #[test]
    fn method_name_clash_is_a_naming_collision() {
        let mut vt = value_type("Flag", vec![
            Property::getter("active", "isActive", TypeDescriptor::primitive(PrimitiveKind::Boolean)),
        ]);
        vt.enum_constants = vec!["ACTIVE".into()];
        let err = compose(&vt, &SubjectTable::default()).unwrap_err();
        match err {
            GenerationError::NamingCollision { name, first, second, .. } => {
                assert_eq!(name, "isActive");
                assert_eq!(first, "isActive");
                assert_eq!(second, "ACTIVE");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn handle_named_like_the_factory_collides() {
        let vt = value_type("Tags", vec![Property::getter("tags", "getTags", TypeDescriptor::list_of(TypeDescriptor::string()))]);
        let err = compose(&vt, &SubjectTable::default()).unwrap_err();
        assert!(matches!(err, GenerationError::NamingCollision { ref name, .. } if name == "tags"));
    }

    #[test]
    fn every_handle_renders_its_signature_body_and_import() {
        use crate::model::{ContainerKind, OptionalKind, StreamKind};

        let container = |container, arguments| TypeDescriptor::Container { container, arguments };
        let vt = value_type("Kitchen", vec![
            Property::getter("scores", "getScores", TypeDescriptor::array_of(TypeDescriptor::primitive(PrimitiveKind::Int))),
            Property::getter("names", "getNames", TypeDescriptor::array_of(TypeDescriptor::string())),
            Property::getter("index", "getIndex", TypeDescriptor::map_of(TypeDescriptor::string(), TypeDescriptor::boxed(PrimitiveKind::Int))),
            Property::getter("maybe", "getMaybe", TypeDescriptor::Optional {
                optional: OptionalKind::Object,
                element: Some(Box::new(TypeDescriptor::string())),
            }),
            Property::getter("legacy", "getLegacy", TypeDescriptor::Optional {
                optional: OptionalKind::Library,
                element: Some(Box::new(TypeDescriptor::string())),
            }),
            Property::getter("counts", "getCounts", TypeDescriptor::Stream { stream: StreamKind::Int, element: None }),
            Property::getter("home", "getHome", TypeDescriptor::Path),
            Property::getter("kind", "getKind", TypeDescriptor::ClassRef { target: None }),
            Property::getter("groups", "getGroups", container(ContainerKind::Multimap, vec![TypeDescriptor::string(), TypeDescriptor::string()])),
            Property::getter("grid", "getGrid", container(ContainerKind::Table, vec![
                TypeDescriptor::string(),
                TypeDescriptor::string(),
                TypeDescriptor::boxed(PrimitiveKind::Int),
            ])),
            Property::getter("bag", "getBag", container(ContainerKind::Multiset, vec![TypeDescriptor::string()])),
        ]);
        let (_, unit) = compose(&vt, &SubjectTable::default()).unwrap();
        let src = &unit.source;

        let cases = [
            ("PrimitiveIntArraySubject", "scores", "getScores", ""),
            ("ObjectArraySubject<String>", "names", "getNames", ""),
            ("MapSubject", "index", "getIndex", ""),
            ("OptionalSubject", "maybe", "getMaybe", ".about(OptionalSubject.optionals())"),
            ("GuavaOptionalSubject", "legacy", "getLegacy", ""),
            ("IntStreamSubject", "counts", "getCounts", ".about(IntStreamSubject.intStreams())"),
            ("PathSubject", "home", "getHome", ".about(PathSubject.paths())"),
            ("ClassSubject", "kind", "getKind", ""),
            ("MultimapSubject", "groups", "getGroups", ""),
            ("TableSubject", "grid", "getGrid", ""),
            ("MultisetSubject", "bag", "getBag", ""),
        ];
        for (handle, name, accessor, about) in cases {
            let method = format!(
                "    @Nonnull\n    public {handle} {name}() {{\n        isNotNull();\n        \
                 return check(\"{accessor}()\"){about}.that(actual.{accessor}());\n    }}\n"
            );
            assert!(src.contains(&method), "missing {name}():\n{method}\nin\n{src}");
            let simple = handle.split('<').next().unwrap_or(handle);
            assert!(src.contains(&format!("import com.google.common.truth.{simple};\n")), "{simple} not imported");
        }
        assert!(!src.contains(".about(GuavaOptionalSubject"));
    }

    #[test]
    fn boxed_boolean_reports_the_property_value() {
        let vt = value_type("Account", vec![Property::getter("verified", "getVerified", TypeDescriptor::boxed(PrimitiveKind::Boolean))]);
        let (_, unit) = compose(&vt, &SubjectTable::default()).unwrap();
        let src = &unit.source;
        assert!(src.contains(
            "    public void isVerified() {\n        isNotNull();\n        final Boolean value = actual.getVerified();\n        \
             if (value == null || !value) {\n            \
             failWithoutActual(Fact.simpleFact(\"expected to be verified\"), Fact.fact(\"but was\", value));\n        }\n    }\n"
        ), "{src}");
        assert!(src.contains("if (value != null && value) {"));
        assert!(!src.contains("failWithActual"));
    }
}
