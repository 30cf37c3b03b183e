//! `ValueType[] -> GeneratedSubject[]`.
//!
//! Each value type is its own failure domain: a classification or naming error
//! drops that type only, and the batch reports every failure it saw.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::classify::{self, Category};
use crate::compose::{Composer, OutputUnit, PropertyPlan};
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationWarning};
use crate::generics;
use crate::ir::GeneratedSubject;
use crate::link::SubjectTable;
use crate::model::ValueType;
use crate::naming::{self, ResolvedName};
use crate::synth;

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful subjects, in input order.
    pub subjects: Vec<GeneratedSubject>,
    /// One unit per entry of `subjects`, same order.
    pub units: Vec<OutputUnit>,
    pub failures: Vec<GenerationError>,
    pub warnings: Vec<GenerationWarning>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Classification view of one property, for `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    pub accessor: String,
    #[serde(flatten)]
    pub category: Category,
    pub base_name: String,
    pub access_expression: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectView {
    pub value_type: String,
    pub subject_name: String,
    pub properties: Vec<PropertyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn generate_batch(batch: &[ValueType], config: &GeneratorConfig) -> BatchReport {
    let (table, results) = settle(batch, config);
    let composer = Composer::new(config, &table);
    debug!(value_types = batch.len(), linked = table.len(), "rendering batch");

    let results: Vec<Result<(GeneratedSubject, OutputUnit), GenerationError>> = results
        .into_par_iter()
        .map(|result| {
            let subject = result?;
            let unit = composer.render(&subject);
            Ok((subject, unit))
        })
        .collect();

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok((subject, unit)) => {
                for warning in &subject.warnings {
                    warn!(value_type = %warning.value_type, accessor = %warning.accessor, "{}", warning.message);
                }
                report.warnings.extend(subject.warnings.iter().cloned());
                report.subjects.push(subject);
                report.units.push(unit);
            }
            Err(err) => {
                error!(value_type = %err.value_type(), "{err}");
                report.failures.push(err);
            }
        }
    }
    info!(
        generated = report.subjects.len(),
        failed = report.failures.len(),
        warnings = report.warnings.len(),
        "batch complete"
    );
    report
}

/// Generates the whole batch against a mapping table that only lists types
/// which generate themselves. A type that fails is dropped from the table and
/// the batch is regenerated, so no subject links to one that is never emitted.
/// The table only shrinks, so this terminates.
fn settle(
    batch: &[ValueType],
    config: &GeneratorConfig,
) -> (SubjectTable, Vec<Result<GeneratedSubject, GenerationError>>) {
    let mut table = SubjectTable::build(batch, config);
    loop {
        let results: Vec<Result<GeneratedSubject, GenerationError>> = {
            let composer = Composer::new(config, &table);
            batch.par_iter().map(|vt| generate_subject(vt, &composer)).collect()
        };
        let unlinked: Vec<String> = results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .map(|err| err.value_type().to_string())
            .filter(|name| table.get(name).is_some())
            .collect();
        if unlinked.is_empty() {
            return (table, results);
        }
        for name in &unlinked {
            debug!(value_type = %name, "failed; dropped from linkage table");
            table.remove(name);
        }
    }
}

pub fn generate_subject(vt: &ValueType, composer: &Composer<'_>) -> Result<GeneratedSubject, GenerationError> {
    let value_type = vt.qualified_name();
    let mut resolved: Vec<(Category, ResolvedName)> = Vec::with_capacity(vt.properties.len());
    for property in &vt.properties {
        let category = classify::classify_strict(&property.ty).map_err(|ambiguity| {
            GenerationError::ClassificationAmbiguity {
                value_type: value_type.clone(),
                accessor: property.accessor.clone(),
                candidates: ambiguity.candidates.iter().map(ToString::to_string).collect(),
            }
        })?;
        let name = naming::derive(&property.accessor, property.kind, category.is_boolean());
        debug!(value_type = %value_type, accessor = %property.accessor, %category, base = %name.base, "classified");
        resolved.push((category, name));
    }

    naming::ensure_unique(
        resolved
            .iter()
            .zip(&vt.properties)
            .map(|((_, name), property)| (name.base.as_str(), property.accessor.as_str())),
    )
    .map_err(|clash| GenerationError::NamingCollision {
        value_type: value_type.clone(),
        name: clash.name,
        first: clash.first,
        second: clash.second,
    })?;

    let plans: Vec<PropertyPlan<'_>> = vt
        .properties
        .iter()
        .zip(resolved)
        .map(|(property, (category, name))| {
            let synthesis = synth::synthesize(&value_type, property, &category, &name);
            PropertyPlan { property, category, name, synthesis }
        })
        .collect();

    composer.assemble(vt, plans, generics::propagate(vt))
}

/// Per-type classification view. Never fails; errors are reported inline.
pub fn inspect(batch: &[ValueType], config: &GeneratorConfig) -> Vec<SubjectView> {
    let (_, results) = settle(batch, config);
    batch
        .iter()
        .zip(results)
        .map(|(vt, result)| {
            let (methods, error) = match result {
                Ok(subject) => (Some(subject), None),
                Err(err) => (None, Some(err.to_string())),
            };
            let properties = vt
                .properties
                .iter()
                .enumerate()
                .map(|(i, property)| {
                    let category = classify::classify(&property.ty);
                    let name = naming::derive(&property.accessor, property.kind, category.is_boolean());
                    let methods = methods
                        .as_ref()
                        .and_then(|s| s.groups.get(i))
                        .map(|g| g.methods.iter().map(|m| m.name.clone()).collect())
                        .unwrap_or_default();
                    PropertyView {
                        accessor: property.accessor.clone(),
                        category,
                        base_name: name.base,
                        access_expression: name.access,
                        methods,
                    }
                })
                .collect();
            SubjectView {
                value_type: vt.qualified_name(),
                subject_name: config.subject_name(vt),
                properties,
                error,
            }
        })
        .collect()
}
