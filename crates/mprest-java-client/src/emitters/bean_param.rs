use std::collections::BTreeSet;

use mprest_core::config::GenerationPolicy;
use mprest_core::error::GeneratorError;
use mprest_core::ir::GroupedOperation;

use super::api::{param_annotation, validation_annotations};
use super::model::{ClassField, JavaClass, render_class};
use crate::type_mapper::{java_type, safe_identifier};

/// Render the parameter bundle `{bean_param_name}.java` for an operation whose
/// parameters are passed as a single `@BeanParam`.
pub fn emit_bean_param(
    env: &minijinja::Environment<'_>,
    op: &GroupedOperation,
    policy: &GenerationPolicy,
) -> Result<String, GeneratorError> {
    let mut imports = BTreeSet::new();
    let fields = op
        .operation
        .parameters
        .iter()
        .map(|param| {
            let annotation = param_annotation(param.location);
            imports.insert(format!("javax.ws.rs.{annotation}"));
            let mut annotations = vec![format!("@{annotation}(\"{}\")", param.original_name)];
            annotations.extend(
                validation_annotations(&param.param_type, param.required, policy, &mut imports)
                    .into_iter()
                    .map(String::from),
            );
            ClassField {
                name: safe_identifier(&param.name.camel_case),
                accessor: param.name.pascal_case.clone(),
                java_type: java_type(&param.param_type, &policy.model_package, &mut imports),
                annotations,
                doc: param.description.clone(),
            }
        })
        .collect();

    let class = JavaClass {
        package: policy.api_package.clone(),
        name: op.bean_param_name.clone(),
        doc: vec![format!("Parameters of `{}`.", op.operation.operation_id)],
        annotations: Vec::new(),
        fields,
        imports,
    };
    render_class(env, class, policy)
}
