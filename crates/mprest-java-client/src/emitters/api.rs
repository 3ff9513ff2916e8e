use std::collections::BTreeSet;

use heck::ToKebabCase;
use minijinja::{Value, context};
use mprest_core::config::GenerationPolicy;
use mprest_core::error::GeneratorError;
use mprest_core::ir::{GroupedOperation, IrParameterLocation, IrReturnType, IrType};

use super::{annotation_lines, doc_lines, render};
use crate::type_mapper::{is_bean, java_type, safe_identifier};

const JAX_RS: &str = "javax.ws.rs";

/// One generated interface. Several groups end up here when they resolve to the same name.
#[derive(Debug, Clone)]
pub struct ApiInterface<'a> {
    pub name: String,
    pub operations: Vec<&'a GroupedOperation>,
}

impl ApiInterface<'_> {
    /// Class-level `@Path`: the declared path up to the resource segment, shared by
    /// every operation. `None` when they disagree, in which case every method carries
    /// its full declared path.
    pub fn path(&self) -> Option<String> {
        let mut roots = self.operations.iter().map(|op| resource_root(op));
        let first = roots.next()??;
        roots.all(|root| root == Some(first)).then(|| first.to_string())
    }
}

/// Declared path up to and including the segment the operation was grouped by.
fn resource_root(op: &GroupedOperation) -> Option<&str> {
    if op.is_root() {
        return Some("/");
    }
    let declared = op.operation.path.as_str();
    let mut start = 0;
    for segment in declared.split('/') {
        let end = start + segment.len();
        if segment == op.base_path {
            return Some(&declared[..end]);
        }
        start = end + 1;
    }
    None
}

fn method_path(op: &GroupedOperation, interface_path: Option<&str>) -> Option<String> {
    let declared = op.operation.path.as_str();
    let path = match interface_path {
        Some(root) if root != "/" => declared.strip_prefix(root).unwrap_or(declared),
        _ => declared,
    };
    (!path.is_empty() && path != "/").then(|| path.to_string())
}

pub(crate) fn param_annotation(location: IrParameterLocation) -> &'static str {
    match location {
        IrParameterLocation::Path => "PathParam",
        IrParameterLocation::Query => "QueryParam",
        IrParameterLocation::Header => "HeaderParam",
        IrParameterLocation::Cookie => "CookieParam",
    }
}

/// Bean Validation annotations for a value, imports included.
pub(crate) fn validation_annotations(
    ir_type: &IrType,
    required: bool,
    policy: &GenerationPolicy,
    imports: &mut BTreeSet<String>,
) -> Vec<&'static str> {
    let mut out = Vec::new();
    if !policy.use_bean_validation {
        return out;
    }
    if required {
        imports.insert("javax.validation.constraints.NotNull".to_string());
        out.push("@NotNull");
    }
    if is_bean(ir_type) {
        imports.insert("javax.validation.Valid".to_string());
        out.push("@Valid");
    }
    out
}

fn method_params(
    op: &GroupedOperation,
    policy: &GenerationPolicy,
    imports: &mut BTreeSet<String>,
) -> Vec<String> {
    let mut params = Vec::new();
    let mut names = Vec::new();

    if op.has_bean_param {
        imports.insert(format!("{JAX_RS}.BeanParam"));
        let mut annotations = vec!["@BeanParam"];
        if policy.use_bean_validation {
            imports.insert("javax.validation.Valid".to_string());
            annotations.push("@Valid");
        }
        params.push(format!(
            "{} {} beanParam",
            annotations.join(" "),
            op.bean_param_name
        ));
        names.push("beanParam".to_string());
    } else {
        for param in &op.operation.parameters {
            let annotation = param_annotation(param.location);
            imports.insert(format!("{JAX_RS}.{annotation}"));
            let name = safe_identifier(&param.name.camel_case);
            let ty = java_type(&param.param_type, &policy.model_package, imports);
            let mut parts = vec![format!("@{annotation}(\"{}\")", param.original_name)];
            parts.extend(
                validation_annotations(&param.param_type, param.required, policy, imports)
                    .into_iter()
                    .map(String::from),
            );
            parts.push(format!("{ty} {name}"));
            params.push(parts.join(" "));
            names.push(name);
        }
    }

    if let Some(ref body) = op.operation.request_body {
        let name = if names.iter().any(|n| n == "body") {
            "requestBody"
        } else {
            "body"
        };
        let ty = java_type(&body.body_type, &policy.model_package, imports);
        let mut parts: Vec<String> =
            validation_annotations(&body.body_type, body.required, policy, imports)
                .into_iter()
                .map(String::from)
                .collect();
        parts.push(format!("{ty} {name}"));
        params.push(parts.join(" "));
    }
    params
}

fn method_ctx(
    op: &GroupedOperation,
    interface_path: Option<&str>,
    policy: &GenerationPolicy,
    imports: &mut BTreeSet<String>,
) -> Value {
    let ir = &op.operation;
    let http_method = ir.method.as_str().to_uppercase();
    imports.insert(format!("{JAX_RS}.{http_method}"));

    let path = method_path(op, interface_path);
    if path.is_some() {
        imports.insert(format!("{JAX_RS}.Path"));
    }

    let consumes = ir.request_body.as_ref().map(|b| b.content_type.clone());
    if consumes.is_some() {
        imports.insert(format!("{JAX_RS}.Consumes"));
    }

    let produces = match &ir.return_type {
        IrReturnType::Standard(resp) => Some(resp.content_type.clone()),
        IrReturnType::Void => None,
    };
    if produces.is_some() {
        imports.insert(format!("{JAX_RS}.Produces"));
    }
    let return_type = match &ir.return_type {
        _ if policy.return_response => {
            imports.insert(format!("{JAX_RS}.core.Response"));
            "Response".to_string()
        }
        IrReturnType::Standard(resp) => {
            java_type(&resp.response_type, &policy.model_package, imports)
        }
        IrReturnType::Void => "void".to_string(),
    };

    let doc = if policy.api_interface_doc {
        doc_lines(ir.summary.as_deref(), ir.description.as_deref())
    } else {
        Vec::new()
    };

    context! {
        name => safe_identifier(&ir.name.camel_case),
        http_method => http_method,
        path => path,
        consumes => consumes,
        produces => produces,
        return_type => return_type,
        params => method_params(op, policy, imports),
        deprecated => ir.deprecated,
        doc => doc,
    }
}

/// Render `{api_package}/{name}.java`.
pub fn emit_api(
    env: &minijinja::Environment<'_>,
    api: &ApiInterface<'_>,
    title: &str,
    policy: &GenerationPolicy,
) -> Result<String, GeneratorError> {
    let mut imports = BTreeSet::new();
    imports.insert("org.eclipse.microprofile.rest.client.inject.RegisterRestClient".to_string());

    let path = api.path();
    if path.is_some() {
        imports.insert(format!("{JAX_RS}.Path"));
    }

    let methods: Vec<Value> = api
        .operations
        .iter()
        .map(|op| method_ctx(op, path.as_deref(), policy, &mut imports))
        .collect();

    // Unqualified types in the model package never need an import.
    if policy.model_package == policy.api_package {
        let own = format!("{}.", policy.model_package);
        imports.retain(|i| !i.starts_with(&own));
    }

    let doc = if policy.api_interface_doc {
        vec![format!("{title} client for the `{}` resources.", api.name)]
    } else {
        Vec::new()
    };

    render(
        env,
        "api.java.j2",
        context! {
            package => policy.api_package.clone(),
            imports => imports,
            doc => doc,
            annotations => annotation_lines(&policy.annotations.entries),
            config_key => api.name.to_kebab_case(),
            path => path,
            name => api.name.clone(),
            methods => methods,
        },
    )
}
