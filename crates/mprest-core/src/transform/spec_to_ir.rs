use indexmap::IndexMap;
use log::debug;

use crate::error::TransformError;
use crate::ir::*;
use crate::parse::operation::{
    Operation, ParameterLocation, ParameterOrRef, PathItem, RequestBodyOrRef, Response,
};
use crate::parse::spec::{Components, OpenApiSpec};

use super::name_normalizer::{normalize_name, route_to_name};
use super::schema_resolver::{SchemaResolver, schema_or_ref_to_ir_type};

const JSON: &str = "application/json";

/// Transform a parsed OpenAPI spec into the IR consumed by grouping and rendering.
pub fn transform(spec: &OpenApiSpec) -> Result<IrSpec, TransformError> {
    let empty = Components::default();
    let components = spec.components.as_ref().unwrap_or(&empty);

    let resolver = SchemaResolver::new(&components.schemas);
    let schemas = components
        .schemas
        .iter()
        .map(|(name, schema)| resolver.to_ir_schema(name, schema))
        .collect();

    let mut operations = Vec::new();
    for (path, item) in &spec.paths {
        collect_operations(path, item, components, &mut operations)?;
    }

    Ok(IrSpec {
        info: IrInfo {
            title: spec.info.title.clone(),
            description: spec.info.description.clone(),
            version: spec.info.version.clone(),
        },
        schemas,
        operations,
    })
}

fn collect_operations(
    path: &str,
    item: &PathItem,
    components: &Components,
    out: &mut Vec<IrOperation>,
) -> Result<(), TransformError> {
    let path_params = resolve_parameters(&item.parameters, components)?;

    let methods = [
        (HttpMethod::Get, &item.get),
        (HttpMethod::Post, &item.post),
        (HttpMethod::Put, &item.put),
        (HttpMethod::Delete, &item.delete),
        (HttpMethod::Patch, &item.patch),
        (HttpMethod::Options, &item.options),
        (HttpMethod::Head, &item.head),
    ];
    for (method, op) in methods {
        if let Some(op) = op {
            out.push(build_operation(method, path, op, &path_params, components)?);
        }
    }
    Ok(())
}

fn build_operation(
    method: HttpMethod,
    path: &str,
    op: &Operation,
    path_params: &[IrParameter],
    components: &Components,
) -> Result<IrOperation, TransformError> {
    let operation_id = op
        .operation_id
        .clone()
        .unwrap_or_else(|| route_to_name(method.as_str(), path));

    // Operation-level parameters override path-level ones with the same name and location.
    let own = resolve_parameters(&op.parameters, components)?;
    let mut parameters: Vec<IrParameter> = path_params
        .iter()
        .filter(|p| {
            !own.iter()
                .any(|o| o.original_name == p.original_name && o.location == p.location)
        })
        .cloned()
        .collect();
    parameters.extend(own);

    let request_body = match op.request_body {
        Some(ref body) => resolve_request_body(body, components)?,
        None => None,
    };

    Ok(IrOperation {
        name: normalize_name(&operation_id),
        operation_id,
        method,
        path: path.to_string(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        tags: op.tags.clone(),
        parameters,
        request_body,
        return_type: detect_return_type(&op.responses),
        deprecated: op.deprecated.unwrap_or(false),
    })
}

fn resolve_parameters(
    params: &[ParameterOrRef],
    components: &Components,
) -> Result<Vec<IrParameter>, TransformError> {
    let mut out = Vec::with_capacity(params.len());
    for p in params {
        let param = match p {
            ParameterOrRef::Parameter(param) => param,
            ParameterOrRef::Ref { ref_path } => {
                match lookup(&components.parameters, ref_path, "parameters")? {
                    ParameterOrRef::Parameter(param) => param,
                    ParameterOrRef::Ref { ref_path } => {
                        return Err(TransformError::UnresolvedRef(ref_path.clone()));
                    }
                }
            }
        };
        let location = match param.location {
            ParameterLocation::Path => IrParameterLocation::Path,
            ParameterLocation::Query => IrParameterLocation::Query,
            ParameterLocation::Header => IrParameterLocation::Header,
            ParameterLocation::Cookie => IrParameterLocation::Cookie,
        };
        out.push(IrParameter {
            name: normalize_name(&param.name),
            original_name: param.name.clone(),
            location,
            param_type: param
                .schema
                .as_ref()
                .map(schema_or_ref_to_ir_type)
                .unwrap_or(IrType::String),
            required: param.required || location == IrParameterLocation::Path,
            description: param.description.clone(),
        });
    }
    Ok(out)
}

fn resolve_request_body(
    body: &RequestBodyOrRef,
    components: &Components,
) -> Result<Option<IrRequestBody>, TransformError> {
    let rb = match body {
        RequestBodyOrRef::RequestBody(rb) => rb,
        RequestBodyOrRef::Ref { ref_path } => {
            match lookup(&components.request_bodies, ref_path, "requestBodies")? {
                RequestBodyOrRef::RequestBody(rb) => rb,
                RequestBodyOrRef::Ref { ref_path } => {
                    return Err(TransformError::UnresolvedRef(ref_path.clone()));
                }
            }
        }
    };

    // Prefer application/json, fall back to the first content type.
    let Some((content_type, media)) = rb.content.get_key_value(JSON).or_else(|| rb.content.first())
    else {
        return Ok(None);
    };

    Ok(Some(IrRequestBody {
        body_type: media
            .schema
            .as_ref()
            .map(schema_or_ref_to_ir_type)
            .unwrap_or(IrType::Any),
        required: rb.required,
        content_type: content_type.clone(),
        description: rb.description.clone(),
    }))
}

/// The first 2xx response with a body decides the return type.
fn detect_return_type(responses: &IndexMap<String, Response>) -> IrReturnType {
    for (code, response) in responses {
        if !code.starts_with('2') {
            continue;
        }
        let Some((content_type, media)) = response
            .content
            .get_key_value(JSON)
            .or_else(|| response.content.first())
        else {
            continue;
        };
        let response_type = match media.schema {
            Some(ref schema) => schema_or_ref_to_ir_type(schema),
            None => IrType::Any,
        };
        return IrReturnType::Standard(IrResponse {
            response_type,
            content_type: content_type.clone(),
            description: response.description.clone(),
        });
    }
    IrReturnType::Void
}

fn lookup<'a, T>(
    table: &'a IndexMap<String, T>,
    ref_path: &str,
    section: &str,
) -> Result<&'a T, TransformError> {
    let name = ref_path
        .strip_prefix(&format!("#/components/{section}/"))
        .ok_or_else(|| TransformError::UnresolvedRef(ref_path.to_string()))?;
    debug!("resolving {ref_path}");
    table
        .get(name)
        .ok_or_else(|| TransformError::UnresolvedRef(ref_path.to_string()))
}
