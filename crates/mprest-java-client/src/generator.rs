use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};
use mprest_core::ir::{
    GroupAssignment, GroupedOperation, IrReturnType, IrSchema, IrSpec, IrType,
};
use mprest_core::{ClientCodegen, CodeGenerator, GeneratedFile, error::GeneratorError};

use crate::emitters::api::{ApiInterface, emit_api};
use crate::emitters::bean_param::emit_bean_param;
use crate::emitters::client::{CLIENT_SUFFIX, emit_client};
use crate::emitters::model::emit_model;
use crate::emitters::{environment, java_path};

/// Alias chains longer than this are assumed to be cyclic.
const MAX_ALIAS_DEPTH: usize = 16;

/// MicroProfile REST client generator: JAX-RS interfaces, bean parameters and models.
pub struct MicroProfileClientGenerator;

impl CodeGenerator for MicroProfileClientGenerator {
    fn generate(
        &self,
        ir: &IrSpec,
        codegen: &dyn ClientCodegen,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let policy = codegen.policy();
        let env = environment()?;
        let ir = inline_aliases(ir);
        let groups = codegen.group_operations(&ir);

        let mut files = Vec::new();
        for api in interfaces(&groups, codegen) {
            debug!("{}: {} operations", api.name, api.operations.len());
            files.push(GeneratedFile {
                path: java_path(&policy.api_package, &api.name),
                content: emit_api(&env, &api, &ir.info.title, policy)?,
            });

            for op in api.operations.iter().filter(|op| op.has_bean_param) {
                files.push(GeneratedFile {
                    path: java_path(&policy.api_package, &op.bean_param_name),
                    content: emit_bean_param(&env, op, policy)?,
                });
            }

            if !policy.interface_only {
                files.push(GeneratedFile {
                    path: java_path(&policy.api_package, &format!("{}{CLIENT_SUFFIX}", api.name)),
                    content: emit_client(&env, &api.name, policy)?,
                });
            }
        }

        for schema in &ir.schemas {
            if let Some(content) = emit_model(&env, schema, policy)? {
                files.push(GeneratedFile {
                    path: java_path(&policy.model_package, &schema.name().pascal_case),
                    content,
                });
            }
        }

        Ok(files)
    }
}

/// Groups that resolve to the same interface name are merged, first-seen order kept.
fn interfaces<'a>(groups: &'a GroupAssignment, codegen: &dyn ClientCodegen) -> Vec<ApiInterface<'a>> {
    let mut by_name: IndexMap<String, Vec<&'a GroupedOperation>> = IndexMap::new();
    for (key, ops) in groups.iter() {
        by_name
            .entry(codegen.resolve_name(key))
            .or_default()
            .extend(ops.iter());
    }
    by_name
        .into_iter()
        .map(|(name, operations)| ApiInterface { name, operations })
        .collect()
}

/// Replace references to alias schemas with their targets. Java has no type aliases.
fn inline_aliases(ir: &IrSpec) -> IrSpec {
    let aliases: HashMap<String, IrType> = ir
        .schemas
        .iter()
        .filter_map(|s| match s {
            IrSchema::Alias(a) => Some((a.name.pascal_case.clone(), a.target.clone())),
            _ => None,
        })
        .collect();

    let mut out = ir.clone();
    if aliases.is_empty() {
        return out;
    }

    for op in &mut out.operations {
        for param in &mut op.parameters {
            resolve_alias(&mut param.param_type, &aliases, 0);
        }
        if let Some(ref mut body) = op.request_body {
            resolve_alias(&mut body.body_type, &aliases, 0);
        }
        if let IrReturnType::Standard(ref mut resp) = op.return_type {
            resolve_alias(&mut resp.response_type, &aliases, 0);
        }
    }
    for schema in &mut out.schemas {
        if let IrSchema::Object(object) = schema {
            for field in &mut object.fields {
                resolve_alias(&mut field.field_type, &aliases, 0);
            }
        }
    }
    out
}

fn resolve_alias(ty: &mut IrType, aliases: &HashMap<String, IrType>, depth: usize) {
    match ty {
        IrType::Ref(name) => {
            let Some(target) = aliases.get(name.as_str()) else {
                return;
            };
            if depth >= MAX_ALIAS_DEPTH {
                warn!("alias `{name}` does not resolve to a concrete type");
                *ty = IrType::Object;
                return;
            }
            *ty = target.clone();
            resolve_alias(ty, aliases, depth + 1);
        }
        IrType::Array(inner) | IrType::Map(inner) => resolve_alias(inner, aliases, depth),
        IrType::Union(variants) => {
            for v in variants {
                resolve_alias(v, aliases, depth);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_chain_is_resolved() {
        let aliases: HashMap<String, IrType> = [
            ("PetId".to_string(), IrType::Ref("Id".into())),
            ("Id".to_string(), IrType::Long),
        ]
        .into_iter()
        .collect();
        let mut ty = IrType::Array(Box::new(IrType::Ref("PetId".into())));
        resolve_alias(&mut ty, &aliases, 0);
        assert_eq!(ty, IrType::Array(Box::new(IrType::Long)));

        let mut pet = IrType::Ref("Pet".into());
        resolve_alias(&mut pet, &aliases, 0);
        assert_eq!(pet, IrType::Ref("Pet".into()));
    }

    #[test]
    fn test_alias_cycle_terminates() {
        let aliases: HashMap<String, IrType> = [
            ("A".to_string(), IrType::Ref("B".into())),
            ("B".to_string(), IrType::Ref("A".into())),
        ]
        .into_iter()
        .collect();
        let mut ty = IrType::Ref("A".into());
        resolve_alias(&mut ty, &aliases, 0);
        assert_eq!(ty, IrType::Object);
    }
}
