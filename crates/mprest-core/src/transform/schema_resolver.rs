use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ir::{IrAliasSchema, IrEnumSchema, IrField, IrObjectSchema, IrSchema, IrType};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

use super::name_normalizer::normalize_name;

/// Converts parsed schemas into IR types, following `allOf` references through the
/// component schemas.
pub struct SchemaResolver<'a> {
    components: &'a IndexMap<String, SchemaOrRef>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(components: &'a IndexMap<String, SchemaOrRef>) -> Self {
        Self { components }
    }

    /// Convert a named component schema.
    pub fn to_ir_schema(&self, name: &str, schema_or_ref: &SchemaOrRef) -> IrSchema {
        let schema = match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => {
                return IrSchema::Alias(IrAliasSchema {
                    name: normalize_name(name),
                    description: None,
                    target: IrType::Ref(ref_name(ref_path)),
                });
            }
            SchemaOrRef::Schema(schema) => schema,
        };

        if !schema.enum_values.is_empty() && schema.enum_values.iter().all(|v| v.is_string()) {
            return IrSchema::Enum(IrEnumSchema {
                name: normalize_name(name),
                description: schema.description.clone(),
                variants: schema
                    .enum_values
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            });
        }

        if is_object(schema) {
            let mut fields = Vec::new();
            let mut visited = HashSet::new();
            visited.insert(name.to_string());
            self.collect_fields(schema, &mut fields, &mut visited);
            return IrSchema::Object(IrObjectSchema {
                name: normalize_name(name),
                description: schema.description.clone(),
                fields,
            });
        }

        IrSchema::Alias(IrAliasSchema {
            name: normalize_name(name),
            description: schema.description.clone(),
            target: schema_to_ir_type(schema),
        })
    }

    fn collect_fields(&self, schema: &Schema, out: &mut Vec<IrField>, visited: &mut HashSet<String>) {
        for part in &schema.all_of {
            match part {
                SchemaOrRef::Ref { ref_path } => {
                    let target = ref_path.rsplit('/').next().unwrap_or(ref_path);
                    if !visited.insert(target.to_string()) {
                        continue;
                    }
                    if let Some(SchemaOrRef::Schema(inner)) = self.components.get(target) {
                        self.collect_fields(inner, out, visited);
                    }
                }
                SchemaOrRef::Schema(inner) => self.collect_fields(inner, out, visited),
            }
        }

        for (prop_name, prop) in &schema.properties {
            if out.iter().any(|f| f.original_name == *prop_name) {
                continue;
            }
            let description = match prop {
                SchemaOrRef::Schema(s) => s.description.clone(),
                SchemaOrRef::Ref { .. } => None,
            };
            out.push(IrField {
                name: normalize_name(prop_name),
                original_name: prop_name.clone(),
                field_type: schema_or_ref_to_ir_type(prop),
                required: schema.required.contains(prop_name),
                description,
            });
        }
    }
}

fn is_object(schema: &Schema) -> bool {
    let typed_object = schema
        .schema_type
        .as_ref()
        .and_then(|t| t.primary())
        .is_some_and(|t| t == SchemaType::Object);
    let is_map = schema.properties.is_empty()
        && matches!(
            schema.additional_properties,
            Some(AdditionalProperties::Schema(_)) | Some(AdditionalProperties::Bool(true))
        );
    (typed_object && !is_map) || !schema.properties.is_empty() || !schema.all_of.is_empty()
}

/// PascalCase schema name from a `#/components/schemas/Name` pointer.
pub fn ref_name(ref_path: &str) -> String {
    let last = ref_path.rsplit('/').next().unwrap_or(ref_path);
    normalize_name(last).pascal_case
}

pub fn schema_or_ref_to_ir_type(schema_or_ref: &SchemaOrRef) -> IrType {
    match schema_or_ref {
        SchemaOrRef::Ref { ref_path } => IrType::Ref(ref_name(ref_path)),
        SchemaOrRef::Schema(schema) => schema_to_ir_type(schema),
    }
}

pub fn schema_to_ir_type(schema: &Schema) -> IrType {
    let variants = if schema.one_of.is_empty() {
        &schema.any_of
    } else {
        &schema.one_of
    };
    if !variants.is_empty() {
        return IrType::Union(variants.iter().map(schema_or_ref_to_ir_type).collect());
    }
    if schema.all_of.len() == 1 && schema.properties.is_empty() {
        return schema_or_ref_to_ir_type(&schema.all_of[0]);
    }

    let format = schema.format.as_deref();
    match schema.schema_type.as_ref().and_then(|t| t.primary()) {
        Some(SchemaType::String) => match format {
            Some("date") => IrType::Date,
            Some("date-time") => IrType::DateTime,
            Some("binary") => IrType::Binary,
            _ => IrType::String,
        },
        Some(SchemaType::Integer) => match format {
            Some("int64") => IrType::Long,
            _ => IrType::Integer,
        },
        Some(SchemaType::Number) => IrType::Number,
        Some(SchemaType::Boolean) => IrType::Boolean,
        Some(SchemaType::Array) => {
            let items = schema
                .items
                .as_deref()
                .map(schema_or_ref_to_ir_type)
                .unwrap_or(IrType::Any);
            IrType::Array(Box::new(items))
        }
        Some(SchemaType::Object) | None if !schema.properties.is_empty() => IrType::Object,
        Some(SchemaType::Object) => match schema.additional_properties {
            Some(AdditionalProperties::Schema(ref value)) => {
                IrType::Map(Box::new(schema_or_ref_to_ir_type(value)))
            }
            Some(AdditionalProperties::Bool(true)) => IrType::Map(Box::new(IrType::Any)),
            _ => IrType::Object,
        },
        Some(SchemaType::Null) | None => IrType::Any,
    }
}
