use std::collections::{BTreeSet, HashSet};

use log::debug;
use minijinja::{Value, context};
use mprest_core::config::{FieldStrategy, GenerationPolicy, JsonLib};
use mprest_core::error::GeneratorError;
use mprest_core::ir::{IrEnumSchema, IrObjectSchema, IrSchema};
use mprest_core::transform::name_normalizer::normalize_name;

use super::api::validation_annotations;
use super::{annotation_lines, doc_lines, render};
use crate::type_mapper::{java_type, safe_identifier};

/// Methods every class inherits from `java.lang.Object`.
const OBJECT_METHODS: &[&str] = &[
    "getClass", "hashCode", "equals", "toString", "clone", "finalize", "notify", "notifyAll",
    "wait",
];

/// `get`/`set` accessor name for a property, kept clear of `Object`'s methods.
fn accessor_name(prefix: &str, pascal_case: &str) -> String {
    let name = format!("{prefix}{pascal_case}");
    if OBJECT_METHODS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// A field of a generated class, before it is handed to the template.
pub(crate) struct ClassField {
    pub name: String,
    /// PascalCase property name the accessors are built from.
    pub accessor: String,
    pub java_type: String,
    pub annotations: Vec<String>,
    pub doc: Option<String>,
}

impl ClassField {
    fn to_value(&self) -> Value {
        context! {
            name => self.name.clone(),
            java_type => self.java_type.clone(),
            annotations => self.annotations.clone(),
            doc => self.doc.clone(),
            getter => accessor_name("get", &self.accessor),
            setter => accessor_name("set", &self.accessor),
        }
    }
}

/// A class rendered through the shared class template.
pub(crate) struct JavaClass {
    pub package: String,
    pub name: String,
    pub doc: Vec<String>,
    pub annotations: Vec<String>,
    pub fields: Vec<ClassField>,
    pub imports: BTreeSet<String>,
}

/// Render a class, honoring the field strategy.
pub(crate) fn render_class(
    env: &minijinja::Environment<'_>,
    class: JavaClass,
    policy: &GenerationPolicy,
) -> Result<String, GeneratorError> {
    let JavaClass {
        package,
        name,
        doc,
        mut annotations,
        fields,
        mut imports,
    } = class;
    let visibility = match policy.field_strategy {
        FieldStrategy::Public => "public",
        FieldStrategy::Lombok | FieldStrategy::GetSet => "private",
    };
    match policy.field_strategy {
        FieldStrategy::Lombok => {
            imports.insert("lombok.Data".to_string());
            annotations.push("@Data".to_string());
        }
        FieldStrategy::GetSet => {
            imports.insert("java.util.Objects".to_string());
        }
        FieldStrategy::Public => {}
    }

    let equals_terms: Vec<String> = fields
        .iter()
        .map(|f| format!("Objects.equals({0}, other.{0})", f.name))
        .collect();
    let field_names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let field_values: Vec<Value> = fields.iter().map(ClassField::to_value).collect();

    render(
        env,
        "class.java.j2",
        context! {
            package => package,
            imports => imports,
            doc => doc,
            class_annotations => annotations,
            name => name,
            fields => field_values,
            visibility => visibility,
            equals_terms => equals_terms,
            field_names => field_names,
            opts => Value::from_serialize(policy.to_options()),
        },
    )
}

fn json_property(
    original: &str,
    java_name: &str,
    policy: &GenerationPolicy,
    imports: &mut BTreeSet<String>,
) -> Option<String> {
    if original == java_name {
        return None;
    }
    let annotation = match policy.json_lib {
        JsonLib::Jsonb => {
            imports.insert("javax.json.bind.annotation.JsonbProperty".to_string());
            "JsonbProperty"
        }
        JsonLib::Jackson => {
            imports.insert("com.fasterxml.jackson.annotation.JsonProperty".to_string());
            "JsonProperty"
        }
    };
    Some(format!("@{annotation}(\"{original}\")"))
}

fn emit_object(
    env: &minijinja::Environment<'_>,
    object: &IrObjectSchema,
    policy: &GenerationPolicy,
) -> Result<String, GeneratorError> {
    let mut imports = BTreeSet::new();
    let fields: Vec<ClassField> = object
        .fields
        .iter()
        .map(|field| {
            let name = safe_identifier(&field.name.camel_case);
            // Sibling schemas share the package and are referenced unqualified.
            let java_type = java_type(&field.field_type, "", &mut imports);
            let mut annotations: Vec<String> =
                json_property(&field.original_name, &name, policy, &mut imports)
                    .into_iter()
                    .collect();
            annotations.extend(
                validation_annotations(&field.field_type, field.required, policy, &mut imports)
                    .into_iter()
                    .map(String::from),
            );
            ClassField {
                name,
                accessor: field.name.pascal_case.clone(),
                java_type,
                annotations,
                doc: field.description.clone(),
            }
        })
        .collect();

    let class = JavaClass {
        package: policy.model_package.clone(),
        name: object.name.pascal_case.clone(),
        doc: doc_lines(None, object.description.as_deref()),
        annotations: annotation_lines(&policy.model_annotations.entries),
        fields,
        imports,
    };
    render_class(env, class, policy)
}

fn emit_enum(
    env: &minijinja::Environment<'_>,
    schema: &IrEnumSchema,
    policy: &GenerationPolicy,
) -> Result<String, GeneratorError> {
    let mut imports = BTreeSet::new();
    if policy.json_lib == JsonLib::Jackson {
        imports.insert("com.fasterxml.jackson.annotation.JsonCreator".to_string());
        imports.insert("com.fasterxml.jackson.annotation.JsonValue".to_string());
    }

    let mut seen = HashSet::new();
    let constants: Vec<Value> = schema
        .variants
        .iter()
        .map(|value| {
            let base = safe_identifier(&normalize_name(value).screaming_snake);
            let mut constant = base.clone();
            let mut n = 2;
            while !seen.insert(constant.clone()) {
                constant = format!("{base}_{n}");
                n += 1;
            }
            context! { name => constant, value => value.clone() }
        })
        .collect();

    render(
        env,
        "enum.java.j2",
        context! {
            package => policy.model_package.clone(),
            imports => imports,
            doc => doc_lines(None, schema.description.as_deref()),
            class_annotations => annotation_lines(&policy.model_annotations.entries),
            name => schema.name.pascal_case.clone(),
            constants => constants,
            opts => Value::from_serialize(policy.to_options()),
        },
    )
}

/// Render the model class for a schema. Aliases produce no file; the generator
/// inlines their targets before rendering.
pub fn emit_model(
    env: &minijinja::Environment<'_>,
    schema: &IrSchema,
    policy: &GenerationPolicy,
) -> Result<Option<String>, GeneratorError> {
    match schema {
        IrSchema::Object(object) => emit_object(env, object, policy).map(Some),
        IrSchema::Enum(e) => emit_enum(env, e, policy).map(Some),
        IrSchema::Alias(alias) => {
            debug!("skipping alias schema `{}`", alias.name);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use mprest_core::config::ExtraAnnotations;
    use mprest_core::ir::{IrAliasSchema, IrField, IrType};

    fn field(name: &str, field_type: IrType, required: bool) -> IrField {
        IrField {
            name: normalize_name(name),
            original_name: name.to_string(),
            field_type,
            required,
            description: None,
        }
    }

    fn pet() -> IrSchema {
        IrSchema::Object(IrObjectSchema {
            name: normalize_name("Pet"),
            description: Some("A pet for sale.".into()),
            fields: vec![
                field("id", IrType::Long, true),
                field("pet_type", IrType::String, false),
                field("tags", IrType::Array(Box::new(IrType::Ref("Tag".into()))), false),
            ],
        })
    }

    fn render_pet(policy: &GenerationPolicy) -> String {
        emit_model(&environment().unwrap(), &pet(), policy)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_public_fields_with_jsonb() {
        let out = render_pet(&GenerationPolicy::default());
        insta::assert_snapshot!(out, @r#"
        package model;

        import java.util.List;
        import javax.json.bind.annotation.JsonbProperty;
        import javax.validation.Valid;
        import javax.validation.constraints.NotNull;

        /**
         * A pet for sale.
         */
        public class Pet {

            @NotNull
            public Long id;

            @JsonbProperty("pet_type")
            public String petType;

            @Valid
            public List<Tag> tags;
        }
        "#);
    }

    #[test]
    fn test_getters_setters_with_jackson() {
        let policy = GenerationPolicy {
            field_strategy: FieldStrategy::GetSet,
            json_lib: JsonLib::Jackson,
            use_bean_validation: false,
            ..GenerationPolicy::default()
        };
        let out = render_pet(&policy);
        assert!(out.contains("import com.fasterxml.jackson.annotation.JsonProperty;"));
        assert!(out.contains("import java.util.Objects;"));
        assert!(out.contains("    @JsonProperty(\"pet_type\")\n    private String petType;"));
        assert!(out.contains("    public String getPetType() {\n        return petType;\n    }"));
        assert!(out.contains("    public void setPetType(String petType) {\n        this.petType = petType;\n    }"));
        assert!(out.contains(
            "return Objects.equals(id, other.id)\n                && Objects.equals(petType, other.petType)"
        ));
        assert!(out.contains("return Objects.hash(id, petType, tags);"));
        assert!(out.contains("+ \", petType=\" + petType"));
        assert!(!out.contains("@NotNull"));
    }

    #[test]
    fn test_accessors_avoid_object_methods() {
        let schema = IrSchema::Object(IrObjectSchema {
            name: normalize_name("Thing"),
            description: None,
            fields: vec![
                field("class", IrType::String, false),
                field("hash_code", IrType::Integer, false),
            ],
        });
        let policy = GenerationPolicy {
            field_strategy: FieldStrategy::GetSet,
            ..GenerationPolicy::default()
        };
        let out = emit_model(&environment().unwrap(), &schema, &policy)
            .unwrap()
            .unwrap();
        assert!(out.contains("    @JsonbProperty(\"class\")\n    private String _class;"));
        assert!(out.contains("    public String getClass_() {\n        return _class;\n    }"));
        assert!(out.contains("    public void setClass(String _class) {\n        this._class = _class;\n    }"));
        assert!(out.contains("    public Integer getHashCode() {"));
        assert!(!out.contains("String getClass()"));
        assert!(out.contains("getClass() != o.getClass()"));
    }

    #[test]
    fn test_lombok_with_model_annotations() {
        let policy = GenerationPolicy {
            field_strategy: FieldStrategy::Lombok,
            model_annotations: ExtraAnnotations::new(vec!["@RegisterForReflection".into()]),
            ..GenerationPolicy::default()
        };
        let out = render_pet(&policy);
        assert!(out.contains("import lombok.Data;"));
        assert!(out.contains("@RegisterForReflection\n@Data\npublic class Pet {"));
        assert!(out.contains("    private Long id;"));
        assert!(!out.contains("getId"));
        assert!(!out.contains("equals"));
    }

    #[test]
    fn test_enum() {
        let schema = IrSchema::Enum(IrEnumSchema {
            name: normalize_name("PetStatus"),
            description: None,
            variants: vec!["available".into(), "on-hold".into(), "on hold".into(), "3d".into()],
        });
        let policy = GenerationPolicy {
            json_lib: JsonLib::Jackson,
            ..GenerationPolicy::default()
        };
        let out = emit_model(&environment().unwrap(), &schema, &policy)
            .unwrap()
            .unwrap();
        assert!(out.contains("public enum PetStatus {"));
        assert!(out.contains("    AVAILABLE(\"available\"),\n"));
        assert!(out.contains("    ON_HOLD(\"on-hold\"),\n"));
        assert!(out.contains("    ON_HOLD_2(\"on hold\"),\n"));
        assert!(out.contains("    _3D(\"3d\");\n"));
        assert!(out.contains("    @JsonValue\n    public String getValue()"));
        assert!(out.contains("    @JsonCreator\n    public static PetStatus fromValue(String value)"));
    }

    #[test]
    fn test_alias_is_skipped() {
        let schema = IrSchema::Alias(IrAliasSchema {
            name: normalize_name("PetId"),
            description: None,
            target: IrType::Long,
        });
        let out = emit_model(&environment().unwrap(), &schema, &GenerationPolicy::default());
        assert_eq!(out.unwrap(), None);
    }
}
