use std::collections::BTreeSet;

use mprest_core::ir::IrType;

/// Java keywords and literals that cannot be used as identifiers.
const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "var", "record", "yield",
];

/// Prefix reserved words and names starting with a digit with `_`.
pub fn safe_identifier(name: &str) -> String {
    if RESERVED.contains(&name) || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Java type for an `IrType`, with the imports it needs added to `imports`.
///
/// Named schemas live in `model_package`; their import is only added when the
/// caller sits in a different package.
pub fn java_type(ir_type: &IrType, model_package: &str, imports: &mut BTreeSet<String>) -> String {
    match ir_type {
        IrType::String => "String".to_string(),
        IrType::Integer => "Integer".to_string(),
        IrType::Long => "Long".to_string(),
        IrType::Number => {
            imports.insert("java.math.BigDecimal".to_string());
            "BigDecimal".to_string()
        }
        IrType::Boolean => "Boolean".to_string(),
        IrType::Date => {
            imports.insert("java.time.LocalDate".to_string());
            "LocalDate".to_string()
        }
        IrType::DateTime => {
            imports.insert("java.time.OffsetDateTime".to_string());
            "OffsetDateTime".to_string()
        }
        IrType::Binary => "byte[]".to_string(),
        IrType::Array(inner) => {
            imports.insert("java.util.List".to_string());
            format!("List<{}>", java_type(inner, model_package, imports))
        }
        IrType::Map(value) => {
            imports.insert("java.util.Map".to_string());
            format!("Map<String, {}>", java_type(value, model_package, imports))
        }
        IrType::Ref(name) => {
            if !model_package.is_empty() {
                imports.insert(format!("{model_package}.{name}"));
            }
            name.clone()
        }
        IrType::Object | IrType::Union(_) | IrType::Any => "Object".to_string(),
    }
}

/// Whether values of this type are validated as nested beans (`@Valid`).
pub fn is_bean(ir_type: &IrType) -> bool {
    match ir_type {
        IrType::Ref(_) => true,
        IrType::Array(inner) | IrType::Map(inner) => is_bean(inner),
        _ => false,
    }
}

/// Directory for a dotted Java package (`org.acme.api` → `org/acme/api`).
pub fn package_dir(package: &str) -> String {
    package.replace('.', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(ir_type: &IrType) -> (String, Vec<String>) {
        let mut imports = BTreeSet::new();
        let name = java_type(ir_type, "org.acme.model", &mut imports);
        (name, imports.into_iter().collect())
    }

    #[test]
    fn test_primitives() {
        assert_eq!(map(&IrType::String).0, "String");
        assert_eq!(map(&IrType::Integer).0, "Integer");
        assert_eq!(map(&IrType::Long).0, "Long");
        assert_eq!(map(&IrType::Boolean).0, "Boolean");
        assert_eq!(map(&IrType::Binary).0, "byte[]");
        assert_eq!(map(&IrType::Any).0, "Object");
        assert_eq!(
            map(&IrType::DateTime),
            ("OffsetDateTime".to_string(), vec!["java.time.OffsetDateTime".to_string()])
        );
    }

    #[test]
    fn test_containers_collect_imports() {
        let list_of_maps = IrType::Array(Box::new(IrType::Map(Box::new(IrType::Ref(
            "Pet".into(),
        )))));
        let (name, imports) = map(&list_of_maps);
        assert_eq!(name, "List<Map<String, Pet>>");
        assert_eq!(
            imports,
            vec!["java.util.List", "java.util.Map", "org.acme.model.Pet"]
        );
    }

    #[test]
    fn test_same_package_ref_has_no_import() {
        let mut imports = BTreeSet::new();
        assert_eq!(java_type(&IrType::Ref("Pet".into()), "", &mut imports), "Pet");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_safe_identifier() {
        assert_eq!(safe_identifier("default"), "_default");
        assert_eq!(safe_identifier("class"), "_class");
        assert_eq!(safe_identifier("3d"), "_3d");
        assert_eq!(safe_identifier("petId"), "petId");
    }

    #[test]
    fn test_bean_detection() {
        assert!(is_bean(&IrType::Ref("Pet".into())));
        assert!(is_bean(&IrType::Array(Box::new(IrType::Ref("Pet".into())))));
        assert!(!is_bean(&IrType::Array(Box::new(IrType::String))));
    }
}
