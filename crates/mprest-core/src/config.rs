use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single raw option value as found in the project file or on the command line.
///
/// `Other` captures anything that fits none of the supported shapes so that a
/// malformed value never prevents the option bag from loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// Flat, string-keyed option bag owned by the host tool.
pub type OptionBag = IndexMap<String, OptionValue>;

pub const API_NAME: &str = "apiName";
pub const PATH_PREFIX: &str = "pathPrefix";
pub const API_SUFFIX: &str = "apiSuffix";
pub const BEAN_PARAM_SUFFIX: &str = "beanParamSuffix";
pub const BEAN_PARAM_COUNT: &str = "beanParamCount";
pub const FIELD_GEN: &str = "fieldGen";
pub const JSON_LIB: &str = "jsonLib";
pub const RETURN_RESPONSE: &str = "returnResponse";
pub const INTERFACE_ONLY: &str = "interfaceOnly";
pub const FORMATTER: &str = "formatter";
pub const ANNOTATIONS: &str = "annotations";
pub const MODEL_ANNOTATIONS: &str = "modelAnnotations";
pub const USE_BEAN_VALIDATION: &str = "useBeanValidation";
pub const API_INTERFACE_DOC: &str = "apiInterfaceDoc";
pub const API_PACKAGE: &str = "apiPackage";
pub const MODEL_PACKAGE: &str = "modelPackage";

// Derived keys, written by `GenerationPolicy::to_options` and never read back.
pub const FIELD_PUBLIC: &str = "fieldPublic";
pub const LOMBOK_DATA: &str = "lombokData";
pub const GENERATE_GETTER_SETTER: &str = "generateGetterSetter";
pub const GENERATE_EQUALS: &str = "generateEquals";
pub const GENERATE_TO_STRING: &str = "generateToString";
pub const JSONB: &str = "jsonb";
pub const JACKSON: &str = "jackson";
pub const HAS_ANNOTATIONS: &str = "hasAnnotations";
pub const HAS_MODEL_ANNOTATIONS: &str = "hasModelAnnotations";

const DEFAULT_API_SUFFIX: &str = "Api";
const DEFAULT_BEAN_PARAM_SUFFIX: &str = "BeanParam";
const DEFAULT_BEAN_PARAM_COUNT: usize = 4;

/// How generated models expose their fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Plain public fields.
    #[default]
    Public,
    /// Private fields with a Lombok `@Data` annotation.
    Lombok,
    /// Private fields with generated accessors, `equals`, `hashCode` and `toString`.
    GetSet,
}

impl FieldStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_choice(value).as_str() {
            "public" => Some(FieldStrategy::Public),
            "lombok" => Some(FieldStrategy::Lombok),
            "get-set" | "getset" | "getter-setter" => Some(FieldStrategy::GetSet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStrategy::Public => "public",
            FieldStrategy::Lombok => "lombok",
            FieldStrategy::GetSet => "get-set",
        }
    }
}

/// Which JSON binding annotations the models carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonLib {
    #[default]
    Jsonb,
    Jackson,
}

impl JsonLib {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_choice(value).as_str() {
            "jsonb" | "json-b" => Some(JsonLib::Jsonb),
            "jackson" => Some(JsonLib::Jackson),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonLib::Jsonb => "jsonb",
            JsonLib::Jackson => "jackson",
        }
    }
}

fn normalize_choice(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('_', "-")
}

/// Raw annotation snippets plus whether there are any, so templates can branch cheaply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraAnnotations {
    pub entries: Vec<String>,
    pub has_entries: bool,
}

impl ExtraAnnotations {
    pub fn new(entries: Vec<String>) -> Self {
        let has_entries = !entries.is_empty();
        Self {
            entries,
            has_entries,
        }
    }
}

/// Fully resolved, mutually consistent generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPolicy {
    pub field_strategy: FieldStrategy,
    pub json_lib: JsonLib,
    /// Fixed group name for every operation.
    pub api_name: Option<String>,
    /// Literal prefix removed from resource paths before grouping.
    pub path_prefix: Option<String>,
    pub api_suffix: String,
    pub bean_param_suffix: String,
    /// Operations with at least this many eligible parameters get a bean parameter.
    pub bean_param_count: usize,
    pub return_response: bool,
    pub interface_only: bool,
    pub formatter: bool,
    pub use_bean_validation: bool,
    pub api_interface_doc: bool,
    pub api_package: String,
    pub model_package: String,
    pub annotations: ExtraAnnotations,
    pub model_annotations: ExtraAnnotations,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            field_strategy: FieldStrategy::default(),
            json_lib: JsonLib::default(),
            api_name: None,
            path_prefix: None,
            api_suffix: DEFAULT_API_SUFFIX.to_string(),
            bean_param_suffix: DEFAULT_BEAN_PARAM_SUFFIX.to_string(),
            bean_param_count: DEFAULT_BEAN_PARAM_COUNT,
            return_response: true,
            interface_only: true,
            formatter: true,
            use_bean_validation: true,
            api_interface_doc: true,
            api_package: "api".to_string(),
            model_package: "model".to_string(),
            annotations: ExtraAnnotations::default(),
            model_annotations: ExtraAnnotations::default(),
        }
    }
}

/// Resolve a raw option bag into a `GenerationPolicy`.
///
/// Never fails: absent or malformed values fall back to their defaults.
/// Resolving the output of [`GenerationPolicy::to_options`] again yields the
/// same policy.
pub fn resolve(raw: &OptionBag) -> GenerationPolicy {
    let defaults = GenerationPolicy::default();

    let field_strategy = read_choice(raw, FIELD_GEN, FieldStrategy::parse)
        .unwrap_or(defaults.field_strategy);
    let json_lib = read_choice(raw, JSON_LIB, JsonLib::parse).unwrap_or(defaults.json_lib);

    GenerationPolicy {
        field_strategy,
        json_lib,
        api_name: read_optional_string(raw, API_NAME),
        path_prefix: read_optional_string(raw, PATH_PREFIX),
        api_suffix: read_string(raw, API_SUFFIX).unwrap_or(defaults.api_suffix),
        bean_param_suffix: read_string(raw, BEAN_PARAM_SUFFIX)
            .unwrap_or(defaults.bean_param_suffix),
        bean_param_count: read_count(raw, BEAN_PARAM_COUNT, defaults.bean_param_count),
        return_response: read_bool(raw, RETURN_RESPONSE, defaults.return_response),
        interface_only: read_bool(raw, INTERFACE_ONLY, defaults.interface_only),
        formatter: read_bool(raw, FORMATTER, defaults.formatter),
        use_bean_validation: read_bool(raw, USE_BEAN_VALIDATION, defaults.use_bean_validation),
        api_interface_doc: read_bool(raw, API_INTERFACE_DOC, defaults.api_interface_doc),
        api_package: read_string(raw, API_PACKAGE).unwrap_or(defaults.api_package),
        model_package: read_string(raw, MODEL_PACKAGE).unwrap_or(defaults.model_package),
        annotations: ExtraAnnotations::new(read_list(raw, ANNOTATIONS)),
        model_annotations: ExtraAnnotations::new(read_list(raw, MODEL_ANNOTATIONS)),
    }
}

impl GenerationPolicy {
    /// Materialize every resolved value, including the derived flags that
    /// templates and `inspect` read.
    pub fn to_options(&self) -> OptionBag {
        let mut out = OptionBag::new();
        if let Some(ref name) = self.api_name {
            out.insert(API_NAME.to_string(), OptionValue::Text(name.clone()));
        }
        if let Some(ref prefix) = self.path_prefix {
            out.insert(PATH_PREFIX.to_string(), OptionValue::Text(prefix.clone()));
        }
        out.insert(API_SUFFIX.to_string(), self.api_suffix.as_str().into());
        out.insert(
            BEAN_PARAM_SUFFIX.to_string(),
            self.bean_param_suffix.as_str().into(),
        );
        out.insert(
            BEAN_PARAM_COUNT.to_string(),
            OptionValue::Int(i64::try_from(self.bean_param_count).unwrap_or(i64::MAX)),
        );
        out.insert(FIELD_GEN.to_string(), self.field_strategy.as_str().into());
        out.insert(JSON_LIB.to_string(), self.json_lib.as_str().into());
        out.insert(RETURN_RESPONSE.to_string(), self.return_response.into());
        out.insert(INTERFACE_ONLY.to_string(), self.interface_only.into());
        out.insert(FORMATTER.to_string(), self.formatter.into());
        out.insert(
            USE_BEAN_VALIDATION.to_string(),
            self.use_bean_validation.into(),
        );
        out.insert(API_INTERFACE_DOC.to_string(), self.api_interface_doc.into());
        out.insert(API_PACKAGE.to_string(), self.api_package.as_str().into());
        out.insert(MODEL_PACKAGE.to_string(), self.model_package.as_str().into());
        out.insert(
            ANNOTATIONS.to_string(),
            OptionValue::List(self.annotations.entries.clone()),
        );
        out.insert(
            MODEL_ANNOTATIONS.to_string(),
            OptionValue::List(self.model_annotations.entries.clone()),
        );

        let strategy = self.field_strategy;
        out.insert(
            FIELD_PUBLIC.to_string(),
            (strategy == FieldStrategy::Public).into(),
        );
        out.insert(
            LOMBOK_DATA.to_string(),
            (strategy == FieldStrategy::Lombok).into(),
        );
        for key in [GENERATE_GETTER_SETTER, GENERATE_EQUALS, GENERATE_TO_STRING] {
            out.insert(key.to_string(), (strategy == FieldStrategy::GetSet).into());
        }
        out.insert(JSONB.to_string(), (self.json_lib == JsonLib::Jsonb).into());
        out.insert(
            JACKSON.to_string(),
            (self.json_lib == JsonLib::Jackson).into(),
        );
        out.insert(
            HAS_ANNOTATIONS.to_string(),
            self.annotations.has_entries.into(),
        );
        out.insert(
            HAS_MODEL_ANNOTATIONS.to_string(),
            self.model_annotations.has_entries.into(),
        );
        out
    }
}

fn read_choice<T>(raw: &OptionBag, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let value = raw.get(key)?;
    let parsed = match value {
        OptionValue::Text(s) => parse(s),
        _ => None,
    };
    if parsed.is_none() {
        warn!("ignoring unknown value for option `{key}`: {value:?}");
    }
    parsed
}

fn read_bool(raw: &OptionBag, key: &str, default: bool) -> bool {
    match raw.get(key) {
        None => default,
        Some(OptionValue::Bool(b)) => *b,
        Some(OptionValue::Text(s)) if s.trim().eq_ignore_ascii_case("true") => true,
        Some(OptionValue::Text(s)) if s.trim().eq_ignore_ascii_case("false") => false,
        Some(other) => {
            warn!("ignoring malformed boolean option `{key}`: {other:?}");
            default
        }
    }
}

fn read_count(raw: &OptionBag, key: &str, default: usize) -> usize {
    let parsed = match raw.get(key) {
        None => return default,
        Some(OptionValue::Int(n)) => usize::try_from(*n).ok(),
        Some(OptionValue::Text(s)) => s.trim().parse::<usize>().ok(),
        Some(_) => None,
    };
    parsed.unwrap_or_else(|| {
        warn!("ignoring malformed integer option `{key}`, using {default}");
        default
    })
}

fn read_string(raw: &OptionBag, key: &str) -> Option<String> {
    match raw.get(key)? {
        OptionValue::Text(s) => Some(s.clone()),
        OptionValue::Bool(b) => Some(b.to_string()),
        OptionValue::Int(n) => Some(n.to_string()),
        other => {
            warn!("ignoring non-scalar option `{key}`: {other:?}");
            None
        }
    }
}

fn read_optional_string(raw: &OptionBag, key: &str) -> Option<String> {
    read_string(raw, key).filter(|s| !s.trim().is_empty())
}

fn read_list(raw: &OptionBag, key: &str) -> Vec<String> {
    match raw.get(key) {
        None => Vec::new(),
        Some(OptionValue::List(items)) => items.clone(),
        Some(OptionValue::Text(s)) if s.trim().is_empty() => Vec::new(),
        Some(OptionValue::Text(s)) => vec![s.clone()],
        Some(other) => {
            warn!("ignoring malformed list option `{key}`: {other:?}");
            Vec::new()
        }
    }
}

/// Project configuration loaded from `.mprest.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MprestConfig {
    pub input: String,
    pub output: String,
    /// External formatter invocation, e.g. `["google-java-format", "-"]`.
    /// The built-in tidy formatter is used when unset.
    pub formatter_command: Option<Vec<String>>,
    pub options: OptionBag,
}

impl Default for MprestConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated-code/mp-rest-client".to_string(),
            formatter_command: None,
            options: OptionBag::new(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".mprest.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<MprestConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: MprestConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# mprest configuration
input: openapi.yaml
output: generated-code/mp-rest-client
# formatter_command: [google-java-format, "-"]

options:
  # apiName: Pets              # put every operation into one interface
  # pathPrefix: /api/v1        # stripped before grouping
  apiSuffix: Api
  beanParamSuffix: BeanParam
  beanParamCount: 4
  fieldGen: public             # public | lombok | get-set
  jsonLib: jsonb               # jsonb | jackson
  returnResponse: true
  interfaceOnly: true
  formatter: true
  useBeanValidation: true
  apiInterfaceDoc: true
  apiPackage: api
  modelPackage: model
  annotations: []
  modelAnnotations: []
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, OptionValue)]) -> OptionBag {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_bag_resolves_to_defaults() {
        let policy = resolve(&OptionBag::new());
        assert_eq!(policy, GenerationPolicy::default());
        assert_eq!(policy.api_suffix, "Api");
        assert_eq!(policy.bean_param_suffix, "BeanParam");
        assert_eq!(policy.bean_param_count, 4);
        assert_eq!(policy.field_strategy, FieldStrategy::Public);
        assert_eq!(policy.json_lib, JsonLib::Jsonb);
        assert!(policy.return_response);
        assert!(policy.interface_only);
        assert!(policy.formatter);
        assert!(policy.api_name.is_none());
        assert!(policy.path_prefix.is_none());
    }

    #[test]
    fn test_field_strategy_spellings() {
        assert_eq!(FieldStrategy::parse("lombok"), Some(FieldStrategy::Lombok));
        assert_eq!(FieldStrategy::parse("GET_SET"), Some(FieldStrategy::GetSet));
        assert_eq!(FieldStrategy::parse(" Get-Set "), Some(FieldStrategy::GetSet));
        assert_eq!(FieldStrategy::parse("PUBLIC"), Some(FieldStrategy::Public));
        assert_eq!(FieldStrategy::parse("records"), None);
        assert_eq!(JsonLib::parse("JACKSON"), Some(JsonLib::Jackson));
        assert_eq!(JsonLib::parse("gson"), None);
    }

    #[test]
    fn test_exclusive_flags_materialized() {
        for (input, active) in [
            ("public", FIELD_PUBLIC),
            ("lombok", LOMBOK_DATA),
            ("get-set", GENERATE_GETTER_SETTER),
            ("nonsense", FIELD_PUBLIC),
        ] {
            let policy = resolve(&bag(&[(FIELD_GEN, input.into())]));
            let options = policy.to_options();
            let family = [FIELD_PUBLIC, LOMBOK_DATA, GENERATE_GETTER_SETTER];
            let on: Vec<&str> = family
                .iter()
                .copied()
                .filter(|k| options[*k] == OptionValue::Bool(true))
                .collect();
            assert_eq!(on, vec![active], "fieldGen={input}");
        }

        let options = resolve(&bag(&[(JSON_LIB, "jackson".into())])).to_options();
        assert_eq!(options[JACKSON], OptionValue::Bool(true));
        assert_eq!(options[JSONB], OptionValue::Bool(false));
    }

    #[test]
    fn test_derived_keys_in_raw_bag_are_ignored() {
        let raw = bag(&[
            (LOMBOK_DATA, true.into()),
            (JACKSON, true.into()),
            (FIELD_GEN, "get-set".into()),
        ]);
        let policy = resolve(&raw);
        assert_eq!(policy.field_strategy, FieldStrategy::GetSet);
        assert_eq!(policy.json_lib, JsonLib::Jsonb);
        let options = policy.to_options();
        assert_eq!(options[LOMBOK_DATA], OptionValue::Bool(false));
        assert_eq!(options[GENERATE_EQUALS], OptionValue::Bool(true));
        assert_eq!(options[GENERATE_TO_STRING], OptionValue::Bool(true));
    }

    #[test]
    fn test_malformed_integer_falls_back() {
        for value in [
            OptionValue::Text("four".into()),
            OptionValue::Int(-3),
            OptionValue::Bool(true),
            OptionValue::Other(serde_json::json!(2.5)),
        ] {
            let policy = resolve(&bag(&[(BEAN_PARAM_COUNT, value)]));
            assert_eq!(policy.bean_param_count, 4);
        }
        let policy = resolve(&bag(&[(BEAN_PARAM_COUNT, " 7 ".into())]));
        assert_eq!(policy.bean_param_count, 7);
        let policy = resolve(&bag(&[(BEAN_PARAM_COUNT, OptionValue::Int(0))]));
        assert_eq!(policy.bean_param_count, 0);
    }

    #[test]
    fn test_boolean_parsing() {
        let policy = resolve(&bag(&[
            (FORMATTER, "FALSE".into()),
            (RETURN_RESPONSE, false.into()),
            (INTERFACE_ONLY, "maybe".into()),
        ]));
        assert!(!policy.formatter);
        assert!(!policy.return_response);
        assert!(policy.interface_only);
    }

    #[test]
    fn test_annotations_has_entries() {
        let policy = resolve(&bag(&[
            (
                ANNOTATIONS,
                OptionValue::List(vec!["@RegisterProvider(Foo.class)".into()]),
            ),
            (MODEL_ANNOTATIONS, "@RegisterForReflection".into()),
        ]));
        assert!(policy.annotations.has_entries);
        assert_eq!(policy.annotations.entries.len(), 1);
        assert!(policy.model_annotations.has_entries);
        assert_eq!(
            policy.model_annotations.entries,
            vec!["@RegisterForReflection".to_string()]
        );
        assert!(!resolve(&OptionBag::new()).annotations.has_entries);
    }

    #[test]
    fn test_blank_api_name_is_unset() {
        let policy = resolve(&bag(&[(API_NAME, "  ".into()), (PATH_PREFIX, "".into())]));
        assert!(policy.api_name.is_none());
        assert!(policy.path_prefix.is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let inputs = vec![
            OptionBag::new(),
            bag(&[
                (API_NAME, "Pets".into()),
                (PATH_PREFIX, "/api/v1".into()),
                (API_SUFFIX, OptionValue::Int(2)),
                (BEAN_PARAM_COUNT, "oops".into()),
                (FIELD_GEN, "lombok".into()),
                (JSON_LIB, "jackson".into()),
                (FORMATTER, "false".into()),
                (ANNOTATIONS, "@Foo".into()),
            ]),
            bag(&[
                (FIELD_GEN, OptionValue::Int(1)),
                (MODEL_ANNOTATIONS, OptionValue::Other(serde_json::json!({"a": 1}))),
            ]),
        ];
        for raw in inputs {
            let once = resolve(&raw);
            let twice = resolve(&once.to_options());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_option_bag_from_yaml() {
        let yaml = r#"
beanParamCount: 3
formatter: "false"
annotations:
  - "@RegisterProvider(LoggingFilter.class)"
weird: 1.5
"#;
        let raw: OptionBag = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(raw["beanParamCount"], OptionValue::Int(3));
        assert_eq!(raw["formatter"], OptionValue::Text("false".into()));
        assert!(matches!(raw["weird"], OptionValue::Other(_)));
        let policy = resolve(&raw);
        assert_eq!(policy.bean_param_count, 3);
        assert!(!policy.formatter);
        assert!(policy.annotations.has_entries);
    }

    #[test]
    fn test_default_config() {
        let config = MprestConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, "generated-code/mp-rest-client");
        assert!(config.formatter_command.is_none());
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
output: out
formatter_command: [google-java-format, "-"]
options:
  apiName: Pets
  fieldGen: get-set
"#;
        let config: MprestConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.output, "out");
        assert_eq!(
            config.formatter_command,
            Some(vec!["google-java-format".to_string(), "-".to_string()])
        );
        let policy = resolve(&config.options);
        assert_eq!(policy.api_name.as_deref(), Some("Pets"));
        assert_eq!(policy.field_strategy, FieldStrategy::GetSet);
    }

    #[test]
    fn test_default_config_content_parses() {
        let config: MprestConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(resolve(&config.options), GenerationPolicy::default());
    }
}
