use mprest_core::error::ParseError;
use mprest_core::parse;
use mprest_core::parse::operation::ParameterOrRef;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

#[test]
fn parse_petstore_yaml() {
    let spec = parse::from_yaml(PETSTORE).expect("should parse petstore");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Swagger Petstore");
    assert_eq!(spec.paths.len(), 5);

    let paths: Vec<&str> = spec.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec!["/pets", "/pets/{id}", "/store/inventory", "/store/order/{orderId}", "/"]
    );

    let find = spec.paths["/pets"].get.as_ref().expect("GET /pets");
    assert_eq!(find.operation_id.as_deref(), Some("findPets"));
    assert_eq!(find.parameters.len(), 4);
    assert!(matches!(
        &find.parameters[1],
        ParameterOrRef::Ref { ref_path } if ref_path == "#/components/parameters/limitParam"
    ));

    let components = spec.components.as_ref().expect("should have components");
    assert_eq!(components.schemas.len(), 6);
    assert_eq!(components.parameters.len(), 1);
}

#[test]
fn parse_json_document() {
    let json = r#"{
        "openapi": "3.1.0",
        "info": { "title": "Mini", "version": "0.1.0" },
        "paths": { "/health": { "get": { "responses": { "200": { "description": "ok" } } } } }
    }"#;
    let spec = parse::from_json(json).expect("should parse json");
    assert_eq!(spec.info.title, "Mini");
    assert!(spec.components.is_none());
    assert!(spec.paths["/health"].get.is_some());
}

#[test]
fn reject_swagger_2() {
    let yaml = "openapi: 2.0.0\ninfo:\n  title: Old\n  version: '1'\npaths: {}\n";
    match parse::from_yaml(yaml) {
        Err(ParseError::UnsupportedVersion(v)) => assert_eq!(v, "2.0.0"),
        other => panic!("expected unsupported version, got {other:?}"),
    }
}

#[test]
fn reject_malformed_yaml() {
    assert!(matches!(
        parse::from_yaml("openapi: [3.0.0"),
        Err(ParseError::Yaml(_))
    ));
}
