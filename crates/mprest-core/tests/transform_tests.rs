use mprest_core::ir::{
    HttpMethod, IrParameterLocation, IrReturnType, IrSchema, IrSpec, IrType,
};
use mprest_core::{parse, transform};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

fn petstore() -> IrSpec {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    transform::transform(&spec).unwrap()
}

fn response_type(ret: &IrReturnType) -> &IrType {
    match ret {
        IrReturnType::Standard(r) => &r.response_type,
        IrReturnType::Void => panic!("expected a response body"),
    }
}

#[test]
fn operations_keep_document_order() {
    let ir = petstore();
    let ids: Vec<(&str, HttpMethod)> = ir
        .operations
        .iter()
        .map(|op| (op.operation_id.as_str(), op.method))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("findPets", HttpMethod::Get),
            ("addPet", HttpMethod::Post),
            ("findPetById", HttpMethod::Get),
            ("deletePet", HttpMethod::Delete),
            ("getInventory", HttpMethod::Get),
            ("getOrderById", HttpMethod::Get),
            ("ping", HttpMethod::Get),
        ]
    );
}

#[test]
fn parameters_are_resolved() {
    let ir = petstore();
    let find = &ir.operations[0];
    let names: Vec<&str> = find.parameters.iter().map(|p| p.original_name.as_str()).collect();
    assert_eq!(names, vec!["tags", "limit", "offset", "X-Request-Id"]);
    assert_eq!(find.parameters[0].param_type, IrType::Array(Box::new(IrType::String)));
    assert_eq!(find.parameters[1].param_type, IrType::Integer);
    assert_eq!(find.parameters[3].location, IrParameterLocation::Header);
    assert_eq!(find.parameters[3].name.camel_case, "xRequestId");

    // Path-level parameters are inherited and always required.
    let by_id = &ir.operations[2];
    assert_eq!(by_id.parameters.len(), 1);
    assert_eq!(by_id.parameters[0].location, IrParameterLocation::Path);
    assert!(by_id.parameters[0].required);
    assert_eq!(by_id.parameters[0].param_type, IrType::Long);
}

#[test]
fn request_and_response_types() {
    let ir = petstore();

    assert_eq!(
        response_type(&ir.operations[0].return_type),
        &IrType::Array(Box::new(IrType::Ref("Pet".into())))
    );

    let add = &ir.operations[1];
    let body = add.request_body.as_ref().expect("addPet has a body");
    assert!(body.required);
    assert_eq!(body.body_type, IrType::Ref("NewPet".into()));
    assert_eq!(response_type(&add.return_type), &IrType::Ref("Pet".into()));

    let delete = &ir.operations[3];
    assert!(delete.deprecated);
    assert_eq!(delete.return_type, IrReturnType::Void);

    assert_eq!(
        response_type(&ir.operations[4].return_type),
        &IrType::Map(Box::new(IrType::Integer))
    );

    match &ir.operations[5].return_type {
        IrReturnType::Standard(r) => assert_eq!(r.content_type, "application/json"),
        IrReturnType::Void => panic!("getOrderById returns an order"),
    }
    assert_eq!(ir.operations[6].return_type, IrReturnType::Void);
}

#[test]
fn schemas_are_classified() {
    let ir = petstore();
    let names: Vec<&str> = ir.schemas.iter().map(|s| s.name().pascal_case.as_str()).collect();
    assert_eq!(names, vec!["Pet", "NewPet", "PetStatus", "Order", "Error", "PetId"]);

    let IrSchema::Object(pet) = &ir.schemas[0] else {
        panic!("Pet should be an object");
    };
    let fields: Vec<(&str, bool)> = pet
        .fields
        .iter()
        .map(|f| (f.original_name.as_str(), f.required))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("name", true),
            ("tag", false),
            ("status", false),
            ("birthday", false),
            ("id", true),
        ]
    );

    let IrSchema::Enum(status) = &ir.schemas[2] else {
        panic!("PetStatus should be an enum");
    };
    assert_eq!(status.variants, vec!["available", "pending", "sold"]);

    let IrSchema::Object(order) = &ir.schemas[3] else {
        panic!("Order should be an object");
    };
    assert_eq!(order.fields[1].field_type, IrType::DateTime);
    assert_eq!(order.fields[3].field_type, IrType::Map(Box::new(IrType::Integer)));

    assert!(matches!(&ir.schemas[5], IrSchema::Alias(a) if a.target == IrType::Long));
}

#[test]
fn unresolved_parameter_ref_is_an_error() {
    let yaml = r##"
openapi: 3.0.0
info: { title: Broken, version: '1' }
paths:
  /pets:
    get:
      parameters:
        - $ref: '#/components/parameters/missing'
      responses:
        '200': { description: ok }
"##;
    let spec = parse::from_yaml(yaml).unwrap();
    let err = transform::transform(&spec).unwrap_err();
    assert!(err.to_string().contains("#/components/parameters/missing"), "{err}");
}

#[test]
fn missing_operation_id_is_derived_from_route() {
    let yaml = r#"
openapi: 3.0.0
info: { title: Anon, version: '1' }
paths:
  /users/{userId}:
    get:
      responses:
        '200': { description: ok }
"#;
    let ir = transform::transform(&parse::from_yaml(yaml).unwrap()).unwrap();
    assert_eq!(ir.operations[0].operation_id, "getUser");
}
