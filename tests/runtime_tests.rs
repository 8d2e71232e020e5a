//! Calling endpoint methods through the service.

use endpointgen::access::Principal;
use endpointgen::parser::ParseResult;
use endpointgen::runtime::{
    EndpointException, EndpointImplementation, EndpointRegistry, EndpointResponse,
    EndpointService, MethodHandler, RegistryError,
};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

mod common;
use common::fixtures::ClassPath;

const GREETER: &str = r#"
- name: com.example.GreetingEndpoint
  annotations: [{ name: Endpoint, values: { value: Greeter } }, AnonymousAllowed]
  methods:
    - name: greet
      parameters: [{ name: name, type: String }]
      result: String
    - name: add
      parameters: [{ name: a, type: int }, { name: b, type: int }]
      result: int
    - name: admin
      annotations: [{ name: RolesAllowed, values: { value: [admin] } }]
      result: String
    - name: count
      parameters:
        - name: value
          type: int
          annotations: [{ name: Min, values: { value: 1 } }]
      annotations: [Nonnull]
      result: Integer
    - { name: fail, result: String }
    - { name: crash, result: String }
    - name: lookup
      parameters: [{ name: person, type: com.example.Person }]
      result: com.example.Person
- name: com.example.Person
  fields:
    - { name: name, type: String, annotations: [Nonnull] }
    - name: age
      type: int
      annotations: [{ name: Min, values: { value: 0 } }]
"#;

#[derive(Debug, Serialize, Deserialize)]
struct Person {
    name: String,
    age: i32,
}

fn greeter() -> EndpointImplementation {
    EndpointImplementation::new("Greeter")
        .method(
            "greet",
            MethodHandler::typed(|_, (name,): (String,)| Ok(format!("Hello, {name}"))),
        )
        .method(
            "add",
            MethodHandler::typed(|_, (a, b): (i32, i32)| Ok(a + b)),
        )
        .method(
            "admin",
            MethodHandler::typed(|ctx, (): ()| {
                Ok(format!(
                    "welcome {}",
                    ctx.principal.as_ref().map(|p| p.name.as_str()).unwrap_or("?")
                ))
            }),
        )
        .method("count", MethodHandler::new(|_, _| Ok(Value::Null)))
        .method(
            "fail",
            MethodHandler::new(|_, _| Err(EndpointException::new("no greeting today").into())),
        )
        .method(
            "crash",
            MethodHandler::new(|_, _| panic!("boom")),
        )
        .method(
            "lookup",
            MethodHandler::typed(|_, (person,): (Person,)| Ok(person)),
        )
}

fn parsed() -> ParseResult {
    ClassPath::with_yaml(GREETER).parse()
}

fn service() -> EndpointService {
    let registry = EndpointRegistry::build(&parsed(), [greeter()]).unwrap();
    EndpointService::new("connect", registry)
}

fn call(service: &EndpointService, path: &str, body: Value) -> EndpointResponse {
    call_as(service, path, body, None)
}

fn call_as(
    service: &EndpointService,
    path: &str,
    body: Value,
    principal: Option<&Principal>,
) -> EndpointResponse {
    let body = serde_json::to_vec(&body).unwrap();
    service.handle(&Method::POST, path, &body, principal)
}

#[test]
fn test_successful_call() {
    let service = service();
    let response = call(&service, "/connect/Greeter/greet", json!({"name": "Ann"}));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("Hello, Ann"));
    assert_eq!(response.get_header("content-type"), Some("application/json"));
}

#[test]
fn test_names_are_case_insensitive() {
    let service = service();
    let response = call(&service, "/connect/greeter/GREET", json!({"name": "Bo"}));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("Hello, Bo"));
}

#[test]
fn test_arguments_bind_by_name_then_by_order() {
    let service = service();
    let by_name = call(&service, "/connect/Greeter/add", json!({"b": 2, "a": 40}));
    assert_eq!(by_name.body, json!(42));

    let by_order = call(&service, "/connect/Greeter/add", json!({"x": 1, "y": 2}));
    assert_eq!(by_order.status, 200);
    assert_eq!(by_order.body, json!(3));
}

#[test]
fn test_wrong_argument_count_is_rejected() {
    let service = service();
    let response = call(
        &service,
        "/connect/Greeter/add",
        json!({"a": 1, "b": 2, "c": 3}),
    );
    assert_eq!(response.status, 400);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("Incorrect number of parameters"));
}

#[test]
fn test_unknown_routes() {
    let service = service();
    assert_eq!(call(&service, "/connect/Nope/greet", json!({})).status, 404);
    assert_eq!(call(&service, "/connect/Greeter/nothing", json!({})).status, 404);
    assert_eq!(call(&service, "/elsewhere/Greeter/greet", json!({})).status, 404);
    assert_eq!(call(&service, "/connect/Greeter", json!({})).status, 404);
}

#[test]
fn test_only_post_is_allowed() {
    let service = service();
    let response = service.handle(&Method::GET, "/connect/Greeter/greet", b"", None);
    assert_eq!(response.status, 405);
    assert_eq!(response.get_header("allow"), Some("POST"));
}

#[test]
fn test_malformed_body_is_rejected() {
    let service = service();
    let response = service.handle(&Method::POST, "/connect/Greeter/greet", b"{oops", None);
    assert_eq!(response.status, 400);

    let response = call(&service, "/connect/Greeter/greet", json!([1, 2]));
    assert_eq!(response.status, 400);
}

#[test]
fn test_role_restricted_method() {
    let service = service();

    let anonymous = call(&service, "/connect/Greeter/admin", Value::Null);
    assert_eq!(anonymous.status, 401);

    let bob = Principal::new("bob");
    let forbidden = call_as(&service, "/connect/Greeter/admin", Value::Null, Some(&bob));
    assert_eq!(forbidden.status, 403);

    let alice = Principal::new("alice").with_role("admin");
    let allowed = call_as(&service, "/connect/Greeter/admin", Value::Null, Some(&alice));
    assert_eq!(allowed.status, 200);
    assert_eq!(allowed.body, json!("welcome alice"));
}

#[test]
fn test_constraint_violations_name_the_parameter() {
    let service = service();
    let response = call(&service, "/connect/Greeter/count", json!({"value": 0}));
    assert_eq!(response.status, 400);
    assert_eq!(response.body["type"], "ValidationException");
    let data = response.body["validationErrorData"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["parameterName"], "value");
}

#[test]
fn test_entity_arguments_are_validated_against_components() {
    let service = service();

    let ok = call(
        &service,
        "/connect/Greeter/lookup",
        json!({"person": {"name": "Ann", "age": 30}}),
    );
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body, json!({"name": "Ann", "age": 30}));

    let negative = call(
        &service,
        "/connect/Greeter/lookup",
        json!({"person": {"name": "Ann", "age": -1}}),
    );
    assert_eq!(negative.status, 400);
    assert_eq!(negative.body["validationErrorData"][0]["parameterName"], "person");

    let missing_name = call(
        &service,
        "/connect/Greeter/lookup",
        json!({"person": {"age": 3}}),
    );
    assert_eq!(missing_name.status, 400);
}

#[test]
fn test_null_from_non_null_method_is_an_internal_error() {
    let service = service();
    let response = call(&service, "/connect/Greeter/count", json!({"value": 3}));
    assert_eq!(response.status, 500);
    assert_eq!(
        response.body,
        json!({"type": "InternalError", "message": "Internal server error"})
    );
}

#[test]
fn test_endpoint_exception_reaches_the_caller() {
    let service = service();
    let response = call(&service, "/connect/Greeter/fail", Value::Null);
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!({"type": "EndpointException", "message": "no greeting today"})
    );
}

#[test]
fn test_handler_panic_is_contained() {
    let service = service();
    let response = call(&service, "/connect/Greeter/crash", Value::Null);
    assert_eq!(response.status, 500);
    assert_eq!(response.body["message"], "Internal server error");
    assert!(response.get_header("x-invocation-id").is_some());

    // the service keeps working afterwards
    let response = call(&service, "/connect/Greeter/greet", json!({"name": "Ann"}));
    assert_eq!(response.status, 200);
}

#[test]
fn test_registry_rejects_unknown_handlers() {
    let result = parsed();

    let err = EndpointRegistry::build(&result, [EndpointImplementation::new("Nobody")])
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownEndpoint(_)), "{err}");

    let err = EndpointRegistry::build(
        &result,
        [EndpointImplementation::new("Greeter")
            .method("missing", MethodHandler::new(|_, _| Ok(Value::Null)))],
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownMethod { .. }), "{err}");

    let err = EndpointRegistry::build(
        &result,
        [
            EndpointImplementation::new("Greeter"),
            EndpointImplementation::new("greeter"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateImplementation(_)), "{err}");
}

#[test]
fn test_reload_swaps_the_registry() {
    let service = service();
    assert_eq!(
        call(&service, "/connect/Greeter/greet", json!({"name": "Ann"})).body,
        json!("Hello, Ann")
    );

    let replacement = EndpointImplementation::new("Greeter").method(
        "greet",
        MethodHandler::typed(|_, (name,): (String,)| Ok(format!("Hi, {name}"))),
    );
    service.reload(EndpointRegistry::build(&parsed(), [replacement]).unwrap());

    assert_eq!(
        call(&service, "/connect/Greeter/greet", json!({"name": "Ann"})).body,
        json!("Hi, Ann")
    );
    // methods left out of the new registry are gone
    assert_eq!(
        call(&service, "/connect/Greeter/add", json!({"a": 1, "b": 2})).status,
        404
    );
}

#[test]
fn test_empty_prefix_serves_from_the_root() {
    for prefix in ["", "/"] {
        let registry = EndpointRegistry::build(&parsed(), [greeter()]).unwrap();
        let service = EndpointService::new(prefix, registry);
        let response = call(&service, "/Greeter/greet", json!({"name": "Ann"}));
        assert_eq!(response.status, 200, "prefix {prefix:?}");
        assert_eq!(response.body, json!("Hello, Ann"));
        assert_eq!(call(&service, "/connect/Greeter/greet", json!({})).status, 404);
    }
}

#[test]
fn test_prefix_must_end_at_a_segment_boundary() {
    let service = service();
    let response = call(&service, "/connectx/Greeter/greet", json!({"name": "Ann"}));
    assert_eq!(response.status, 404);
}

#[test]
fn test_methods_differing_only_in_case_are_rejected() {
    let class_path = ClassPath::with_yaml(
        r#"
- name: com.example.Store
  annotations: [Endpoint, AnonymousAllowed]
  methods:
    - { name: get, result: String }
    - { name: Get, result: String }
"#,
    );
    let result = class_path.parse();
    let err = EndpointRegistry::build(
        &result,
        [EndpointImplementation::new("Store")
            .method("get", MethodHandler::new(|_, _| Ok(json!("lower"))))],
    )
    .unwrap_err();
    match err {
        RegistryError::DuplicateMethod {
            endpoint,
            first,
            second,
        } => {
            assert_eq!(endpoint, "Store");
            let mut names = [first, second];
            names.sort();
            assert_eq!(names, ["Get".to_string(), "get".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
