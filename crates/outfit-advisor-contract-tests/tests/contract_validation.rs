//! Validates contract fixtures against frozen JSON schemas and the Rust
//! decoders.

use jsonschema::JSONSchema;
use outfit_advisor_advice_contract::{
    parse_advice_markdown, parse_advice_response, parse_analyze_response,
};
use outfit_advisor_auth::LoginResponse;
use serde_json::Value;

const CONTRACTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts");

fn read(relative: &str) -> String {
    std::fs::read_to_string(format!("{CONTRACTS}/{relative}"))
        .expect("contract file should be readable")
}

fn load_json(relative: &str) -> Value {
    serde_json::from_str(&read(relative)).expect("contract file should be valid json")
}

fn compile_validator(schema: &str) -> JSONSchema {
    let schema = load_json(schema);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn every_schema_compiles_with_absolute_id() {
    let mut schemas: Vec<String> = std::fs::read_dir(CONTRACTS)
        .expect("contracts dir should be readable")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".schema.json"))
        .collect();
    schemas.sort();
    assert_eq!(
        schemas,
        vec![
            "advice-response.schema.json",
            "analyze-response.schema.json",
            "login-response.schema.json",
        ]
    );

    for name in &schemas {
        let schema = load_json(name);
        let id = schema["$id"].as_str().expect("schema should declare $id");
        assert!(id.starts_with("https://"), "{name} needs an absolute $id, got {id}");
        assert!(
            JSONSchema::compile(&schema).is_ok(),
            "{name} should compile"
        );
    }
}

#[test]
fn analyze_fixture_matches_schema_and_decoder() {
    let validator = compile_validator("analyze-response.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/analyze-response.valid.json")));

    let parsed = parse_analyze_response(&read("fixtures/analyze-response.valid.json"))
        .expect("fixture should decode");
    assert!(parsed.success);
    assert_eq!(parsed.image_path.as_deref(), Some("uploads/3f2a9c.jpg"));
    assert!(!parsed.requires_login);
}

#[test]
fn login_required_fixture_matches_schema() {
    let validator = compile_validator("analyze-response.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/analyze-response.login-required.json")));

    let parsed = parse_analyze_response(&read("fixtures/analyze-response.login-required.json"))
        .expect("fixture should decode");
    assert!(!parsed.success);
    assert!(parsed.requires_login);
}

#[test]
fn successful_analysis_without_image_path_is_rejected() {
    let validator = compile_validator("analyze-response.schema.json");
    assert!(!validator.is_valid(&load_json("fixtures/analyze-response.invalid.json")));
}

#[test]
fn advice_fixture_matches_schema_and_parses() {
    let validator = compile_validator("advice-response.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/advice-response.valid.json")));

    let parsed = parse_advice_response(&read("fixtures/advice-response.valid.json"))
        .expect("fixture should decode");
    let report = parse_advice_markdown(parsed.advice.as_deref().expect("advice present"));
    assert_eq!(report.score, "88");
    assert_eq!(report.suggestions.len(), 2);
}

#[test]
fn login_fixture_matches_schema_and_decoder() {
    let validator = compile_validator("login-response.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/login-response.valid.json")));

    let parsed: LoginResponse = serde_json::from_str(&read("fixtures/login-response.valid.json"))
        .expect("fixture should decode");
    assert_eq!(parsed.token_type, "bearer");
    assert_eq!(parsed.expires_in, Some(604_800));
}
