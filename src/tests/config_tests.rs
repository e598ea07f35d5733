use crate::config::{load_options, parse_options};
use crate::{
    FunctionShape, LiteralWidening, SolverOptions, TypeId, TypeInterner, evaluate_utility, limits,
};
use std::io::Write;

#[test]
fn test_empty_object_keeps_defaults() {
    let options = parse_options("{}").expect("should parse");
    assert_eq!(options, SolverOptions::default());
    assert_eq!(options.max_subtype_depth, limits::MAX_SUBTYPE_DEPTH);
    assert_eq!(options.literal_widening, LiteralWidening::Preserve);
}

#[test]
fn test_partial_override() {
    let options = parse_options(
        r#"{ "maxSubtypeDepth": 12, "literalWidening": "widen", "templateExpansionLimit": 64 }"#,
    )
    .expect("should parse");

    assert_eq!(options.max_subtype_depth, 12);
    assert_eq!(options.template_expansion_limit, 64);
    assert_eq!(options.literal_widening, LiteralWidening::Widen);
    assert_eq!(options.max_evaluation_depth, limits::MAX_EVALUATION_DEPTH);
}

#[test]
fn test_rejects_bad_input() {
    let err = parse_options(r#"{ "literalWidening": "sometimes" }"#).unwrap_err();
    assert!(err.to_string().contains("failed to parse solver options JSON"));

    let err = parse_options(r#"{ "maxEvaluationDepth": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("maxEvaluationDepth"));

    assert!(parse_options("not json").is_err());
}

#[test]
fn test_load_options_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, r#"{{ "literalWidening": "widen" }}"#).expect("write options");

    let options = load_options(file.path()).expect("should load");
    assert_eq!(options.literal_widening, LiteralWidening::Widen);

    // Loaded options flow straight into solver calls.
    let interner = TypeInterner::new();
    let function = interner.function(FunctionShape::new(vec![], interner.literal_string("test")));
    let result = evaluate_utility(&interner, "ReturnType", vec![function], options)
        .expect("ReturnType");
    assert_eq!(result, TypeId::STRING);
}

#[test]
fn test_load_options_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("solver.json");

    let err = load_options(&path).unwrap_err();
    assert!(err.to_string().contains("failed to read solver options"));
}
