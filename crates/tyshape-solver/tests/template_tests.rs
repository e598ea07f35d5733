use super::*;
use crate::intern::TypeInterner;
use crate::options::SolverOptions;
use crate::types::TypeParamInfo;

fn text(interner: &TypeInterner, value: &str) -> TemplateSpan {
    TemplateSpan::Text(interner.intern_string(value))
}

fn literals(interner: &TypeInterner, values: &[&str]) -> TypeId {
    interner.union(values.iter().map(|v| interner.literal_string(v)).collect())
}

#[test]
fn test_cartesian_expansion_order() {
    let interner = TypeInterner::new();
    let theme = literals(&interner, &["light", "dark"]);
    let color = literals(&interner, &["red", "green", "blue"]);
    let spans = vec![
        TemplateSpan::Type(theme),
        text(&interner, "-"),
        TemplateSpan::Type(color),
    ];

    let result = expand_template_literal(&interner, &spans, &TypeSubstitution::new())
        .expect("expand");
    let Some(TypeData::Union(list_id)) = interner.lookup(result) else {
        panic!("expected a union, got {:?}", interner.lookup(result));
    };

    let expected: Vec<TypeId> = [
        "light-red",
        "light-green",
        "light-blue",
        "dark-red",
        "dark-green",
        "dark-blue",
    ]
    .iter()
    .map(|s| interner.literal_string(s))
    .collect();
    assert_eq!(&*interner.type_list(list_id), expected.as_slice());
}

#[test]
fn test_number_and_boolean_placeholders() {
    let interner = TypeInterner::new();
    let sizes = interner.union2(interner.literal_number(1.0), interner.literal_number(2.5));
    let spans = vec![TemplateSpan::Type(sizes), text(&interner, "px")];

    assert_eq!(
        expand_template_literal(&interner, &spans, &TypeSubstitution::new()),
        Ok(literals(&interner, &["1px", "2.5px"]))
    );

    let flag = vec![text(&interner, "is-"), TemplateSpan::Type(TypeId::BOOLEAN_TRUE)];
    assert_eq!(
        expand_template_literal(&interner, &flag, &TypeSubstitution::new()),
        Ok(interner.literal_string("is-true"))
    );
}

#[test]
fn test_bound_parameter_expands() {
    let interner = TypeInterner::new();
    let t_name = interner.intern_string("T");
    let t = interner.type_param(TypeParamInfo::new(t_name));
    let spans = vec![text(&interner, "on"), TemplateSpan::Type(t)];

    let mut env = TypeSubstitution::new();
    env.insert(t_name, literals(&interner, &["Click", "Hover"]));
    assert_eq!(
        expand_template_literal(&interner, &spans, &env),
        Ok(literals(&interner, &["onClick", "onHover"]))
    );
}

#[test]
fn test_non_literal_placeholder_stays_pattern() {
    let interner = TypeInterner::new();
    let spans = vec![text(&interner, "id-"), TemplateSpan::Type(TypeId::STRING)];

    assert_eq!(
        expand_template_literal(&interner, &spans, &TypeSubstitution::new()),
        Ok(interner.template_literal(spans.clone()))
    );

    let t = interner.type_param(TypeParamInfo::new(interner.intern_string("T")));
    let generic = vec![text(&interner, "id-"), TemplateSpan::Type(t)];
    assert_eq!(
        expand_template_literal(&interner, &generic, &TypeSubstitution::new()),
        Ok(interner.template_literal(generic.clone()))
    );
}

#[test]
fn test_never_placeholder_is_never() {
    let interner = TypeInterner::new();
    let spans = vec![
        text(&interner, "a"),
        TemplateSpan::Type(literals(&interner, &["x", "y"])),
        TemplateSpan::Type(TypeId::NEVER),
    ];

    assert_eq!(
        expand_template_literal(&interner, &spans, &TypeSubstitution::new()),
        Ok(TypeId::NEVER)
    );
}

#[test]
fn test_expansion_over_limit() {
    let interner = TypeInterner::new();
    let theme = literals(&interner, &["light", "dark"]);
    let color = literals(&interner, &["red", "green", "blue"]);
    let template = interner.template_literal(vec![
        TemplateSpan::Type(theme),
        text(&interner, "-"),
        TemplateSpan::Type(color),
    ]);

    let mut evaluator = TypeEvaluator::new(&interner)
        .with_options(SolverOptions::default().with_template_expansion_limit(5));
    assert_eq!(
        evaluator.evaluate(template),
        Err(SolverError::RecursionLimitExceeded {
            profile: RecursionProfile::TemplateExpansion,
            limit: 5,
        })
    );

    let mut evaluator = TypeEvaluator::new(&interner)
        .with_options(SolverOptions::default().with_template_expansion_limit(6));
    assert!(evaluator.evaluate(template).is_ok());
}

#[test]
fn test_boolean_placeholder_expands() {
    let interner = TypeInterner::new();
    let spans = vec![text(&interner, "is-"), TemplateSpan::Type(TypeId::BOOLEAN)];

    assert_eq!(
        expand_template_literal(&interner, &spans, &TypeSubstitution::new()),
        Ok(literals(&interner, &["is-false", "is-true"]))
    );
}

#[test]
fn test_member_order_follows_interning_history() {
    let interner = TypeInterner::new();
    // Interned by an earlier, unrelated query.
    let dark_blue = interner.literal_string("dark-blue");

    let theme = literals(&interner, &["light", "dark"]);
    let color = literals(&interner, &["red", "blue"]);
    let spans = vec![
        TemplateSpan::Type(theme),
        text(&interner, "-"),
        TemplateSpan::Type(color),
    ];
    let result = expand_template_literal(&interner, &spans, &TypeSubstitution::new())
        .expect("expand");

    // Same union as on a fresh interner.
    assert_eq!(
        result,
        literals(&interner, &["light-red", "light-blue", "dark-red", "dark-blue"])
    );
    let Some(TypeData::Union(list_id)) = interner.lookup(result) else {
        panic!("expected a union, got {:?}", interner.lookup(result));
    };
    let members = interner.type_list(list_id);
    assert_eq!(members.first(), Some(&dark_blue));
    assert_eq!(members.len(), 4);
}
