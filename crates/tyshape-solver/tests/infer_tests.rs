use super::*;
use crate::intern::TypeInterner;
use crate::subtype::is_subtype_of;

// =============================================================================
// Variables and unification
// =============================================================================

#[test]
fn test_fresh_vars_are_unbound() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let a = ctx.fresh_var();
    let b = ctx.fresh_var();
    assert_ne!(a, b);
    assert_eq!(ctx.probe(a), None);
    assert!(!ctx.has_candidates(a));
}

#[test]
fn test_find_type_param() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let t = interner.intern_string("T");
    let u = interner.intern_string("U");
    let var_t = ctx.fresh_type_param(t);
    assert_eq!(ctx.find_type_param(t), Some(var_t));
    assert_eq!(ctx.find_type_param(u), None);
}

#[test]
fn test_unify_var_type_conflict() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let var = ctx.fresh_var();
    ctx.unify_var_type(var, TypeId::STRING).expect("first binding");
    ctx.unify_var_type(var, TypeId::STRING).expect("same binding");
    assert_eq!(
        ctx.unify_var_type(var, TypeId::NUMBER),
        Err(InferenceError::Conflict(TypeId::STRING, TypeId::NUMBER))
    );
    assert_eq!(ctx.probe(var), Some(TypeId::STRING));
}

#[test]
fn test_unify_vars_shares_binding_and_bounds() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let a = ctx.fresh_var();
    let b = ctx.fresh_var();
    ctx.add_lower_bound(a, TypeId::STRING);
    ctx.add_lower_bound(b, TypeId::NUMBER);
    ctx.unify_vars(a, b).expect("unify");

    let constraints = ctx.get_constraints(a).expect("merged bounds");
    assert_eq!(constraints.lower_bounds, vec![TypeId::STRING, TypeId::NUMBER]);

    ctx.unify_var_type(b, TypeId::BOOLEAN).expect("bind");
    assert_eq!(ctx.probe(a), Some(TypeId::BOOLEAN));
}

#[test]
fn test_unify_bound_vars_conflict() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let a = ctx.fresh_var();
    let b = ctx.fresh_var();
    ctx.unify_var_type(a, TypeId::STRING).expect("bind a");
    ctx.unify_var_type(b, TypeId::NUMBER).expect("bind b");
    assert!(matches!(
        ctx.unify_vars(a, b),
        Err(InferenceError::Conflict(_, _))
    ));
}

// =============================================================================
// Resolution from bounds
// =============================================================================

#[test]
fn test_resolve_from_lower_bounds() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let var = ctx.fresh_type_param(interner.intern_string("T"));
    ctx.add_lower_bound(var, TypeId::STRING);
    ctx.add_lower_bound(var, TypeId::NUMBER);

    let resolved = ctx
        .resolve_with_constraints_by(var, |s, t| is_subtype_of(&interner, s, t))
        .expect("resolve");
    assert_eq!(resolved, interner.union2(TypeId::STRING, TypeId::NUMBER));
    // Resolution fixes the variable.
    assert_eq!(ctx.probe(var), Some(resolved));
}

#[test]
fn test_resolve_preserves_or_widens_literals() {
    let interner = TypeInterner::new();
    let hello = interner.literal_string("hello");

    let mut preserve = InferenceContext::new(&interner);
    let var = preserve.fresh_var();
    preserve.add_lower_bound(var, hello);
    assert_eq!(
        preserve.resolve_with_constraints_by(var, |s, t| is_subtype_of(&interner, s, t)),
        Ok(hello)
    );

    let mut widen = InferenceContext::new(&interner).with_widening(LiteralWidening::Widen);
    let var = widen.fresh_var();
    widen.add_lower_bound(var, hello);
    assert_eq!(
        widen.resolve_with_constraints_by(var, |s, t| is_subtype_of(&interner, s, t)),
        Ok(TypeId::STRING)
    );
}

#[test]
fn test_resolve_from_upper_bounds_only() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let var = ctx.fresh_var();
    ctx.add_upper_bound(var, TypeId::STRING);
    assert_eq!(
        ctx.resolve_with_constraints_by(var, |s, t| is_subtype_of(&interner, s, t)),
        Ok(TypeId::STRING)
    );
}

#[test]
fn test_resolve_bounds_violation() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let var = ctx.fresh_type_param(interner.intern_string("T"));
    ctx.add_lower_bound(var, TypeId::NUMBER);
    ctx.add_upper_bound(var, TypeId::STRING);

    let err = ctx
        .resolve_with_constraints_by(var, |s, t| is_subtype_of(&interner, s, t))
        .unwrap_err();
    assert_eq!(
        err,
        InferenceError::BoundsViolation {
            name: "T".to_string(),
            lower: TypeId::NUMBER,
            upper: TypeId::STRING,
        }
    );
    assert!(matches!(
        SolverError::from(err),
        SolverError::ConstraintViolation { .. }
    ));
}

#[test]
fn test_resolve_without_candidates() {
    let interner = TypeInterner::new();
    let mut ctx = InferenceContext::new(&interner);

    let var = ctx.fresh_type_param(interner.intern_string("U"));
    let err = ctx
        .resolve_with_constraints_by(var, |s, t| is_subtype_of(&interner, s, t))
        .unwrap_err();
    assert_eq!(err, InferenceError::Unresolved { name: "U".to_string() });
    assert_eq!(
        SolverError::from(err),
        SolverError::UnresolvedInference { name: "U".to_string() }
    );
}

#[test]
fn test_best_common_type() {
    let interner = TypeInterner::new();
    let ctx = InferenceContext::new(&interner);

    assert_eq!(ctx.best_common_type(&[]), TypeId::UNKNOWN);
    assert_eq!(ctx.best_common_type(&[TypeId::STRING]), TypeId::STRING);
    assert_eq!(
        ctx.best_common_type(&[TypeId::STRING, TypeId::NEVER, TypeId::NUMBER]),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );
    assert_eq!(
        ctx.best_common_type(&[TypeId::NEVER, TypeId::NEVER]),
        TypeId::NEVER
    );
}
