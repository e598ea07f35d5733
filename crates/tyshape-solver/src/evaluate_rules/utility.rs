//! Standard utility types as generic aliases.
//!
//! Each utility is a fixed composition of mapped and conditional types:
//!
//! ```text
//! Partial<T>       = { [P in keyof T]?: T[P] }
//! Required<T>      = { [P in keyof T]-?: T[P] }
//! Readonly<T>      = { readonly [P in keyof T]: T[P] }
//! Pick<T, K>       = { [P in K]: T[P] }
//! Omit<T, K>       = { [P in Exclude<keyof T, K>]: T[P] }
//! Record<K, T>     = { [P in K]: T }
//! Exclude<T, U>    = T extends U ? never : T
//! Extract<T, U>    = T extends U ? T : never
//! NonNullable<T>   = T extends null | undefined ? never : T
//! ReturnType<T>    = T extends (...args: any) => infer R ? R : any
//! Parameters<T>    = T extends (...args: infer P) => any ? P : never
//! ```
//!
//! `register_utility_types` installs them in a `DefinitionStore` so
//! references like `Partial<User>` resolve; the free functions evaluate a
//! single application directly.

use crate::db::TypeDatabase;
use crate::def::{DefinitionInfo, DefinitionStore};
use crate::errors::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::options::SolverOptions;
use crate::types::*;

struct Params<'a> {
    db: &'a dyn TypeDatabase,
}

impl<'a> Params<'a> {
    fn info(&self, name: &str) -> TypeParamInfo {
        TypeParamInfo::new(self.db.intern_string(name))
    }

    fn ty(&self, name: &str) -> TypeId {
        self.db.type_param(self.info(name))
    }

    /// `{ [P in constraint]: template }` with the given modifiers.
    fn mapped(
        &self,
        constraint: TypeId,
        template: TypeId,
        optional_modifier: MappedModifier,
        readonly_modifier: MappedModifier,
    ) -> TypeId {
        self.db.mapped(MappedType {
            type_param: self.info("P"),
            constraint,
            template,
            optional_modifier,
            readonly_modifier,
        })
    }

    /// `{ [P in keyof T]: T[P] }` with the given modifiers.
    fn homomorphic(&self, optional: MappedModifier, readonly: MappedModifier) -> TypeId {
        let t = self.ty("T");
        let keys = self.db.keyof(t);
        let template = self.db.index_access(t, self.ty("P"));
        self.mapped(keys, template, optional, readonly)
    }

    fn conditional(&self, check: TypeId, extends: TypeId, true_type: TypeId, false_type: TypeId) -> TypeId {
        self.db.conditional(ConditionalType {
            check_type: check,
            extends_type: extends,
            true_type,
            false_type,
        })
    }

    fn alias(&self, name: &str, params: &[&str], body: TypeId) -> DefinitionInfo {
        let type_params = params.iter().map(|p| self.info(p)).collect();
        DefinitionInfo::type_alias(self.db.intern_string(name), type_params, body)
    }
}

/// Definitions of every utility type.
pub fn utility_definitions(db: &dyn TypeDatabase) -> Vec<DefinitionInfo> {
    use MappedModifier::{Add, Preserve, Remove};

    let p = Params { db };
    let t = p.ty("T");
    let u = p.ty("U");
    let k = p.ty("K");
    let args = Some(db.intern_string("args"));

    let pick_body = p.mapped(k, db.index_access(t, p.ty("P")), Preserve, Preserve);
    let exclude_keys = db.reference(db.intern_string("Exclude"), vec![db.keyof(t), k]);
    let omit_body = p.mapped(exclude_keys, db.index_access(t, p.ty("P")), Preserve, Preserve);

    let any_function = db.function(FunctionShape::new(vec![ParamInfo::rest(args, TypeId::ANY)], TypeId::ANY));
    let return_pattern = db.function(FunctionShape::new(
        vec![ParamInfo::rest(args, TypeId::ANY)],
        db.infer(p.info("R")),
    ));
    let params_pattern = db.function(FunctionShape::new(
        vec![ParamInfo::rest(args, db.infer(p.info("P")))],
        TypeId::ANY,
    ));
    let nullish = db.union2(TypeId::NULL, TypeId::UNDEFINED);
    let property_key = db.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);

    let mut pick = p.alias("Pick", &["T", "K"], pick_body);
    pick.type_params[1] = p.info("K").with_constraint(db.keyof(t));
    let mut record = p.alias("Record", &["K", "T"], p.mapped(k, t, Preserve, Preserve));
    record.type_params[0] = p.info("K").with_constraint(property_key);
    let mut return_type = p.alias(
        "ReturnType",
        &["T"],
        p.conditional(t, return_pattern, p.ty("R"), TypeId::ANY),
    );
    return_type.type_params[0] = p.info("T").with_constraint(any_function);
    let mut parameters = p.alias(
        "Parameters",
        &["T"],
        p.conditional(t, params_pattern, p.ty("P"), TypeId::NEVER),
    );
    parameters.type_params[0] = p.info("T").with_constraint(any_function);

    vec![
        p.alias("Partial", &["T"], p.homomorphic(Add, Preserve)),
        p.alias("Required", &["T"], p.homomorphic(Remove, Preserve)),
        p.alias("Readonly", &["T"], p.homomorphic(Preserve, Add)),
        pick,
        p.alias("Omit", &["T", "K"], omit_body),
        record,
        p.alias("Exclude", &["T", "U"], p.conditional(t, u, TypeId::NEVER, t)),
        p.alias("Extract", &["T", "U"], p.conditional(t, u, t, TypeId::NEVER)),
        p.alias("NonNullable", &["T"], p.conditional(t, nullish, TypeId::NEVER, t)),
        return_type,
        parameters,
    ]
}

/// Register every utility type in `store`.
pub fn register_utility_types(db: &dyn TypeDatabase, store: &DefinitionStore) {
    for definition in utility_definitions(db) {
        store.register(definition);
    }
}

/// Evaluate `name<args>` against a store holding only the utility types.
pub fn evaluate_utility(
    db: &dyn TypeDatabase,
    name: &str,
    args: Vec<TypeId>,
    options: SolverOptions,
) -> SolverResult<TypeId> {
    let store = DefinitionStore::new();
    register_utility_types(db, &store);
    let reference = db.reference(db.intern_string(name), args);
    TypeEvaluator::with_resolver(db, &store)
        .with_options(options)
        .evaluate(reference)
}

fn apply(db: &dyn TypeDatabase, name: &str, args: Vec<TypeId>) -> SolverResult<TypeId> {
    evaluate_utility(db, name, args, SolverOptions::default())
}

pub fn partial(db: &dyn TypeDatabase, type_id: TypeId) -> SolverResult<TypeId> {
    apply(db, "Partial", vec![type_id])
}

pub fn required(db: &dyn TypeDatabase, type_id: TypeId) -> SolverResult<TypeId> {
    apply(db, "Required", vec![type_id])
}

pub fn readonly(db: &dyn TypeDatabase, type_id: TypeId) -> SolverResult<TypeId> {
    apply(db, "Readonly", vec![type_id])
}

pub fn pick(db: &dyn TypeDatabase, type_id: TypeId, keys: TypeId) -> SolverResult<TypeId> {
    apply(db, "Pick", vec![type_id, keys])
}

pub fn omit(db: &dyn TypeDatabase, type_id: TypeId, keys: TypeId) -> SolverResult<TypeId> {
    apply(db, "Omit", vec![type_id, keys])
}

pub fn record(db: &dyn TypeDatabase, keys: TypeId, value: TypeId) -> SolverResult<TypeId> {
    apply(db, "Record", vec![keys, value])
}

pub fn exclude(db: &dyn TypeDatabase, type_id: TypeId, excluded: TypeId) -> SolverResult<TypeId> {
    apply(db, "Exclude", vec![type_id, excluded])
}

pub fn extract(db: &dyn TypeDatabase, type_id: TypeId, extracted: TypeId) -> SolverResult<TypeId> {
    apply(db, "Extract", vec![type_id, extracted])
}

pub fn non_nullable(db: &dyn TypeDatabase, type_id: TypeId) -> SolverResult<TypeId> {
    apply(db, "NonNullable", vec![type_id])
}

pub fn return_type(db: &dyn TypeDatabase, function: TypeId) -> SolverResult<TypeId> {
    apply(db, "ReturnType", vec![function])
}

pub fn parameters(db: &dyn TypeDatabase, function: TypeId) -> SolverResult<TypeId> {
    apply(db, "Parameters", vec![function])
}

#[cfg(test)]
#[path = "../../tests/utility_tests.rs"]
mod tests;
