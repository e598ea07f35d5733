//! Structured failure reasons for assignability checks.
//!
//! The solver does not render diagnostic text. A failed check is explained
//! as a `SubtypeFailureReason` tree; `property_path` flattens the tree into
//! the property path carried by `SolverError::StructuralMismatch`.

use crate::db::TypeDatabase;
use crate::types::{TypeId, Visibility};
use tyshape_common::interner::Atom;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    /// A required property is missing in the source type.
    MissingProperty {
        property_name: Atom,
        source_type: TypeId,
        target_type: TypeId,
    },
    /// Property types are incompatible.
    PropertyTypeMismatch {
        property_name: Atom,
        source_property_type: TypeId,
        target_property_type: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// Optional property cannot satisfy required property.
    OptionalPropertyRequired { property_name: Atom },
    /// Non-public members with different visibility or declaring class.
    PropertyVisibilityMismatch {
        property_name: Atom,
        source_visibility: Visibility,
        target_visibility: Visibility,
    },
    /// Index signature value type mismatch.
    IndexSignatureMismatch {
        source_value_type: TypeId,
        target_value_type: TypeId,
    },
    ReturnTypeMismatch {
        source_return: TypeId,
        target_return: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    ParameterTypeMismatch {
        param_index: usize,
        source_param: TypeId,
        target_param: TypeId,
    },
    TooManyParameters {
        source_count: usize,
        target_count: usize,
    },
    TupleElementMismatch {
        source_count: usize,
        target_count: usize,
    },
    TupleElementTypeMismatch {
        index: usize,
        source_element: TypeId,
        target_element: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    ArrayElementMismatch {
        source_element: TypeId,
        target_element: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// No member of the target union accepts the source.
    NoUnionMemberMatches {
        source_type: TypeId,
        target_union_members: Vec<TypeId>,
    },
    /// Generic fallback.
    TypeMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
}

impl SubtypeFailureReason {
    /// Property path from the outermost compared type to the conflict.
    ///
    /// Tuple and array elements contribute their index (`"0"`) or `"[]"`.
    pub fn property_path(&self, interner: &dyn TypeDatabase) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(self);
        while let Some(reason) = current {
            current = match reason {
                SubtypeFailureReason::MissingProperty { property_name, .. }
                | SubtypeFailureReason::OptionalPropertyRequired { property_name }
                | SubtypeFailureReason::PropertyVisibilityMismatch { property_name, .. } => {
                    path.push(interner.resolve_atom(*property_name));
                    None
                }
                SubtypeFailureReason::PropertyTypeMismatch {
                    property_name,
                    nested_reason,
                    ..
                } => {
                    path.push(interner.resolve_atom(*property_name));
                    nested_reason.as_deref()
                }
                SubtypeFailureReason::TupleElementTypeMismatch {
                    index,
                    nested_reason,
                    ..
                } => {
                    path.push(index.to_string());
                    nested_reason.as_deref()
                }
                SubtypeFailureReason::ArrayElementMismatch { nested_reason, .. } => {
                    path.push("[]".to_string());
                    nested_reason.as_deref()
                }
                _ => None,
            };
        }
        path
    }

    /// Source and target at the innermost point of failure, if the reason
    /// records them.
    pub fn innermost_types(&self) -> Option<(TypeId, TypeId)> {
        match self {
            SubtypeFailureReason::PropertyTypeMismatch {
                nested_reason: Some(nested),
                ..
            }
            | SubtypeFailureReason::ReturnTypeMismatch {
                nested_reason: Some(nested),
                ..
            }
            | SubtypeFailureReason::TupleElementTypeMismatch {
                nested_reason: Some(nested),
                ..
            }
            | SubtypeFailureReason::ArrayElementMismatch {
                nested_reason: Some(nested),
                ..
            } => nested.innermost_types(),
            SubtypeFailureReason::PropertyTypeMismatch {
                source_property_type,
                target_property_type,
                ..
            } => Some((*source_property_type, *target_property_type)),
            SubtypeFailureReason::ReturnTypeMismatch {
                source_return,
                target_return,
                ..
            } => Some((*source_return, *target_return)),
            SubtypeFailureReason::ArrayElementMismatch {
                source_element,
                target_element,
                ..
            }
            | SubtypeFailureReason::TupleElementTypeMismatch {
                source_element,
                target_element,
                ..
            } => Some((*source_element, *target_element)),
            SubtypeFailureReason::MissingProperty {
                source_type,
                target_type,
                ..
            }
            | SubtypeFailureReason::TypeMismatch {
                source_type,
                target_type,
            } => Some((*source_type, *target_type)),
            _ => None,
        }
    }
}
