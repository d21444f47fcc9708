/// Mapping engine: ORM models to generated schema types
///
/// This module provides the `Mapper` registry and the pieces it is built from:
/// - Column and relationship type conversion
/// - Field synthesis per type kind
/// - Connection / edge wrapper types
/// - Polymorphic inheritance helpers
/// - The naming policy

mod connection;
mod convert;
mod fields;
mod naming;
mod polymorphism;
mod registry;
mod types;

pub use connection::{connection_resolver_for, wrap_connection, ConnectionResolver, EDGES_FIELD, NODE_FIELD};
pub use convert::{
    convert_column, convert_relationship, is_scalar, relationship_is_optional, BUILTIN_SCALARS, CUSTOM_SCALARS,
};
pub use fields::synthesize_fields;
pub use naming::{connection_name, edge_name, NameFn, NamingPolicy};
pub use polymorphism::{base_model_for, concrete_model_for, is_interface, is_polymorphic};
pub use registry::Mapper;
pub use types::{
    ComputeFn, FieldResolver, FieldSpec, GeneratedType, PendingRef, SchemaType, TypeKind, TypeSkeleton,
};

/// Scalar names used by converted columns
pub mod scalars {
    pub use super::convert::{
        BIG_INT, BOOLEAN, DATE, DATE_TIME, DECIMAL, FLOAT, ID, INT, INTERVAL, JSON, STRING, TIME, UUID,
    };
}
