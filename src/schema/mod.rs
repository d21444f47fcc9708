/// GraphQL schema export
///
/// This module turns a finalized mapper into an `async-graphql` dynamic schema,
/// including resolvers backed by a `RowLoader` and the custom scalar set.

mod builder;
mod resolver;
mod scalars;

pub use builder::{build_schema, SchemaOptions};
pub use resolver::{
    create_field_resolver, create_get_resolver, create_list_resolver, to_snake_case, to_type_ref, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use scalars::{is_date, is_datetime, is_decimal, is_integer_string, is_time, is_uuid, register_custom_scalars};
