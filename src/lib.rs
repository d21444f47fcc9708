pub mod config;
pub mod error;
pub mod mapper;
pub mod orm;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, MapperSettings, MappingConfig, MappingKind};
pub use error::{RelgraphError, Result};
pub use mapper::{FieldSpec, Mapper, NamingPolicy, SchemaType, TypeSkeleton};
pub use orm::{Catalog, MemoryStore, ModelDescriptor, RowLoader};
pub use schema::{build_schema, SchemaOptions};
pub use validation::{ValidatingMapper, ValidationError, ValidationMode};
