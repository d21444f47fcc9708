/// ORM collaborator contract
///
/// Model, column and relationship descriptors as the mapper consumes them, the
/// model catalog, and the row-loading call used by generated resolvers.

mod catalog;
mod loader;
mod types;

pub use catalog::Catalog;
pub use loader::{row_get, MemoryStore, Row, RowLoader};
pub use types::{
    ColumnDescriptor, ColumnType, Direction, EnumDescriptor, ModelDescriptor, RelationshipDescriptor,
};
