/// Column and relationship to schema type conversion
///
/// # Type Mapping Rules
///
/// - integer / small_integer → `Int`, big_integer → `BigInt`
/// - float → `Float`, numeric → `Decimal`
/// - string / text → `String`, boolean → `Boolean`
/// - date → `Date`, date_time → `DateTime`, time → `Time`, interval → `Interval`
/// - uuid → `UUID`, json → `JSON`
/// - enum → the enum's own generated type
/// - array → list of the element type (elements are never null)
/// - nullable columns are wrapped in `Optional`

use crate::error::{RelgraphError, Result};
use crate::mapper::types::{PendingRef, SchemaType, TypeKind};
use crate::orm::{Catalog, ColumnDescriptor, ColumnType, ModelDescriptor, RelationshipDescriptor};

pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";
pub const ID: &str = "ID";
pub const BIG_INT: &str = "BigInt";
pub const DECIMAL: &str = "Decimal";
pub const DATE: &str = "Date";
pub const DATE_TIME: &str = "DateTime";
pub const TIME: &str = "Time";
pub const INTERVAL: &str = "Interval";
pub const UUID: &str = "UUID";
pub const JSON: &str = "JSON";

/// Scalars every GraphQL schema has
pub const BUILTIN_SCALARS: &[&str] = &[INT, FLOAT, STRING, BOOLEAN, ID];

/// Scalars registered by the schema export layer
pub const CUSTOM_SCALARS: &[&str] = &[BIG_INT, DECIMAL, DATE, DATE_TIME, TIME, INTERVAL, UUID, JSON];

pub fn is_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name) || CUSTOM_SCALARS.contains(&name)
}

/// Map a column to its schema type
///
/// # Errors
///
/// `UnsupportedType` naming the column and model when the storage type (or an
/// array's element type) has no schema counterpart.
pub fn convert_column(model: &ModelDescriptor, column: &ColumnDescriptor) -> Result<SchemaType> {
    let base = match &column.column_type {
        ColumnType::Array(element) => {
            let element = scalar_for(model, column, element)?;
            SchemaType::list(SchemaType::Named(element))
        }
        other => SchemaType::Named(scalar_for(model, column, other)?),
    };

    if column.nullable {
        Ok(SchemaType::optional(base))
    } else {
        Ok(base)
    }
}

fn scalar_for(model: &ModelDescriptor, column: &ColumnDescriptor, column_type: &ColumnType) -> Result<String> {
    let name = match column_type {
        ColumnType::Integer | ColumnType::SmallInteger => INT,
        ColumnType::BigInteger => BIG_INT,
        ColumnType::Float => FLOAT,
        ColumnType::Numeric => DECIMAL,
        ColumnType::String | ColumnType::Text => STRING,
        ColumnType::Boolean => BOOLEAN,
        ColumnType::Date => DATE,
        ColumnType::DateTime => DATE_TIME,
        ColumnType::Time => TIME,
        ColumnType::Interval => INTERVAL,
        ColumnType::Uuid => UUID,
        ColumnType::Json => JSON,
        ColumnType::Enum(descriptor) => return Ok(descriptor.name.clone()),
        ColumnType::Array(_) | ColumnType::Other(_) => {
            return Err(RelgraphError::UnsupportedType {
                model: model.name.clone(),
                column: column.name.clone(),
                storage_type: column.column_type.storage_name(),
            });
        }
    };
    Ok(name.to_string())
}

/// Map a relationship to its schema type for a type of `kind`
///
/// Targets are not known to exist yet, so the result carries a pending reference
/// resolved when the mapper finalizes.
pub fn convert_relationship(
    catalog: &Catalog,
    model: &ModelDescriptor,
    relationship: &RelationshipDescriptor,
    kind: TypeKind,
) -> Result<SchemaType> {
    let target = relationship.target.clone();
    let to_many = relationship.direction.is_to_many();

    let base = if kind.is_input() {
        let pending = SchemaType::Pending(PendingRef::Input { model: target, kind });
        if to_many {
            SchemaType::list(pending)
        } else {
            pending
        }
    } else if to_many {
        SchemaType::Pending(PendingRef::Connection { model: target })
    } else {
        SchemaType::Pending(PendingRef::Object { model: target })
    };

    if relationship_is_optional(catalog, model, relationship)? {
        Ok(SchemaType::optional(base))
    } else {
        Ok(base)
    }
}

/// To-many relationships are always optional at the field level; to-one ones
/// are optional unless every local foreign key column is non-nullable.
pub fn relationship_is_optional(
    catalog: &Catalog,
    model: &ModelDescriptor,
    relationship: &RelationshipDescriptor,
) -> Result<bool> {
    if relationship.direction.is_to_many() || relationship.local_columns.is_empty() {
        return Ok(true);
    }

    let columns = catalog.all_columns(model)?;
    let optional = relationship.local_columns.iter().any(|local| {
        columns
            .iter()
            .find(|c| &c.name == local)
            .map(|c| c.nullable)
            .unwrap_or(true)
    });
    Ok(optional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::{Direction, EnumDescriptor};

    fn model() -> ModelDescriptor {
        ModelDescriptor::new("Sample", "sample")
    }

    fn convert(column: ColumnDescriptor) -> Result<SchemaType> {
        convert_column(&model(), &column)
    }

    #[test]
    fn test_integer_to_int() {
        let ty = convert(ColumnDescriptor::new("count", ColumnType::Integer).not_null()).unwrap();
        assert_eq!(ty, SchemaType::named("Int"));
    }

    #[test]
    fn test_string_to_string() {
        let ty = convert(ColumnDescriptor::new("name", ColumnType::String).not_null()).unwrap();
        assert_eq!(ty.to_string(), "String!");
    }

    #[test]
    fn test_nullable_wraps_optional() {
        let ty = convert(ColumnDescriptor::new("name", ColumnType::Text)).unwrap();
        assert!(ty.is_optional());
        assert_eq!(ty.to_string(), "String");
    }

    #[test]
    fn test_non_nullable_scalars_never_optional() {
        let types = [
            ColumnType::Integer,
            ColumnType::SmallInteger,
            ColumnType::BigInteger,
            ColumnType::Float,
            ColumnType::Numeric,
            ColumnType::String,
            ColumnType::Text,
            ColumnType::Boolean,
            ColumnType::Date,
            ColumnType::DateTime,
            ColumnType::Time,
            ColumnType::Interval,
            ColumnType::Uuid,
            ColumnType::Json,
        ];
        for column_type in types {
            let required = convert(ColumnDescriptor::new("c", column_type.clone()).not_null()).unwrap();
            assert!(!required.is_optional(), "{:?} should not be optional", column_type);

            let nullable = convert(ColumnDescriptor::new("c", column_type.clone())).unwrap();
            assert!(nullable.is_optional(), "{:?} should be optional", column_type);
        }
    }

    #[test]
    fn test_custom_scalars() {
        let ty = convert(ColumnDescriptor::new("at", ColumnType::DateTime).not_null()).unwrap();
        assert_eq!(ty, SchemaType::named("DateTime"));
        let ty = convert(ColumnDescriptor::new("n", ColumnType::BigInteger).not_null()).unwrap();
        assert_eq!(ty, SchemaType::named("BigInt"));
    }

    #[test]
    fn test_nullable_array() {
        let column = ColumnDescriptor::new("tags", ColumnType::Array(Box::new(ColumnType::String)));
        let ty = convert(column).unwrap();
        assert_eq!(ty, SchemaType::optional(SchemaType::list(SchemaType::named("String"))));
        assert_eq!(ty.to_string(), "[String!]");
    }

    #[test]
    fn test_required_array() {
        let column = ColumnDescriptor::new("tags", ColumnType::Array(Box::new(ColumnType::String))).not_null();
        let ty = convert(column).unwrap();
        assert_eq!(ty, SchemaType::list(SchemaType::named("String")));
    }

    #[test]
    fn test_enum_column() {
        let role = ColumnType::Enum(EnumDescriptor::new("SampleEnum", &["one", "two", "three"]));
        let nullable = convert(ColumnDescriptor::new("kind", role.clone())).unwrap();
        assert_eq!(nullable, SchemaType::optional(SchemaType::named("SampleEnum")));

        let required = convert(ColumnDescriptor::new("kind", role).not_null()).unwrap();
        assert_eq!(required, SchemaType::named("SampleEnum"));
    }

    #[test]
    fn test_unsupported_type_names_column_and_model() {
        let column = ColumnDescriptor::new("shape", ColumnType::Other("geometry".into()));
        let err = convert(column).unwrap_err();
        match err {
            RelgraphError::UnsupportedType { model, column, storage_type } => {
                assert_eq!(model, "Sample");
                assert_eq!(column, "shape");
                assert_eq!(storage_type, "geometry");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_array_unsupported() {
        let nested = ColumnType::Array(Box::new(ColumnType::Array(Box::new(ColumnType::Integer))));
        assert!(convert(ColumnDescriptor::new("grid", nested)).is_err());
    }

    fn catalog() -> Catalog {
        Catalog::from_models(vec![
            ModelDescriptor::new("Department", "department")
                .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
                .relationship(RelationshipDescriptor::one_to_many("employees", "Employee").join("id", "department_id")),
            ModelDescriptor::new("Employee", "employee")
                .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
                .column(ColumnDescriptor::new("department_id", ColumnType::Integer))
                .column(ColumnDescriptor::new("manager_id", ColumnType::Integer).not_null())
                .relationship(RelationshipDescriptor::many_to_one("department", "Department").join("department_id", "id"))
                .relationship(RelationshipDescriptor::many_to_one("manager", "Employee").join("manager_id", "id")),
        ])
        .unwrap()
    }

    #[test]
    fn test_to_many_is_pending_connection() {
        let catalog = catalog();
        let department = catalog.get("Department").unwrap();
        let ty = convert_relationship(&catalog, department, &department.relationships[0], TypeKind::Object).unwrap();
        assert!(ty.is_optional());
        assert_eq!(
            ty.pending(),
            Some(&PendingRef::Connection { model: "Employee".into() })
        );
    }

    #[test]
    fn test_to_one_optionality_follows_foreign_key() {
        let catalog = catalog();
        let employee = catalog.get("Employee").unwrap();

        let department = &employee.relationships[0];
        assert!(relationship_is_optional(&catalog, employee, department).unwrap());

        let manager = &employee.relationships[1];
        assert!(!relationship_is_optional(&catalog, employee, manager).unwrap());
        let ty = convert_relationship(&catalog, employee, manager, TypeKind::Object).unwrap();
        assert_eq!(ty, SchemaType::Pending(PendingRef::Object { model: "Employee".into() }));
    }

    #[test]
    fn test_input_relationships() {
        let catalog = catalog();
        let department = catalog.get("Department").unwrap();
        let ty = convert_relationship(&catalog, department, &department.relationships[0], TypeKind::CreateInput).unwrap();
        assert!(ty.is_list());
        assert_eq!(
            ty.pending(),
            Some(&PendingRef::Input { model: "Employee".into(), kind: TypeKind::CreateInput })
        );
    }

    #[test]
    fn test_relationship_without_local_columns_is_optional() {
        let catalog = catalog();
        let employee = catalog.get("Employee").unwrap();
        let rel = RelationshipDescriptor::new("badge", "Badge", Direction::OneToOne);
        assert!(relationship_is_optional(&catalog, employee, &rel).unwrap());
    }
}
