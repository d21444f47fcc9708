/// Field synthesis for generated types
///
/// # Field Rules
///
/// - object / interface: columns mirror their nullability, to-many relationships
///   become connections, to-one relationships nested objects
/// - create input: primary key and autoincrement columns are skipped; nullable or
///   defaulted columns and optional relationships are optional with a `null` default
/// - update input: primary key columns are required `ID`s, everything else is
///   optional with a `null` default
///
/// Inherited columns come first (root first), then the model's own columns, then
/// relationships, each in declaration order.

use crate::error::Result;
use crate::mapper::connection::connection_resolver_for;
use crate::mapper::convert::{convert_column, convert_relationship, ID};
use crate::mapper::types::{FieldResolver, FieldSpec, SchemaType, TypeKind};
use crate::orm::{Catalog, ColumnDescriptor, ModelDescriptor, RelationshipDescriptor};

use async_graphql::Value;

/// Synthesize the fields of a `kind` type for `model`
///
/// # Arguments
///
/// * `exclude` - names that must never be synthesized
/// * `declared` - names the caller already declared; they are left untouched
///
/// # Returns
///
/// Generated fields in declaration order
pub fn synthesize_fields(
    catalog: &Catalog,
    model: &ModelDescriptor,
    exclude: &[String],
    declared: &[&str],
    kind: TypeKind,
) -> Result<Vec<FieldSpec>> {
    let skip = |name: &str| exclude.iter().any(|e| e == name) || declared.contains(&name);
    let mut fields = Vec::new();

    for column in catalog.all_columns(model)? {
        if skip(&column.name) {
            continue;
        }
        if let Some(field) = column_field(model, &column, kind)? {
            tracing::debug!("{} {}: column '{}' as {}", model.name, kind, field.name, field.ty);
            fields.push(field);
        }
    }

    for relationship in catalog.all_relationships(model)? {
        if skip(&relationship.name) || fields.iter().any(|f: &FieldSpec| f.name == relationship.name) {
            continue;
        }
        let field = relationship_field(catalog, model, &relationship, kind)?;
        tracing::debug!("{} {}: relationship '{}' as {}", model.name, kind, field.name, field.ty);
        fields.push(field);
    }

    Ok(fields)
}

fn column_field(model: &ModelDescriptor, column: &ColumnDescriptor, kind: TypeKind) -> Result<Option<FieldSpec>> {
    let field = match kind {
        TypeKind::CreateInput => {
            if column.primary_key || column.autoincrement {
                return Ok(None);
            }
            let ty = convert_column(model, column)?;
            if ty.is_optional() || column.has_default {
                nullable_input(&column.name, SchemaType::optional(ty))
            } else {
                FieldSpec::generated(&column.name, ty, FieldResolver::None)
            }
        }
        TypeKind::UpdateInput => {
            if column.primary_key {
                FieldSpec::generated(&column.name, SchemaType::named(ID), FieldResolver::None)
            } else {
                let ty = convert_column(model, column)?;
                nullable_input(&column.name, SchemaType::optional(ty))
            }
        }
        _ => FieldSpec::generated(&column.name, convert_column(model, column)?, FieldResolver::Attribute),
    };
    Ok(Some(field))
}

fn relationship_field(
    catalog: &Catalog,
    model: &ModelDescriptor,
    relationship: &RelationshipDescriptor,
    kind: TypeKind,
) -> Result<FieldSpec> {
    let field = match kind {
        TypeKind::CreateInput | TypeKind::UpdateInput => {
            let ty = convert_relationship(catalog, model, relationship, kind)?;
            if ty.is_optional() || kind == TypeKind::UpdateInput {
                nullable_input(&relationship.name, SchemaType::optional(ty))
            } else {
                FieldSpec::generated(&relationship.name, ty, FieldResolver::None)
            }
        }
        _ => {
            let ty = convert_relationship(catalog, model, relationship, TypeKind::Object)?;
            let resolver = if relationship.direction.is_to_many() {
                FieldResolver::Connection(connection_resolver_for(relationship))
            } else {
                FieldResolver::Related(relationship.clone())
            };
            FieldSpec::generated(&relationship.name, ty, resolver)
        }
    };
    Ok(field)
}

fn nullable_input(name: &str, ty: SchemaType) -> FieldSpec {
    FieldSpec::generated(name, ty, FieldResolver::None).default_value(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::types::PendingRef;
    use crate::orm::ColumnType;

    fn catalog() -> Catalog {
        Catalog::from_models(vec![
            ModelDescriptor::new("Department", "department")
                .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key().autoincrement())
                .column(ColumnDescriptor::new("name", ColumnType::String).not_null())
                .relationship(RelationshipDescriptor::one_to_many("employees", "Employee").join("id", "department_id")),
            ModelDescriptor::new("Employee", "employee")
                .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key().autoincrement())
                .column(ColumnDescriptor::new("name", ColumnType::String).not_null())
                .column(ColumnDescriptor::new("active", ColumnType::Boolean).not_null().with_default())
                .column(ColumnDescriptor::new("department_id", ColumnType::Integer))
                .relationship(RelationshipDescriptor::many_to_one("department", "Department").join("department_id", "id")),
        ])
        .unwrap()
    }

    fn names(fields: &[FieldSpec]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_object_fields_in_declaration_order() {
        let catalog = catalog();
        let employee = catalog.get("Employee").unwrap();
        let fields = synthesize_fields(&catalog, employee, &[], &[], TypeKind::Object).unwrap();

        assert_eq!(names(&fields), vec!["id", "name", "active", "department_id", "department"]);
        assert_eq!(fields[1].ty.to_string(), "String!");
        assert!(matches!(fields[4].resolver, FieldResolver::Related(_)));
        assert!(fields.iter().all(|f| f.generated));
    }

    #[test]
    fn test_to_many_uses_connection_resolver() {
        let catalog = catalog();
        let department = catalog.get("Department").unwrap();
        let fields = synthesize_fields(&catalog, department, &[], &[], TypeKind::Object).unwrap();

        let employees = fields.iter().find(|f| f.name == "employees").unwrap();
        assert!(matches!(employees.resolver, FieldResolver::Connection(_)));
        assert_eq!(
            employees.ty.pending(),
            Some(&PendingRef::Connection { model: "Employee".into() })
        );
    }

    #[test]
    fn test_create_input_rules() {
        let catalog = catalog();
        let employee = catalog.get("Employee").unwrap();
        let fields = synthesize_fields(&catalog, employee, &[], &[], TypeKind::CreateInput).unwrap();

        assert_eq!(names(&fields), vec!["name", "active", "department_id", "department"]);
        assert_eq!(fields[0].ty.to_string(), "String!");
        assert_eq!(fields[0].default, None);
        assert_eq!(fields[1].ty.to_string(), "Boolean");
        assert_eq!(fields[1].default, Some(Value::Null));
        assert!(fields[3].ty.is_optional());
    }

    #[test]
    fn test_update_input_rules() {
        let catalog = catalog();
        let employee = catalog.get("Employee").unwrap();
        let fields = synthesize_fields(&catalog, employee, &[], &[], TypeKind::UpdateInput).unwrap();

        assert_eq!(fields[0].name, "id");
        assert_eq!(fields[0].ty.to_string(), "ID!");
        assert_eq!(fields[0].default, None);
        for field in &fields[1..] {
            assert!(field.ty.is_optional(), "{} should be optional", field.name);
            assert_eq!(field.default, Some(Value::Null));
        }
    }

    #[test]
    fn test_exclude_and_declared_are_skipped() {
        let catalog = catalog();
        let employee = catalog.get("Employee").unwrap();
        let exclude = vec!["department".to_string()];
        let fields = synthesize_fields(&catalog, employee, &exclude, &["name"], TypeKind::Object).unwrap();

        assert_eq!(names(&fields), vec!["id", "active", "department_id"]);
    }

    #[test]
    fn test_inherited_columns_come_first() {
        let catalog = Catalog::from_models(vec![
            ModelDescriptor::new("Employee", "employee")
                .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
                .column(ColumnDescriptor::new("type", ColumnType::String))
                .polymorphic_on("type"),
            ModelDescriptor::new("Lawyer", "employee")
                .inherits("Employee")
                .column(ColumnDescriptor::new("bar_number", ColumnType::String)),
        ])
        .unwrap();
        let lawyer = catalog.get("Lawyer").unwrap();
        let fields = synthesize_fields(&catalog, lawyer, &[], &[], TypeKind::Object).unwrap();

        assert_eq!(names(&fields), vec!["id", "type", "bar_number"]);
    }
}
