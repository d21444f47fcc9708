/// GraphQL resolvers for generated types
///
/// This module provides:
/// - Field resolvers for generated object types (attribute, relationship,
///   connection and computed fields)
/// - Get by primary key and list-as-connection root query resolvers
/// - Shaping of row values into `FieldValue`s (enums, nested objects and
///   interface values tagged with their concrete type)

use crate::error::{RelgraphError, Result};
use crate::mapper::{
    base_model_for, concrete_model_for, is_polymorphic, wrap_connection, FieldResolver, FieldSpec, Mapper,
    SchemaType, TypeKind,
};
use crate::orm::{row_get, ModelDescriptor, Row, RowLoader};

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, ResolverContext, TypeRef};
use async_graphql::{Name, Value};
use std::sync::Arc;

/// Default page size of list resolvers
pub const DEFAULT_LIMIT: i64 = 100;
/// Upper bound of the `limit` argument
pub const MAX_LIMIT: i64 = 1000;

/// Convert a resolved schema type to a `TypeRef`
pub fn to_type_ref(ty: &SchemaType) -> Result<TypeRef> {
    match ty {
        SchemaType::Named(name) => Ok(TypeRef::NonNull(Box::new(TypeRef::named(name.clone())))),
        SchemaType::List(inner) => Ok(TypeRef::NonNull(Box::new(TypeRef::List(Box::new(to_type_ref(inner)?))))),
        SchemaType::Optional(inner) => match to_type_ref(inner)? {
            TypeRef::NonNull(inner) => Ok(*inner),
            nullable => Ok(nullable),
        },
        SchemaType::Pending(reference) => Err(RelgraphError::SchemaGeneration(format!(
            "Type reference {} was never resolved, finalize the mapper first",
            reference
        ))),
    }
}

/// Create the resolver of one output field
///
/// # Arguments
///
/// * `mapper` - Finalized mapper shared by every resolver
/// * `field` - Field to resolve
///
/// # Returns
///
/// A GraphQL Field reading its value from the parent row
pub fn create_field_resolver(mapper: &Arc<Mapper>, field: &FieldSpec) -> Result<Field> {
    let type_ref = to_type_ref(&field.ty)?;
    let mapper = Arc::clone(mapper);
    let spec = Arc::new(field.clone());

    let mut graphql_field = Field::new(field.name.clone(), type_ref, move |ctx: ResolverContext| {
        let mapper = Arc::clone(&mapper);
        let spec = Arc::clone(&spec);

        FieldFuture::new(async move {
            // Extract the parent row
            let parent = parent_row(ctx.parent_value).ok_or("Parent value is not a row")?;

            let value = resolve_field(&mapper, &spec, &ctx, parent)?;
            Ok(shape_value(&mapper, &spec.ty, value))
        })
    });

    if let Some(description) = &field.description {
        graphql_field = graphql_field.description(description);
    }
    Ok(graphql_field)
}

fn resolve_field(mapper: &Mapper, field: &FieldSpec, ctx: &ResolverContext<'_>, parent: &Row) -> Result<Value> {
    match &field.resolver {
        FieldResolver::Attribute | FieldResolver::None => {
            Ok(row_get(parent, &field.name).cloned().unwrap_or(Value::Null))
        }
        FieldResolver::Computed(compute) => compute(parent),
        FieldResolver::Related(relationship) => {
            let target = mapper.catalog().get(&relationship.target)?;
            let rows = loader(ctx)?.load_related(target, relationship, parent)?;
            Ok(rows.into_iter().next().unwrap_or(Value::Null))
        }
        FieldResolver::Connection(connection) => {
            let target = mapper.catalog().get(&connection.relationship().target)?;
            connection.resolve(loader(ctx)?.as_ref(), target, parent)
        }
    }
}

fn loader<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a Arc<dyn RowLoader>> {
    ctx.data::<Arc<dyn RowLoader>>()
        .map_err(|_| RelgraphError::Loader("No row loader in schema data".to_string()))
}

/// Parent rows travel as `owned_any` values; plain values are accepted too
pub(crate) fn parent_row<'a>(parent: &'a FieldValue<'a>) -> Option<&'a Value> {
    parent
        .try_downcast_ref::<Value>()
        .ok()
        .or_else(|| parent.as_value())
}

/// Turn a raw value into the `FieldValue` shape `ty` expects
///
/// Composite values are passed down as `owned_any` rows, enum names become
/// `Value::Enum` and interface values carry their concrete type name.
pub(crate) fn shape_value<'a>(mapper: &Mapper, ty: &SchemaType, value: Value) -> Option<FieldValue<'a>> {
    match (ty, value) {
        (_, Value::Null) => None,
        (SchemaType::Optional(inner), value) => shape_value(mapper, inner, value),
        (SchemaType::List(inner), Value::List(items)) => Some(FieldValue::list(
            items
                .into_iter()
                .map(|item| shape_value(mapper, inner, item).unwrap_or(FieldValue::NULL)),
        )),
        (SchemaType::Named(name), value) => Some(shape_named(mapper, name, value)),
        (_, value) => Some(FieldValue::value(value)),
    }
}

fn shape_named<'a>(mapper: &Mapper, name: &str, value: Value) -> FieldValue<'a> {
    if mapper.is_enum(name) {
        return match value {
            Value::String(s) => FieldValue::value(Value::Enum(Name::new(s))),
            other => FieldValue::value(other),
        };
    }

    let Some(generated) = mapper.generated_type(name).filter(|t| !t.is_input()) else {
        return FieldValue::value(value);
    };

    if generated.is_interface() {
        if let Some(concrete) = concrete_type_name(mapper, generated.model(), &value) {
            return FieldValue::owned_any(value).with_type(concrete);
        }
    }
    FieldValue::owned_any(value)
}

/// Object type implementing an interface that a row belongs to
fn concrete_type_name(mapper: &Mapper, model: Option<&str>, row: &Row) -> Option<String> {
    let model = mapper.catalog().find(model?)?;
    let base = base_model_for(mapper.catalog(), model).ok()?;

    let concrete = concrete_model_for(mapper.catalog(), &base, row).unwrap_or_else(|| Arc::clone(model));
    mapper
        .type_name_for(&concrete.name, TypeKind::Object)
        .or_else(|| mapper.type_name_for(&model.name, TypeKind::Object))
        .map(String::from)
}

/// Keep the rows of a single-table hierarchy that belong to `model` or one of
/// its descendants
fn rows_of_model(mapper: &Mapper, model: &ModelDescriptor, rows: Vec<Row>) -> Result<Vec<Row>> {
    if model.parent.is_none() || !is_polymorphic(mapper.catalog(), model)? {
        return Ok(rows);
    }

    let base = base_model_for(mapper.catalog(), model)?;
    let mut members = vec![model.name.clone()];
    members.extend(mapper.catalog().descendants_of(&model.name).iter().map(|m| m.name.clone()));

    Ok(rows
        .into_iter()
        .filter(|row| {
            concrete_model_for(mapper.catalog(), &base, row)
                .map(|concrete| members.contains(&concrete.name))
                .unwrap_or(false)
        })
        .collect())
}

/// Create `{model}(key)` resolver for a model with a single-column primary key
///
/// # Arguments
///
/// * `mapper` - Finalized mapper
/// * `model` - Model to fetch
/// * `type_name` - Output type (object or interface) of the model
///
/// # Returns
///
/// `None` when the model has no single-column primary key
pub fn create_get_resolver(mapper: &Arc<Mapper>, model: &ModelDescriptor, type_name: &str) -> Result<Option<Field>> {
    let primary_key = mapper.catalog().primary_key(model)?;
    let [key_column] = primary_key.as_slice() else {
        return Ok(None);
    };

    let primary_key = key_column.name.clone();
    let primary_key_arg = key_column.name.clone();
    let field_name = to_snake_case(&model.name);
    let mapper = Arc::clone(mapper);
    let model = model.clone();
    let result_type = SchemaType::optional(SchemaType::named(type_name));

    let field = Field::new(field_name, TypeRef::named(type_name), move |ctx: ResolverContext| {
        let mapper = Arc::clone(&mapper);
        let model = model.clone();
        let primary_key = primary_key.clone();
        let result_type = result_type.clone();

        FieldFuture::new(async move {
            // Extract primary key value from arguments
            let key = ctx
                .args
                .try_get(&primary_key)
                .map_err(|_| format!("Primary key '{}' argument missing", primary_key))?
                .as_value()
                .clone();

            tracing::debug!("Loading {} where {} = {}", model.name, primary_key, key);

            let row = loader(&ctx)?.load_by_key(&model, &primary_key, &key)?;
            let rows = rows_of_model(&mapper, &model, row.into_iter().collect())?;

            Ok(rows
                .into_iter()
                .next()
                .and_then(|row| shape_value(&mapper, &result_type, row)))
        })
    })
    .argument(InputValue::new(primary_key_arg, TypeRef::named_nn(TypeRef::ID)));

    Ok(Some(field))
}

/// Create `list_{model}(limit, offset)` resolver returning a connection
///
/// # Arguments
///
/// * `mapper` - Finalized mapper
/// * `model` - Model to list
/// * `connection_name` - Connection type wrapping the model's output type
pub fn create_list_resolver(mapper: &Arc<Mapper>, model: &ModelDescriptor, connection_name: &str) -> Field {
    let field_name = format!("list_{}", to_snake_case(&model.name));
    let mapper = Arc::clone(mapper);
    let model = model.clone();

    Field::new(field_name, TypeRef::named_nn(connection_name), move |ctx: ResolverContext| {
        let mapper = Arc::clone(&mapper);
        let model = model.clone();

        FieldFuture::new(async move {
            // Extract pagination arguments
            let limit: i64 = ctx
                .args
                .try_get("limit")
                .ok()
                .and_then(|v| v.i64().ok())
                .unwrap_or(DEFAULT_LIMIT);
            let offset: i64 = ctx
                .args
                .try_get("offset")
                .ok()
                .and_then(|v| v.i64().ok())
                .unwrap_or(0);

            // Enforce max limit
            let limit = limit.clamp(0, MAX_LIMIT) as usize;
            let offset = offset.max(0) as usize;

            let rows = loader(&ctx)?.load_all(&model)?;
            let rows: Vec<Row> = rows_of_model(&mapper, &model, rows)?
                .into_iter()
                .skip(offset)
                .take(limit)
                .collect();

            tracing::debug!("Listed {} rows of {}", rows.len(), model.name);
            Ok(Some(FieldValue::owned_any(wrap_connection(rows))))
        })
    })
    .argument(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
    .argument(InputValue::new("offset", TypeRef::named(TypeRef::INT)))
}

/// Convert a type name to snake_case (`OrderItem` -> `order_item`)
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.push(ch.to_ascii_lowercase());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{PendingRef, TypeSkeleton};
    use crate::orm::{Catalog, ColumnDescriptor, ColumnType, EnumDescriptor};

    #[test]
    fn test_to_type_ref() {
        let required = to_type_ref(&SchemaType::named("Int")).unwrap();
        assert_eq!(required.to_string(), "Int!");

        let optional_list = SchemaType::optional(SchemaType::list(SchemaType::named("String")));
        assert_eq!(to_type_ref(&optional_list).unwrap().to_string(), "[String!]");
    }

    #[test]
    fn test_pending_type_ref_fails() {
        let pending = SchemaType::Pending(PendingRef::Object { model: "Employee".into() });
        assert!(to_type_ref(&pending).is_err());
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Customer"), "customer");
        assert_eq!(to_snake_case("OrderItem"), "order_item");
    }

    #[test]
    fn test_enum_values_are_shaped() {
        let catalog = Catalog::from_models(vec![ModelDescriptor::new("Task", "task")
            .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDescriptor::new(
                "status",
                ColumnType::Enum(EnumDescriptor::new("TaskStatus", &["open", "done"])),
            ))])
        .unwrap();
        let mut mapper = Mapper::with_catalog(catalog);
        mapper.type_("Task", TypeSkeleton::new()).unwrap();
        mapper.finalize().unwrap();

        let shaped = shape_value(&mapper, &SchemaType::named("TaskStatus"), Value::String("open".into())).unwrap();
        assert_eq!(shaped.as_value(), Some(&Value::Enum(Name::new("open"))));

        assert!(shape_value(&mapper, &SchemaType::optional(SchemaType::named("Int")), Value::Null).is_none());
    }
}
