/// GraphQL schema builder
///
/// This module registers a finalized `Mapper` into an `async-graphql` dynamic
/// `Schema`: custom scalars, enums, object / interface / input / connection
/// types, and optional root query fields.

use crate::error::{RelgraphError, Result};
use crate::mapper::{GeneratedType, Mapper, TypeKind};
use crate::orm::RowLoader;
use crate::schema::resolver::{create_field_resolver, create_get_resolver, create_list_resolver, to_type_ref};
use crate::schema::scalars::register_custom_scalars;

use async_graphql::dynamic::{
    Enum, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface, InterfaceField, Object, ResolverContext, Schema,
    TypeRef,
};
use async_graphql::Value;
use std::sync::Arc;

/// Options of the schema export
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Name of the root query type
    pub query_name: String,
    /// Generate `{model}` and `list_{model}` root fields for explicitly mapped models
    pub query_fields: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            query_name: "Query".to_string(),
            query_fields: true,
        }
    }
}

/// Build a dynamic GraphQL schema from a mapper
///
/// The mapper is finalized first if needed, then shared read-only by every
/// resolver. The loader is stored in the schema data.
///
/// # Arguments
///
/// * `mapper` - Mapper with every type registered
/// * `options` - Root query settings
/// * `loader` - Row loader used by relationship and root resolvers
///
/// # Returns
///
/// A dynamic GraphQL schema
pub fn build_schema(mut mapper: Mapper, options: SchemaOptions, loader: Arc<dyn RowLoader>) -> Result<Schema> {
    if !mapper.is_finalized() {
        mapper.finalize()?;
    }

    // Root fields need the connection type of every listed model
    let roots = if options.query_fields {
        root_types(&mapper)
    } else {
        Vec::new()
    };
    let roots = roots
        .into_iter()
        .map(|(model, type_name)| {
            let connection = mapper.connection_type_for(&type_name)?;
            Ok((model, type_name, connection.name().to_string()))
        })
        .collect::<Result<Vec<(String, String, String)>>>()?;

    let mapper = Arc::new(mapper);

    // Build Query type
    let mut query = Object::new(&options.query_name);
    for (model_name, type_name, connection_name) in &roots {
        let model = mapper.catalog().get(model_name)?;

        tracing::info!("Adding root fields for {}", type_name);
        if let Some(get_field) = create_get_resolver(&mapper, model, type_name)? {
            query = query.field(get_field);
        }
        query = query.field(create_list_resolver(&mapper, model, connection_name));
    }
    if roots.is_empty() {
        query = query.field(type_names_field(&mapper));
    }

    let mut schema_builder = Schema::build(&options.query_name, None, None);

    // Add custom scalars
    for scalar in register_custom_scalars() {
        schema_builder = schema_builder.register(scalar);
    }

    for descriptor in mapper.enums() {
        let mut graphql_enum = Enum::new(&descriptor.name);
        for value in &descriptor.values {
            graphql_enum = graphql_enum.item(value.as_str());
        }
        schema_builder = schema_builder.register(graphql_enum);
    }

    for ty in mapper.types() {
        schema_builder = if ty.is_interface() {
            schema_builder.register(build_interface(ty)?)
        } else {
            schema_builder.register(build_object(&mapper, ty)?)
        };
    }

    for wrapper in mapper.edges().chain(mapper.connections()) {
        schema_builder = schema_builder.register(build_object(&mapper, wrapper)?);
    }

    for input in mapper.inputs() {
        schema_builder = schema_builder.register(build_input(input)?);
    }

    // Add the Query object
    schema_builder = schema_builder.register(query);

    // Store the row loader in schema data
    let schema = schema_builder
        .data(loader)
        .finish()
        .map_err(|e| RelgraphError::SchemaGeneration(format!("Failed to build schema: {}", e)))?;

    tracing::info!(
        "Built schema with {} types and {} inputs",
        mapper.types().count(),
        mapper.inputs().count()
    );
    Ok(schema)
}

/// Models that get root fields: every model mapped by a caller, exposed under
/// its interface when it has one
fn root_types(mapper: &Mapper) -> Vec<(String, String)> {
    mapper
        .catalog()
        .models()
        .filter_map(|model| {
            let name = mapper
                .type_name_for(&model.name, TypeKind::Interface)
                .or_else(|| mapper.type_name_for(&model.name, TypeKind::Object))?;
            let explicit = mapper.object_type(name).map(|t| t.is_explicit()).unwrap_or(false);
            explicit.then(|| (model.name.clone(), name.to_string()))
        })
        .collect()
}

fn build_object(mapper: &Arc<Mapper>, ty: &GeneratedType) -> Result<Object> {
    let mut object = Object::new(ty.name());
    if let Some(description) = ty.description() {
        object = object.description(description);
    }
    for interface in ty.implements() {
        object = object.implement(interface);
    }
    for field in ty.fields() {
        object = object.field(create_field_resolver(mapper, field)?);
    }
    Ok(object)
}

fn build_interface(ty: &GeneratedType) -> Result<Interface> {
    let mut interface = Interface::new(ty.name());
    if let Some(description) = ty.description() {
        interface = interface.description(description);
    }
    for field in ty.fields() {
        let mut interface_field = InterfaceField::new(field.name.clone(), to_type_ref(&field.ty)?);
        if let Some(description) = &field.description {
            interface_field = interface_field.description(description);
        }
        interface = interface.field(interface_field);
    }
    Ok(interface)
}

fn build_input(ty: &GeneratedType) -> Result<InputObject> {
    let mut input = InputObject::new(ty.name());
    if let Some(description) = ty.description() {
        input = input.description(description);
    }
    for field in ty.fields() {
        let mut input_value = InputValue::new(field.name.clone(), to_type_ref(&field.ty)?);
        if let Some(default) = &field.default {
            input_value = input_value.default_value(default.clone());
        }
        if let Some(description) = &field.description {
            input_value = input_value.description(description);
        }
        input = input.field(input_value);
    }
    Ok(input)
}

/// Placeholder root field for schemas without root queries
fn type_names_field(mapper: &Arc<Mapper>) -> Field {
    let names: Vec<Value> = mapper
        .types()
        .chain(mapper.inputs())
        .map(|t| Value::String(t.name().to_string()))
        .collect();

    Field::new("generatedTypes", TypeRef::named_nn_list_nn(TypeRef::STRING), move |_ctx: ResolverContext| {
        let names = names.clone();
        FieldFuture::new(async move { Ok(Some(FieldValue::value(Value::List(names)))) })
    })
}
