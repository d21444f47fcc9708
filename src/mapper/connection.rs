/// Connection / edge wrapper types for to-many relationships
///
/// A connection exposes a collection as `{ edges: [{ node: T }] }`. Pairs are
/// cached per target type name so every relationship to the same target shares
/// one `Arc`.

use crate::error::Result;
use crate::mapper::naming::{connection_name, edge_name};
use crate::mapper::types::{FieldResolver, FieldSpec, GeneratedType, SchemaType, TypeKind};
use crate::orm::{ModelDescriptor, RelationshipDescriptor, Row, RowLoader};

use async_graphql::{Name, Value};
use indexmap::IndexMap;
use std::sync::Arc;

pub const EDGES_FIELD: &str = "edges";
pub const NODE_FIELD: &str = "node";

#[derive(Debug, Clone, Default)]
pub(crate) struct ConnectionCache {
    edges: IndexMap<String, Arc<GeneratedType>>,
    connections: IndexMap<String, Arc<GeneratedType>>,
}

impl ConnectionCache {
    /// `{name}Edge` with a single `node: {name}!` field
    pub(crate) fn edge_type_for(&mut self, type_name: &str, model: Option<&str>) -> Arc<GeneratedType> {
        if let Some(existing) = self.edges.get(type_name) {
            return Arc::clone(existing);
        }

        let mut edge = GeneratedType::new(edge_name(type_name), model.map(String::from), TypeKind::Edge);
        edge.push_generated(FieldSpec::generated(
            NODE_FIELD,
            SchemaType::named(type_name),
            FieldResolver::Attribute,
        ));

        let edge = Arc::new(edge);
        self.edges.insert(type_name.to_string(), Arc::clone(&edge));
        edge
    }

    /// `{name}Connection` with a single `edges: [{name}Edge!]!` field
    pub(crate) fn connection_type_for(&mut self, type_name: &str, model: Option<&str>) -> Arc<GeneratedType> {
        if let Some(existing) = self.connections.get(type_name) {
            return Arc::clone(existing);
        }

        let edge = self.edge_type_for(type_name, model);
        let mut connection = GeneratedType::new(
            connection_name(type_name),
            model.map(String::from),
            TypeKind::Connection,
        );
        connection.is_generated_connection = true;
        connection.push_generated(FieldSpec::generated(
            EDGES_FIELD,
            SchemaType::list(SchemaType::named(edge.name())),
            FieldResolver::Attribute,
        ));

        tracing::debug!("Generated connection type {}", connection.name);
        let connection = Arc::new(connection);
        self.connections.insert(type_name.to_string(), Arc::clone(&connection));
        connection
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = &Arc<GeneratedType>> {
        self.edges.values()
    }

    pub(crate) fn connections(&self) -> impl Iterator<Item = &Arc<GeneratedType>> {
        self.connections.values()
    }

    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.edges.values().chain(self.connections.values()).any(|t| t.name() == name)
    }

    pub(crate) fn find(&self, name: &str) -> Option<&Arc<GeneratedType>> {
        self.edges
            .values()
            .chain(self.connections.values())
            .find(|t| t.name() == name)
    }
}

/// Default resolver of a to-many relationship field
#[derive(Debug, Clone)]
pub struct ConnectionResolver {
    relationship: RelationshipDescriptor,
}

impl ConnectionResolver {
    pub fn new(relationship: RelationshipDescriptor) -> Self {
        Self { relationship }
    }

    pub fn relationship(&self) -> &RelationshipDescriptor {
        &self.relationship
    }

    /// Load the related rows of `parent` and wrap them as a connection value
    pub fn resolve(&self, loader: &dyn RowLoader, target: &ModelDescriptor, parent: &Row) -> Result<Value> {
        let rows = loader.load_related(target, &self.relationship, parent)?;
        tracing::debug!(
            "Relationship '{}' loaded {} rows of {}",
            self.relationship.name,
            rows.len(),
            target.name
        );
        Ok(wrap_connection(rows))
    }
}

/// Build `connection_resolver_for` a relationship
pub fn connection_resolver_for(relationship: &RelationshipDescriptor) -> ConnectionResolver {
    ConnectionResolver::new(relationship.clone())
}

/// Wrap rows as `{ edges: [{ node: row }] }`
pub fn wrap_connection(rows: Vec<Row>) -> Value {
    let edges = rows
        .into_iter()
        .map(|row| {
            let mut edge = IndexMap::new();
            edge.insert(Name::new(NODE_FIELD), row);
            Value::Object(edge)
        })
        .collect();

    let mut connection = IndexMap::new();
    connection.insert(Name::new(EDGES_FIELD), Value::List(edges));
    Value::Object(connection)
}
