/// Row loading contract used by generated resolvers
///
/// Rows are `async_graphql::Value` objects keyed by column name. The mapper never
/// executes queries itself; relationship and connection resolvers call through a
/// `RowLoader` supplied by the application.

use crate::error::{RelgraphError, Result};
use crate::orm::types::{Direction, ModelDescriptor, RelationshipDescriptor};

use async_graphql::{Name, Value};
use indexmap::IndexMap;

/// A single fetched row
pub type Row = Value;

/// Data access used by relationship and root query resolvers
pub trait RowLoader: Send + Sync {
    /// Load the rows of `target` related to `parent` through `relationship`
    fn load_related(
        &self,
        target: &ModelDescriptor,
        relationship: &RelationshipDescriptor,
        parent: &Row,
    ) -> Result<Vec<Row>>;

    /// Load every row of `model`
    fn load_all(&self, model: &ModelDescriptor) -> Result<Vec<Row>>;

    /// Load the row of `model` whose `column` equals `key`
    fn load_by_key(&self, model: &ModelDescriptor, column: &str, key: &Value) -> Result<Option<Row>> {
        Ok(self
            .load_all(model)?
            .into_iter()
            .find(|row| row_get(row, column).map(|v| same_key(v, key)).unwrap_or(false)))
    }
}

/// Read a column from a row object
pub fn row_get<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    match row {
        Value::Object(obj) => obj.get(column),
        _ => None,
    }
}

/// Key comparison that treats `1` and `"1"` as the same key
fn same_key(a: &Value, b: &Value) -> bool {
    match (key_string(a), key_string(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Enum(e) => Some(e.to_string()),
        _ => None,
    }
}

/// In-memory tables, keyed by table name
///
/// Used by the CLI `query` command and by tests. Relationships are followed by
/// comparing the parent's local columns with the target's remote columns.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: IndexMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tables from a JSON object of `{ "table": [ {row}, ... ] }`
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(tables) = json else {
            return Err(RelgraphError::Loader(
                "Data file must be a JSON object of table name to rows".to_string(),
            ));
        };

        let mut store = Self::new();
        for (table, rows) in tables {
            let serde_json::Value::Array(rows) = rows else {
                return Err(RelgraphError::Loader(format!(
                    "Table '{}' must be an array of rows",
                    table
                )));
            };
            for row in rows {
                let value = Value::from_json(row)?;
                store.insert(&table, value)?;
            }
        }

        tracing::debug!("Loaded {} tables into memory store", store.tables.len());
        Ok(store)
    }

    pub fn insert(&mut self, table: &str, row: Row) -> Result<()> {
        if !matches!(row, Value::Object(_)) {
            return Err(RelgraphError::Loader(format!(
                "Rows of table '{}' must be objects",
                table
            )));
        }
        self.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    /// Convenience for building rows in code
    pub fn insert_fields<const N: usize>(&mut self, table: &str, fields: [(&str, Value); N]) -> Result<()> {
        let row: IndexMap<Name, Value> = fields
            .into_iter()
            .map(|(k, v)| (Name::new(k), v))
            .collect();
        self.insert(table, Value::Object(row))
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(|rows| rows.as_slice()).unwrap_or(&[])
    }
}

impl RowLoader for MemoryStore {
    fn load_related(
        &self,
        target: &ModelDescriptor,
        relationship: &RelationshipDescriptor,
        parent: &Row,
    ) -> Result<Vec<Row>> {
        if relationship.direction == Direction::ManyToMany {
            return Err(RelgraphError::Loader(format!(
                "Memory store cannot follow many-to-many relationship '{}'",
                relationship.name
            )));
        }
        if relationship.local_columns.is_empty()
            || relationship.local_columns.len() != relationship.remote_columns.len()
        {
            return Err(RelgraphError::Loader(format!(
                "Relationship '{}' needs paired local and remote columns",
                relationship.name
            )));
        }

        let mut keys = Vec::with_capacity(relationship.local_columns.len());
        for local in &relationship.local_columns {
            match row_get(parent, local) {
                Some(Value::Null) | None => return Ok(Vec::new()),
                Some(value) => keys.push(value),
            }
        }

        let rows = self
            .rows(&target.table)
            .iter()
            .filter(|row| {
                relationship
                    .remote_columns
                    .iter()
                    .zip(&keys)
                    .all(|(remote, key)| row_get(row, remote).map(|v| same_key(v, key)).unwrap_or(false))
            })
            .cloned()
            .collect();

        Ok(rows)
    }

    fn load_all(&self, model: &ModelDescriptor) -> Result<Vec<Row>> {
        Ok(self.rows(&model.table).to_vec())
    }
}
