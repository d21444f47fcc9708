use serde::{Deserialize, Serialize};

/// Storage type of a mapped column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    SmallInteger,
    BigInteger,
    Float,
    Numeric,
    String,
    Text,
    Boolean,
    Date,
    DateTime,
    Time,
    Interval,
    Uuid,
    Json,
    Enum(EnumDescriptor),
    Array(Box<ColumnType>),
    /// Storage type the mapper does not know how to convert
    Other(String),
}

impl ColumnType {
    /// Name used in error messages and logs
    pub fn storage_name(&self) -> String {
        match self {
            ColumnType::Integer => "integer".to_string(),
            ColumnType::SmallInteger => "small_integer".to_string(),
            ColumnType::BigInteger => "big_integer".to_string(),
            ColumnType::Float => "float".to_string(),
            ColumnType::Numeric => "numeric".to_string(),
            ColumnType::String => "string".to_string(),
            ColumnType::Text => "text".to_string(),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime => "date_time".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Interval => "interval".to_string(),
            ColumnType::Uuid => "uuid".to_string(),
            ColumnType::Json => "json".to_string(),
            ColumnType::Enum(e) => format!("enum({})", e.name),
            ColumnType::Array(inner) => format!("array({})", inner.storage_name()),
            ColumnType::Other(name) => name.clone(),
        }
    }
}

/// Enumerated column values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    #[serde(default = "default_nullable")]
    pub nullable: bool,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub autoincrement: bool,

    /// Server or client side default exists
    #[serde(default)]
    pub has_default: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDescriptor {
    /// New nullable column without key or default
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            primary_key: false,
            autoincrement: false,
            has_default: false,
        }
    }

    /// Mark as primary key (implies not null)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Relationship direction as seen from the declaring model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    OneToMany,
    ManyToOne,
    OneToOne,
    ManyToMany,
}

impl Direction {
    pub fn is_to_many(&self) -> bool {
        matches!(self, Direction::OneToMany | Direction::ManyToMany)
    }
}

/// Relationship metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    pub name: String,

    /// Target model name
    pub target: String,

    pub direction: Direction,

    /// Columns on the declaring model taking part in the join
    #[serde(default)]
    pub local_columns: Vec<String>,

    /// Columns on the target model, paired with `local_columns`
    #[serde(default)]
    pub remote_columns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_populates: Option<String>,
}

impl RelationshipDescriptor {
    pub fn new(name: impl Into<String>, target: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            direction,
            local_columns: Vec::new(),
            remote_columns: Vec::new(),
            back_populates: None,
        }
    }

    pub fn one_to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, Direction::OneToMany)
    }

    pub fn many_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, Direction::ManyToOne)
    }

    /// Join `local` on the declaring model with `remote` on the target
    pub fn join(mut self, local: impl Into<String>, remote: impl Into<String>) -> Self {
        self.local_columns.push(local.into());
        self.remote_columns.push(remote.into());
        self
    }

    pub fn back_populates(mut self, name: impl Into<String>) -> Self {
        self.back_populates = Some(name.into());
        self
    }
}

/// A mapped ORM model class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Class name
    pub name: String,

    pub table: String,

    /// Columns declared on this class (inherited columns live on the parents)
    #[serde(default, rename = "column")]
    pub columns: Vec<ColumnDescriptor>,

    #[serde(default, rename = "relationship")]
    pub relationships: Vec<RelationshipDescriptor>,

    /// Mapped parent class for inheritance hierarchies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Discriminator column of a polymorphic hierarchy root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polymorphic_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polymorphic_identity: Option<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: Vec::new(),
            relationships: Vec::new(),
            parent: None,
            polymorphic_on: None,
            polymorphic_identity: None,
        }
    }

    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn relationship(mut self, relationship: RelationshipDescriptor) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Declare a mapped parent class
    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn polymorphic_on(mut self, column: impl Into<String>) -> Self {
        self.polymorphic_on = Some(column.into());
        self
    }

    pub fn polymorphic_identity(mut self, identity: impl Into<String>) -> Self {
        self.polymorphic_identity = Some(identity.into());
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}
