use crate::error::Result;
use crate::mapper::connection::ConnectionResolver;
use crate::orm::{RelationshipDescriptor, Row};

use async_graphql::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a generated type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Object,
    Interface,
    CreateInput,
    UpdateInput,
    Edge,
    Connection,
}

impl TypeKind {
    pub fn is_input(&self) -> bool {
        matches!(self, TypeKind::CreateInput | TypeKind::UpdateInput)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::CreateInput => "create input",
            TypeKind::UpdateInput => "update input",
            TypeKind::Edge => "edge",
            TypeKind::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// A reference to a generated type whose name is only known after finalize
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingRef {
    /// Object (or interface) type of a model
    Object { model: String },
    /// Connection type wrapping the object type of a model
    Connection { model: String },
    /// Input type of the given kind for a model
    Input { model: String, kind: TypeKind },
}

impl PendingRef {
    pub fn model(&self) -> &str {
        match self {
            PendingRef::Object { model }
            | PendingRef::Connection { model }
            | PendingRef::Input { model, .. } => model,
        }
    }
}

impl fmt::Display for PendingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingRef::Object { model } => write!(f, "<{} object>", model),
            PendingRef::Connection { model } => write!(f, "<{} connection>", model),
            PendingRef::Input { model, kind } => write!(f, "<{} {}>", model, kind),
        }
    }
}

/// Schema-level type of a field
///
/// `Named` and `List` are non-null; nullability is expressed by wrapping in
/// `Optional`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Named(String),
    Optional(Box<SchemaType>),
    List(Box<SchemaType>),
    Pending(PendingRef),
}

impl SchemaType {
    pub fn named(name: impl Into<String>) -> Self {
        SchemaType::Named(name.into())
    }

    pub fn optional(inner: SchemaType) -> Self {
        match inner {
            already @ SchemaType::Optional(_) => already,
            other => SchemaType::Optional(Box::new(other)),
        }
    }

    pub fn list(inner: SchemaType) -> Self {
        SchemaType::List(Box::new(inner))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SchemaType::Optional(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            SchemaType::Optional(inner) => inner.is_list(),
            SchemaType::List(_) => true,
            _ => false,
        }
    }

    /// Innermost type name, if resolved
    pub fn named_type(&self) -> Option<&str> {
        match self {
            SchemaType::Named(name) => Some(name),
            SchemaType::Optional(inner) | SchemaType::List(inner) => inner.named_type(),
            SchemaType::Pending(_) => None,
        }
    }

    /// Innermost pending reference, if unresolved
    pub fn pending(&self) -> Option<&PendingRef> {
        match self {
            SchemaType::Pending(pending) => Some(pending),
            SchemaType::Optional(inner) | SchemaType::List(inner) => inner.pending(),
            SchemaType::Named(_) => None,
        }
    }

    /// Replace the pending token (if any) by the name `resolve` returns
    pub fn resolve_pending<F>(&mut self, resolve: &mut F) -> Result<()>
    where
        F: FnMut(&PendingRef) -> Result<String>,
    {
        match self {
            SchemaType::Pending(pending) => {
                let name = resolve(pending)?;
                *self = SchemaType::Named(name);
                Ok(())
            }
            SchemaType::Optional(inner) | SchemaType::List(inner) => inner.resolve_pending(resolve),
            SchemaType::Named(_) => Ok(()),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Named(name) => write!(f, "{}!", name),
            SchemaType::Pending(pending) => write!(f, "{}!", pending),
            SchemaType::List(inner) => write!(f, "[{}]!", inner),
            SchemaType::Optional(inner) => {
                let rendered = inner.to_string();
                f.write_str(rendered.strip_suffix('!').unwrap_or(&rendered))
            }
        }
    }
}

/// Caller supplied field computation
pub type ComputeFn = Arc<dyn Fn(&Row) -> Result<Value> + Send + Sync>;

/// How an output field obtains its value
#[derive(Clone)]
pub enum FieldResolver {
    /// Read the attribute of the same name from the parent row
    Attribute,
    /// Load a to-one relationship through the row loader
    Related(RelationshipDescriptor),
    /// Load a to-many relationship and wrap it as a connection
    Connection(ConnectionResolver),
    Computed(ComputeFn),
    /// Input fields
    None,
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldResolver::Attribute => f.write_str("Attribute"),
            FieldResolver::Related(rel) => f.debug_tuple("Related").field(&rel.name).finish(),
            FieldResolver::Connection(conn) => f
                .debug_tuple("Connection")
                .field(&conn.relationship().name)
                .finish(),
            FieldResolver::Computed(_) => f.write_str("Computed(..)"),
            FieldResolver::None => f.write_str("None"),
        }
    }
}

/// A field of a generated type
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: SchemaType,
    pub default: Option<Value>,
    pub resolver: FieldResolver,
    /// Synthesized by the mapper rather than declared by the caller
    pub generated: bool,
    pub description: Option<String>,
}

impl FieldSpec {
    /// A caller-declared field
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            resolver: FieldResolver::Attribute,
            generated: false,
            description: None,
        }
    }

    pub(crate) fn generated(name: impl Into<String>, ty: SchemaType, resolver: FieldResolver) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            resolver,
            generated: true,
            description: None,
        }
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn computed<F>(mut self, compute: F) -> Self
    where
        F: Fn(&Row) -> Result<Value> + Send + Sync + 'static,
    {
        self.resolver = FieldResolver::Computed(Arc::new(compute));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A synthesized schema type
#[derive(Debug, Clone)]
pub struct GeneratedType {
    pub(crate) name: String,
    pub(crate) model: Option<String>,
    pub(crate) kind: TypeKind,
    pub(crate) fields: IndexMap<String, FieldSpec>,
    pub(crate) exclude: Vec<String>,
    pub(crate) generated_field_keys: Vec<String>,
    pub(crate) implements: Vec<String>,
    pub(crate) is_generated_connection: bool,
    pub(crate) explicit: bool,
    pub(crate) description: Option<String>,
}

impl GeneratedType {
    pub(crate) fn new(name: impl Into<String>, model: Option<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            model,
            kind,
            fields: IndexMap::new(),
            exclude: Vec::new(),
            generated_field_keys: Vec::new(),
            implements: Vec::new(),
            is_generated_connection: false,
            explicit: false,
            description: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning model (the target model for edges and connections)
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_input(&self) -> bool {
        self.kind.is_input()
    }

    pub fn is_generated_connection(&self) -> bool {
        self.is_generated_connection
    }

    /// Registered by a caller, as opposed to created by the engine while finalizing
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn generated_field_keys(&self) -> &[String] {
        &self.generated_field_keys
    }

    pub fn implements(&self) -> &[String] {
        &self.implements
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.fields.values().any(|f| f.ty.pending().is_some())
    }

    /// Add a synthesized field unless the name is already taken
    pub(crate) fn push_generated(&mut self, field: FieldSpec) {
        if self.fields.contains_key(&field.name) {
            return;
        }
        self.generated_field_keys.push(field.name.clone());
        self.fields.insert(field.name.clone(), field);
    }
}

/// Caller-authored declaration a generated type is built from
///
/// Declared fields win over anything the mapper would synthesize under the same
/// name; excluded names are never synthesized.
#[derive(Debug, Clone, Default)]
pub struct TypeSkeleton {
    pub(crate) fields: IndexMap<String, FieldSpec>,
    pub(crate) exclude: Vec<String>,
    pub(crate) make_interface: bool,
    pub(crate) optional: bool,
    pub(crate) description: Option<String>,
}

impl TypeSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    pub fn exclude_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Treat the model as the root of an interface hierarchy
    pub fn make_interface(mut self) -> Self {
        self.make_interface = true;
        self
    }

    /// For `input`: produce the update-shaped (all optional) variant
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
