use crate::error::{RelgraphError, Result};
use crate::mapper::scalars::{BIG_INT, BOOLEAN, DATE, DATE_TIME, DECIMAL, FLOAT, INT, INTERVAL, JSON, TIME, UUID};
use crate::mapper::{GeneratedType, SchemaType};
use crate::validation::coerce::{coerce, object_fields};
use crate::validation::error::{FieldError, ValidationError};

use async_graphql::{Name, Value};
use indexmap::IndexMap;
use serde_json::json;
use std::sync::Arc;

/// Eager or postponed validation of constructed instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Validate when the instance is constructed
    #[default]
    Eager,
    /// Store raw values; validate on `ModelInstance::check`
    Postponed,
}

/// A field of a validation model
#[derive(Debug, Clone)]
pub struct ValidationField {
    pub name: String,
    pub ty: SchemaType,
    pub default: Option<Value>,
}

impl ValidationField {
    /// Must be present: neither optional nor defaulted
    pub fn is_required(&self) -> bool {
        !self.ty.is_optional() && self.default.is_none()
    }
}

/// Strict validation model derived from a generated input type
#[derive(Debug, Clone)]
pub struct ValidationModel {
    name: String,
    model: Option<String>,
    fields: IndexMap<String, ValidationField>,
    generated_field_keys: Vec<String>,
    description: Option<String>,
}

impl ValidationModel {
    pub(crate) fn from_input(input: &GeneratedType) -> Self {
        let fields = input
            .fields()
            .map(|f| {
                let field = ValidationField {
                    name: f.name.clone(),
                    ty: f.ty.clone(),
                    default: f.default.clone(),
                };
                (f.name.clone(), field)
            })
            .collect();

        Self {
            name: input.name().to_string(),
            model: input.model().map(String::from),
            fields,
            generated_field_keys: input.generated_field_keys().to_vec(),
            description: input.description().map(String::from),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// ORM model the input was generated for
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &ValidationField> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&ValidationField> {
        self.fields.get(name)
    }

    pub fn generated_field_keys(&self) -> &[String] {
        &self.generated_field_keys
    }

    /// JSON schema of the model (`title`, `type`, `properties`, `required`)
    ///
    /// Nested inputs are referenced as `#/definitions/{name}`.
    pub fn json_schema(&self, schema: &ValidationSchema) -> serde_json::Value {
        let mut nested = Vec::new();
        let mut document = self.schema_document(schema, &mut nested);

        let mut definitions = serde_json::Map::new();
        let mut seen = vec![self.name.clone()];
        while let Some(name) = nested.pop() {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name.clone());
            if let Some(model) = schema.model(&name) {
                let definition = model.schema_document(schema, &mut nested);
                definitions.insert(name, serde_json::Value::Object(definition));
            }
        }
        if !definitions.is_empty() {
            document.insert("definitions".to_string(), serde_json::Value::Object(definitions));
        }

        serde_json::Value::Object(document)
    }

    fn schema_document(
        &self,
        schema: &ValidationSchema,
        nested: &mut Vec<String>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for field in self.fields.values() {
            let mut property = serde_json::Map::new();
            property.insert("title".to_string(), json!(title_case(&field.name)));
            property.extend(type_schema(schema, &field.ty, nested));
            if let Some(default) = field.default.as_ref().filter(|d| **d != Value::Null) {
                if let Ok(default) = default.clone().into_json() {
                    property.insert("default".to_string(), default);
                }
            }
            if field.is_required() {
                required.push(json!(field.name));
            }
            properties.insert(field.name.clone(), serde_json::Value::Object(property));
        }

        let mut document = serde_json::Map::new();
        document.insert("title".to_string(), json!(self.name));
        if let Some(description) = &self.description {
            document.insert("description".to_string(), json!(description));
        }
        document.insert("type".to_string(), json!("object"));
        document.insert("properties".to_string(), serde_json::Value::Object(properties));
        if !required.is_empty() {
            document.insert("required".to_string(), serde_json::Value::Array(required));
        }
        document
    }
}

fn type_schema(
    schema: &ValidationSchema,
    ty: &SchemaType,
    nested: &mut Vec<String>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut out = serde_json::Map::new();
    match ty {
        SchemaType::Optional(inner) => return type_schema(schema, inner, nested),
        SchemaType::List(inner) => {
            out.insert("type".to_string(), json!("array"));
            out.insert(
                "items".to_string(),
                serde_json::Value::Object(type_schema(schema, inner, nested)),
            );
        }
        SchemaType::Named(name) => {
            if let Some(values) = schema.enum_values(name) {
                out.insert("enum".to_string(), json!(values));
                out.insert("type".to_string(), json!("string"));
            } else if schema.model(name).is_some() {
                nested.push(name.clone());
                out.insert("$ref".to_string(), json!(format!("#/definitions/{}", name)));
            } else {
                let (json_type, format) = match name.as_str() {
                    INT | BIG_INT => ("integer", None),
                    FLOAT | DECIMAL => ("number", None),
                    BOOLEAN => ("boolean", None),
                    DATE => ("string", Some("date")),
                    DATE_TIME => ("string", Some("date-time")),
                    TIME => ("string", Some("time")),
                    UUID => ("string", Some("uuid")),
                    INTERVAL => ("string", Some("duration")),
                    JSON => return out,
                    _ => ("string", None),
                };
                out.insert("type".to_string(), json!(json_type));
                if let Some(format) = format {
                    out.insert("format".to_string(), json!(format));
                }
            }
        }
        SchemaType::Pending(_) => {}
    }
    out
}

/// `first_name` -> `First Name`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Finalized set of validation models
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    models: IndexMap<String, ValidationModel>,
    enums: IndexMap<String, Vec<String>>,
    mode: ValidationMode,
}

impl ValidationSchema {
    pub(crate) fn new(
        models: IndexMap<String, ValidationModel>,
        enums: IndexMap<String, Vec<String>>,
        mode: ValidationMode,
    ) -> Self {
        Self { models, enums, mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn model(&self, name: &str) -> Option<&ValidationModel> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ValidationModel> {
        self.models.values()
    }

    pub(crate) fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    /// Validate `values` against the model named `name`
    ///
    /// # Returns
    ///
    /// Coerced values plus the names of the fields the caller actually set
    pub fn validate(
        &self,
        name: &str,
        values: &Value,
    ) -> std::result::Result<(IndexMap<Name, Value>, Vec<String>), ValidationError> {
        let Some(fields) = object_fields(values) else {
            return Err(ValidationError::new(
                name,
                vec![FieldError::new(Vec::new(), format!("value is not a valid {}", name))],
            ));
        };
        self.validate_fields(name, fields, &[])
            .map_err(|errors| ValidationError::new(name, errors))
    }

    pub(crate) fn validate_fields(
        &self,
        name: &str,
        values: &IndexMap<Name, Value>,
        loc: &[String],
    ) -> std::result::Result<(IndexMap<Name, Value>, Vec<String>), Vec<FieldError>> {
        let Some(model) = self.models.get(name) else {
            return Err(vec![FieldError::new(loc.to_vec(), format!("unknown model {}", name))]);
        };

        let mut coerced = IndexMap::new();
        let mut fields_set = Vec::new();
        let mut errors = Vec::new();

        for field in model.fields.values() {
            let mut field_loc = loc.to_vec();
            field_loc.push(field.name.clone());

            match values.get(field.name.as_str()) {
                Some(value) => {
                    if let Some(value) = coerce(self, &field.ty, value, &field_loc, &mut errors) {
                        coerced.insert(Name::new(&field.name), value);
                        fields_set.push(field.name.clone());
                    }
                }
                None if field.is_required() => errors.push(FieldError::new(field_loc, "field required")),
                None => {
                    let default = field.default.clone().unwrap_or(Value::Null);
                    coerced.insert(Name::new(&field.name), default);
                }
            }
        }

        if errors.is_empty() {
            Ok((coerced, fields_set))
        } else {
            Err(errors)
        }
    }

    /// Build an instance of `name`; eager schemas validate immediately
    pub fn construct(schema: &Arc<Self>, name: &str, values: Value) -> Result<ModelInstance> {
        if !schema.models.contains_key(name) {
            return Err(RelgraphError::SchemaGeneration(format!(
                "No validation model named '{}'",
                name
            )));
        }

        let mut instance = ModelInstance {
            schema: Arc::clone(schema),
            name: name.to_string(),
            values: object_fields(&values).cloned().unwrap_or_default(),
            raw: values,
            fields_set: Vec::new(),
            validated: false,
        };

        if schema.mode == ValidationMode::Eager {
            instance.check()?;
        }
        Ok(instance)
    }
}

/// Values bound to a validation model
#[derive(Debug, Clone)]
pub struct ModelInstance {
    schema: Arc<ValidationSchema>,
    name: String,
    raw: Value,
    values: IndexMap<Name, Value>,
    fields_set: Vec<String>,
    validated: bool,
}

impl ModelInstance {
    /// Validate the current values
    ///
    /// On failure the instance is left untouched. On success its values are
    /// replaced by the coerced ones.
    pub fn check(&mut self) -> Result<()> {
        let current = match &self.raw {
            Value::Object(_) => Value::Object(self.values.clone()),
            other => other.clone(),
        };
        let (values, fields_set) = self.schema.validate(&self.name, &current)?;

        self.raw = Value::Object(values.clone());
        self.values = values;
        self.fields_set = fields_set;
        self.validated = true;
        Ok(())
    }

    /// Replace one value in place; the instance must be checked again
    pub fn set(&mut self, field: &str, value: Value) {
        if !matches!(self.raw, Value::Object(_)) {
            self.raw = Value::Object(IndexMap::new());
        }
        self.values.insert(Name::new(field), value);
        self.validated = false;
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &IndexMap<Name, Value> {
        &self.values
    }

    /// Fields supplied by the caller, as of the last successful check
    pub fn fields_set(&self) -> &[String] {
        &self.fields_set
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn model(&self) -> Option<&ValidationModel> {
        self.schema.model(&self.name)
    }

    pub fn model_name(&self) -> &str {
        &self.name
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::scalars::STRING;

    fn schema(mode: ValidationMode) -> Arc<ValidationSchema> {
        let mut fields = IndexMap::new();
        fields.insert(
            "name".to_string(),
            ValidationField {
                name: "name".into(),
                ty: SchemaType::named(STRING),
                default: None,
            },
        );
        fields.insert(
            "first_day".to_string(),
            ValidationField {
                name: "first_day".into(),
                ty: SchemaType::optional(SchemaType::named(DATE)),
                default: Some(Value::Null),
            },
        );
        let model = ValidationModel {
            name: "EmployeeCreateInput".into(),
            model: Some("Employee".into()),
            fields,
            generated_field_keys: vec!["name".into(), "first_day".into()],
            description: None,
        };
        let mut models = IndexMap::new();
        models.insert(model.name.clone(), model);
        Arc::new(ValidationSchema::new(models, IndexMap::new(), mode))
    }

    fn object(json: serde_json::Value) -> Value {
        Value::from_json(json).unwrap()
    }

    #[test]
    fn test_eager_rejects_invalid() {
        let schema = schema(ValidationMode::Eager);
        let err = ValidationSchema::construct(&schema, "EmployeeCreateInput", object(json!({ "name": [1, 2] })))
            .unwrap_err();
        match err {
            RelgraphError::Validation(err) => {
                assert_eq!(err.model, "EmployeeCreateInput");
                assert_eq!(err.errors[0].loc, vec!["name".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_optional_takes_default() {
        let schema = schema(ValidationMode::Eager);
        let instance = ValidationSchema::construct(&schema, "EmployeeCreateInput", object(json!({ "name": "foo", "extra": 1 })))
            .unwrap();
        assert_eq!(instance.get("first_day"), Some(&Value::Null));
        assert_eq!(instance.fields_set(), &["name".to_string()]);
        assert!(instance.get("extra").is_none());
    }

    #[test]
    fn test_missing_required() {
        let schema = schema(ValidationMode::Eager);
        let err = ValidationSchema::construct(&schema, "EmployeeCreateInput", object(json!({}))).unwrap_err();
        assert!(err.to_string().contains("field required"));
    }

    #[test]
    fn test_postponed_check_and_fix() {
        let schema = schema(ValidationMode::Postponed);
        let mut instance = ValidationSchema::construct(&schema, "EmployeeCreateInput", object(json!({ "name": { "nested": true } })))
            .unwrap();
        assert!(!instance.is_validated());

        assert!(instance.check().is_err());
        assert_eq!(instance.get("name"), Some(&object(json!({ "nested": true }))));

        instance.set("name", Value::Number(5.into()));
        instance.check().unwrap();
        assert!(instance.is_validated());
        assert_eq!(instance.get("name"), Some(&Value::String("5".into())));
    }

    #[test]
    fn test_json_schema_properties() {
        let schema = schema(ValidationMode::Eager);
        let document = schema.model("EmployeeCreateInput").unwrap().json_schema(&schema);
        assert_eq!(
            document["properties"]["name"],
            json!({ "title": "Name", "type": "string" })
        );
        assert_eq!(
            document["properties"]["first_day"],
            json!({ "title": "First Day", "type": "string", "format": "date" })
        );
        assert_eq!(document["required"], json!(["name"]));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("department_id"), "Department Id");
        assert_eq!(title_case("name"), "Name");
    }
}
