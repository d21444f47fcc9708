use crate::error::{RelgraphError, Result};
use crate::mapper::{Mapper, TypeSkeleton};
use crate::validation::model::{ModelInstance, ValidationMode, ValidationModel, ValidationSchema};

use async_graphql::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Mapper whose input types double as validation models
///
/// Inputs registered through the adapter are wrapped into `ValidationModel`s when
/// it finalizes; output types pass straight through to the inner mapper.
#[derive(Debug)]
pub struct ValidatingMapper {
    mapper: Mapper,
    mode: ValidationMode,
    wrapped: Vec<String>,
    schema: Option<Arc<ValidationSchema>>,
}

impl ValidatingMapper {
    pub fn new(mapper: Mapper, mode: ValidationMode) -> Self {
        Self {
            mapper,
            mode,
            wrapped: Vec::new(),
            schema: None,
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Inner mapper, for registrations that bypass validation
    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    pub fn into_mapper(self) -> Mapper {
        self.mapper
    }

    pub fn type_(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        self.mapper.type_(model, skeleton)
    }

    pub fn create_input(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        let name = self.mapper.create_input(model, skeleton)?;
        self.wrap(&name);
        Ok(name)
    }

    pub fn update_input(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        let name = self.mapper.update_input(model, skeleton)?;
        self.wrap(&name);
        Ok(name)
    }

    pub fn input(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        let name = self.mapper.input(model, skeleton)?;
        self.wrap(&name);
        Ok(name)
    }

    fn wrap(&mut self, name: &str) {
        self.schema = None;
        if !self.wrapped.iter().any(|w| w == name) {
            self.wrapped.push(name.to_string());
        }
    }

    /// Finalize the mapper, then build the validation models
    ///
    /// # Errors
    ///
    /// `ForwardReference` when a wrapped input nests an input that was not
    /// registered through this adapter.
    pub fn finalize(&mut self) -> Result<Arc<ValidationSchema>> {
        self.mapper.finalize()?;

        let mut models = IndexMap::new();
        for name in &self.wrapped {
            let input = self
                .mapper
                .input_type(name)
                .ok_or_else(|| RelgraphError::SchemaGeneration(format!("Input '{}' is not registered", name)))?;

            for field in input.fields() {
                if let Some(reference) = field.ty.named_type() {
                    if self.mapper.input_type(reference).is_some() && !self.wrapped.iter().any(|w| w == reference) {
                        return Err(RelgraphError::ForwardReference {
                            type_name: name.clone(),
                            field: field.name.clone(),
                            reference: reference.to_string(),
                        });
                    }
                }
            }

            models.insert(name.clone(), ValidationModel::from_input(input));
        }

        let enums = self
            .mapper
            .enums()
            .map(|e| (e.name.clone(), e.values.clone()))
            .collect();

        tracing::info!("Built {} validation models ({:?} validation)", models.len(), self.mode);
        let schema = Arc::new(ValidationSchema::new(models, enums, self.mode));
        self.schema = Some(Arc::clone(&schema));
        Ok(schema)
    }

    /// Validation schema of the last finalize
    pub fn schema(&self) -> Option<&Arc<ValidationSchema>> {
        self.schema.as_ref()
    }

    /// Construct an instance of the validation model `type_name`
    pub fn construct(&self, type_name: &str, values: Value) -> Result<ModelInstance> {
        let schema = self.schema.as_ref().ok_or_else(|| {
            RelgraphError::SchemaGeneration("Validating mapper is not finalized".to_string())
        })?;
        ValidationSchema::construct(schema, type_name, values)
    }
}
