mod types;

pub use types::{Config, MapperSettings, MappingConfig, MappingKind};

use crate::error::{RelgraphError, Result};
use crate::mapper::{Mapper, NamingPolicy, TypeSkeleton};
use crate::orm::Catalog;
use crate::validation::{ValidatingMapper, ValidationMode};
use std::fs;

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(|e| RelgraphError::Config(format!("Failed to read config file '{}': {}", path, e)))?;

    let config: Config = toml::from_str(&contents)?;
    config.validate()?;

    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    config.validate()?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string)
        .map_err(|e| RelgraphError::Config(format!("Failed to write config file '{}': {}", path, e)))?;

    Ok(())
}

impl Config {
    /// Validate every mapping and check it names a declared model
    pub fn validate(&self) -> Result<()> {
        for mapping in &self.mapping {
            mapping.validate().map_err(RelgraphError::Config)?;

            if !self.model.iter().any(|m| m.name == mapping.model) {
                return Err(RelgraphError::Config(format!(
                    "Mapping references undeclared model '{}'",
                    mapping.model
                )));
            }
        }
        Ok(())
    }

    /// Catalog of the declared models
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::from_models(self.model.iter().cloned())
    }

    pub fn validation_mode(&self) -> ValidationMode {
        if self.mapper.postponed_validation {
            ValidationMode::Postponed
        } else {
            ValidationMode::Eager
        }
    }

    /// Register every mapping and finalize
    pub fn build_mapper(&self) -> Result<Mapper> {
        let mut mapper = self.unfinalized_mapper()?;
        for mapping in &self.mapping {
            let skeleton = skeleton(mapping);
            match mapping.kind {
                MappingKind::Type => mapper.type_(&mapping.model, skeleton)?,
                MappingKind::CreateInput => mapper.create_input(&mapping.model, skeleton)?,
                MappingKind::UpdateInput => mapper.update_input(&mapping.model, skeleton)?,
                MappingKind::Input => mapper.input(&mapping.model, skeleton)?,
            };
        }
        mapper.finalize()?;
        Ok(mapper)
    }

    /// Register every mapping through a validating mapper and finalize it
    pub fn build_validating_mapper(&self) -> Result<ValidatingMapper> {
        let mut mapper = ValidatingMapper::new(self.unfinalized_mapper()?, self.validation_mode());
        for mapping in &self.mapping {
            let skeleton = skeleton(mapping);
            match mapping.kind {
                MappingKind::Type => mapper.type_(&mapping.model, skeleton)?,
                MappingKind::CreateInput => mapper.create_input(&mapping.model, skeleton)?,
                MappingKind::UpdateInput => mapper.update_input(&mapping.model, skeleton)?,
                MappingKind::Input => mapper.input(&mapping.model, skeleton)?,
            };
        }
        mapper.finalize()?;
        Ok(mapper)
    }

    fn unfinalized_mapper(&self) -> Result<Mapper> {
        let naming = NamingPolicy::with_suffixes(&self.mapper.type_suffix, &self.mapper.interface_suffix);
        Ok(Mapper::new(self.catalog()?, naming))
    }
}

fn skeleton(mapping: &MappingConfig) -> TypeSkeleton {
    let mut skeleton = TypeSkeleton::new().exclude_all(mapping.exclude.iter().cloned());
    if mapping.make_interface {
        skeleton = skeleton.make_interface();
    }
    if mapping.optional {
        skeleton = skeleton.optional();
    }
    if let Some(description) = &mapping.description {
        skeleton = skeleton.description(description.clone());
    }
    skeleton
}
