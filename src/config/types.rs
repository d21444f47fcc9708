use crate::orm::ModelDescriptor;
use serde::{Deserialize, Serialize};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mapper: MapperSettings,

    /// ORM models available to the mapper
    #[serde(default)]
    pub model: Vec<ModelDescriptor>,

    /// Types to register, in declaration order
    #[serde(default)]
    pub mapping: Vec<MappingConfig>,
}

/// Mapper-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperSettings {
    /// Suffix appended to object type names
    #[serde(default)]
    pub type_suffix: String,

    /// Suffix appended to interface names
    #[serde(default = "default_interface_suffix")]
    pub interface_suffix: String,

    /// Skip validation when constructing input instances
    #[serde(default)]
    pub postponed_validation: bool,
}

fn default_interface_suffix() -> String {
    "Interface".to_string()
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            type_suffix: String::new(),
            interface_suffix: default_interface_suffix(),
            postponed_validation: false,
        }
    }
}

/// Kind of type a mapping registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    Type,
    CreateInput,
    UpdateInput,
    Input,
}

/// One registration against the mapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Model class name
    pub model: String,

    #[serde(default = "default_kind")]
    pub kind: MappingKind,

    /// Columns and relationships left out of the generated type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub make_interface: bool,

    /// For `input` mappings: every field optional (update input)
    #[serde(default)]
    pub optional: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_kind() -> MappingKind {
    MappingKind::Type
}

impl MappingConfig {
    pub fn new(model: impl Into<String>, kind: MappingKind) -> Self {
        Self {
            model: model.into(),
            kind,
            exclude: Vec::new(),
            make_interface: false,
            optional: false,
            description: None,
        }
    }

    /// Validate mapping configuration
    pub fn validate(&self) -> Result<(), String> {
        // Model names are PascalCase identifiers
        if !self.model.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!("Model name '{}' must be alphanumeric", self.model));
        }

        if !self.model.chars().next().unwrap_or('_').is_uppercase() {
            return Err(format!(
                "Model name '{}' must start with uppercase letter (PascalCase)",
                self.model
            ));
        }

        if self.make_interface && self.kind != MappingKind::Type {
            return Err(format!(
                "Only object type mappings of '{}' can be made interfaces",
                self.model
            ));
        }

        if self.optional && self.kind != MappingKind::Input {
            return Err(format!(
                "'optional' only applies to input mappings of '{}'",
                self.model
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_validation_valid() {
        let mapping = MappingConfig::new("Employee", MappingKind::CreateInput);
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_mapping_validation_lowercase_model() {
        let mapping = MappingConfig::new("employee", MappingKind::Type);
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_mapping_validation_interface_on_input() {
        let mut mapping = MappingConfig::new("Employee", MappingKind::CreateInput);
        mapping.make_interface = true;
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_mapping_validation_optional_on_type() {
        let mut mapping = MappingConfig::new("Employee", MappingKind::Type);
        mapping.optional = true;
        assert!(mapping.validate().is_err());

        let mut mapping = MappingConfig::new("Employee", MappingKind::Input);
        mapping.optional = true;
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_kind_defaults_to_type() {
        let mapping: MappingConfig = toml::from_str("model = \"Employee\"").unwrap();
        assert_eq!(mapping.kind, MappingKind::Type);
        assert!(mapping.exclude.is_empty());
    }

    #[test]
    fn test_default_settings() {
        let settings = MapperSettings::default();
        assert_eq!(settings.type_suffix, "");
        assert_eq!(settings.interface_suffix, "Interface");
        assert!(!settings.postponed_validation);
    }
}
