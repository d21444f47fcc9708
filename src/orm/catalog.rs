use crate::error::{RelgraphError, Result};
use crate::orm::types::{ColumnDescriptor, ModelDescriptor, RelationshipDescriptor};

use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of mapped model classes, keyed by class name
///
/// Relationship targets and inheritance parents are stored by name and looked up
/// here, so cyclic model graphs need no shared ownership cycles.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: IndexMap<String, Arc<ModelDescriptor>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of models
    pub fn from_models(models: impl IntoIterator<Item = ModelDescriptor>) -> Result<Self> {
        let mut catalog = Self::new();
        for model in models {
            catalog.add(model)?;
        }
        Ok(catalog)
    }

    pub fn add(&mut self, model: ModelDescriptor) -> Result<Arc<ModelDescriptor>> {
        if self.models.contains_key(&model.name) {
            return Err(RelgraphError::Config(format!(
                "Model '{}' is declared twice",
                model.name
            )));
        }
        let model = Arc::new(model);
        self.models.insert(model.name.clone(), Arc::clone(&model));
        Ok(model)
    }

    pub fn get(&self, name: &str) -> Result<&Arc<ModelDescriptor>> {
        self.models
            .get(name)
            .ok_or_else(|| RelgraphError::UnknownModel(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&Arc<ModelDescriptor>> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Mapped parent of `model`, if any
    pub fn parent_of(&self, model: &ModelDescriptor) -> Result<Option<&Arc<ModelDescriptor>>> {
        match &model.parent {
            Some(parent) => self.get(parent).map(Some),
            None => Ok(None),
        }
    }

    /// Inheritance chain of `model`, root first, `model` last
    pub fn ancestry(&self, model: &ModelDescriptor) -> Result<Vec<Arc<ModelDescriptor>>> {
        let mut chain = vec![Arc::clone(self.get(&model.name)?)];
        let mut current = Arc::clone(&chain[0]);

        while let Some(parent) = self.parent_of(&current)? {
            if chain.iter().any(|m| m.name == parent.name) {
                return Err(RelgraphError::Config(format!(
                    "Inheritance cycle through model '{}'",
                    parent.name
                )));
            }
            chain.push(Arc::clone(parent));
            current = Arc::clone(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Inherited and own columns, in declaration order
    pub fn all_columns(&self, model: &ModelDescriptor) -> Result<Vec<ColumnDescriptor>> {
        Ok(self
            .ancestry(model)?
            .iter()
            .flat_map(|m| m.columns.iter().cloned())
            .collect())
    }

    /// Inherited and own relationships, in declaration order
    pub fn all_relationships(&self, model: &ModelDescriptor) -> Result<Vec<RelationshipDescriptor>> {
        Ok(self
            .ancestry(model)?
            .iter()
            .flat_map(|m| m.relationships.iter().cloned())
            .collect())
    }

    pub fn primary_key(&self, model: &ModelDescriptor) -> Result<Vec<ColumnDescriptor>> {
        Ok(self
            .all_columns(model)?
            .into_iter()
            .filter(|c| c.primary_key)
            .collect())
    }

    /// Every model inheriting (directly or not) from `name`
    pub fn descendants_of(&self, name: &str) -> Vec<Arc<ModelDescriptor>> {
        let mut found: Vec<Arc<ModelDescriptor>> = Vec::new();
        let mut frontier = vec![name.to_string()];

        while let Some(current) = frontier.pop() {
            for model in self.models.values() {
                if model.parent.as_deref() == Some(current.as_str())
                    && !found.iter().any(|m| m.name == model.name)
                {
                    frontier.push(model.name.clone());
                    found.push(Arc::clone(model));
                }
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::types::ColumnType;

    fn hierarchy() -> Catalog {
        Catalog::from_models(vec![
            ModelDescriptor::new("Employee", "employee")
                .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
                .column(ColumnDescriptor::new("type", ColumnType::String))
                .polymorphic_on("type"),
            ModelDescriptor::new("Lawyer", "employee")
                .inherits("Employee")
                .column(ColumnDescriptor::new("bar_number", ColumnType::String)),
            ModelDescriptor::new("ParaLegal", "employee")
                .inherits("Lawyer")
                .column(ColumnDescriptor::new("supervisor", ColumnType::String)),
        ])
        .unwrap()
    }

    #[test]
    fn test_ancestry_is_root_first() {
        let catalog = hierarchy();
        let leaf = catalog.get("ParaLegal").unwrap();
        let names: Vec<_> = catalog
            .ancestry(leaf)
            .unwrap()
            .iter()
            .map(|m| m.name.clone())
            .collect();
        assert_eq!(names, vec!["Employee", "Lawyer", "ParaLegal"]);
    }

    #[test]
    fn test_all_columns_include_inherited() {
        let catalog = hierarchy();
        let leaf = catalog.get("ParaLegal").unwrap();
        let names: Vec<_> = catalog
            .all_columns(leaf)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["id", "type", "bar_number", "supervisor"]);
    }

    #[test]
    fn test_primary_key_is_inherited() {
        let catalog = hierarchy();
        let lawyer = catalog.get("Lawyer").unwrap();
        let pk = catalog.primary_key(lawyer).unwrap();
        assert_eq!(pk.len(), 1);
        assert_eq!(pk[0].name, "id");
    }

    #[test]
    fn test_descendants() {
        let catalog = hierarchy();
        let names: Vec<_> = catalog
            .descendants_of("Employee")
            .iter()
            .map(|m| m.name.clone())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Lawyer".to_string()));
        assert!(names.contains(&"ParaLegal".to_string()));
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let result = Catalog::from_models(vec![
            ModelDescriptor::new("A", "a"),
            ModelDescriptor::new("A", "a"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_parent() {
        let catalog =
            Catalog::from_models(vec![ModelDescriptor::new("Orphan", "orphan").inherits("Missing")])
                .unwrap();
        let orphan = catalog.get("Orphan").unwrap();
        assert!(matches!(
            catalog.ancestry(orphan),
            Err(RelgraphError::UnknownModel(name)) if name == "Missing"
        ));
    }
}
