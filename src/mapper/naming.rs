/// Naming policy for generated types
///
/// The two model-level policies are injectable; every other name is derived from
/// them so callers only have to resolve collisions in one place.

use crate::mapper::types::TypeKind;
use crate::orm::ModelDescriptor;

use std::fmt;
use std::sync::Arc;

pub type NameFn = Arc<dyn Fn(&ModelDescriptor) -> String + Send + Sync>;

#[derive(Clone)]
pub struct NamingPolicy {
    model_to_type_name: NameFn,
    model_to_interface_name: NameFn,
}

impl NamingPolicy {
    pub fn new(model_to_type_name: NameFn, model_to_interface_name: NameFn) -> Self {
        Self {
            model_to_type_name,
            model_to_interface_name,
        }
    }

    /// `{Model}{suffix}` for types, `{Model}{interface_suffix}` for interfaces
    pub fn with_suffixes(type_suffix: &str, interface_suffix: &str) -> Self {
        let type_suffix = type_suffix.to_string();
        let interface_suffix = interface_suffix.to_string();
        Self::new(
            Arc::new(move |model: &ModelDescriptor| format!("{}{}", model.name, type_suffix)),
            Arc::new(move |model: &ModelDescriptor| format!("{}{}", model.name, interface_suffix)),
        )
    }

    /// Append `suffix` to type names, keeping the default interface names
    pub fn with_type_suffix(suffix: &str) -> Self {
        Self::with_suffixes(suffix, "Interface")
    }

    pub fn with_type_name<F>(mut self, policy: F) -> Self
    where
        F: Fn(&ModelDescriptor) -> String + Send + Sync + 'static,
    {
        self.model_to_type_name = Arc::new(policy);
        self
    }

    pub fn with_interface_name<F>(mut self, policy: F) -> Self
    where
        F: Fn(&ModelDescriptor) -> String + Send + Sync + 'static,
    {
        self.model_to_interface_name = Arc::new(policy);
        self
    }

    pub fn type_name(&self, model: &ModelDescriptor) -> String {
        (self.model_to_type_name)(model)
    }

    pub fn interface_name(&self, model: &ModelDescriptor) -> String {
        (self.model_to_interface_name)(model)
    }

    /// Input names hang off the type name: `{TypeName}CreateInput`
    pub fn input_name(&self, model: &ModelDescriptor, kind: TypeKind) -> String {
        let base = self.type_name(model);
        match kind {
            TypeKind::UpdateInput => format!("{}UpdateInput", base),
            _ => format!("{}CreateInput", base),
        }
    }
}

pub fn edge_name(type_name: &str) -> String {
    format!("{}Edge", type_name)
}

pub fn connection_name(type_name: &str) -> String {
    format!("{}Connection", type_name)
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::with_suffixes("", "Interface")
    }
}

impl fmt::Debug for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingPolicy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let model = ModelDescriptor::new("Employee", "employee");
        let naming = NamingPolicy::default();
        assert_eq!(naming.type_name(&model), "Employee");
        assert_eq!(naming.interface_name(&model), "EmployeeInterface");
    }

    #[test]
    fn test_input_names_follow_type_policy() {
        let model = ModelDescriptor::new("Parent", "parent");
        let naming = NamingPolicy::default().with_type_name(|m| format!("{}Type", m.name));
        assert_eq!(naming.input_name(&model, TypeKind::CreateInput), "ParentTypeCreateInput");
        assert_eq!(naming.input_name(&model, TypeKind::UpdateInput), "ParentTypeUpdateInput");
    }

    #[test]
    fn test_type_suffix() {
        let model = ModelDescriptor::new("Employee", "employee");
        let naming = NamingPolicy::with_type_suffix("Type");
        assert_eq!(naming.type_name(&model), "EmployeeType");
        assert_eq!(naming.interface_name(&model), "EmployeeInterface");
        assert_eq!(naming.input_name(&model, TypeKind::CreateInput), "EmployeeTypeCreateInput");
    }

    #[test]
    fn test_wrapper_names() {
        assert_eq!(edge_name("Employee"), "EmployeeEdge");
        assert_eq!(connection_name("Employee"), "EmployeeConnection");
    }
}
