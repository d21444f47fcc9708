/// Polymorphic inheritance helpers

use crate::error::Result;
use crate::orm::{row_get, Catalog, ModelDescriptor, Row};

use async_graphql::Value;
use std::sync::Arc;

/// The model or one of its ancestors declares a discriminator column
pub fn is_polymorphic(catalog: &Catalog, model: &ModelDescriptor) -> Result<bool> {
    Ok(catalog
        .ancestry(model)?
        .iter()
        .any(|m| m.polymorphic_on.is_some()))
}

/// The model declares a discriminator and has no mapped parent
pub fn is_interface(model: &ModelDescriptor) -> bool {
    model.polymorphic_on.is_some() && model.parent.is_none()
}

/// Root of the model's inheritance chain (the model itself when it has no parent)
pub fn base_model_for(catalog: &Catalog, model: &ModelDescriptor) -> Result<Arc<ModelDescriptor>> {
    let mut current = Arc::clone(catalog.get(&model.name)?);
    let mut seen = vec![current.name.clone()];

    while let Some(parent) = catalog.parent_of(&current)? {
        if seen.contains(&parent.name) {
            break;
        }
        seen.push(parent.name.clone());
        current = Arc::clone(parent);
    }

    Ok(current)
}

/// Model within `base`'s hierarchy whose polymorphic identity matches the row's
/// discriminator value
pub fn concrete_model_for(
    catalog: &Catalog,
    base: &ModelDescriptor,
    row: &Row,
) -> Option<Arc<ModelDescriptor>> {
    let discriminator = base.polymorphic_on.as_deref()?;
    let identity = match row_get(row, discriminator)? {
        Value::String(s) => s.clone(),
        Value::Enum(e) => e.to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    std::iter::once(catalog.find(&base.name)?.clone())
        .chain(catalog.descendants_of(&base.name))
        .find(|m| m.polymorphic_identity.as_deref() == Some(identity.as_str()))
}
