/// Validation adapter for generated input types
///
/// Wraps create / update inputs into validation models with lax coercion,
/// validating either on construction or on an explicit `check()`.

mod adapter;
mod coerce;
mod error;
mod model;

pub use adapter::ValidatingMapper;
pub use error::{FieldError, ValidationError};
pub use model::{ModelInstance, ValidationField, ValidationMode, ValidationModel, ValidationSchema};
