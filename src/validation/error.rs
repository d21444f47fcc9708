use serde::Serialize;
use thiserror::Error;

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path to the offending value: field names and list indexes
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new(loc: Vec<String>, msg: impl Into<String>) -> Self {
        Self { loc, msg: msg.into() }
    }
}

/// Every failed check of one model validation
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}", self.render())]
pub struct ValidationError {
    pub model: String,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            model: model.into(),
            errors,
        }
    }

    /// `N validation error(s) for Model`, then each location and message
    fn render(&self) -> String {
        let plural = if self.errors.len() == 1 { "" } else { "s" };
        let mut out = format!("{} validation error{} for {}", self.errors.len(), plural, self.model);
        for error in &self.errors {
            let loc = if error.loc.is_empty() {
                "__root__".to_string()
            } else {
                error.loc.join(" -> ")
            };
            out.push_str(&format!("\n{}\n  {}", loc, error.msg));
        }
        out
    }

    /// Errors located at `field` (first path segment)
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.loc.first().map(String::as_str) == Some(field))
    }
}
