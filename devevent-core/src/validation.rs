//! Validation error types
//!
//! A single [`ValidationError`] describes one violated field. Record
//! preparation never stops at the first problem: every violation is
//! gathered into a [`ValidationFailure`] and handed back together.

use thiserror::Error;

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is missing or blank
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Sequence field has no items
    #[error("{field} must contain at least one item")]
    Empty { field: &'static str },

    /// Field exceeds maximum length (in characters)
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// String doesn't match the expected grammar (date, time, email)
    #[error("{field}: {reason}")]
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value is not one of the allowed enum variants
    #[error("invalid {field} value '{value}': must be one of {allowed}")]
    InvalidVariant {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidVariant { field, .. } => field,
        }
    }

    /// True for malformed date/time/email strings.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. })
    }
}

/// Every field violation found while preparing one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", joined(.errors))]
pub struct ValidationFailure {
    errors: Vec<ValidationError>,
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationFailure) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Whether any violation names `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// Violations for a single field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field() == field)
    }

    /// Ok(value) when nothing was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationFailure {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationFailure {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

fn joined(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 100,
        };
        assert_eq!(err.to_string(), "title cannot exceed 100 characters");

        let err = ValidationError::InvalidVariant {
            field: "mode",
            value: "remote".into(),
            allowed: "online, offline, hybrid",
        };
        assert_eq!(
            err.to_string(),
            "invalid mode value 'remote': must be one of online, offline, hybrid"
        );
    }

    #[test]
    fn failure_collects_every_violation() {
        let mut failure = ValidationFailure::new();
        failure.push(ValidationError::Required { field: "title" });
        failure.push(ValidationError::Empty { field: "tags" });

        assert_eq!(failure.len(), 2);
        assert!(failure.contains("title"));
        assert!(failure.contains("tags"));
        assert!(!failure.contains("agenda"));
        assert_eq!(
            failure.to_string(),
            "title is required; tags must contain at least one item"
        );
    }

    #[test]
    fn into_result_passes_through_when_empty() {
        assert_eq!(ValidationFailure::new().into_result(7), Ok(7));

        let failure = ValidationFailure::from(ValidationError::Required { field: "email" });
        assert!(failure.into_result(()).is_err());
    }
}
