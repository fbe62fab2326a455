//! Validators applied by generated constructors

use std::fmt;

/// Checks a value read from the configuration and reports every problem found.
///
/// Validators are referenced by type in `validated_by(...)` and are never
/// instantiated, so implementations are usually unit structs. Field-level
/// validators are implemented for the accessor's return type; type-level
/// validators are implemented for `dyn Trait` and receive the fully built
/// configuration through that trait.
///
/// ```rust
/// use typedconf::{ConfigValidator, ValidationError};
///
/// pub struct Port;
///
/// impl ConfigValidator<i32> for Port {
///     fn validate(value: &i32) -> Vec<ValidationError> {
///         if (1..=65535).contains(value) {
///             Vec::new()
///         } else {
///             vec![ValidationError::new(format!("{value} is not a valid port"))]
///         }
///     }
/// }
///
/// assert_eq!(Port::validate(&0).len(), 1);
/// ```
pub trait ConfigValidator<T: ?Sized> {
    fn validate(value: &T) -> Vec<ValidationError>;
}

/// Sentinel meaning "no validation". Filtered out at generation time.
pub struct NoValidation;

impl<T: ?Sized> ConfigValidator<T> for NoValidation {
    fn validate(_value: &T) -> Vec<ValidationError> {
        Vec::new()
    }
}

/// Rejects strings that are empty or only whitespace.
pub struct NonEmptyString;

impl ConfigValidator<String> for NonEmptyString {
    fn validate(value: &String) -> Vec<ValidationError> {
        if value.trim().is_empty() {
            vec![ValidationError::new("cannot be empty")]
        } else {
            Vec::new()
        }
    }
}

impl ConfigValidator<Option<String>> for NonEmptyString {
    fn validate(value: &Option<String>) -> Vec<ValidationError> {
        match value {
            Some(value) => <Self as ConfigValidator<String>>::validate(value),
            None => Vec::new(),
        }
    }
}

/// Rejects empty lists.
pub struct NonEmptyCollection;

impl<T> ConfigValidator<Vec<T>> for NonEmptyCollection {
    fn validate(value: &Vec<T>) -> Vec<ValidationError> {
        if value.is_empty() {
            vec![ValidationError::new("cannot be empty")]
        } else {
            Vec::new()
        }
    }
}

/// A single validation failure, optionally annotated with the configuration
/// type and field it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
    type_name: Option<String>,
    field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            type_name: None,
            field: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Attribute the error to a configuration type.
    pub fn with_type_info(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Attribute the error to a field of a configuration type.
    pub fn with_field_info(mut self, type_name: impl Into<String>, field: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.type_name, &self.field) {
            (Some(type_name), Some(field)) => write!(
                f,
                "Type: '{type_name}', Field: '{field}', Error: '{}'",
                self.message
            ),
            (Some(type_name), None) => write!(f, "Type: '{type_name}', Error: '{}'", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Raised by a generated constructor once all validators ran and at least one
/// of them reported a problem. Carries every error, in the order found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Config validation failed with the following errors:\n<<--\n{}\n-->>", bullets(.errors))]
pub struct ConfigValidationError {
    errors: Vec<ValidationError>,
}

impl ConfigValidationError {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

fn bullets(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|error| format!("|\t* {error}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_string() {
        assert!(NonEmptyString::validate(&"value".to_string()).is_empty());
        assert_eq!(
            NonEmptyString::validate(&"   ".to_string()),
            vec![ValidationError::new("cannot be empty")]
        );
        assert!(<NonEmptyString as ConfigValidator<Option<String>>>::validate(&None).is_empty());
    }

    #[test]
    fn test_non_empty_collection() {
        assert!(NonEmptyCollection::validate(&vec![1]).is_empty());
        assert_eq!(NonEmptyCollection::validate(&Vec::<String>::new()).len(), 1);
    }

    #[test]
    fn test_no_validation_accepts_anything() {
        assert!(<NoValidation as ConfigValidator<str>>::validate("").is_empty());
    }

    #[test]
    fn test_error_annotations() {
        let error = ValidationError::new("cannot be empty");
        assert_eq!(error.to_string(), "cannot be empty");
        assert_eq!(
            error.clone().with_type_info("crate::Server").to_string(),
            "Type: 'crate::Server', Error: 'cannot be empty'"
        );
        assert_eq!(
            error.with_field_info("crate::Server", "host").to_string(),
            "Type: 'crate::Server', Field: 'host', Error: 'cannot be empty'"
        );
    }

    #[test]
    fn test_aggregate_message_has_one_bullet_per_error() {
        let error = ConfigValidationError::new(vec![
            ValidationError::new("first").with_field_info("crate::A", "a"),
            ValidationError::new("second").with_type_info("crate::A"),
        ]);
        assert_eq!(
            error.to_string(),
            "Config validation failed with the following errors:\n<<--\n\
             |\t* Type: 'crate::A', Field: 'a', Error: 'first'\n\
             |\t* Type: 'crate::A', Error: 'second'\n\
             -->>"
        );
    }
}
