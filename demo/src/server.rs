use std::time::Duration;

use typedconf::{config_type, ConfigValidator, NonEmptyString, ValidationError};

#[config_type(context_path = "server")]
pub trait ServerConfig {
    #[config_value(path = "host", validated_by(NonEmptyString))]
    fn host(&self) -> String;

    #[config_value(path = "port", validated_by = Port)]
    fn port(&self) -> i32;

    #[config_value(path = "timeout")]
    fn timeout(&self) -> Duration;

    #[config_value(path = "workers")]
    fn workers(&self) -> Option<i32>;

    #[config_value(path = "tags")]
    fn tags(&self) -> Vec<String>;

    fn address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}

/// Accepts TCP port numbers.
pub struct Port;

impl ConfigValidator<i32> for Port {
    fn validate(value: &i32) -> Vec<ValidationError> {
        if (1..=65535).contains(value) {
            Vec::new()
        } else {
            vec![ValidationError::new(format!("{value} is not a valid port"))]
        }
    }
}
