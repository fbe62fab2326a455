use serde::Deserialize;
use typedconf::{config_type, Config, ConfigError, ConfigMapper, ConfigValidator, NonEmptyString, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Mode {
    Primary,
    Replica,
}

/// Read with serde through `bean_fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Connection pool bounds, written as `"min..max"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSize {
    pub min: u32,
    pub max: u32,
}

pub struct PoolMapper;

impl ConfigMapper<PoolSize> for PoolMapper {
    fn apply(config: &Config, path: &str) -> Result<PoolSize, ConfigError> {
        let text = config.get_string(path)?;
        let (min, max) = text
            .split_once("..")
            .ok_or_else(|| ConfigError::bad_value(path, format!("expected 'min..max', found '{text}'")))?;
        let parse = |bound: &str| {
            bound
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::bad_value(path, format!("invalid pool bound '{bound}': {e}")))
        };
        let size = PoolSize {
            min: parse(min)?,
            max: parse(max)?,
        };
        if size.min > size.max {
            return Err(ConfigError::bad_value(path, format!("pool minimum {} exceeds maximum {}", size.min, size.max)));
        }
        Ok(size)
    }
}

#[config_type(context_path = "database", bean_fallback, validated_by(ReplicaCheck))]
pub trait DatabaseConfig {
    #[config_value(path = "url", validated_by(NonEmptyString))]
    fn url(&self) -> String;

    #[config_value(path = "mode")]
    fn mode(&self) -> Mode;

    #[config_value(path = "replicas")]
    fn replicas(&self) -> Option<Vec<String>>;

    #[config_value(path = "credentials")]
    fn credentials(&self) -> Credentials;

    #[config_value(path = "pool", mapper = PoolMapper)]
    fn pool(&self) -> PoolSize;
}

/// A replica needs to know which primaries to follow.
pub struct ReplicaCheck;

impl ConfigValidator<dyn DatabaseConfig> for ReplicaCheck {
    fn validate(config: &(dyn DatabaseConfig + 'static)) -> Vec<ValidationError> {
        let replicas = config.replicas().unwrap_or_default();
        if config.mode() == Mode::Replica && replicas.is_empty() {
            vec![ValidationError::new("replica mode requires at least one replica")]
        } else {
            Vec::new()
        }
    }
}
