use typedconf::{config_type, AnyValue, NonEmptyCollection};

use crate::database::DatabaseConfig;
use crate::server::ServerConfig;

#[config_type(context_path = "features")]
pub trait FeatureConfig {
    #[config_value(path = "enabled", validated_by(NonEmptyCollection))]
    fn enabled(&self) -> Vec<String>;

    #[config_value(path = "extra")]
    fn extra(&self) -> Option<AnyValue>;

    fn is_enabled(&self, feature: &str) -> bool {
        self.enabled().iter().any(|name| name == feature)
    }
}

/// Everything the application needs, as one trait object.
#[config_type]
pub trait AppConfig: ServerConfig + DatabaseConfig + FeatureConfig {}
