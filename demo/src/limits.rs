use std::time::Duration;

use typedconf::{config_type, AnyValue, Config, ConfigValue, Number};

/// Tuning knobs. Between them they read every kind of value the built-in
/// mappers support that the other modules do not already use.
#[config_type(context_path = "limits")]
pub trait LimitsConfig {
    #[config_value(path = "debug")]
    fn debug(&self) -> bool;

    #[config_value(path = "max_bytes")]
    fn max_bytes(&self) -> i64;

    #[config_value(path = "ratio")]
    fn ratio(&self) -> f64;

    #[config_value(path = "threshold")]
    fn threshold(&self) -> Number;

    #[config_value(path = "overrides")]
    fn overrides(&self) -> Config;

    #[config_value(path = "raw")]
    fn raw(&self) -> ConfigValue;

    #[config_value(path = "retry_delays")]
    fn retry_delays(&self) -> Vec<Duration>;

    #[config_value(path = "flags")]
    fn flags(&self) -> Vec<bool>;

    #[config_value(path = "ports")]
    fn ports(&self) -> Vec<i32>;

    #[config_value(path = "sizes")]
    fn sizes(&self) -> Vec<i64>;

    #[config_value(path = "weights")]
    fn weights(&self) -> Vec<Number>;

    #[config_value(path = "factors")]
    fn factors(&self) -> Vec<f64>;

    #[config_value(path = "shards")]
    fn shards(&self) -> Vec<Config>;

    #[config_value(path = "labels")]
    fn labels(&self) -> Vec<AnyValue>;
}
