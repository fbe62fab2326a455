//! Strategies that read one typed value from a [`Config`] tree
//!
//! Generated readers call these through fully qualified syntax, e.g.
//! `<StringM as ConfigMapper<String>>::apply(config, "server.host")`. The
//! generator only ever picks from this closed set, from [`EnumM`] / [`BeanM`],
//! or from a user type named with `mapper = ...`.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Number;

use crate::config::{AnyValue, Config, ConfigValue};
use crate::error::ConfigError;

/// Reads a value of type `T` from `config` at `path`.
///
/// Implement this for a unit struct and reference it with
/// `#[config_value(path = "...", mapper = MyMapper)]` to read types the
/// built-in table does not cover.
pub trait ConfigMapper<T> {
    fn apply(config: &Config, path: &str) -> Result<T, ConfigError>;
}

/// Sentinel meaning "no custom mapper". Filtered out at generation time;
/// applied directly it returns the tree unchanged.
pub struct NoMapper;

impl ConfigMapper<Config> for NoMapper {
    fn apply(config: &Config, _path: &str) -> Result<Config, ConfigError> {
        Ok(config.clone())
    }
}

macro_rules! tree_mappers {
    ($($(#[$meta:meta])* $name:ident => $ty:ty, $getter:ident;)*) => {
        $(
            $(#[$meta])*
            pub struct $name;

            impl ConfigMapper<$ty> for $name {
                fn apply(config: &Config, path: &str) -> Result<$ty, ConfigError> {
                    config.$getter(path)
                }
            }
        )*
    };
}

tree_mappers! {
    /// `String`
    StringM => String, get_string;
    /// `std::time::Duration`
    DurationM => Duration, get_duration;
    /// `bool`
    BooleanM => bool, get_bool;
    /// `i32`
    IntM => i32, get_int;
    /// `i64`
    LongM => i64, get_long;
    /// `typedconf::Number`
    NumberM => Number, get_number;
    /// `f64`
    DoubleM => f64, get_double;
    /// `typedconf::Config`, the sub-tree at the path
    ConfigM => Config, get_config;
    /// `typedconf::ConfigValue`, the raw value at the path
    ConfigValueM => ConfigValue, get_value;
    /// `typedconf::AnyValue`
    AnyRefM => AnyValue, get_any;
    /// `Vec<String>`
    StringListM => Vec<String>, get_string_list;
    /// `Vec<Duration>`
    DurationListM => Vec<Duration>, get_duration_list;
    /// `Vec<bool>`
    BooleanListM => Vec<bool>, get_bool_list;
    /// `Vec<i32>`
    IntListM => Vec<i32>, get_int_list;
    /// `Vec<i64>`
    LongListM => Vec<i64>, get_long_list;
    /// `Vec<Number>`
    NumberListM => Vec<Number>, get_number_list;
    /// `Vec<f64>`
    DoubleListM => Vec<f64>, get_double_list;
    /// `Vec<Config>`
    ConfigListM => Vec<Config>, get_config_list;
    /// `Vec<AnyValue>`
    AnyRefListM => Vec<AnyValue>, get_any_list;
}

/// Reads a string and deserializes it into the enum `T`.
pub struct EnumM<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> ConfigMapper<T> for EnumM<T> {
    fn apply(config: &Config, path: &str) -> Result<T, ConfigError> {
        config.get_enum(path)
    }
}

/// Deserializes the sub-tree at the path into `T`. Used for accessor types
/// outside the built-in table when the config type opts into `bean_fallback`.
pub struct BeanM<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> ConfigMapper<T> for BeanM<T> {
    fn apply(config: &Config, path: &str) -> Result<T, ConfigError> {
        config.get_bean(path)
    }
}
