//! Typed configuration accessors generated at build time
//!
//! `typedconf` lets an application describe its configuration as a set of plain
//! traits spread over any number of modules. A build script
//! (see the `typedconf-build` crate) merges every trait marked with
//! `#[config_type]` into one generated struct that implements all of them,
//! reads every value eagerly from a [`Config`] tree and runs every declared
//! validator before handing the instance out.
//!
//! This crate holds everything the generated code refers to at runtime: the
//! configuration tree, the mappers that read typed values from it, the
//! validator trait with a few stock validators, and the error types.
//!
//! # Features
//!
//! - **Declarative**: accessors are trait methods annotated with `#[config_value]`
//! - **Composable**: traits from independent modules merge into one struct
//! - **Fail fast**: values are read and validated once, in the constructor
//! - **Aggregated validation**: every failure is reported at once, not just the first
//! - **Optional values**: `Option<T>` accessors read as `None` when the path is missing
//!
//! # Declaring configuration
//!
//! ```rust
//! use std::time::Duration;
//! use typedconf::{config_type, NonEmptyString};
//!
//! #[config_type(context_path = "server")]
//! pub trait ServerConfig {
//!     #[config_value(path = "host", validated_by(NonEmptyString))]
//!     fn host(&self) -> String;
//!
//!     #[config_value(path = "timeout")]
//!     fn timeout(&self) -> Duration;
//!
//!     #[config_value(path = "workers")]
//!     fn workers(&self) -> Option<i32>;
//!
//!     // Provided methods need no annotation
//!     fn describe(&self) -> String {
//!         format!("{} ({:?})", self.host(), self.timeout())
//!     }
//! }
//! ```
//!
//! # Wiring the generated struct
//!
//! The build script runs the generator over the crate sources:
//!
//! ```rust,ignore
//! // build.rs
//! fn main() {
//!     if let Err(diagnostics) = typedconf_build::Generator::new().source_dir("src").generate() {
//!         diagnostics.report();
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! and the crate pulls the result in once, next to the traits:
//!
//! ```rust,ignore
//! typedconf::include_config!();
//!
//! let config = typedconf::Config::load("app.json")?;
//! let global = GlobalConfig::new(&config)?;
//! println!("{}", global.host());
//! ```
//!
//! # Attributes
//!
//! ## `#[config_type(...)]`
//!
//! - `context_path = "a.b"`: prefix prepended to every property path of the trait
//! - `validated_by(A, B)`: validators implementing `ConfigValidator<dyn Trait>`,
//!   applied to the fully built instance
//! - `bean_fallback`: deserialize accessor types outside the built-in table with
//!   serde instead of rejecting them
//!
//! ## `#[config_value(...)]`
//!
//! - `path = "key"` (required): location of the value, relative to `context_path`
//! - `mapper = M`: a type implementing [`ConfigMapper<T>`] for the accessor type
//! - `validated_by(A, B)` or `validated_by = A`: validators implementing
//!   [`ConfigValidator<T>`]
//!
//! # Supported types
//!
//! `String`, `bool`, `i32`, `i64`, `f64`, [`Number`], [`std::time::Duration`],
//! [`Config`], [`ConfigValue`], [`AnyValue`], a `Vec` of any of these except
//! [`ConfigValue`], every `enum` implementing `serde::Deserialize`, and each
//! of them wrapped in `Option`.

mod config;
mod error;
pub mod mappers;
mod validators;

pub use config::{AnyValue, Config, ConfigValue};
pub use error::{ConfigError, Error};
pub use mappers::{ConfigMapper, NoMapper};
pub use serde_json::Number;
pub use typedconf_derive::{config_type, config_value};
pub use validators::{
    ConfigValidationError, ConfigValidator, NoValidation, NonEmptyCollection, NonEmptyString,
    ValidationError,
};

/// Types that can be built from a configuration tree.
///
/// Implemented by the generated configuration struct.
pub trait FromConfig: Sized {
    fn from_config(config: &Config) -> Result<Self, Error>;
}

/// Include the configuration struct generated by the build script.
///
/// Expands to an `include!` of `$OUT_DIR/typedconf.rs`, or of the given file
/// name when the generator was configured with a different one.
#[macro_export]
macro_rules! include_config {
    () => {
        include!(concat!(env!("OUT_DIR"), "/typedconf.rs"));
    };
    ($file:literal) => {
        include!(concat!(env!("OUT_DIR"), "/", $file));
    };
}
