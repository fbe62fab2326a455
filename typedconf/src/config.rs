//! JSON-backed configuration tree addressed by dotted paths

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::{json_type, ConfigError};

/// Any value stored in the tree, unwrapped.
pub type AnyValue = Value;

/// A configuration tree.
///
/// Values are looked up by dotted path (`"server.http.port"`). Readers follow
/// the usual HOCON conventions: numbers and booleans can be read as strings,
/// numeric strings can be read as numbers, and durations are either
/// milliseconds or human readable strings such as `"30s"`.
///
/// An absent key and an explicit `null` both produce
/// [`ConfigError::Missing`]; a value of the wrong shape produces
/// [`ConfigError::WrongType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: Value,
}

/// A raw value read from the tree together with the path it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    origin: String,
    value: Value,
}

impl ConfigValue {
    /// Path the value was read from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// JSON type name of the value (`"string"`, `"list"`, ...).
    pub fn value_type(&self) -> &'static str {
        json_type(&self.value)
    }

    pub fn into_inner(self) -> Value {
        self.value
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}

impl Config {
    /// An empty tree.
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wrap a JSON value. The root must be an object.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(_) => Ok(Self { root: value }),
            other => Err(ConfigError::wrong_type("", "object", &other)),
        }
    }

    /// Parse a JSON document.
    pub fn parse_str(source: &str) -> Result<Self, ConfigError> {
        Self::parse_with_origin(source, "string")
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_with_origin(&source, &path.display().to_string())
    }

    fn parse_with_origin(source: &str, origin: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(source).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_value(value)
    }

    /// The whole tree as a JSON value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Whether a non-null value is stored at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.find(path).is_ok()
    }

    fn find(&self, path: &str) -> Result<&Value, ConfigError> {
        let keys = split_path(path)?;
        let mut node = &self.root;
        for (depth, key) in keys.iter().enumerate() {
            node = match node {
                Value::Object(map) => map.get(*key).ok_or_else(|| ConfigError::missing(path))?,
                Value::Null => return Err(ConfigError::missing(path)),
                other => return Err(ConfigError::wrong_type(keys[..depth].join("."), "object", other)),
            };
        }
        if node.is_null() {
            return Err(ConfigError::missing(path));
        }
        Ok(node)
    }

    fn list(&self, path: &str) -> Result<&Vec<Value>, ConfigError> {
        match self.find(path)? {
            Value::Array(items) => Ok(items),
            other => Err(ConfigError::wrong_type(path, "list", other)),
        }
    }

    fn list_of<T>(
        &self,
        path: &str,
        read: impl Fn(&str, &Value) -> Result<T, ConfigError>,
    ) -> Result<Vec<T>, ConfigError> {
        self.list(path)?
            .iter()
            .enumerate()
            .map(|(index, item)| read(&format!("{path}[{index}]"), item))
            .collect()
    }

    pub fn get_string(&self, path: &str) -> Result<String, ConfigError> {
        as_string(path, self.find(path)?)
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, ConfigError> {
        as_bool(path, self.find(path)?)
    }

    pub fn get_int(&self, path: &str) -> Result<i32, ConfigError> {
        as_int(path, self.find(path)?)
    }

    pub fn get_long(&self, path: &str) -> Result<i64, ConfigError> {
        as_long(path, self.find(path)?)
    }

    pub fn get_number(&self, path: &str) -> Result<Number, ConfigError> {
        as_number(path, self.find(path)?)
    }

    pub fn get_double(&self, path: &str) -> Result<f64, ConfigError> {
        as_double(path, self.find(path)?)
    }

    /// Read a duration. Integers are milliseconds, strings are parsed with
    /// `humantime` (`"30s"`, `"2h 5min"`).
    pub fn get_duration(&self, path: &str) -> Result<Duration, ConfigError> {
        as_duration(path, self.find(path)?)
    }

    /// Read the sub-tree at `path`. The empty path returns the whole tree.
    pub fn get_config(&self, path: &str) -> Result<Config, ConfigError> {
        as_config(path, self.find(path)?)
    }

    /// Read the raw value at `path`, keeping track of where it came from.
    pub fn get_value(&self, path: &str) -> Result<ConfigValue, ConfigError> {
        Ok(ConfigValue {
            origin: path.to_string(),
            value: self.find(path)?.clone(),
        })
    }

    /// Read whatever is stored at `path`.
    pub fn get_any(&self, path: &str) -> Result<AnyValue, ConfigError> {
        Ok(self.find(path)?.clone())
    }

    /// Read a string value and deserialize it into an enum.
    pub fn get_enum<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        match self.find(path)? {
            value @ Value::String(_) => deserialize(path, value),
            other => Err(ConfigError::wrong_type(path, "string", other)),
        }
    }

    /// Deserialize the sub-tree at `path` into an arbitrary type.
    pub fn get_bean<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        match self.find(path)? {
            value @ Value::Object(_) => deserialize(path, value),
            other => Err(ConfigError::wrong_type(path, "object", other)),
        }
    }

    pub fn get_string_list(&self, path: &str) -> Result<Vec<String>, ConfigError> {
        self.list_of(path, as_string)
    }

    pub fn get_bool_list(&self, path: &str) -> Result<Vec<bool>, ConfigError> {
        self.list_of(path, as_bool)
    }

    pub fn get_int_list(&self, path: &str) -> Result<Vec<i32>, ConfigError> {
        self.list_of(path, as_int)
    }

    pub fn get_long_list(&self, path: &str) -> Result<Vec<i64>, ConfigError> {
        self.list_of(path, as_long)
    }

    pub fn get_number_list(&self, path: &str) -> Result<Vec<Number>, ConfigError> {
        self.list_of(path, as_number)
    }

    pub fn get_double_list(&self, path: &str) -> Result<Vec<f64>, ConfigError> {
        self.list_of(path, as_double)
    }

    pub fn get_duration_list(&self, path: &str) -> Result<Vec<Duration>, ConfigError> {
        self.list_of(path, as_duration)
    }

    pub fn get_config_list(&self, path: &str) -> Result<Vec<Config>, ConfigError> {
        self.list_of(path, as_config)
    }

    pub fn get_any_list(&self, path: &str) -> Result<Vec<AnyValue>, ConfigError> {
        self.list_of(path, |_, value| Ok(value.clone()))
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, ConfigError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let keys: Vec<&str> = path.split('.').collect();
    if keys.iter().any(|key| key.trim().is_empty()) {
        return Err(ConfigError::BadPath {
            path: path.to_string(),
            message: "path contains an empty key".to_string(),
        });
    }
    Ok(keys)
}

fn deserialize<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T, ConfigError> {
    T::deserialize(value).map_err(|e| ConfigError::bad_value(path, e))
}

fn as_string(path: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConfigError::wrong_type(path, "string", other)),
    }
}

fn as_bool(path: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim() {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::bad_value(path, format!("'{other}' is not a boolean"))),
        },
        other => Err(ConfigError::wrong_type(path, "boolean", other)),
    }
}

fn as_long(path: &str, value: &Value) -> Result<i64, ConfigError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ConfigError::bad_value(path, format!("{n} is not a whole number in range of long"))),
        Value::String(s) => s.trim().parse::<i64>().map_err(|e| ConfigError::bad_value(path, e)),
        other => Err(ConfigError::wrong_type(path, "long", other)),
    }
}

fn as_int(path: &str, value: &Value) -> Result<i32, ConfigError> {
    let long = match value {
        Value::Number(_) | Value::String(_) => as_long(path, value)?,
        other => return Err(ConfigError::wrong_type(path, "int", other)),
    };
    i32::try_from(long).map_err(|_| ConfigError::bad_value(path, format!("{long} is out of range for int")))
}

fn as_double(path: &str, value: &Value) -> Result<f64, ConfigError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ConfigError::bad_value(path, format!("{n} cannot be represented as double"))),
        Value::String(s) => s.trim().parse::<f64>().map_err(|e| ConfigError::bad_value(path, e)),
        other => Err(ConfigError::wrong_type(path, "double", other)),
    }
}

fn as_number(path: &str, value: &Value) -> Result<Number, ConfigError> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        Value::String(s) => s.trim().parse::<Number>().map_err(|e| ConfigError::bad_value(path, e)),
        other => Err(ConfigError::wrong_type(path, "number", other)),
    }
}

fn as_duration(path: &str, value: &Value) -> Result<Duration, ConfigError> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(millis) => Ok(Duration::from_millis(millis)),
            None => match n.as_f64() {
                Some(millis) if millis >= 0.0 => Ok(Duration::from_secs_f64(millis / 1000.0)),
                _ => Err(ConfigError::bad_value(path, format!("{n} is not a valid duration"))),
            },
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(millis) = s.parse::<u64>() {
                return Ok(Duration::from_millis(millis));
            }
            humantime::parse_duration(s).map_err(|e| ConfigError::bad_value(path, e))
        }
        other => Err(ConfigError::wrong_type(path, "duration", other)),
    }
}

fn as_config(path: &str, value: &Value) -> Result<Config, ConfigError> {
    match value {
        Value::Object(_) => Ok(Config { root: value.clone() }),
        other => Err(ConfigError::wrong_type(path, "object", other)),
    }
}
