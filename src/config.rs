//! Configuration sources for seeding an application registry.
//!
//! Values come from environment variables, JSON documents or in-memory maps,
//! are looked up through a [`ConfigProvider`] in priority order, and become
//! named registry entries via [`ConfigProvider::to_args`] or
//! [`Application::from_config`](crate::Application::from_config).

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::args::Args;
use crate::error::{DiError, DiResult};
use crate::value::Value;

/// A configuration value that can be various types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ConfigValue>),
    Object(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Parses a raw string the way environment values are parsed: integer,
    /// then float, then boolean, else string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            ConfigValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }

    pub fn as_string(&self) -> DiResult<&str> {
        match self {
            ConfigValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("config value is not a string")),
        }
    }

    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            ConfigValue::Integer(i) => Ok(*i),
            _ => Err(DiError::TypeMismatch("config value is not an integer")),
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_f64(&self) -> DiResult<f64> {
        match self {
            ConfigValue::Float(f) => Ok(*f),
            ConfigValue::Integer(i) => Ok(*i as f64),
            _ => Err(DiError::TypeMismatch("config value is not a number")),
        }
    }

    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            _ => Err(DiError::TypeMismatch("config value is not a boolean")),
        }
    }

    /// Interprets an integer as milliseconds.
    pub fn as_duration_ms(&self) -> DiResult<Duration> {
        let ms = self.as_i64()?;
        if ms < 0 {
            return Err(DiError::TypeMismatch("duration cannot be negative"));
        }
        Ok(Duration::from_millis(ms as u64))
    }

    /// Converts into a registry value.
    ///
    /// Scalars become primitives (`String`, `i64`, `f64`, `bool`); arrays
    /// and objects stay `ConfigValue`s, which are object instances.
    pub fn into_value(self) -> Value {
        match self {
            ConfigValue::String(s) => Value::new(s),
            ConfigValue::Integer(i) => Value::new(i),
            ConfigValue::Float(f) => Value::new(f),
            ConfigValue::Boolean(b) => Value::new(b),
            other => Value::new(other),
        }
    }
}

/// Where configuration values come from.
pub trait ConfigSource: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// All keys this source can answer for.
    fn keys(&self) -> Vec<String>;
}

/// Environment variables, optionally filtered by a prefix.
///
/// With prefix `app`, key `database_url` reads `APP_DATABASE_URL`.
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn variable_name(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        env::var(self.variable_name(key))
            .ok()
            .map(|raw| ConfigValue::parse(&raw))
    }

    fn keys(&self) -> Vec<String> {
        // Names that are not valid UTF-8 cannot be config keys; skip them
        env::vars_os()
            .filter_map(|(name, _)| name.into_string().ok())
            .filter_map(|name| match &self.prefix {
                Some(prefix) => {
                    let prefix = format!("{}_", prefix.to_uppercase());
                    name.strip_prefix(&prefix).map(str::to_lowercase)
                }
                None => Some(name.to_lowercase()),
            })
            .collect()
    }
}

/// Fixed in-memory values, mostly for tests and defaults.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigSource {
    values: BTreeMap<String, ConfigValue>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }
}

impl ConfigSource for MemoryConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Top-level keys of a JSON object.
#[derive(Debug, Clone)]
pub struct JsonConfigSource {
    values: BTreeMap<String, ConfigValue>,
}

impl JsonConfigSource {
    /// Parses a JSON object.
    ///
    /// Fails with [`DiError::InvalidConfig`] for malformed JSON, a non-object
    /// document, or `null` values.
    pub fn from_json(json: &str) -> DiResult<Self> {
        let values = serde_json::from_str(json)
            .map_err(|e| DiError::InvalidConfig(e.to_string()))?;
        Ok(Self { values })
    }

    /// Reads and parses a JSON file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}

impl ConfigSource for JsonConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Configuration sources queried in priority order.
///
/// Sources added first win. Successful lookups are cached until
/// [`invalidate_cache`](Self::invalidate_cache).
///
/// # Examples
///
/// ```rust
/// use modular_di::{
///     Application, ConfigProvider, ConfigValue, JsonConfigSource, MemoryConfigSource,
/// };
///
/// let mut config = ConfigProvider::new();
/// config.add_source(Box::new(MemoryConfigSource::new().with("port", ConfigValue::Integer(9000))));
/// config.add_source(Box::new(
///     JsonConfigSource::from_json(r#"{"port": 8080, "host": "localhost"}"#).unwrap(),
/// ));
///
/// assert_eq!(config.get_i64("port").unwrap(), 9000);
/// assert_eq!(config.get_string("host").unwrap(), "localhost");
///
/// let app = Application::from_config(&config).unwrap();
/// assert_eq!(*app.registry().named::<i64>("port").unwrap(), 9000);
/// ```
pub struct ConfigProvider {
    sources: Vec<Box<dyn ConfigSource>>,
    cache: RwLock<BTreeMap<String, ConfigValue>>,
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("sources", &self.sources)
            .finish()
    }
}

impl ConfigProvider {
    /// A provider with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Adds a source below every source added so far.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) -> &mut Self {
        self.sources.push(source);
        self.invalidate_cache();
        self
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        if let Ok(cache) = self.cache.read() {
            if let Some(value) = cache.get(key) {
                return Some(value.clone());
            }
        }

        let value = self.sources.iter().find_map(|source| source.get(key))?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key.to_string(), value.clone());
        }
        Some(value)
    }

    pub fn get_or_default(&self, key: &str, default: ConfigValue) -> ConfigValue {
        self.get(key).unwrap_or(default)
    }

    fn require(&self, key: &str) -> DiResult<ConfigValue> {
        self.get(key)
            .ok_or_else(|| DiError::NotFound(crate::Key::named(key.to_string())))
    }

    pub fn get_string(&self, key: &str) -> DiResult<String> {
        self.require(key)?.as_string().map(str::to_string)
    }

    pub fn get_i64(&self, key: &str) -> DiResult<i64> {
        self.require(key)?.as_i64()
    }

    pub fn get_bool(&self, key: &str) -> DiResult<bool> {
        self.require(key)?.as_bool()
    }

    pub fn get_duration_ms(&self, key: &str) -> DiResult<Duration> {
        self.require(key)?.as_duration_ms()
    }

    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Every key any source answers for, sorted and deduplicated.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sources.iter().flat_map(|s| s.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Every entry as a named value, each resolved in priority order.
    pub fn to_args(&self) -> Args {
        self.keys().into_iter().fold(Args::new(), |args, key| match self.get(&key) {
            Some(value) => args.kwarg_value(key, value.into_value()),
            None => args,
        })
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}
