//! Map property definitions with defaults from properties.json
//!
//! properties.json is embedded at compile time and parsed once into a
//! [`PropertyRegistry`]. Defaults live in that one file; [`PropertyReader`]
//! layers user overrides (a flat JSON object) on top of it.

use super::error::{MapError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, warn};

/// properties.json embedded at compile time
const PROPERTIES_JSON: &str = include_str!("../../properties.json");

/// Global registry, initialized lazily on first access
static REGISTRY: Lazy<PropertyRegistry> = Lazy::new(|| {
    PropertyRegistry::from_json(PROPERTIES_JSON).unwrap_or_else(|e| {
        error!("Failed to load properties.json: {}", e);
        PropertyRegistry::default()
    })
});

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    &REGISTRY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
    #[serde(rename = "DoubleProperty")]
    Double,
    #[serde(rename = "BooleanProperty")]
    Boolean,
}

/// Property definition from properties.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(rename = "values")]
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PropertiesFile {
    properties: Vec<PropertyDef>,
}

/// Registry of all map properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a properties document
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PropertiesFile = serde_json::from_str(json)
            .map_err(|e| MapError::Config(format!("Failed to parse properties JSON: {}", e)))?;

        let properties = file
            .properties
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect::<HashMap<_, _>>();

        debug!("PropertyRegistry: loaded {} properties", properties.len());
        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Typed property reader
///
/// User values take precedence; anything missing, empty or invalid falls back
/// to the registry default with a warning.
#[derive(Debug, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    /// Reader over explicit user values
    pub fn new(user_values: HashMap<String, String>) -> Self {
        let user_values: HashMap<String, String> = user_values
            .into_iter()
            .filter(|(_, v)| !v.is_empty()) // Empty = not set
            .collect();

        for name in user_values.keys() {
            if registry().get_property(name).is_none() {
                warn!("Unknown property '{}' ignored", name);
            }
        }

        Self { user_values }
    }

    /// Reader with no overrides (registry defaults only)
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of overrides
    ///
    /// Strings, numbers and booleans are accepted; nested values are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| MapError::Config(format!("Failed to parse map config: {}", e)))?;

        let mut user_values = HashMap::new();
        for (key, value) in map {
            let value_str = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    warn!("Property '{}' has unsupported value {}, skipped", key, other);
                    continue;
                }
            };
            user_values.insert(key, value_str);
        }

        Ok(Self::new(user_values))
    }

    /// Load overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| MapError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Get string property (user value or default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get enumerated property, rejecting values outside the declared set
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value, name, valid_values, default
            );
        }

        default.to_string()
    }

    /// Get f64 property
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        match self.user_values.get(name) {
            None => default,
            Some(value) => match value.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!(
                        "Invalid numeric value '{}' for property '{}'. Using default: {}",
                        value, name, default
                    );
                    default
                }
            },
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if (min..=max).contains(&value) {
            return value;
        }

        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(min);
        warn!(
            "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
            value, name, min, max, default
        );
        default
    }

    /// Get boolean property ("true"/"false")
    pub fn get_bool(&self, name: &str) -> bool {
        let default = registry().get_default(name) == Some("true");
        match self.user_values.get(name).map(|s| s.to_lowercase()) {
            None => default,
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            Some(other) => {
                warn!(
                    "Invalid boolean value '{}' for property '{}'. Using default: {}",
                    other, name, default
                );
                default
            }
        }
    }

    /// Get comma separated list property (items trimmed, empties dropped)
    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.get_string(name)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
