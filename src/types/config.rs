//! Configuration maps, provider API definitions and authentication.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::operation::OperationType;

/// Effective configuration of one call (option name -> value).
pub type ConfigMap = serde_json::Map<String, Value>;

/// Merge `overlay` onto `base`; overlay keys win.
pub fn merge_config(base: &mut ConfigMap, overlay: &ConfigMap) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Credentials handed to a provider for one call.
pub enum Authentication {
    ApiKey(SecretString),
    BearerToken(SecretString),
    /// Provider-specific credential payload.
    Custom(Value),
}

impl Authentication {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(SecretString::from(key.into()))
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::BearerToken(SecretString::from(token.into()))
    }

    /// Secret value for key/token based credentials.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Self::ApiKey(s) | Self::BearerToken(s) => Some(s.expose_secret()),
            Self::Custom(_) => None,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api_key",
            Self::BearerToken(_) => "bearer",
            Self::Custom(_) => "custom",
        }
    }
}

impl Clone for Authentication {
    fn clone(&self) -> Self {
        match self {
            Self::ApiKey(s) => Self::ApiKey(SecretString::from(s.expose_secret().to_owned())),
            Self::BearerToken(s) => {
                Self::BearerToken(SecretString::from(s.expose_secret().to_owned()))
            }
            Self::Custom(v) => Self::Custom(v.clone()),
        }
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Authentication::Custom([REDACTED])"),
            other => write!(f, "Authentication::{}([REDACTED])", other.kind_name()),
        }
    }
}

/// Declared shape of one configuration option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Value>,
}

/// API shape of one operation type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Value>,
    #[serde(default)]
    pub configuration: BTreeMap<String, ConfigOption>,
}

/// Provider API definition, keyed by operation type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiDefinition {
    pub operations: BTreeMap<String, OperationDefinition>,
}

impl ApiDefinition {
    pub fn operation(&self, operation_type: &OperationType) -> Option<&OperationDefinition> {
        self.operations.get(operation_type.as_str())
    }

    /// Defaults of the required options of one operation, cast to their declared type.
    pub fn required_defaults(&self, operation_type: &OperationType) -> ConfigMap {
        let mut values = ConfigMap::new();
        let Some(definition) = self.operation(operation_type) else {
            return values;
        };
        for (key, option) in &definition.configuration {
            if let (true, Some(default)) = (option.required, option.default.as_ref()) {
                values.insert(key.clone(), type_cast(option.value_type.as_deref(), default));
            }
        }
        values
    }
}

/// Cast a configuration value to its declared type.
///
/// Values that cannot be converted are returned unchanged.
pub fn type_cast(value_type: Option<&str>, value: &Value) -> Value {
    let Some(value_type) = value_type else {
        return value.clone();
    };
    match value_type {
        "integer" | "int" => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Value::from)
                .unwrap_or_else(|| value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| value.clone()),
            Value::Bool(b) => Value::from(i64::from(*b)),
            _ => value.clone(),
        },
        "float" | "number" | "double" => match value {
            Value::Number(n) => n.as_f64().map(Value::from).unwrap_or_else(|| value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| value.clone()),
            _ => value.clone(),
        },
        "boolean" | "bool" => match value {
            Value::Bool(_) => value.clone(),
            Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Value::Bool(true),
                "false" | "0" | "no" | "off" | "" => Value::Bool(false),
                _ => value.clone(),
            },
            _ => value.clone(),
        },
        "string" => match value {
            Value::String(_) => value.clone(),
            Value::Null => Value::String(String::new()),
            other => Value::String(other.to_string()),
        },
        "array" | "object" => match value {
            Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_defaults_are_cast() {
        let definition: ApiDefinition = serde_json::from_value(json!({
            "chat": {
                "configuration": {
                    "max_tokens": { "type": "integer", "default": "1024", "required": true },
                    "temperature": { "type": "float", "default": 0.7, "required": true },
                    "stream": { "type": "boolean", "default": "false", "required": true },
                    "top_p": { "type": "float", "default": 1.0 }
                }
            }
        }))
        .unwrap();

        let defaults = definition.required_defaults(&OperationType::CHAT);
        assert_eq!(defaults.get("max_tokens"), Some(&json!(1024)));
        assert_eq!(defaults.get("temperature"), Some(&json!(0.7)));
        assert_eq!(defaults.get("stream"), Some(&json!(false)));
        assert!(!defaults.contains_key("top_p"));
        assert!(definition.required_defaults(&OperationType::EMBEDDINGS).is_empty());
    }

    #[test]
    fn uncastable_values_are_unchanged() {
        assert_eq!(type_cast(Some("integer"), &json!("lots")), json!("lots"));
        assert_eq!(type_cast(Some("unknown"), &json!([1])), json!([1]));
        assert_eq!(type_cast(None, &json!(3)), json!(3));
    }

    #[test]
    fn authentication_debug_is_redacted() {
        let auth = Authentication::api_key("sk-very-secret");
        let printed = format!("{auth:?}");
        assert!(!printed.contains("sk-very-secret"));
        assert_eq!(auth.clone().secret(), Some("sk-very-secret"));
    }
}
