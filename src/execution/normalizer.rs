//! Call argument normalization.
//!
//! Trigger methods take up to three positional arguments: input, model id and
//! extra tags. A single argument is the model id.

use serde_json::Value;

use crate::error::ProxyError;
use crate::types::{
    ChatInput, EmbeddingsInput, ImageClassificationInput, ModerationInput, OperationInput,
    OperationType, SpeechToTextInput, TextToSpeechInput,
};

pub(crate) const MISSING_MODEL_MESSAGE: &str = "Model ID is missing in your request.";

/// One positional argument of a proxy call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Null,
    Text(String),
    Input(OperationInput),
    Tags(Vec<String>),
    Value(Value),
}

impl CallArg {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Value(Value::Null))
    }

    /// JSON form, used when forwarding arguments to plain methods.
    pub fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s),
            Self::Input(input) => input.to_value(),
            Self::Tags(tags) => Value::from(tags),
            Self::Value(v) => v,
        }
    }

    fn into_input(self) -> Result<Option<OperationInput>, ProxyError> {
        match self {
            Self::Null | Self::Value(Value::Null) => Ok(None),
            Self::Input(input) => Ok(Some(input)),
            Self::Text(text) => Ok(Some(OperationInput::Json(Value::String(text)))),
            Self::Value(v) => Ok(Some(OperationInput::Json(v))),
            Self::Tags(_) => Err(ProxyError::bad_request(
                "A tag list cannot be used as operation input",
            )),
        }
    }

    fn into_model_id(self) -> Result<String, ProxyError> {
        let model = match self {
            Self::Text(s) | Self::Value(Value::String(s)) => s,
            _ => return Err(ProxyError::bad_request(MISSING_MODEL_MESSAGE)),
        };
        if model.is_empty() {
            return Err(ProxyError::bad_request(MISSING_MODEL_MESSAGE));
        }
        Ok(model)
    }

    fn into_tags(self) -> Result<Vec<String>, ProxyError> {
        match self {
            Self::Null | Self::Value(Value::Null) => Ok(Vec::new()),
            Self::Tags(tags) => Ok(tags),
            Self::Value(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(ProxyError::bad_request(format!(
                        "Tags must be strings, got {other}"
                    ))),
                })
                .collect(),
            _ => Err(ProxyError::bad_request("Tags must be a list of strings")),
        }
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for CallArg {
    fn from(value: Vec<String>) -> Self {
        Self::Tags(value)
    }
}

impl From<Vec<&str>> for CallArg {
    fn from(value: Vec<&str>) -> Self {
        Self::Tags(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<OperationInput> for CallArg {
    fn from(value: OperationInput) -> Self {
        Self::Input(value)
    }
}

impl From<Option<OperationInput>> for CallArg {
    fn from(value: Option<OperationInput>) -> Self {
        value.map_or(Self::Null, Self::Input)
    }
}

macro_rules! input_call_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CallArg {
                fn from(value: $ty) -> Self {
                    Self::Input(value.into())
                }
            }
        )*
    };
}

input_call_arg!(
    ChatInput,
    EmbeddingsInput,
    ImageClassificationInput,
    SpeechToTextInput,
    TextToSpeechInput,
    ModerationInput,
);

/// Canonical `(input, model id, tags)` triple of a trigger call.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCall {
    pub input: Option<OperationInput>,
    pub model_id: String,
    /// Operation type name first, then the caller's extra tags in order.
    pub tags: Vec<String>,
}

/// Turns raw trigger-call arguments into a [`NormalizedCall`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CallNormalizer;

impl CallNormalizer {
    /// Normalize `args` for a call of `operation_type`.
    ///
    /// Tags always start from an empty list, so nothing carries over from a
    /// previous call.
    pub fn normalize(
        &self,
        operation_type: &OperationType,
        args: Vec<CallArg>,
    ) -> Result<NormalizedCall, ProxyError> {
        if args.len() > 3 {
            return Err(ProxyError::bad_request(format!(
                "Expected at most 3 arguments (input, model id, tags), got {}",
                args.len()
            )));
        }

        let mut args = args.into_iter();
        let first = args.next().ok_or_else(|| ProxyError::bad_request(MISSING_MODEL_MESSAGE))?;
        let second = args.next().filter(|arg| !arg.is_null());
        let third = args.next();

        let (input, model_id) = match second {
            None => (None, first.into_model_id()?),
            Some(model) => (first.into_input()?, model.into_model_id()?),
        };

        let extra = match third {
            Some(arg) => arg.into_tags()?,
            None => Vec::new(),
        };

        let mut tags = Vec::with_capacity(extra.len() + 1);
        tags.push(operation_type.as_str().to_string());
        tags.extend(extra);

        Ok(NormalizedCall {
            input,
            model_id,
            tags,
        })
    }
}
