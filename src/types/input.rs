//! Typed operation inputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ProxyError;

/// A single chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatInput {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub streamed_output: bool,
    /// Free-form diagnostics copied into the call context for observers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub debug_data: HashMap<String, Value>,
}

impl ChatInput {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_streamed_output(mut self, streamed: bool) -> Self {
        self.streamed_output = streamed;
        self
    }

    pub fn with_debug_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.debug_data.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsInput {
    pub prompt: String,
}

impl EmbeddingsInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Binary file payload (image or audio).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryFile {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl BinaryFile {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageClassificationInput {
    pub image: BinaryFile,
    /// Candidate labels; empty lets the model choose.
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechToTextInput {
    pub audio: BinaryFile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextToSpeechInput {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationInput {
    pub prompt: String,
}

/// Input envelope carried through the call pipeline.
///
/// `Json` holds an untyped payload that is decoded into the typed input of the
/// target operation right before invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationInput {
    Chat(ChatInput),
    Embeddings(EmbeddingsInput),
    ImageClassification(ImageClassificationInput),
    SpeechToText(SpeechToTextInput),
    TextToSpeech(TextToSpeechInput),
    Moderation(ModerationInput),
    Json(Value),
}

impl OperationInput {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Embeddings(_) => "embeddings",
            Self::ImageClassification(_) => "image_classification",
            Self::SpeechToText(_) => "speech_to_text",
            Self::TextToSpeech(_) => "text_to_speech",
            Self::Moderation(_) => "moderation",
            Self::Json(_) => "json",
        }
    }

    /// Debug data attached to the input, if any.
    pub fn debug_data(&self) -> HashMap<String, Value> {
        match self {
            Self::Chat(input) => input.debug_data.clone(),
            _ => HashMap::new(),
        }
    }

    /// Serialize the payload for logging or stream metadata.
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::Chat(i) => serde_json::to_value(i),
            Self::Embeddings(i) => serde_json::to_value(i),
            Self::ImageClassification(i) => serde_json::to_value(i),
            Self::SpeechToText(i) => serde_json::to_value(i),
            Self::TextToSpeech(i) => serde_json::to_value(i),
            Self::Moderation(i) => serde_json::to_value(i),
            Self::Json(v) => Ok(v.clone()),
        };
        encoded.unwrap_or(Value::Null)
    }
}

/// Conversion from the (possibly absent) input envelope into a typed input.
pub trait FromOperationInput: Sized {
    fn from_operation_input(input: Option<OperationInput>) -> Result<Self, ProxyError>;
}

macro_rules! typed_input {
    ($ty:ty, $variant:ident, $name:literal, $from_text:expr) => {
        impl From<$ty> for OperationInput {
            fn from(value: $ty) -> Self {
                OperationInput::$variant(value)
            }
        }

        impl FromOperationInput for $ty {
            fn from_operation_input(input: Option<OperationInput>) -> Result<Self, ProxyError> {
                match input {
                    None => Ok(<$ty>::default()),
                    Some(OperationInput::$variant(value)) => Ok(value),
                    Some(OperationInput::Json(Value::String(text))) => {
                        let from_text: fn(String) -> Option<$ty> = $from_text;
                        from_text(text).ok_or_else(|| {
                            ProxyError::BadRequest(format!("{} input cannot be built from text", $name))
                        })
                    }
                    Some(OperationInput::Json(value)) => Ok(serde_json::from_value(value)?),
                    Some(other) => Err(ProxyError::BadRequest(format!(
                        "Expected {} input, got {} input",
                        $name,
                        other.kind_name()
                    ))),
                }
            }
        }
    };
}

// Plain text is accepted wherever the input has an obvious text form.
typed_input!(ChatInput, Chat, "chat", |text| Some(ChatInput::new(vec![ChatMessage::user(text)])));
typed_input!(EmbeddingsInput, Embeddings, "embeddings", |text| Some(EmbeddingsInput::new(text)));
typed_input!(ImageClassificationInput, ImageClassification, "image_classification", |_| None);
typed_input!(SpeechToTextInput, SpeechToText, "speech_to_text", |_| None);
typed_input!(TextToSpeechInput, TextToSpeech, "text_to_speech", |text| {
    Some(TextToSpeechInput { text })
});
typed_input!(ModerationInput, Moderation, "moderation", |text| Some(ModerationInput { prompt: text }));

impl FromOperationInput for Option<OperationInput> {
    fn from_operation_input(input: Option<OperationInput>) -> Result<Self, ProxyError> {
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_input_becomes_default() {
        let input = ChatInput::from_operation_input(None).unwrap();
        assert!(input.messages.is_empty());
    }

    #[test]
    fn json_input_is_decoded() {
        let raw = serde_json::json!({ "prompt": "embed me" });
        let input = EmbeddingsInput::from_operation_input(Some(OperationInput::Json(raw))).unwrap();
        assert_eq!(input.prompt, "embed me");
    }

    #[test]
    fn mismatched_input_is_a_bad_request() {
        let err = ModerationInput::from_operation_input(Some(
            ChatInput::new(vec![ChatMessage::user("hi")]).into(),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::BadRequest);
        assert!(err.message().contains("moderation"));
    }

    #[test]
    fn text_input_builds_a_user_message() {
        let input =
            ChatInput::from_operation_input(Some(OperationInput::Json(Value::from("hello")))).unwrap();
        assert_eq!(input.messages, vec![ChatMessage::user("hello")]);

        let err = SpeechToTextInput::from_operation_input(Some(OperationInput::Json(Value::from(
            "not audio",
        ))))
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::BadRequest);
    }

    #[test]
    fn debug_data_is_exposed_for_chat() {
        let input: OperationInput = ChatInput::default()
            .with_debug_data("origin", serde_json::json!("test"))
            .into();
        assert_eq!(input.debug_data().get("origin"), Some(&serde_json::json!("test")));
    }
}
