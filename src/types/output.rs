//! Typed operation outputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::input::{BinaryFile, ChatMessage};
use crate::error::ProxyError;
use crate::streaming::StreamedChatMessages;

/// Normalized chat payload: either a full message or a lazy stream of chunks.
#[derive(Debug)]
pub enum ChatNormalized {
    Message(ChatMessage),
    Stream(StreamedChatMessages),
}

#[derive(Debug)]
pub struct ChatOutput {
    pub normalized: ChatNormalized,
    /// Provider's raw response, kept for diagnostics.
    pub raw: Value,
    pub metadata: HashMap<String, Value>,
}

impl ChatOutput {
    pub fn message(message: ChatMessage, raw: Value) -> Self {
        Self {
            normalized: ChatNormalized::Message(message),
            raw,
            metadata: HashMap::new(),
        }
    }

    pub fn stream(stream: StreamedChatMessages) -> Self {
        Self {
            normalized: ChatNormalized::Stream(stream),
            raw: Value::Null,
            metadata: HashMap::new(),
        }
    }

    /// Text of a non-streamed answer.
    pub fn text(&self) -> Option<&str> {
        match &self.normalized {
            ChatNormalized::Message(m) => Some(m.content.as_str()),
            ChatNormalized::Stream(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsOutput {
    pub normalized: Vec<f32>,
    #[serde(default)]
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageClassificationItem {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageClassificationOutput {
    pub normalized: Vec<ImageClassificationItem>,
    #[serde(default)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechToTextOutput {
    pub normalized: String,
    #[serde(default)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextToSpeechOutput {
    pub normalized: Vec<BinaryFile>,
    #[serde(default)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub flagged: bool,
    /// Category -> score.
    #[serde(default)]
    pub information: HashMap<String, f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationOutput {
    pub normalized: ModerationResponse,
    #[serde(default)]
    pub raw: Value,
}

/// Output envelope returned by the dispatcher and handed to post-call observers.
#[derive(Debug)]
pub enum OperationOutput {
    Chat(ChatOutput),
    Embeddings(EmbeddingsOutput),
    ImageClassification(ImageClassificationOutput),
    SpeechToText(SpeechToTextOutput),
    TextToSpeech(TextToSpeechOutput),
    Moderation(ModerationOutput),
    /// Output of a provider-defined operation type.
    Custom(Value),
}

impl OperationOutput {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Embeddings(_) => "embeddings",
            Self::ImageClassification(_) => "image_classification",
            Self::SpeechToText(_) => "speech_to_text",
            Self::TextToSpeech(_) => "text_to_speech",
            Self::Moderation(_) => "moderation",
            Self::Custom(_) => "custom",
        }
    }

    /// The normalized payload when it is a stream.
    pub fn stream_mut(&mut self) -> Option<&mut StreamedChatMessages> {
        match self {
            Self::Chat(ChatOutput {
                normalized: ChatNormalized::Stream(stream),
                ..
            }) => Some(stream),
            _ => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(
            self,
            Self::Chat(ChatOutput {
                normalized: ChatNormalized::Stream(_),
                ..
            })
        )
    }
}

macro_rules! typed_output {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl From<$ty> for OperationOutput {
            fn from(value: $ty) -> Self {
                OperationOutput::$variant(value)
            }
        }

        impl TryFrom<OperationOutput> for $ty {
            type Error = ProxyError;

            fn try_from(value: OperationOutput) -> Result<Self, Self::Error> {
                match value {
                    OperationOutput::$variant(out) => Ok(out),
                    other => Err(ProxyError::ResponseError(format!(
                        "Expected {} output, got {} output",
                        $name,
                        other.kind_name()
                    ))),
                }
            }
        }
    };
}

typed_output!(ChatOutput, Chat, "chat");
typed_output!(EmbeddingsOutput, Embeddings, "embeddings");
typed_output!(ImageClassificationOutput, ImageClassification, "image_classification");
typed_output!(SpeechToTextOutput, SpeechToText, "speech_to_text");
typed_output!(TextToSpeechOutput, TextToSpeech, "text_to_speech");
typed_output!(ModerationOutput, Moderation, "moderation");
