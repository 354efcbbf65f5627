//! Speech capability traits (speech-to-text and text-to-speech)

use async_trait::async_trait;

use super::operation::{OperationRequest, OperationTypeInterface};
use crate::error::ProviderError;
use crate::types::{SpeechToTextInput, SpeechToTextOutput, TextToSpeechInput, TextToSpeechOutput};

#[async_trait]
pub trait SpeechToTextCapability: OperationTypeInterface {
    async fn speech_to_text(
        &self,
        request: OperationRequest<SpeechToTextInput>,
    ) -> Result<SpeechToTextOutput, ProviderError>;
}

#[async_trait]
pub trait TextToSpeechCapability: OperationTypeInterface {
    async fn text_to_speech(
        &self,
        request: OperationRequest<TextToSpeechInput>,
    ) -> Result<TextToSpeechOutput, ProviderError>;
}
