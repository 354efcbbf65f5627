//! Streaming chat responses
//!
//! Providers return `StreamedChatMessages` when a chat input asks for streamed
//! output. The dispatcher does not wait for the stream to finish; instead it
//! attaches `StreamMetadata` so consumers can correlate late chunks with the
//! call that produced them.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ProxyError;
use crate::types::ConfigMap;

/// One incremental piece of a streamed chat answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamedChatChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl StreamedChatChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Boxed chunk stream.
pub type ChatChunkStream =
    Pin<Box<dyn Stream<Item = Result<StreamedChatChunk, ProxyError>> + Send>>;

/// Correlation data attached to a stream once its call completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamMetadata {
    pub request_thread_id: Option<Uuid>,
    pub request_parent_id: Option<Uuid>,
    pub provider_id: Option<String>,
    pub model_id: Option<String>,
    pub input: Option<Value>,
    pub configuration: Option<ConfigMap>,
    pub tags: Vec<String>,
}

/// A lazily produced sequence of chat chunks plus its correlation metadata.
pub struct StreamedChatMessages {
    inner: ChatChunkStream,
    metadata: StreamMetadata,
}

impl StreamedChatMessages {
    pub fn new(inner: ChatChunkStream) -> Self {
        Self {
            inner,
            metadata: StreamMetadata::default(),
        }
    }

    /// Build a stream from already known chunks (mostly useful for tests and fakes).
    pub fn from_chunks(chunks: Vec<StreamedChatChunk>) -> Self {
        Self::new(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }

    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: StreamMetadata) {
        self.metadata = metadata;
    }

    pub fn request_thread_id(&self) -> Option<Uuid> {
        self.metadata.request_thread_id
    }

    pub fn into_inner(self) -> ChatChunkStream {
        self.inner
    }
}

impl Stream for StreamedChatMessages {
    type Item = Result<StreamedChatChunk, ProxyError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for StreamedChatMessages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamedChatMessages")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn chunks_are_yielded_in_order() {
        let mut stream = StreamedChatMessages::from_chunks(vec![
            StreamedChatChunk::text("Hel"),
            StreamedChatChunk::text("lo"),
        ]);
        let mut acc = String::new();
        while let Some(chunk) = stream.next().await {
            acc.push_str(&chunk.unwrap().text);
        }
        assert_eq!(acc, "Hello");
        assert!(stream.request_thread_id().is_none());
    }
}
