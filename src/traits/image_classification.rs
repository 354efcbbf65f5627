//! Image classification capability trait

use async_trait::async_trait;

use super::operation::{OperationRequest, OperationTypeInterface};
use crate::error::ProviderError;
use crate::types::{ImageClassificationInput, ImageClassificationOutput};

#[async_trait]
pub trait ImageClassificationCapability: OperationTypeInterface {
    async fn image_classification(
        &self,
        request: OperationRequest<ImageClassificationInput>,
    ) -> Result<ImageClassificationOutput, ProviderError>;
}
