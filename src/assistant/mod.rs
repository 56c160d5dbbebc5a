//! Thin request-shaping layer over the generative backend.
//!
//! Every operation here is one provider round trip with a fixed
//! instruction. Nothing is retried or cached.

pub mod chat_session;
pub mod imagery;
pub mod ingredients;
pub mod meals;
pub mod upload;

use std::sync::Arc;

use thiserror::Error;

use crate::gemini_client::{GeminiError, GenerativeBackend};

pub use chat_session::ChatSession;
pub use imagery::DataUrl;
pub use upload::{ImageUpload, UploadError};

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("the image service returned no image")]
    NoImage,

    #[error("failed to decode image data: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Entry point to every AI-backed operation the panels use.
#[derive(Clone)]
pub struct KitchenAssistant {
    backend: Arc<dyn GenerativeBackend>,
}

impl KitchenAssistant {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    pub(crate) fn backend(&self) -> &Arc<dyn GenerativeBackend> {
        &self.backend
    }
}
