use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::assistant::KitchenAssistant;
use crate::gemini_client::{
    ContentRequest, GeminiError, GenerativeBackend, ImageRequest, InlineImage,
};

/// Replays canned replies in order and records every request it sees.
#[derive(Default)]
pub struct FakeBackend {
    text_replies: Mutex<VecDeque<Result<String, GeminiError>>>,
    image_replies: Mutex<VecDeque<Result<Vec<InlineImage>, GeminiError>>>,
    pub content_requests: Mutex<Vec<ContentRequest>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str) {
        self.text_replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn fail_text(&self) {
        self.text_replies.lock().unwrap().push_back(Err(api_error()));
    }

    pub fn images(&self, images: Vec<InlineImage>) {
        self.image_replies.lock().unwrap().push_back(Ok(images));
    }

    pub fn fail_images(&self) {
        self.image_replies.lock().unwrap().push_back(Err(api_error()));
    }

    pub fn content_calls(&self) -> usize {
        self.content_requests.lock().unwrap().len()
    }

    pub fn last_content_request(&self) -> ContentRequest {
        self.content_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no content request recorded")
    }
}

pub fn assistant(backend: &Arc<FakeBackend>) -> KitchenAssistant {
    KitchenAssistant::new(backend.clone())
}

fn api_error() -> GeminiError {
    GeminiError::Api {
        status: 500,
        body: "boom".to_string(),
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    async fn generate_content(&self, request: &ContentRequest) -> Result<String, GeminiError> {
        self.content_requests.lock().unwrap().push(request.clone());
        self.text_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<InlineImage>, GeminiError> {
        self.image_requests.lock().unwrap().push(request.clone());
        self.image_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
