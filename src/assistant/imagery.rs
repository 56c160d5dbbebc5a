use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::info;

use super::{AssistantError, KitchenAssistant};
use crate::gemini_client::{ImageRequest, InlineImage};

const OUTPUT_MIME: &str = "image/jpeg";
const ASPECT_RATIO: &str = "1:1";

/// An image carried inline as `data:<mime>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    data: String,
}

impl DataUrl {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decode(&self) -> Result<Vec<u8>, AssistantError> {
        Ok(BASE64.decode(self.data.as_bytes())?)
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

impl From<InlineImage> for DataUrl {
    fn from(image: InlineImage) -> Self {
        Self {
            mime_type: image.mime_type,
            data: image.data,
        }
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

impl KitchenAssistant {
    /// Generate one square JPEG from a text prompt.
    pub async fn generate_image(&self, prompt: &str) -> Result<DataUrl, AssistantError> {
        let request = ImageRequest {
            prompt: prompt.to_string(),
            number_of_images: 1,
            aspect_ratio: ASPECT_RATIO.to_string(),
            mime_type: OUTPUT_MIME.to_string(),
        };

        let images = self.backend().generate_images(&request).await?;
        let image = images.into_iter().next().ok_or(AssistantError::NoImage)?;
        info!("Generated {} image ({} base64 bytes)", image.mime_type, image.data.len());
        Ok(DataUrl::from(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assistant, FakeBackend};

    #[tokio::test]
    async fn asks_for_one_square_jpeg() {
        let backend = FakeBackend::new();
        backend.images(vec![InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: "AQID".to_string(),
        }]);

        let url = assistant(&backend).generate_image("pancakes").await.unwrap();
        assert_eq!(url.to_string(), "data:image/jpeg;base64,AQID");
        assert_eq!(url.decode().unwrap(), vec![1, 2, 3]);

        let requests = backend.image_requests.lock().unwrap();
        assert_eq!(requests[0].prompt, "pancakes");
        assert_eq!(requests[0].number_of_images, 1);
        assert_eq!(requests[0].aspect_ratio, "1:1");
        assert_eq!(requests[0].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn empty_result_is_an_error() {
        let backend = FakeBackend::new();
        backend.images(Vec::new());
        let err = assistant(&backend).generate_image("soup").await.unwrap_err();
        assert!(matches!(err, AssistantError::NoImage));
    }

    #[test]
    fn extension_follows_mime_type() {
        let png = DataUrl::from(InlineImage {
            mime_type: "image/png".to_string(),
            data: "AQID".to_string(),
        });
        assert_eq!(png.mime_type(), "image/png");
        assert_eq!(png.extension(), "png");
    }

    #[test]
    fn bad_payload_fails_to_decode() {
        let url = DataUrl::from(InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: "@@@".to_string(),
        });
        assert!(matches!(url.decode(), Err(AssistantError::Decode(_))));
    }
}
