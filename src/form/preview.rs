use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::Attachment;

/// Inline `data:` URL for showing a picked image before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    data_url: String,
}

impl ImagePreview {
    /// `None` for non-image attachments.
    pub fn from_attachment(attachment: &Attachment) -> Option<Self> {
        if !attachment.is_image() {
            return None;
        }
        let encoded = STANDARD.encode(&attachment.bytes);
        Some(Self {
            data_url: format!("data:{};base64,{}", attachment.content_type, encoded),
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}
