use chrono::{DateTime, FixedOffset, Local, Utc};
use url::Url;

use crate::api::http_client::parse_base_url;
use crate::app::Result;
use crate::domain::{Post, PostRecord};

/// pt-BR `toLocaleString` layout.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Maps API records into the feed read model.
#[derive(Debug, Clone)]
pub struct Normalizer {
    image_base: Url,
    offset: Option<FixedOffset>,
}

impl Normalizer {
    /// Timestamps are rendered in the local timezone.
    pub fn new(image_base: &str) -> Result<Self> {
        Ok(Self {
            image_base: parse_base_url(image_base)?,
            offset: None,
        })
    }

    /// Render timestamps at a fixed UTC offset instead of local time.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn normalize(&self, record: PostRecord) -> Post {
        let address = compose_address(&record);
        let timestamp = self.format_timestamp(record.created_at);
        let image = record
            .image_url
            .as_deref()
            .and_then(|path| self.resolve_image(path));

        Post {
            id: record.id,
            author: record.title,
            content: record.content,
            address,
            cep: record.cep,
            phone: record.phone,
            timestamp,
            created_at: record.created_at,
            urgent: record.category.is_urgent(),
            category: record.category,
            image,
        }
    }

    pub fn normalize_all(&self, records: Vec<PostRecord>) -> Vec<Post> {
        records.into_iter().map(|r| self.normalize(r)).collect()
    }

    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        match self.offset {
            Some(offset) => at.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string(),
            None => at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    fn resolve_image(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if let Ok(absolute) = Url::parse(path) {
            return Some(absolute.to_string());
        }
        match self.image_base.join(path.trim_start_matches('/')) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!("Dropping unresolvable image path {}: {}", path, e);
                None
            }
        }
    }
}

/// `street, number - neighborhood, city - region`
pub fn compose_address(record: &PostRecord) -> String {
    format!(
        "{}, {} - {}, {} - {}",
        record.address, record.number, record.neighborhood, record.city, record.state
    )
}
