use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use url::Url;

use crate::api::{CreatePostRequest, PostsApi};
use crate::app::{Result, SosError};
use crate::domain::PostRecord;

const POSTS_PATH: &str = "api/posts";

/// reqwest-backed Posts API client.
pub struct HttpPostsApi {
    client: Client,
    base_url: Url,
}

impl HttpPostsApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("sos-feed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn posts_url(&self) -> Result<Url> {
        Ok(self.base_url.join(POSTS_PATH)?)
    }

    pub fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = self.posts_url()?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

/// Parse a base URL so that relative joins land below it rather than replacing
/// its last segment.
pub(crate) fn parse_base_url(base: &str) -> Result<Url> {
    let trimmed = base.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let normalized = format!("{}/", with_scheme.trim_end_matches('/'));
    Ok(Url::parse(&normalized)?)
}

pub(crate) fn multipart_form(request: &CreatePostRequest) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in request.text_fields() {
        form = form.text(name, value.to_string());
    }

    if let Some(image) = &request.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        form = form.part("image", part);
    }

    Ok(form)
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list_posts(&self, page: u32) -> Result<Vec<PostRecord>> {
        let url = self.page_url(page)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SosError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<()> {
        let url = self.posts_url()?;
        tracing::debug!("POST {} (image: {})", url, request.image.is_some());

        let form = multipart_form(request)?;
        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SosError::Status(status.as_u16()));
        }

        Ok(())
    }
}
