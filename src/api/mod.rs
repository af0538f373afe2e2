pub mod http_client;
pub mod postal;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;
use crate::domain::{Attachment, DraftSubmission, PostRecord};

pub use http_client::HttpPostsApi;
pub use postal::ViaCepLookup;

/// Body of `POST /api/posts`, sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub phone: String,
    pub cep: String,
    pub address: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub image: Option<Attachment>,
}

impl CreatePostRequest {
    /// Text parts in wire order.
    pub fn text_fields(&self) -> [(&'static str, &str); 10] {
        [
            ("title", self.title.as_str()),
            ("content", self.content.as_str()),
            ("category", self.category.as_str()),
            ("phone", self.phone.as_str()),
            ("cep", self.cep.as_str()),
            ("address", self.address.as_str()),
            ("number", self.number.as_str()),
            ("neighborhood", self.neighborhood.as_str()),
            ("city", self.city.as_str()),
            ("state", self.state.as_str()),
        ]
    }
}

impl From<&DraftSubmission> for CreatePostRequest {
    fn from(draft: &DraftSubmission) -> Self {
        Self {
            title: draft.name.clone(),
            content: draft.content.clone(),
            category: draft.category.clone(),
            phone: draft.phone.clone(),
            cep: draft.cep.clone(),
            address: draft.address.clone(),
            number: draft.number.clone(),
            neighborhood: draft.neighborhood.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            image: draft.file.clone(),
        }
    }
}

#[async_trait]
pub trait PostsApi {
    /// Fetch one page of posts; pages start at 1.
    async fn list_posts(&self, page: u32) -> Result<Vec<PostRecord>>;

    /// Create a post. Any non-2xx status is an error.
    async fn create_post(&self, request: &CreatePostRequest) -> Result<()>;
}

/// Raw postal lookup response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostalLookupResponse {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub erro: bool,
}

// The service has answered both `true` and `"true"` for unknown codes.
fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => s.eq_ignore_ascii_case("true"),
        None => false,
    })
}

/// Address resolved from a postal code or from coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub cep: String,
    pub street: String,
    pub number: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostalLookupOutcome {
    Found(ResolvedAddress),
    NotFound,
}

impl From<PostalLookupResponse> for PostalLookupOutcome {
    fn from(response: PostalLookupResponse) -> Self {
        if response.erro {
            return PostalLookupOutcome::NotFound;
        }
        PostalLookupOutcome::Found(ResolvedAddress {
            cep: response.cep,
            street: response.logradouro,
            number: None,
            neighborhood: response.bairro,
            city: response.localidade,
            state: response.uf,
        })
    }
}

#[async_trait]
pub trait PostalLookup {
    /// Look up an 8-digit postal code (separator already stripped).
    async fn lookup(&self, digits: &str) -> Result<PostalLookupOutcome>;
}
