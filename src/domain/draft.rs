use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::app::Result;

/// Editable fields of a [`DraftSubmission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Content,
    Category,
    Phone,
    #[serde(rename = "cep")]
    PostalCode,
    Address,
    Number,
    Neighborhood,
    City,
    State,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Content,
        Field::Category,
        Field::Phone,
        Field::PostalCode,
        Field::Address,
        Field::Number,
        Field::Neighborhood,
        Field::City,
        Field::State,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Content => "content",
            Field::Category => "category",
            Field::Phone => "phone",
            Field::PostalCode => "cep",
            Field::Address => "address",
            Field::Number => "number",
            Field::Neighborhood => "neighborhood",
            Field::City => "city",
            Field::State => "state",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File picked by the user to accompany a post.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// In-progress post held by the compose screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftSubmission {
    pub name: String,
    pub content: String,
    pub category: String,
    pub phone: String,
    pub cep: String,
    pub address: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub file: Option<Attachment>,
}

impl DraftSubmission {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Content => &self.content,
            Field::Category => &self.category,
            Field::Phone => &self.phone,
            Field::PostalCode => &self.cep,
            Field::Address => &self.address,
            Field::Number => &self.number,
            Field::Neighborhood => &self.neighborhood,
            Field::City => &self.city,
            Field::State => &self.state,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Content => &mut self.content,
            Field::Category => &mut self.category,
            Field::Phone => &mut self.phone,
            Field::PostalCode => &mut self.cep,
            Field::Address => &mut self.address,
            Field::Number => &mut self.number,
            Field::Neighborhood => &mut self.neighborhood,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty()) && self.file.is_none()
    }
}
