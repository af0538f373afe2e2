use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Category;

/// Raw post as returned by `GET /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub neighborhood: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cep: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default = "default_category")]
    pub category: Category,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Street numbers sometimes arrive as JSON numbers.
fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

fn default_category() -> Category {
    Category::Other
}

/// Feed read model. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub content: String,
    /// `street, number - neighborhood, city - region`
    pub address: String,
    pub cep: String,
    pub phone: String,
    /// Locale-formatted creation time.
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
    pub category: Category,
    pub urgent: bool,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    Urgent,
    Help,
    Neutral,
}

impl Post {
    /// Stable sort/dedup key.
    pub fn key(&self) -> (i64, DateTime<Utc>) {
        (self.id, self.created_at)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// WhatsApp chat link for the contact phone, assuming a Brazilian number.
    pub fn whatsapp_url(&self) -> String {
        let digits: String = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("https://wa.me/55{digits}")
    }

    /// First letter of each word of the author name; empty for a blank name.
    pub fn initials(&self) -> String {
        self.author
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }

    pub fn card_tone(&self) -> CardTone {
        if self.urgent {
            CardTone::Urgent
        } else if self.category == Category::Help {
            CardTone::Help
        } else {
            CardTone::Neutral
        }
    }
}
