use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Incident category attached to every post.
///
/// Unrecognized tags coming from the API land in [`Category::Other`] so they can
/// still be displayed; they are never accepted by the form validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Flood,
    Fire,
    Landslide,
    Help,
    Rescue,
    Structural,
    Traffic,
    Power,
    Storm,
    Other,
}

/// Presentation metadata for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub tag: &'static str,
    /// Short label shown on feed cards and matched by search.
    pub label: &'static str,
    /// Longer label shown in the category picker.
    pub form_label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Indexed by `Category as usize`; the last entry is the fallback for unknown tags.
pub static CATEGORY_STYLES: [CategoryStyle; 10] = [
    CategoryStyle {
        tag: "flood",
        label: "Alagamento",
        form_label: "Alagamento",
        icon: "droplets",
        color: "bg-blue-100 text-blue-800",
    },
    CategoryStyle {
        tag: "fire",
        label: "Incêndio",
        form_label: "Incêndio",
        icon: "flame",
        color: "bg-red-100 text-red-800",
    },
    CategoryStyle {
        tag: "landslide",
        label: "Deslizamento",
        form_label: "Deslizamento",
        icon: "alert-triangle",
        color: "bg-orange-100 text-orange-800",
    },
    CategoryStyle {
        tag: "help",
        label: "Ajuda",
        form_label: "Oferecendo Ajuda",
        icon: "heart",
        color: "bg-green-100 text-green-800",
    },
    CategoryStyle {
        tag: "rescue",
        label: "Resgate",
        form_label: "Resgate Necessário",
        icon: "users",
        color: "bg-purple-100 text-purple-800",
    },
    CategoryStyle {
        tag: "structural",
        label: "Estrutural",
        form_label: "Problema Estrutural",
        icon: "home",
        color: "bg-yellow-100 text-yellow-800",
    },
    CategoryStyle {
        tag: "traffic",
        label: "Trânsito",
        form_label: "Problema de Trânsito",
        icon: "car",
        color: "bg-gray-100 text-gray-800",
    },
    CategoryStyle {
        tag: "power",
        label: "Energia",
        form_label: "Falta de Energia",
        icon: "zap",
        color: "bg-indigo-100 text-indigo-800",
    },
    CategoryStyle {
        tag: "storm",
        label: "Tempestade",
        form_label: "Vendaval/Tempestade",
        icon: "wind",
        color: "bg-cyan-100 text-cyan-800",
    },
    CategoryStyle {
        tag: "other",
        label: "Emergência",
        form_label: "Emergência",
        icon: "alert-triangle",
        color: "bg-gray-100 text-gray-800",
    },
];

impl Category {
    /// Categories a user can pick when composing a post.
    pub const SELECTABLE: [Category; 9] = [
        Category::Flood,
        Category::Fire,
        Category::Landslide,
        Category::Help,
        Category::Rescue,
        Category::Structural,
        Category::Traffic,
        Category::Power,
        Category::Storm,
    ];

    /// Strict parse used by the form; `None` for anything outside the enumeration.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::SELECTABLE
            .into_iter()
            .find(|category| category.style().tag == tag)
    }

    /// Lenient parse used for API records.
    pub fn from_tag_or_other(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Category::Other)
    }

    pub fn style(self) -> &'static CategoryStyle {
        &CATEGORY_STYLES[self as usize]
    }

    pub fn tag(self) -> &'static str {
        self.style().tag
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }

    /// Every category except `help` is flagged urgent, including informational
    /// ones like `traffic` and unknown tags.
    pub fn is_urgent(self) -> bool {
        self != Category::Help
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTag {
            Tag(String),
            Unknown(serde::de::IgnoredAny),
        }

        Ok(match Option::<RawTag>::deserialize(deserializer)? {
            Some(RawTag::Tag(tag)) => Category::from_tag_or_other(&tag),
            Some(RawTag::Unknown(_)) | None => Category::Other,
        })
    }
}
