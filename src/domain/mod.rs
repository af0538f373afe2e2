pub mod category;
pub mod draft;
pub mod post;

pub use category::{Category, CategoryStyle, CATEGORY_STYLES};
pub use draft::{Attachment, DraftSubmission, Field};
pub use post::{CardTone, Post, PostRecord};
