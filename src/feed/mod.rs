pub mod filter;
pub mod store;

pub use filter::filter_posts;
pub use store::{fetch_page, FeedPage, FeedStore, PageRequest};
