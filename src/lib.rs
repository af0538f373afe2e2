//! # sos-feed
//!
//! Client-side data and state engine for a community emergency-reporting
//! feed: people post incidents (floods, fires, rescues, offers of help) with a
//! location and a contact phone, and browse a paginated, searchable feed.
//!
//! ## Architecture
//!
//! ```text
//! Posts API → Normalizer → FeedStore → FeedFilter
//! keystrokes → InputFormatter → ComposeForm → FormValidator → SubmissionPipeline → Posts API
//!                                    ↑
//!                             AddressResolver (postal lookup / geolocation)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the first two pages of the feed, filtered
//! sos-feed feed --pages 2 --search alagamento
//!
//! # Resolve a postal code
//! sos-feed cep 01310100
//!
//! # Submit a post
//! sos-feed post --name Ana --content "Rua alagada até o joelho" --category flood \
//!     --phone 11999998888 --cep 01310100 --number 1000
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the HTTP
/// collaborators, the normalizer, the address resolver and the submission
/// pipeline.
pub mod app;

/// Command-line interface using clap.
///
/// - `feed [--pages N] [--search Q]` - Load and print the feed
/// - `post ...` - Compose and submit a post
/// - `cep <code>` - Resolve a postal code
/// - `categories` - List the category table
pub mod cli;

/// Configuration loaded from `~/.config/sos-feed/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Post`](domain::Post) / [`PostRecord`](domain::PostRecord): feed read and wire models
/// - [`DraftSubmission`](domain::DraftSubmission): the post being composed
/// - [`Category`](domain::Category): incident categories and their presentation table
pub mod domain;

/// Clients for the Posts API and the postal lookup service.
///
/// - [`PostsApi`](api::PostsApi) / [`HttpPostsApi`](api::HttpPostsApi)
/// - [`PostalLookup`](api::PostalLookup) / [`ViaCepLookup`](api::ViaCepLookup)
pub mod api;

/// Maps API records into feed posts.
pub mod normalizer;

/// Paginated feed state and search.
pub mod feed;

/// Compose-screen state: masking, validation, address resolution, submission.
pub mod form;
