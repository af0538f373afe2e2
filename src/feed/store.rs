use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::watch;

use crate::api::PostsApi;
use crate::app::{Result, SosError};
use crate::domain::Post;
use crate::feed::filter::filter_posts;
use crate::normalizer::Normalizer;

/// Posts produced by one page request.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub page: u32,
    pub posts: Vec<Post>,
}

/// Handle for an issued page load. Responses are applied in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    seq: u64,
    page: u32,
}

impl PageRequest {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Paginated, in-memory post collection for one feed session.
///
/// Page 1 replaces the list, any later page appends. Nothing is deduplicated:
/// if the server's pages overlap, the overlap shows up twice.
pub struct FeedStore {
    posts: Vec<Post>,
    page: u32,
    next_seq: u64,
    next_apply: u64,
    pending: BTreeMap<u64, (u32, Result<Vec<Post>>)>,
    last_error: Option<String>,
    timeout: Duration,
    revision: watch::Sender<u64>,
}

impl FeedStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            posts: Vec::new(),
            page: 1,
            next_seq: 0,
            next_apply: 0,
            pending: BTreeMap::new(),
            last_error: None,
            timeout: Duration::from_secs(15),
            revision,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Most recently requested page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.next_apply < self.next_seq
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn filtered(&self, query: &str) -> Vec<&Post> {
        filter_posts(&self.posts, query)
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Issue a load for page `n` (pages start at 1).
    pub fn begin_load(&mut self, page: u32) -> PageRequest {
        let page = page.max(1);
        let request = PageRequest {
            seq: self.next_seq,
            page,
        };
        self.next_seq += 1;
        self.page = page;
        tracing::debug!("Loading page {} (seq {})", page, request.seq);
        self.revision.send_modify(|rev| *rev += 1);
        request
    }

    /// Advance to the next page. `None` while any load is outstanding.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.is_loading() {
            tracing::debug!("Next page requested while a load is in flight");
            return None;
        }
        Some(self.begin_load(self.page + 1))
    }

    /// Hand over a response. Responses that arrive ahead of earlier requests are
    /// held back until those earlier requests have been applied.
    pub fn apply(&mut self, request: PageRequest, result: Result<Vec<Post>>) {
        if request.seq < self.next_apply || request.seq >= self.next_seq {
            tracing::warn!("Ignoring response for unknown request seq {}", request.seq);
            return;
        }
        self.pending.insert(request.seq, (request.page, result));

        let mut changed = false;
        while let Some((page, result)) = self.pending.remove(&self.next_apply) {
            let seq = self.next_apply;
            self.next_apply += 1;
            self.apply_in_order(seq, page, result);
            changed = true;
        }

        if changed {
            self.revision.send_modify(|rev| *rev += 1);
        }
    }

    fn apply_in_order(&mut self, seq: u64, page: u32, result: Result<Vec<Post>>) {
        match result {
            Ok(posts) => {
                tracing::info!("Applied page {} with {} posts", page, posts.len());
                if page == 1 {
                    self.posts = posts;
                } else {
                    self.posts.extend(posts);
                }
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!("Loading page {} failed: {}", page, e);
                self.last_error = Some(e.to_string());
                // Let the user retry the same page if nothing newer was requested.
                if seq + 1 == self.next_seq && page > 1 && self.page == page {
                    self.page = page - 1;
                }
            }
        }
    }

    /// Fetch, normalize and apply page `n`. Returns how many posts the page held.
    pub async fn load_page(
        &mut self,
        api: &(dyn PostsApi + Send + Sync),
        normalizer: &Normalizer,
        page: u32,
    ) -> Result<usize> {
        let request = self.begin_load(page);
        self.fetch_and_apply(api, normalizer, request).await
    }

    /// Load the page after the current one; `Ok(None)` while a load is in flight.
    pub async fn load_next_page(
        &mut self,
        api: &(dyn PostsApi + Send + Sync),
        normalizer: &Normalizer,
    ) -> Result<Option<usize>> {
        let Some(request) = self.begin_next_page() else {
            return Ok(None);
        };
        self.fetch_and_apply(api, normalizer, request).await.map(Some)
    }

    async fn fetch_and_apply(
        &mut self,
        api: &(dyn PostsApi + Send + Sync),
        normalizer: &Normalizer,
        request: PageRequest,
    ) -> Result<usize> {
        match fetch_page(api, normalizer, request.page, self.timeout).await {
            Ok(page) => {
                let count = page.posts.len();
                self.apply(request, Ok(page.posts));
                Ok(count)
            }
            Err(e) => {
                self.apply(request, Err(SosError::Other(e.to_string())));
                Err(e)
            }
        }
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One page from the API, normalized, bounded by `timeout`.
pub async fn fetch_page(
    api: &(dyn PostsApi + Send + Sync),
    normalizer: &Normalizer,
    page: u32,
    timeout: Duration,
) -> Result<FeedPage> {
    let records = match tokio::time::timeout(timeout, api.list_posts(page)).await {
        Ok(result) => result?,
        Err(_) => return Err(SosError::Timeout(format!("loading page {page}"))),
    };
    Ok(FeedPage {
        page,
        posts: normalizer.normalize_all(records),
    })
}
