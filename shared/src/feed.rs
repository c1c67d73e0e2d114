//! Append-only paginated feed.
//!
//! The controller only decides *whether* and *which* page to request and how
//! to fold the answer back in. Issuing the request is the caller's job, which
//! keeps every transition testable without a runtime.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{FetchError, PageRequest, RequestId};
use crate::model::Item;
use crate::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadKind {
    /// Nothing loaded yet; the whole screen shows a loader.
    Initial,
    /// Appending below existing items; a footer spinner.
    More,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct InFlight {
    request: PageRequest,
    kind: LoadKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Appended { page: u32, count: usize, exhausted: bool },
    Failed(FetchError),
    /// Response for a request this controller is not waiting on.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedController {
    items: Vec<Item>,
    page: u32,
    page_size: usize,
    has_more: bool,
    // A single slot: both loading flags derive from it, so they can never
    // both be set and a second fetch can never be issued.
    in_flight: Option<InFlight>,
    error: Option<CatalogError>,
}

impl FeedController {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            has_more: true,
            in_flight: None,
            error: None,
        }
    }

    /// Returns the page to fetch, or `None` when loading or exhausted.
    pub fn load_next(&mut self) -> Option<PageRequest> {
        if let Some(flight) = &self.in_flight {
            debug!(
                page = flight.request.page,
                "feed: load already in flight, ignoring"
            );
            return None;
        }

        if !self.has_more {
            debug!(page = self.page, "feed: exhausted, ignoring");
            return None;
        }

        let kind = if self.items.is_empty() {
            LoadKind::Initial
        } else {
            LoadKind::More
        };

        let request = PageRequest::new(self.page, self.page_size);
        info!(
            page = request.page,
            page_size = request.page_size,
            request_id = %request.id,
            ?kind,
            "feed: requesting page"
        );

        self.error = None;
        self.in_flight = Some(InFlight {
            request: request.clone(),
            kind,
        });

        Some(request)
    }

    pub fn apply(
        &mut self,
        request_id: &RequestId,
        result: Result<Vec<Item>, FetchError>,
    ) -> FeedOutcome {
        let expected = self
            .in_flight
            .as_ref()
            .is_some_and(|flight| &flight.request.id == request_id);

        if !expected {
            warn!(%request_id, "feed: dropping response for unknown request");
            return FeedOutcome::Stale;
        }

        let Some(flight) = self.in_flight.take() else {
            return FeedOutcome::Stale;
        };

        match result {
            Ok(items) => {
                let count = items.len();
                let page = flight.request.page;

                self.has_more = count >= flight.request.page_size;
                self.items.extend(items);
                self.page = page + 1;

                info!(
                    page,
                    count,
                    total = self.items.len(),
                    has_more = self.has_more,
                    "feed: page appended"
                );

                FeedOutcome::Appended {
                    page,
                    count,
                    exhausted: !self.has_more,
                }
            }
            Err(e) => {
                warn!(page = flight.request.page, error = %e, "feed: page fetch failed");
                self.error = Some(CatalogError::Fetch(e.clone()));
                FeedOutcome::Failed(e)
            }
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading_initial(&self) -> bool {
        matches!(&self.in_flight, Some(f) if f.kind == LoadKind::Initial)
    }

    pub fn is_loading_more(&self) -> bool {
        matches!(&self.in_flight, Some(f) if f.kind == LoadKind::More)
    }

    /// The page request currently awaiting a response.
    pub fn pending_request(&self) -> Option<&PageRequest> {
        self.in_flight.as_ref().map(|flight| &flight.request)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }
}
