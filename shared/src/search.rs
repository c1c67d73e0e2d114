//! Full-dataset search.
//!
//! Every call fetches the whole catalog and filters it locally. Calls are
//! independent: nothing is cached, debounced or cancelled, and the state left
//! behind is whichever search settled last. Only requests this controller
//! issued can settle it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{FetchError, RequestId};
use crate::model::Item;
use crate::CatalogError;

/// A search waiting on the full fetch. Carries its own query so it can
/// settle correctly even after a newer search has replaced the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub id: RequestId,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchState {
    pub query: String,
    pub is_searching: bool,
    pub error: Option<CatalogError>,
    pub results: Option<Vec<Item>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Matched(Vec<Item>),
    Failed(CatalogError),
    /// Response for a request this controller is not waiting on.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchController {
    state: Option<SearchState>,
    pending: HashSet<RequestId>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a search. A blank query fails fast and needs no fetch.
    pub fn search(&mut self, query: &str) -> Result<SearchRequest, CatalogError> {
        if query.trim().is_empty() {
            debug!("search: rejected blank query");
            self.state = Some(SearchState {
                query: query.to_string(),
                is_searching: self.is_searching(),
                error: Some(CatalogError::Validation),
                results: None,
            });
            return Err(CatalogError::Validation);
        }

        let request = SearchRequest {
            id: RequestId::generate(),
            query: query.to_string(),
        };
        self.pending.insert(request.id.clone());
        self.state = Some(SearchState {
            query: request.query.clone(),
            is_searching: true,
            error: None,
            results: None,
        });

        info!(request_id = %request.id, pending = self.pending.len(), "search: fetching full catalog");
        Ok(request)
    }

    /// Settles `request`. Requests not issued by this controller leave it
    /// untouched.
    pub fn complete(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<Item>, FetchError>,
    ) -> SearchOutcome {
        if !self.pending.remove(&request.id) {
            warn!(request_id = %request.id, "search: dropping response for unknown request");
            return SearchOutcome::Stale;
        }
        let is_searching = self.is_searching();

        let (state, outcome) = match result {
            Ok(all) => {
                let total = all.len();
                let matches = filter_by_display_name(all, &request.query);
                if matches.is_empty() {
                    debug!(request_id = %request.id, total, "search: no results");
                    let error = CatalogError::NoResults {
                        query: request.query.clone(),
                    };
                    let state = SearchState {
                        query: request.query.clone(),
                        is_searching,
                        error: Some(error.clone()),
                        results: None,
                    };
                    (state, SearchOutcome::Failed(error))
                } else {
                    info!(request_id = %request.id, total, matched = matches.len(), "search: settled");
                    let state = SearchState {
                        query: request.query.clone(),
                        is_searching,
                        error: None,
                        results: Some(matches.clone()),
                    };
                    (state, SearchOutcome::Matched(matches))
                }
            }
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "search: catalog fetch failed");
                let error = CatalogError::Fetch(e);
                let state = SearchState {
                    query: request.query.clone(),
                    is_searching,
                    error: Some(error.clone()),
                    results: None,
                };
                (state, SearchOutcome::Failed(error))
            }
        };

        self.state = Some(state);
        outcome
    }

    /// The user left the results view.
    pub fn dismiss(&mut self) {
        self.state = None;
    }

    /// Drops a displayed error, keeping any pending search visible.
    pub fn clear_error(&mut self) {
        let discard = match &mut self.state {
            Some(state) if state.results.is_none() && !state.is_searching => true,
            Some(state) => {
                state.error = None;
                false
            }
            None => false,
        };
        if discard {
            self.state = None;
        }
    }

    pub fn state(&self) -> Option<&SearchState> {
        self.state.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.contains(id)
    }
}

/// Case-insensitive substring match on `display_name`, provider order kept.
pub fn filter_by_display_name(items: Vec<Item>, query: &str) -> Vec<Item> {
    let needle = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| item.display_name.to_lowercase().contains(&needle))
        .collect()
}
