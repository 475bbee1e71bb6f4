// src/search.rs
//! Search loop: nearby pages → quality filter → dedup → details → accumulate.
//!
//! The filter runs on the cheap nearby record so that a details call is only
//! spent on candidates that can make it into the result. The limit is checked
//! both before each page and before each candidate.

use metrics::{counter, histogram};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::UpstreamError;
use crate::places::{Candidate, Coordinates, PageToken, Place, PlacesApi};
use crate::ranking::QualityFilter;

/// One incoming search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub location: Coordinates,
    pub category: String,
    pub limit: usize,
}

/// Why the loop stopped. Only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    LimitReached,
    PagesExhausted,
}

#[derive(Debug, Default)]
struct SearchStats {
    pages: u32,
    details_calls: u32,
    details_failures: u32,
}

pub struct Orchestrator {
    api: Arc<dyn PlacesApi>,
    filter: QualityFilter,
    page_token_delay: Duration,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn PlacesApi>, cfg: &SearchConfig) -> Self {
        Self {
            api,
            filter: cfg.quality_filter(),
            page_token_delay: cfg.page_token_delay(),
        }
    }

    pub fn with_filter(mut self, filter: QualityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_page_token_delay(mut self, delay: Duration) -> Self {
        self.page_token_delay = delay;
        self
    }

    /// Run one search. A failed nearby call aborts; a failed details call
    /// only drops that candidate.
    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<Place>, UpstreamError> {
        let mut results: Vec<Place> = Vec::with_capacity(req.limit.min(64));
        let mut seen: HashSet<String> = HashSet::new();
        let mut token: Option<PageToken> = None;
        let mut stats = SearchStats::default();

        let reason = loop {
            if results.len() >= req.limit {
                break StopReason::LimitReached;
            }
            if token.is_some() && !self.page_token_delay.is_zero() {
                tokio::time::sleep(self.page_token_delay).await;
            }

            let page = self
                .api
                .fetch_nearby(req.location, &req.category, token.as_ref())
                .await?;
            stats.pages += 1;

            if self
                .collect_page(req, page.candidates, &mut results, &mut seen, &mut stats)
                .await
            {
                break StopReason::LimitReached;
            }

            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break StopReason::PagesExhausted,
            }
        };

        histogram!("places_search_results").record(results.len() as f64);
        info!(
            provider = self.api.name(),
            category = %req.category,
            limit = req.limit,
            pages = stats.pages,
            details_calls = stats.details_calls,
            details_failures = stats.details_failures,
            results = results.len(),
            stop = ?reason,
            "search finished"
        );
        Ok(results)
    }

    /// Returns true once the limit is hit mid-page.
    async fn collect_page(
        &self,
        req: &SearchRequest,
        candidates: Vec<Candidate>,
        results: &mut Vec<Place>,
        seen: &mut HashSet<String>,
        stats: &mut SearchStats,
    ) -> bool {
        for cand in candidates {
            if results.len() >= req.limit {
                return true;
            }
            if !self.filter.passes(&cand) {
                debug!(place_id = %cand.id, rating = cand.rating, reviews = cand.review_count, "below quality threshold");
                continue;
            }
            if cand.id.is_empty() {
                debug!("candidate without place id");
                continue;
            }
            if seen.contains(&cand.id) {
                debug!(place_id = %cand.id, "duplicate across pages");
                continue;
            }

            stats.details_calls += 1;
            match self.api.fetch_details(&cand.id).await {
                Ok(place) => {
                    seen.insert(cand.id);
                    results.push(place);
                }
                Err(e) => {
                    stats.details_failures += 1;
                    counter!("places_details_skipped_total").increment(1);
                    warn!(error = %e, place_id = %cand.id, "details fetch failed, skipping place");
                }
            }
        }
        results.len() >= req.limit
    }
}
