// src/places/client.rs
//! Google Places web-service client (nearby search + place details).

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use super::{Candidate, Coordinates, NearbyPage, PageToken, Place, PlaceDetails, PlacesApi};
use crate::config::{ApiKey, SearchConfig};
use crate::error::UpstreamError;
use crate::ranking::BayesianPrior;

const USER_AGENT: &str = concat!("places-finder/", env!("CARGO_PKG_VERSION"));

/// Attributes requested from the details endpoint; exactly what a `Place` carries.
const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,url,opening_hours,rating,user_ratings_total,geometry";

// ------------------------------------------------------------
// Wire format
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    user_ratings_total: u32,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: DetailsResult,
}

#[derive(Debug, Default, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    formatted_phone_number: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    user_ratings_total: u32,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    location: Option<Coordinates>,
}

fn check_status(
    status: Option<String>,
    message: Option<String>,
    accepted: &[&str],
) -> Result<(), UpstreamError> {
    match status {
        None => Ok(()),
        Some(s) if accepted.contains(&s.as_str()) => Ok(()),
        Some(s) => Err(UpstreamError::Status {
            status: s,
            message: message.unwrap_or_default(),
        }),
    }
}

pub(crate) fn parse_nearby(body: &[u8]) -> Result<NearbyPage, UpstreamError> {
    let resp: NearbyResponse = serde_json::from_slice(body)?;
    check_status(resp.status, resp.error_message, &["OK", "ZERO_RESULTS"])?;
    let candidates = resp
        .results
        .into_iter()
        .map(|r| Candidate {
            id: r.place_id,
            rating: r.rating,
            review_count: r.user_ratings_total,
        })
        .collect();
    Ok(NearbyPage {
        candidates,
        next_page_token: resp.next_page_token.and_then(PageToken::new),
    })
}

pub(crate) fn parse_details(body: &[u8]) -> Result<PlaceDetails, UpstreamError> {
    let resp: DetailsResponse = serde_json::from_slice(body)?;
    check_status(resp.status, resp.error_message, &["OK"])?;
    let r = resp.result;
    let opening_hours = r
        .opening_hours
        .map(|h| h.weekday_text.join("; "))
        .unwrap_or_default();
    Ok(PlaceDetails {
        name: r.name,
        address: r.formatted_address,
        phone: r.formatted_phone_number,
        website: r.website,
        url: r.url,
        opening_hours,
        rating: r.rating,
        review_count: r.user_ratings_total,
        location: r.geometry.and_then(|g| g.location),
    })
}

// ------------------------------------------------------------
// Client
// ------------------------------------------------------------

pub struct GooglePlacesClient {
    http: reqwest::Client,
    api_base: String,
    key: ApiKey,
    prior: BayesianPrior,
}

impl GooglePlacesClient {
    /// Shared HTTP client with the configured per-call timeouts.
    pub fn http_client(cfg: &SearchConfig) -> Result<reqwest::Client, UpstreamError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(http)
    }

    pub fn new(cfg: &SearchConfig, key: ApiKey) -> Result<Self, UpstreamError> {
        Ok(Self::with_http(Self::http_client(cfg)?, cfg, key))
    }

    /// Reuse an existing connection pool (the server builds one per process).
    pub fn with_http(http: reqwest::Client, cfg: &SearchConfig, key: ApiKey) -> Self {
        Self {
            http,
            api_base: cfg.upstream.api_base.clone(),
            key,
            prior: cfg.prior(),
        }
    }

    async fn get(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, UpstreamError> {
        counter!("places_upstream_requests_total", "endpoint" => endpoint).increment(1);
        let result = self.send_get(endpoint, query).await;
        if result.is_err() {
            counter!("places_upstream_errors_total", "endpoint" => endpoint).increment(1);
        }
        result
    }

    async fn send_get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, UpstreamError> {
        let url = format!("{}/{}/json", self.api_base, endpoint);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.key.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(status));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn fetch_nearby(
        &self,
        location: Coordinates,
        category: &str,
        page_token: Option<&PageToken>,
    ) -> Result<NearbyPage, UpstreamError> {
        let loc = location.to_query();
        let mut query = vec![
            ("location", loc.as_str()),
            ("rankby", "distance"),
            ("type", category),
        ];
        if let Some(token) = page_token {
            query.push(("pagetoken", token.as_str()));
        }
        let body = self.get("nearbysearch", &query).await?;
        let page = parse_nearby(&body).inspect_err(|_| {
            counter!("places_upstream_errors_total", "endpoint" => "nearbysearch").increment(1);
        })?;
        tracing::debug!(
            category,
            candidates = page.candidates.len(),
            has_next = page.next_page_token.is_some(),
            "nearby page fetched"
        );
        Ok(page)
    }

    async fn fetch_details(&self, id: &str) -> Result<Place, UpstreamError> {
        let body = self
            .get("details", &[("place_id", id), ("fields", DETAIL_FIELDS)])
            .await?;
        let details = parse_details(&body).inspect_err(|_| {
            counter!("places_upstream_errors_total", "endpoint" => "details").increment(1);
        })?;
        Ok(details.into_place(id, &self.prior))
    }

    fn name(&self) -> &'static str {
        "google-places"
    }
}
