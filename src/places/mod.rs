// src/places/mod.rs
//! Place data model and the upstream places API abstraction.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::UpstreamError;
use crate::ranking::BayesianPrior;

pub use client::GooglePlacesClient;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// `lat,lng` with six decimals, as the nearby-search endpoint expects.
    pub fn to_query(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Opaque next-page cursor handed out by the upstream service.
#[derive(Clone, PartialEq, Eq)]
pub struct PageToken(String);

impl PageToken {
    /// Empty tokens mean "no more pages".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageToken(len={})", self.0.len())
    }
}

/// Lightweight nearby-search record, enough to decide on a details call.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub rating: f64,
    pub review_count: u32,
}

/// One page of nearby-search results, in upstream order.
#[derive(Debug, Clone, Default)]
pub struct NearbyPage {
    pub candidates: Vec<Candidate>,
    pub next_page_token: Option<PageToken>,
}

/// Raw details for a place, before scoring.
#[derive(Debug, Clone, Default)]
pub struct PlaceDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub url: String,
    pub opening_hours: String,
    pub rating: f64,
    pub review_count: u32,
    pub location: Option<Coordinates>,
}

impl PlaceDetails {
    /// The only way to build a [`Place`]: the Bayesian rating is computed here.
    pub fn into_place(self, id: impl Into<String>, prior: &BayesianPrior) -> Place {
        let bayesian_rating = prior.score(self.rating, self.review_count);
        Place {
            id: id.into(),
            name: self.name,
            address: self.address,
            phone: self.phone,
            website: self.website,
            url: self.url,
            opening_hours: self.opening_hours,
            rating: self.rating,
            review_count: self.review_count,
            bayesian_rating,
            location: self.location,
        }
    }
}

/// An enriched, scored place. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    id: String,
    name: String,
    address: String,
    phone: String,
    website: String,
    url: String,
    opening_hours: String,
    rating: f64,
    review_count: u32,
    bayesian_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Coordinates>,
}

impl Place {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn address(&self) -> &str {
        &self.address
    }
    pub fn phone(&self) -> &str {
        &self.phone
    }
    pub fn website(&self) -> &str {
        &self.website
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn opening_hours(&self) -> &str {
        &self.opening_hours
    }
    pub fn rating(&self) -> f64 {
        self.rating
    }
    pub fn review_count(&self) -> u32 {
        self.review_count
    }
    pub fn bayesian_rating(&self) -> f64 {
        self.bayesian_rating
    }
    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }
}

/// The two upstream calls the search loop depends on.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    async fn fetch_nearby(
        &self,
        location: Coordinates,
        category: &str,
        page_token: Option<&PageToken>,
    ) -> Result<NearbyPage, UpstreamError>;

    /// Details for one place, scored with the client's prior.
    async fn fetch_details(&self, id: &str) -> Result<Place, UpstreamError>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_token_is_absent() {
        assert!(PageToken::new("").is_none());
        let t = PageToken::new("abc").unwrap();
        assert_eq!(t.as_str(), "abc");
    }

    #[test]
    fn coordinates_query_and_validation() {
        let c = Coordinates::new(50.06, 19.93);
        assert_eq!(c.to_query(), "50.060000,19.930000");
        assert!(c.is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn place_serializes_camel_case_without_missing_location() {
        let prior = BayesianPrior::new(50.0, 4.0);
        let p = PlaceDetails {
            name: "Cafe".into(),
            rating: 5.0,
            review_count: 200,
            ..Default::default()
        }
        .into_place("id-1", &prior);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["id"], "id-1");
        assert_eq!(v["reviewCount"], 200);
        assert!((v["bayesianRating"].as_f64().unwrap() - 4.8).abs() < 1e-9);
        assert!(v.get("location").is_none());
        assert_eq!(v["openingHours"], "");
    }
}
