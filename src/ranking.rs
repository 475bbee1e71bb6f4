// src/ranking.rs
//! Quality gate and Bayesian-average scoring.
//!
//! The Bayesian average shrinks a place's raw rating `R` (from `v` reviews)
//! toward a baseline `C` with prior weight `m`:
//!
//! bayesian = v/(v+m) * R + m/(v+m) * C
//!
//! Sparse-review places land near `C`; heavily reviewed ones near `R`.

use crate::places::{Candidate, Place};

/// Rating/review-count thresholds applied to nearby-search candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityFilter {
    min_rating: f64,
    min_reviews: u32,
}

impl QualityFilter {
    pub fn new(min_rating: f64, min_reviews: u32) -> Self {
        Self {
            min_rating,
            min_reviews,
        }
    }

    pub fn passes(&self, candidate: &Candidate) -> bool {
        candidate.rating >= self.min_rating && candidate.review_count >= self.min_reviews
    }

    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    pub fn min_reviews(&self) -> u32 {
        self.min_reviews
    }
}

/// Prior constants for the Bayesian average (`m`, `C`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesianPrior {
    weight: f64,
    baseline: f64,
}

impl BayesianPrior {
    pub fn new(weight: f64, baseline: f64) -> Self {
        Self { weight, baseline }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Smoothed rating for `rating` backed by `reviews` reviews.
    pub fn score(&self, rating: f64, reviews: u32) -> f64 {
        bayesian_rating(rating, reviews, self.weight, self.baseline)
    }
}

/// `(v/(v+m))·R + (m/(v+m))·C`. With no evidence at all (`v + m == 0`) the
/// baseline is returned.
pub fn bayesian_rating(rating: f64, reviews: u32, prior_weight: f64, baseline: f64) -> f64 {
    let v = f64::from(reviews);
    let m = prior_weight;
    let denom = v + m;
    if denom <= 0.0 {
        return baseline;
    }
    (v / denom) * rating + (m / denom) * baseline
}

/// Stable sort by descending Bayesian rating; ties keep upstream order.
pub fn rank_by_bayesian(places: &mut [Place]) {
    places.sort_by(|a, b| b.bayesian_rating().total_cmp(&a.bayesian_rating()));
}
