// tests/common/mod.rs
//
// A scripted stand-in for the Google Places web service, served by axum on an
// ephemeral local port. Pages are keyed by `pagetoken` ("" for the first
// page); details by `place_id`. Unknown ids answer HTTP 500.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use places_finder::SearchConfig;
use serde_json::{json, Value};

#[derive(Default)]
pub struct Script {
    pub pages: HashMap<String, Value>,
    pub details: HashMap<String, Value>,
}

#[derive(Default)]
pub struct Calls {
    pub nearby: Vec<HashMap<String, String>>,
    pub details: Vec<HashMap<String, String>>,
}

#[derive(Clone)]
struct StubState {
    script: Arc<Script>,
    calls: Arc<Mutex<Calls>>,
}

pub struct StubUpstream {
    /// e.g. `http://127.0.0.1:41234/place`
    pub api_base: String,
    calls: Arc<Mutex<Calls>>,
}

impl StubUpstream {
    pub async fn start(script: Script) -> Self {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let state = StubState {
            script: Arc::new(script),
            calls: calls.clone(),
        };
        let app = Router::new()
            .route("/place/nearbysearch/json", get(nearby))
            .route("/place/details/json", get(details))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub upstream serve");
        });

        Self {
            api_base: format!("http://{addr}/place"),
            calls,
        }
    }

    pub fn nearby_calls(&self) -> Vec<HashMap<String, String>> {
        self.calls.lock().unwrap().nearby.clone()
    }

    pub fn details_ids(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .details
            .iter()
            .map(|q| q.get("place_id").cloned().unwrap_or_default())
            .collect()
    }

    pub fn details_calls(&self) -> Vec<HashMap<String, String>> {
        self.calls.lock().unwrap().details.clone()
    }
}

async fn nearby(
    State(st): State<StubState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let token = q.get("pagetoken").cloned().unwrap_or_default();
    st.calls.lock().unwrap().nearby.push(q);
    match st.script.pages.get(&token) {
        Some(v) => Json(v.clone()).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no such page").into_response(),
    }
}

async fn details(
    State(st): State<StubState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let id = q.get("place_id").cloned().unwrap_or_default();
    st.calls.lock().unwrap().details.push(q);
    match st.script.details.get(&id) {
        Some(v) => Json(v.clone()).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

// --- JSON builders ---

pub fn nearby_result(id: &str, rating: f64, reviews: u32) -> Value {
    json!({ "place_id": id, "name": format!("Place {id}"), "rating": rating, "user_ratings_total": reviews })
}

pub fn nearby_page(results: Vec<Value>, next: Option<&str>) -> Value {
    let mut v = json!({ "status": "OK", "results": results });
    if let Some(t) = next {
        v["next_page_token"] = json!(t);
    }
    v
}

pub fn details_ok(name: &str, rating: f64, reviews: u32) -> Value {
    json!({
        "status": "OK",
        "result": {
            "name": name,
            "formatted_address": format!("{name} street 1"),
            "formatted_phone_number": "+48 12 000 00 00",
            "website": "https://example.org",
            "url": format!("https://maps.google.com/?q={name}"),
            "opening_hours": { "weekday_text": ["Monday: 9:00 AM – 5:00 PM", "Tuesday: Closed"] },
            "rating": rating,
            "user_ratings_total": reviews,
            "geometry": { "location": { "lat": 50.0615, "lng": 19.9372 } }
        }
    })
}

/// `(v/(v+50))·R + (50/(v+50))·4.0` — the default prior.
pub fn expected_bayesian(rating: f64, reviews: u32) -> f64 {
    let v = f64::from(reviews);
    (v / (v + 50.0)) * rating + (50.0 / (v + 50.0)) * 4.0
}

/// Writes a key file into `dir` and returns its path.
pub fn write_key(dir: &Path) -> PathBuf {
    let path = dir.join("api_key.txt");
    std::fs::write(&path, "test-key\n").expect("write key");
    path
}

/// Default thresholds, no page-token delay, upstream pointed at the stub.
pub fn test_config(api_base: &str, key_path: &Path) -> SearchConfig {
    let mut cfg = SearchConfig::default();
    cfg.upstream.api_base = api_base.to_string();
    cfg.upstream.api_key_path = key_path.to_path_buf();
    cfg.upstream.page_token_delay_ms = 0;
    cfg
}
