// src/lib.rs
// Public library surface for the server, the CLI and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod places;
pub mod ranking;
pub mod search;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{ApiKey, SearchConfig};
pub use crate::error::{ApiError, UpstreamError};
pub use crate::places::{Coordinates, GooglePlacesClient, Place, PlacesApi};
pub use crate::search::{Orchestrator, SearchRequest};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber used by both binaries.
///
/// `RUST_LOG` wins; otherwise `places_finder=info,warn`. Set `PLACES_LOG_JSON=1`
/// for JSON lines. A subscriber installed by the host runtime is left alone.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("places_finder=info,warn"));
    let json = std::env::var("PLACES_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}
