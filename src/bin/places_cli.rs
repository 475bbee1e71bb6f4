//! Standalone search: reads the key once, runs one search, prints the places.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use places_finder::ranking::rank_by_bayesian;
use places_finder::{
    init_tracing, ApiKey, Coordinates, GooglePlacesClient, Orchestrator, Place, SearchConfig,
    SearchRequest,
};

#[derive(Debug, Parser)]
#[command(
    name = "places-cli",
    about = "Find well-rated places near a point using the Google Places API",
    version
)]
struct Cli {
    /// Latitude of the search centre.
    #[arg(long, default_value_t = 50.061947, allow_hyphen_values = true)]
    lat: f64,
    /// Longitude of the search centre.
    #[arg(long, default_value_t = 19.936856, allow_hyphen_values = true)]
    lng: f64,
    /// Place type to search for (e.g. restaurant, bar, cafe).
    #[arg(long, default_value = "restaurant")]
    category: String,
    /// Maximum number of places to return.
    #[arg(long, default_value_t = 20)]
    limit: usize,
    /// Path to the TOML config (defaults to $PLACES_CONFIG_PATH or config/places.toml).
    #[arg(long, value_name = "path")]
    config: Option<PathBuf>,
    /// Sort by Bayesian rating instead of distance.
    #[arg(long)]
    ranked: bool,
    /// Print a JSON array instead of one line per place.
    #[arg(long)]
    json: bool,
}

fn print_place(p: &Place) {
    println!(
        "Name: {}, PlaceID: {}, Address: {}, Phone: {}, Website: {}, URL: {}, Opening Hours: {}, Rating: {:.1}, Reviews: {}, Bayesian Rating: {:.2}",
        p.name(),
        p.id(),
        p.address(),
        p.phone(),
        p.website(),
        p.url(),
        p.opening_hours(),
        p.rating(),
        p.review_count(),
        p.bayesian_rating()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SearchConfig::load_from(path)?,
        None => SearchConfig::load()?,
    };

    let location = Coordinates::new(cli.lat, cli.lng);
    if !location.is_valid() {
        anyhow::bail!("coordinates out of range: {},{}", cli.lat, cli.lng);
    }

    // Read once for the whole process.
    let key = ApiKey::from_file(&config.upstream.api_key_path)?;
    let client = GooglePlacesClient::new(&config, key)?;
    let orchestrator = Orchestrator::new(Arc::new(client), &config);

    let request = SearchRequest {
        location,
        category: cli.category.clone(),
        limit: cli.limit,
    };
    let mut places = orchestrator.search(&request).await?;
    if cli.ranked {
        rank_by_bayesian(&mut places);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&places)?);
    } else {
        places.iter().for_each(print_place);
    }
    Ok(())
}
