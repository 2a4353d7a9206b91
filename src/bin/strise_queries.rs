//! Runs the bundled Strise queries against one shared client and prints the
//! results.
//!
//! Configuration comes from `STRISE_*` environment variables; log verbosity
//! from `RUST_LOG` (default `info`).

use tracing_subscriber::{fmt, EnvFilter};

use strise_api::{queries, ApiContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let context = ApiContext::from_env()?;

    let (portfolios, companies, countries, trending) = tokio::join!(
        queries::get_portfolios(&context),
        queries::get_companies(&context, "Strise.ai"),
        queries::get_countries(&context, "norway"),
        queries::get_trending_in_country(&context, queries::NORWAY_ID),
    );

    print_result("Portfolios", portfolios?);
    print_result("Companies", companies?);
    print_result("Countries", countries?);
    print_result("Trending", trending?);

    Ok(())
}

fn print_result(label: &str, edges: Option<serde_json::Value>) {
    match edges {
        Some(edges) => println!(
            "{label}: {}",
            serde_json::to_string_pretty(&edges).unwrap_or_else(|_| edges.to_string())
        ),
        None => println!("{label}: no result"),
    }
}
