//! Run one analysis against a live backend and print the progress as it streams in.
//!
//! ```text
//! EARNINGS_API_URL=http://localhost:8000/api cargo run --example analyze -- AAPL Q4-2025
//! ```

use earnings_client::{ClientConfig, EarningsClient, models::EarningsAnalysis};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("earnings_client=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(ticker), Some(quarter)) = (args.next(), args.next()) else {
        eprintln!("usage: analyze <TICKER> <QUARTER>");
        std::process::exit(2);
    };

    let client = EarningsClient::new(ClientConfig::from_env()?)?;
    let result = client
        .trigger_analysis(&ticker, &quarter, |message| {
            println!("... {}", message.unwrap_or("working"));
        })
        .await?;

    match result.parse::<EarningsAnalysis>() {
        Ok(analysis) => {
            println!("{} {}", analysis.ticker, analysis.quarter.as_deref().unwrap_or("?"));
            println!(
                "EPS {:?} vs {:?}, sentiment {:?}",
                analysis.eps_actual, analysis.eps_estimate, analysis.sentiment
            );
            if let Some(guidance) = analysis.guidance_summary {
                println!("{guidance}");
            }
        }
        Err(e) => {
            eprintln!("unexpected result shape at {}: {e}", e.path());
            println!("{:#}", result.as_value());
        }
    }
    Ok(())
}
