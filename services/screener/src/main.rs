use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting swing screener...");

    let config = screener::ScreenerConfig::from_env();
    info!(
        "Scan policy: {}+ of 5 criteria, {} bars minimum",
        config.analysis.min_criteria, config.analysis.min_bars
    );

    let source: Arc<dyn market_data::WeeklySource> = Arc::new(market_data::YahooChartClient::new());
    info!("✓ Price source initialized ({})", source.name());

    let universe = market_data::universe::listings();
    info!(
        "✓ Universe loaded: {} symbols across {} sectors",
        universe.len(),
        market_data::universe::sector_breakdown().len()
    );

    let state = Arc::new(screener::AppState::new(source, universe, config));
    let app = screener::app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🚀 Screener listening on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
