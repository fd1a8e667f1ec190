use anyhow::{Context, Result};
use clap::Parser;
use geovoice::collab::{MessagingPort, WeatherPort, WhatsappClient, WeatherClient};
use geovoice::geo::{
    Geocoder, NatsPositionSource, NominatimClient, OrsClient, PositionSource, RouteOrchestrator,
    RouteService,
};
use geovoice::{
    create_router, shared_session, AppState, CommandDispatcher, Config, IntentInterpreter,
    JourneyTracker, NatsBridge, Notifier, SpeechCaptureLoop,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "geovoice", about = "Voice-command orchestration engine")]
struct Cli {
    /// Config file (without extension), as read by the config crate.
    #[arg(long, default_value = "config/geovoice")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let nats = async_nats::connect(&cfg.nats.url)
        .await
        .context("Failed to connect to NATS")?;
    info!("Connected to NATS at {}", cfg.nats.url);

    let bridge = Arc::new(NatsBridge::new(nats.clone()));
    let notifier: Arc<dyn Notifier> = bridge.clone();

    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimClient::new(cfg.geocoding.clone())?);
    let route_service: Arc<dyn RouteService> = Arc::new(OrsClient::new(cfg.routing.clone())?);
    let positions: Arc<dyn PositionSource> = Arc::new(NatsPositionSource::new(
        nats.clone(),
        Duration::from_millis(cfg.nats.position_query_timeout_ms),
    ));
    let weather: Arc<dyn WeatherPort> = Arc::new(WeatherClient::new(cfg.weather.clone())?);
    let messaging: Arc<dyn MessagingPort> = Arc::new(WhatsappClient::new(cfg.messaging.clone())?);

    let session = shared_session();
    let tracker = JourneyTracker::new(session.clone(), positions.clone(), notifier.clone());
    let routes = RouteOrchestrator::new(geocoder.clone(), route_service);
    let dispatcher = Arc::new(CommandDispatcher::new(
        session.clone(),
        notifier.clone(),
        geocoder,
        routes,
        tracker.clone(),
        positions,
        weather,
        messaging,
    ));
    let interpreter = Arc::new(IntentInterpreter::new(cfg.llm.clone())?);

    let capture = SpeechCaptureLoop::new(
        nats,
        interpreter.clone(),
        dispatcher.clone(),
        notifier.clone(),
    );

    let state = AppState {
        capture: capture.clone(),
        dispatcher,
        interpreter,
        session,
        bridge,
    };

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP control API listening on {addr}");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // The journey watch must be released on every exit path.
    capture.stop().await;
    tracker.release().await;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("shutdown signal received");
}
