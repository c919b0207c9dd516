//! Main Entrypoint for the PREPY API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing shared services (the generative backend and the
//!    telephony dispatcher).
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use prepy_api::{config::Config, router::create_router, state::AppState};
use prepy_core::{
    analysis::TranscriptAnalyzer,
    backend::{GenerativeBackend, OllamaClient},
    dialogue::DialogueOrchestrator,
    evaluation::EvaluationService,
    outcome::OutcomeRouter,
    telephony::{CallDispatcher, DisabledDispatcher, TwilioCaller},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let backend: Arc<dyn GenerativeBackend> = Arc::new(
        OllamaClient::new(
            config.ollama_base_url.clone(),
            config.chat_model.clone(),
            config.backend_timeout,
        )
        .context("Failed to build Ollama client")?,
    );

    let telephony: Arc<dyn CallDispatcher> = match &config.twilio {
        Some(twilio) => {
            info!(from = %twilio.from_number, "Twilio telephony enabled.");
            Arc::new(
                TwilioCaller::new(
                    twilio.account_sid.clone(),
                    twilio.auth_token.clone(),
                    twilio.from_number.clone(),
                    twilio.to_number.clone(),
                )
                .context("Failed to build Twilio client")?,
            )
        }
        None => {
            info!("Twilio telephony disabled; outcome calls will be skipped.");
            Arc::new(DisabledDispatcher)
        }
    };

    let orchestrator = Arc::new(DialogueOrchestrator::new(backend.clone()));
    let analyzer = TranscriptAnalyzer::new(backend);
    let outcome_router = OutcomeRouter::new(telephony);
    let evaluation = Arc::new(EvaluationService::new(analyzer, outcome_router));

    let app_state = Arc::new(AppState {
        orchestrator,
        evaluation,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        model = %config.chat_model,
        backend = %config.ollama_base_url,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
