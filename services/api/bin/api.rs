//! Main Entrypoint for the Studychat API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the lesson catalog and the base system prompt.
//! 3. Initializing the chat model client and the export registry.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::{net::SocketAddr, path::Path, sync::Arc};
use studychat_api::{
    config::{Config, Provider},
    router::create_router,
    state::ServiceState,
};
use studychat_core::{
    catalog::LessonCatalog,
    engine::Orchestrator,
    export::ExportRegistry,
    llm::OpenAICompatibleClient,
    prompt,
    slides::MarkdownDeckExporter,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Loads the base system prompt, falling back to the built-in default when
/// no prompt file is present.
fn load_system_prompt(prompts_path: &Path) -> anyhow::Result<String> {
    let path = prompts_path.join("system_prompt.md");
    if path.is_file() {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(contents);
    }
    warn!(path = %path.display(), "No system prompt file found; using the built-in default");
    Ok(prompt::SYSTEM_PROMPT_BASE.to_string())
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

    // --- 3. Load Lessons and Prompts ---
    let catalog = Arc::new(
        LessonCatalog::load_dir(&config.lessons_path)
            .with_context(|| format!("Failed to scan {}", config.lessons_path.display()))?,
    );
    if catalog.is_empty() {
        warn!(path = %config.lessons_path.display(), "No lessons found; only plain chat is available");
    } else {
        info!(count = catalog.len(), "Lesson catalog loaded.");
    }
    let system_prompt = Arc::new(load_system_prompt(&config.prompts_path)?);

    // --- 4. Initialize Shared Services ---
    let openai_config = match &config.provider {
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY is required for the 'openai' provider")?;
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1/")
        }
        Provider::Gemini => {
            info!("Using Gemini provider.");
            let api_key = config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY is required for the 'gemini' provider")?;
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai")
        }
    };
    let chat_client = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
    ));

    let mut exporters = ExportRegistry::new();
    exporters.register(
        "dmaic",
        Arc::new(MarkdownDeckExporter::new(
            config.exports_path.clone(),
            "DMAIC Summary",
        )),
    );

    let orchestrator = Arc::new(Orchestrator::new(chat_client, exporters, system_prompt));

    let state = ServiceState {
        catalog,
        orchestrator,
        config: Arc::new(config.clone()),
    };

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
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
