//! Research Assistant - document summarization and comprehension service
//!
//! Serves an HTTP API that summarizes uploaded documents, answers questions
//! about them and generates comprehension challenges, backed by a local
//! Ollama server with extractive fallbacks.

use std::env;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

use config::LogFormat;
use research_assistant::{
    api, config, middleware,
    services::{self, LanguageModel, OllamaClient, ResearchAssistant},
    AppConfig, AppState,
};

/// How often expired document sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Headroom on top of the upload limit for multipart framing
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("Research Assistant {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Some(pos) = args.iter().position(|arg| arg == "--write-default-config") {
        let path = args
            .get(pos + 1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.yaml"));
        AppConfig::create_default_config(&path)
            .with_context(|| format!("Failed to write default configuration to {:?}", path))?;
        println!("Default configuration written to {:?}", path);
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    if args.iter().any(|arg| arg == "--check-ollama") {
        return check_ollama(&config).await;
    }

    // The guard must live for the whole program so file logs are flushed
    let _log_guard = init_logging(&config);

    info!("Research Assistant {} starting up", env!("CARGO_PKG_VERSION"));

    let assistant = ResearchAssistant::connect(&config).await;
    info!(backend = assistant.backend(), "Assistant backend selected");

    let state = AppState::new(config.clone(), assistant);
    services::spawn_session_cleanup(state.sessions.clone(), SESSION_SWEEP_INTERVAL);

    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    if let Some(ref tls_config) = config.server.tls {
        info!("Starting HTTPS server on https://{}", addr);
        info!("TLS certificate: {:?}", tls_config.cert_file);

        let rustls_config = create_rustls_config(tls_config).await?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("Failed to bind to address")?;

        info!("HTTPS server is ready to accept connections");

        axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)?
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .context("HTTPS server error")?;
    } else {
        info!("Starting HTTP server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("Failed to bind to address")?;

        info!("HTTP server is ready to accept connections");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("HTTP server error")?;
    }

    Ok(())
}

/// Create RusTLS configuration from TLS config
async fn create_rustls_config(
    tls_config: &config::TlsConfig,
) -> Result<axum_server::tls_rustls::RustlsConfig> {
    use axum_server::tls_rustls::RustlsConfig;
    use rustls::crypto::aws_lc_rs::default_provider;
    use rustls::ServerConfig;

    let cert_file = std::fs::File::open(&tls_config.cert_file)
        .with_context(|| format!("Failed to open certificate file: {:?}", tls_config.cert_file))?;
    let mut cert_reader = BufReader::new(cert_file);
    let certs: Vec<_> = rustls_pemfile::certs(&mut cert_reader)
        .filter_map(|r| r.ok())
        .collect();

    if certs.is_empty() {
        anyhow::bail!("No certificates found in {:?}", tls_config.cert_file);
    }

    let key_file = std::fs::File::open(&tls_config.key_file)
        .with_context(|| format!("Failed to open key file: {:?}", tls_config.key_file))?;
    let mut key_reader = BufReader::new(key_file);
    let key = rustls_pemfile::private_key(&mut key_reader)
        .with_context(|| format!("Failed to read private key: {:?}", tls_config.key_file))?
        .ok_or_else(|| anyhow::anyhow!("No private key found in {:?}", tls_config.key_file))?;

    let versions: Vec<&'static rustls::SupportedProtocolVersion> =
        match tls_config.min_version.as_str() {
            "1.3" => vec![&rustls::version::TLS13],
            _ => vec![&rustls::version::TLS12, &rustls::version::TLS13],
        };

    info!("TLS configured with minimum version: {}", tls_config.min_version);

    let mut server_config = ServerConfig::builder_with_provider(default_provider().into())
        .with_protocol_versions(&versions)
        .context("Failed to set TLS protocol versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("Failed to build TLS server config")?;

    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

/// Initialize logging to the console, a log file, or both.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(config: &AppConfig) -> Option<WorkerGuard> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let log_config = &config.logging;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    let to_console = matches!(log_config.target, LogTarget::Console | LogTarget::Both);
    let to_file = matches!(log_config.target, LogTarget::File | LogTarget::Both);

    let (file_writer, guard) = if to_file {
        let (writer, guard) = create_file_writer(log_config);
        (Some(writer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = to_console.then(|| format_layer(&log_config.format, std::io::stdout, true));
    let file_layer = file_writer.map(|writer| format_layer(&log_config.format, writer, false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Formatting layer for one log destination
fn format_layer<S, W>(
    format: &LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn tracing_subscriber::Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::{fmt, Layer};

    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Json => layer.json().with_target(true).boxed(),
        LogFormat::Compact => layer.compact().with_target(false).boxed(),
        LogFormat::Pretty => layer.with_target(true).boxed(),
    }
}

/// Non-blocking writer for the log directory, rotated daily when enabled
fn create_file_writer(log_config: &config::LoggingConfig) -> (NonBlocking, WorkerGuard) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut api_routes = api::routes().layer(DefaultBodyLimit::max(
        config.documents.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
    ));

    if config.rate_limit.enabled {
        let rate_limit = middleware::RateLimitState::new(&config.rate_limit);
        middleware::spawn_rate_limit_cleanup(rate_limit.clone());
        api_routes = api_routes.layer(axum::middleware::from_fn_with_state(
            rate_limit,
            middleware::rate_limit_middleware,
        ));
    } else {
        info!("Rate limiting disabled by configuration");
    }

    let api_router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum::middleware::from_fn(
            middleware::api_cache_control_middleware,
        ))
        .with_state(state);

    let router = match config.server.static_dir {
        Some(ref static_dir) if config.server.serve_frontend && static_dir.exists() => {
            info!("Serving frontend from {:?}", static_dir);
            let index_file = static_dir.join("index.html");
            if index_file.exists() {
                let serve_dir =
                    ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));
                api_router.fallback_service(serve_dir)
            } else {
                warn!("index.html not found in {:?}, SPA fallback disabled", static_dir);
                api_router.fallback_service(ServeDir::new(static_dir))
            }
        }
        Some(ref static_dir) if config.server.serve_frontend => {
            warn!("Static directory {:?} does not exist, frontend not served", static_dir);
            api_router
        }
        _ => {
            info!("Frontend not served");
            api_router
        }
    };

    router
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
}

/// Report whether Ollama is reachable and the configured model is installed
async fn check_ollama(config: &AppConfig) -> Result<()> {
    let Some(ref ollama) = config.ollama else {
        println!("Ollama is not configured; the extractive engines will be used.");
        return Ok(());
    };

    println!("Ollama URL:   {}", ollama.url);
    println!("Model:        {}", ollama.model);

    let client = OllamaClient::new(ollama).context("Failed to create Ollama client")?;

    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            println!("Status:       unreachable ({})", e);
            println!();
            println!("Make sure Ollama is installed and running: https://ollama.com/download");
            anyhow::bail!("Ollama is not reachable at {}", ollama.url);
        }
    };

    println!("Status:       reachable, {} model(s) installed", models.len());
    for model in &models {
        println!("  - {}", model.name);
    }

    if client.has_model(&ollama.model).await? {
        println!("Model '{}' is installed.", ollama.model);
        Ok(())
    } else {
        println!(
            "Model '{}' is not installed. Run `ollama pull {}`{}.",
            ollama.model,
            ollama.model,
            if ollama.auto_pull {
                " or start the server to pull it automatically"
            } else {
                ""
            }
        );
        anyhow::bail!("Model '{}' is not installed", ollama.model)
    }
}

/// Print help message
fn print_help() {
    println!(
        r#"Research Assistant {}

USAGE:
    research-assistant [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --check-ollama          Check that Ollama is reachable and the configured
                            model is installed, then exit
    --write-default-config [PATH]
                            Write a configuration file with default values
                            (default path: config.yaml) and exit

ENVIRONMENT:
    ASSISTANT_CONFIG        Path to configuration file (default: config.yaml)
    ASSISTANT_HOST          Listen address (default: 127.0.0.1)
    ASSISTANT_PORT          Listen port (default: 5051)
    ASSISTANT_LOG_FORMAT    Log format: pretty, json or compact
    OLLAMA_URL              Ollama server URL (default: http://localhost:11434)
    OLLAMA_MODEL            Ollama model (default: llama3:instruct)
    RUST_LOG                Log filter (default: info)

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by ASSISTANT_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/research-assistant/config.yaml
    5. <user config dir>/research-assistant/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
