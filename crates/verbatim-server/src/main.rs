use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderName;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use verbatim_text::cloud::MAX_CLOUD_WORDS;
use verbatim_text::{Analyzer, Delimiter, IdKind, StopWords};

use verbatim_server::rate_limit::RateLimiterLayer;
use verbatim_server::{AppState, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const DEFAULT_MAX_PHRASE_TOKENS: usize = 64;
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;
const DEFAULT_CLIENT_IP_HEADER: &str = "x-forwarded-for";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "response ids: {:?}, stop-word delimiter: {:?}, tree phrases capped at {} tokens",
        config.id_kind, config.delimiter, config.max_phrase_tokens
    );
    info!(
        "rate limit: {} req/s (burst {}) keyed by {}",
        config.rate_limit_rps, config.rate_limit_burst, config.client_header
    );

    let stop_words = match &config.stopwords_path {
        Some(path) => StopWords::load_from_file(path)
            .with_context(|| format!("loading stop words from {}", path.display()))?,
        None => {
            let words = StopWords::english();
            info!("using built-in English stop words ({})", words.len());
            words
        }
    };

    let state = AppState {
        analyzer: Analyzer::new(config.id_kind, config.delimiter),
        stop_words: Arc::new(stop_words),
        max_cloud_words: MAX_CLOUD_WORDS,
        max_phrase_tokens: config.max_phrase_tokens,
        max_body_bytes: config.max_body_bytes,
    };

    let rate_limiter = RateLimiterLayer::new(
        config.rate_limit_rps,
        config.rate_limit_burst,
        config.client_header.clone(),
    );
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    stopwords_path: Option<PathBuf>,
    delimiter: Delimiter,
    id_kind: IdKind,
    max_body_bytes: usize,
    max_phrase_tokens: usize,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
    client_header: HeaderName,
}

fn load_config() -> Config {
    let mut cli_stopwords: Option<PathBuf> = None;
    let mut cli_id_kind: Option<IdKind> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stopwords" => {
                if let Some(path) = args.next() {
                    cli_stopwords = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--stopwords=") {
                    cli_stopwords = Some(PathBuf::from(path));
                } else if let Some(kind) = arg.strip_prefix("--id-kind=") {
                    cli_id_kind = IdKind::from_name(kind);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let stopwords_path =
        cli_stopwords.or_else(|| env::var("STOPWORDS_PATH").ok().map(PathBuf::from));
    let delimiter = env::var("STOPWORDS_DELIMITER")
        .ok()
        .as_deref()
        .and_then(Delimiter::from_config)
        .unwrap_or_default();
    let id_kind = cli_id_kind
        .or_else(|| {
            env::var("RESPONSE_ID_KIND")
                .ok()
                .as_deref()
                .and_then(IdKind::from_name)
        })
        .unwrap_or_default();
    let max_body_bytes = env::var("MAX_BODY_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_BODY_BYTES);
    let max_phrase_tokens = env::var("MAX_PHRASE_TOKENS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_PHRASE_TOKENS);
    let rate_limit_rps = env::var("RATE_LIMIT_RPS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_RPS);
    let rate_limit_burst = env::var("RATE_LIMIT_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_BURST);
    let client_header = env::var("CLIENT_IP_HEADER")
        .ok()
        .and_then(|v| HeaderName::try_from(v.trim().to_ascii_lowercase()).ok())
        .unwrap_or_else(|| HeaderName::from_static(DEFAULT_CLIENT_IP_HEADER));

    Config {
        host,
        port,
        stopwords_path,
        delimiter,
        id_kind,
        max_body_bytes,
        max_phrase_tokens,
        rate_limit_rps,
        rate_limit_burst,
        client_header,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
