use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use matchmaker_api::config::{default_log_level, Settings};
use matchmaker_api::core::Matcher;
use matchmaker_api::routes::{self, AppState, MatchLimits};
use matchmaker_api::services::{Authenticator, SupabaseClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging; `RUST_LOG` wins over the configured level
fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.compact().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&default_log_level(), "compact");
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting Matchmaker API...");
    info!("Configuration loaded successfully");

    let supabase = Arc::new(
        SupabaseClient::new(
            settings.supabase.url.clone(),
            settings.supabase.service_role_key.clone(),
        )
        .map_err(|e| {
            error!("Failed to create backend client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?,
    );

    info!("Backend client initialized for {}", supabase.base_url());

    let cache_ttl = settings.auth.token_cache_ttl_secs.unwrap_or(60);
    let cache_size = settings.auth.token_cache_size.unwrap_or(10_000);

    let auth = Arc::new(Authenticator::new(
        supabase.clone(),
        settings.supabase.jwt_secret.as_deref(),
        cache_size,
        cache_ttl,
    ));

    if auth.verifies_locally() {
        info!("Verifying tokens locally (cache: {} entries, TTL: {}s)", cache_size, cache_ttl);
    } else {
        info!("Verifying tokens via auth endpoint (cache: {} entries, TTL: {}s)", cache_size, cache_ttl);
    }

    // Initialize matcher with configured weights
    let weights = settings.scoring_weights();
    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    let defaults = MatchLimits::default();
    let limits = MatchLimits {
        default_limit: settings.matching.default_limit.unwrap_or(defaults.default_limit),
        max_limit: settings.matching.max_limit.unwrap_or(defaults.max_limit),
    };

    // Build application state
    let app_state = AppState {
        supabase,
        auth,
        matcher,
        limits,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
