//! Evalsite HTTP Server
//!
//! The single entry point for the consultancy site backend.
//! Handles:
//! - Public catalog listings (evaluations, blog posts)
//! - Contact submissions (JSON API and multipart form)
//! - Admin back office (session gate, CRUD, uploads)
//! - Observability (logging, metrics, tracing)

mod forms;
mod handlers;
mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use evalsite_common::{
    config::AppConfig,
    db::DbPool,
    mail::ContactNotifier,
    metrics,
    rate_limit::RateLimiter,
    storage::ObjectStorage,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub storage: ObjectStorage,
    pub notifier: Arc<ContactNotifier>,
    pub rate_limiter: Arc<RateLimiter>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    let config = Arc::new(config);

    // Initialize tracing
    init_tracing(&config);

    info!("Starting Evalsite server v{}", evalsite_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Object storage and outbound mail clients
    let storage = ObjectStorage::new(&config.storage)?;
    let notifier = Arc::new(ContactNotifier::from_config(&config.mail)?);

    // Contact rate limiter with a periodic stale-bucket sweep
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window(),
        config.rate_limit.max_requests,
    ));
    spawn_sweeper(rate_limiter.clone(), config.rate_limit.sweep_interval_secs);

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        storage,
        notifier,
        rate_limiter,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Periodically drop rate-limit buckets whose window has passed, so the
/// per-address map does not grow without bound.
fn spawn_sweeper(limiter: Arc<RateLimiter>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.tick().await; // first tick completes immediately
        loop {
            interval.tick().await;
            limiter.sweep();
            tracing::debug!(buckets = limiter.bucket_count(), "Rate limiter swept");
        }
    });
}

/// Headroom for multipart boundaries, part headers and the text fields
/// accompanying a full-size attachment.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Request body cap: a full-size attachment plus multipart framing must
/// fit, otherwise uploads die in the extractor before the handlers can
/// apply their own ceiling.
fn request_body_limit(max_attachment_bytes: u64) -> usize {
    (max_attachment_bytes + MULTIPART_OVERHEAD_BYTES) as usize
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let body_limit =
        DefaultBodyLimit::max(request_body_limit(state.config.storage.max_attachment_bytes));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Public catalog
        .route("/api/evaluations", get(handlers::catalog::list_evaluations))
        .route("/api/evaluations/{slug}", get(handlers::catalog::get_evaluation))
        .route("/api/posts", get(handlers::catalog::list_posts))
        .route("/api/posts/{slug}", get(handlers::catalog::get_post))
        // Contact submission (JSON API and multipart form)
        .route("/api/contact", post(handlers::contact::submit_json))
        .route("/contact/submit", post(handlers::contact::submit_form))
        // Admin session
        .route("/admin/login", post(handlers::admin_auth::login))
        .route("/admin/logout", get(handlers::admin_auth::logout))
        // Admin: evaluations
        .route("/admin/api/evaluations", get(handlers::admin_evaluations::list))
        .route("/admin/evaluations", post(handlers::admin_evaluations::create))
        .route("/admin/evaluations/update", post(handlers::admin_evaluations::update))
        .route("/admin/evaluations/delete", post(handlers::admin_evaluations::delete))
        // Admin: blog posts
        .route("/admin/api/posts", get(handlers::admin_posts::list))
        .route("/admin/posts", post(handlers::admin_posts::create))
        .route("/admin/posts/update", post(handlers::admin_posts::update))
        .route("/admin/posts/delete", post(handlers::admin_posts::delete))
        // Admin: contact inquiries
        .route("/admin/api/inquiries", get(handlers::admin_inquiries::list))
        .route("/admin/inquiries/review", post(handlers::admin_inquiries::review))
        .route("/admin/inquiries/delete", post(handlers::admin_inquiries::delete))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_exceeds_attachment_ceiling() {
        // An attachment exactly at the configured ceiling must pass the
        // extractor so the handlers decide its fate, not the transport.
        let ceiling = 10 * 1024 * 1024;
        assert!(request_body_limit(ceiling) > ceiling as usize);
    }
}
