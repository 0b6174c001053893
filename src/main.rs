//! CoopCred Backend Server
//!
//! The backend for the cooperative society's member portal: loan
//! applications and lifecycle, guarantor approvals, commodity installment
//! orders and the shared repayment schedule engine.

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use coopcred_server::commodity::CommodityService;
use coopcred_server::config::Config;
use coopcred_server::db;
use coopcred_server::eligibility::EligibilityService;
use coopcred_server::guarantor::GuarantorService;
use coopcred_server::loan::LoanService;
use coopcred_server::middleware;
use coopcred_server::notify::{HttpEmailSender, Notifier};
use coopcred_server::routes;
use coopcred_server::schedule::ScheduleService;
use coopcred_server::state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(environment = config.environment.as_str(), "Starting up");

    // Initialize database connection pool and schema
    let db_pool = match db::create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database connection failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!("Migration failed: {}", e);
        std::process::exit(1);
    }

    // Outbound collaborators
    let email_sender = Arc::new(HttpEmailSender::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    ));
    let notifier = Notifier::new(db_pool.clone());

    // Domain services
    let eligibility_service = EligibilityService::new(db_pool.clone());

    let guarantor_service = Arc::new(GuarantorService::new(
        db_pool.clone(),
        email_sender.clone(),
        notifier.clone(),
        config.portal_base_url.clone(),
    ));

    let schedule_service = Arc::new(ScheduleService::new(
        db_pool.clone(),
        email_sender.clone(),
        notifier.clone(),
    ));

    let loan_service = Arc::new(LoanService::new(
        db_pool.clone(),
        eligibility_service.clone(),
        guarantor_service.clone(),
        schedule_service.clone(),
        email_sender.clone(),
        notifier.clone(),
    ));

    let commodity_service = Arc::new(CommodityService::new(
        db_pool.clone(),
        schedule_service.clone(),
        notifier.clone(),
    ));

    // Create shared app state
    let app_state = AppState::new(
        db_pool.clone(),
        loan_service,
        guarantor_service,
        schedule_service,
        commodity_service,
        Arc::new(eligibility_service),
    );

    // Clone db_pool for health check
    let health_db_pool = db_pool.clone();

    // Create the app router
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(move || health_check(health_db_pool.clone())))
        .merge(routes::loan_routes())
        .merge(routes::guarantor_routes())
        .merge(routes::order_routes())
        .merge(routes::eligibility_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Serve with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

async fn root() -> &'static str {
    "CoopCred API Server"
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// Health check endpoint
async fn health_check(pool: sqlx::PgPool) -> axum::Json<HealthResponse> {
    let db_status = match coopcred_server::db::check_health(&pool).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if db_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    axum::Json(HealthResponse {
        status: status.to_string(),
        database: db_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins_str = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins_str.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
