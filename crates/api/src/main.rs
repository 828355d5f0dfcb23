use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::PgPool;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use signoff_api::config::ServerConfig;
use signoff_api::router::build_app_router;
use signoff_api::state::AppState;
use signoff_notify::{MailConfig, TransportSelector};

const DEFAULT_LOG_FILTER: &str = "signoff_api=debug,signoff_notify=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        upload_dir = %config.upload_dir.display(),
        "Server configuration loaded"
    );

    let pool = prepare_database().await;

    let mail_config = MailConfig::from_env();
    tracing::info!(
        candidates = mail_config.candidates.len(),
        disposable_fallback = mail_config.disposable_fallback,
        "Mail configuration loaded"
    );
    let mailer = Arc::new(mail_config.build_selector());
    let warm_up = tokio::spawn(warm_up_mailer(Arc::clone(&mailer)));

    let app = build_app_router(
        AppState {
            pool,
            config: Arc::new(config.clone()),
            mailer,
        },
        &config,
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST and PORT must form a socket address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot listen on {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");

    warm_up.abort();
    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` wins over [`DEFAULT_LOG_FILTER`].
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, check reachability and bring the schema up to date.
///
/// Any failure here is fatal: the API has nothing to serve without storage.
async fn prepare_database() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = signoff_db::create_pool(&url)
        .await
        .expect("Cannot connect to the database");
    signoff_db::health_check(&pool)
        .await
        .expect("Database did not answer the health query");
    signoff_db::run_migrations(&pool)
        .await
        .expect("Database migrations failed");

    tracing::info!("Database ready");
    pool
}

/// Pick a transport in the background so the first sign-off does not pay
/// for the candidate scan.
async fn warm_up_mailer(mailer: Arc<TransportSelector>) {
    if let Err(e) = mailer.acquire().await {
        tracing::warn!(
            error = %e,
            "No email transport could be verified, email functionality will be disabled"
        );
        return;
    }
    if let Some((origin, name)) = mailer.active().await {
        tracing::info!(transport = %name, ?origin, "Email transport ready");
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("Interrupted, shutting down"),
        () = terminate => tracing::info!("Terminated, shutting down"),
    }
}
