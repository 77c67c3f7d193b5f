use std::net::SocketAddr;
use std::sync::Arc;

use recruitment_pipeline::{
    config::{get_config, init_config},
    database::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgPipelineStore, PipelineStore,
    },
    routes::{build_router, RouterSettings},
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_config()?;
    let config = get_config()?;

    let store: Arc<dyn PipelineStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            info!("Using Postgres pipeline store");
            Arc::new(PgPipelineStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; applications are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState::new(store, config.qualification_threshold);
    let settings = RouterSettings {
        jwt_secret: config.jwt_secret.clone(),
        public_rps: config.public_rps,
        integration_rps: config.integration_rps,
    };

    let app = build_router(app_state, &settings)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!(
        threshold = config.qualification_threshold,
        "Server listening on {}", addr
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
