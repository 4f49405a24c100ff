// src/main.rs
use attendance_routine::{config::Config, create_router, db, AppState};
use axum::serve;
use std::env;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "attendance_routine=debug,tower_http=info,sqlx=warn".into())
                .into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Starting attendance & routine service...");

    let config = Config::from_env()?;

    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Failed to initialise the database: {}", e);
            return Err(anyhow::anyhow!("database connection/migration failed: {}", e));
        }
    };

    let app_state = AppState {
        db_pool,
        password_cost: config.password_cost,
    };

    let listener = match TcpListener::bind(config.server_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Failed to bind {}: {}", config.server_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Listening on http://{}", config.server_addr);

    let app = create_router(app_state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
