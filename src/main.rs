use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagemark::infrastructure::AppState;
use pagemark::{config, db, server};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagemark=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = config::Config::from_env();

    if let Err(e) = db::ensure_database_dir(&config.database_url) {
        tracing::error!("Failed to create database directory: {}", e);
        std::process::exit(1);
    }

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(AppState::new(db), &config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
