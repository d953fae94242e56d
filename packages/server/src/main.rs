use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::storage::filesystem::FilesystemUploadStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::seed;
use server::settings::{SETTINGS_TTL, SettingsCache};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::seed_roles_and_permissions(&db).await?;
    seed::seed_admin_user(&db, &config.seed).await?;

    let uploads = FilesystemUploadStore::new(
        PathBuf::from(&config.storage.root),
        config.storage.max_upload_size,
    )
    .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        uploads: Arc::new(uploads),
        settings: Arc::new(SettingsCache::new(SETTINGS_TTL)),
        config: Arc::new(config),
    };

    let app = server::build_router(state);

    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
