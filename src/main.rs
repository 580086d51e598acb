mod config;
mod db;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use config::{AppConfig, DirectorySource};
use services::directory::{FileDirectory, SheetsDirectory, UserDirectory};
use services::properties::{MemoryPropertyStore, PgPropertyStore, PropertyStore};
use services::render::TemplateRenderer;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");

    let properties: Arc<dyn PropertyStore> = if let Some(url) = &config.database_url {
        let pool = db::init_pool(url, config.db_max_connections)
            .await
            .expect("database init failed");
        tracing::info!("session properties stored in postgres");
        Arc::new(PgPropertyStore::new(pool))
    } else {
        tracing::warn!("DATABASE_URL not set, session properties kept in memory");
        Arc::new(MemoryPropertyStore::new())
    };

    let directory: Arc<dyn UserDirectory> = match config.directory {
        DirectorySource::File(path) => {
            tracing::info!(path = %path.display(), "user directory read from file");
            Arc::new(FileDirectory::new(path))
        }
        DirectorySource::Sheets(sheets) => {
            tracing::info!(spreadsheet = %sheets.spreadsheet_id, sheet = %sheets.sheet_name, "user directory read from sheets");
            Arc::new(SheetsDirectory::new(sheets).expect("sheets client init failed"))
        }
    };

    let renderer = TemplateRenderer::new(&config.template_dir).expect("template renderer init failed");
    tracing::info!(dir = %renderer.template_dir().display(), "templates loaded on demand");

    let state = state::AppState::new(properties, directory, renderer, config.cookie_secure);
    let app = routes::app(state);

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "yoozak-rescue-cmd listening");
    axum::serve(listener, app).await.expect("server failed");
}
