use std::sync::Arc;

use common::storage::UploadStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::settings::SettingsCache;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub uploads: Arc<dyn UploadStore>,
    pub settings: Arc<SettingsCache>,
    pub config: Arc<AppConfig>,
}
