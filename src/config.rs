use crate::db::DEFAULT_LOCATION;
use serde::Deserialize;
use std::path::PathBuf;

pub const APP_DIR: &str = "season-gallery";
pub const DB_FILE_NAME: &str = "MyGalleryDB.sqlite";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    pub db_path: Option<String>,
    pub max_connections: Option<u32>,
    pub default_location: Option<String>,
    pub download_dir: Option<String>,
}

impl AppConfig {
    /// `<data dir>/season-gallery/MyGalleryDB.sqlite` unless configured.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(p) = &self.db_path {
            return PathBuf::from(p);
        }
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DB_FILE_NAME)
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(5)
    }

    pub fn default_location(&self) -> &str {
        self.default_location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
