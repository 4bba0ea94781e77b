use crate::config::{AppConfig, APP_DIR};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    // RUST_LOG wins; otherwise only our own info-level lines
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("season_gallery=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Candidate config files in search order. The first that exists is used.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config.json"));
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join(APP_DIR).join("config.json"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join(APP_DIR).join("config.json"));
    }
    paths.push(PathBuf::from("/etc").join(APP_DIR).join("config.json"));
    paths
}

/// Load the JSON config. An explicit path must exist; without one the
/// search locations are tried and defaults are used when none is found.
pub fn load_config(cli_path: Option<PathBuf>) -> Result<AppConfig> {
    use ::config::{builder::DefaultState, ConfigBuilder, File, FileFormat};

    let chosen = match cli_path {
        Some(p) => Some(p),
        None => search_paths().into_iter().find(|p| p.exists()),
    };

    let Some(cfg_path) = chosen else {
        tracing::info!("No config.json found, using defaults");
        return Ok(AppConfig::default());
    };

    tracing::info!("Using configuration file: {}", cfg_path.display());
    let settings = ConfigBuilder::<DefaultState>::default()
        .add_source(File::from(cfg_path.as_path()).format(FileFormat::Json))
        .build()?;
    Ok(settings.try_deserialize()?)
}

pub fn log_startup_info(config: &AppConfig, db_path: &Path) {
    tracing::info!(
        db = %db_path.display(),
        max_connections = config.max_connections(),
        default_location = config.default_location(),
        "season-gallery starting"
    );
}
