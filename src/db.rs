use crate::classifier;
use crate::config::AppConfig;
use crate::error::{GalleryError, Result};
use crate::models::{Blob, MediaItem, MediaKind, Month, Season, UploadFile};
use crate::upload::is_media_mime;
use chrono::{DateTime, FixedOffset, Local};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, query_scalar, SqlitePool};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_LOCATION: &str = "Неизвестно";

const SELECT_COLUMNS: &str =
    "SELECT id, blob, mime_type, kind, season, month, created_at, location FROM media";

type MediaRow = (i64, Vec<u8>, String, String, String, String, String, String);

/// Handle to the `media` collection. Cloning is cheap and shares the pool.
#[derive(Clone, Debug)]
pub struct MediaStore {
    pool: SqlitePool,
    default_location: String,
}

async fn initialize_database(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
    let create = r#"
        CREATE TABLE IF NOT EXISTS media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            blob BLOB NOT NULL,
            mime_type TEXT NOT NULL,
            kind TEXT NOT NULL,
            season TEXT NOT NULL,
            month TEXT NOT NULL,
            created_at TEXT NOT NULL,
            location TEXT NOT NULL
        )
    "#;

    let idx_season = "CREATE INDEX IF NOT EXISTS idx_media_season ON media (season)";
    let idx_month = "CREATE INDEX IF NOT EXISTS idx_media_month ON media (month)";

    query(create).execute(pool).await?;
    query(idx_season).execute(pool).await?;
    query(idx_month).execute(pool).await?;

    Ok(())
}

impl MediaStore {
    /// Open (creating if absent) the database file named in the config.
    pub async fn init(config: &AppConfig) -> Result<Self> {
        let db_path = config.resolved_db_path();
        Self::open(&db_path, config.max_connections(), config.default_location()).await
    }

    pub async fn open(
        db_path: &Path,
        max_connections: u32,
        default_location: &str,
    ) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    GalleryError::StorageUnavailable(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        if db_path.is_dir() {
            return Err(GalleryError::StorageUnavailable(format!(
                "database path is a directory: {}",
                db_path.display()
            )));
        }
        tracing::info!("Resolved DB path: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| GalleryError::StorageUnavailable(e.to_string()))?;

        Self::with_pool(pool, default_location).await
    }

    /// Private database that lives as long as the store. The pool holds a
    /// single connection that is never recycled, since closing it would drop
    /// the data.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| GalleryError::StorageUnavailable(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| GalleryError::StorageUnavailable(e.to_string()))?;

        Self::with_pool(pool, DEFAULT_LOCATION).await
    }

    async fn with_pool(pool: SqlitePool, default_location: &str) -> Result<Self> {
        initialize_database(&pool)
            .await
            .map_err(|e| GalleryError::StorageUnavailable(format!("db init failed: {}", e)))?;
        Ok(Self {
            pool,
            default_location: default_location.to_string(),
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    pub async fn save(
        &self,
        file: &UploadFile,
        season: Option<Season>,
        month: Option<Month>,
    ) -> Result<i64> {
        self.save_at(file, season, month, Local::now().fixed_offset())
            .await
    }

    /// Store one file. Overrides win over the date in `now`.
    pub async fn save_at(
        &self,
        file: &UploadFile,
        season: Option<Season>,
        month: Option<Month>,
        now: DateTime<FixedOffset>,
    ) -> Result<i64> {
        if !is_media_mime(&file.mime_type) {
            return Err(GalleryError::InvalidFile {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }
        let kind = MediaKind::from_mime(&file.mime_type);
        let (season, month) = classifier::resolve(&now, season, month)?;

        let id = query(
            "INSERT INTO media (blob, mime_type, kind, season, month, created_at, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&file.bytes)
        .bind(&file.mime_type)
        .bind(kind.as_str())
        .bind(season.as_str())
        .bind(month.as_str())
        .bind(now.to_rfc3339())
        .bind(&self.default_location)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::debug!(id, name = %file.name, %season, %month, "saved media");
        Ok(id)
    }

    pub async fn query_by_month(&self, month: Month) -> Result<Vec<MediaItem>> {
        let rows = query_as::<_, MediaRow>(&format!("{} WHERE month = ?1 ORDER BY id", SELECT_COLUMNS))
            .bind(month.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_item).collect()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<MediaItem>> {
        let row = query_as::<_, MediaRow>(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_item).transpose()
    }

    /// Delete every listed id in one transaction. Unknown ids are ignored.
    pub async fn delete_by_ids(&self, ids: &BTreeSet<i64>) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for id in ids {
            removed += query("DELETE FROM media WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        tracing::info!("Deleted {} of {} requested media items", removed, ids.len());
        Ok(removed)
    }

    pub async fn count_by_season(&self, season: Season) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(1) FROM media WHERE season = ?1")
            .bind(season.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_month(&self, month: Month) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(1) FROM media WHERE month = ?1")
            .bind(month.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn row_to_item(r: MediaRow) -> Result<MediaItem> {
    let kind = MediaKind::from_str(&r.3).map_err(decode_error)?;
    let season = Season::from_str(&r.4).map_err(decode_error)?;
    let month = Month::from_str(&r.5).map_err(decode_error)?;
    let created_at = DateTime::parse_from_rfc3339(&r.6).map_err(decode_error)?;
    let size = r.1.len();

    Ok(MediaItem {
        id: r.0,
        blob: Blob {
            bytes: r.1,
            mime_type: r.2.clone(),
        },
        mime_type: r.2,
        size,
        kind,
        season,
        month,
        created_at,
        location: r.7,
    })
}

fn decode_error<E>(e: E) -> GalleryError
where
    E: std::error::Error + Send + Sync + 'static,
{
    GalleryError::Storage(sqlx::Error::Decode(Box::new(e)))
}
