use crate::bulk::{self, Confirm, DeleteOutcome, DownloadReport, SaveAs};
use crate::config::AppConfig;
use crate::db::MediaStore;
use crate::error::Result;
use crate::gallery::{GalleryState, ViewModel};
use crate::models::{Month, Season, UploadFile};
use crate::upload::{self, UploadReport};
use std::path::PathBuf;

/// Everything one gallery session works with: the open store and the
/// navigation state. Created once, closed explicitly.
pub struct AppContext {
    pub config: AppConfig,
    pub store: MediaStore,
    pub gallery: GalleryState,
}

impl AppContext {
    pub async fn init(config: AppConfig) -> Result<Self> {
        let store = MediaStore::init(&config).await?;
        Ok(Self {
            config,
            store,
            gallery: GalleryState::new(),
        })
    }

    pub async fn in_memory() -> Result<Self> {
        Ok(Self {
            config: AppConfig::default(),
            store: MediaStore::open_in_memory().await?,
            gallery: GalleryState::new(),
        })
    }

    pub async fn close(self) {
        self.store.close().await;
    }

    pub async fn refresh(&mut self) -> Result<ViewModel> {
        self.gallery.refresh_current_view(&self.store).await
    }

    pub async fn open_seasons(&mut self) -> Result<ViewModel> {
        self.gallery.enter_seasons();
        self.refresh().await
    }

    pub async fn open_season(&mut self, season: Season) -> Result<ViewModel> {
        self.gallery.enter_months(season);
        self.refresh().await
    }

    pub async fn open_month(&mut self, month: Month) -> Result<ViewModel> {
        self.gallery.enter_gallery(month);
        self.refresh().await
    }

    /// Save already-read files, then refresh whatever is on screen.
    pub async fn upload(
        &mut self,
        files: &[UploadFile],
        season: Option<Season>,
        month: Option<Month>,
    ) -> Result<(UploadReport, ViewModel)> {
        let report = upload::upload_files(&self.store, files, season, month).await?;
        let view = self.refresh().await?;
        Ok((report, view))
    }

    /// Read files and folders from disk and upload them as one batch.
    pub async fn upload_paths(
        &mut self,
        paths: &[PathBuf],
        season: Option<Season>,
        month: Option<Month>,
    ) -> Result<(UploadReport, ViewModel)> {
        let mut files = Vec::new();
        for path in upload::collect_files(paths).await? {
            files.push(upload::read_upload(&path).await?);
        }
        self.upload(&files, season, month).await
    }

    pub fn toggle(&mut self, id: i64) -> bool {
        self.gallery.toggle_selection(id)
    }

    pub async fn download_selected<S: SaveAs>(&mut self, sink: &mut S) -> Result<DownloadReport> {
        bulk::download_selected(&self.store, &mut self.gallery, sink).await
    }

    pub async fn delete_selected<C: Confirm>(&mut self, confirm: &mut C) -> Result<DeleteOutcome> {
        bulk::delete_selected(&self.store, &mut self.gallery, confirm).await
    }
}
