use crate::db::MediaStore;
use crate::error::Result;
use crate::gallery::{GalleryState, ViewModel};
use crate::models::{Blob, MediaItem, MediaKind};
use std::path::{Path, PathBuf};

/// Receives downloaded files. Stands in for the browser's save-as.
pub trait SaveAs {
    fn save_as(&mut self, filename: &str, blob: &Blob) -> Result<()>;
}

/// Writes each download into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl SaveAs for DirectorySink {
    fn save_as(&mut self, filename: &str, blob: &Blob) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, &blob.bytes)?;
        tracing::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Text of the delete confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub count: usize,
}

impl DeletePrompt {
    pub fn title(&self) -> &'static str {
        "Удалить выбранные файлы?"
    }

    pub fn message(&self) -> String {
        let suffix = if self.count == 1 { "" } else { "а" };
        format!(
            "Вы действительно хотите удалить {} файл{}?",
            self.count, suffix
        )
    }
}

/// Asks the user before a bulk delete.
pub trait Confirm {
    fn confirm(&mut self, prompt: &DeletePrompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&DeletePrompt) -> bool,
{
    fn confirm(&mut self, prompt: &DeletePrompt) -> bool {
        self(prompt)
    }
}

/// Confirms every delete, for `--yes`.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &DeletePrompt) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub saved: Vec<String>,
    pub skipped: Vec<i64>,
}

#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// Nothing was selected.
    Nothing,
    /// The user declined; the selection is left as it was.
    Cancelled,
    Deleted { removed: u64, view: ViewModel },
}

/// `media_<id>.mp4` for videos and `media_<id>.jpg` for images, whatever
/// the stored encoding actually is.
pub fn download_filename(item: &MediaItem) -> String {
    let ext = match item.kind {
        MediaKind::Video => "mp4",
        MediaKind::Image => "jpg",
    };
    format!("media_{}.{}", item.id, ext)
}

/// Hand every selected item to `sink`, then clear the selection.
///
/// Items deleted since they were selected are skipped.
pub async fn download_selected<S: SaveAs>(
    store: &MediaStore,
    gallery: &mut GalleryState,
    sink: &mut S,
) -> Result<DownloadReport> {
    let mut report = DownloadReport::default();
    if gallery.selection().is_empty() {
        return Ok(report);
    }

    let ids: Vec<i64> = gallery.selection().ids().iter().copied().collect();
    for id in ids {
        match store.get_by_id(id).await? {
            Some(item) => {
                let filename = download_filename(&item);
                sink.save_as(&filename, &item.blob)?;
                report.saved.push(filename);
            }
            None => {
                tracing::debug!(id, "selected item no longer exists, skipping");
                report.skipped.push(id);
            }
        }
    }

    gallery.clear_selection();
    Ok(report)
}

/// Delete the selection after the user confirms, then re-render.
pub async fn delete_selected<C: Confirm>(
    store: &MediaStore,
    gallery: &mut GalleryState,
    confirm: &mut C,
) -> Result<DeleteOutcome> {
    if gallery.selection().is_empty() {
        return Ok(DeleteOutcome::Nothing);
    }

    let prompt = DeletePrompt {
        count: gallery.selection().len(),
    };
    if !confirm.confirm(&prompt) {
        tracing::info!("Delete of {} items cancelled", prompt.count);
        return Ok(DeleteOutcome::Cancelled);
    }

    let ids = gallery.selection().ids().clone();
    let removed = store.delete_by_ids(&ids).await?;
    gallery.clear_selection();
    let view = gallery.refresh_current_view(store).await?;

    Ok(DeleteOutcome::Deleted { removed, view })
}
