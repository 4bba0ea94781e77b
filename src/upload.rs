use crate::classifier;
use crate::db::MediaStore;
use crate::error::Result;
use crate::models::{Month, Season, UploadFile};
use chrono::Local;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Ids in the order the files were given.
    pub saved: Vec<i64>,
    /// Names of files dropped because they are neither image nor video.
    pub skipped: Vec<String>,
    /// Folder the batch was filed into.
    pub season: Season,
    pub month: Month,
}

impl UploadReport {
    pub fn summary(&self) -> String {
        format!(
            "Загружено {} файлов в: {}, {}",
            self.saved.len(),
            self.season,
            self.month
        )
    }
}

pub fn is_media_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type.starts_with("video/")
}

/// Read a file from disk. The declared MIME type is guessed from the name.
pub async fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    Ok(UploadFile {
        name,
        bytes,
        mime_type,
    })
}

/// Expand directories into the files below them. Plain files are kept in
/// the given order; directory contents are sorted by path. Symlinked
/// folders inside a walked directory are skipped so a link back to a parent
/// cannot repeat the walk.
pub async fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        let meta = tokio::fs::metadata(path).await?;
        if meta.is_file() {
            out.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        let mut stack = vec![path.clone()];
        while let Some(dir) = stack.pop() {
            let mut read_dir = match tokio::fs::read_dir(&dir).await {
                Ok(rd) => rd,
                Err(e) => {
                    tracing::warn!("Cannot read {}: {}", dir.display(), e);
                    continue;
                }
            };
            while let Some(entry) = read_dir.next_entry().await? {
                let entry_path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(t) => t,
                    Err(_) => continue,
                };
                if file_type.is_dir() {
                    stack.push(entry_path);
                } else if file_type.is_file() {
                    found.push(entry_path);
                } else if file_type.is_symlink() {
                    // linked files are taken, linked folders are never walked
                    match tokio::fs::metadata(&entry_path).await {
                        Ok(m) if m.is_file() => found.push(entry_path),
                        Ok(_) => tracing::debug!("Not following {}", entry_path.display()),
                        Err(_) => continue,
                    }
                }
            }
        }
        found.sort();
        out.extend(found);
    }
    Ok(out)
}

/// Save a batch of dropped or picked files into one folder.
///
/// Files that are not images or videos are skipped without error. Each save
/// is awaited before the next starts, so ids follow input order.
pub async fn upload_files(
    store: &MediaStore,
    files: &[UploadFile],
    season: Option<Season>,
    month: Option<Month>,
) -> Result<UploadReport> {
    // resolve once so the whole batch lands in the same folder
    let (season, month) = classifier::resolve(&Local::now(), season, month)?;

    let mut saved = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();
    for file in files {
        if !is_media_mime(&file.mime_type) {
            tracing::warn!("Skipping {} ({})", file.name, file.mime_type);
            skipped.push(file.name.clone());
            continue;
        }
        saved.push(store.save(file, Some(season), Some(month)).await?);
    }

    tracing::info!(
        "Uploaded {} files to {} / {} ({} skipped)",
        saved.len(),
        season,
        month,
        skipped.len()
    );
    Ok(UploadReport {
        saved,
        skipped,
        season,
        month,
    })
}
