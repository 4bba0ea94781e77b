use season_gallery::bulk::{
    download_filename, AlwaysConfirm, DeleteOutcome, DeletePrompt, DirectorySink,
};
use season_gallery::gallery::{View, ViewModel};
use season_gallery::models::{MediaKind, Month, Season, UploadFile};
use season_gallery::state::AppContext;
use std::path::PathBuf;

fn test_dir() -> PathBuf {
    let crate_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    crate_root.join("tests").join("tmp").join(format!(
        "season_gallery_test_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn files() -> Vec<UploadFile> {
    vec![
        UploadFile::new("1.jpg", "image/jpeg", vec![1; 16]),
        UploadFile::new("2.png", "image/png", vec![2; 16]),
        UploadFile::new("3.mov", "video/quicktime", vec![3; 16]),
        UploadFile::new("readme.txt", "text/plain", b"skip me".to_vec()),
        UploadFile::new("4.mp4", "video/mp4", vec![4; 16]),
    ]
}

fn gallery_ids(view: &ViewModel) -> Vec<i64> {
    match view {
        ViewModel::Gallery { items, .. } => items.iter().map(|i| i.id).collect(),
        other => panic!("expected gallery view, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_skips_non_media_and_keeps_order() {
    let mut ctx = AppContext::in_memory().await.unwrap();

    let (report, view) = ctx
        .upload(&files(), None, Some(Month::March))
        .await
        .expect("upload");

    assert_eq!(report.saved.len(), 4);
    assert_eq!(report.skipped, vec!["readme.txt".to_string()]);
    assert_eq!((report.season, report.month), (Season::Spring, Month::March));
    assert!(report.saved.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(report.summary(), "Загружено 4 файлов в: Весна, Март");

    // still on the seasons screen, with fresh counts
    match view {
        ViewModel::Seasons { folders } => {
            let spring = folders.iter().find(|f| f.name == "Весна").unwrap();
            assert_eq!(spring.count, 4);
        }
        other => panic!("expected seasons view, got {:?}", other),
    }
}

#[tokio::test]
async fn navigation_clears_selection() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx.upload(&files(), None, Some(Month::March)).await.unwrap();

    let view = ctx.open_month(Month::March).await.unwrap();
    assert_eq!(gallery_ids(&view), report.saved);
    assert_eq!(ctx.gallery.active_season(), Some(Season::Spring));

    assert!(ctx.toggle(report.saved[0]));
    assert!(ctx.toggle(report.saved[1]));
    assert!(ctx.gallery.action_bar().visible);

    ctx.gallery.enter_seasons();
    assert_eq!(ctx.gallery.view(), View::Seasons);
    assert!(ctx.gallery.selection().is_empty());
    assert!(!ctx.gallery.action_bar().visible);
}

#[tokio::test]
async fn toggle_ignores_items_of_other_months() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (march, _) = ctx.upload(&files(), None, Some(Month::March)).await.unwrap();
    let (may, _) = ctx.upload(&files(), None, Some(Month::May)).await.unwrap();

    ctx.open_month(Month::March).await.unwrap();
    assert!(!ctx.toggle(may.saved[0]));
    assert!(ctx.toggle(march.saved[0]));
    assert_eq!(ctx.gallery.selection().len(), 1);

    // toggling again restores the empty selection
    assert!(!ctx.toggle(march.saved[0]));
    assert!(ctx.gallery.selection().is_empty());
}

#[tokio::test]
async fn months_view_counts_per_month() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    ctx.upload(&files(), None, Some(Month::December)).await.unwrap();
    ctx.upload(&files()[..1], None, Some(Month::February)).await.unwrap();

    match ctx.open_season(Season::Winter).await.unwrap() {
        ViewModel::Months { season, folders } => {
            assert_eq!(season, Season::Winter);
            let counts: Vec<(&str, i64)> =
                folders.iter().map(|f| (f.name.as_str(), f.count)).collect();
            assert_eq!(counts, vec![("Декабрь", 4), ("Январь", 0), ("Февраль", 1)]);
        }
        other => panic!("expected months view, got {:?}", other),
    }
}

#[tokio::test]
async fn delete_selected_removes_items_and_hides_action_bar() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx.upload(&files(), None, Some(Month::March)).await.unwrap();
    ctx.open_month(Month::March).await.unwrap();

    let doomed = &report.saved[..3];
    for id in doomed {
        assert!(ctx.toggle(*id));
    }

    let mut asked = Vec::new();
    let outcome = ctx
        .delete_selected(&mut |p: &DeletePrompt| {
            asked.push(p.count);
            true
        })
        .await
        .unwrap();
    assert_eq!(asked, vec![3]);

    match outcome {
        DeleteOutcome::Deleted { removed, view } => {
            assert_eq!(removed, 3);
            assert_eq!(gallery_ids(&view), vec![report.saved[3]]);
        }
        other => panic!("expected deletion, got {:?}", other),
    }

    let remaining = ctx.store.query_by_month(Month::March).await.unwrap();
    assert!(remaining.iter().all(|i| !doomed.contains(&i.id)));
    assert!(ctx.gallery.selection().is_empty());
    assert!(!ctx.gallery.action_bar().visible);
}

#[tokio::test]
async fn declined_delete_keeps_everything() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx.upload(&files(), None, Some(Month::June)).await.unwrap();
    ctx.open_month(Month::June).await.unwrap();
    ctx.toggle(report.saved[0]);

    let outcome = ctx
        .delete_selected(&mut |_: &DeletePrompt| false)
        .await
        .unwrap();
    assert!(matches!(outcome, DeleteOutcome::Cancelled));
    assert_eq!(ctx.gallery.selection().len(), 1);
    assert_eq!(ctx.store.count_by_month(Month::June).await.unwrap(), 4);
}

#[tokio::test]
async fn delete_with_empty_selection_does_not_ask() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let outcome = ctx
        .delete_selected(&mut |_: &DeletePrompt| -> bool { panic!("should not ask") })
        .await
        .unwrap();
    assert!(matches!(outcome, DeleteOutcome::Nothing));
}

#[tokio::test]
async fn download_writes_fixed_extensions_and_skips_missing() {
    let base = test_dir();
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx.upload(&files(), None, Some(Month::October)).await.unwrap();
    ctx.open_month(Month::October).await.unwrap();

    for id in &report.saved {
        ctx.toggle(*id);
    }
    // deleted behind the gallery's back after being selected
    let vanished = report.saved[1];
    ctx.store
        .delete_by_ids(&[vanished].into_iter().collect())
        .await
        .unwrap();

    let mut sink = DirectorySink::new(base.join("downloads"));
    let dl = ctx.download_selected(&mut sink).await.unwrap();

    assert_eq!(dl.skipped, vec![vanished]);
    assert_eq!(
        dl.saved,
        vec![
            format!("media_{}.jpg", report.saved[0]),
            format!("media_{}.mp4", report.saved[2]),
            format!("media_{}.mp4", report.saved[3]),
        ]
    );
    let first = std::fs::read(sink.dir().join(&dl.saved[0])).unwrap();
    assert_eq!(first, vec![1; 16]);
    assert_eq!(sink.written().len(), 3);
    assert!(ctx.gallery.selection().is_empty());

    let _ = std::fs::remove_dir_all(&base);
}

#[tokio::test]
async fn download_filename_ignores_real_encoding() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx.upload(&files(), None, Some(Month::April)).await.unwrap();

    let mov = ctx.store.get_by_id(report.saved[2]).await.unwrap().unwrap();
    assert_eq!(mov.kind, MediaKind::Video);
    assert_eq!(mov.mime_type, "video/quicktime");
    assert_eq!(download_filename(&mov), format!("media_{}.mp4", mov.id));
}

#[tokio::test]
async fn upload_paths_reads_files_and_folders() {
    let base = test_dir();
    let drop_dir = base.join("drop");
    std::fs::create_dir_all(drop_dir.join("sub")).unwrap();
    std::fs::write(drop_dir.join("a.jpg"), b"jpeg").unwrap();
    std::fs::write(drop_dir.join("sub").join("b.mp4"), b"mp4").unwrap();
    std::fs::write(drop_dir.join("c.txt"), b"text").unwrap();
    let single = base.join("single.png");
    std::fs::write(&single, b"png").unwrap();

    let mut ctx = AppContext::in_memory().await.unwrap();
    ctx.open_month(Month::September).await.unwrap();
    let (report, view) = ctx
        .upload_paths(&[single.clone(), drop_dir.clone()], None, Some(Month::September))
        .await
        .unwrap();

    assert_eq!(report.saved.len(), 3);
    assert_eq!(report.skipped, vec!["c.txt".to_string()]);
    // the open gallery was refreshed with the new items
    assert_eq!(gallery_ids(&view), report.saved);

    let first = ctx.store.get_by_id(report.saved[0]).await.unwrap().unwrap();
    assert_eq!(first.mime_type, "image/png");
    assert_eq!(first.blob.bytes, b"png".to_vec());

    let _ = std::fs::remove_dir_all(&base);
}

#[cfg(unix)]
#[tokio::test]
async fn upload_paths_does_not_follow_folder_links() {
    let base = test_dir();
    let drop_dir = base.join("drop");
    std::fs::create_dir_all(&drop_dir).unwrap();
    std::fs::write(drop_dir.join("a.jpg"), b"jpeg").unwrap();
    std::os::unix::fs::symlink(".", drop_dir.join("self")).unwrap();
    std::os::unix::fs::symlink(drop_dir.join("a.jpg"), drop_dir.join("b.jpg")).unwrap();

    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx
        .upload_paths(&[drop_dir.clone()], None, Some(Month::March))
        .await
        .unwrap();

    // a.jpg plus the linked file b.jpg; the folder link is not walked
    assert_eq!(report.saved.len(), 2);
    assert_eq!(ctx.store.count_by_month(Month::March).await.unwrap(), 2);

    let _ = std::fs::remove_dir_all(&base);
}

#[tokio::test]
async fn entering_a_season_or_another_month_clears_selection() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (march, _) = ctx.upload(&files(), None, Some(Month::March)).await.unwrap();
    ctx.upload(&files(), None, Some(Month::April)).await.unwrap();

    ctx.open_month(Month::March).await.unwrap();
    assert_eq!(
        ctx.gallery.displayed().iter().copied().collect::<Vec<_>>(),
        march.saved
    );
    ctx.toggle(march.saved[0]);
    ctx.toggle(march.saved[2]);
    assert!(ctx.gallery.selection().contains(march.saved[2]));
    assert!(ctx.gallery.action_bar().visible);

    ctx.gallery.enter_months(Season::Spring);
    assert_eq!(ctx.gallery.view(), View::Months);
    assert!(ctx.gallery.selection().is_empty());
    assert!(!ctx.gallery.action_bar().visible);
    assert!(ctx.gallery.displayed().is_empty());

    ctx.open_month(Month::March).await.unwrap();
    ctx.toggle(march.saved[1]);
    assert!(ctx.gallery.selection().contains(march.saved[1]));

    ctx.gallery.enter_gallery(Month::April);
    assert_eq!(ctx.gallery.active_month(), Some(Month::April));
    assert!(!ctx.gallery.selection().contains(march.saved[1]));
    assert!(ctx.gallery.selection().is_empty());
    assert!(!ctx.gallery.action_bar().visible);
}

#[tokio::test]
async fn always_confirm_deletes_without_asking() {
    let mut ctx = AppContext::in_memory().await.unwrap();
    let (report, _) = ctx.upload(&files(), None, Some(Month::July)).await.unwrap();
    ctx.open_month(Month::July).await.unwrap();
    ctx.toggle(report.saved[0]);

    match ctx.delete_selected(&mut AlwaysConfirm).await.unwrap() {
        DeleteOutcome::Deleted { removed, .. } => assert_eq!(removed, 1),
        other => panic!("expected deletion, got {:?}", other),
    }
    assert!(ctx.store.get_by_id(report.saved[0]).await.unwrap().is_none());
    assert_eq!(ctx.store.count_by_month(Month::July).await.unwrap(), 3);
}
