//! End-to-end merges of generated folders.

use foldercat::convert::AppKind;
use foldercat::error::ErrorCategory;
use foldercat::pipeline::{Phase, Pipeline};
use foldercat::session::WorkingList;
use std::sync::Arc;

use crate::common::{
    RecordingObserver, ScriptedLauncher, page_widths, source_folder, temp_files, write_document,
    write_image, write_pdf,
};

#[tokio::test]
async fn test_mixed_folder_merges_in_list_order() {
    let (_root, folder) = source_folder("Reports");
    write_pdf(&folder, "01_cover.pdf", 1, 301);
    write_image(&folder, "02_photo.png", 30, 20);
    write_pdf(&folder, "03_body.pdf", 2, 302);
    write_document(&folder, "04_memo.docx");
    write_image(&folder, "05_chart.jpg", 40, 20);
    write_pdf(&folder, "06_tail.pdf", 1, 303);

    let list = WorkingList::load(&folder, None).unwrap();
    let launcher = ScriptedLauncher::new().fails("04_memo.docx");
    let pipeline = Pipeline::new(Arc::new(launcher));
    let observer = Arc::new(RecordingObserver::default());

    let report = pipeline
        .run(&list.to_request(), observer.clone())
        .await
        .unwrap();

    assert_eq!(report.total, 6);
    assert_eq!(report.succeeded(), 5);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].name, "04_memo.docx");
    assert_eq!(report.failures[0].category, ErrorCategory::Conversion);
    assert_eq!(
        report.merged,
        vec![
            "01_cover.pdf",
            "02_photo.png",
            "03_body.pdf",
            "05_chart.jpg",
            "06_tail.pdf"
        ]
    );

    let output = folder.join("Reports_merged.pdf");
    assert_eq!(report.output.as_deref(), Some(output.as_path()));
    assert_eq!(report.pages, 6);
    assert_eq!(page_widths(&output), vec![301, 30, 302, 302, 40, 303]);
    assert!(temp_files(&folder).is_empty());
    assert!(folder.join("04_memo.docx").exists());

    assert!(observer.logged("⚠ Conversion failed: 04_memo.docx"));
    assert!(observer.logged("Removing temporary files."));
}

#[tokio::test]
async fn test_progress_runs_from_zero_to_done() {
    let (_root, folder) = source_folder("Progress");
    write_image(&folder, "a.png", 10, 10);
    write_document(&folder, "b.docx");
    write_pdf(&folder, "c.pdf", 1, 300);

    let list = WorkingList::load(&folder, None).unwrap();
    let pipeline = Pipeline::new(Arc::new(ScriptedLauncher::new()));
    let observer = Arc::new(RecordingObserver::default());

    pipeline
        .run(&list.to_request(), observer.clone())
        .await
        .unwrap();

    let progress = observer.progress();
    assert_eq!(progress.first(), Some(&(0, Phase::ConvertingImages)));
    assert_eq!(progress.last(), Some(&(100, Phase::Done)));
    assert!(progress.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(progress.contains(&(80, Phase::Concatenating)));
    assert!(progress.contains(&(95, Phase::Writing)));
    assert!(progress.iter().all(|(p, _)| *p <= 100));
}

#[tokio::test]
async fn test_documents_keep_their_list_position() {
    let (_root, folder) = source_folder("Mixed");
    write_pdf(&folder, "a.pdf", 1, 301);
    write_document(&folder, "b.docx");
    write_image(&folder, "c.png", 30, 10);
    write_document(&folder, "d.xlsx");
    write_document(&folder, "e.hwp");

    let launcher = Arc::new(
        ScriptedLauncher::new()
            .converts("b.docx", 311)
            .converts("d.xlsx", 312)
            .converts("e.hwp", 313),
    );
    let list = WorkingList::load(&folder, None).unwrap();
    let pipeline = Pipeline::new(launcher.clone());
    let observer = Arc::new(RecordingObserver::default());

    let report = pipeline
        .run(&list.to_request(), observer.clone())
        .await
        .unwrap();

    assert_eq!(report.failed(), 0);
    assert_eq!(
        page_widths(&folder.join("Mixed_merged.pdf")),
        vec![301, 311, 30, 312, 313]
    );
    assert_eq!(
        launcher.launched(),
        vec![AppKind::Word, AppKind::Spreadsheet, AppKind::Hangul]
    );
    assert!(observer.logged("✓ Converted: b.docx"));
    assert!(temp_files(&folder).is_empty());
}

#[tokio::test]
async fn test_natural_order_of_numbered_files() {
    let (_root, folder) = source_folder("Scans");
    write_pdf(&folder, "page10.pdf", 1, 110);
    write_pdf(&folder, "page2.pdf", 1, 102);
    write_pdf(&folder, "Page1.pdf", 1, 101);

    let list = WorkingList::load(&folder, None).unwrap();
    let names: Vec<String> = list.files().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Page1.pdf", "page2.pdf", "page10.pdf"]);

    let pipeline = Pipeline::new(Arc::new(ScriptedLauncher::new()));
    pipeline
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();

    assert_eq!(
        page_widths(&folder.join("Scans_merged.pdf")),
        vec![101, 102, 110]
    );
}

#[tokio::test]
async fn test_rerun_skips_previous_output() {
    let (_root, folder) = source_folder("Again");
    write_pdf(&folder, "a.pdf", 2, 301);
    write_pdf(&folder, "b.pdf", 1, 302);
    let pipeline = Pipeline::new(Arc::new(ScriptedLauncher::new()));

    let first = WorkingList::load(&folder, None).unwrap();
    let report = pipeline
        .run(&first.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();
    assert_eq!(report.pages, 3);

    let second = WorkingList::load(&folder, None).unwrap();
    assert_eq!(second.len(), 2);
    assert!(second.files().iter().all(|f| f.name() != "Again_merged.pdf"));

    let report = pipeline
        .run(&second.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();
    assert_eq!(report.pages, 3);
    assert_eq!(
        page_widths(&folder.join("Again_merged.pdf")),
        vec![301, 301, 302]
    );
}

#[tokio::test]
async fn test_single_image_folder() {
    let (_root, folder) = source_folder("Photo");
    write_image(&folder, "only.png", 64, 48);

    let list = WorkingList::load(&folder, None).unwrap();
    let pipeline = Pipeline::new(Arc::new(ScriptedLauncher::new()));
    let report = pipeline
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(page_widths(&folder.join("Photo_merged.pdf")), vec![64]);
    assert!(temp_files(&folder).is_empty());
}

#[tokio::test]
async fn test_overlapping_names_keep_their_own_pages() {
    let (_root, folder) = source_folder("Overlap");
    write_image(&folder, "a.png", 10, 10);
    write_image(&folder, "a.docx.png", 20, 10);
    write_document(&folder, "a.docx");

    let list = WorkingList::load(&folder, None).unwrap();
    let launcher = ScriptedLauncher::new().converts("a.docx", 311);
    let report = Pipeline::new(Arc::new(launcher))
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();

    assert_eq!(report.merged, vec!["a.docx", "a.docx.png", "a.png"]);
    assert_eq!(
        page_widths(&folder.join("Overlap_merged.pdf")),
        vec![311, 20, 10]
    );
    assert!(temp_files(&folder).is_empty());
}
