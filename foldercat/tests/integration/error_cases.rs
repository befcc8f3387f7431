//! Failure handling: what stops a run, what only skips a file.

use foldercat::FolderCatError;
use foldercat::convert::AppKind;
use foldercat::error::ErrorCategory;
use foldercat::pipeline::{MergeRequest, Pipeline};
use foldercat::session::WorkingList;
use std::sync::Arc;

use crate::common::{
    RecordingObserver, ScriptedLauncher, page_widths, source_folder, temp_files, write_document,
    write_image, write_pdf,
};

fn pipeline() -> Pipeline {
    Pipeline::new(Arc::new(ScriptedLauncher::new()))
}

#[tokio::test]
async fn test_empty_list_writes_nothing() {
    let (_root, folder) = source_folder("Empty");
    let list = WorkingList::load(&folder, None).unwrap();
    assert!(list.is_empty());

    let observer = Arc::new(RecordingObserver::default());
    let err = pipeline()
        .run(&list.to_request(), observer.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, FolderCatError::NoFilesToMerge));
    assert!(!folder.join("Empty_merged.pdf").exists());
    assert!(observer.progress().is_empty());
}

#[tokio::test]
async fn test_every_file_failing_is_fatal_and_clean() {
    let (_root, folder) = source_folder("Broken");
    std::fs::write(folder.join("a.png"), b"not an image").unwrap();
    write_document(&folder, "b.docx");

    let launcher = ScriptedLauncher::new().fails("b.docx");
    let list = WorkingList::load(&folder, None).unwrap();
    let err = Pipeline::new(Arc::new(launcher))
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, FolderCatError::NothingToMerge { total: 2 }));
    assert!(err.is_fatal());
    assert!(!folder.join("Broken_merged.pdf").exists());
    assert!(temp_files(&folder).is_empty());
}

#[tokio::test]
async fn test_unreadable_pdf_aborts_and_cleans_up() {
    let (_root, folder) = source_folder("Corrupt");
    write_image(&folder, "a.png", 10, 10);
    std::fs::write(folder.join("b.pdf"), b"%PDF-1.5 garbage").unwrap();
    write_pdf(&folder, "c.pdf", 1, 300);

    let list = WorkingList::load(&folder, None).unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let err = pipeline()
        .run(&list.to_request(), observer.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, FolderCatError::FailedToLoadPdf { .. }));
    assert!(!folder.join("Corrupt_merged.pdf").exists());
    assert!(temp_files(&folder).is_empty());
    assert!(observer.logged("Error: the merge failed."));
}

#[tokio::test]
async fn test_file_deleted_after_listing_is_skipped() {
    let (_root, folder) = source_folder("Vanished");
    write_pdf(&folder, "a.pdf", 1, 301);
    let gone = write_pdf(&folder, "b.pdf", 1, 302);
    let gone_image = write_image(&folder, "c.png", 20, 20);
    write_pdf(&folder, "d.pdf", 1, 304);
    let gone_document = write_document(&folder, "e.docx");

    let list = WorkingList::load(&folder, None).unwrap();
    std::fs::remove_file(&gone).unwrap();
    std::fs::remove_file(&gone_image).unwrap();
    std::fs::remove_file(&gone_document).unwrap();

    let launcher = Arc::new(ScriptedLauncher::new().converts("e.docx", 305));
    let report = Pipeline::new(launcher.clone())
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded(), 2);
    let failed: Vec<(&str, ErrorCategory)> = report
        .failures
        .iter()
        .map(|f| (f.name.as_str(), f.category))
        .collect();
    assert_eq!(
        failed,
        vec![
            ("b.pdf", ErrorCategory::MissingFile),
            ("c.png", ErrorCategory::MissingFile),
            ("e.docx", ErrorCategory::MissingFile)
        ]
    );
    assert!(launcher.launched().is_empty());
    assert_eq!(
        page_widths(&folder.join("Vanished_merged.pdf")),
        vec![301, 304]
    );
}

#[tokio::test]
async fn test_missing_application_only_skips_its_documents() {
    let (_root, folder) = source_folder("NoHangul");
    write_pdf(&folder, "a.pdf", 1, 301);
    write_document(&folder, "b.hwp");
    write_document(&folder, "c.docx");

    let launcher = ScriptedLauncher::new()
        .without(AppKind::Hangul)
        .converts("c.docx", 303);
    let list = WorkingList::load(&folder, None).unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let report = Pipeline::new(Arc::new(launcher))
        .run(&list.to_request(), observer.clone())
        .await
        .unwrap();

    assert_eq!(report.merged, vec!["a.pdf", "c.docx"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "b.hwp");
    assert_eq!(report.failures[0].category, ErrorCategory::Conversion);
    assert!(report.failures[0].reason.contains("not available"));
    assert!(observer.logged("⚠ Conversion failed: b.hwp"));
    assert!(temp_files(&folder).is_empty());
}

#[tokio::test]
async fn test_request_naming_only_missing_files() {
    let (_root, folder) = source_folder("Manual");
    let missing = folder.join("never-existed.pdf");
    let request = MergeRequest::new(
        &folder,
        vec![foldercat::scan::CandidateFile::from_path(missing).unwrap()],
    );

    let err = pipeline()
        .run(&request, Arc::new(RecordingObserver::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, FolderCatError::NothingToMerge { total: 1 }));
}
