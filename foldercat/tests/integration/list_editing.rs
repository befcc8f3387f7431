//! Editing the working list before a merge.

use foldercat::config::Config;
use foldercat::pipeline::Pipeline;
use foldercat::session::WorkingList;
use std::sync::Arc;

use crate::common::{
    RecordingObserver, ScriptedLauncher, page_widths, source_folder, write_image, write_pdf,
};

#[tokio::test]
async fn test_reordered_and_trimmed_list_drives_output() {
    let (_root, folder) = source_folder("Edited");
    write_pdf(&folder, "a.pdf", 1, 301);
    let removed = write_pdf(&folder, "b.pdf", 2, 302);
    write_pdf(&folder, "c.pdf", 1, 303);
    write_image(&folder, "d.png", 40, 10);

    let mut list = WorkingList::load(&folder, None).unwrap();
    assert!(list.move_up(3));
    assert!(list.move_up(2));
    assert_eq!(list.selected(), Some(1));

    let taken = list.remove(2).unwrap();
    assert_eq!(taken.name(), "b.pdf");

    let names: Vec<String> = list.files().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["a.pdf", "d.png", "c.pdf"]);

    let pipeline = Pipeline::new(Arc::new(ScriptedLauncher::new()));
    let report = pipeline
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(
        page_widths(&folder.join("Edited_merged.pdf")),
        vec![301, 40, 303]
    );
    assert!(removed.exists(), "removing from the list must not delete the file");
}

#[tokio::test]
async fn test_reload_after_run_restores_folder_order() {
    let (_root, folder) = source_folder("Reload");
    write_pdf(&folder, "1.pdf", 1, 301);
    write_pdf(&folder, "2.pdf", 1, 302);

    let mut list = WorkingList::load(&folder, None).unwrap();
    list.move_down(0);
    list.remove(0);

    let pipeline = Pipeline::new(Arc::new(ScriptedLauncher::new()));
    pipeline
        .run(&list.to_request(), Arc::new(RecordingObserver::default()))
        .await
        .unwrap();

    list.reload().unwrap();
    let names: Vec<String> = list.files().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["1.pdf", "2.pdf"]);
    assert_eq!(list.selected(), None);
}

#[test]
fn test_exclude_patterns_hide_files() {
    let (_root, folder) = source_folder("Filtered");
    write_pdf(&folder, "keep.pdf", 1, 301);
    write_image(&folder, "skip.png", 10, 10);
    write_image(&folder, "also.jpg", 10, 10);

    let config = Config {
        exclude: vec!["*.png".to_string()],
        ..Config::for_folder(&folder)
    };
    config.validate().unwrap();

    let list = WorkingList::load(&folder, config.exclude_set().unwrap()).unwrap();
    let names: Vec<String> = list.files().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["also.jpg", "keep.pdf"]);
}

#[test]
fn test_unrecognized_files_are_not_listed() {
    let (_root, folder) = source_folder("Noise");
    write_pdf(&folder, "doc.pdf", 1, 301);
    std::fs::write(folder.join("notes.txt"), b"hello").unwrap();
    std::fs::write(folder.join("__temp_doc.pdf"), b"%PDF-1.5").unwrap();
    std::fs::create_dir(folder.join("nested")).unwrap();
    write_pdf(&folder.join("nested"), "inner.pdf", 1, 302);

    let list = WorkingList::load(&folder, None).unwrap();
    let names: Vec<String> = list.files().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["doc.pdf"]);
}
