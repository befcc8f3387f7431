//! Runs on the background worker, observed through its event stream.

use foldercat::pipeline::{Phase, Pipeline};
use foldercat::session::WorkingList;
use foldercat::worker::{MergeEvent, MergeWorker};
use std::sync::Arc;

use crate::common::{ScriptedLauncher, page_widths, source_folder, write_document, write_pdf};

fn worker() -> MergeWorker {
    MergeWorker::new(Pipeline::new(Arc::new(ScriptedLauncher::new())))
}

#[test]
fn test_event_stream_of_a_successful_run() {
    let (_root, folder) = source_folder("Events");
    write_pdf(&folder, "a.pdf", 1, 301);
    write_document(&folder, "b.docx");

    let list = WorkingList::load(&folder, None).unwrap();
    let worker = worker();
    let mut handle = worker.spawn(list.to_request()).unwrap();

    let mut events = Vec::new();
    while let Some(event) = handle.recv_blocking() {
        events.push(event);
    }

    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            MergeEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents.first(), Some(&0));
    assert_eq!(percents.last(), Some(&100));

    let logs: Vec<&String> = events
        .iter()
        .filter_map(|e| match e {
            MergeEvent::Log(line) => Some(line),
            _ => None,
        })
        .collect();
    assert!(!logs.is_empty());
    assert!(logs.iter().all(|l| l.starts_with('[')));

    let Some(MergeEvent::Finished(Ok(report))) = events.last() else {
        panic!("run did not finish successfully: {:?}", events.last());
    };
    assert_eq!(report.succeeded(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        MergeEvent::Progress {
            phase: Phase::Done,
            ..
        }
    )));

    assert!(!worker.is_running());
    assert_eq!(
        page_widths(&folder.join("Events_merged.pdf")),
        vec![301, 333]
    );
}

#[test]
fn test_worker_accepts_a_new_run_after_finishing() {
    let (_root, folder) = source_folder("Twice");
    write_pdf(&folder, "a.pdf", 1, 301);
    let list = WorkingList::load(&folder, None).unwrap();
    let worker = worker();

    let first = worker.spawn(list.to_request()).unwrap().wait().unwrap();
    let second = worker.spawn(list.to_request()).unwrap().wait().unwrap();

    assert_eq!(first.pages, 1);
    assert_eq!(second.pages, 1);
}

#[test]
fn test_failed_run_is_reported_as_finished_error() {
    let (_root, folder) = source_folder("Nothing");
    std::fs::write(folder.join("a.png"), b"not an image").unwrap();
    let list = WorkingList::load(&folder, None).unwrap();

    let err = worker().spawn(list.to_request()).unwrap().wait().unwrap_err();

    assert!(err.is_fatal());
    assert!(!folder.join("Nothing_merged.pdf").exists());
}
