use smartnotes_core::{IdStrategy, NoteInput, RepoError, StoreContext, StoreLocation};

#[test]
fn service_is_initialized_once_and_reused() {
    let context = StoreContext::new(StoreLocation::Memory);
    assert!(!context.is_ready());

    let first = context.service().unwrap();
    first
        .create_note(&NoteInput::new("A", "B", "Work"))
        .unwrap();
    let second = context.service().unwrap();

    assert!(context.is_ready());
    assert!(std::ptr::eq(first, second));
    assert_eq!(second.list_notes().unwrap().len(), 1);
}

#[test]
fn concurrent_first_calls_share_one_initialization() {
    let context = StoreContext::new(StoreLocation::Memory);

    let addresses = std::thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let service = context.service().unwrap();
                    service as *const _ as usize
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn file_store_persists_across_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");

    let id = {
        let context = StoreContext::new(StoreLocation::File(path.clone()))
            .with_id_strategy(IdStrategy::Uuid);
        let (note, _) = context
            .service()
            .unwrap()
            .create_note(&NoteInput::new("persisted", "body", "Study"))
            .unwrap();
        assert_eq!(note.id.len(), 36);
        note.id
    };

    let reopened = StoreContext::new(StoreLocation::File(path));
    let note = reopened.service().unwrap().get_note(&id).unwrap();
    assert_eq!(note.title, "persisted");
}

#[test]
fn unopenable_store_reports_unavailable_and_stays_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("notes.sqlite3");
    let context = StoreContext::new(StoreLocation::File(path));

    match context.service() {
        Err(RepoError::StoreUnavailable(_)) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("store should not open inside a missing directory"),
    }
    assert!(!context.is_ready());
}
