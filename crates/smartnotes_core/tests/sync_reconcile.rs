use chrono::{DateTime, TimeZone, Utc};
use smartnotes_core::db::open_db_in_memory;
use smartnotes_core::{
    Note, NoteFields, NoteInput, NoteRepository, NoteService, NoteServiceError, NoteTag,
    NoteUpsert, NoteValidationError, SqliteNoteRepository, SyncError, SyncReconciler,
};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn repo() -> SqliteNoteRepository {
    SqliteNoteRepository::try_new(open_db_in_memory().unwrap())
        .unwrap()
        .with_clock(fixed_time)
}

fn entry(id: &str, title: &str, content: &str, tag: &str) -> NoteInput {
    NoteInput::new(title, content, tag).with_id(id)
}

fn summary(notes: &[Note]) -> Vec<(String, String, String, NoteTag)> {
    notes
        .iter()
        .map(|note| {
            (
                note.id.clone(),
                note.title.clone(),
                note.content.clone(),
                note.tag,
            )
        })
        .collect()
}

#[test]
fn sync_inserts_unseen_ids_and_returns_full_set() {
    let service = NoteService::new(repo());
    let (server_note, _) = service
        .create_note(&NoteInput::new("server", "already here", "Work").with_id("s1"))
        .unwrap();

    let notes = service
        .sync_notes(&[
            entry("c1", "offline one", "body one", "Personal"),
            entry("c2", "offline two", "body two", "Study"),
        ])
        .unwrap();

    assert_eq!(
        notes.iter().map(|note| note.id.as_str()).collect::<Vec<_>>(),
        vec!["s1", "c1", "c2"]
    );
    assert_eq!(notes[0], server_note);
    assert!(notes.iter().all(|note| note.updated_at == fixed_time()));
}

#[test]
fn applying_same_batch_twice_is_idempotent() {
    let service = NoteService::new(repo());
    let batch = [
        entry("a", "A", "alpha", "Work"),
        entry("b", "B", "beta", "Other"),
    ];

    let first = service.sync_notes(&batch).unwrap();
    let second = service.sync_notes(&batch).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.len(), 2);
}

#[test]
fn last_entry_for_an_id_wins() {
    let service = NoteService::new(repo());
    let notes = service
        .sync_notes(&[
            entry("dup", "T", "first content", "Work"),
            entry("other", "O", "other content", "Work"),
            entry("dup", "T", "second content", "Study"),
        ])
        .unwrap();

    assert_eq!(
        summary(&notes),
        vec![
            (
                "dup".to_string(),
                "T".to_string(),
                "second content".to_string(),
                NoteTag::Study
            ),
            (
                "other".to_string(),
                "O".to_string(),
                "other content".to_string(),
                NoteTag::Work
            ),
        ]
    );
}

#[test]
fn stale_client_copy_overwrites_newer_server_edit() {
    let service = NoteService::new(SqliteNoteRepository::try_new(open_db_in_memory().unwrap()).unwrap());
    service
        .create_note(&NoteInput::new("v1", "old", "Work").with_id("n"))
        .unwrap();
    service
        .update_note("n", &NoteInput::new("v2", "newer server edit", "Work"))
        .unwrap();

    let notes = service
        .sync_notes(&[entry("n", "v1", "old", "Work")])
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "v1");
    assert_eq!(notes[0].content, "old");
}

#[test]
fn batch_with_one_invalid_entry_changes_nothing() {
    let service = NoteService::new(repo());
    service
        .sync_notes(&[entry("keep", "K", "original", "Work")])
        .unwrap();
    let before = service.list_notes().unwrap();

    let err = service
        .sync_notes(&[
            entry("keep", "K", "modified", "Work"),
            entry("new", "N", "fresh", "Study"),
            NoteInput {
                title: None,
                ..entry("broken", "", "no title", "Other")
            },
        ])
        .unwrap_err();

    match err {
        NoteServiceError::InvalidBatchEntry { index, error } => {
            assert_eq!(index, 2);
            assert_eq!(error, NoteValidationError::MissingField("title"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.list_notes().unwrap(), before);
}

#[test]
fn entries_without_id_or_with_unknown_tag_reject_the_batch() {
    let repo = repo();
    let reconciler = SyncReconciler::new(&repo);

    let missing_id = reconciler
        .reconcile(&[NoteInput::new("A", "B", "Work")])
        .unwrap_err();
    assert!(matches!(
        missing_id,
        SyncError::InvalidCandidate {
            index: 0,
            error: NoteValidationError::MissingField("id")
        }
    ));

    let bad_tag = reconciler
        .reconcile(&[entry("x", "A", "B", "Errands")])
        .unwrap_err();
    assert!(matches!(
        bad_tag,
        SyncError::InvalidCandidate {
            error: NoteValidationError::InvalidTag(_),
            ..
        }
    ));
    assert!(repo.list_notes().unwrap().is_empty());
}

#[test]
fn storage_failure_mid_batch_rolls_back_earlier_entries() {
    let repo = repo();
    let fields = NoteFields {
        title: "T".to_string(),
        content: "C".to_string(),
        tag: NoteTag::Work,
    };

    let err = repo
        .bulk_upsert(&[
            NoteUpsert {
                id: "written-first".to_string(),
                fields: fields.clone(),
            },
            NoteUpsert {
                id: String::new(),
                fields,
            },
        ])
        .unwrap_err();
    assert!(matches!(err, smartnotes_core::RepoError::Db(_)));
    assert!(repo.get_note("written-first").unwrap().is_none());
}

#[test]
fn replaced_notes_keep_their_list_position() {
    let service = NoteService::new(repo());
    service
        .sync_notes(&[
            entry("first", "1", "one", "Work"),
            entry("second", "2", "two", "Work"),
        ])
        .unwrap();

    let notes = service
        .sync_notes(&[entry("first", "1", "one edited", "Work")])
        .unwrap();
    assert_eq!(notes[0].id, "first");
    assert_eq!(notes[0].content, "one edited");
    assert_eq!(notes[1].id, "second");
}

#[test]
fn empty_batch_returns_current_notes() {
    let service = NoteService::new(repo());
    service
        .create_note(&NoteInput::new("A", "B", "Work"))
        .unwrap();
    assert_eq!(service.sync_notes(&[]).unwrap().len(), 1);
}
