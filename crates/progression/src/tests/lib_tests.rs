use super::*;
use shared::domain::BOOTSTRAP_CREDENTIAL;

async fn tracker() -> (ProgressionController, LevelStore) {
    let store = LevelStore::new("sqlite::memory:").await.expect("db");
    store.initialize().await.expect("initialize");
    (ProgressionController::new(store.clone()), store)
}

#[tokio::test]
async fn selecting_a_captured_level_locks_editing() {
    let (mut tracker, _store) = tracker().await;
    let view = tracker.select(LevelIndex(0)).await.expect("select");
    assert!(!view.editable);
    assert!(!tracker.edit_unlocked());
}

#[tokio::test]
async fn selecting_an_empty_level_unlocks_editing() {
    let (mut tracker, store) = tracker().await;
    store
        .upsert_level(&Level::new(LevelIndex(1), ""))
        .await
        .expect("upsert");

    let view = tracker.select(LevelIndex(1)).await.expect("select");
    assert!(view.editable);
    assert_eq!(tracker.selected(), Some(LevelIndex(1)));
}

#[tokio::test]
async fn selecting_an_unknown_index_is_rejected() {
    let (mut tracker, _store) = tracker().await;
    let err = tracker.select(LevelIndex(12)).await.expect_err("select");
    assert!(matches!(err, TrackerError::Validation(_)));
    assert_eq!(tracker.selected(), None);
}

#[tokio::test]
async fn unlock_edit_overrides_the_credential_lock() {
    let (mut tracker, _store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");
    assert!(!tracker.edit_unlocked());

    tracker.unlock_edit().expect("unlock");
    assert!(tracker.edit_unlocked());
}

#[tokio::test]
async fn unlock_edit_without_selection_is_forbidden() {
    let (mut tracker, _store) = tracker().await;
    let err = tracker.unlock_edit().expect_err("unlock");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[tokio::test]
async fn blank_credentials_are_rejected_without_mutation() {
    let (mut tracker, store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");

    for blank in ["", "   "] {
        let err = tracker.save_credential(blank).await.expect_err("save");
        assert!(matches!(err, TrackerError::Validation(_)));
    }

    let levels = store.list_levels().await.expect("list");
    assert_eq!(levels, vec![Level::origin()]);
}

#[tokio::test]
async fn save_without_selection_is_forbidden() {
    let (mut tracker, _store) = tracker().await;
    let err = tracker
        .save_credential("xyz123abc")
        .await
        .expect_err("save");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[tokio::test]
async fn save_persists_as_typed_and_relocks() {
    let (mut tracker, store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");
    tracker.unlock_edit().expect("unlock");

    tracker.save_credential(" newpass ").await.expect("save");

    assert!(!tracker.edit_unlocked());
    assert_eq!(
        store.level(LevelIndex(0)).await.expect("level"),
        Some(Level::new(LevelIndex(0), " newpass "))
    );
}

#[tokio::test]
async fn fresh_store_reports_ready_from_the_seed() {
    // The seeded "bandit0" is non-empty and longer than the plausibility
    // cutoff, so a fresh store already offers mission 1.
    let (tracker, _store) = tracker().await;
    assert_eq!(
        tracker.next_availability().await.expect("availability"),
        NextAvailability::Ready {
            next: LevelIndex(1)
        }
    );
}

#[tokio::test]
async fn short_credentials_save_but_do_not_enable_advance() {
    let (mut tracker, _store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");
    tracker.unlock_edit().expect("unlock");
    tracker.save_credential("abc").await.expect("save");

    assert_eq!(
        tracker.next_availability().await.expect("availability"),
        NextAvailability::Locked
    );
    let err = tracker.advance().await.expect_err("advance");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[tokio::test]
async fn plausibility_cutoff_is_strictly_greater_than_five() {
    let (mut tracker, _store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");

    tracker.unlock_edit().expect("unlock");
    tracker.save_credential("12345").await.expect("save");
    assert_eq!(
        tracker.next_availability().await.expect("availability"),
        NextAvailability::Locked
    );

    tracker.unlock_edit().expect("unlock");
    tracker.save_credential("123456").await.expect("save");
    assert_eq!(
        tracker.next_availability().await.expect("availability"),
        NextAvailability::Ready {
            next: LevelIndex(1)
        }
    );
}

#[tokio::test]
async fn advance_appends_an_empty_level_and_selects_it() {
    let (mut tracker, store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");
    tracker.unlock_edit().expect("unlock");
    tracker.save_credential("xyz123abc").await.expect("save");

    let view = tracker.advance().await.expect("advance");

    assert_eq!(view.level, Some(Level::new(LevelIndex(1), "")));
    assert!(view.editable);
    assert_eq!(tracker.selected(), Some(LevelIndex(1)));
    assert_eq!(
        store.list_levels().await.expect("list"),
        vec![
            Level::new(LevelIndex(0), "xyz123abc"),
            Level::new(LevelIndex(1), ""),
        ]
    );
}

#[tokio::test]
async fn advance_is_refused_while_the_latest_level_is_open() {
    let (mut tracker, _store) = tracker().await;
    tracker.advance().await.expect("first advance");

    // Mission 1 has no credential yet, so a second deploy is locked.
    let err = tracker.advance().await.expect_err("second advance");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[tokio::test]
async fn advance_is_refused_at_the_final_level() {
    let (mut tracker, store) = tracker().await;
    store
        .upsert_level(&Level::new(FINAL_LEVEL, "plausiblepassword"))
        .await
        .expect("upsert");

    assert_eq!(
        tracker.next_availability().await.expect("availability"),
        NextAvailability::AllDeployed
    );
    let err = tracker.advance().await.expect_err("advance");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[tokio::test]
async fn delete_without_selection_is_forbidden() {
    let (mut tracker, _store) = tracker().await;
    let err = tracker.delete_selected().await.expect_err("delete");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[tokio::test]
async fn origin_level_cannot_be_deleted() {
    let (mut tracker, store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");

    let err = tracker.delete_selected().await.expect_err("delete");
    assert!(matches!(err, TrackerError::Forbidden(_)));
    assert_eq!(store.list_levels().await.expect("list").len(), 1);
}

#[tokio::test]
async fn current_view_reflects_the_latest_store_state() {
    let (mut tracker, _store) = tracker().await;
    tracker.select(LevelIndex(0)).await.expect("select");
    tracker.unlock_edit().expect("unlock");
    tracker.save_credential("xyz123abc").await.expect("save");

    let view = tracker.current_view().await.expect("view");
    assert_eq!(view.level, Some(Level::new(LevelIndex(0), "xyz123abc")));
    assert!(!view.editable);
}

#[tokio::test]
async fn scenario_save_advance_then_purge_falls_back() {
    let (mut tracker, store) = tracker().await;
    assert_eq!(
        store.list_levels().await.expect("list"),
        vec![Level::new(LevelIndex(0), BOOTSTRAP_CREDENTIAL)]
    );

    tracker.select(LevelIndex(0)).await.expect("select");
    tracker.unlock_edit().expect("unlock");
    tracker.save_credential("xyz123abc").await.expect("save");
    assert_eq!(
        tracker.next_availability().await.expect("availability"),
        NextAvailability::Ready {
            next: LevelIndex(1)
        }
    );

    let view = tracker.advance().await.expect("advance");
    assert_eq!(tracker.selected(), Some(LevelIndex(1)));
    assert!(view.editable);

    let view = tracker.delete_selected().await.expect("delete");
    assert_eq!(tracker.selected(), Some(LevelIndex(0)));
    assert!(!view.editable);
    assert_eq!(
        store.list_levels().await.expect("list"),
        vec![Level::new(LevelIndex(0), "xyz123abc")]
    );
}
