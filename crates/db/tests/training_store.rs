//! Training store behaviour against the in-memory backend:
//! - Bulk insert, counts and per-label counts
//! - Paging windows in insertion order
//! - Label-filtered reads
//! - Atomic label rename, including under concurrent readers
//! - Deletes and validation-before-write

use std::sync::Arc;

use assert_matches::assert_matches;
use mlkids_core::ids::SequentialIds;
use mlkids_core::limits::ObjectLimits;
use mlkids_core::project::{FieldSpec, Project};
use mlkids_core::training::TrainingItem;
use mlkids_core::types::{Paging, ProjectType};
use mlkids_core::{CoreError, ObjectFactory};
use mlkids_db::memory::MemoryBackend;
use mlkids_db::store::{ProjectStore, TrainingStore};
use mlkids_db::StoreError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PROJECT: &str = "project-1";

fn factory() -> ObjectFactory {
    ObjectFactory::new(ObjectLimits::default(), Arc::new(SequentialIds::new("t")))
}

fn store() -> TrainingStore<MemoryBackend> {
    TrainingStore::new(Arc::new(MemoryBackend::new()), factory())
}

/// `per_label` rows for each of `labels` labels, interleaved so that
/// row `i` carries label `i % labels`.
fn text_items(labels: usize, per_label: usize) -> Vec<TrainingItem<String>> {
    (0..labels * per_label)
        .map(|i| {
            TrainingItem::new(
                format!("example text {i}"),
                Some(format!("label{}", i % labels).as_str()),
            )
        })
        .collect()
}

fn unlabelled_items(count: usize) -> Vec<TrainingItem<String>> {
    (0..count)
        .map(|i| TrainingItem::new(format!("row {i}"), None))
        .collect()
}

// ---------------------------------------------------------------------------
// Bulk insert and counts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_bulk_insert_counts_by_label() {
    let store = store();
    let stored = store
        .bulk_store_text_training(PROJECT, &text_items(6, 7))
        .await
        .unwrap();
    assert_eq!(stored.len(), 42);

    assert_eq!(store.count_text_training(PROJECT).await.unwrap(), 42);

    let counts = store.count_text_training_by_label(PROJECT).await.unwrap();
    assert_eq!(counts.len(), 6);
    assert_eq!(counts.values().sum::<i64>(), 42);
    assert!(counts.values().all(|&c| c == 7));
}

#[tokio::test]
async fn test_count_by_label_with_uneven_labels() {
    let store = store();
    let mut items = Vec::new();
    for (label, count) in [("a", 8), ("b", 9), ("c", 10), ("d", 11), ("e", 12)] {
        for i in 0..count {
            items.push(TrainingItem::new(format!("{label} {i}"), Some(label)));
        }
    }
    store.bulk_store_text_training(PROJECT, &items).await.unwrap();

    let counts = store.count_text_training_by_label(PROJECT).await.unwrap();
    assert_eq!(counts["a"], 8);
    assert_eq!(counts["b"], 9);
    assert_eq!(counts["c"], 10);
    assert_eq!(counts["d"], 11);
    assert_eq!(counts["e"], 12);
    assert!(!counts.contains_key("f"));
}

#[tokio::test]
async fn test_counts_are_scoped_by_project() {
    let store = store();
    store
        .bulk_store_text_training(PROJECT, &text_items(2, 3))
        .await
        .unwrap();
    store
        .bulk_store_text_training("project-2", &text_items(1, 4))
        .await
        .unwrap();

    assert_eq!(store.count_text_training(PROJECT).await.unwrap(), 6);
    assert_eq!(store.count_text_training("project-2").await.unwrap(), 4);
    assert_eq!(store.count_text_training("project-3").await.unwrap(), 0);
}

#[tokio::test]
async fn test_bulk_insert_with_invalid_item_writes_nothing() {
    let store = store();
    let mut items = text_items(2, 2);
    items.push(TrainingItem::new(String::new(), Some("label0")));

    let err = store
        .bulk_store_text_training(PROJECT, &items)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::MissingAttribute));
    assert_eq!(store.count_text_training(PROJECT).await.unwrap(), 0);
}

#[tokio::test]
async fn test_bulk_insert_empty_is_noop() {
    let store = store();
    let stored = store.bulk_store_text_training(PROJECT, &[]).await.unwrap();
    assert!(stored.is_empty());
    assert_eq!(store.count_text_training(PROJECT).await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_text_training_normalizes_whitespace() {
    let store = store();
    let stored = store
        .store_text_training(PROJECT, "line one\nline\ttwo", Some("greeting"))
        .await
        .unwrap();
    assert_eq!(stored.textdata, "line one line two");

    let rows = store
        .get_text_training(PROJECT, Paging::default())
        .await
        .unwrap();
    assert_eq!(rows, vec![stored]);
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_paging_returns_full_window_in_order() {
    let store = store();
    let stored = store
        .bulk_store_text_training(PROJECT, &unlabelled_items(52))
        .await
        .unwrap();

    let all = store
        .get_text_training(PROJECT, Paging::new(0, 52))
        .await
        .unwrap();
    assert_eq!(all, stored);

    let window = store
        .get_text_training(PROJECT, Paging::new(10, 40))
        .await
        .unwrap();
    assert_eq!(window.len(), 40);
    assert_eq!(window, stored[10..50]);
}

#[tokio::test]
async fn test_paging_limits() {
    let store = store();
    store
        .bulk_store_text_training(PROJECT, &unlabelled_items(54))
        .await
        .unwrap();

    for (limit, expected) in [(2, 2), (6, 6), (52, 52), (1000, 54)] {
        let rows = store
            .get_text_training(PROJECT, Paging::new(0, limit))
            .await
            .unwrap();
        assert_eq!(rows.len(), expected, "limit {limit}");
    }

    let default_page = store
        .get_text_training(PROJECT, Paging::default())
        .await
        .unwrap();
    assert_eq!(default_page.len(), 50);
}

#[tokio::test]
async fn test_paging_offset_windows() {
    let store = store();
    let stored = store
        .bulk_store_text_training(PROJECT, &unlabelled_items(10))
        .await
        .unwrap();

    let tail = store
        .get_text_training(PROJECT, Paging::new(8, 5))
        .await
        .unwrap();
    assert_eq!(tail, stored[8..10]);

    let past_end = store
        .get_text_training(PROJECT, Paging::new(20, 5))
        .await
        .unwrap();
    assert!(past_end.is_empty());

    let empty = store
        .get_text_training(PROJECT, Paging::new(0, 0))
        .await
        .unwrap();
    assert!(empty.is_empty());

    let negative_start = store
        .get_text_training(PROJECT, Paging::new(-3, 2))
        .await
        .unwrap();
    assert_eq!(negative_start, stored[0..2]);
}

// ---------------------------------------------------------------------------
// Label filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_by_label_preserves_insertion_order() {
    let store = store();
    let labels = [
        "cat", "dog", "bird", "cat", "dog", "bird", "cat", "bird", "dog", "cat",
    ];
    let items: Vec<_> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| TrainingItem::new(format!("row {i}"), Some(*label)))
        .collect();
    let stored = store.bulk_store_text_training(PROJECT, &items).await.unwrap();

    let birds = store
        .get_text_training_by_label(PROJECT, "bird", Paging::default())
        .await
        .unwrap();
    assert_eq!(birds, vec![stored[2].clone(), stored[5].clone(), stored[7].clone()]);

    let second_bird = store
        .get_text_training_by_label(PROJECT, "bird", Paging::new(1, 1))
        .await
        .unwrap();
    assert_eq!(second_bird, vec![stored[5].clone()]);

    let none = store
        .get_text_training_by_label(PROJECT, "fish", Paging::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_training_labels_are_distinct_and_sorted() {
    let store = store();
    store
        .bulk_store_text_training(PROJECT, &text_items(6, 2))
        .await
        .unwrap();
    let labels = store
        .get_training_labels(ProjectType::Text, PROJECT)
        .await
        .unwrap();
    assert_eq!(
        labels,
        vec!["label0", "label1", "label2", "label3", "label4", "label5"]
    );

    let more: Vec<_> = (6..14)
        .map(|i| TrainingItem::new(format!("more {i}"), Some(format!("label{i}").as_str())))
        .collect();
    store.bulk_store_text_training(PROJECT, &more).await.unwrap();

    let labels = store
        .get_training_labels(ProjectType::Text, PROJECT)
        .await
        .unwrap();
    assert_eq!(labels.len(), 14);
    let mut sorted = labels.clone();
    sorted.sort();
    assert_eq!(labels, sorted);
}

// ---------------------------------------------------------------------------
// Rename
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rename_label_moves_every_row() {
    let store = store();
    let mut items = text_items(3, 4);
    for i in 0..3 {
        items.push(TrainingItem::new(format!("before {i}"), Some("BEFORE")));
    }
    store.bulk_store_text_training(PROJECT, &items).await.unwrap();

    let renamed = store
        .rename_text_training_label(PROJECT, "BEFORE", "AFTER")
        .await
        .unwrap();
    assert_eq!(renamed, 3);

    let counts = store.count_text_training_by_label(PROJECT).await.unwrap();
    assert!(!counts.contains_key("BEFORE"));
    assert_eq!(counts["AFTER"], 3);
    assert_eq!(counts.values().sum::<i64>(), 15);
}

#[tokio::test]
async fn test_rename_into_existing_label_adds_counts() {
    let store = store();
    let items: Vec<_> = (0..5)
        .map(|i| TrainingItem::new(format!("row {i}"), Some(if i < 2 { "old" } else { "new" })))
        .collect();
    store.bulk_store_text_training(PROJECT, &items).await.unwrap();

    store
        .rename_text_training_label(PROJECT, "old", "new")
        .await
        .unwrap();
    let counts = store.count_text_training_by_label(PROJECT).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts["new"], 5);
}

#[tokio::test]
async fn test_rename_is_scoped_by_project() {
    let store = store();
    store
        .store_text_training(PROJECT, "mine", Some("BEFORE"))
        .await
        .unwrap();
    store
        .store_text_training("project-2", "theirs", Some("BEFORE"))
        .await
        .unwrap();

    store
        .rename_text_training_label(PROJECT, "BEFORE", "AFTER")
        .await
        .unwrap();

    let theirs = store.count_text_training_by_label("project-2").await.unwrap();
    assert_eq!(theirs["BEFORE"], 1);
}

#[tokio::test]
async fn test_rename_missing_label_changes_nothing() {
    let store = store();
    store
        .bulk_store_text_training(PROJECT, &text_items(2, 2))
        .await
        .unwrap();
    let renamed = store
        .rename_text_training_label(PROJECT, "absent", "AFTER")
        .await
        .unwrap();
    assert_eq!(renamed, 0);
    assert!(!store
        .count_text_training_by_label(PROJECT)
        .await
        .unwrap()
        .contains_key("AFTER"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rename_is_never_observed_partially() {
    const RENAMED: i64 = 500;
    const OTHER: i64 = 20;

    let store = store();
    let mut items: Vec<_> = (0..RENAMED)
        .map(|i| TrainingItem::new(format!("before {i}"), Some("BEFORE")))
        .collect();
    items.extend((0..OTHER).map(|i| TrainingItem::new(format!("after {i}"), Some("AFTER"))));
    store.bulk_store_text_training(PROJECT, &items).await.unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let counts = store.count_text_training_by_label(PROJECT).await.unwrap();
                    let before = counts.get("BEFORE").copied().unwrap_or(0);
                    let after = counts.get("AFTER").copied().unwrap_or(0);
                    assert!(
                        (before == RENAMED && after == OTHER) || (before == 0 && after == RENAMED + OTHER),
                        "partial rename observed: BEFORE={before} AFTER={after}"
                    );
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    store
        .rename_text_training_label(PROJECT, "BEFORE", "AFTER")
        .await
        .unwrap();

    for reader in readers {
        reader.await.unwrap();
    }
}

// ---------------------------------------------------------------------------
// Deletes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_by_project_is_idempotent() {
    let store = store();
    store
        .bulk_store_text_training(PROJECT, &text_items(2, 5))
        .await
        .unwrap();

    assert_eq!(
        store.delete_text_training_by_project_id(PROJECT).await.unwrap(),
        10
    );
    assert_eq!(store.count_text_training(PROJECT).await.unwrap(), 0);
    assert_eq!(
        store.delete_text_training_by_project_id(PROJECT).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_delete_single_row() {
    let store = store();
    let stored = store
        .bulk_store_text_training(PROJECT, &unlabelled_items(3))
        .await
        .unwrap();

    let deleted = store
        .delete_text_training(PROJECT, &stored[1].id)
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let rows = store
        .get_text_training(PROJECT, Paging::default())
        .await
        .unwrap();
    assert_eq!(rows, vec![stored[0].clone(), stored[2].clone()]);
}

// ---------------------------------------------------------------------------
// Numbers and images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_number_training_round_trip() {
    let store = store();
    let items = vec![
        TrainingItem::new(vec![1.0, 3.0, 4.3, -5.1], Some("yes")),
        TrainingItem::new(vec![0.5, 0.0, 2.0, 10.0], Some("no")),
    ];
    let stored = store
        .bulk_store_number_training(PROJECT, &items)
        .await
        .unwrap();

    let rows = store
        .get_number_training(PROJECT, Paging::default())
        .await
        .unwrap();
    assert_eq!(rows, stored);
    assert_eq!(rows[0].numberdata, vec![1.0, 3.0, 4.3, -5.1]);

    let yes = store
        .get_number_training_by_label(PROJECT, "yes", Paging::default())
        .await
        .unwrap();
    assert_eq!(yes.len(), 1);
    assert_eq!(store.count_number_training(PROJECT).await.unwrap(), 2);
    assert_eq!(store.count_text_training(PROJECT).await.unwrap(), 0);
}

#[tokio::test]
async fn test_number_training_rejects_bad_data() {
    let store = store();
    let err = store
        .store_number_training(PROJECT, &[1.0, f64::NAN], None)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::NonNumericData));

    let too_many = vec![1.0; 13];
    let err = store
        .store_number_training(PROJECT, &too_many, None)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::TooManyItems));

    assert_eq!(store.count_number_training(PROJECT).await.unwrap(), 0);
}

#[tokio::test]
async fn test_number_training_checks_project_fields() {
    let backend = Arc::new(MemoryBackend::new());
    let factory = factory();
    let projects = ProjectStore::new(Arc::clone(&backend), factory.clone());
    let training = TrainingStore::new(backend, factory);

    let project: Project = projects
        .store_project(
            "student",
            "classroom",
            "numbers",
            "heights",
            None,
            &[FieldSpec::number("height"), FieldSpec::number("age")],
        )
        .await
        .unwrap();

    let stored = training
        .store_number_training_for(&project, &[120.0, 8.0], Some("child"))
        .await
        .unwrap();
    assert_eq!(stored.projectid, project.id);

    let err = training
        .store_number_training_for(&project, &[120.0], Some("child"))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::DataShapeMismatch));
    assert_eq!(training.count_number_training(&project.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_image_training_surface() {
    let store = store();
    let stored = store
        .bulk_store_image_training(
            PROJECT,
            &[
                TrainingItem::new("https://example.com/cat.jpg".to_string(), Some("cat")),
                TrainingItem::new("https://example.com/dog.jpg".to_string(), Some("dog")),
            ],
        )
        .await
        .unwrap();

    let cats = store
        .get_image_training_by_label(PROJECT, "cat", Paging::default())
        .await
        .unwrap();
    assert_eq!(cats, vec![stored[0].clone()]);

    let counts = store.count_image_training_by_label(PROJECT).await.unwrap();
    assert_eq!(counts.len(), 2);

    let long_url = format!("https://example.com/{}", "a".repeat(1024));
    let err = store
        .store_image_training(PROJECT, &long_url, Some("cat"))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::UrlTooLong { max: 1024 }));

    assert_eq!(
        store
            .delete_image_training(PROJECT, &stored[1].id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(store.count_image_training(PROJECT).await.unwrap(), 1);
    assert_eq!(
        store.delete_image_training_by_project_id(PROJECT).await.unwrap(),
        1
    );
}
