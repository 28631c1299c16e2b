//! Project store behaviour against the in-memory backend.

use std::sync::Arc;

use assert_matches::assert_matches;
use mlkids_core::ids::SequentialIds;
use mlkids_core::limits::ObjectLimits;
use mlkids_core::project::FieldSpec;
use mlkids_core::training::TrainingItem;
use mlkids_core::types::{FieldType, ProjectType};
use mlkids_core::{CoreError, ObjectFactory};
use mlkids_db::memory::MemoryBackend;
use mlkids_db::store::{ProjectStore, TrainingStore};
use mlkids_db::StoreError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stores_with_limits(
    limits: ObjectLimits,
) -> (ProjectStore<MemoryBackend>, TrainingStore<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let factory = ObjectFactory::new(limits, Arc::new(SequentialIds::new("p")));
    (
        ProjectStore::new(Arc::clone(&backend), factory.clone()),
        TrainingStore::new(backend, factory),
    )
}

fn stores() -> (ProjectStore<MemoryBackend>, TrainingStore<MemoryBackend>) {
    stores_with_limits(ObjectLimits::default())
}

// ---------------------------------------------------------------------------
// Create and read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_store_and_get_numbers_project() {
    let (projects, _) = stores();
    let fields = [
        FieldSpec::number("age"),
        FieldSpec::multichoice("colour", ["red", "green", "blue"]),
    ];
    let created = projects
        .store_project("bob", "classroom", "numbers", "favourites", None, &fields)
        .await
        .unwrap();
    assert_eq!(created.project_type, ProjectType::Numbers);
    assert_eq!(created.language, "en");
    assert!(created.labels.is_empty());
    assert_eq!(created.numfields, 2);

    let loaded = projects.get_project(&created.id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.fields[0].field_type, FieldType::Number);
    assert!(loaded.fields[0].choices.is_empty());
    assert_eq!(loaded.fields[1].choices, vec!["red", "green", "blue"]);
}

#[tokio::test]
async fn test_store_project_validates_before_writing() {
    let (projects, _) = stores();
    let err = projects
        .store_project("bob", "classroom", "invalidtype", "bad", None, &[])
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::InvalidProjectType(_)));
    assert_eq!(err.to_string(), "Invalid project type invalidtype");

    let err = projects
        .store_project("bob", "classroom", "text", "no language", Some("xx"), &[])
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::UnsupportedLanguage));

    assert_eq!(
        projects.count_projects_by_user("classroom", "bob").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_get_missing_project() {
    let (projects, _) = stores();
    assert!(projects.get_project("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_projects_by_user_in_creation_order() {
    let (projects, _) = stores();
    let first = projects
        .store_project("bob", "classroom", "text", "first", Some("en"), &[])
        .await
        .unwrap();
    let second = projects
        .store_project("bob", "classroom", "images", "second", None, &[])
        .await
        .unwrap();
    projects
        .store_project("alice", "classroom", "text", "other", Some("fr"), &[])
        .await
        .unwrap();

    let mine = projects
        .get_projects_by_user("classroom", "bob")
        .await
        .unwrap();
    assert_eq!(mine, vec![first, second]);
    assert_eq!(
        projects.count_projects_by_user("classroom", "bob").await.unwrap(),
        2
    );
    assert_eq!(
        projects.count_projects_by_user("otherclass", "bob").await.unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_add_label_sanitizes_and_deduplicates() {
    let (projects, _) = stores();
    let project = projects
        .store_project("bob", "classroom", "text", "animals", Some("en"), &[])
        .await
        .unwrap();

    let labels = projects
        .add_label_to_project(&project.id, "big cat")
        .await
        .unwrap();
    assert_eq!(labels, vec!["big_cat"]);

    projects.add_label_to_project(&project.id, "dog").await.unwrap();
    let labels = projects
        .add_label_to_project(&project.id, "big cat")
        .await
        .unwrap();
    assert_eq!(labels, vec!["big_cat", "dog"]);

    let loaded = projects.get_project(&project.id).await.unwrap().unwrap();
    assert_eq!(loaded.labels, vec!["big_cat", "dog"]);
}

#[tokio::test]
async fn test_remove_label() {
    let (projects, _) = stores();
    let project = projects
        .store_project("bob", "classroom", "text", "animals", Some("en"), &[])
        .await
        .unwrap();
    for label in ["cat", "dog", "bird"] {
        projects.add_label_to_project(&project.id, label).await.unwrap();
    }

    let labels = projects
        .remove_label_from_project(&project.id, "dog")
        .await
        .unwrap();
    assert_eq!(labels, vec!["cat", "bird"]);

    let loaded = projects.get_project(&project.id).await.unwrap().unwrap();
    assert_eq!(loaded.labels, vec!["cat", "bird"]);
}

#[tokio::test]
async fn test_add_label_beyond_capacity() {
    let limits = ObjectLimits {
        max_label_list_length: 12,
        ..ObjectLimits::default()
    };
    let (projects, _) = stores_with_limits(limits);
    let project = projects
        .store_project("bob", "classroom", "text", "animals", Some("en"), &[])
        .await
        .unwrap();

    projects.add_label_to_project(&project.id, "apple").await.unwrap();
    projects.add_label_to_project(&project.id, "pear").await.unwrap();
    let err = projects
        .add_label_to_project(&project.id, "banana")
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::LabelCapacityExceeded));
    assert_eq!(err.to_string(), "No room for the label");

    let loaded = projects.get_project(&project.id).await.unwrap().unwrap();
    assert_eq!(loaded.labels, vec!["apple", "pear"]);
}

#[tokio::test]
async fn test_add_label_to_missing_project() {
    let (projects, _) = stores();
    let err = projects
        .add_label_to_project("nope", "cat")
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::NotFound { entity: "project", .. });
}

#[tokio::test]
async fn test_add_empty_label_is_rejected() {
    let (projects, _) = stores();
    let project = projects
        .store_project("bob", "classroom", "text", "animals", Some("en"), &[])
        .await
        .unwrap();
    projects.add_label_to_project(&project.id, "cat").await.unwrap();

    let err = projects
        .add_label_to_project(&project.id, "")
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(CoreError::MissingAttribute));

    let loaded = projects.get_project(&project.id).await.unwrap().unwrap();
    assert_eq!(loaded.labels, vec!["cat"]);
}

#[tokio::test]
async fn test_remove_label_by_its_unsanitized_name() {
    let (projects, _) = stores();
    let project = projects
        .store_project("bob", "classroom", "text", "films", Some("en"), &[])
        .await
        .unwrap();
    let labels = projects
        .add_label_to_project(&project.id, "Science Fiction")
        .await
        .unwrap();
    assert_eq!(labels, vec!["Science_Fiction"]);

    let labels = projects
        .remove_label_from_project(&project.id, "Science Fiction")
        .await
        .unwrap();
    assert!(labels.is_empty());

    let loaded = projects.get_project(&project.id).await.unwrap().unwrap();
    assert!(loaded.labels.is_empty());
}

#[tokio::test]
async fn test_remove_label_from_missing_project() {
    let (projects, _) = stores();
    let err = projects
        .remove_label_from_project("nope", "cat")
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::NotFound { entity: "project", .. });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_label_adds_are_all_kept() {
    let (projects, _) = stores();
    let project = projects
        .store_project("bob", "classroom", "text", "animals", Some("en"), &[])
        .await
        .unwrap();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let projects = projects.clone();
            let id = project.id.clone();
            tokio::spawn(async move {
                projects
                    .add_label_to_project(&id, &format!("l{i}"))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let loaded = projects.get_project(&project.id).await.unwrap().unwrap();
    assert_eq!(loaded.labels.len(), 32);
    for i in 0..32 {
        assert!(loaded.labels.contains(&format!("l{i}")));
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_entire_project_removes_training() {
    let (projects, training) = stores();
    let project = projects
        .store_project("bob", "classroom", "text", "animals", Some("en"), &[])
        .await
        .unwrap();
    let items: Vec<_> = (0..5)
        .map(|i| TrainingItem::new(format!("row {i}"), Some("cat")))
        .collect();
    training
        .bulk_store_text_training(&project.id, &items)
        .await
        .unwrap();

    assert_eq!(projects.delete_entire_project(&project.id).await.unwrap(), 1);
    assert!(projects.get_project(&project.id).await.unwrap().is_none());
    assert_eq!(training.count_text_training(&project.id).await.unwrap(), 0);

    assert_eq!(projects.delete_entire_project(&project.id).await.unwrap(), 0);
}
