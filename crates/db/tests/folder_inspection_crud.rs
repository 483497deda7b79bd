//! Integration tests for the folder and inspection repositories.
//!
//! Exercises the repository layer against a real database:
//! - Folder name uniqueness
//! - Cascading folder delete removing child inspections
//! - Foreign key enforcement
//! - Dashboard listing order and folder name join

use campo_core::export::InspectionDocument;
use campo_db::models::folder::CreateFolder;
use campo_db::models::inspection::CreateInspection;
use campo_db::repositories::{FolderRepo, InspectionRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_folder(name: &str) -> CreateFolder {
    CreateFolder {
        name: name.to_string(),
    }
}

fn new_inspection(folder_id: i64, name: &str) -> CreateInspection {
    CreateInspection {
        folder_id,
        name: name.to_string(),
        dimensions_value: Some("2.5".to_string()),
        dimensions_unit: Some("m".to_string()),
        observations: None,
        jusante_photo: format!("static/uploads/{name}_j.jpg"),
        montante_photo: format!("static/uploads/{name}_m.jpg"),
        other_photos: vec![format!("static/uploads/{name}_o1.jpg")],
        latitude: None,
        longitude: None,
    }
}

// ---------------------------------------------------------------------------
// Test: Folder create and lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_folder(pool: PgPool) {
    let folder = FolderRepo::create(&pool, &new_folder("Lote Norte"))
        .await
        .unwrap();
    assert_eq!(folder.name, "Lote Norte");

    let by_id = FolderRepo::find_by_id(&pool, folder.id).await.unwrap();
    assert_eq!(by_id.unwrap().name, "Lote Norte");

    let by_name = FolderRepo::find_by_name(&pool, "Lote Norte").await.unwrap();
    assert_eq!(by_name.unwrap().id, folder.id);

    assert!(FolderRepo::find_by_name(&pool, "lote norte")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: Duplicate folder name violates uq_folders_name
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_folder_name_fails(pool: PgPool) {
    FolderRepo::create(&pool, &new_folder("Dup")).await.unwrap();
    let result = FolderRepo::create(&pool, &new_folder("Dup")).await;

    assert!(result.is_err(), "Duplicate folder name should fail");
    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_folders_name"));
}

// ---------------------------------------------------------------------------
// Test: Inspection insert stores photos and optional fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_inspection(pool: PgPool) {
    let folder = FolderRepo::create(&pool, &new_folder("F")).await.unwrap();
    let mut input = new_inspection(folder.id, "bueiro");
    input.latitude = Some("-23.550139".to_string());
    input.longitude = Some("-46.633333".to_string());

    let inspection = InspectionRepo::create(&pool, &input).await.unwrap();
    assert_eq!(inspection.folder_id, folder.id);
    assert_eq!(inspection.jusante_photo, "static/uploads/bueiro_j.jpg");
    assert_eq!(inspection.other_photos.0, ["static/uploads/bueiro_o1.jpg"]);
    assert_eq!(inspection.latitude.as_deref(), Some("-23.550139"));
    assert_eq!(inspection.observations, None);

    let paths: Vec<&str> = inspection.photo_paths().collect();
    assert_eq!(paths.len(), 3);
}

// ---------------------------------------------------------------------------
// Test: Inspection requires an existing folder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspection_with_missing_folder_fails(pool: PgPool) {
    let result = InspectionRepo::create(&pool, &new_inspection(999_999, "orphan")).await;
    assert!(result.is_err(), "Inspection for a missing folder should fail");
    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23503"));
}

// ---------------------------------------------------------------------------
// Test: Folder delete removes child inspections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cascade_delete_folder(pool: PgPool) {
    let folder = FolderRepo::create(&pool, &new_folder("Cascade")).await.unwrap();
    let other = FolderRepo::create(&pool, &new_folder("Keep")).await.unwrap();
    let a = InspectionRepo::create(&pool, &new_inspection(folder.id, "a"))
        .await
        .unwrap();
    let b = InspectionRepo::create(&pool, &new_inspection(folder.id, "b"))
        .await
        .unwrap();
    let kept = InspectionRepo::create(&pool, &new_inspection(other.id, "c"))
        .await
        .unwrap();

    let deleted = FolderRepo::delete_with_inspections(&pool, folder.id)
        .await
        .unwrap()
        .expect("folder exists");
    assert_eq!(deleted.folder.id, folder.id);
    assert_eq!(deleted.inspections.len(), 2);

    assert!(FolderRepo::find_by_id(&pool, folder.id)
        .await
        .unwrap()
        .is_none());
    for id in [a.id, b.id] {
        assert!(InspectionRepo::find_summary(&pool, id)
            .await
            .unwrap()
            .is_none());
    }
    assert!(InspectionRepo::find_summary(&pool, kept.id)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Test: Deleting a missing folder is a no-op
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_missing_folder_returns_none(pool: PgPool) {
    let result = FolderRepo::delete_with_inspections(&pool, 424_242)
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: Inspection delete returns the removed row once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_inspection(pool: PgPool) {
    let folder = FolderRepo::create(&pool, &new_folder("Del")).await.unwrap();
    let inspection = InspectionRepo::create(&pool, &new_inspection(folder.id, "x"))
        .await
        .unwrap();

    let removed = InspectionRepo::delete(&pool, inspection.id).await.unwrap();
    assert_eq!(removed.map(|i| i.id), Some(inspection.id));

    let again = InspectionRepo::delete(&pool, inspection.id).await.unwrap();
    assert!(again.is_none());
}

// ---------------------------------------------------------------------------
// Test: Summaries carry folder name, newest first
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_summaries_joins_folder_name(pool: PgPool) {
    let folder = FolderRepo::create(&pool, &new_folder("Rodovia")).await.unwrap();
    let first = InspectionRepo::create(&pool, &new_inspection(folder.id, "first"))
        .await
        .unwrap();
    let second = InspectionRepo::create(&pool, &new_inspection(folder.id, "second"))
        .await
        .unwrap();

    let all = InspectionRepo::list_summaries(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);
    assert!(all.iter().all(|s| s.folder_name.as_deref() == Some("Rodovia")));

    let by_folder = InspectionRepo::list_summaries_by_folder(&pool, folder.id)
        .await
        .unwrap();
    assert_eq!(by_folder[0].id, first.id);

    let doc: InspectionDocument = by_folder[0].clone().into();
    assert_eq!(doc.folder_name.as_deref(), Some("Rodovia"));
    assert_eq!(doc.other_photos, ["static/uploads/first_o1.jpg"]);
}
