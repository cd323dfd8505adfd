//! Integration tests for the users domain
//!
//! Run against PostgreSQL in a testcontainer with the migrations applied.
//! Run with `cargo test -- --ignored` where Docker is available.

use database::PageRequest;
use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires docker"]
async fn test_get_seeded_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("get_seeded_user");

    let id = db.create_test_user(builder.user_id(), &["manager"]).await;

    let user = assert_some(repo.get_by_id(id).await.unwrap(), "seeded user");
    assert_uuid_eq(user.id, id, "seeded user id");
    assert_eq!(user.roles, vec!["manager".to_string()]);
    assert!(user.email_verified);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_profile_resets_phone_verification() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let id = db.create_test_user(Uuid::now_v7(), &["customer"]).await;

    let updated = repo
        .update(
            id,
            UpdateUser {
                name: Some("Renamed".to_string()),
                phone: Some("+15551234567".to_string()),
                image: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.phone.as_deref(), Some("+15551234567"));
    assert!(!updated.phone_verified);
    assert!(updated.updated_at >= updated.created_at);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_missing_user_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let result = repo
        .update(
            Uuid::now_v7(),
            UpdateUser {
                name: Some("Nobody".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(UserError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_list_and_delete_users() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let first = db.create_test_user(Uuid::now_v7(), &["customer"]).await;
    db.create_test_user(Uuid::now_v7(), &["customer"]).await;
    db.create_test_user(Uuid::now_v7(), &["admin"]).await;

    let (items, info) = repo.list(PageRequest::new(None, Some(2), 10)).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(info.total_items, 3);
    assert_eq!(info.total_pages, 2);

    assert!(repo.delete(first).await.unwrap());
    assert!(!repo.delete(first).await.unwrap());
    assert!(repo.get_by_id(first).await.unwrap().is_none());
}
