//! Integration tests for the products domain
//!
//! PostgreSQL in a testcontainer with the migrations applied. These cover the
//! reconciliation guarantees end to end: counts after mixed patches,
//! idempotent re-application, and all-or-nothing commits.

use database::{MissingChildPolicy, PageRequest};
use domain_products::*;
use rust_decimal::Decimal;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use uuid::Uuid;

fn image(name: &str, order: i32) -> ProductImageInput {
    ProductImageInput {
        url: format!("https://cdn.example.com/{name}.png"),
        alt: "Product Image".to_string(),
        thumbnail_url: format!("https://cdn.example.com/{name}-thumb.png"),
        display_order: order,
    }
}

fn model(name: &str, order: i32) -> ProductModelInput {
    ProductModelInput {
        url: format!("https://cdn.example.com/{name}.glb"),
        thumbnail_url: None,
        display_order: order,
    }
}

fn create_input(
    builder: &TestDataBuilder,
    suffix: &str,
    category_id: Uuid,
    attribute_id: Uuid,
) -> CreateProduct {
    CreateProduct {
        name: builder.name("product", suffix),
        slug: builder.slug("product", suffix),
        description: Some("Integration test product".to_string()),
        short_description: None,
        sku: None,
        base_price: Decimal::new(4999, 2),
        track_quantity: true,
        allow_backorders: false,
        status: ProductStatus::Available,
        tags: vec!["test".to_string()],
        category_id,
        images: vec![image("front", 0), image("back", 1)],
        models: vec![model("shoe", 0)],
        attributes: vec![ProductAttributeValueInput {
            attribute_id,
            value: "red".to_string(),
        }],
    }
}

async fn setup(test_name: &str) -> (TestDatabase, PgProductRepository, CreateProduct) {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name(test_name);
    let (category_id, attribute_id) = db.create_test_category(&builder.slug("cat", "a")).await;
    let repo = PgProductRepository::new(db.connection(), MissingChildPolicy::Reject);
    let input = create_input(&builder, "main", category_id, attribute_id);
    (db, repo, input)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_and_get_product() {
    let (_db, repo, input) = setup("create_and_get").await;

    let created = repo.create(input.clone()).await.unwrap();
    assert_eq!(created.images.len(), 2);
    assert_eq!(created.models.len(), 1);
    assert_eq!(created.attributes.len(), 1);
    assert_eq!(created.base_price, input.base_price);

    let fetched = assert_some(
        repo.get_by_id(created.id).await.unwrap(),
        "product should exist",
    );
    assert_uuid_eq(fetched.id, created.id, "fetched product id");
    assert_eq!(fetched.images, created.images);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_unknown_category_is_validation_error() {
    let (_db, repo, mut input) = setup("unknown_category").await;
    input.category_id = Uuid::now_v7();
    input.attributes.clear();

    let result = repo.create(input).await;
    assert!(matches!(result, Err(ProductError::Validation(_))));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_all_new_children_are_appended() {
    let (_db, repo, input) = setup("all_new").await;
    let created = repo.create(input).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                images: Some(vec![image("left", 2).into(), image("right", 3).into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.images.len(), created.images.len() + 2);
    for before in &created.images {
        let after = updated.images.iter().find(|i| i.id == before.id).unwrap();
        assert_eq!(after.url, before.url);
    }
    assert_eq!(updated.models, created.models);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_existing_children_update_in_place_and_idempotently() {
    let (_db, repo, input) = setup("all_existing").await;
    let created = repo.create(input).await.unwrap();
    let front = &created.images[0];

    let patch = UpdateProduct {
        images: Some(vec![ProductImagePatch {
            id: Some(front.id),
            ..ProductImagePatch::from(image("front-v2", 0))
        }]),
        ..Default::default()
    };

    let once = repo.update(created.id, patch.clone()).await.unwrap();
    let twice = repo.update(created.id, patch).await.unwrap();

    assert_eq!(once.images.len(), created.images.len());
    assert_eq!(twice.images.len(), created.images.len());
    let front_after = twice.images.iter().find(|i| i.id == front.id).unwrap();
    assert_eq!(front_after.url, "https://cdn.example.com/front-v2.png");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_partial_child_patch_keeps_unnamed_columns() {
    let (_db, repo, mut input) = setup("partial_patch").await;
    input.images[1].alt = "Back view".to_string();
    let created = repo.create(input).await.unwrap();
    let back = &created.images[1];
    let color = &created.attributes[0];

    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                images: Some(vec![ProductImagePatch {
                    id: Some(back.id),
                    url: Some("https://cdn.example.com/back-v2.png".to_string()),
                    ..Default::default()
                }]),
                attributes: Some(vec![ProductAttributeValuePatch {
                    id: Some(color.id),
                    value: Some("navy".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let back_after = updated.images.iter().find(|i| i.id == back.id).unwrap();
    assert_eq!(back_after.url, "https://cdn.example.com/back-v2.png");
    assert_eq!(back_after.alt, "Back view");
    assert_eq!(back_after.thumbnail_url, back.thumbnail_url);
    assert_eq!(back_after.display_order, back.display_order);
    assert_eq!(updated.attributes[0].attribute_id, color.attribute_id);
    assert_eq!(updated.attributes[0].value, "navy");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_mixed_patch_across_all_kinds() {
    let (_db, repo, input) = setup("mixed").await;
    let created = repo.create(input).await.unwrap();
    let shoe = &created.models[0];
    let color = &created.attributes[0];

    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                base_price: Some(Decimal::new(3999, 2)),
                models: Some(vec![
                    ProductModelPatch {
                        id: Some(shoe.id),
                        ..ProductModelPatch::from(model("shoe-v2", 0))
                    },
                    model("box", 1).into(),
                ]),
                attributes: Some(vec![ProductAttributeValuePatch {
                    id: Some(color.id),
                    value: Some("blue".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.base_price, Decimal::new(3999, 2));
    assert_eq!(updated.models.len(), 2);
    assert_eq!(updated.models[0].id, shoe.id);
    assert_eq!(updated.models[0].url, "https://cdn.example.com/shoe-v2.glb");
    assert_eq!(updated.attributes.len(), 1);
    assert_eq!(updated.attributes[0].value, "blue");
    assert_eq!(updated.images, created.images);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_patch_of_missing_product_is_not_found() {
    let (_db, repo, _input) = setup("missing_parent").await;

    let result = repo
        .update(
            Uuid::now_v7(),
            UpdateProduct {
                images: Some(vec![image("orphan", 0).into()]),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ProductError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_failure_after_parent_update_rolls_back() {
    let (_db, repo, input) = setup("rollback").await;
    let created = repo.create(input).await.unwrap();

    // A bad attribute reference fails the insert after the parent row was written.
    let result = repo
        .update(
            created.id,
            UpdateProduct {
                name: Some("Renamed product".to_string()),
                images: Some(vec![image("extra", 5).into()]),
                attributes: Some(vec![
                    ProductAttributeValueInput {
                        attribute_id: Uuid::now_v7(),
                        value: "dangling".to_string(),
                    }
                    .into(),
                ]),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let after = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(after.name, created.name);
    assert_eq!(after.images.len(), created.images.len());
    assert_eq!(after.attributes.len(), created.attributes.len());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_child_of_another_product_is_rejected() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("foreign_child");
    let (category_id, attribute_id) = db.create_test_category(&builder.slug("cat", "a")).await;
    let repo = PgProductRepository::new(db.connection(), MissingChildPolicy::Reject);

    let mine = repo
        .create(create_input(&builder, "mine", category_id, attribute_id))
        .await
        .unwrap();
    let theirs = repo
        .create(create_input(&builder, "theirs", category_id, attribute_id))
        .await
        .unwrap();

    let result = repo
        .update(
            mine.id,
            UpdateProduct {
                images: Some(vec![ProductImagePatch {
                    id: Some(theirs.images[0].id),
                    ..ProductImagePatch::from(image("stolen", 0))
                }]),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ProductError::ChildNotFound(_))));

    let theirs_after = repo.get_by_id(theirs.id).await.unwrap().unwrap();
    assert_eq!(theirs_after.images, theirs.images);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_list_filters() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("list_filters");
    let (shoes, attribute_id) = db.create_test_category(&builder.slug("cat", "shoes")).await;
    let (hats, hat_attribute) = db.create_test_category(&builder.slug("cat", "hats")).await;
    let repo = PgProductRepository::new(db.connection(), MissingChildPolicy::Reject);

    let mut cheap = create_input(&builder, "cheap-runner", shoes, attribute_id);
    cheap.base_price = Decimal::new(2000, 2);
    let mut pricey = create_input(&builder, "pricey-runner", shoes, attribute_id);
    pricey.base_price = Decimal::new(15000, 2);
    let hat = create_input(&builder, "hat", hats, hat_attribute);

    let cheap = repo.create(cheap).await.unwrap();
    repo.create(pricey).await.unwrap();
    repo.create(hat).await.unwrap();

    let filter = ProductFilter {
        category_id: Some(shoes),
        max_price: Some(Decimal::from(100)),
        name_contains: Some("RUNNER".to_string()),
        ..Default::default()
    };
    let (items, info) = repo
        .list(filter, PageRequest::new(None, None, 20))
        .await
        .unwrap();

    assert_eq!(info.total_items, 1);
    assert_eq!(items[0].id, cheap.id);
    assert_eq!(items[0].images.len(), 2);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_delete_cascades_to_children() {
    let (_db, repo, input) = setup("delete").await;
    let created = repo.create(input).await.unwrap();

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(!repo.delete(created.id).await.unwrap());
}
