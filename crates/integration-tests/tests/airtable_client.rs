//! Contract tests for `AirtableClient` against a mock Airtable.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/v0/{base}/{table}` | `list_*`, `fetch_catalog_*`, `inspect_*` |
//! | PATCH  | `/v0/{base}/{table}/{record}` | `set_upvotes_*` |

#![allow(clippy::unwrap_used)]

use machbar_core::{ANONYMOUS_CREATOR_ID, ProductCategory, ProductId, UserBadge};
use machbar_integration_tests::{
    API_KEY, airtable_client, maker_record, page, product_record, table_path,
};
use machbar_storefront::airtable::AirtableError;
use machbar_storefront::airtable::records::ProductFields;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── GET /v0/{base}/{table} ─────────────────────────────────────────────

#[tokio::test]
async fn list_records_follows_offset_pagination() {
    let mock_server = MockServer::start().await;
    let first = page(
        vec![product_record("recP1", "Reachy", 10, "recM1")],
        Some("itrPage2"),
    );
    let second = page(vec![product_record("recP2", "Nybble", 5, "recM1")], None);

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .and(query_param("pageSize", "100"))
        .and(query_param_is_missing("offset"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .and(query_param("offset", "itrPage2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(second))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    let records = client
        .list_records::<ProductFields>("Products")
        .await
        .unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["recP1", "recP2"]);
}

#[tokio::test]
async fn list_records_reports_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    let err = client
        .list_records::<ProductFields>("Products")
        .await
        .unwrap_err();

    assert!(matches!(err, AirtableError::RateLimited(7)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn list_records_surfaces_api_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "type": "TABLE_NOT_FOUND",
                "message": "Could not find table Products in application appTestBase0001"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    let err = client
        .list_records::<ProductFields>("Products")
        .await
        .unwrap_err();

    match err {
        AirtableError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Could not find table"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_catalog_joins_creators_and_normalises() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(table_path("Makers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![maker_record("recM1", "Pollen Robotics", "@pollen")],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                product_record("recP1", "Reachy Mini", 245, "recM1"),
                product_record("recP2", "Reachy Mini", 12, "recMissing"),
                json!({ "id": "recP3", "fields": {} }),
            ],
            None,
        )))
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    let catalog = client.fetch_catalog().await.unwrap();

    assert_eq!(catalog.products.len(), 3);
    assert!(catalog.posts.is_empty());

    let reachy = &catalog.products[0];
    assert_eq!(reachy.id, ProductId::new("recP1"));
    assert_eq!(reachy.category, ProductCategory::ProgrammableRobotics);
    assert_eq!(reachy.creator.name, "Pollen Robotics");
    assert_eq!(reachy.creator.username, "pollen");
    assert_eq!(reachy.creator.badge, UserBadge::Contributor);
    assert_eq!(reachy.creator.credibility_score, 97);
    assert_eq!(reachy.creator.products, vec![ProductId::new("recP1")]);

    // Unresolvable creator links fall back to the anonymous maker
    let orphan = &catalog.products[1];
    assert_eq!(orphan.creator.id.as_str(), ANONYMOUS_CREATOR_ID);

    // Duplicate names still get distinct slugs
    assert_ne!(reachy.slug, orphan.slug);

    // A row with no cells gets defaults rather than being dropped
    let blank = &catalog.products[2];
    assert_eq!(blank.name, "Untitled product");
    assert_eq!(blank.category, ProductCategory::Other);
    assert_eq!(blank.upvotes, 0);
    assert!(!blank.images.is_empty());
}

#[tokio::test]
async fn fetch_catalog_caches_makers() {
    let mock_server = MockServer::start().await;
    let makers = page(vec![maker_record("recM1", "Petoi", "petoi")], None);
    let products = page(vec![product_record("recP1", "Nybble", 175, "recM1")], None);

    Mock::given(method("GET"))
        .and(path(table_path("Makers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(makers))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(products))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    client.fetch_catalog().await.unwrap();
    let catalog = client.fetch_catalog().await.unwrap();

    assert_eq!(catalog.products[0].creator.name, "Petoi");
}

#[tokio::test]
async fn inspect_table_reports_count_and_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(table_path("Products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                json!({ "id": "recP1", "fields": { "Name": "A", "Upvotes": 1 } }),
                json!({ "id": "recP2", "fields": { "Name": "B", "Slug": "b" } }),
            ],
            None,
        )))
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    let summary = client.inspect_table("Products").await.unwrap();

    assert_eq!(summary.table, "Products");
    assert_eq!(summary.record_count, 2);
    let fields: Vec<&str> = summary.field_names.iter().map(String::as_str).collect();
    assert_eq!(fields, ["Name", "Slug", "Upvotes"]);
}

// ── PATCH /v0/{base}/{table}/{record} ──────────────────────────────────

#[tokio::test]
async fn set_upvotes_patches_the_upvotes_cell() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/recP1", table_path("Products"))))
        .and(body_json(json!({ "fields": { "Upvotes": 43 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "recP1",
            "fields": { "Upvotes": 43 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    client
        .set_upvotes(&ProductId::new("recP1"), 43)
        .await
        .unwrap();
}

#[tokio::test]
async fn set_upvotes_handles_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/recP1", table_path("Products"))))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": { "type": "INVALID_VALUE_FOR_COLUMN", "message": "bad value" }
        })))
        .mount(&mock_server)
        .await;

    let client = airtable_client(&mock_server.uri());
    let err = client
        .set_upvotes(&ProductId::new("recP1"), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, AirtableError::Api { status: 422, .. }));
    assert!(!err.is_transient());
}
